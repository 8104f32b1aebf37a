//! Tensor substrate: layout, storage, and the `Tensor` type
//!
//! A deliberately small CPU tensor carrying only what the loss and
//! augmentation layers consume. Operations are inherent methods grouped by
//! category: broadcasting arithmetic, scalar and unary ops, reductions,
//! softmax/log-softmax, shape ops (roll, flip, narrow, slice_assign), and
//! gather.

mod activation;
mod arithmetic;
mod core;
mod index;
mod layout;
mod reduce;
mod shape_ops;
mod storage;

pub use self::core::Tensor;
pub use self::layout::{broadcast_shapes, Layout, Shape, Strides};
pub use self::storage::Storage;
