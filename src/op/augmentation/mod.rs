//! Data-augmentation ops
//!
//! Batch-level regularization transforms, all train-scoped:
//!
//! - [`MixUpBatch`] / [`CutMixBatch`] blend each example with its cyclic
//!   neighbor and publish the mixing coefficient for the paired
//!   [`MixUpLoss`](crate::loss::MixUpLoss)
//! - [`Augmentation2D`] applies per-image random affine warps
//! - [`FlipImageAndBbox`] flips images while keeping boxes consistent

mod augmentation_2d;
mod cutmix_batch;
mod flip_image_and_bbox;
mod mixup_batch;

pub use augmentation_2d::Augmentation2D;
pub use cutmix_batch::CutMixBatch;
pub use flip_image_and_bbox::FlipImageAndBbox;
pub use mixup_batch::MixUpBatch;
