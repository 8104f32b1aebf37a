//! # trainr
//!
//! **Batch-level loss functions and data-augmentation tensor ops for training loops.**
//!
//! trainr supplies the pluggable pieces a training loop invokes once per batch:
//! loss objects and augmentation "tensor ops" (MixUp, CutMix, random affine,
//! bbox-aware flips), wired through a dictionary-based batch/state contract.
//! The loop itself - datasets, models, checkpointing - lives elsewhere; trainr
//! only hands it strategy objects.
//!
//! ## Design
//!
//! - **Batch contract**: a [`batch::Batch`] is a string-keyed map of tensors.
//!   Ops read input keys and write output keys; losses read the truth and
//!   prediction keys and return a scalar tensor.
//! - **State contract**: [`batch::State`] carries the running mode
//!   (train/eval/test/infer), epoch, and step. Mode gates the mixing behavior
//!   of [`loss::MixUpLoss`] and the train-only augmentation ops.
//! - **Tensor substrate**: a minimal CPU tensor (F32 data, I64 labels) with
//!   just the ops the loss/augmentation layer needs: broadcasting arithmetic,
//!   reductions, softmax, `roll`, `gather`, region assignment. General
//!   tensor math (matmul, autodiff, GPU backends) is a non-goal.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trainr::prelude::*;
//!
//! let mut batch = Batch::new();
//! batch.insert("x", Tensor::from_slice(&images, &[n, 32, 32, 3]));
//! batch.insert("y", Tensor::from_slice(&labels, &[n]));
//!
//! let state = State::new(Mode::Train, 0, 0);
//! let mixup = MixUpBatch::new("x", "x", "lambda", 1.0)?;
//! mixup.forward(&mut batch, &state)?;
//!
//! let loss = MixUpLoss::new(
//!     SparseCategoricalCrossentropy::new("y", "y_pred", true),
//!     "y", "y_pred", "lambda",
//! );
//! let value = loss.calculate_loss(&batch, &state)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): parallel per-image augmentation kernels

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod dtype;
pub mod error;
pub mod loss;
pub mod op;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::batch::{Batch, Mode, State};
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::loss::{
        BinaryCrossentropy, CategoricalCrossentropy, Loss, MeanSquaredError, MixUpLoss,
        PairwiseLoss, SparseCategoricalCrossentropy,
    };
    pub use crate::op::augmentation::{Augmentation2D, CutMixBatch, FlipImageAndBbox, MixUpBatch};
    pub use crate::op::{forward_ops, TensorOp};
    pub use crate::tensor::Tensor;
}
