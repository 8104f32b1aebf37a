//! Loss functions with a common batch-level call interface
//!
//! Two traits split the contract:
//!
//! - [`Loss`] is what the trainer calls once per batch:
//!   `calculate_loss(batch, state)` returns a scalar tensor for the model
//!   update. Implementations pull their own keys out of the batch.
//! - [`PairwiseLoss`] is the underlying `(y_true, y_pred)` computation,
//!   returning *per-example* losses of shape `[N]`. Keeping the per-example
//!   vector around is what lets [`MixUpLoss`] form the convex combination
//!   exactly, for scalar and per-example mixing coefficients alike.
//!
//! Every concrete loss implements both; `calculate_loss` is the mean of
//! `per_example`.

mod crossentropy;
mod mixup;
mod regression;

pub use crossentropy::{BinaryCrossentropy, CategoricalCrossentropy, SparseCategoricalCrossentropy};
pub use mixup::MixUpLoss;
pub use regression::MeanSquaredError;

use crate::batch::{Batch, State};
use crate::error::Result;
use crate::tensor::Tensor;

/// A loss invoked once per batch by the training loop
pub trait Loss {
    /// Calculate the scalar loss for the current batch
    ///
    /// `batch` holds the tensors produced by the forward pass; `state`
    /// carries the mode, epoch, and step.
    fn calculate_loss(&self, batch: &Batch, state: &State) -> Result<Tensor>;
}

/// The `(y_true, y_pred)` core of a loss, before reduction
pub trait PairwiseLoss {
    /// Per-example losses, shape `[N]` for a batch of `N` examples
    fn per_example(&self, y_true: &Tensor, y_pred: &Tensor) -> Result<Tensor>;
}

/// Mean over every trailing (non-example) dimension, yielding `[N]`
pub(crate) fn reduce_per_example(t: &Tensor) -> Result<Tensor> {
    if t.ndim() <= 1 {
        return Ok(t.clone());
    }
    let trailing: Vec<usize> = (1..t.ndim()).collect();
    t.mean(&trailing, false)
}
