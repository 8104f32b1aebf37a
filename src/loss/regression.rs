//! Regression losses

use super::{reduce_per_example, Loss, PairwiseLoss};
use crate::batch::{Batch, State};
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Mean squared error
///
/// Per-example loss is the mean of `(y - y_pred)^2` over all trailing
/// dimensions; targets and predictions must share a shape.
pub struct MeanSquaredError {
    true_key: String,
    pred_key: String,
}

impl MeanSquaredError {
    /// Create a loss reading targets from `true_key` and predictions from
    /// `pred_key`
    pub fn new(true_key: impl Into<String>, pred_key: impl Into<String>) -> Self {
        Self {
            true_key: true_key.into(),
            pred_key: pred_key.into(),
        }
    }
}

impl PairwiseLoss for MeanSquaredError {
    fn per_example(&self, y_true: &Tensor, y_pred: &Tensor) -> Result<Tensor> {
        if y_true.shape() != y_pred.shape() {
            return Err(Error::shape_mismatch(y_pred.shape(), y_true.shape()));
        }
        let sq = y_true.sub(y_pred)?.square()?;
        reduce_per_example(&sq)
    }
}

impl Loss for MeanSquaredError {
    fn calculate_loss(&self, batch: &Batch, _state: &State) -> Result<Tensor> {
        let y_true = batch.get(&self.true_key)?;
        let y_pred = batch.get(&self.pred_key)?;
        self.per_example(y_true, y_pred)?.mean_all()
    }
}
