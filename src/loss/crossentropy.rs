//! Cross-entropy losses: sparse, categorical, and binary

use super::{reduce_per_example, Loss, PairwiseLoss};
use crate::batch::{Batch, State};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Probability fuzz factor; probabilities are clamped to `[EPSILON, 1]`
/// before taking logarithms.
const EPSILON: f64 = 1e-7;

/// Sparse categorical cross entropy
///
/// Compares integer class labels (`I64`, shape `[N]` or `[N, 1]`) against
/// predictions of shape `[N, C]`. With `from_logits` the predictions are raw
/// scores fed through a stabilized log-softmax; otherwise they are
/// probabilities.
pub struct SparseCategoricalCrossentropy {
    true_key: String,
    pred_key: String,
    from_logits: bool,
}

impl SparseCategoricalCrossentropy {
    /// Create a loss reading labels from `true_key` and predictions from
    /// `pred_key`
    pub fn new(true_key: impl Into<String>, pred_key: impl Into<String>, from_logits: bool) -> Self {
        Self {
            true_key: true_key.into(),
            pred_key: pred_key.into(),
            from_logits,
        }
    }
}

impl PairwiseLoss for SparseCategoricalCrossentropy {
    fn per_example(&self, y_true: &Tensor, y_pred: &Tensor) -> Result<Tensor> {
        if y_true.dtype() != DType::I64 {
            return Err(Error::unsupported_dtype(y_true.dtype(), "sparse labels"));
        }

        // Accept labels as [N] or [N, 1]; gather wants the same rank as preds
        let index = if y_true.ndim() + 1 == y_pred.ndim() {
            y_true.unsqueeze(-1)?
        } else if y_true.ndim() == y_pred.ndim() {
            y_true.clone()
        } else {
            return Err(Error::shape_mismatch(y_pred.shape(), y_true.shape()));
        };

        let log_probs = if self.from_logits {
            y_pred.log_softmax(-1)?
        } else {
            y_pred.clamp(EPSILON, 1.0)?.ln()?
        };

        let picked = log_probs.gather(-1, &index)?;
        picked.neg()?.squeeze(Some(-1)).flatten()
    }
}

impl Loss for SparseCategoricalCrossentropy {
    fn calculate_loss(&self, batch: &Batch, _state: &State) -> Result<Tensor> {
        let y_true = batch.get(&self.true_key)?;
        let y_pred = batch.get(&self.pred_key)?;
        self.per_example(y_true, y_pred)?.mean_all()
    }
}

/// Categorical cross entropy for one-hot or soft labels
///
/// Labels and predictions both have shape `[N, C]`; the per-example loss is
/// `-sum_c y[c] * ln(p[c])`.
pub struct CategoricalCrossentropy {
    true_key: String,
    pred_key: String,
    from_logits: bool,
}

impl CategoricalCrossentropy {
    /// Create a loss reading labels from `true_key` and predictions from
    /// `pred_key`
    pub fn new(true_key: impl Into<String>, pred_key: impl Into<String>, from_logits: bool) -> Self {
        Self {
            true_key: true_key.into(),
            pred_key: pred_key.into(),
            from_logits,
        }
    }
}

impl PairwiseLoss for CategoricalCrossentropy {
    fn per_example(&self, y_true: &Tensor, y_pred: &Tensor) -> Result<Tensor> {
        if y_true.shape() != y_pred.shape() {
            return Err(Error::shape_mismatch(y_pred.shape(), y_true.shape()));
        }

        let log_probs = if self.from_logits {
            y_pred.log_softmax(-1)?
        } else {
            y_pred.clamp(EPSILON, 1.0)?.ln()?
        };

        let weighted = y_true.mul(&log_probs)?;
        let last = weighted.ndim() - 1;
        weighted.sum(&[last], false)?.neg()
    }
}

impl Loss for CategoricalCrossentropy {
    fn calculate_loss(&self, batch: &Batch, _state: &State) -> Result<Tensor> {
        let y_true = batch.get(&self.true_key)?;
        let y_pred = batch.get(&self.pred_key)?;
        self.per_example(y_true, y_pred)?.mean_all()
    }
}

/// Binary cross entropy
///
/// Targets in `[0, 1]` with matching prediction shape (`[N]` or `[N, 1]`).
/// With `from_logits` the predictions pass through a sigmoid first.
pub struct BinaryCrossentropy {
    true_key: String,
    pred_key: String,
    from_logits: bool,
}

impl BinaryCrossentropy {
    /// Create a loss reading targets from `true_key` and predictions from
    /// `pred_key`
    pub fn new(true_key: impl Into<String>, pred_key: impl Into<String>, from_logits: bool) -> Self {
        Self {
            true_key: true_key.into(),
            pred_key: pred_key.into(),
            from_logits,
        }
    }
}

impl PairwiseLoss for BinaryCrossentropy {
    fn per_example(&self, y_true: &Tensor, y_pred: &Tensor) -> Result<Tensor> {
        if y_true.shape() != y_pred.shape() {
            return Err(Error::shape_mismatch(y_pred.shape(), y_true.shape()));
        }

        let probs = if self.from_logits {
            // sigmoid(z) = 1 / (1 + e^(-z))
            let denom = y_pred.neg()?.exp()?.add_scalar(1.0)?;
            Tensor::ones(denom.shape(), DType::F32).div(&denom)?
        } else {
            y_pred.clone()
        };
        let probs = probs.clamp(EPSILON, 1.0 - EPSILON)?;

        // -(y ln p + (1 - y) ln(1 - p))
        let pos = y_true.mul(&probs.ln()?)?;
        let one_minus_y = y_true.mul_scalar(-1.0)?.add_scalar(1.0)?;
        let one_minus_p = probs.mul_scalar(-1.0)?.add_scalar(1.0)?;
        let neg_part = one_minus_y.mul(&one_minus_p.ln()?)?;
        let loss = pos.add(&neg_part)?.neg()?;

        reduce_per_example(&loss)
    }
}

impl Loss for BinaryCrossentropy {
    fn calculate_loss(&self, batch: &Batch, _state: &State) -> Result<Tensor> {
        let y_true = batch.get(&self.true_key)?;
        let y_pred = batch.get(&self.pred_key)?;
        self.per_example(y_true, y_pred)?.mean_all()
    }
}
