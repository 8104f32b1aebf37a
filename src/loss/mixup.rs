//! MixUp loss: convex combination against a rolled copy of the labels

use super::{Loss, PairwiseLoss};
use crate::batch::{Batch, State};
use crate::error::Result;
use crate::tensor::Tensor;

/// Loss companion to [`MixUpBatch`](crate::op::augmentation::MixUpBatch)
///
/// MixUp training blends each input with the next example in the batch
/// (cyclically), so the loss must credit both labels: in train mode this
/// computes
///
/// ```text
/// mean( lambda * L(y, y_pred) + (1 - lambda) * L(roll(y, 1), y_pred) )
/// ```
///
/// where `roll` shifts the labels one position along the example axis with
/// the last example wrapping to the front - the same pairing the batch op
/// used when mixing the inputs. `lambda` is read from the batch under
/// `lambda_key` and may be a single coefficient (`[1]`) or per-example
/// (`[N]`).
///
/// In any non-train mode the batch was never mixed, so the unmixed loss
/// `mean(L(y, y_pred))` is returned exactly and `lambda_key` is not read.
///
/// Reduces over-fitting, stabilizes GAN training, and hardens against
/// adversarial attacks (<https://arxiv.org/abs/1710.09412>).
pub struct MixUpLoss<P> {
    inner: P,
    true_key: String,
    pred_key: String,
    lambda_key: String,
}

impl<P: PairwiseLoss> MixUpLoss<P> {
    /// Wrap a pairwise loss
    ///
    /// `lambda_key` is the key under which the paired batch op stored the
    /// mixing coefficient.
    pub fn new(
        inner: P,
        true_key: impl Into<String>,
        pred_key: impl Into<String>,
        lambda_key: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            true_key: true_key.into(),
            pred_key: pred_key.into(),
            lambda_key: lambda_key.into(),
        }
    }
}

impl<P: PairwiseLoss> Loss for MixUpLoss<P> {
    fn calculate_loss(&self, batch: &Batch, state: &State) -> Result<Tensor> {
        let y_true = batch.get(&self.true_key)?;
        let y_pred = batch.get(&self.pred_key)?;

        let loss1 = self.inner.per_example(y_true, y_pred)?;
        if !state.is_train() {
            return loss1.mean_all();
        }

        let lam = batch.get(&self.lambda_key)?;
        let rolled = y_true.roll(1, 0)?;
        let loss2 = self.inner.per_example(&rolled, y_pred)?;

        let lam_c = lam.mul_scalar(-1.0)?.add_scalar(1.0)?;
        loss1.mul(lam)?.add(&loss2.mul(&lam_c)?)?.mean_all()
    }
}
