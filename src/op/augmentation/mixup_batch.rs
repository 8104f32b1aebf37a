//! MixUp batch augmentation

use crate::batch::{Batch, Mode, State};
use crate::error::{Error, Result};
use crate::op::TensorOp;
use crate::tensor::Tensor;
use rand_distr::{Beta, Distribution};

/// Blend each example with its cyclic neighbor
///
/// Draws one mixing coefficient `lambda ~ Beta(alpha, alpha)` per batch and
/// writes
///
/// ```text
/// output = lambda * x + (1 - lambda) * roll(x, 1)
/// ```
///
/// plus `lambda` itself (shape `[1]`, under `lambda_key`) into the batch.
/// `roll` pairs example `i` with example `i - 1`, the last wrapping around to
/// the front, so every example participates in exactly one blend partner per
/// direction. Use together with [`MixUpLoss`](crate::loss::MixUpLoss), which
/// forms the matching convex combination of losses.
///
/// Train-scoped: [`forward_ops`](crate::op::forward_ops) skips it in every
/// other mode.
pub struct MixUpBatch {
    input_key: String,
    output_key: String,
    lambda_key: String,
    beta: Beta<f64>,
}

impl MixUpBatch {
    /// Create a MixUp op
    ///
    /// `alpha` shapes the Beta distribution; `alpha = 1` samples lambda
    /// uniformly, smaller values concentrate mass near 0 and 1 (weaker
    /// mixing). Errors if `alpha <= 0`.
    pub fn new(
        input_key: impl Into<String>,
        output_key: impl Into<String>,
        lambda_key: impl Into<String>,
        alpha: f64,
    ) -> Result<Self> {
        let beta = Beta::new(alpha, alpha)
            .map_err(|_| Error::invalid_argument("alpha", format!("must be > 0, got {alpha}")))?;
        Ok(Self {
            input_key: input_key.into(),
            output_key: output_key.into(),
            lambda_key: lambda_key.into(),
            beta,
        })
    }
}

impl TensorOp for MixUpBatch {
    fn mode(&self) -> Option<Mode> {
        Some(Mode::Train)
    }

    fn forward(&self, batch: &mut Batch, _state: &State) -> Result<()> {
        let x = batch.get(&self.input_key)?;
        let lam = self.beta.sample(&mut rand::rng()) as f32;

        let mixed = mix(x, lam)?;
        batch.insert(self.output_key.clone(), mixed);
        batch.insert(self.lambda_key.clone(), Tensor::scalar(lam));
        Ok(())
    }
}

/// `lambda * x + (1 - lambda) * roll(x, 1)` along the example axis
fn mix(x: &Tensor, lam: f32) -> Result<Tensor> {
    let rolled = x.roll(1, 0)?;
    x.mul_scalar(lam as f64)?
        .add(&rolled.mul_scalar(1.0 - lam as f64)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_convex_blend() {
        let x = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2]);
        let mixed = mix(&x, 0.75).unwrap();
        // rolled rows: [3, 4], [1, 2]
        let want = [
            0.75 * 1.0 + 0.25 * 3.0,
            0.75 * 2.0 + 0.25 * 4.0,
            0.75 * 3.0 + 0.25 * 1.0,
            0.75 * 4.0 + 0.25 * 2.0,
        ];
        for (got, want) in mixed.to_vec::<f32>().unwrap().iter().zip(want.iter()) {
            assert!((got - want).abs() < 1e-6);
        }
    }

    #[test]
    fn test_mix_endpoints() {
        let x = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3, 1]);
        assert_eq!(
            mix(&x, 1.0).unwrap().to_vec::<f32>().unwrap(),
            vec![1.0, 2.0, 3.0]
        );
        assert_eq!(
            mix(&x, 0.0).unwrap().to_vec::<f32>().unwrap(),
            vec![3.0, 1.0, 2.0]
        );
    }

    #[test]
    fn test_forward_writes_consistent_lambda() {
        let op = MixUpBatch::new("x", "x_mixed", "lambda", 1.0).unwrap();
        let mut batch = Batch::new();
        let x = Tensor::from_slice(&[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0], &[3, 2]);
        batch.insert("x", x.clone());

        let state = State::new(Mode::Train, 0, 0);
        op.forward(&mut batch, &state).unwrap();

        let lam = batch.get("lambda").unwrap().scalar_value().unwrap() as f32;
        assert!((0.0..=1.0).contains(&lam));

        // the written output must equal the blend recomputed from the
        // written lambda
        let want = mix(&x, lam).unwrap().to_vec::<f32>().unwrap();
        let got = batch.get("x_mixed").unwrap().to_vec::<f32>().unwrap();
        for (g, w) in got.iter().zip(want.iter()) {
            assert!((g - w).abs() < 1e-6);
        }
        // input key untouched when output key differs
        assert_eq!(batch.get("x").unwrap().to_vec::<f32>().unwrap().len(), 6);
    }

    #[test]
    fn test_invalid_alpha() {
        assert!(MixUpBatch::new("x", "x", "lambda", 0.0).is_err());
        assert!(MixUpBatch::new("x", "x", "lambda", -1.0).is_err());
    }

    #[test]
    fn test_train_scoped() {
        let op = MixUpBatch::new("x", "x", "lambda", 1.0).unwrap();
        assert_eq!(op.mode(), Some(Mode::Train));
    }
}
