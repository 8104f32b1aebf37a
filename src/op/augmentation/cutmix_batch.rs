//! CutMix batch augmentation

use crate::batch::{Batch, Mode, State};
use crate::error::{Error, Result};
use crate::op::TensorOp;
use crate::tensor::Tensor;
use rand::Rng;
use rand_distr::{Beta, Distribution};

/// Paste a random patch from the rolled batch into each image
///
/// Draws `lambda ~ Beta(alpha, alpha)`, cuts a box whose side ratio is
/// `sqrt(1 - lambda)` of the image (centered uniformly, clipped at the
/// borders), and overwrites the box in every image with the same region from
/// `roll(x, 1)` - the cyclic neighbor pairing MixUp uses. The coefficient
/// written under `lambda_key` is corrected for the clipped patch:
///
/// ```text
/// lambda' = 1 - patch_area / image_area
/// ```
///
/// so [`MixUpLoss`](crate::loss::MixUpLoss) weights the two labels by actual
/// pixel ownership. Inputs are channels-last `[N, H, W, C]`. Train-scoped.
pub struct CutMixBatch {
    input_key: String,
    output_key: String,
    lambda_key: String,
    beta: Beta<f64>,
}

impl CutMixBatch {
    /// Create a CutMix op; errors if `alpha <= 0`
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

impl TensorOp for CutMixBatch {
    fn mode(&self) -> Option<Mode> {
        Some(Mode::Train)
    }

    fn forward(&self, batch: &mut Batch, _state: &State) -> Result<()> {
        let x = batch.get(&self.input_key)?;
        if x.ndim() != 4 {
            return Err(Error::invalid_argument(
                "input",
                format!("CutMix expects [N, H, W, C], got {:?}", x.shape()),
            ));
        }
        let (n, h, w, c) = (x.shape()[0], x.shape()[1], x.shape()[2], x.shape()[3]);

        let mut rng = rand::rng();
        let lam = self.beta.sample(&mut rng);
        let (y0, y1, x0, x1) = cut_box(h, w, lam, rng.random(), rng.random());

        let out = if y1 > y0 && x1 > x0 {
            let rolled = x.roll(1, 0)?;
            let patch = rolled.narrow(1, y0, y1 - y0)?.narrow(2, x0, x1 - x0)?;
            x.slice_assign(&[0..n, y0..y1, x0..x1, 0..c], &patch)?
        } else {
            // patch clipped to nothing: the batch is untouched
            x.clone()
        };

        let patch_area = ((y1 - y0) * (x1 - x0)) as f64;
        let lam_adjusted = 1.0 - patch_area / (h * w) as f64;

        batch.insert(self.output_key.clone(), out);
        batch.insert(self.lambda_key.clone(), Tensor::scalar(lam_adjusted as f32));
        Ok(())
    }
}

/// Compute the clipped patch box for a sampled lambda
///
/// `cx_unit`/`cy_unit` are uniform samples in `[0, 1)` placing the box
/// center. The box side ratio is `sqrt(1 - lambda)`; clipping at the borders
/// can shrink it, which is why the op re-derives lambda from the final area.
/// Returns `(y0, y1, x0, x1)` with half-open ranges.
fn cut_box(h: usize, w: usize, lam: f64, cx_unit: f64, cy_unit: f64) -> (usize, usize, usize, usize) {
    let cut_rat = (1.0 - lam).sqrt();
    let cut_h = (h as f64 * cut_rat).round() as isize;
    let cut_w = (w as f64 * cut_rat).round() as isize;

    let cy = (cy_unit * h as f64) as isize;
    let cx = (cx_unit * w as f64) as isize;

    let y0 = (cy - cut_h / 2).clamp(0, h as isize) as usize;
    let y1 = (cy + cut_h / 2).clamp(0, h as isize) as usize;
    let x0 = (cx - cut_w / 2).clamp(0, w as isize) as usize;
    let x1 = (cx + cut_w / 2).clamp(0, w as isize) as usize;

    (y0, y1, x0, x1)
}
