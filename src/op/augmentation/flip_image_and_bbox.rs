//! Horizontal flip keeping bounding boxes consistent

use crate::batch::{Batch, Mode, State};
use crate::error::{Error, Result};
use crate::op::TensorOp;
use crate::tensor::Tensor;
use rand::Rng;

/// Flip images left-right together with their bounding boxes
///
/// With probability `prob` the whole batch is mirrored along the width axis
/// and every box origin is rewritten as `x' = W - x - w`, keeping the box
/// over the same content. Images are channels-last `[N, H, W, C]`; boxes are
/// F32 `[N, 4]` in `(x, y, w, h)` pixel coordinates. Both keys are updated
/// in place. Train-scoped.
pub struct FlipImageAndBbox {
    image_key: String,
    bbox_key: String,
    prob: f64,
}

impl FlipImageAndBbox {
    /// Create a flip op; errors unless `prob` is within `[0, 1]`
    pub fn new(image_key: impl Into<String>, bbox_key: impl Into<String>, prob: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&prob) {
            return Err(Error::invalid_argument(
                "prob",
                format!("must be in [0, 1], got {prob}"),
            ));
        }
        Ok(Self {
            image_key: image_key.into(),
            bbox_key: bbox_key.into(),
            prob,
        })
    }
}

impl TensorOp for FlipImageAndBbox {
    fn mode(&self) -> Option<Mode> {
        Some(Mode::Train)
    }

    fn forward(&self, batch: &mut Batch, _state: &State) -> Result<()> {
        if rand::rng().random::<f64>() >= self.prob {
            return Ok(());
        }

        let image = batch.get(&self.image_key)?;
        if image.ndim() != 4 {
            return Err(Error::invalid_argument(
                "image",
                format!("expected [N, H, W, C], got {:?}", image.shape()),
            ));
        }
        let width = image.shape()[2];
        let flipped = image.flip(2)?;

        let bbox = batch.get(&self.bbox_key)?;
        let mirrored = mirror_boxes(bbox, width as f32)?;

        batch.insert(self.image_key.clone(), flipped);
        batch.insert(self.bbox_key.clone(), mirrored);
        Ok(())
    }
}

/// Rewrite `(x, y, w, h)` boxes for a left-right flipped image
fn mirror_boxes(bbox: &Tensor, width: f32) -> Result<Tensor> {
    if bbox.ndim() != 2 || bbox.shape()[1] != 4 {
        return Err(Error::invalid_argument(
            "bbox",
            format!("expected [N, 4], got {:?}", bbox.shape()),
        ));
    }

    let mut boxes = bbox.to_vec::<f32>()?;
    for b in boxes.chunks_exact_mut(4) {
        b[0] = width - b[0] - b[2];
    }
    Tensor::from_vec(boxes, bbox.shape())
}
