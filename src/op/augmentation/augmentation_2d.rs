//! Random per-image 2D affine augmentation

use crate::batch::{Batch, Mode, State};
use crate::error::{Error, Result};
use crate::op::TensorOp;
use crate::tensor::Tensor;
use rand::Rng;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Random affine warps over a batch of images
///
/// Each image independently samples a rotation, shift, zoom, and optional
/// flips, composes them into one affine transform, and resamples by inverse
/// mapping with bilinear interpolation; pixels mapped from outside the frame
/// become zero. Inputs are channels-last `[N, H, W, C]`.
///
/// All ranges default to the identity; enable the pieces you want:
///
/// ```rust,ignore
/// let aug = Augmentation2D::new("x", "x")
///     .with_rotation(15.0)
///     .with_shift(0.1, 0.1)
///     .with_zoom(0.8, 1.2)
///     .with_flip_left_right();
/// ```
///
/// Train-scoped.
pub struct Augmentation2D {
    input_key: String,
    output_key: String,
    rotation_range: f32,
    width_shift_range: f32,
    height_shift_range: f32,
    zoom_range: (f32, f32),
    flip_left_right: bool,
    flip_up_down: bool,
}

/// One sampled transform, applied to a single image
struct AffineParams {
    angle: f32,
    dx: f32,
    dy: f32,
    scale: f32,
    flip_lr: bool,
    flip_ud: bool,
}

impl Augmentation2D {
    /// Create an identity augmentation reading `input_key`, writing
    /// `output_key`
    pub fn new(input_key: impl Into<String>, output_key: impl Into<String>) -> Self {
        Self {
            input_key: input_key.into(),
            output_key: output_key.into(),
            rotation_range: 0.0,
            width_shift_range: 0.0,
            height_shift_range: 0.0,
            zoom_range: (1.0, 1.0),
            flip_left_right: false,
            flip_up_down: false,
        }
    }

    /// Rotate by a uniform angle in `[-degrees, degrees]`
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation_range = degrees;
        self
    }

    /// Shift by uniform fractions of the width/height
    pub fn with_shift(mut self, width_fraction: f32, height_fraction: f32) -> Self {
        self.width_shift_range = width_fraction;
        self.height_shift_range = height_fraction;
        self
    }

    /// Zoom by a uniform scale factor in `[lo, hi]` (1.0 = no zoom)
    pub fn with_zoom(mut self, lo: f32, hi: f32) -> Self {
        self.zoom_range = (lo, hi);
        self
    }

    /// Mirror along the width axis with probability 1/2
    pub fn with_flip_left_right(mut self) -> Self {
        self.flip_left_right = true;
        self
    }

    /// Mirror along the height axis with probability 1/2
    pub fn with_flip_up_down(mut self) -> Self {
        self.flip_up_down = true;
        self
    }

    fn sample_params(&self, rng: &mut impl Rng, w: usize, h: usize) -> AffineParams {
        let angle = uniform(rng, self.rotation_range).to_radians();
        let dx = uniform(rng, self.width_shift_range) * w as f32;
        let dy = uniform(rng, self.height_shift_range) * h as f32;
        let (lo, hi) = self.zoom_range;
        let scale = if hi > lo { rng.random_range(lo..hi) } else { lo };
        AffineParams {
            angle,
            dx,
            dy,
            scale,
            flip_lr: self.flip_left_right && rng.random::<bool>(),
            flip_ud: self.flip_up_down && rng.random::<bool>(),
        }
    }
}

/// Uniform sample in `[-r, r)`, with `r = 0` meaning "disabled"
fn uniform<R: Rng>(rng: &mut R, r: f32) -> f32 {
    if r > 0.0 {
        rng.random_range(-r..r)
    } else {
        0.0
    }
}

impl TensorOp for Augmentation2D {
    fn mode(&self) -> Option<Mode> {
        Some(Mode::Train)
    }

    fn forward(&self, batch: &mut Batch, _state: &State) -> Result<()> {
        let (lo, hi) = self.zoom_range;
        if lo <= 0.0 || hi < lo {
            return Err(Error::invalid_argument(
                "zoom_range",
                format!("expected 0 < lo <= hi, got ({lo}, {hi})"),
            ));
        }

        let x = batch.get(&self.input_key)?;
        if x.ndim() != 4 {
            return Err(Error::invalid_argument(
                "input",
                format!("expected [N, H, W, C], got {:?}", x.shape()),
            ));
        }
        let (n, h, w, c) = (x.shape()[0], x.shape()[1], x.shape()[2], x.shape()[3]);
        let img_len = h * w * c;

        let mut rng = rand::rng();
        let params: Vec<AffineParams> = (0..n).map(|_| self.sample_params(&mut rng, w, h)).collect();

        let src = x.to_vec::<f32>()?;
        let mut out = vec![0.0f32; src.len()];

        let warp_one = |(i, dst): (usize, &mut [f32])| {
            warp_image(dst, &src[i * img_len..(i + 1) * img_len], h, w, c, &params[i]);
        };

        #[cfg(feature = "rayon")]
        out.par_chunks_mut(img_len.max(1)).enumerate().for_each(warp_one);
        #[cfg(not(feature = "rayon"))]
        out.chunks_mut(img_len.max(1)).enumerate().for_each(warp_one);

        batch.insert(self.output_key.clone(), Tensor::from_vec(out, x.shape())?);
        Ok(())
    }
}

/// Inverse-map one image through the sampled affine transform
///
/// For every output pixel the source position is found by undoing the flips,
/// shift, zoom, and rotation around the image center, then sampled with
/// bilinear interpolation. Source positions outside the frame contribute
/// zero.
fn warp_image(dst: &mut [f32], src: &[f32], h: usize, w: usize, c: usize, p: &AffineParams) {
    // center of the pixel lattice, so rotations on odd sizes stay exact
    let cx = (w - 1) as f32 / 2.0;
    let cy = (h - 1) as f32 / 2.0;
    let (sin_a, cos_a) = (-p.angle).sin_cos();

    for y in 0..h {
        for x in 0..w {
            let xo = if p.flip_lr { w - 1 - x } else { x } as f32;
            let yo = if p.flip_ud { h - 1 - y } else { y } as f32;

            let dxc = xo - cx - p.dx;
            let dyc = yo - cy - p.dy;
            let sx = cx + (cos_a * dxc - sin_a * dyc) / p.scale;
            let sy = cy + (sin_a * dxc + cos_a * dyc) / p.scale;

            if sx >= 0.0 && sx <= (w - 1) as f32 && sy >= 0.0 && sy <= (h - 1) as f32 {
                let x1 = sx.floor() as usize;
                let y1 = sy.floor() as usize;
                let x2 = (x1 + 1).min(w - 1);
                let y2 = (y1 + 1).min(h - 1);
                let fx = sx - x1 as f32;
                let fy = sy - y1 as f32;

                for ch in 0..c {
                    let at = |yy: usize, xx: usize| src[(yy * w + xx) * c + ch];
                    let val = (1.0 - fx) * (1.0 - fy) * at(y1, x1)
                        + fx * (1.0 - fy) * at(y1, x2)
                        + (1.0 - fx) * fy * at(y2, x1)
                        + fx * fy * at(y2, x2);
                    dst[(y * w + x) * c + ch] = val;
                }
            }
            // else: leave zeros
        }
    }
}
