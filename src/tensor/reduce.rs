//! Reductions: sum and mean over dimensions

use super::Tensor;
use crate::dtype::DType;
use crate::error::{Error, Result};

impl Tensor {
    /// Sum along the given dimensions
    ///
    /// With `keepdim`, reduced dimensions stay in the shape with size 1;
    /// otherwise they are removed.
    pub fn sum(&self, dims: &[usize], keepdim: bool) -> Result<Tensor> {
        reduce(self, dims, keepdim, false, "sum")
    }

    /// Mean along the given dimensions
    pub fn mean(&self, dims: &[usize], keepdim: bool) -> Result<Tensor> {
        reduce(self, dims, keepdim, true, "mean")
    }

    /// Sum of every element, as a scalar (0-dimensional) tensor
    pub fn sum_all(&self) -> Result<Tensor> {
        let all: Vec<usize> = (0..self.ndim()).collect();
        reduce(self, &all, false, false, "sum")
    }

    /// Mean of every element, as a scalar (0-dimensional) tensor
    pub fn mean_all(&self) -> Result<Tensor> {
        let all: Vec<usize> = (0..self.ndim()).collect();
        reduce(self, &all, false, true, "mean")
    }
}

fn reduce(
    a: &Tensor,
    dims: &[usize],
    keepdim: bool,
    mean: bool,
    name: &'static str,
) -> Result<Tensor> {
    if a.dtype() != DType::F32 {
        return Err(Error::unsupported_dtype(a.dtype(), name));
    }
    let ndim = a.ndim();
    for &d in dims {
        if d >= ndim {
            return Err(Error::InvalidDimension {
                dim: d as isize,
                ndim,
            });
        }
    }

    let mut reduced = vec![false; ndim];
    for &d in dims {
        reduced[d] = true;
    }

    // Output shape with reduced dims kept at size 1; the final squeeze
    // happens after accumulation when keepdim is off.
    let shape = a.shape();
    let kept_shape: Vec<usize> = shape
        .iter()
        .enumerate()
        .map(|(d, &s)| if reduced[d] { 1 } else { s })
        .collect();
    let out_len: usize = kept_shape.iter().product();
    let count: usize = shape
        .iter()
        .enumerate()
        .filter(|(d, _)| reduced[*d])
        .map(|(_, &s)| s)
        .product();

    let src = a.to_vec::<f32>()?;
    let mut acc = vec![0.0f32; out_len];

    for (lin, &v) in src.iter().enumerate() {
        // Decompose the input index and zero the reduced coordinates
        let mut rem = lin;
        let mut out_idx = 0usize;
        let mut out_stride = 1usize;
        for d in (0..ndim).rev() {
            let i = rem % shape[d];
            rem /= shape[d];
            if !reduced[d] {
                out_idx += i * out_stride;
            }
            out_stride *= kept_shape[d];
        }
        acc[out_idx] += v;
    }

    if mean && count > 0 {
        let inv = 1.0 / count as f32;
        for v in acc.iter_mut() {
            *v *= inv;
        }
    }

    let out = Tensor::from_vec(acc, &kept_shape)?;
    if keepdim {
        Ok(out)
    } else {
        let final_shape: Vec<usize> = shape
            .iter()
            .enumerate()
            .filter(|(d, _)| !reduced[*d])
            .map(|(_, &s)| s)
            .collect();
        out.reshape(&final_shape)
    }
}
