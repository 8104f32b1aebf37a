//! Shape operations: roll, flip, and region assignment

use super::Tensor;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use std::ops::Range;

impl Tensor {
    /// Cyclically shift elements along a dimension
    ///
    /// `out[..., i, ...] = self[..., (i - shift) mod n, ...]` - with a
    /// positive shift the last element along `dim` wraps around to the front,
    /// nothing is truncated. A shift that is a multiple of the dimension size
    /// (including any shift on an empty dimension) is the identity.
    pub fn roll(&self, shift: isize, dim: isize) -> Result<Tensor> {
        let d = self
            .layout()
            .normalize_dim(dim)
            .ok_or(Error::InvalidDimension {
                dim,
                ndim: self.ndim(),
            })?;

        match self.dtype() {
            DType::F32 => {
                let out = roll_kernel::<f32>(&self.to_vec()?, self.shape(), d, shift);
                Tensor::from_vec(out, self.shape())
            }
            DType::I64 => {
                let out = roll_kernel::<i64>(&self.to_vec()?, self.shape(), d, shift);
                Tensor::from_vec(out, self.shape())
            }
        }
    }

    /// Reverse the order of elements along a dimension
    pub fn flip(&self, dim: isize) -> Result<Tensor> {
        let d = self
            .layout()
            .normalize_dim(dim)
            .ok_or(Error::InvalidDimension {
                dim,
                ndim: self.ndim(),
            })?;

        match self.dtype() {
            DType::F32 => {
                let out = flip_kernel::<f32>(&self.to_vec()?, self.shape(), d);
                Tensor::from_vec(out, self.shape())
            }
            DType::I64 => {
                let out = flip_kernel::<i64>(&self.to_vec()?, self.shape(), d);
                Tensor::from_vec(out, self.shape())
            }
        }
    }

    /// Return a copy of `self` with the region described by `ranges`
    /// overwritten by `src`
    ///
    /// `ranges` must cover every dimension; `src`'s shape must equal the
    /// range lengths. Used by CutMix to paste the rolled patch.
    pub fn slice_assign(&self, ranges: &[Range<usize>], src: &Tensor) -> Result<Tensor> {
        if ranges.len() != self.ndim() {
            return Err(Error::invalid_argument(
                "ranges",
                format!("expected {} ranges, got {}", self.ndim(), ranges.len()),
            ));
        }
        if self.dtype() != src.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: self.dtype(),
                rhs: src.dtype(),
            });
        }
        let region: Vec<usize> = ranges.iter().map(|r| r.end.saturating_sub(r.start)).collect();
        if src.shape() != region.as_slice() {
            return Err(Error::shape_mismatch(&region, src.shape()));
        }
        for (d, r) in ranges.iter().enumerate() {
            if r.end > self.shape()[d] || r.start > r.end {
                return Err(Error::IndexOutOfBounds {
                    index: r.end,
                    size: self.shape()[d],
                });
            }
        }

        match self.dtype() {
            DType::F32 => {
                let mut dst = self.to_vec::<f32>()?;
                slice_assign_kernel(&mut dst, &src.to_vec::<f32>()?, self.shape(), ranges);
                Tensor::from_vec(dst, self.shape())
            }
            DType::I64 => {
                let mut dst = self.to_vec::<i64>()?;
                slice_assign_kernel(&mut dst, &src.to_vec::<i64>()?, self.shape(), ranges);
                Tensor::from_vec(dst, self.shape())
            }
        }
    }
}

fn roll_kernel<T: Element>(src: &[T], shape: &[usize], dim: usize, shift: isize) -> Vec<T> {
    let n = shape[dim];
    if n == 0 || src.is_empty() {
        return src.to_vec();
    }

    let inner: usize = shape[dim + 1..].iter().product();
    let outer: usize = shape[..dim].iter().product();

    let mut out = Vec::with_capacity(src.len());
    for o in 0..outer {
        for i in 0..n {
            let s = (i as isize - shift).rem_euclid(n as isize) as usize;
            let base = (o * n + s) * inner;
            out.extend_from_slice(&src[base..base + inner]);
        }
    }
    out
}

fn flip_kernel<T: Element>(src: &[T], shape: &[usize], dim: usize) -> Vec<T> {
    let n = shape[dim];
    if n == 0 || src.is_empty() {
        return src.to_vec();
    }

    let inner: usize = shape[dim + 1..].iter().product();
    let outer: usize = shape[..dim].iter().product();

    let mut out = Vec::with_capacity(src.len());
    for o in 0..outer {
        for i in 0..n {
            let base = (o * n + (n - 1 - i)) * inner;
            out.extend_from_slice(&src[base..base + inner]);
        }
    }
    out
}

fn slice_assign_kernel<T: Element>(
    dst: &mut [T],
    src: &[T],
    shape: &[usize],
    ranges: &[Range<usize>],
) {
    let ndim = shape.len();
    let region: Vec<usize> = ranges.iter().map(|r| r.end - r.start).collect();
    let total: usize = region.iter().product();

    for lin in 0..total {
        // Decompose the source index, shift by the range starts, recompose
        // into the destination index.
        let mut rem = lin;
        let mut dst_idx = 0usize;
        let mut dst_stride = 1usize;
        for d in (0..ndim).rev() {
            let i = rem % region[d];
            rem /= region[d];
            dst_idx += (i + ranges[d].start) * dst_stride;
            dst_stride *= shape[d];
        }
        dst[dst_idx] = src[lin];
    }
}
