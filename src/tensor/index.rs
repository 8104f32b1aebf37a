//! Indexing: gather along a dimension with integer indices

use super::Tensor;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};

impl Tensor {
    /// Gather values along a dimension
    ///
    /// `out[i0, ..., ik, ...] = self[i0, ..., index[i0, ..., ik, ...], ...]`
    /// with the index substituted at `dim`. The index tensor must be I64, have
    /// the same rank as `self`, and match `self`'s shape on every other
    /// dimension. This is the label-lookup primitive behind sparse cross
    /// entropy: `probs.gather(1, labels.unsqueeze(-1))`.
    pub fn gather(&self, dim: isize, index: &Tensor) -> Result<Tensor> {
        let d = self
            .layout()
            .normalize_dim(dim)
            .ok_or(Error::InvalidDimension {
                dim,
                ndim: self.ndim(),
            })?;

        if index.dtype() != DType::I64 {
            return Err(Error::unsupported_dtype(index.dtype(), "gather index"));
        }
        if index.ndim() != self.ndim() {
            return Err(Error::shape_mismatch(self.shape(), index.shape()));
        }
        for (dd, (&s, &i)) in self.shape().iter().zip(index.shape().iter()).enumerate() {
            if dd != d && s != i {
                return Err(Error::shape_mismatch(self.shape(), index.shape()));
            }
        }

        let idx = index.to_vec::<i64>()?;
        match self.dtype() {
            DType::F32 => {
                let out = gather_kernel::<f32>(&self.to_vec()?, self.shape(), d, &idx, index.shape())?;
                Tensor::from_vec(out, index.shape())
            }
            DType::I64 => {
                let out = gather_kernel::<i64>(&self.to_vec()?, self.shape(), d, &idx, index.shape())?;
                Tensor::from_vec(out, index.shape())
            }
        }
    }
}

fn gather_kernel<T: Element>(
    src: &[T],
    src_shape: &[usize],
    dim: usize,
    idx: &[i64],
    idx_shape: &[usize],
) -> Result<Vec<T>> {
    let ndim = src_shape.len();
    let mut out = Vec::with_capacity(idx.len());

    for (lin, &raw) in idx.iter().enumerate() {
        if raw < 0 || raw as usize >= src_shape[dim] {
            return Err(Error::IndexOutOfBounds {
                index: raw.max(0) as usize,
                size: src_shape[dim],
            });
        }

        // Decompose the index-tensor coordinate, substitute at `dim`, and
        // recompose against the source strides.
        let mut rem = lin;
        let mut src_idx = 0usize;
        let mut src_stride = 1usize;
        for dd in (0..ndim).rev() {
            let i = rem % idx_shape[dd];
            rem /= idx_shape[dd];
            let coord = if dd == dim { raw as usize } else { i };
            src_idx += coord * src_stride;
            src_stride *= src_shape[dd];
        }
        out.push(src[src_idx]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_rows() {
        // probs [2, 3], labels [2] -> per-example picks
        let p = Tensor::from_slice(&[0.1f32, 0.2, 0.7, 0.6, 0.3, 0.1], &[2, 3]);
        let y = Tensor::from_slice(&[2i64, 0], &[2]).unsqueeze(-1).unwrap();
        let picked = p.gather(1, &y).unwrap();
        assert_eq!(picked.shape(), &[2, 1]);
        let v = picked.to_vec::<f32>().unwrap();
        assert!((v[0] - 0.7).abs() < 1e-6 && (v[1] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_gather_out_of_bounds() {
        let p = Tensor::from_slice(&[0.5f32, 0.5], &[1, 2]);
        let y = Tensor::from_slice(&[5i64], &[1]).unsqueeze(-1).unwrap();
        assert!(matches!(
            p.gather(1, &y),
            Err(Error::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_gather_requires_i64_index() {
        let p = Tensor::from_slice(&[0.5f32, 0.5], &[1, 2]);
        let y = Tensor::from_slice(&[0.0f32], &[1]).unsqueeze(-1).unwrap();
        assert!(p.gather(1, &y).is_err());
    }
}
