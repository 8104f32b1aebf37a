//! Softmax and log-softmax

use super::Tensor;
use crate::dtype::DType;
use crate::error::{Error, Result};

impl Tensor {
    /// Softmax along a dimension (supports negative indexing)
    ///
    /// Stabilized by subtracting the per-slice maximum before exponentiation.
    pub fn softmax(&self, dim: isize) -> Result<Tensor> {
        softmax_impl(self, dim, false)
    }

    /// Log-softmax along a dimension (supports negative indexing)
    ///
    /// Computed as `x - max - ln(sum(exp(x - max)))`, which avoids the
    /// underflow of `ln(softmax(x))` for very negative logits.
    pub fn log_softmax(&self, dim: isize) -> Result<Tensor> {
        softmax_impl(self, dim, true)
    }
}

fn softmax_impl(a: &Tensor, dim: isize, log: bool) -> Result<Tensor> {
    if a.dtype() != DType::F32 {
        return Err(Error::unsupported_dtype(a.dtype(), "softmax"));
    }
    let ndim = a.ndim();
    let dim_idx = a
        .layout()
        .normalize_dim(dim)
        .ok_or(Error::InvalidDimension { dim, ndim })?;

    let shape = a.shape().to_vec();
    let outer_size: usize = shape[..dim_idx].iter().product();
    let dim_size = shape[dim_idx];
    let inner_size: usize = shape[dim_idx + 1..].iter().product();

    let src = a.to_vec::<f32>()?;
    let mut out = vec![0.0f32; src.len()];

    for o in 0..outer_size {
        for i in 0..inner_size {
            let base = o * dim_size * inner_size + i;
            let at = |k: usize| base + k * inner_size;

            let mut max = f32::NEG_INFINITY;
            for k in 0..dim_size {
                max = max.max(src[at(k)]);
            }

            let mut sum = 0.0f32;
            for k in 0..dim_size {
                sum += (src[at(k)] - max).exp();
            }

            if log {
                let log_sum = sum.ln();
                for k in 0..dim_size {
                    out[at(k)] = src[at(k)] - max - log_sum;
                }
            } else {
                let inv = 1.0 / sum;
                for k in 0..dim_size {
                    out[at(k)] = (src[at(k)] - max).exp() * inv;
                }
            }
        }
    }

    Tensor::from_vec(out, &shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 0.0, 0.0, 0.0], &[2, 3]);
        let s = a.softmax(-1).unwrap();
        let v = s.to_vec::<f32>().unwrap();
        assert!(close(v[0] + v[1] + v[2], 1.0));
        assert!(close(v[3], 1.0 / 3.0));
        assert!(v[0] < v[1] && v[1] < v[2]);
    }

    #[test]
    fn test_log_softmax_matches_ln_softmax() {
        let a = Tensor::from_slice(&[0.5f32, -1.0, 2.0], &[1, 3]);
        let ls = a.log_softmax(-1).unwrap().to_vec::<f32>().unwrap();
        let s = a.softmax(-1).unwrap().to_vec::<f32>().unwrap();
        for (l, p) in ls.iter().zip(s.iter()) {
            assert!(close(*l, p.ln()));
        }
    }

    #[test]
    fn test_softmax_large_logits_stable() {
        let a = Tensor::from_slice(&[1000.0f32, 1000.0], &[1, 2]);
        let s = a.softmax(-1).unwrap().to_vec::<f32>().unwrap();
        assert!(close(s[0], 0.5) && close(s[1], 0.5));
    }
}
