//! Element-wise arithmetic: broadcasting binary ops, scalar ops, unary ops
//!
//! All arithmetic is defined for F32 tensors; integer label tensors only
//! flow through `gather` and `roll`.

use super::{broadcast_shapes, Tensor};
use crate::dtype::DType;
use crate::error::{Error, Result};

/// Binary operation kind
#[derive(Debug, Clone, Copy)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    #[inline]
    fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }
}

impl Tensor {
    /// Element-wise addition with broadcasting: `self + other`
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        binary_op(self, other, BinaryOp::Add, "add")
    }

    /// Element-wise subtraction with broadcasting: `self - other`
    pub fn sub(&self, other: &Tensor) -> Result<Tensor> {
        binary_op(self, other, BinaryOp::Sub, "sub")
    }

    /// Element-wise multiplication with broadcasting: `self * other`
    pub fn mul(&self, other: &Tensor) -> Result<Tensor> {
        binary_op(self, other, BinaryOp::Mul, "mul")
    }

    /// Element-wise division with broadcasting: `self / other`
    pub fn div(&self, other: &Tensor) -> Result<Tensor> {
        binary_op(self, other, BinaryOp::Div, "div")
    }

    /// Add a scalar to every element: `self + scalar`
    pub fn add_scalar(&self, scalar: f64) -> Result<Tensor> {
        self.map_f32("add_scalar", |v| v + scalar as f32)
    }

    /// Subtract a scalar from every element: `self - scalar`
    pub fn sub_scalar(&self, scalar: f64) -> Result<Tensor> {
        self.map_f32("sub_scalar", |v| v - scalar as f32)
    }

    /// Multiply every element by a scalar: `self * scalar`
    pub fn mul_scalar(&self, scalar: f64) -> Result<Tensor> {
        self.map_f32("mul_scalar", |v| v * scalar as f32)
    }

    /// Divide every element by a scalar: `self / scalar`
    pub fn div_scalar(&self, scalar: f64) -> Result<Tensor> {
        self.map_f32("div_scalar", |v| v / scalar as f32)
    }

    /// Negation: `-self`
    pub fn neg(&self) -> Result<Tensor> {
        self.map_f32("neg", |v| -v)
    }

    /// Natural logarithm: `ln(self)`
    pub fn ln(&self) -> Result<Tensor> {
        self.map_f32("ln", f32::ln)
    }

    /// Exponential: `e^self`
    pub fn exp(&self) -> Result<Tensor> {
        self.map_f32("exp", f32::exp)
    }

    /// Square: `self * self`
    pub fn square(&self) -> Result<Tensor> {
        self.map_f32("square", |v| v * v)
    }

    /// Clamp every element into `[min, max]`
    pub fn clamp(&self, min: f64, max: f64) -> Result<Tensor> {
        let (lo, hi) = (min as f32, max as f32);
        self.map_f32("clamp", move |v| v.clamp(lo, hi))
    }

    /// Apply `f` to every element of an F32 tensor
    fn map_f32(&self, op: &'static str, f: impl Fn(f32) -> f32) -> Result<Tensor> {
        if self.dtype() != DType::F32 {
            return Err(Error::unsupported_dtype(self.dtype(), op));
        }
        let data: Vec<f32> = self.to_vec::<f32>()?.into_iter().map(f).collect();
        Tensor::from_vec(data, self.shape())
    }
}

fn binary_op(a: &Tensor, b: &Tensor, op: BinaryOp, name: &'static str) -> Result<Tensor> {
    if a.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            lhs: a.dtype(),
            rhs: b.dtype(),
        });
    }
    if a.dtype() != DType::F32 {
        return Err(Error::unsupported_dtype(a.dtype(), name));
    }

    let out_shape =
        broadcast_shapes(a.shape(), b.shape()).ok_or_else(|| Error::broadcast(a.shape(), b.shape()))?;

    // Materialize both operands through their (possibly stride-0) broadcast
    // views, then apply the kernel over the flat buffers.
    let va = a.broadcast_to(&out_shape)?.to_vec::<f32>()?;
    let vb = b.broadcast_to(&out_shape)?.to_vec::<f32>()?;

    let data: Vec<f32> = va
        .iter()
        .zip(vb.iter())
        .map(|(&x, &y)| op.apply(x, y))
        .collect();

    Tensor::from_vec(data, &out_shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_same_shape() {
        let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3]);
        let b = Tensor::from_slice(&[10.0f32, 20.0, 30.0], &[3]);
        let c = a.add(&b).unwrap();
        assert_eq!(c.to_vec::<f32>().unwrap(), vec![11.0, 22.0, 33.0]);
    }

    #[test]
    fn test_mul_broadcast_scalar_tensor() {
        let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[4]);
        let lam = Tensor::scalar(0.5);
        let c = a.mul(&lam).unwrap();
        assert_eq!(c.to_vec::<f32>().unwrap(), vec![0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_broadcast_incompatible() {
        let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3]);
        let b = Tensor::from_slice(&[1.0f32, 2.0], &[2]);
        assert!(matches!(a.add(&b), Err(Error::BroadcastError { .. })));
    }

    #[test]
    fn test_integer_arithmetic_rejected() {
        let a = Tensor::from_slice(&[1i64, 2], &[2]);
        assert!(matches!(
            a.add_scalar(1.0),
            Err(Error::UnsupportedDType { .. })
        ));
    }

    #[test]
    fn test_clamp() {
        let a = Tensor::from_slice(&[-1.0f32, 0.5, 2.0], &[3]);
        let c = a.clamp(0.0, 1.0).unwrap();
        assert_eq!(c.to_vec::<f32>().unwrap(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_empty_tensor_ops() {
        let a = Tensor::from_slice(&[] as &[f32], &[0]);
        let b = a.add_scalar(1.0).unwrap();
        assert_eq!(b.numel(), 0);
    }
}
