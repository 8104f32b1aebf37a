//! Core Tensor type

use super::{Layout, Storage};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use std::fmt;

/// N-dimensional array in host memory
///
/// `Tensor` consists of:
/// - **Storage**: reference-counted buffer
/// - **Layout**: shape, strides, and offset defining the view into storage
/// - **DType**: element type (determined at runtime)
///
/// View operations (`reshape`, `narrow`, `squeeze`, `unsqueeze`) share the
/// underlying storage; compute operations allocate fresh contiguous outputs.
#[derive(Clone)]
pub struct Tensor {
    /// Shared buffer
    storage: Storage,
    /// Shape, strides, offset
    layout: Layout,
}

impl Tensor {
    /// Create a tensor from storage and layout
    pub fn from_parts(storage: Storage, layout: Layout) -> Self {
        Self { storage, layout }
    }

    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape`
    /// dimensions. For a fallible alternative, use [`Self::try_from_slice`].
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize]) -> Self {
        Self::try_from_slice(data, shape).expect("Tensor::from_slice failed")
    }

    /// Create a tensor from a slice of data (fallible version)
    ///
    /// Returns an error if `data.len()` does not equal the product of the
    /// `shape` dimensions.
    pub fn try_from_slice<T: Element>(data: &[T], shape: &[usize]) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        Ok(Self {
            storage: Storage::from_slice(data),
            layout: Layout::contiguous(shape),
        })
    }

    /// Create a tensor from an owned vector of data
    pub fn from_vec<T: Element>(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        Ok(Self {
            storage: Storage::from_vec(data),
            layout: Layout::contiguous(shape),
        })
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        let len: usize = shape.iter().product();
        Self {
            storage: Storage::zeroed(len, dtype),
            layout: Layout::contiguous(shape),
        }
    }

    /// Create a tensor filled with ones
    pub fn ones(shape: &[usize], dtype: DType) -> Self {
        Self::full_scalar(shape, dtype, 1.0)
    }

    /// Create a tensor filled with a scalar value
    ///
    /// The scalar is converted to the target dtype.
    pub fn full_scalar(shape: &[usize], dtype: DType, value: f64) -> Self {
        let len: usize = shape.iter().product();
        let storage = match dtype {
            DType::F32 => Storage::from_vec(vec![value as f32; len]),
            DType::I64 => Storage::from_vec(vec![value as i64; len]),
        };
        Self {
            storage,
            layout: Layout::contiguous(shape),
        }
    }

    /// Create a rank-1 scalar holder of shape `[1]`
    ///
    /// The convention for per-batch coefficients such as the MixUp lambda.
    pub fn scalar(value: f32) -> Self {
        Self::from_slice(&[value], &[1])
    }

    // ===== Accessors =====

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Check if the tensor is contiguous in memory
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Get size along a dimension (supports negative indexing)
    pub fn size(&self, dim: isize) -> Option<usize> {
        self.layout.dim(dim)
    }

    // ===== View Operations (Zero-Copy) =====

    /// Reshape to a new shape (zero-copy, requires contiguous)
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        let new_layout = self.layout.reshape(shape).ok_or(Error::NotContiguous)?;

        Ok(Self {
            storage: self.storage.clone(),
            layout: new_layout,
        })
    }

    /// Flatten to 1D (zero-copy, requires contiguous)
    pub fn flatten(&self) -> Result<Self> {
        self.reshape(&[self.numel()])
    }

    /// Remove dimensions of size 1
    pub fn squeeze(&self, dim: Option<isize>) -> Self {
        Self {
            storage: self.storage.clone(),
            layout: self.layout.squeeze(dim),
        }
    }

    /// Add a dimension of size 1
    pub fn unsqueeze(&self, dim: isize) -> Result<Self> {
        let new_layout = self
            .layout
            .unsqueeze(dim)
            .ok_or_else(|| Error::InvalidDimension {
                dim,
                ndim: self.ndim(),
            })?;

        Ok(Self {
            storage: self.storage.clone(),
            layout: new_layout,
        })
    }

    /// Narrow a dimension to `[start, start + length)` (zero-copy slice)
    pub fn narrow(&self, dim: isize, start: usize, length: usize) -> Result<Self> {
        let d = self
            .layout
            .normalize_dim(dim)
            .ok_or_else(|| Error::InvalidDimension {
                dim,
                ndim: self.ndim(),
            })?;
        let new_layout =
            self.layout
                .narrow(d, start, length)
                .ok_or_else(|| Error::IndexOutOfBounds {
                    index: start + length,
                    size: self.shape()[d],
                })?;

        Ok(Self {
            storage: self.storage.clone(),
            layout: new_layout,
        })
    }

    /// Broadcast to a target shape (zero-copy, stride-0 on expanded dims)
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self> {
        let new_layout = self
            .layout
            .broadcast_to(shape)
            .ok_or_else(|| Error::broadcast(self.shape(), shape))?;

        Ok(Self {
            storage: self.storage.clone(),
            layout: new_layout,
        })
    }

    // ===== Materialization =====

    /// Return a contiguous tensor, copying only if this view is strided
    pub fn contiguous(&self) -> Result<Self> {
        if self.is_contiguous() {
            return Ok(self.clone());
        }
        match self.dtype() {
            DType::F32 => {
                let data = gather_view::<f32>(self.storage.as_slice()?, &self.layout);
                Tensor::from_vec(data, self.shape())
            }
            DType::I64 => {
                let data = gather_view::<i64>(self.storage.as_slice()?, &self.layout);
                Tensor::from_vec(data, self.shape())
            }
        }
    }

    /// Copy the elements out into a `Vec`, in row-major order
    ///
    /// Errors if `T` does not match the tensor dtype.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        let src = self.storage.as_slice::<T>()?;
        if self.is_contiguous() {
            let start = self.layout.offset();
            return Ok(src[start..start + self.numel()].to_vec());
        }
        Ok(gather_view(src, &self.layout))
    }

    /// Extract the single element of a one-element tensor as f64
    pub fn scalar_value(&self) -> Result<f64> {
        if self.numel() != 1 {
            return Err(Error::shape_mismatch(&[1], self.shape()));
        }
        let off = self.layout.offset();
        match self.dtype() {
            DType::F32 => Ok(self.storage.as_slice::<f32>()?[off] as f64),
            DType::I64 => Ok(self.storage.as_slice::<i64>()?[off] as f64),
        }
    }
}

/// Copy a (possibly strided) view into a freshly allocated row-major vector
fn gather_view<T: Element>(src: &[T], layout: &Layout) -> Vec<T> {
    let n = layout.elem_count();
    let shape = layout.shape();
    let strides = layout.strides();
    let ndim = layout.ndim();

    let mut out = Vec::with_capacity(n);
    for lin in 0..n {
        let mut rem = lin;
        let mut off = layout.offset() as isize;
        for d in (0..ndim).rev() {
            let i = rem % shape[d];
            rem /= shape[d];
            off += i as isize * strides[d];
        }
        out.push(src[off as usize]);
    }
    out
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tensor {{ shape: {:?}, dtype: {:?} }}",
            self.shape(),
            self.dtype()
        )
    }
}
