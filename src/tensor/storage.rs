//! Storage: Arc-shared host memory

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Storage for tensor data in host memory
///
/// Storage wraps a byte buffer with reference counting, enabling zero-copy
/// views (narrow, squeeze, broadcast) that share the underlying allocation.
#[derive(Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    /// Raw bytes; interpretation is governed by `dtype`
    bytes: Vec<u8>,
    /// Number of elements (not bytes)
    len: usize,
    /// Element type
    dtype: DType,
}

impl Storage {
    /// Create zero-initialized storage for `len` elements of `dtype`
    pub fn zeroed(len: usize, dtype: DType) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                bytes: vec![0u8; len * dtype.size_in_bytes()],
                len,
                dtype,
            }),
        }
    }

    /// Create storage from a typed slice; the dtype is inferred from `T`
    pub fn from_slice<T: Element>(data: &[T]) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                bytes: bytemuck::cast_slice(data).to_vec(),
                len: data.len(),
                dtype: T::DTYPE,
            }),
        }
    }

    /// Create storage from an owned typed vector
    pub fn from_vec<T: Element>(data: Vec<T>) -> Self {
        Self::from_slice(&data)
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// True if the storage holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// View the storage as a typed slice
    ///
    /// Errors if `T` does not match the storage dtype.
    pub fn as_slice<T: Element>(&self) -> Result<&[T]> {
        if T::DTYPE != self.inner.dtype {
            return Err(Error::DTypeMismatch {
                lhs: T::DTYPE,
                rhs: self.inner.dtype,
            });
        }
        Ok(bytemuck::cast_slice(&self.inner.bytes))
    }
}
