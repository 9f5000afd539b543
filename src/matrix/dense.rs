//! Owned row-major dense buffer.

use crate::error::{BenchError, Result};

/// A `height × width` row-major buffer that owns its storage.
///
/// Element `(r, c)` lives at flat offset `r * width + c`. The buffer never
/// reallocates after construction and is never copied implicitly: use
/// [`Matrix::deep_copy`] for an independent duplicate and [`Matrix::take`]
/// to move the storage out, leaving an empty buffer behind.
#[derive(Debug, PartialEq)]
pub struct Matrix<T = f32> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Default for Matrix<T> {
    fn default() -> Self {
        Matrix {
            data: Vec::new(),
            width: 0,
            height: 0,
        }
    }
}

impl<T: Copy + Default> Matrix<T> {
    /// Allocates a zero-filled (`T::default()`) buffer of `width * height`
    /// elements.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::OutOfMemory`] if the element count overflows
    /// or the allocator refuses the request.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(BenchError::OutOfMemory { requested: usize::MAX })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| BenchError::OutOfMemory { requested: len })?;
        data.resize(len, T::default());

        Ok(Matrix {
            data,
            width,
            height,
        })
    }

    /// Allocates a column vector of `len` elements (width 1).
    pub fn column(len: usize) -> Result<Self> {
        Self::new(1, len)
    }

    /// Builds a matrix from row slices. All rows must share one length.
    pub fn from_rows(rows: &[&[T]]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(BenchError::shape(
                "from_rows",
                format!("row {bad} has {} elements, expected {width}", rows[bad].len()),
            ));
        }

        let mut m = Self::new(width, height)?;
        for (dst, row) in m.data.chunks_exact_mut(width.max(1)).zip(rows) {
            dst.copy_from_slice(row);
        }
        Ok(m)
    }

    /// Allocates new storage and duplicates every element.
    pub fn deep_copy(&self) -> Result<Self> {
        let mut copy = Self::new(self.width, self.height)?;
        copy.data.copy_from_slice(&self.data);
        Ok(copy)
    }

    /// Bounds-unchecked read of element `(r, c)`.
    ///
    /// # Safety
    ///
    /// Caller must ensure `r < height` and `c < width`.
    #[inline(always)]
    pub unsafe fn read(&self, r: usize, c: usize) -> T {
        unsafe { *self.data.get_unchecked(r * self.width + c) }
    }
}

impl<T> Matrix<T> {
    /// Bounds-unchecked mutable access to element `(r, c)`.
    ///
    /// # Safety
    ///
    /// Caller must ensure `r < height` and `c < width`.
    #[inline(always)]
    pub unsafe fn access(&mut self, r: usize, c: usize) -> &mut T {
        let idx = r * self.width + c;
        unsafe { self.data.get_unchecked_mut(idx) }
    }

    /// Checked counterpart of [`Matrix::read`].
    pub fn get(&self, r: usize, c: usize) -> Option<&T> {
        if r < self.height && c < self.width {
            self.data.get(r * self.width + c)
        } else {
            None
        }
    }

    /// Checked counterpart of [`Matrix::access`].
    pub fn get_mut(&mut self, r: usize, c: usize) -> Option<&mut T> {
        if r < self.height && c < self.width {
            self.data.get_mut(r * self.width + c)
        } else {
            None
        }
    }

    /// Moves the storage into a new owner and leaves `self` empty (0×0, no
    /// backing allocation). Taking from an empty buffer returns another
    /// empty buffer.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total element count, always `width * height`.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether backing storage is currently held.
    pub fn has_storage(&self) -> bool {
        self.data.capacity() != 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}
