//! Dense 2D numeric arrays with type erasure.
//!
//! A smaller sibling of the attribute system for data that is not tied to
//! mesh elements: owned arrays ([`DenseArray`]), borrowed views
//! ([`ArrayView`], [`ArrayViewMut`]), and a closed type-erased form
//! ([`ErasedArray`]). All variants are storage-order agnostic (row- or
//! column-major) and support row gathering, including weighted gathers used
//! for barycentric/interpolated resampling.

use rayon::prelude::*;

use crate::error::{AttribError, Result};
use crate::scalar::{Scalar, ScalarTag};

/// An owned rows x cols array of scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseArray<T: Scalar> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
    row_major: bool,
}

impl<T: Scalar> DenseArray<T> {
    /// Zero-filled row-major array.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::zeros_with_order(rows, cols, true)
    }

    /// Zero-filled array with an explicit storage order.
    pub fn zeros_with_order(rows: usize, cols: usize, row_major: bool) -> Self {
        Self {
            data: vec![T::ZERO; rows * cols],
            rows,
            cols,
            row_major,
        }
    }

    /// Adopt a flat buffer. The length must equal `rows * cols`.
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize, row_major: bool) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(AttribError::Shape(format!(
                "buffer of {} entries cannot form a {rows} x {cols} array",
                data.len()
            )));
        }
        Ok(Self {
            data,
            rows,
            cols,
            row_major,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_row_major(&self) -> bool {
        self.row_major
    }

    pub fn get(&self, r: usize, c: usize) -> T {
        self.view().get(r, c)
    }

    pub fn set(&mut self, r: usize, c: usize, value: T) {
        assert!(r < self.rows && c < self.cols, "index out of bounds");
        let idx = if self.row_major {
            r * self.cols + c
        } else {
            c * self.rows + r
        };
        self.data[idx] = value;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Resize to a new shape. Contents are zeroed, matching a destructive
    /// reallocation; the storage order is kept.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        if rows == self.rows && cols == self.cols {
            return;
        }
        self.data = vec![T::ZERO; rows * cols];
        self.rows = rows;
        self.cols = cols;
    }

    /// Borrowed read-only view.
    pub fn view(&self) -> ArrayView<'_, T> {
        ArrayView {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
            row_major: self.row_major,
        }
    }

    /// Gather rows by explicit index list.
    pub fn row_slice(&self, row_indices: &[usize]) -> Self {
        self.view().row_slice(row_indices)
    }

    /// Gather `num_rows` rows; `mapping` returns the input row for each
    /// output row.
    pub fn row_slice_with(&self, num_rows: usize, mapping: impl Fn(usize) -> usize + Sync) -> Self {
        self.view().row_slice_with(num_rows, mapping)
    }

    /// Build `num_rows` rows as weighted sums of input rows; `mapping`
    /// fills `(input_row, weight)` entries for each output row.
    pub fn row_slice_weighted(
        &self,
        num_rows: usize,
        mapping: impl Fn(usize, &mut Vec<(usize, f64)>) + Sync,
    ) -> Self {
        self.view().row_slice_weighted(num_rows, mapping)
    }
}

/// Borrowed read-only 2D view over a flat scalar slice.
#[derive(Debug, Clone, Copy)]
pub struct ArrayView<'a, T: Scalar> {
    data: &'a [T],
    rows: usize,
    cols: usize,
    row_major: bool,
}

impl<'a, T: Scalar> ArrayView<'a, T> {
    /// Wrap a flat slice. The length must equal `rows * cols`.
    pub fn new(data: &'a [T], rows: usize, cols: usize, row_major: bool) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(AttribError::Shape(format!(
                "buffer of {} entries cannot form a {rows} x {cols} array",
                data.len()
            )));
        }
        Ok(Self {
            data,
            rows,
            cols,
            row_major,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_row_major(&self) -> bool {
        self.row_major
    }

    pub fn get(&self, r: usize, c: usize) -> T {
        assert!(r < self.rows && c < self.cols, "index out of bounds");
        let idx = if self.row_major {
            r * self.cols + c
        } else {
            c * self.rows + r
        };
        self.data[idx]
    }

    pub fn as_slice(&self) -> &[T] {
        self.data
    }

    /// Views cannot reallocate; any shape change is an error.
    pub fn resize(&self, rows: usize, cols: usize) -> Result<()> {
        if rows != self.rows || cols != self.cols {
            return Err(AttribError::Shape(
                "cannot resize a borrowed array view".into(),
            ));
        }
        Ok(())
    }

    /// Copy into an owned array of the same shape and storage order.
    pub fn to_owned(&self) -> DenseArray<T> {
        DenseArray {
            data: self.data.to_vec(),
            rows: self.rows,
            cols: self.cols,
            row_major: self.row_major,
        }
    }

    pub fn row_slice(&self, row_indices: &[usize]) -> DenseArray<T> {
        self.row_slice_with(row_indices.len(), |i| row_indices[i])
    }

    /// Gather `num_rows` rows in parallel; each output row is written by
    /// exactly one task.
    pub fn row_slice_with(
        &self,
        num_rows: usize,
        mapping: impl Fn(usize) -> usize + Sync,
    ) -> DenseArray<T> {
        let cols = self.cols;
        let mut out = vec![T::ZERO; num_rows * cols];
        out.par_chunks_mut(cols.max(1))
            .enumerate()
            .for_each(|(i, row)| {
                let src = mapping(i);
                for (c, slot) in row.iter_mut().enumerate() {
                    *slot = self.get(src, c);
                }
            });
        finish_gather(out, num_rows, cols, self.row_major)
    }

    /// Weighted gather: each output row is the weighted sum of input rows,
    /// accumulated in `f64`. Integral targets round to nearest (ties away
    /// from zero) before casting back. Scratch buffers are thread-local and
    /// merged implicitly by the disjoint output partition.
    pub fn row_slice_weighted(
        &self,
        num_rows: usize,
        mapping: impl Fn(usize, &mut Vec<(usize, f64)>) + Sync,
    ) -> DenseArray<T> {
        let cols = self.cols;
        let mut out = vec![T::ZERO; num_rows * cols];
        out.par_chunks_mut(cols.max(1))
            .enumerate()
            .for_each_init(
                || (Vec::new(), vec![0.0f64; cols]),
                |(entries, acc), (i, row)| {
                    entries.clear();
                    acc.fill(0.0);
                    mapping(i, entries);
                    for &(src, weight) in entries.iter() {
                        for (c, slot) in acc.iter_mut().enumerate() {
                            *slot += self.get(src, c).to_f64() * weight;
                        }
                    }
                    for (c, slot) in row.iter_mut().enumerate() {
                        *slot = T::from_f64(acc[c]);
                    }
                },
            );
        finish_gather(out, num_rows, cols, self.row_major)
    }
}

/// Borrowed mutable 2D view over a flat scalar slice.
#[derive(Debug)]
pub struct ArrayViewMut<'a, T: Scalar> {
    data: &'a mut [T],
    rows: usize,
    cols: usize,
    row_major: bool,
}

impl<'a, T: Scalar> ArrayViewMut<'a, T> {
    /// Wrap a flat mutable slice. The length must equal `rows * cols`.
    pub fn new(data: &'a mut [T], rows: usize, cols: usize, row_major: bool) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(AttribError::Shape(format!(
                "buffer of {} entries cannot form a {rows} x {cols} array",
                data.len()
            )));
        }
        Ok(Self {
            data,
            rows,
            cols,
            row_major,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_row_major(&self) -> bool {
        self.row_major
    }

    pub fn get(&self, r: usize, c: usize) -> T {
        self.as_view().get(r, c)
    }

    pub fn set(&mut self, r: usize, c: usize, value: T) {
        assert!(r < self.rows && c < self.cols, "index out of bounds");
        let idx = if self.row_major {
            r * self.cols + c
        } else {
            c * self.rows + r
        };
        self.data[idx] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Views cannot reallocate; any shape change is an error.
    pub fn resize(&self, rows: usize, cols: usize) -> Result<()> {
        self.as_view().resize(rows, cols)
    }

    pub fn as_view(&self) -> ArrayView<'_, T> {
        ArrayView {
            data: self.data,
            rows: self.rows,
            cols: self.cols,
            row_major: self.row_major,
        }
    }

    pub fn to_owned(&self) -> DenseArray<T> {
        self.as_view().to_owned()
    }
}

/// Gathered data is produced row-major; restore the source storage order if
/// it was column-major.
fn finish_gather<T: Scalar>(
    data: Vec<T>,
    rows: usize,
    cols: usize,
    row_major: bool,
) -> DenseArray<T> {
    if row_major {
        return DenseArray {
            data,
            rows,
            cols,
            row_major,
        };
    }
    let mut transposed = vec![T::ZERO; data.len()];
    for r in 0..rows {
        for c in 0..cols {
            transposed[c * rows + r] = data[r * cols + c];
        }
    }
    DenseArray {
        data: transposed,
        rows,
        cols,
        row_major,
    }
}

/// A type-erased dense array over the closed scalar set.
#[derive(Debug, Clone)]
pub enum ErasedArray {
    Int8(DenseArray<i8>),
    Int16(DenseArray<i16>),
    Int32(DenseArray<i32>),
    Int64(DenseArray<i64>),
    UInt8(DenseArray<u8>),
    UInt16(DenseArray<u16>),
    UInt32(DenseArray<u32>),
    UInt64(DenseArray<u64>),
    Float32(DenseArray<f32>),
    Float64(DenseArray<f64>),
}

macro_rules! dispatch {
    ($self:expr, $array:ident => $body:expr) => {
        match $self {
            ErasedArray::Int8($array) => $body,
            ErasedArray::Int16($array) => $body,
            ErasedArray::Int32($array) => $body,
            ErasedArray::Int64($array) => $body,
            ErasedArray::UInt8($array) => $body,
            ErasedArray::UInt16($array) => $body,
            ErasedArray::UInt32($array) => $body,
            ErasedArray::UInt64($array) => $body,
            ErasedArray::Float32($array) => $body,
            ErasedArray::Float64($array) => $body,
        }
    };
}

impl ErasedArray {
    pub fn scalar_tag(&self) -> ScalarTag {
        match self {
            ErasedArray::Int8(_) => ScalarTag::Int8,
            ErasedArray::Int16(_) => ScalarTag::Int16,
            ErasedArray::Int32(_) => ScalarTag::Int32,
            ErasedArray::Int64(_) => ScalarTag::Int64,
            ErasedArray::UInt8(_) => ScalarTag::UInt8,
            ErasedArray::UInt16(_) => ScalarTag::UInt16,
            ErasedArray::UInt32(_) => ScalarTag::UInt32,
            ErasedArray::UInt64(_) => ScalarTag::UInt64,
            ErasedArray::Float32(_) => ScalarTag::Float32,
            ErasedArray::Float64(_) => ScalarTag::Float64,
        }
    }

    pub fn rows(&self) -> usize {
        dispatch!(self, array => array.rows())
    }

    pub fn cols(&self) -> usize {
        dispatch!(self, array => array.cols())
    }

    pub fn is_row_major(&self) -> bool {
        dispatch!(self, array => array.is_row_major())
    }

    /// Downcast to the typed array, checking the stored tag.
    pub fn downcast_ref<T: Scalar>(&self) -> Result<&DenseArray<T>> {
        T::array_ref(self).ok_or_else(|| {
            AttribError::Lookup(format!(
                "array downcast to {} but stored value type is {}",
                T::TAG,
                self.scalar_tag()
            ))
        })
    }

    /// Mutable downcast to the typed array, checking the stored tag.
    pub fn downcast_mut<T: Scalar>(&mut self) -> Result<&mut DenseArray<T>> {
        let tag = self.scalar_tag();
        T::array_mut(self).ok_or_else(|| {
            AttribError::Lookup(format!(
                "array downcast to {} but stored value type is {tag}",
                T::TAG
            ))
        })
    }
}

impl<T: Scalar> From<DenseArray<T>> for ErasedArray {
    fn from(array: DenseArray<T>) -> Self {
        T::erase_array(array)
    }
}
