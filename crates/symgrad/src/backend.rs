//! Zero-copy views of tensors as faer matrices.
//!
//! Both `Tensor` and faer use column-major storage, so a rank-2 tensor's
//! buffer can be handed to faer's kernels without copying.

use faer::{MatMut, MatRef};

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Extension trait for viewing tensor data as faer matrices.
pub trait AsFaerMat<T: Scalar> {
    /// View the data as an immutable `rows x cols` matrix.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if `rows * cols` differs from
    /// the element count.
    fn as_faer_mat(&self, rows: usize, cols: usize) -> Result<MatRef<'_, T>, TensorError>;

    /// View the data as a mutable `rows x cols` matrix.
    ///
    /// # Errors
    ///
    /// Same as [`AsFaerMat::as_faer_mat`].
    fn as_faer_mat_mut(&mut self, rows: usize, cols: usize)
    -> Result<MatMut<'_, T>, TensorError>;
}

fn check_view(len: usize, rows: usize, cols: usize) -> Result<(), TensorError> {
    if rows * cols == len {
        Ok(())
    } else {
        Err(TensorError::ShapeMismatch {
            expected: len,
            actual: rows * cols,
        })
    }
}

impl<T: Scalar> AsFaerMat<T> for Tensor<T> {
    fn as_faer_mat(&self, rows: usize, cols: usize) -> Result<MatRef<'_, T>, TensorError> {
        check_view(self.len(), rows, cols)?;
        Ok(MatRef::from_column_major_slice(self.data(), rows, cols))
    }

    fn as_faer_mat_mut(
        &mut self,
        rows: usize,
        cols: usize,
    ) -> Result<MatMut<'_, T>, TensorError> {
        check_view(self.len(), rows, cols)?;
        Ok(MatMut::from_column_major_slice_mut(
            self.data_mut(),
            rows,
            cols,
        ))
    }
}
