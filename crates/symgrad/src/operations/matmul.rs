//! Matrix multiplication through faer's GEMM kernel.

use faer::linalg::matmul::matmul as faer_matmul;
use faer::{Accum, Par};

use crate::backend::AsFaerMat;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Rows and columns of a rank-2 tensor.
///
/// # Errors
///
/// Returns `TensorError::RankMismatch` for any other rank.
pub fn matrix_dims<ElT: Scalar>(tensor: &Tensor<ElT>) -> Result<(usize, usize), TensorError> {
    match tensor.shape() {
        &[rows, cols] => Ok((rows, cols)),
        other => Err(TensorError::RankMismatch {
            expected: 2,
            actual: other.len(),
        }),
    }
}

/// Matrix product `C = A * B` of an `m x k` and a `k x n` tensor.
///
/// # Errors
///
/// Returns `TensorError::RankMismatch` if either operand is not a matrix
/// and `TensorError::ShapeMismatch` if the inner dimensions differ.
///
/// # Example
///
/// ```
/// use symgrad::Tensor;
/// use symgrad::operations::matmul;
///
/// let a = Tensor::<f64>::ones(&[2, 3]);
/// let b = Tensor::<f64>::ones(&[3, 4]);
/// let c = matmul(&a, &b).unwrap();
/// assert_eq!(c.shape(), &[2, 4]);
/// assert_eq!(c.data(), &[3.0; 8]);
/// ```
pub fn matmul<ElT: Scalar>(a: &Tensor<ElT>, b: &Tensor<ElT>) -> Result<Tensor<ElT>, TensorError> {
    let (m, k) = matrix_dims(a)?;
    let (k_b, n) = matrix_dims(b)?;
    if k != k_b {
        return Err(TensorError::ShapeMismatch {
            expected: k,
            actual: k_b,
        });
    }

    let mut c = Tensor::<ElT>::zeros(&[m, n]);
    {
        let a_mat = a.as_faer_mat(m, k)?;
        let b_mat = b.as_faer_mat(k, n)?;
        let mut c_mat = c.as_faer_mat_mut(m, n)?;

        // C = alpha * A * B, overwriting C
        faer_matmul(
            c_mat.as_mut(),
            Accum::Replace,
            a_mat,
            b_mat,
            ElT::one(),
            Par::Seq,
        );
    }
    Ok(c)
}
