//! Dimension permutation.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::strides::{cartesian_to_linear, linear_to_cartesian};
use crate::tensor::Tensor;

/// Permute the dimensions of a tensor, returning a new tensor.
///
/// `perm[i]` gives the source dimension for the i-th dimension of the
/// result.
///
/// # Errors
///
/// Returns `TensorError::InvalidPermutation` if `perm` is not a
/// permutation of `0..ndim`.
///
/// # Examples
///
/// ```
/// use symgrad::Tensor;
/// use symgrad::operations::permutedims;
///
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// let t2 = permutedims(&t, &[1, 0]).unwrap();
/// assert_eq!(t2.shape(), &[3, 2]);
/// assert_eq!(t.get(&[1, 0]), t2.get(&[0, 1]));
/// ```
pub fn permutedims<ElT: Scalar>(
    tensor: &Tensor<ElT>,
    perm: &[usize],
) -> Result<Tensor<ElT>, TensorError> {
    validate_permutation(perm, tensor.ndim())?;

    let new_shape: Vec<usize> = perm.iter().map(|&p| tensor.shape()[p]).collect();
    let mut result = Tensor::zeros(&new_shape);
    let new_strides = result.strides().to_vec();

    for (linear_old, &value) in tensor.data().iter().enumerate() {
        let old_indices = linear_to_cartesian(linear_old, tensor.shape());
        let new_indices: Vec<usize> = perm.iter().map(|&p| old_indices[p]).collect();
        result.data_mut()[cartesian_to_linear(&new_indices, &new_strides)] = value;
    }

    Ok(result)
}

/// Reverse the order of all dimensions; a matrix transpose for rank 2.
///
/// Rank 0 and rank 1 tensors are returned unchanged.
///
/// # Errors
///
/// Propagates errors from [`permutedims`].
pub fn transpose<ElT: Scalar>(tensor: &Tensor<ElT>) -> Result<Tensor<ElT>, TensorError> {
    if tensor.ndim() < 2 {
        return Ok(tensor.clone());
    }
    let perm: Vec<usize> = (0..tensor.ndim()).rev().collect();
    permutedims(tensor, &perm)
}

fn validate_permutation(perm: &[usize], ndim: usize) -> Result<(), TensorError> {
    let invalid = || TensorError::InvalidPermutation {
        perm: perm.to_vec(),
        ndim,
    };
    if perm.len() != ndim {
        return Err(invalid());
    }
    let mut seen = vec![false; ndim];
    for &p in perm {
        if p >= ndim || seen[p] {
            return Err(invalid());
        }
        seen[p] = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutedims_3d() {
        let mut t: Tensor<f64> = Tensor::zeros(&[2, 3, 4]);
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    t.set(&[i, j, k], (i * 100 + j * 10 + k) as f64).unwrap();
                }
            }
        }

        let t2 = permutedims(&t, &[2, 0, 1]).unwrap();
        assert_eq!(t2.shape(), &[4, 2, 3]);
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    assert_eq!(t.get(&[i, j, k]), t2.get(&[k, i, j]));
                }
            }
        }
    }

    #[test]
    fn test_permutedims_invalid() {
        let t: Tensor<f64> = Tensor::zeros(&[2, 3]);
        assert!(permutedims(&t, &[0]).is_err());
        assert!(permutedims(&t, &[0, 2]).is_err());
        assert!(permutedims(&t, &[0, 0]).is_err());
    }

    #[test]
    fn test_transpose() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        let tt = transpose(&t).unwrap();
        assert_eq!(tt.shape(), &[3, 2]);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(t.get(&[i, j]), tt.get(&[j, i]));
            }
        }
        assert_eq!(transpose(&tt).unwrap(), t);

        let v = Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        assert_eq!(transpose(&v).unwrap(), v);
    }
}
