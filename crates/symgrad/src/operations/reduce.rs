//! Reductions.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::strides::is_scalar_shape;
use crate::tensor::Tensor;

/// Sum of all elements as a one-element tensor of shape `[1]`.
///
/// ```
/// use symgrad::Tensor;
/// use symgrad::operations::sum;
///
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// assert_eq!(sum(&t).data(), &[6.0]);
/// ```
pub fn sum<ElT: Scalar>(tensor: &Tensor<ElT>) -> Tensor<ElT> {
    let total = tensor
        .data()
        .iter()
        .fold(ElT::zero(), |acc, &x| acc + x);
    Tensor::scalar(total)
}

/// Bring `tensor` to `shape` across a one-element broadcast: a copy when
/// the shapes agree, the sum of all elements when `shape` holds one
/// element, and a fill when `tensor` holds one.
///
/// # Errors
///
/// Returns `TensorError::BroadcastMismatch` for any other pair of shapes.
///
/// ```
/// use symgrad::Tensor;
/// use symgrad::operations::sum_to;
///
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// let s = sum_to(&t, &[1, 1]).unwrap();
/// assert_eq!(s.shape(), &[1, 1]);
/// assert_eq!(s.data(), &[6.0]);
/// ```
pub fn sum_to<ElT: Scalar>(
    tensor: &Tensor<ElT>,
    shape: &[usize],
) -> Result<Tensor<ElT>, TensorError> {
    if tensor.shape() == shape {
        Ok(tensor.clone())
    } else if is_scalar_shape(shape) {
        sum(tensor).reshape(shape)
    } else if let [value] = tensor.data() {
        Ok(Tensor::full(shape, *value))
    } else {
        Err(TensorError::BroadcastMismatch {
            lhs: tensor.shape().to_vec(),
            rhs: shape.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_matrix() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let s = sum(&t);
        assert_eq!(s.shape(), &[1]);
        assert_eq!(s.data(), &[10.0]);
    }

    #[test]
    fn test_sum_empty() {
        let t: Tensor<f64> = Tensor::zeros(&[0]);
        assert_eq!(sum(&t).data(), &[0.0]);
    }

    #[test]
    fn test_sum_to() {
        let v = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        assert_eq!(sum_to(&v, &[3]).unwrap(), v);
        assert_eq!(sum_to(&v, &[1]).unwrap().data(), &[6.0]);

        let s = Tensor::from_vec(vec![2.0], &[1, 1]).unwrap();
        let filled = sum_to(&s, &[2, 2]).unwrap();
        assert_eq!(filled.shape(), &[2, 2]);
        assert_eq!(filled.data(), &[2.0; 4]);
        assert_eq!(sum_to(&s, &[1]).unwrap().shape(), &[1]);

        assert!(matches!(
            sum_to(&v, &[2, 2]),
            Err(TensorError::BroadcastMismatch { .. })
        ));
    }
}
