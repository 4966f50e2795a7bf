//! Element-wise tensor operations.
//!
//! Binary operations accept operands of equal shape, or a one-element
//! operand on either side which is broadcast over the other.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Apply a function to each element, returning a new tensor.
///
/// # Example
///
/// ```
/// use symgrad::Tensor;
/// use symgrad::operations::apply;
///
/// let t = Tensor::from_vec(vec![1.0, 4.0, 9.0], &[3]).unwrap();
/// let ts = apply(&t, f64::sqrt);
/// assert_eq!(ts.data(), &[1.0, 2.0, 3.0]);
/// ```
pub fn apply<ElT: Scalar, F>(tensor: &Tensor<ElT>, f: F) -> Tensor<ElT>
where
    F: Fn(ElT) -> ElT,
{
    let mut out = tensor.clone();
    apply_inplace(&mut out, f);
    out
}

/// Apply a function to each element in-place.
pub fn apply_inplace<ElT: Scalar, F>(tensor: &mut Tensor<ElT>, f: F)
where
    F: Fn(ElT) -> ElT,
{
    for x in tensor.data_mut() {
        *x = f(*x);
    }
}

/// Shape of `a ∘ b` under scalar broadcasting.
///
/// A one-element left operand takes the right operand's shape; otherwise
/// the left shape wins.
///
/// # Errors
///
/// Returns `TensorError::BroadcastMismatch` when the shapes differ and
/// neither side holds a single element.
pub fn broadcast_shape<'a>(a: &'a [usize], b: &'a [usize]) -> Result<&'a [usize], TensorError> {
    let count = |s: &[usize]| s.iter().product::<usize>();
    if count(a) == 1 {
        Ok(b)
    } else if a == b || count(b) == 1 {
        Ok(a)
    } else {
        Err(TensorError::BroadcastMismatch {
            lhs: a.to_vec(),
            rhs: b.to_vec(),
        })
    }
}

/// Combine two tensors element-wise.
///
/// # Example
///
/// ```
/// use symgrad::Tensor;
/// use symgrad::operations::apply_binary;
///
/// let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// let b = Tensor::from_vec(vec![4.0, 5.0, 6.0], &[3]).unwrap();
/// let c = apply_binary(&a, &b, |x, y| x + y).unwrap();
/// assert_eq!(c.data(), &[5.0, 7.0, 9.0]);
///
/// // A one-element operand broadcasts.
/// let s = Tensor::scalar(10.0);
/// let d = apply_binary(&s, &a, |x, y| x - y).unwrap();
/// assert_eq!(d.data(), &[9.0, 8.0, 7.0]);
/// ```
pub fn apply_binary<ElT: Scalar, F>(
    a: &Tensor<ElT>,
    b: &Tensor<ElT>,
    f: F,
) -> Result<Tensor<ElT>, TensorError>
where
    F: Fn(ElT, ElT) -> ElT,
{
    let shape = broadcast_shape(a.shape(), b.shape())?;
    let data: Vec<ElT> = if a.len() == b.len() {
        a.data()
            .iter()
            .zip(b.data().iter())
            .map(|(&x, &y)| f(x, y))
            .collect()
    } else if b.is_scalar() {
        let y = b.data()[0];
        a.data().iter().map(|&x| f(x, y)).collect()
    } else {
        let x = a.data()[0];
        b.data().iter().map(|&y| f(x, y)).collect()
    };
    Tensor::from_vec(data, shape)
}

/// Combine `b` into `a`'s buffer when the result keeps `a`'s shape,
/// allocating a fresh tensor otherwise.
///
/// # Errors
///
/// Same as [`apply_binary`].
pub fn apply_binary_into<ElT: Scalar, F>(
    mut a: Tensor<ElT>,
    b: &Tensor<ElT>,
    f: F,
) -> Result<Tensor<ElT>, TensorError>
where
    F: Fn(ElT, ElT) -> ElT,
{
    let keeps_lhs_shape = broadcast_shape(a.shape(), b.shape())? == a.shape();
    if !keeps_lhs_shape {
        return apply_binary(&a, b, f);
    }
    if b.is_scalar() {
        let y = b.data()[0];
        apply_inplace(&mut a, |x| f(x, y));
    } else {
        for (x, &y) in a.data_mut().iter_mut().zip(b.data().iter()) {
            *x = f(*x, y);
        }
    }
    Ok(a)
}

/// Element-wise `a + b`.
pub fn add<ElT: Scalar>(a: &Tensor<ElT>, b: &Tensor<ElT>) -> Result<Tensor<ElT>, TensorError> {
    apply_binary(a, b, |x, y| x + y)
}

/// Element-wise `a - b`.
pub fn sub<ElT: Scalar>(a: &Tensor<ElT>, b: &Tensor<ElT>) -> Result<Tensor<ElT>, TensorError> {
    apply_binary(a, b, |x, y| x - y)
}

/// Element-wise `a * b`.
pub fn mul<ElT: Scalar>(a: &Tensor<ElT>, b: &Tensor<ElT>) -> Result<Tensor<ElT>, TensorError> {
    apply_binary(a, b, |x, y| x * y)
}

/// Element-wise `a / b`.
///
/// # Errors
///
/// Returns `TensorError::DivisionByZero` if any element of `b` is zero.
pub fn div<ElT: Scalar>(a: &Tensor<ElT>, b: &Tensor<ElT>) -> Result<Tensor<ElT>, TensorError> {
    check_divisor(b)?;
    apply_binary(a, b, |x, y| x / y)
}

/// Element-wise negation.
pub fn neg<ElT: Scalar>(tensor: &Tensor<ElT>) -> Tensor<ElT> {
    apply(tensor, |x| -x)
}

/// Multiply all elements by a scalar, returning a new tensor.
///
/// ```
/// use symgrad::Tensor;
/// use symgrad::operations::scale;
///
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// assert_eq!(scale(&t, 2.0).data(), &[2.0, 4.0, 6.0]);
/// ```
pub fn scale<ElT: Scalar>(tensor: &Tensor<ElT>, alpha: ElT) -> Tensor<ElT> {
    apply(tensor, |x| x * alpha)
}

/// Fail if `divisor` holds a zero element.
///
/// # Errors
///
/// Returns `TensorError::DivisionByZero` with the offending linear index.
pub fn check_divisor<ElT: Scalar>(divisor: &Tensor<ElT>) -> Result<(), TensorError> {
    match divisor.data().iter().position(Scalar::is_exact_zero) {
        Some(index) => Err(TensorError::DivisionByZero { index }),
        None => Ok(()),
    }
}
