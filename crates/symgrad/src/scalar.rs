//! Scalar trait for tensor element types.

use faer_traits::ComplexField;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Trait for scalar types a [`Tensor`](crate::Tensor) can hold.
///
/// Extends faer's `ComplexField` (required by the matmul kernel) with the
/// arithmetic the elementwise operations rely on. Graph values are `f64`.
pub trait Scalar:
    ComplexField
    + Copy
    + Debug
    + Default
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self;

    /// Whether this value is exactly zero.
    fn is_exact_zero(&self) -> bool {
        *self == Self::zero()
    }
}

impl Scalar for f64 {
    fn one() -> Self {
        1.0
    }
}
