//! Tensor operations backing the op rules.

mod elementwise;
mod matmul;
mod permutedims;
mod reduce;

pub use elementwise::{
    add, apply, apply_binary, apply_binary_into, apply_inplace, broadcast_shape, check_divisor,
    div, mul, neg, scale, sub,
};
pub use matmul::{matmul, matrix_dims};
pub use permutedims::{permutedims, transpose};
pub use reduce::{sum, sum_to};
