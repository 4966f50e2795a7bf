//! Variable construction: leaves and op applications.

use crate::error::GraphError;
use crate::graph::{Graph, Variable};
use crate::ops::Op;
use crate::tensor::Tensor;

impl Graph {
    /// Leaf with an explicit shape, bound to zeros.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::DuplicateVariable` if `name` is taken.
    pub fn var(&mut self, name: &str, shape: &[usize]) -> Result<Variable, GraphError> {
        self.add_leaf(name, Some(shape.to_vec()), Some(Tensor::zeros(shape)))
    }

    /// Leaf bound to `value`; its shape is fixed to the value's shape.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::DuplicateVariable` if `name` is taken.
    pub fn var_with_value(&mut self, name: &str, value: Tensor) -> Result<Variable, GraphError> {
        let shape = value.shape().to_vec();
        self.add_leaf(name, Some(shape), Some(value))
    }

    /// Unbound leaf with a known shape.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::DuplicateVariable` if `name` is taken.
    pub fn var_with_shape(&mut self, name: &str, shape: &[usize]) -> Result<Variable, GraphError> {
        self.add_leaf(name, Some(shape.to_vec()), None)
    }

    /// Unbound leaf whose shape is fixed by the value assigned later.
    ///
    /// Ops over a placeholder defer shape validation until the shape is
    /// known.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::DuplicateVariable` if `name` is taken.
    pub fn placeholder(&mut self, name: &str) -> Result<Variable, GraphError> {
        self.add_leaf(name, None, None)
    }

    /// Apply any op to variables.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::ArityMismatch`, `GraphError::ShapeMismatch` or
    /// `GraphError::UnknownVariable`; nothing is registered on failure.
    ///
    /// ```
    /// use symgrad::{Graph, Op};
    ///
    /// let mut g = Graph::new();
    /// let x = g.var("x", &[3]).unwrap();
    /// let y = g.apply_op(Op::AddScalar(1.0), &[&x]).unwrap();
    /// assert_eq!(y.name(), "add_scalar(x)");
    /// ```
    pub fn apply_op(&mut self, op: Op, inputs: &[&Variable]) -> Result<Variable, GraphError> {
        self.add_op(op, inputs, false)
    }

    /// [`Graph::apply_op`] registering the result as `name`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::DuplicateVariable` if `name` is taken, plus the
    /// errors of [`Graph::apply_op`]; nothing is registered on failure.
    ///
    /// ```
    /// use symgrad::{Graph, Op};
    ///
    /// let mut g = Graph::new();
    /// let x = g.var("x", &[3]).unwrap();
    /// let w = g.var("w", &[3]).unwrap();
    /// let y = g.apply_op_named("y", Op::Mul, &[&x, &w]).unwrap();
    /// assert_eq!(g.variable("y"), Some(y));
    /// ```
    pub fn apply_op_named(
        &mut self,
        name: &str,
        op: Op,
        inputs: &[&Variable],
    ) -> Result<Variable, GraphError> {
        self.add_named_op(Some(name), op, inputs, false)
    }
}

macro_rules! impl_binary_op {
    ($variant: ident, $fname: ident, $fname_inplace: ident, $doc: literal) => {
        impl Graph {
            #[doc = $doc]
            ///
            /// Shapes must match unless one operand holds a single element.
            ///
            /// # Errors
            ///
            /// Returns `GraphError::ShapeMismatch` or
            /// `GraphError::UnknownVariable`; nothing is registered on
            /// failure.
            pub fn $fname(&mut self, lhs: &Variable, rhs: &Variable) -> Result<Variable, GraphError> {
                self.add_op(Op::$variant, &[lhs, rhs], false)
            }

            #[doc = concat!("[`Graph::", stringify!($fname), "`] that may reuse `lhs`'s buffer when evaluated.")]
            ///
            /// # Errors
            ///
            #[doc = concat!("Same as [`Graph::", stringify!($fname), "`].")]
            pub fn $fname_inplace(
                &mut self,
                lhs: &Variable,
                rhs: &Variable,
            ) -> Result<Variable, GraphError> {
                self.add_op(Op::$variant, &[lhs, rhs], true)
            }
        }
    };
}

impl_binary_op!(Add, add, addi, "Elementwise `lhs + rhs`.");
impl_binary_op!(Sub, sub, subi, "Elementwise `lhs - rhs`.");
impl_binary_op!(Mul, mul, muli, "Elementwise `lhs * rhs`.");
impl_binary_op!(Div, div, divi, "Elementwise `lhs / rhs`.");
impl_binary_op!(RSub, rsub, rsubi, "Elementwise `rhs - lhs`.");
impl_binary_op!(RDiv, rdiv, rdivi, "Elementwise `rhs / lhs`.");

macro_rules! impl_scalar_op {
    ($variant: ident, $fname: ident, $fname_inplace: ident, $doc: literal) => {
        impl Graph {
            #[doc = $doc]
            ///
            /// # Errors
            ///
            /// Returns `GraphError::UnknownVariable`.
            pub fn $fname(&mut self, x: &Variable, scalar: f64) -> Result<Variable, GraphError> {
                self.add_op(Op::$variant(scalar), &[x], false)
            }

            #[doc = concat!("[`Graph::", stringify!($fname), "`] that may reuse `x`'s buffer when evaluated.")]
            ///
            /// # Errors
            ///
            /// Returns `GraphError::UnknownVariable`.
            pub fn $fname_inplace(&mut self, x: &Variable, scalar: f64) -> Result<Variable, GraphError> {
                self.add_op(Op::$variant(scalar), &[x], true)
            }
        }
    };
}

impl_scalar_op!(AddScalar, add_scalar, addi_scalar, "Elementwise `x + scalar`.");
impl_scalar_op!(SubScalar, sub_scalar, subi_scalar, "Elementwise `x - scalar`.");
impl_scalar_op!(MulScalar, mul_scalar, muli_scalar, "Elementwise `x * scalar`.");
impl_scalar_op!(DivScalar, div_scalar, divi_scalar, "Elementwise `x / scalar`.");
impl_scalar_op!(RSubScalar, rsub_scalar, rsubi_scalar, "Elementwise `scalar - x`.");
impl_scalar_op!(RDivScalar, rdiv_scalar, rdivi_scalar, "Elementwise `scalar / x`.");

macro_rules! impl_unary_op {
    ($variant: ident, $fname: ident, $doc: literal) => {
        impl Graph {
            #[doc = $doc]
            ///
            /// # Errors
            ///
            /// Returns `GraphError::UnknownVariable`.
            pub fn $fname(&mut self, x: &Variable) -> Result<Variable, GraphError> {
                self.add_op(Op::$variant, &[x], false)
            }
        }
    };
}

impl_unary_op!(Neg, neg, "Elementwise negation.");
impl_unary_op!(Sin, sin, "Elementwise sine.");
impl_unary_op!(Cos, cos, "Elementwise cosine.");
impl_unary_op!(Exp, exp, "Elementwise exponential.");
impl_unary_op!(Log, log, "Elementwise natural logarithm.");
impl_unary_op!(Tanh, tanh, "Elementwise hyperbolic tangent.");
impl_unary_op!(Square, square, "Elementwise square.");
impl_unary_op!(Transpose, transpose, "Reverse the order of all dimensions.");
impl_unary_op!(Sum, sum, "Sum of all elements, shape `[1]`.");
impl_unary_op!(OnesLike, ones_like, "Ones with the shape of `x`; a constant for differentiation.");
impl_unary_op!(ZerosLike, zeros_like, "Zeros with the shape of `x`; a constant for differentiation.");

impl Graph {
    /// Matrix product of two rank-2 variables.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::ShapeMismatch` if the inner dimensions differ or
    /// an operand is not a matrix.
    pub fn mmul(&mut self, lhs: &Variable, rhs: &Variable) -> Result<Variable, GraphError> {
        self.add_op(Op::MMul, &[lhs, rhs], false)
    }

    /// `1.0` where `x != scalar`, `0.0` elsewhere. Not differentiable.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownVariable`.
    pub fn scalar_not_equals(&mut self, x: &Variable, scalar: f64) -> Result<Variable, GraphError> {
        self.add_op(Op::ScalarNotEquals(scalar), &[x], false)
    }

    /// `1.0` where `x <= scalar`, `0.0` elsewhere. Not differentiable.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownVariable`.
    pub fn scalar_less_than_or_equal(
        &mut self,
        x: &Variable,
        scalar: f64,
    ) -> Result<Variable, GraphError> {
        self.add_op(Op::ScalarLessThanOrEqual(scalar), &[x], false)
    }
}
