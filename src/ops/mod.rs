//! Primitive operations
//!
//! Every primitive exists in two representations: a plain `f64` rule used by
//! reverse-mode propagation, and a [`DualNumber`](crate::DualNumber) rule used
//! by forward mode. Operations take a [`Numeric`](crate::Numeric) operand and
//! pick the rule from its variant, so expression nodes never need to know
//! which mode is evaluating them.
//!
//! ```text
//! Numeric::Scalar / Vector         ──► f64 rule, elementwise
//! Numeric::Dual / DualVector       ──► DualNumber rule, elementwise
//! ```

mod arithmetic;
mod elementary;

pub use arithmetic::BinaryOp;
pub use elementary::{
    arccos, arcsin, arctan, cos, cosh, exp, log, log_base, sigmoid, sin, sinh, sqrt, tan, tanh,
    Elementary,
};
