//! Operator overloading for expressions
//!
//! Every combination of owned or borrowed expressions works, and plain `f64`
//! constants on either side are folded into the node instead of becoming
//! graph nodes. `**` is spelled [`Pow::pow`].

use super::Expression;
use crate::ops::BinaryOp;
use num_traits::Pow;
use std::ops::{Add, Div, Mul, Neg, Sub};

macro_rules! impl_expr_binary_op {
    ($trait:ident, $method:ident, $op:ident) => {
        impl $trait<Expression> for Expression {
            type Output = Expression;

            fn $method(self, rhs: Expression) -> Expression {
                Expression::binary(BinaryOp::$op, &self, &rhs)
            }
        }

        impl $trait<&Expression> for Expression {
            type Output = Expression;

            fn $method(self, rhs: &Expression) -> Expression {
                Expression::binary(BinaryOp::$op, &self, rhs)
            }
        }

        impl $trait<Expression> for &Expression {
            type Output = Expression;

            fn $method(self, rhs: Expression) -> Expression {
                Expression::binary(BinaryOp::$op, self, &rhs)
            }
        }

        impl $trait<&Expression> for &Expression {
            type Output = Expression;

            fn $method(self, rhs: &Expression) -> Expression {
                Expression::binary(BinaryOp::$op, self, rhs)
            }
        }

        impl $trait<f64> for Expression {
            type Output = Expression;

            fn $method(self, rhs: f64) -> Expression {
                Expression::scalar_rhs(BinaryOp::$op, &self, rhs)
            }
        }

        impl $trait<f64> for &Expression {
            type Output = Expression;

            fn $method(self, rhs: f64) -> Expression {
                Expression::scalar_rhs(BinaryOp::$op, self, rhs)
            }
        }

        impl $trait<Expression> for f64 {
            type Output = Expression;

            fn $method(self, rhs: Expression) -> Expression {
                Expression::scalar_lhs(BinaryOp::$op, self, &rhs)
            }
        }

        impl $trait<&Expression> for f64 {
            type Output = Expression;

            fn $method(self, rhs: &Expression) -> Expression {
                Expression::scalar_lhs(BinaryOp::$op, self, rhs)
            }
        }
    };
}

impl_expr_binary_op!(Add, add, Add);
impl_expr_binary_op!(Sub, sub, Sub);
impl_expr_binary_op!(Mul, mul, Mul);
impl_expr_binary_op!(Div, div, Div);
impl_expr_binary_op!(Pow, pow, Pow);

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        -&self
    }
}

impl Neg for &Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression::function(super::Op::Neg, smallvec::smallvec![self.clone()])
    }
}
