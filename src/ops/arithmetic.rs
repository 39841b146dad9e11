//! Binary arithmetic operators

use crate::dual::DualNumber;
use crate::error::Result;
use crate::numeric::Numeric;
use std::fmt;

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`
    Div,
    /// `a ** b`
    Pow,
}

impl BinaryOp {
    /// Operation name
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Pow => "pow",
        }
    }

    /// Infix symbol
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
        }
    }

    /// Plain rule
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Pow => a.powf(b),
        }
    }

    /// Dual-number rule
    #[inline]
    pub fn apply_dual(self, a: DualNumber, b: DualNumber) -> DualNumber {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Pow => a.powd(b),
        }
    }

    /// Local partials `(∂/∂a, ∂/∂b)` evaluated at plain operand values
    ///
    /// - add: `(1, 1)`
    /// - sub: `(1, -1)`
    /// - mul: `(b, a)`
    /// - div: `(1/b, -a/b²)`
    /// - pow: `(b·a^(b-1), a^b·ln a)`
    pub fn partials(self, a: &Numeric, b: &Numeric) -> Result<(Numeric, Numeric)> {
        let one = Numeric::Scalar(1.0);
        match self {
            Self::Add => Ok((one.clone(), one)),
            Self::Sub => Ok((one, Numeric::Scalar(-1.0))),
            Self::Mul => Ok((b.clone(), a.clone())),
            Self::Div => {
                let da = one.div(b)?;
                let db = a.neg().div(&b.mul(b)?)?;
                Ok((da, db))
            }
            Self::Pow => {
                let da = b.mul(&a.pow(&b.sub(&one)?)?)?;
                let db = a.pow(b)?.mul(&a.map_real(f64::ln))?;
                Ok((da, db))
            }
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
