//! Runtime values flowing through expression evaluation
//!
//! Forward mode evaluates every node on dual numbers while reverse mode
//! evaluates on plain reals. [`Numeric`] holds either representation so a
//! single operator implementation serves both passes: the operation matches
//! on the variant instead of inspecting types at runtime.
//!
//! [`Value`] is the plain subset used for caller-facing inputs, seeds and
//! gradients.

use crate::dual::{DualNumber, DualVector};
use crate::error::{Error, Result};
use crate::ops::BinaryOp;
use std::fmt;

/// A value in either the plain or the dual representation
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    /// Plain scalar
    Scalar(f64),
    /// Plain vector
    Vector(Vec<f64>),
    /// Scalar carrying a derivative
    Dual(DualNumber),
    /// Vector carrying one derivative per component
    DualVector(DualVector),
}

impl Numeric {
    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Vector(_) => "vector",
            Self::Dual(_) => "dual number",
            Self::DualVector(_) => "dual vector",
        }
    }

    /// Number of components (1 for scalars)
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) | Self::Dual(_) => 1,
            Self::Vector(v) => v.len(),
            Self::DualVector(v) => v.len(),
        }
    }

    /// Whether the value has no components
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the value carries derivatives
    pub fn is_dual(&self) -> bool {
        matches!(self, Self::Dual(_) | Self::DualVector(_))
    }

    /// Real parts as a flat vector
    pub fn real_part(&self) -> Vec<f64> {
        match self {
            Self::Scalar(x) => vec![*x],
            Self::Vector(v) => v.clone(),
            Self::Dual(d) => vec![d.real],
            Self::DualVector(v) => v.real(),
        }
    }

    /// Dual parts as a flat vector (zeros for plain values)
    pub fn dual_part(&self) -> Vec<f64> {
        match self {
            Self::Scalar(_) => vec![0.0],
            Self::Vector(v) => vec![0.0; v.len()],
            Self::Dual(d) => vec![d.dual],
            Self::DualVector(v) => v.dual(),
        }
    }

    /// Drop the derivative, keeping the shape
    pub fn to_value(&self) -> Value {
        match self {
            Self::Scalar(x) => Value::Scalar(*x),
            Self::Vector(v) => Value::Vector(v.clone()),
            Self::Dual(d) => Value::Scalar(d.real),
            Self::DualVector(v) => Value::Vector(v.real()),
        }
    }

    /// Plain ones with the same shape
    pub fn ones_like(&self) -> Numeric {
        match self {
            Self::Scalar(_) | Self::Dual(_) => Self::Scalar(1.0),
            Self::Vector(_) | Self::DualVector(_) => Self::Vector(vec![1.0; self.len()]),
        }
    }

    /// Apply a unary operation, choosing the plain or dual rule by variant
    pub fn map(
        &self,
        plain: impl Fn(f64) -> f64,
        dual: impl Fn(DualNumber) -> DualNumber,
    ) -> Numeric {
        match self {
            Self::Scalar(x) => Self::Scalar(plain(*x)),
            Self::Vector(v) => Self::Vector(v.iter().map(|&x| plain(x)).collect()),
            Self::Dual(d) => Self::Dual(dual(*d)),
            Self::DualVector(v) => Self::DualVector(v.map(dual)),
        }
    }

    /// Apply a plain function to the real parts, discarding derivatives
    pub fn map_real(&self, f: impl Fn(f64) -> f64) -> Numeric {
        match self.to_value() {
            Value::Scalar(x) => Self::Scalar(f(x)),
            Value::Vector(v) => Self::Vector(v.into_iter().map(f).collect()),
        }
    }

    /// Negate
    pub fn neg(&self) -> Numeric {
        self.map(|x| -x, |d| -d)
    }

    /// Combine with `rhs` under `op`
    ///
    /// Plain scalars lift to constant dual numbers and plain vectors to
    /// constant dual vectors. Scalars broadcast over vectors. A scalar dual
    /// number cannot be combined with a plain vector.
    pub fn binary(&self, op: BinaryOp, rhs: &Numeric) -> Result<Numeric> {
        let f = |a: DualNumber, b: DualNumber| op.apply_dual(a, b);
        let value = match (self, rhs) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(op.apply(*a, *b)),
            (Self::Scalar(a), Self::Vector(v)) => {
                Self::Vector(v.iter().map(|&b| op.apply(*a, b)).collect())
            }
            (Self::Vector(v), Self::Scalar(b)) => {
                Self::Vector(v.iter().map(|&a| op.apply(a, *b)).collect())
            }
            (Self::Vector(u), Self::Vector(v)) => {
                if u.len() != v.len() {
                    return Err(Error::length_mismatch(u.len(), v.len()));
                }
                Self::Vector(u.iter().zip(v).map(|(&a, &b)| op.apply(a, b)).collect())
            }
            (Self::Dual(a), Self::Dual(b)) => Self::Dual(f(*a, *b)),
            (Self::Dual(a), Self::Scalar(b)) => Self::Dual(f(*a, DualNumber::constant(*b))),
            (Self::Scalar(a), Self::Dual(b)) => Self::Dual(f(DualNumber::constant(*a), *b)),
            (Self::DualVector(u), Self::DualVector(v)) => Self::DualVector(u.zip_with(v, f)?),
            (Self::DualVector(u), Self::Dual(b)) => Self::DualVector(u.map(|a| f(a, *b))),
            (Self::Dual(a), Self::DualVector(v)) => Self::DualVector(v.map(|b| f(*a, b))),
            (Self::DualVector(u), Self::Scalar(b)) => {
                let b = DualNumber::constant(*b);
                Self::DualVector(u.map(|a| f(a, b)))
            }
            (Self::Scalar(a), Self::DualVector(v)) => {
                let a = DualNumber::constant(*a);
                Self::DualVector(v.map(|b| f(a, b)))
            }
            (Self::DualVector(u), Self::Vector(v)) => {
                Self::DualVector(u.zip_with(&DualVector::constant(v), f)?)
            }
            (Self::Vector(u), Self::DualVector(v)) => {
                Self::DualVector(DualVector::constant(u).zip_with(v, f)?)
            }
            (Self::Dual(_), Self::Vector(_)) | (Self::Vector(_), Self::Dual(_)) => {
                return Err(Error::unsupported_operand(
                    op.name(),
                    self.kind(),
                    rhs.kind(),
                ))
            }
        };
        Ok(value)
    }

    /// `self + rhs`
    pub fn add(&self, rhs: &Numeric) -> Result<Numeric> {
        self.binary(BinaryOp::Add, rhs)
    }

    /// `self - rhs`
    pub fn sub(&self, rhs: &Numeric) -> Result<Numeric> {
        self.binary(BinaryOp::Sub, rhs)
    }

    /// `self * rhs`
    pub fn mul(&self, rhs: &Numeric) -> Result<Numeric> {
        self.binary(BinaryOp::Mul, rhs)
    }

    /// `self / rhs`
    pub fn div(&self, rhs: &Numeric) -> Result<Numeric> {
        self.binary(BinaryOp::Div, rhs)
    }

    /// `self ** rhs`
    pub fn pow(&self, rhs: &Numeric) -> Result<Numeric> {
        self.binary(BinaryOp::Pow, rhs)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(x) => write!(f, "{x}"),
            Self::Vector(v) => write!(f, "{v:?}"),
            Self::Dual(d) => write!(f, "{d}"),
            Self::DualVector(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for Numeric {
    fn from(x: f64) -> Self {
        Self::Scalar(x)
    }
}

impl From<Vec<f64>> for Numeric {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(v)
    }
}

impl From<DualNumber> for Numeric {
    fn from(d: DualNumber) -> Self {
        Self::Dual(d)
    }
}

impl From<DualVector> for Numeric {
    fn from(v: DualVector) -> Self {
        Self::DualVector(v)
    }
}

impl From<Value> for Numeric {
    fn from(v: Value) -> Self {
        match v {
            Value::Scalar(x) => Self::Scalar(x),
            Value::Vector(v) => Self::Vector(v),
        }
    }
}

/// A plain scalar or vector supplied by or returned to the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Single number
    Scalar(f64),
    /// Ordered components
    Vector(Vec<f64>),
}

impl Value {
    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Vector(_) => "vector",
        }
    }

    /// Number of components (1 for scalars)
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Vector(v) => v.len(),
        }
    }

    /// Whether the value has no components
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zeros with the same shape
    pub fn zeros_like(&self) -> Value {
        match self {
            Self::Scalar(_) => Self::Scalar(0.0),
            Self::Vector(v) => Self::Vector(vec![0.0; v.len()]),
        }
    }

    /// Components as a flat vector
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Self::Scalar(x) => vec![*x],
            Self::Vector(v) => v.clone(),
        }
    }

    /// The scalar, if this is one
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(x) => Some(*x),
            Self::Vector(_) => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Scalar(0.0)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Scalar(x)
    }
}

// Integer literals convert to scalars; widths beyond 2^53 round.
macro_rules! impl_value_from_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(x: $t) -> Self {
                    Self::Scalar(x as f64)
                }
            }
        )*
    };
}

impl_value_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(v)
    }
}

impl From<&[f64]> for Value {
    fn from(v: &[f64]) -> Self {
        Self::Vector(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(v: [f64; N]) -> Self {
        Self::Vector(v.to_vec())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(x) => write!(f, "{x}"),
            Self::Vector(v) => write!(f, "{v:?}"),
        }
    }
}
