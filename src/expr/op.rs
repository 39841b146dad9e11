//! Operations attached to function nodes

use crate::error::{Error, Result};
use crate::numeric::Numeric;
use crate::ops::{BinaryOp, Elementary};
use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::sync::Arc;

/// Local partials of one node, one entry per operand
pub type Partials = SmallVec<[Numeric; 2]>;

/// User-defined differentiable function
///
/// `eval` receives dual operands during forward-mode evaluation and plain
/// operands during reverse-mode propagation; building the result with
/// [`Numeric`] arithmetic handles both. `partials` is only called on plain
/// operands and must return one local partial per operand.
///
/// # Example
///
/// ```
/// use adgraph::prelude::*;
/// use std::sync::Arc;
///
/// struct Cube;
///
/// impl CustomOp for Cube {
///     fn name(&self) -> &str {
///         "cube"
///     }
///
///     fn eval(&self, args: &[Numeric]) -> adgraph::Result<Numeric> {
///         args[0].mul(&args[0])?.mul(&args[0])
///     }
///
///     fn partials(&self, args: &[Numeric]) -> adgraph::Result<Vec<Numeric>> {
///         Ok(vec![Numeric::Scalar(3.0).mul(&args[0].mul(&args[0])?)?])
///     }
/// }
///
/// let x = Expression::variable("x", Mode::Reverse);
/// let f = Expression::custom(Arc::new(Cube), &[x]).unwrap();
/// let out = f.evaluate(2.0).unwrap();
/// assert_eq!(out.derivative("x"), Some(vec![12.0]));
/// ```
pub trait CustomOp: Send + Sync {
    /// Name used when displaying the expression
    fn name(&self) -> &str;

    /// Evaluate on plain or dual operands
    fn eval(&self, args: &[Numeric]) -> Result<Numeric>;

    /// Local partials at plain operand values
    fn partials(&self, args: &[Numeric]) -> Result<Vec<Numeric>>;
}

/// Operation computed by a function node
#[derive(Clone)]
pub enum Op {
    /// Two expression operands
    Binary(BinaryOp),
    /// Expression operand on the left, constant on the right
    ScalarRhs(BinaryOp, f64),
    /// Constant on the left, expression operand on the right
    ScalarLhs(BinaryOp, f64),
    /// Negation
    Neg,
    /// Elementary function
    Elementary(Elementary),
    /// User-defined function
    Custom(Arc<dyn CustomOp>),
}

fn unary(args: &[Numeric]) -> Result<&Numeric> {
    match args {
        [x] => Ok(x),
        _ => Err(Error::Internal(format!(
            "unary operation received {} operands",
            args.len()
        ))),
    }
}

fn binary(args: &[Numeric]) -> Result<(&Numeric, &Numeric)> {
    match args {
        [a, b] => Ok((a, b)),
        _ => Err(Error::Internal(format!(
            "binary operation received {} operands",
            args.len()
        ))),
    }
}

impl Op {
    /// Operation name
    pub fn name(&self) -> &str {
        match self {
            Self::Binary(op) | Self::ScalarRhs(op, _) | Self::ScalarLhs(op, _) => op.name(),
            Self::Neg => "neg",
            Self::Elementary(e) => e.name(),
            Self::Custom(op) => op.name(),
        }
    }

    /// Number of expression operands, if fixed
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Binary(_) => Some(2),
            Self::ScalarRhs(..) | Self::ScalarLhs(..) | Self::Neg | Self::Elementary(_) => Some(1),
            Self::Custom(_) => None,
        }
    }

    /// Apply to evaluated operands
    pub fn eval(&self, args: &[Numeric]) -> Result<Numeric> {
        match self {
            Self::Binary(op) => {
                let (a, b) = binary(args)?;
                a.binary(*op, b)
            }
            Self::ScalarRhs(op, k) => unary(args)?.binary(*op, &Numeric::Scalar(*k)),
            Self::ScalarLhs(op, k) => Numeric::Scalar(*k).binary(*op, unary(args)?),
            Self::Neg => Ok(unary(args)?.neg()),
            Self::Elementary(e) => Ok(e.apply(unary(args)?)),
            Self::Custom(op) => op.eval(args),
        }
    }

    /// Local partials with respect to each operand, at plain operand values
    pub fn partials(&self, args: &[Numeric]) -> Result<Partials> {
        match self {
            Self::Binary(op) => {
                let (a, b) = binary(args)?;
                let (da, db) = op.partials(a, b)?;
                Ok(smallvec![da, db])
            }
            Self::ScalarRhs(op, k) => {
                let x = unary(args)?;
                let d = match op {
                    BinaryOp::Add | BinaryOp::Sub => Numeric::Scalar(1.0),
                    BinaryOp::Mul => Numeric::Scalar(*k),
                    BinaryOp::Div => Numeric::Scalar(1.0 / *k),
                    BinaryOp::Pow => op.partials(x, &Numeric::Scalar(*k))?.0,
                };
                Ok(smallvec![d])
            }
            Self::ScalarLhs(op, k) => {
                let x = unary(args)?;
                let d = match op {
                    BinaryOp::Add => Numeric::Scalar(1.0),
                    BinaryOp::Sub => Numeric::Scalar(-1.0),
                    BinaryOp::Mul => Numeric::Scalar(*k),
                    BinaryOp::Div | BinaryOp::Pow => op.partials(&Numeric::Scalar(*k), x)?.1,
                };
                Ok(smallvec![d])
            }
            Self::Neg => {
                unary(args)?;
                Ok(smallvec![Numeric::Scalar(-1.0)])
            }
            Self::Elementary(e) => Ok(smallvec![e.partial(unary(args)?)]),
            Self::Custom(op) => {
                let partials = op.partials(args)?;
                if partials.len() != args.len() {
                    return Err(Error::invalid_argument(
                        "partials",
                        format!(
                            "custom op '{}' returned {} partials for {} operands",
                            op.name(),
                            partials.len(),
                            args.len()
                        ),
                    ));
                }
                Ok(partials.into_iter().collect())
            }
        }
    }
}

impl PartialEq for Op {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::ScalarRhs(a, j), Self::ScalarRhs(b, k))
            | (Self::ScalarLhs(a, j), Self::ScalarLhs(b, k)) => a == b && j == k,
            (Self::Neg, Self::Neg) => true,
            (Self::Elementary(a), Self::Elementary(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary(op) => write!(f, "Binary({op:?})"),
            Self::ScalarRhs(op, k) => write!(f, "ScalarRhs({op:?}, {k})"),
            Self::ScalarLhs(op, k) => write!(f, "ScalarLhs({op:?}, {k})"),
            Self::Neg => f.write_str("Neg"),
            Self::Elementary(e) => write!(f, "Elementary({e:?})"),
            Self::Custom(op) => write!(f, "Custom({})", op.name()),
        }
    }
}
