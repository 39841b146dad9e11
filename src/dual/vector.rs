//! Elementwise vector of dual numbers

use super::DualNumber;
use crate::error::{Error, Result};
use num_traits::Pow;
use paste::paste;
use std::fmt;
use std::ops::{Add, Div, Index, Mul, Neg, Sub};

/// A vector-valued variable carrying one dual number per component
///
/// Every operation on [`DualNumber`] is available elementwise. Scalars and
/// scalar dual numbers broadcast across all components; two vectors pair up
/// elementwise and must have equal length.
///
/// # Example
///
/// ```
/// use adgraph::{DualNumber, DualVector};
///
/// let x = DualVector::new(&[1.0, 2.0], &[1.0, 0.0]).unwrap();
/// let y = x.clone() * DualNumber::constant(3.0);
///
/// assert_eq!(y.real(), vec![3.0, 6.0]);
/// assert_eq!(y.dual(), vec![3.0, 0.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DualVector {
    elems: Vec<DualNumber>,
}

macro_rules! elementwise_unary {
    ($($name:ident),* $(,)?) => {
        $(
            #[doc = concat!("Elementwise [`DualNumber::", stringify!($name), "`]")]
            pub fn $name(&self) -> Self {
                self.map(DualNumber::$name)
            }
        )*
    };
}

macro_rules! checked_binary {
    ($($name:ident => $f:expr),* $(,)?) => {
        paste! {
            $(
                #[doc = concat!("Elementwise `", stringify!($name), "` with another vector of equal length")]
                pub fn [<checked_ $name>](&self, other: &DualVector) -> Result<DualVector> {
                    self.zip_with(other, $f)
                }
            )*
        }
    };
}

impl DualVector {
    /// Pair up real and dual components
    ///
    /// Fails with [`Error::LengthMismatch`] when the slices differ in length.
    pub fn new(real: &[f64], dual: &[f64]) -> Result<Self> {
        if real.len() != dual.len() {
            return Err(Error::length_mismatch(real.len(), dual.len()));
        }
        Ok(real
            .iter()
            .zip(dual)
            .map(|(&r, &d)| DualNumber::new(r, d))
            .collect())
    }

    /// Wrap existing dual numbers
    pub fn from_duals(elems: Vec<DualNumber>) -> Self {
        Self { elems }
    }

    /// Vector of constants (all derivatives zero)
    pub fn constant(real: &[f64]) -> Self {
        real.iter().copied().map(DualNumber::constant).collect()
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Whether the vector has no components
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Real parts
    pub fn real(&self) -> Vec<f64> {
        self.elems.iter().map(|x| x.real).collect()
    }

    /// Dual parts
    pub fn dual(&self) -> Vec<f64> {
        self.elems.iter().map(|x| x.dual).collect()
    }

    /// Components as a slice
    pub fn as_slice(&self) -> &[DualNumber] {
        &self.elems
    }

    /// Iterate over components
    pub fn iter(&self) -> std::slice::Iter<'_, DualNumber> {
        self.elems.iter()
    }

    /// Apply `f` to every component
    pub fn map(&self, f: impl Fn(DualNumber) -> DualNumber) -> Self {
        self.elems.iter().map(|&x| f(x)).collect()
    }

    /// Combine with `other` component by component
    pub fn zip_with(
        &self,
        other: &DualVector,
        f: impl Fn(DualNumber, DualNumber) -> DualNumber,
    ) -> Result<Self> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        Ok(self
            .elems
            .iter()
            .zip(&other.elems)
            .map(|(&a, &b)| f(a, b))
            .collect())
    }

    checked_binary! {
        add => |a, b| a + b,
        sub => |a, b| a - b,
        mul => |a, b| a * b,
        div => |a, b| a / b,
        pow => |a: DualNumber, b| a.powd(b),
    }

    elementwise_unary!(
        exp, ln, sin, cos, tan, asin, acos, atan, sinh, cosh, tanh, sigmoid, sqrt, recip,
    );

    /// Elementwise [`DualNumber::log_base`]
    pub fn log_base(&self, base: f64) -> Self {
        self.map(|x| x.log_base(base))
    }

    /// Elementwise [`DualNumber::powf`]
    pub fn powf(&self, exponent: f64) -> Self {
        self.map(|x| x.powf(exponent))
    }
}

impl PartialEq for DualVector {
    fn eq(&self, other: &Self) -> bool {
        self.elems == other.elems
    }
}

impl Index<usize> for DualVector {
    type Output = DualNumber;

    fn index(&self, index: usize) -> &DualNumber {
        &self.elems[index]
    }
}

impl FromIterator<DualNumber> for DualVector {
    fn from_iter<I: IntoIterator<Item = DualNumber>>(iter: I) -> Self {
        Self {
            elems: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DualVector {
    type Item = DualNumber;
    type IntoIter = std::vec::IntoIter<DualNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.into_iter()
    }
}

impl<'a> IntoIterator for &'a DualVector {
    type Item = &'a DualNumber;
    type IntoIter = std::slice::Iter<'a, DualNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.iter()
    }
}

impl From<Vec<DualNumber>> for DualVector {
    fn from(elems: Vec<DualNumber>) -> Self {
        Self::from_duals(elems)
    }
}

impl fmt::Display for DualVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "real {:?}, dual {:?}", self.real(), self.dual())
    }
}

impl Neg for DualVector {
    type Output = DualVector;

    fn neg(self) -> DualVector {
        self.map(|x| -x)
    }
}

// Broadcasting a scalar (plain or dual) over every component, in both
// operand orders.
macro_rules! impl_broadcast_op {
    ($trait:ident, $method:ident) => {
        impl $trait<DualNumber> for DualVector {
            type Output = DualVector;

            fn $method(self, rhs: DualNumber) -> DualVector {
                self.map(|x| $trait::$method(x, rhs))
            }
        }

        impl $trait<f64> for DualVector {
            type Output = DualVector;

            fn $method(self, rhs: f64) -> DualVector {
                self.map(|x| $trait::$method(x, rhs))
            }
        }

        impl $trait<DualVector> for DualNumber {
            type Output = DualVector;

            fn $method(self, rhs: DualVector) -> DualVector {
                rhs.map(|x| $trait::$method(self, x))
            }
        }

        impl $trait<DualVector> for f64 {
            type Output = DualVector;

            fn $method(self, rhs: DualVector) -> DualVector {
                rhs.map(|x| $trait::$method(self, x))
            }
        }
    };
}

impl_broadcast_op!(Add, add);
impl_broadcast_op!(Sub, sub);
impl_broadcast_op!(Mul, mul);
impl_broadcast_op!(Div, div);
impl_broadcast_op!(Pow, pow);

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn vector(real: &[f64], dual: &[f64]) -> DualVector {
        DualVector::new(real, dual).unwrap()
    }

    #[test]
    fn test_new_rejects_unequal_parts() {
        let err = DualVector::new(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, Error::length_mismatch(2, 1));
    }

    #[test]
    fn test_elementwise_arithmetic() {
        let x = vector(&[1.0, 2.0], &[1.0, 0.0]);
        let y = vector(&[3.0, 4.0], &[0.0, 1.0]);

        let sum = x.checked_add(&y).unwrap();
        assert_eq!(sum, vector(&[4.0, 6.0], &[1.0, 1.0]));

        let product = x.checked_mul(&y).unwrap();
        assert_eq!(product, vector(&[3.0, 8.0], &[3.0, 2.0]));

        let quotient = x.checked_div(&y).unwrap();
        assert_eq!(quotient.real(), vec![1.0 / 3.0, 0.5]);
    }

    #[test]
    fn test_length_mismatch() {
        let x = vector(&[1.0, 2.0, 3.0], &[0.0; 3]);
        let y = vector(&[1.0, 2.0], &[0.0; 2]);
        assert_eq!(x.checked_sub(&y), Err(Error::length_mismatch(3, 2)));
    }

    #[test]
    fn test_broadcast_scalars() {
        let x = vector(&[1.0, 2.0], &[1.0, 1.0]);

        assert_eq!(x.clone() + 1.0, vector(&[2.0, 3.0], &[1.0, 1.0]));
        assert_eq!(2.0 * x.clone(), vector(&[2.0, 4.0], &[2.0, 2.0]));
        assert_eq!(
            DualNumber::new(3.0, 1.0) * x.clone(),
            vector(&[3.0, 6.0], &[4.0, 5.0])
        );
        assert_eq!(x.clone().pow(2.0), vector(&[1.0, 4.0], &[2.0, 4.0]));
        assert_eq!(-x, vector(&[-1.0, -2.0], &[-1.0, -1.0]));
    }

    #[test]
    fn test_elementary_functions() {
        let x = vector(&[0.0, PI], &[1.0, 1.0]);
        assert_eq!(x.sin(), vector(&[0.0, 0.0], &[1.0, -1.0]));
        assert_eq!(x.cos(), vector(&[1.0, -1.0], &[0.0, 0.0]));
        assert_eq!(x.exp()[0], DualNumber::new(1.0, 1.0));
    }

    #[test]
    fn test_accessors() {
        let x = vector(&[1.0, 2.0], &[3.0, 4.0]);
        assert_eq!(x.len(), 2);
        assert_eq!(x[1], DualNumber::new(2.0, 4.0));
        assert_eq!(x.iter().map(|d| d.dual).sum::<f64>(), 7.0);
        assert_eq!(x.to_string(), "real [1.0, 2.0], dual [3.0, 4.0]");
    }
}
