//! Scalar dual number

use num_traits::{One, Pow, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Closeness rule used when comparing dual numbers
///
/// Two reals `a` and `b` are close when `|a - b| <= atol + rtol * |b|`.
/// Chains of trig and exp operations accumulate rounding error, so dual
/// numbers compare through this rule rather than bit equality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
}

impl Tolerance {
    /// Create a tolerance from relative and absolute bounds
    pub const fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// Check whether `a` is close to `b`
    #[inline]
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        a == b || (a - b).abs() <= self.atol + self.rtol * b.abs()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(1e-5, 1e-8)
    }
}

/// A value paired with its derivative along a seed direction
///
/// # Example
///
/// ```
/// use adgraph::DualNumber;
///
/// // f(x) = x² + 2x at x = 3
/// let x = DualNumber::variable(3.0);
/// let f = x * x + 2.0 * x;
///
/// assert_eq!(f.real, 15.0);
/// assert_eq!(f.dual, 8.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DualNumber {
    /// The primal value
    pub real: f64,
    /// The derivative along the seed direction
    pub dual: f64,
}

impl DualNumber {
    /// Create a dual number with explicit value and derivative
    #[inline]
    pub const fn new(real: f64, dual: f64) -> Self {
        Self { real, dual }
    }

    /// Create a constant (derivative = 0)
    #[inline]
    pub const fn constant(real: f64) -> Self {
        Self::new(real, 0.0)
    }

    /// Create a variable (derivative = 1)
    #[inline]
    pub const fn variable(real: f64) -> Self {
        Self::new(real, 1.0)
    }

    /// Compare against `other` with a custom tolerance
    pub fn is_close_with(&self, other: &Self, tol: Tolerance) -> bool {
        tol.is_close(self.real, other.real) && tol.is_close(self.dual, other.dual)
    }

    /// Reciprocal: `1/(a, b) = (1/a, -b/a²)`
    pub fn recip(self) -> Self {
        Self::new(1.0 / self.real, -self.dual / (self.real * self.real))
    }

    /// Power with a dual exponent
    ///
    /// For base `(a, b)` and exponent `(c, d)` the result is
    /// `(a^c, b·c·a^(c-1) + d·a^c·ln a)`, which equals
    /// `a^c · (d·ln a + b·c/a)` for `a ≠ 0`. A term whose tangent factor
    /// (`b` or `d`) is zero contributes nothing, so a constant exponent
    /// never evaluates `ln a`.
    pub fn powd(self, exponent: Self) -> Self {
        let (a, b) = (self.real, self.dual);
        let (c, d) = (exponent.real, exponent.dual);
        let real = a.powf(c);

        let mut dual = 0.0;
        if b != 0.0 {
            dual += b * c * a.powf(c - 1.0);
        }
        if d != 0.0 {
            dual += d * real * a.ln();
        }
        Self::new(real, dual)
    }

    /// Power with a constant exponent
    pub fn powf(self, exponent: f64) -> Self {
        self.powd(Self::constant(exponent))
    }

    /// Constant base raised to a dual exponent: `k^(a, b) = (k^a, ln k · k^a · b)`
    pub fn rpow(base: f64, exponent: Self) -> Self {
        Self::constant(base).powd(exponent)
    }

    /// `exp(a, b) = (e^a, b·e^a)`
    pub fn exp(self) -> Self {
        let e = self.real.exp();
        Self::new(e, self.dual * e)
    }

    /// Natural logarithm: `ln(a, b) = (ln a, b/a)`
    pub fn ln(self) -> Self {
        Self::new(self.real.ln(), self.dual / self.real)
    }

    /// Logarithm in base `base`: `(ln a / ln k, b / (a·ln k))`
    pub fn log_base(self, base: f64) -> Self {
        let ln_k = base.ln();
        Self::new(self.real.ln() / ln_k, self.dual / (self.real * ln_k))
    }

    /// `sin(a, b) = (sin a, b·cos a)`
    pub fn sin(self) -> Self {
        Self::new(self.real.sin(), self.dual * self.real.cos())
    }

    /// `cos(a, b) = (cos a, -b·sin a)`
    pub fn cos(self) -> Self {
        Self::new(self.real.cos(), -self.dual * self.real.sin())
    }

    /// `tan(a, b) = (tan a, b / cos² a)`
    pub fn tan(self) -> Self {
        let c = self.real.cos();
        Self::new(self.real.tan(), self.dual / (c * c))
    }

    /// `arcsin(a, b) = (asin a, b / √(1 - a²))`
    pub fn asin(self) -> Self {
        let a = self.real;
        Self::new(a.asin(), self.dual / (1.0 - a * a).sqrt())
    }

    /// `arccos(a, b) = (acos a, -b / √(1 - a²))`
    pub fn acos(self) -> Self {
        let a = self.real;
        Self::new(a.acos(), -self.dual / (1.0 - a * a).sqrt())
    }

    /// `arctan(a, b) = (atan a, b / (1 + a²))`
    pub fn atan(self) -> Self {
        let a = self.real;
        Self::new(a.atan(), self.dual / (1.0 + a * a))
    }

    /// `sinh(a, b) = (sinh a, b·cosh a)`
    pub fn sinh(self) -> Self {
        Self::new(self.real.sinh(), self.dual * self.real.cosh())
    }

    /// `cosh(a, b) = (cosh a, b·sinh a)`
    pub fn cosh(self) -> Self {
        Self::new(self.real.cosh(), self.dual * self.real.sinh())
    }

    /// `tanh(a, b) = (tanh a, b·(1 - tanh² a))`
    pub fn tanh(self) -> Self {
        let t = self.real.tanh();
        Self::new(t, self.dual * (1.0 - t * t))
    }

    /// Logistic sigmoid: with `s = 1/(1 + e^-a)`, `(s, b·s·(1 - s))`
    pub fn sigmoid(self) -> Self {
        let s = 1.0 / (1.0 + (-self.real).exp());
        Self::new(s, self.dual * s * (1.0 - s))
    }

    /// `sqrt(a, b) = (√a, b / (2√a))`
    pub fn sqrt(self) -> Self {
        let r = self.real.sqrt();
        Self::new(r, self.dual * 0.5 / r)
    }
}

impl PartialEq for DualNumber {
    fn eq(&self, other: &Self) -> bool {
        self.is_close_with(other, Tolerance::default())
    }
}

impl approx::AbsDiffEq for DualNumber {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.real.abs_diff_eq(&other.real, epsilon) && self.dual.abs_diff_eq(&other.dual, epsilon)
    }
}

impl approx::RelativeEq for DualNumber {
    fn default_max_relative() -> f64 {
        f64::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.real.relative_eq(&other.real, epsilon, max_relative)
            && self.dual.relative_eq(&other.dual, epsilon, max_relative)
    }
}

impl fmt::Display for DualNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "real {}, dual {}", self.real, self.dual)
    }
}

impl From<f64> for DualNumber {
    fn from(real: f64) -> Self {
        Self::constant(real)
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

impl Add for DualNumber {
    type Output = DualNumber;

    fn add(self, rhs: DualNumber) -> DualNumber {
        DualNumber::new(self.real + rhs.real, self.dual + rhs.dual)
    }
}

impl Sub for DualNumber {
    type Output = DualNumber;

    fn sub(self, rhs: DualNumber) -> DualNumber {
        DualNumber::new(self.real - rhs.real, self.dual - rhs.dual)
    }
}

impl Mul for DualNumber {
    type Output = DualNumber;

    fn mul(self, rhs: DualNumber) -> DualNumber {
        DualNumber::new(
            self.real * rhs.real,
            self.real * rhs.dual + self.dual * rhs.real,
        )
    }
}

impl Div for DualNumber {
    type Output = DualNumber;

    fn div(self, rhs: DualNumber) -> DualNumber {
        DualNumber::new(
            self.real / rhs.real,
            (self.dual * rhs.real - self.real * rhs.dual) / (rhs.real * rhs.real),
        )
    }
}

impl Neg for DualNumber {
    type Output = DualNumber;

    fn neg(self) -> DualNumber {
        DualNumber::new(-self.real, -self.dual)
    }
}

impl Add<f64> for DualNumber {
    type Output = DualNumber;

    fn add(self, k: f64) -> DualNumber {
        DualNumber::new(self.real + k, self.dual)
    }
}

impl Sub<f64> for DualNumber {
    type Output = DualNumber;

    fn sub(self, k: f64) -> DualNumber {
        DualNumber::new(self.real - k, self.dual)
    }
}

impl Mul<f64> for DualNumber {
    type Output = DualNumber;

    fn mul(self, k: f64) -> DualNumber {
        DualNumber::new(self.real * k, self.dual * k)
    }
}

impl Div<f64> for DualNumber {
    type Output = DualNumber;

    fn div(self, k: f64) -> DualNumber {
        DualNumber::new(self.real / k, self.dual / k)
    }
}

impl Add<DualNumber> for f64 {
    type Output = DualNumber;

    fn add(self, x: DualNumber) -> DualNumber {
        x + self
    }
}

impl Sub<DualNumber> for f64 {
    type Output = DualNumber;

    fn sub(self, x: DualNumber) -> DualNumber {
        DualNumber::new(self - x.real, -x.dual)
    }
}

impl Mul<DualNumber> for f64 {
    type Output = DualNumber;

    fn mul(self, x: DualNumber) -> DualNumber {
        x * self
    }
}

impl Div<DualNumber> for f64 {
    type Output = DualNumber;

    // k / (a, b) = (k/a, -k·b/a²)
    fn div(self, x: DualNumber) -> DualNumber {
        DualNumber::new(self / x.real, -self * x.dual / (x.real * x.real))
    }
}

impl Pow<DualNumber> for DualNumber {
    type Output = DualNumber;

    fn pow(self, exponent: DualNumber) -> DualNumber {
        self.powd(exponent)
    }
}

impl Pow<f64> for DualNumber {
    type Output = DualNumber;

    fn pow(self, exponent: f64) -> DualNumber {
        self.powf(exponent)
    }
}

impl Pow<DualNumber> for f64 {
    type Output = DualNumber;

    fn pow(self, exponent: DualNumber) -> DualNumber {
        DualNumber::rpow(self, exponent)
    }
}

impl Zero for DualNumber {
    fn zero() -> Self {
        Self::constant(0.0)
    }

    fn is_zero(&self) -> bool {
        self.real == 0.0 && self.dual == 0.0
    }
}

impl One for DualNumber {
    fn one() -> Self {
        Self::constant(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{E, PI};

    #[test]
    fn test_primitive_table() {
        assert_eq!(DualNumber::new(0.0, 0.0).exp(), DualNumber::new(1.0, 0.0));
        assert_eq!(DualNumber::new(1.0, 0.0).ln(), DualNumber::new(0.0, 0.0));
        assert_eq!(DualNumber::new(PI, 0.0).sin(), DualNumber::new(0.0, 0.0));
        assert_eq!(DualNumber::new(PI, 0.0).cos(), DualNumber::new(-1.0, 0.0));
    }

    #[test]
    fn test_arithmetic_rules() {
        let x = DualNumber::new(2.0, 1.0);
        let y = DualNumber::new(3.0, 0.5);

        assert_eq!(x + y, DualNumber::new(5.0, 1.5));
        assert_eq!(x - y, DualNumber::new(-1.0, 0.5));
        // product rule: a*d + b*c
        assert_eq!(x * y, DualNumber::new(6.0, 2.0 * 0.5 + 1.0 * 3.0));
        // quotient rule: (b*c - a*d) / c²
        assert_eq!(x / y, DualNumber::new(2.0 / 3.0, (3.0 - 1.0) / 9.0));
        assert_eq!(-x, DualNumber::new(-2.0, -1.0));
    }

    #[test]
    fn test_scalar_operands() {
        let x = DualNumber::new(2.0, 1.0);

        assert_eq!(x + 1.0, DualNumber::new(3.0, 1.0));
        assert_eq!(1.0 + x, DualNumber::new(3.0, 1.0));
        assert_eq!(x * 3.0, DualNumber::new(6.0, 3.0));
        assert_eq!(5.0 - x, DualNumber::new(3.0, -1.0));
        assert_eq!(x / 4.0, DualNumber::new(0.5, 0.25));
        assert_eq!(4.0 / x, DualNumber::new(2.0, -1.0));
    }

    #[test]
    fn test_pow_reduces_to_constant_exponent() {
        let x = DualNumber::new(3.0, 1.0);
        assert_eq!(x.powf(2.0), DualNumber::new(9.0, 6.0));
        assert_eq!(x.pow(DualNumber::constant(2.0)), DualNumber::new(9.0, 6.0));

        // negative base with integer exponent stays finite
        let y = DualNumber::new(-1.0, 1.0);
        assert_eq!(y.powf(2.0), DualNumber::new(1.0, -2.0));
    }

    #[test]
    fn test_pow_dual_exponent() {
        // d/dx x^x = x^x (ln x + 1)
        let x = DualNumber::new(2.0, 1.0);
        let r = x.powd(x);
        assert_relative_eq!(r.real, 4.0);
        assert_relative_eq!(r.dual, 4.0 * (2f64.ln() + 1.0), epsilon = 1e-12);

        let e = DualNumber::rpow(E, DualNumber::new(1.0, 1.0));
        assert_eq!(e, DualNumber::new(E, E));
    }

    #[test]
    fn test_elementary_derivatives() {
        let x = DualNumber::new(0.5, 1.0);

        assert_relative_eq!(x.tan().dual, 1.0 / 0.5f64.cos().powi(2), epsilon = 1e-12);
        assert_relative_eq!(x.asin().dual, 1.0 / 0.75f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(x.acos().dual, -1.0 / 0.75f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(x.atan().dual, 1.0 / 1.25, epsilon = 1e-12);
        assert_relative_eq!(x.sinh().dual, 0.5f64.cosh(), epsilon = 1e-12);
        assert_relative_eq!(x.cosh().dual, 0.5f64.sinh(), epsilon = 1e-12);
        assert_relative_eq!(x.tanh().dual, 1.0 - 0.5f64.tanh().powi(2), epsilon = 1e-12);
        assert_relative_eq!(x.sqrt().dual, 0.5 / 0.5f64.sqrt(), epsilon = 1e-12);
        assert_eq!(x.log_base(2.0), DualNumber::new(-1.0, 1.0 / (0.5 * 2f64.ln())));

        let s = DualNumber::new(0.0, 1.0).sigmoid();
        assert_eq!(s, DualNumber::new(0.5, 0.25));
    }

    #[test]
    fn test_tolerant_equality() {
        let a = DualNumber::new(1.0, 2.0);
        let b = DualNumber::new(1.0 + 1e-10, 2.0 - 1e-10);
        assert_eq!(a, b);
        assert_ne!(a, DualNumber::new(1.001, 2.0));
        assert!(a.is_close_with(&DualNumber::new(1.001, 2.0), Tolerance::new(1e-2, 0.0)));
    }

    #[test]
    fn test_display() {
        assert_eq!(DualNumber::new(1.0, 2.5).to_string(), "real 1, dual 2.5");
    }
}
