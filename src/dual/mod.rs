//! Dual numbers for forward-mode automatic differentiation
//!
//! A dual number carries a value together with its derivative along a seed
//! direction. Arithmetic on dual numbers follows the algebra of `a + b·ε`
//! with `ε² = 0`:
//!
//! - `(a + b·ε) + (c + d·ε) = (a + c) + (b + d)·ε`
//! - `(a + b·ε) * (c + d·ε) = ac + (ad + bc)·ε`
//! - `f(a + b·ε) = f(a) + f'(a)·b·ε`
//!
//! The chain rule is never written down explicitly: composing these rules
//! propagates the derivative through any sequence of primitive operations.
//!
//! [`DualNumber`] is the scalar carrier; [`DualVector`] applies the same
//! operations elementwise to a vector-valued variable.

mod number;
mod vector;

pub use number::{DualNumber, Tolerance};
pub use vector::DualVector;
