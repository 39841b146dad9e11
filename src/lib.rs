//! # adgraph
//!
//! **Automatic differentiation of scalar and vector expressions, in forward
//! and reverse mode.**
//!
//! Expressions are built from named variables with ordinary operators and
//! elementary functions, then evaluated as often as needed with different
//! inputs.
//!
//! - **Forward mode** carries a [`DualNumber`] (or [`DualVector`]) through
//!   every operation. With a seed it returns the directional derivative;
//!   without one it assembles the full Jacobian, one pass per input
//!   component.
//! - **Reverse mode** evaluates the graph once on plain values, then sends
//!   adjoints back from the output, returning the gradient with respect to
//!   every variable in one backward pass.
//!
//! ## Quick Start
//!
//! ```
//! use adgraph::prelude::*;
//!
//! let x = Expression::variable("x", Mode::Reverse);
//! let y = Expression::variable("y", Mode::Reverse);
//! let f = (&x * 4.0).sin() + (&y * 4.0).cos();
//!
//! let out = f.evaluate([("x", 1.0), ("y", 2.0)])?;
//! let dx = out.derivative("x").unwrap();
//!
//! assert!((out.value[0] + 0.9023025291165417).abs() < 1e-12);
//! assert!((dx[0] + 2.6145744834544478).abs() < 1e-12);
//! # Ok::<(), adgraph::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`dual`]: dual-number arithmetic
//! - [`ops`]: primitive operations, plain or dual by operand
//! - [`expr`]: expression construction and graph compilation
//! - [`autograd`]: forward and reverse passes over compiled graphs
//! - [`eval`]: inputs, seeds and evaluation results
//! - [`compose`]: batch evaluation of several expressions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod autograd;
pub mod compose;
pub mod dual;
pub mod error;
pub mod eval;
pub mod expr;
pub mod numeric;
pub mod ops;

pub use compose::Compose;
pub use dual::{DualNumber, DualVector, Tolerance};
pub use error::{Error, Result};
pub use eval::{Bindings, Derivatives, Evaluation};
pub use expr::{CustomOp, Expression, Mode};
pub use numeric::{Numeric, Value};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::compose::Compose;
    pub use crate::dual::{DualNumber, DualVector, Tolerance};
    pub use crate::error::{Error, Result};
    pub use crate::eval::{Bindings, Derivatives, Evaluation};
    pub use crate::expr::{CustomOp, Expression, Mode};
    pub use crate::numeric::{Numeric, Value};
    pub use num_traits::Pow;
}
