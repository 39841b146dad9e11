//! Error types for adgraph

use crate::expr::Mode;
use thiserror::Error;

/// Result type alias using adgraph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or evaluating expressions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Operand kinds an arithmetic operation cannot combine
    #[error("Operation '{op}' not supported for operand types {lhs} and {rhs}")]
    UnsupportedOperand {
        /// The operation name
        op: &'static str,
        /// Kind of the left-hand operand
        lhs: &'static str,
        /// Kind of the right-hand operand
        rhs: &'static str,
    },

    /// Input and seed kinds a variable cannot be seeded with
    #[error("Unsupported type {input} for variable '{name}' inputs and type {seed} for seed vector")]
    UnsupportedBinding {
        /// The variable name
        name: String,
        /// Kind of the bound input value
        input: &'static str,
        /// Kind of the bound seed value
        seed: &'static str,
    },

    /// Elementwise operands of different lengths
    #[error("Operands length mismatch, found {lhs} and {rhs}")]
    LengthMismatch {
        /// Length of the left-hand operand
        lhs: usize,
        /// Length of the right-hand operand
        rhs: usize,
    },

    /// Forward pass requested without a seed vector
    #[error("Forward evaluation requires a seed vector")]
    MissingSeed,

    /// Expressions of different modes combined into one graph
    #[error("Mode mismatch: graph is {expected} mode but contains a {got} mode node")]
    ModeMismatch {
        /// Mode of the graph root
        expected: Mode,
        /// Mode of the offending node
        got: Mode,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Feature not implemented
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// Description of the unimplemented feature
        feature: String,
    },

    /// Broken evaluation bookkeeping
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a length mismatch error
    pub fn length_mismatch(lhs: usize, rhs: usize) -> Self {
        Self::LengthMismatch { lhs, rhs }
    }

    /// Create an unsupported operand error
    pub fn unsupported_operand(op: &'static str, lhs: &'static str, rhs: &'static str) -> Self {
        Self::UnsupportedOperand { op, lhs, rhs }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}
