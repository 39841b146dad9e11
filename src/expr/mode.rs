//! Differentiation mode

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// How an expression computes derivatives
///
/// The mode is chosen when variables are created and is inherited by every
/// function built on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Dual-number evaluation, one pass per seed direction
    #[default]
    Forward,
    /// One value pass plus one adjoint pass per output
    Reverse,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => f.write_str("forward"),
            Self::Reverse => f.write_str("reverse"),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "f" | "forward" => Ok(Self::Forward),
            "r" | "reverse" => Ok(Self::Reverse),
            other => Err(Error::NotImplemented {
                feature: format!("evaluation mode '{other}'"),
            }),
        }
    }
}
