//! Elementary functions

use crate::dual::DualNumber;
use crate::numeric::Numeric;
use std::fmt;

/// Elementary function of one argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Elementary {
    /// Sine
    Sin,
    /// Cosine
    Cos,
    /// Tangent
    Tan,
    /// Natural exponential
    Exp,
    /// Natural logarithm
    Log,
    /// Logarithm in the given base
    LogBase(f64),
    /// Square root
    Sqrt,
    /// Inverse sine
    Arcsin,
    /// Inverse cosine
    Arccos,
    /// Inverse tangent
    Arctan,
    /// Hyperbolic sine
    Sinh,
    /// Hyperbolic cosine
    Cosh,
    /// Hyperbolic tangent
    Tanh,
    /// Logistic sigmoid `1/(1 + e^-x)`
    Sigmoid,
}

fn sigmoid_f64(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Elementary {
    /// Function name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::LogBase(_) => "log_base",
            Self::Sqrt => "sqrt",
            Self::Arcsin => "arcsin",
            Self::Arccos => "arccos",
            Self::Arctan => "arctan",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Sigmoid => "sigmoid",
        }
    }

    /// Plain rule
    pub fn eval(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Exp => x.exp(),
            Self::Log => x.ln(),
            Self::LogBase(base) => x.ln() / base.ln(),
            Self::Sqrt => x.sqrt(),
            Self::Arcsin => x.asin(),
            Self::Arccos => x.acos(),
            Self::Arctan => x.atan(),
            Self::Sinh => x.sinh(),
            Self::Cosh => x.cosh(),
            Self::Tanh => x.tanh(),
            Self::Sigmoid => sigmoid_f64(x),
        }
    }

    /// Dual-number rule
    pub fn eval_dual(self, x: DualNumber) -> DualNumber {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Exp => x.exp(),
            Self::Log => x.ln(),
            Self::LogBase(base) => x.log_base(base),
            Self::Sqrt => x.sqrt(),
            Self::Arcsin => x.asin(),
            Self::Arccos => x.acos(),
            Self::Arctan => x.atan(),
            Self::Sinh => x.sinh(),
            Self::Cosh => x.cosh(),
            Self::Tanh => x.tanh(),
            Self::Sigmoid => x.sigmoid(),
        }
    }

    /// First derivative at `x`
    pub fn derivative(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.cos(),
            Self::Cos => -x.sin(),
            Self::Tan => 1.0 / (x.cos() * x.cos()),
            Self::Exp => x.exp(),
            Self::Log => 1.0 / x,
            Self::LogBase(base) => 1.0 / (x * base.ln()),
            Self::Sqrt => 0.5 / x.sqrt(),
            Self::Arcsin => 1.0 / (1.0 - x * x).sqrt(),
            Self::Arccos => -1.0 / (1.0 - x * x).sqrt(),
            Self::Arctan => 1.0 / (1.0 + x * x),
            Self::Sinh => x.cosh(),
            Self::Cosh => x.sinh(),
            Self::Tanh => 1.0 - x.tanh() * x.tanh(),
            Self::Sigmoid => {
                let s = sigmoid_f64(x);
                s * (1.0 - s)
            }
        }
    }

    /// Evaluate on `x`, dual or plain by variant
    pub fn apply(self, x: &Numeric) -> Numeric {
        x.map(|v| self.eval(v), |d| self.eval_dual(d))
    }

    /// Local partial evaluated at the real part of `x`
    pub fn partial(self, x: &Numeric) -> Numeric {
        x.map_real(|v| self.derivative(v))
    }
}

impl fmt::Display for Elementary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! dispatch_fns {
    ($($name:ident => $variant:ident),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($name), "` of a plain or dual operand")]
            pub fn $name(x: &Numeric) -> Numeric {
                Elementary::$variant.apply(x)
            }
        )*
    };
}

dispatch_fns! {
    sin => Sin,
    cos => Cos,
    tan => Tan,
    exp => Exp,
    log => Log,
    sqrt => Sqrt,
    arcsin => Arcsin,
    arccos => Arccos,
    arctan => Arctan,
    sinh => Sinh,
    cosh => Cosh,
    tanh => Tanh,
    sigmoid => Sigmoid,
}

/// Logarithm in `base` of a plain or dual operand
pub fn log_base(x: &Numeric, base: f64) -> Numeric {
    Elementary::LogBase(base).apply(x)
}
