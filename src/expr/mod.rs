//! Expression graph construction
//!
//! Expressions are built from named variables with ordinary Rust operators
//! and elementary-function methods. Every operation returns a new
//! [`Expression`] holding shared handles to its operands, so a variable (or
//! any sub-expression) reused in several places is one node of the graph,
//! not a copy.
//!
//! ```
//! use adgraph::prelude::*;
//!
//! let [x, y]: [Expression; 2] = Expression::vars(["x", "y"], Mode::Reverse)
//!     .try_into()
//!     .unwrap();
//! let f = (&x * 4.0).sin() + (&y * 4.0).cos();
//!
//! assert_eq!(f.to_string(), "(sin((x * 4)) + cos((y * 4)))");
//! ```
//!
//! Expressions are immutable. Evaluation state lives in per-call contexts
//! (see [`crate::autograd`]), so one expression can be evaluated repeatedly,
//! or from several threads at once.

mod graph;
mod id;
mod mode;
mod op;
mod overload;

pub use graph::{Graph, GraphNode, NodeKind};
pub use id::NodeId;
pub use mode::Mode;
pub use op::{CustomOp, Op, Partials};

use crate::error::{Error, Result};
use crate::ops::{BinaryOp, Elementary};
use smallvec::{smallvec, SmallVec};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

enum ExprKind {
    Variable(String),
    Function {
        op: Op,
        operands: SmallVec<[Expression; 2]>,
    },
}

struct ExprInner {
    id: NodeId,
    mode: Mode,
    kind: ExprKind,
    graph: OnceLock<Graph>,
}

// Operands are released through an explicit stack so that dropping a deep
// chain does not recurse once per level.
impl Drop for ExprInner {
    fn drop(&mut self) {
        let ExprKind::Function { operands, .. } = &mut self.kind else {
            return;
        };
        let mut stack: Vec<Expression> = operands.drain(..).collect();
        while let Some(expr) = stack.pop() {
            // Shared handles only lose a reference; the last owner unwinds here.
            if let Some(mut inner) = Arc::into_inner(expr.inner) {
                if let ExprKind::Function { operands, .. } = &mut inner.kind {
                    stack.extend(operands.drain(..));
                }
            }
        }
    }
}

/// A node of an expression graph: a named variable or a function of other
/// expressions
///
/// Cloning is cheap and yields a handle to the same node.
#[derive(Clone)]
pub struct Expression {
    inner: Arc<ExprInner>,
}

macro_rules! elementary_methods {
    ($($name:ident => $variant:ident),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($name), "(self)`")]
            pub fn $name(&self) -> Expression {
                self.elementary(Elementary::$variant)
            }
        )*
    };
}

impl Expression {
    fn from_kind(mode: Mode, kind: ExprKind) -> Self {
        Self {
            inner: Arc::new(ExprInner {
                id: NodeId::new(),
                mode,
                kind,
                graph: OnceLock::new(),
            }),
        }
    }

    /// Create a named leaf variable
    pub fn variable(name: impl Into<String>, mode: Mode) -> Self {
        Self::from_kind(mode, ExprKind::Variable(name.into()))
    }

    /// Create one variable per name, all sharing `mode`
    pub fn vars<I, S>(names: I, mode: Mode) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(|name| Self::variable(name, mode))
            .collect()
    }

    /// Wrap a user-defined operation over `operands`
    ///
    /// The result takes the mode of the first operand.
    pub fn custom(op: Arc<dyn CustomOp>, operands: &[Expression]) -> Result<Self> {
        if operands.is_empty() {
            return Err(Error::invalid_argument(
                "operands",
                format!("custom op '{}' needs at least one operand", op.name()),
            ));
        }
        Ok(Self::function(Op::Custom(op), operands.iter().cloned().collect()))
    }

    pub(crate) fn function(op: Op, operands: SmallVec<[Expression; 2]>) -> Self {
        let mode = operands.first().map(Expression::mode).unwrap_or_default();
        Self::from_kind(mode, ExprKind::Function { op, operands })
    }

    pub(crate) fn binary(op: BinaryOp, lhs: &Expression, rhs: &Expression) -> Self {
        Self::function(Op::Binary(op), smallvec![lhs.clone(), rhs.clone()])
    }

    pub(crate) fn scalar_rhs(op: BinaryOp, lhs: &Expression, k: f64) -> Self {
        Self::function(Op::ScalarRhs(op, k), smallvec![lhs.clone()])
    }

    pub(crate) fn scalar_lhs(op: BinaryOp, k: f64, rhs: &Expression) -> Self {
        Self::function(Op::ScalarLhs(op, k), smallvec![rhs.clone()])
    }

    fn elementary(&self, e: Elementary) -> Self {
        Self::function(Op::Elementary(e), smallvec![self.clone()])
    }

    /// Unique node ID
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// Differentiation mode
    pub fn mode(&self) -> Mode {
        self.inner.mode
    }

    /// Variable name, or `None` for a function node
    pub fn name(&self) -> Option<&str> {
        match &self.inner.kind {
            ExprKind::Variable(name) => Some(name.as_str()),
            ExprKind::Function { .. } => None,
        }
    }

    /// Whether this is a leaf variable
    pub fn is_variable(&self) -> bool {
        matches!(self.inner.kind, ExprKind::Variable(_))
    }

    /// Operation of a function node
    pub fn op(&self) -> Option<&Op> {
        match &self.inner.kind {
            ExprKind::Variable(_) => None,
            ExprKind::Function { op, .. } => Some(op),
        }
    }

    /// Operands of a function node (empty for variables)
    pub fn operands(&self) -> &[Expression] {
        match &self.inner.kind {
            ExprKind::Variable(_) => &[],
            ExprKind::Function { operands, .. } => operands,
        }
    }

    /// Names of all variables this expression depends on, sorted
    pub fn var_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let mut seen = HashSet::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            if !seen.insert(expr.id()) {
                continue;
            }
            match &expr.inner.kind {
                ExprKind::Variable(name) => {
                    names.insert(name.clone());
                }
                ExprKind::Function { operands, .. } => stack.extend(operands.iter()),
            }
        }
        names
    }

    /// Compiled arena for this expression, built on first use
    pub fn graph(&self) -> Result<&Graph> {
        if let Some(graph) = self.inner.graph.get() {
            return Ok(graph);
        }
        let graph = Graph::compile(std::slice::from_ref(self))?;
        Ok(self.inner.graph.get_or_init(|| graph))
    }

    elementary_methods! {
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

    /// `log(self) / log(base)`
    pub fn log_base(&self, base: f64) -> Expression {
        self.elementary(Elementary::LogBase(base))
    }
}

/// Structural equality: same mode, same operations (constants compared by
/// value, custom ops by identity) over equal operands. Variables are equal
/// when their names and modes match.
impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if Arc::ptr_eq(&a.inner, &b.inner) {
                continue;
            }
            if a.mode() != b.mode() {
                return false;
            }
            match (&a.inner.kind, &b.inner.kind) {
                (ExprKind::Variable(x), ExprKind::Variable(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (
                    ExprKind::Function {
                        op: op_a,
                        operands: ops_a,
                    },
                    ExprKind::Function {
                        op: op_b,
                        operands: ops_b,
                    },
                ) => {
                    if op_a != op_b || ops_a.len() != ops_b.len() {
                        return false;
                    }
                    stack.extend(ops_a.iter().zip(ops_b.iter()));
                }
                _ => return false,
            }
        }
        true
    }
}

/// Pending output of the infix printer
enum Token<'a> {
    Expr(&'a Expression),
    Text(&'a str),
    Const(f64),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens are pushed in reverse so they pop in print order.
        let mut stack = vec![Token::Expr(self)];
        while let Some(token) = stack.pop() {
            let expr = match token {
                Token::Text(s) => {
                    f.write_str(s)?;
                    continue;
                }
                Token::Const(k) => {
                    write!(f, "{k}")?;
                    continue;
                }
                Token::Expr(expr) => expr,
            };
            let (op, operands) = match &expr.inner.kind {
                ExprKind::Variable(name) => {
                    f.write_str(name)?;
                    continue;
                }
                ExprKind::Function { op, operands } => (op, operands.as_slice()),
            };
            match (op, operands) {
                (Op::Binary(op), [a, b]) => {
                    f.write_str("(")?;
                    stack.extend([
                        Token::Text(")"),
                        Token::Expr(b),
                        Token::Text(" "),
                        Token::Text(op.symbol()),
                        Token::Text(" "),
                        Token::Expr(a),
                    ]);
                }
                (Op::ScalarRhs(op, k), [a]) => {
                    f.write_str("(")?;
                    stack.extend([
                        Token::Text(")"),
                        Token::Const(*k),
                        Token::Text(" "),
                        Token::Text(op.symbol()),
                        Token::Text(" "),
                        Token::Expr(a),
                    ]);
                }
                (Op::ScalarLhs(op, k), [a]) => {
                    write!(f, "({k} {op} ")?;
                    stack.extend([Token::Text(")"), Token::Expr(a)]);
                }
                (Op::Neg, [a]) => {
                    f.write_str("-")?;
                    stack.push(Token::Expr(a));
                }
                (Op::Elementary(Elementary::LogBase(base)), [a]) => {
                    f.write_str("log_base(")?;
                    stack.extend([
                        Token::Text(")"),
                        Token::Const(*base),
                        Token::Text(", "),
                        Token::Expr(a),
                    ]);
                }
                (op, args) => {
                    write!(f, "{}(", op.name())?;
                    stack.push(Token::Text(")"));
                    for (i, arg) in args.iter().enumerate().rev() {
                        stack.push(Token::Expr(arg));
                        if i > 0 {
                            stack.push(Token::Text(", "));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("id", &self.id())
            .field("mode", &self.mode())
            .field("expr", &self.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let x = Expression::variable("x", Mode::Forward);
        let y = Expression::variable("y", Mode::Forward);

        assert_eq!(&x * &y + 1.0, &x * &y + 1.0);
        assert_ne!(&x * &y + 1.0, &x * &y + 2.0);
        assert_ne!(&x * &y, &y * &x);
        assert_eq!(x.sin(), Expression::variable("x", Mode::Forward).sin());
        assert_ne!(x.sin(), x.cos());
        assert_ne!(x, Expression::variable("x", Mode::Reverse));
    }

    #[test]
    fn test_var_names() {
        let [a, b, c]: [Expression; 3] = Expression::vars(["a", "b", "c"], Mode::Forward)
            .try_into()
            .unwrap();
        let f = (&c - &a).exp() * &a;
        let names: Vec<_> = f.var_names().into_iter().collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(b.var_names().len(), 1);
    }

    #[test]
    fn test_display() {
        let x = Expression::variable("x", Mode::Forward);
        assert_eq!((2.0 - &x).to_string(), "(2 - x)");
        assert_eq!((-&x).log_base(2.0).to_string(), "log_base(-x, 2)");
        assert_eq!(x.sigmoid().to_string(), "sigmoid(x)");
    }

    #[test]
    fn test_display_custom_args_in_order() {
        struct Pair;

        impl CustomOp for Pair {
            fn name(&self) -> &str {
                "pair"
            }

            fn eval(&self, args: &[crate::Numeric]) -> Result<crate::Numeric> {
                args[0].add(&args[1])
            }

            fn partials(&self, _args: &[crate::Numeric]) -> Result<Vec<crate::Numeric>> {
                Ok(vec![crate::Numeric::Scalar(1.0), crate::Numeric::Scalar(1.0)])
            }
        }

        let x = Expression::variable("x", Mode::Forward);
        let y = Expression::variable("y", Mode::Forward);
        let f = Expression::custom(Arc::new(Pair), &[x.exp(), &y * 2.0]).unwrap();
        assert_eq!(f.to_string(), "pair(exp(x), (y * 2))");
        assert_eq!((&x - &y).to_string(), "(x - y)");
    }

    #[test]
    fn test_deep_chain_display_and_drop() {
        const DEPTH: usize = 150_000;

        let x = Expression::variable("x", Mode::Forward);
        let mut f = x.clone();
        for _ in 0..DEPTH {
            f = -f;
        }

        let text = f.to_string();
        assert_eq!(text.len(), DEPTH + 1);
        assert!(text.ends_with("-x"));

        let g = f.clone();
        assert_eq!(f, g);
        drop(f);
        drop(g);
        // the leaf outlives the chain built on it
        assert_eq!(x.to_string(), "x");
    }

    #[test]
    fn test_function_inherits_mode() {
        let x = Expression::variable("x", Mode::Reverse);
        let f = (&x * 3.0).tanh();
        assert_eq!(f.mode(), Mode::Reverse);
        assert!(!f.is_variable());
        assert_eq!(f.operands().len(), 1);
        assert_eq!(f.op(), Some(&Op::Elementary(Elementary::Tanh)));
        assert_eq!(x.name(), Some("x"));
    }

    #[test]
    fn test_graph_is_cached() {
        let x = Expression::variable("x", Mode::Forward);
        let f = &x * &x;
        let first = f.graph().unwrap() as *const Graph;
        let second = f.graph().unwrap() as *const Graph;
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_requires_operands() {
        #[derive(Debug)]
        struct Identity;
        impl CustomOp for Identity {
            fn name(&self) -> &str {
                "identity"
            }
            fn eval(&self, args: &[crate::Numeric]) -> Result<crate::Numeric> {
                Ok(args[0].clone())
            }
            fn partials(&self, _args: &[crate::Numeric]) -> Result<Vec<crate::Numeric>> {
                Ok(vec![crate::Numeric::Scalar(1.0)])
            }
        }

        let err = Expression::custom(Arc::new(Identity), &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }
}
