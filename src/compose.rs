//! Batch evaluation of several expressions over shared inputs

use crate::error::{Error, Result};
use crate::eval::{evaluate_graph, Bindings, Evaluation};
use crate::expr::{Expression, Graph, Mode};
use std::fmt;
use std::sync::OnceLock;

/// Several expressions evaluated together against the same inputs
///
/// The members are compiled into one graph, so sub-expressions they share
/// are evaluated once per pass. Without a seed in forward mode, each one-hot
/// pass produces a Jacobian column for every member at once.
///
/// # Example
///
/// ```
/// use adgraph::prelude::*;
///
/// let a = Expression::variable("a", Mode::Forward);
/// let b = Expression::variable("b", Mode::Forward);
/// let batch = Compose::new(vec![a, b]).unwrap();
///
/// let out = batch.evaluate([("a", 1.0), ("b", 2.0)]).unwrap();
/// assert_eq!(out[0].value, vec![1.0]);
/// assert_eq!(out[0].derivative("a"), Some(vec![1.0]));
/// assert_eq!(out[0].derivative("b"), Some(vec![0.0]));
/// assert_eq!(out[1].value, vec![2.0]);
/// ```
pub struct Compose {
    funcs: Vec<Expression>,
    mode: Mode,
    graph: OnceLock<Graph>,
}

impl Compose {
    /// Group `funcs` for batch evaluation
    ///
    /// Fails with [`Error::InvalidArgument`] if `funcs` is empty and with
    /// [`Error::ModeMismatch`] if the members do not share one mode.
    pub fn new(funcs: Vec<Expression>) -> Result<Self> {
        let mode = funcs
            .first()
            .map(Expression::mode)
            .ok_or_else(|| Error::invalid_argument("funcs", "compose needs at least one expression"))?;
        if let Some(other) = funcs.iter().find(|f| f.mode() != mode) {
            return Err(Error::ModeMismatch {
                expected: mode,
                got: other.mode(),
            });
        }
        Ok(Self {
            funcs,
            mode,
            graph: OnceLock::new(),
        })
    }

    /// Mode shared by all members
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    /// Whether there are no members
    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Iterate over the members
    pub fn iter(&self) -> std::slice::Iter<'_, Expression> {
        self.funcs.iter()
    }

    /// Combined graph of all members, built on first use
    pub fn graph(&self) -> Result<&Graph> {
        if let Some(graph) = self.graph.get() {
            return Ok(graph);
        }
        let graph = Graph::compile(&self.funcs)?;
        Ok(self.graph.get_or_init(|| graph))
    }

    /// Evaluate every member; one [`Evaluation`] per member, in order
    ///
    /// Follows the same rules as [`Expression::call`].
    pub fn call(&self, inputs: impl Into<Bindings>, seed: Option<Bindings>) -> Result<Vec<Evaluation>> {
        evaluate_graph(self.graph()?, &inputs.into(), seed.as_ref())
    }

    /// [`Compose::call`] without a seed
    pub fn evaluate(&self, inputs: impl Into<Bindings>) -> Result<Vec<Evaluation>> {
        self.call(inputs, None)
    }

    /// [`Compose::call`] with a seed
    pub fn evaluate_with_seed(
        &self,
        inputs: impl Into<Bindings>,
        seed: impl Into<Bindings>,
    ) -> Result<Vec<Evaluation>> {
        self.call(inputs, Some(seed.into()))
    }
}

impl<'a> IntoIterator for &'a Compose {
    type Item = &'a Expression;
    type IntoIter = std::slice::Iter<'a, Expression>;

    fn into_iter(self) -> Self::IntoIter {
        self.funcs.iter()
    }
}

impl fmt::Display for Compose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, func) in self.funcs.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{func}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Compose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.funcs).finish()
    }
}
