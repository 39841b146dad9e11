//! Value pass over a compiled graph

use crate::dual::{DualNumber, DualVector};
use crate::error::{Error, Result};
use crate::expr::{Graph, NodeKind};
use crate::numeric::{Numeric, Value};
use smallvec::SmallVec;

/// Wrap an input and its seed into the dual representation of a leaf
///
/// Scalars pair with scalars and vectors with vectors of the same length;
/// any other combination fails with [`Error::UnsupportedBinding`].
pub fn seed_leaf(name: &str, input: &Value, seed: &Value) -> Result<Numeric> {
    match (input, seed) {
        (Value::Scalar(x), Value::Scalar(s)) => Ok(Numeric::Dual(DualNumber::new(*x, *s))),
        (Value::Vector(x), Value::Vector(s)) => Ok(Numeric::DualVector(DualVector::new(x, s)?)),
        _ => Err(Error::UnsupportedBinding {
            name: name.to_string(),
            input: input.kind(),
            seed: seed.kind(),
        }),
    }
}

/// Per-call node values for one graph
///
/// Holds one slot per arena node. [`ForwardContext::evaluate`] fills every
/// slot in topological order; [`ForwardContext::clear`] empties them for the
/// next pass.
pub struct ForwardContext<'g> {
    graph: &'g Graph,
    values: Vec<Option<Numeric>>,
}

impl<'g> ForwardContext<'g> {
    /// Create an empty context over `graph`
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            values: vec![None; graph.len()],
        }
    }

    /// The graph being evaluated
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Evaluate every node, asking `leaf` for the value of each named leaf
    ///
    /// Leaf values decide the representation: dual leaves give a forward
    /// pass, plain leaves a plain value pass.
    pub fn evaluate(&mut self, mut leaf: impl FnMut(&str) -> Result<Numeric>) -> Result<()> {
        let graph = self.graph;
        for (i, node) in graph.nodes().iter().enumerate() {
            let value = match node.kind() {
                NodeKind::Leaf(name) => leaf(name)?,
                NodeKind::Function(op) => op.eval(&self.operand_values(i)?)?,
            };
            self.values[i] = Some(value);
        }
        Ok(())
    }

    /// Value of node `index` from the last pass
    pub fn value(&self, index: usize) -> Result<&Numeric> {
        self.values
            .get(index)
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::Internal(format!("node {index} has not been evaluated")))
    }

    /// Values of the operands of node `index`, in operand order
    pub fn operand_values(&self, index: usize) -> Result<SmallVec<[Numeric; 2]>> {
        let node = self
            .graph
            .node(index)
            .ok_or_else(|| Error::Internal(format!("node {index} out of range")))?;
        node.inputs()
            .iter()
            .map(|&input| self.value(input).cloned())
            .collect()
    }

    /// Forget all values
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = None);
    }
}
