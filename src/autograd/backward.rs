//! Reverse-mode propagation and adjoint accumulation

use super::{AdjointNode, ForwardContext};
use crate::error::{Error, Result};
use crate::expr::{Graph, NodeKind};
use crate::numeric::{Numeric, Value};
use log::trace;
use std::collections::{BTreeMap, VecDeque};

/// Per-call reverse-mode state for one graph
///
/// [`ReverseContext::propagate`] computes node values and local partials
/// once; [`ReverseContext::backward`] can then run for each root in turn.
///
/// # Example
///
/// ```
/// use adgraph::autograd::ReverseContext;
/// use adgraph::prelude::*;
///
/// let x = Expression::variable("x", Mode::Reverse);
/// let y = Expression::variable("y", Mode::Reverse);
/// let f = &x * &y;
/// let graph = f.graph().unwrap();
///
/// let mut ctx = ReverseContext::new(graph);
/// ctx.propagate(|name| Ok(Numeric::Scalar(if name == "x" { 2.0 } else { 3.0 })))
///     .unwrap();
/// let grads = ctx.backward(graph.roots()[0]).unwrap();
///
/// // d(xy)/dx = y
/// assert_eq!(grads["x"], Value::Scalar(3.0));
/// assert_eq!(grads["y"], Value::Scalar(2.0));
/// ```
pub struct ReverseContext<'g> {
    forward: ForwardContext<'g>,
    nodes: Vec<AdjointNode>,
}

impl<'g> ReverseContext<'g> {
    /// Create an empty context over `graph`
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            forward: ForwardContext::new(graph),
            nodes: vec![AdjointNode::default(); graph.len()],
        }
    }

    /// Evaluate every node on plain values and record its local partials
    pub fn propagate(&mut self, leaf: impl FnMut(&str) -> Result<Numeric>) -> Result<()> {
        self.forward.evaluate(leaf)?;

        let graph = self.forward.graph();
        for (i, node) in graph.nodes().iter().enumerate() {
            if let NodeKind::Function(op) = node.kind() {
                let args = self.forward.operand_values(i)?;
                self.nodes[i].update(op.partials(&args)?);
            }
        }
        Ok(())
    }

    /// Value of node `index` from the last propagation
    pub fn value(&self, index: usize) -> Result<&Numeric> {
        self.forward.value(index)
    }

    /// Adjoint state of node `index`
    pub fn node(&self, index: usize) -> Option<&AdjointNode> {
        self.nodes.get(index)
    }

    /// Accumulate adjoints from `root` back to the leaves
    ///
    /// The root is seeded with ones shaped like its value. Returns the
    /// adjoint of every leaf `root` depends on, keyed by variable name;
    /// leaves sharing a name have their adjoints summed. Leaves `root` does
    /// not depend on get no entry.
    pub fn backward(&mut self, root: usize) -> Result<BTreeMap<String, Value>> {
        let graph = self.forward.graph();
        let seed = self.forward.value(root)?.ones_like();

        let reachable = graph.reachable_from(root);
        let counts = graph.consumer_counts(&reachable);
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.clear_adjoint();
            if reachable[i] {
                node.expect(counts[i]);
            }
        }
        self.nodes[root].seed(seed);

        let mut ready = VecDeque::from([root]);
        let mut gradients: BTreeMap<String, Value> = BTreeMap::new();

        while let Some(i) = ready.pop_front() {
            let adjoint = self.nodes[i]
                .adjoint()
                .cloned()
                .ok_or_else(|| Error::Internal(format!("node {i} completed without adjoint")))?;
            let node = graph
                .node(i)
                .ok_or_else(|| Error::Internal(format!("node {i} out of range")))?;

            match node.kind() {
                NodeKind::Leaf(name) => {
                    let total = match gradients.remove(name) {
                        Some(acc) => Numeric::from(acc).add(&adjoint)?,
                        None => adjoint,
                    };
                    gradients.insert(name.clone(), total.to_value());
                }
                NodeKind::Function(_) => {
                    for (k, &input) in node.inputs().iter().enumerate() {
                        let contribution = self.nodes[i]
                            .partials()
                            .get(k)
                            .ok_or_else(|| {
                                Error::Internal(format!("node {i} has no partial for operand {k}"))
                            })?
                            .mul(&adjoint)?;
                        if self.nodes[input].notify(contribution)? {
                            ready.push_back(input);
                        }
                    }
                }
            }
        }

        trace!(
            "backward from node {root}: {} of {} reachable nodes, {} gradients",
            reachable.iter().filter(|&&r| r).count(),
            graph.len(),
            gradients.len()
        );
        Ok(gradients)
    }

    /// Forget adjoints, keeping values and partials for another root
    pub fn clear_adjoints(&mut self) {
        self.nodes.iter_mut().for_each(AdjointNode::clear_adjoint);
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.forward.clear();
        self.nodes.iter_mut().for_each(AdjointNode::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expression, Mode};

    fn scalar_inputs(x: f64, y: f64) -> impl FnMut(&str) -> Result<Numeric> {
        move |name: &str| match name {
            "x" => Ok(Numeric::Scalar(x)),
            "y" => Ok(Numeric::Scalar(y)),
            other => Err(Error::Internal(format!("unexpected leaf {other}"))),
        }
    }

    #[test]
    fn test_diamond_accumulates() {
        let x = Expression::variable("x", Mode::Reverse);
        let y = Expression::variable("y", Mode::Reverse);
        let xy = &x * &y;
        let f = &xy + &xy;
        let graph = f.graph().unwrap();

        let mut ctx = ReverseContext::new(graph);
        ctx.propagate(scalar_inputs(3.0, 5.0)).unwrap();
        let grads = ctx.backward(graph.roots()[0]).unwrap();

        assert_eq!(grads["x"], Value::Scalar(10.0));
        assert_eq!(grads["y"], Value::Scalar(6.0));
    }

    #[test]
    fn test_square_counts_both_edges() {
        let x = Expression::variable("x", Mode::Reverse);
        let f = &x * &x;
        let graph = f.graph().unwrap();

        let mut ctx = ReverseContext::new(graph);
        ctx.propagate(scalar_inputs(3.0, 0.0)).unwrap();
        let grads = ctx.backward(graph.roots()[0]).unwrap();
        assert_eq!(grads["x"], Value::Scalar(6.0));
    }

    #[test]
    fn test_bare_variable_root() {
        let x = Expression::variable("x", Mode::Reverse);
        let graph = x.graph().unwrap();

        let mut ctx = ReverseContext::new(graph);
        ctx.propagate(scalar_inputs(7.0, 0.0)).unwrap();
        let grads = ctx.backward(0).unwrap();
        assert_eq!(grads["x"], Value::Scalar(1.0));
    }

    #[test]
    fn test_same_name_leaves_sum() {
        let x1 = Expression::variable("x", Mode::Reverse);
        let x2 = Expression::variable("x", Mode::Reverse);
        let f = &x1 * 2.0 + &x2 * 3.0;
        let graph = f.graph().unwrap();

        let mut ctx = ReverseContext::new(graph);
        ctx.propagate(scalar_inputs(1.0, 0.0)).unwrap();
        let grads = ctx.backward(graph.roots()[0]).unwrap();
        assert_eq!(grads.len(), 1);
        assert_eq!(grads["x"], Value::Scalar(5.0));
    }

    #[test]
    fn test_backward_per_root() {
        let x = Expression::variable("x", Mode::Reverse);
        let y = Expression::variable("y", Mode::Reverse);
        let f = &x * &y;
        let g = f.sin() + &y;
        let graph = Graph::compile(&[f, g]).unwrap();

        let mut ctx = ReverseContext::new(&graph);
        ctx.propagate(scalar_inputs(2.0, 0.5)).unwrap();

        let df = ctx.backward(graph.roots()[0]).unwrap();
        assert_eq!(df["x"], Value::Scalar(0.5));

        ctx.clear_adjoints();
        let dg = ctx.backward(graph.roots()[1]).unwrap();
        let c = 1f64.cos();
        assert_eq!(dg["x"], Value::Scalar(c * 0.5));
        assert_eq!(dg["y"], Value::Scalar(c * 2.0 + 1.0));
    }

    #[test]
    fn test_vector_root_seeds_ones() {
        let v = Expression::variable("x", Mode::Reverse);
        let f = &v * &v;
        let graph = f.graph().unwrap();

        let mut ctx = ReverseContext::new(graph);
        ctx.propagate(|_| Ok(Numeric::Vector(vec![1.0, 2.0, 3.0])))
            .unwrap();
        let grads = ctx.backward(graph.roots()[0]).unwrap();
        assert_eq!(grads["x"], Value::Vector(vec![2.0, 4.0, 6.0]));
    }
}
