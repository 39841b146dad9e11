//! Compiled expression graph
//!
//! An [`Expression`] is a tree of shared handles. Before evaluation it is
//! flattened into a [`Graph`]: a contiguous arena of nodes in topological
//! order (operands before consumers), with operands referenced by index.
//! Shared sub-expressions appear once, so a variable used by several
//! consumers is evaluated once per pass and collects adjoints from all of
//! them.

use super::{ExprKind, Expression, Mode, Op};
use crate::error::{Error, Result};
use log::debug;
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap};

/// What a graph node computes
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Named input
    Leaf(String),
    /// Operation over the operand nodes
    Function(Op),
}

/// A node of the compiled arena
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    kind: NodeKind,
    inputs: SmallVec<[usize; 2]>,
}

impl GraphNode {
    /// What this node computes
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Arena indices of the operands, in operand order
    ///
    /// An operand used twice (as in `x * x`) appears twice.
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }
}

/// Topologically ordered arena of one or more expressions
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    roots: Vec<usize>,
    mode: Mode,
}

impl Graph {
    /// Flatten `roots` into one arena
    ///
    /// Fails with [`Error::ModeMismatch`] if any node's mode differs from
    /// the first root's, and with [`Error::InvalidArgument`] if `roots` is
    /// empty.
    pub fn compile(roots: &[Expression]) -> Result<Self> {
        let mode = roots
            .first()
            .map(Expression::mode)
            .ok_or_else(|| Error::invalid_argument("roots", "graph needs at least one root"))?;

        let mut index: HashMap<_, usize> = HashMap::new();
        let mut nodes = Vec::new();
        let mut root_indices = Vec::with_capacity(roots.len());

        // Post-order DFS with an explicit stack; `expanded` marks a node
        // whose operands have already been pushed.
        for root in roots {
            let mut stack = vec![(root, false)];
            while let Some((expr, expanded)) = stack.pop() {
                if index.contains_key(&expr.id()) {
                    continue;
                }
                if expr.mode() != mode {
                    return Err(Error::ModeMismatch {
                        expected: mode,
                        got: expr.mode(),
                    });
                }

                let operands = expr.operands();
                if expanded || operands.is_empty() {
                    let inputs = operands
                        .iter()
                        .map(|o| {
                            index.get(&o.id()).copied().ok_or_else(|| {
                                Error::Internal(format!("operand {} not compiled", o.id()))
                            })
                        })
                        .collect::<Result<SmallVec<[usize; 2]>>>()?;
                    let kind = match &expr.inner.kind {
                        ExprKind::Variable(name) => NodeKind::Leaf(name.clone()),
                        ExprKind::Function { op, .. } => NodeKind::Function(op.clone()),
                    };
                    index.insert(expr.id(), nodes.len());
                    nodes.push(GraphNode { kind, inputs });
                } else {
                    stack.push((expr, true));
                    for operand in operands.iter().rev() {
                        if !index.contains_key(&operand.id()) {
                            stack.push((operand, false));
                        }
                    }
                }
            }

            let root_index = index
                .get(&root.id())
                .copied()
                .ok_or_else(|| Error::Internal(format!("root {} not compiled", root.id())))?;
            root_indices.push(root_index);
        }

        debug!(
            "compiled {} mode graph: {} nodes, {} roots",
            mode,
            nodes.len(),
            root_indices.len()
        );

        Ok(Self {
            nodes,
            roots: root_indices,
            mode,
        })
    }

    /// Nodes in topological order
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Node at `index`
    pub fn node(&self, index: usize) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    /// Arena indices of the roots, in the order given to [`Graph::compile`]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Mode shared by every node
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of distinct nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sorted, deduplicated names of every leaf
    pub fn leaf_names(&self) -> BTreeSet<String> {
        self.nodes
            .iter()
            .filter_map(|n| match &n.kind {
                NodeKind::Leaf(name) => Some(name.clone()),
                NodeKind::Function(_) => None,
            })
            .collect()
    }

    /// Mark every node `root` depends on, including `root` itself
    pub fn reachable_from(&self, root: usize) -> Vec<bool> {
        let mut reachable = vec![false; self.nodes.len()];
        if root >= self.nodes.len() {
            return reachable;
        }
        reachable[root] = true;
        // Consumers sit after their operands, so one reverse sweep suffices.
        for i in (0..=root).rev() {
            if reachable[i] {
                for &input in &self.nodes[i].inputs {
                    reachable[input] = true;
                }
            }
        }
        reachable
    }

    /// Count, per node, the edges arriving from reachable consumers
    pub fn consumer_counts(&self, reachable: &[bool]) -> Vec<usize> {
        let mut counts = vec![0; self.nodes.len()];
        for (node, &r) in self.nodes.iter().zip(reachable) {
            if !r {
                continue;
            }
            for &input in &node.inputs {
                counts[input] += 1;
            }
        }
        counts
    }
}
