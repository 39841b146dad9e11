//! Forward and reverse evaluation of compiled graphs
//!
//! Both modes walk a [`Graph`](crate::expr::Graph) arena in topological
//! order. All transient state (node values, local partials, adjoints) lives
//! in a context owned by one evaluation call and dropped when it returns, so
//! the graph itself is never mutated.
//!
//! # Forward mode
//!
//! Leaves are seeded with dual numbers `(input, seed)` and every node is
//! evaluated on dual numbers. The dual part of the output is the directional
//! derivative along the seed. Without an explicit seed, one pass is run per
//! scalar input component with a one-hot seed, which assembles the Jacobian
//! column by column.
//!
//! # Reverse mode
//!
//! ```text
//! propagate:  leaves ──► ... ──► root     values + local partials
//! backward:   root   ──► ... ──► leaves   adjoint = Σ partial · adjoint(consumer)
//! ```
//!
//! The backward pass is Kahn-style: each node waits until every consumer
//! edge reachable from the root has delivered its contribution, then forwards
//! its own adjoint to its operands. Diamond-shaped graphs therefore sum the
//! contributions of every path.

mod adjoint;
mod backward;
mod forward;

pub use adjoint::AdjointNode;
pub use backward::ReverseContext;
pub use forward::{seed_leaf, ForwardContext};
