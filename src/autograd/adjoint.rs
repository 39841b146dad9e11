//! Per-node adjoint bookkeeping

use crate::error::{Error, Result};
use crate::expr::Partials;
use crate::numeric::Numeric;

/// Adjoint state of one graph node during a reverse pass
///
/// `expect` registers how many consumer edges will report, `notify` adds one
/// contribution and says whether the node is complete. A node with no
/// consumers (the root) is complete as soon as it is seeded.
#[derive(Debug, Clone, Default)]
pub struct AdjointNode {
    pending: usize,
    adjoint: Option<Numeric>,
    partials: Partials,
}

impl AdjointNode {
    /// Store the local partials computed during propagation
    pub fn update(&mut self, partials: Partials) {
        self.partials = partials;
    }

    /// Local partials, one per operand
    pub fn partials(&self) -> &[Numeric] {
        &self.partials
    }

    /// Register the number of consumer edges that will report
    pub fn expect(&mut self, consumers: usize) {
        self.pending = consumers;
    }

    /// Set the adjoint of an output node directly
    pub fn seed(&mut self, adjoint: Numeric) {
        self.pending = 0;
        self.adjoint = Some(adjoint);
    }

    /// Accumulate one consumer's contribution
    ///
    /// Returns `true` once every registered consumer has reported.
    pub fn notify(&mut self, contribution: Numeric) -> Result<bool> {
        if self.pending == 0 {
            return Err(Error::Internal(
                "adjoint contribution from an unregistered consumer".into(),
            ));
        }
        self.adjoint = Some(match self.adjoint.take() {
            Some(acc) => acc.add(&contribution)?,
            None => contribution,
        });
        self.pending -= 1;
        Ok(self.pending == 0)
    }

    /// Whether all contributions have arrived
    pub fn is_complete(&self) -> bool {
        self.pending == 0 && self.adjoint.is_some()
    }

    /// Accumulated adjoint, if any contribution has arrived
    pub fn adjoint(&self) -> Option<&Numeric> {
        self.adjoint.as_ref()
    }

    /// Reset the adjoint for another output, keeping the local partials
    pub fn clear_adjoint(&mut self) {
        self.pending = 0;
        self.adjoint = None;
    }

    /// Reset everything
    pub fn clear(&mut self) {
        self.clear_adjoint();
        self.partials.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_until_complete() {
        let mut node = AdjointNode::default();
        node.expect(2);

        assert!(!node.notify(Numeric::Scalar(1.5)).unwrap());
        assert!(!node.is_complete());
        assert!(node.notify(Numeric::Scalar(2.5)).unwrap());
        assert!(node.is_complete());
        assert_eq!(node.adjoint(), Some(&Numeric::Scalar(4.0)));
    }

    #[test]
    fn test_extra_contribution_is_an_error() {
        let mut node = AdjointNode::default();
        node.expect(1);
        node.notify(Numeric::Scalar(1.0)).unwrap();
        assert!(matches!(
            node.notify(Numeric::Scalar(1.0)),
            Err(Error::Internal(_))
        ));
    }

    #[test]
    fn test_seeded_root_is_complete() {
        let mut node = AdjointNode::default();
        node.seed(Numeric::Vector(vec![1.0, 1.0]));
        assert!(node.is_complete());

        node.clear_adjoint();
        assert_eq!(node.adjoint(), None);
    }
}
