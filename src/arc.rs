use std::fmt::{Display, Formatter};

use crate::node::Node;
use crate::ptr::Ptr;

/// A directed edge of an unreduced diagram. The `source` carries the out-index of the child it
/// leaves from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Arc {
    pub source: Ptr,
    pub target: Ptr,
}

impl Arc {
    pub fn new(source: Ptr, out_idx: bool, target: Ptr) -> Self {
        Self {
            source: source.with_out_idx(out_idx),
            target,
        }
    }

    pub fn out_idx(&self) -> bool {
        self.source.out_idx()
    }

    pub fn is_high(&self) -> bool {
        self.out_idx()
    }
}

impl Display for Arc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Combines the low and the high arc leaving the same node.
pub(crate) fn node_of(low: &Arc, high: &Arc) -> Node {
    debug_assert_eq!(low.source.essential(), high.source.essential(), "Arcs from the same node");
    debug_assert!(!low.out_idx() && high.out_idx(), "Low and high arc in that order");
    Node {
        uid: low.source.essential(),
        low: low.target,
        high: high.target,
    }
}
