//! What distinguishes a BDD from a ZDD.
//!
//! Both kinds of diagrams share the same nodes, files and algorithms. They only differ in which
//! nodes are redundant (Rule 1) and in how a diagram is cofactored on a level it skips.

use std::fmt::Debug;

use crate::node::Node;
use crate::ptr::Ptr;
use crate::types::Level;

pub trait DdPolicy: Copy + Clone + Default + Debug + 'static {
    /// Short name used in logs.
    const NAME: &'static str;

    /// Whether diagrams of this kind may carry a negation flag.
    const SUPPORTS_NEGATION: bool;

    /// Target of `n` after applying Rule 1, or `n.uid` if the node is not redundant.
    fn reduction_rule(n: &Node) -> Ptr;

    /// Children of a node that Rule 1 would remove in favour of `child`.
    fn reduction_rule_inv(child: Ptr) -> (Ptr, Ptr);

    /// Whether cofactoring the terminal `value` on any level yields the terminal itself.
    fn is_invariant_terminal(value: bool) -> bool;

    /// The low and high cofactor of `p` on `level`, given the node `p` points to (if any).
    fn cofactor(p: Ptr, node: Option<&Node>, level: Level) -> (Ptr, Ptr) {
        match node {
            Some(n) if p.on_level(level) => (n.low, n.high),
            _ => Self::reduction_rule_inv(p),
        }
    }
}

/// Binary Decision Diagrams: a node with two equal children is redundant.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct BddPolicy;

impl DdPolicy for BddPolicy {
    const NAME: &'static str = "bdd";
    const SUPPORTS_NEGATION: bool = true;

    fn reduction_rule(n: &Node) -> Ptr {
        if n.low.essential() == n.high.essential() {
            return n.low;
        }
        n.uid
    }

    fn reduction_rule_inv(child: Ptr) -> (Ptr, Ptr) {
        (child, child)
    }

    fn is_invariant_terminal(_value: bool) -> bool {
        true
    }
}

/// Zero-suppressed Decision Diagrams: a node whose high child is `false` is redundant.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ZddPolicy;

impl DdPolicy for ZddPolicy {
    const NAME: &'static str = "zdd";
    const SUPPORTS_NEGATION: bool = false;

    fn reduction_rule(n: &Node) -> Ptr {
        if n.high.is_false() {
            return n.low;
        }
        n.uid
    }

    fn reduction_rule_inv(child: Ptr) -> (Ptr, Ptr) {
        (child, Ptr::FALSE)
    }

    fn is_invariant_terminal(value: bool) -> bool {
        !value
    }
}
