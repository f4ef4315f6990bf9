//! Equality of decision diagrams.
//!
//! Two reduced diagrams represent the same function iff they are isomorphic. Most pairs are decided
//! without looking at a single node:
//!
//! 1. Handles to the same file with the same negation and shift are equal.
//! 2. Diagrams that differ in their number of nodes, levels or arcs to each terminal are not.
//! 3. Two canonical files with the same negation are equal iff their nodes are equal one by one.
//!
//! Everything else is decided by whether the `Xor` of both collapses to `false`.

use log::debug;

use crate::dd::DecisionDiagram;
use crate::policy::DdPolicy;
use crate::prod2::{apply, BoolOp};

fn is_isomorphic<P: DdPolicy>(a: &DecisionDiagram<P>, b: &DecisionDiagram<P>) -> bool {
    if a.shares_file_with(b) && a.is_negated() == b.is_negated() {
        return true;
    }
    if a.is_terminal() || b.is_terminal() {
        return a.is_terminal() && b.is_terminal() && a.value() == b.value();
    }

    if a.nodecount() != b.nodecount()
        || a.varcount() != b.varcount()
        || a.number_of_terminals(false) != b.number_of_terminals(false)
        || a.number_of_terminals(true) != b.number_of_terminals(true)
    {
        return false;
    }

    if a.is_canonical() && b.is_canonical() && a.is_negated() == b.is_negated() {
        debug!("is_isomorphic: linear scan of {} nodes", a.nodecount());
        return a.nodes_bottom_up().eq(b.nodes_bottom_up());
    }

    debug!("is_isomorphic: xor of {} nodes", a.nodecount());
    apply(a, b, BoolOp::Xor).is_terminal_value(false)
}

impl<P: DdPolicy> PartialEq for DecisionDiagram<P> {
    fn eq(&self, other: &Self) -> bool {
        is_isomorphic(self, other)
    }
}

impl<P: DdPolicy> Eq for DecisionDiagram<P> {}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::bdd::Bdd;
    use crate::node::Node;
    use crate::node_file::NodeFile;
    use crate::ptr::Ptr;
    use crate::zdd::Zdd;

    #[test]
    fn test_terminals() {
        assert_eq!(Bdd::bdd_true(), Bdd::bdd_true());
        assert_eq!(Bdd::bdd_true(), !Bdd::bdd_false());
        assert_ne!(Bdd::bdd_true(), Bdd::bdd_false());
        assert_ne!(Bdd::bdd_true(), Bdd::ithvar(0));
    }

    #[test]
    fn test_shifted_handles() {
        let x = Bdd::ithvar(0);
        assert_eq!(x.shifted(2), Bdd::ithvar(2));
        assert_ne!(x.shifted(1), x);
    }

    #[test]
    fn test_non_canonical_file() {
        // x0 & x1, but with the ids of the nodes not starting from MAX_ID
        let n1 = Node::new(1, 4, Ptr::FALSE, Ptr::TRUE);
        let n0 = Node::new(0, 2, Ptr::FALSE, n1.uid);
        let f = Bdd::from(NodeFile::from_nodes([n1, n0]));
        assert!(!f.is_canonical());

        let g = &Bdd::ithvar(0) & &Bdd::ithvar(1);
        assert_eq!(f, g);
        assert_ne!(f, &Bdd::ithvar(0) | &Bdd::ithvar(1));
        // Same shape but a different function
        assert_ne!(f, &Bdd::ithvar(0) & &Bdd::nithvar(1));
    }

    #[test]
    fn test_negation_across_files() {
        let f = Bdd::or_of([0, 1]);
        let g = !Bdd::cube([(0, false), (1, false)]);
        assert_eq!(f, g);
    }

    #[test]
    fn test_zdd() {
        let a = Zdd::ithvar(0);
        let b = Zdd::ithvar(1);
        assert_eq!(&a | &b, &b | &a);
        assert_ne!(a, b);
    }
}
