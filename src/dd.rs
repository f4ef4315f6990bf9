//! Handles to reduced and unreduced decision diagrams.
//!
//! A [`DecisionDiagram`] is a shared, immutable [`NodeFile`] together with two attributes that are
//! applied lazily whenever the file is read:
//!
//! - a *negation* flag, which swaps the two terminals (only for policies that support it), and
//! - a signed level *shift*, which moves every node by the same number of levels.
//!
//! Both make negation and shifting O(1). Cloning a diagram only clones the [`Rc`].
//!
//! Every top-down sweep outputs an [`Unreduced`] diagram, which still needs to go through the
//! [reduction][crate::reduce] to become canonical.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::rc::Rc;

use crate::arc_file::ArcFile;
use crate::cut::{CutType, Cuts};
use crate::node::Node;
use crate::node_file::NodeFile;
use crate::policy::DdPolicy;
use crate::ptr::Ptr;
use crate::reduce::{reduce, reduce_with};
use crate::types::{Level, SignedLevel};

pub struct DecisionDiagram<P: DdPolicy> {
    file: Rc<NodeFile>,
    negate: bool,
    shift: SignedLevel,
    _policy: PhantomData<P>,
}

impl<P: DdPolicy> Clone for DecisionDiagram<P> {
    fn clone(&self) -> Self {
        Self {
            file: Rc::clone(&self.file),
            negate: self.negate,
            shift: self.shift,
            _policy: PhantomData,
        }
    }
}

impl<P: DdPolicy> Debug for DecisionDiagram<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionDiagram")
            .field("kind", &P::NAME)
            .field("nodes", &self.file.nodecount())
            .field("negate", &self.negate)
            .field("shift", &self.shift)
            .finish()
    }
}

impl<P: DdPolicy> From<NodeFile> for DecisionDiagram<P> {
    fn from(file: NodeFile) -> Self {
        Self::new(Rc::new(file), false, 0)
    }
}

impl<P: DdPolicy> DecisionDiagram<P> {
    pub fn new(file: Rc<NodeFile>, negate: bool, shift: SignedLevel) -> Self {
        assert!(!file.is_empty(), "A diagram needs at least one node");
        assert!(!negate || P::SUPPORTS_NEGATION, "{} cannot be negated", P::NAME);
        Self {
            file,
            negate,
            shift,
            _policy: PhantomData,
        }
    }

    /// The constant diagram.
    pub fn terminal(value: bool) -> Self {
        Self::from(NodeFile::terminal(value))
    }

    pub fn file(&self) -> &NodeFile {
        &self.file
    }

    pub fn file_ptr(&self) -> &Rc<NodeFile> {
        &self.file
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    pub fn shift(&self) -> SignedLevel {
        self.shift
    }

    /// Whether both handles refer to the same file with the same shift.
    pub(crate) fn shares_file_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.file, &other.file) && self.shift == other.shift
    }

    /// The same file with the terminals swapped.
    pub(crate) fn negated(&self) -> Self {
        Self::new(Rc::clone(&self.file), !self.negate, self.shift)
    }

    /// The same file moved by `delta` more levels.
    pub(crate) fn shifted(&self, delta: SignedLevel) -> Self {
        if self.is_terminal() {
            return self.clone();
        }
        Self::new(Rc::clone(&self.file), self.negate, self.shift + delta)
    }

    pub fn is_terminal(&self) -> bool {
        self.file.is_terminal()
    }

    /// Value of a constant diagram.
    ///
    /// # Panics
    ///
    /// Panics if the diagram is not a terminal.
    pub fn value(&self) -> bool {
        self.file.value() ^ self.negate
    }

    /// Whether the diagram is the terminal `value`.
    pub(crate) fn is_terminal_value(&self, value: bool) -> bool {
        self.is_terminal() && self.value() == value
    }

    pub fn is_canonical(&self) -> bool {
        self.file.is_canonical()
    }

    /// Pointer to the root, with the shift and negation applied.
    pub fn root(&self) -> Ptr {
        self.map_ptr(self.file.root())
    }

    /// Level of the root, unless the diagram is a terminal.
    pub fn topvar(&self) -> Option<Level> {
        self.root().level_or_none()
    }

    /// Smallest level of the diagram, i.e. the level of its root.
    pub fn minvar(&self) -> Option<Level> {
        self.topvar()
    }

    /// Deepest level of the diagram.
    pub fn maxvar(&self) -> Option<Level> {
        self.file.levels().first().map(|li| li.shifted(self.shift).level)
    }

    /// All levels with at least one node, from the root downwards.
    pub fn support(&self) -> Vec<Level> {
        self.file.levels_top_down().map(|li| li.shifted(self.shift).level).collect()
    }

    /// Number of levels with at least one node.
    pub fn varcount(&self) -> usize {
        self.file.level_count()
    }

    /// Number of internal nodes.
    pub fn nodecount(&self) -> usize {
        self.file.nodecount()
    }

    pub fn width(&self) -> usize {
        self.file.width
    }

    /// Number of arcs to the terminal `value`.
    pub fn number_of_terminals(&self, value: bool) -> usize {
        self.file.number_of_terminals[(value ^ self.negate) as usize]
    }

    pub fn max_1level_cut(&self) -> Cuts {
        self.file.max_1level_cut.negate_if(self.negate)
    }

    pub fn max_2level_cut(&self) -> Cuts {
        self.file.max_2level_cut.negate_if(self.negate)
    }

    /// Bound on the arcs crossing a level, only counting the given kind.
    pub fn max_1level_cut_of(&self, ct: CutType) -> usize {
        self.max_1level_cut()[ct]
    }

    fn map_ptr(&self, p: Ptr) -> Ptr {
        p.shifted(self.shift).negate_if(self.negate)
    }

    fn map_node(&self, n: &Node) -> Node {
        if n.is_terminal() {
            return Node::terminal(n.value() ^ self.negate);
        }
        let n = n.shifted(self.shift);
        if self.negate {
            !n
        } else {
            n
        }
    }

    /// Nodes from the root downwards, with the shift and negation applied.
    pub fn nodes_top_down(&self) -> impl Iterator<Item = Node> + '_ {
        self.file.nodes_top_down().map(move |n| self.map_node(n))
    }

    /// Nodes from the deepest level upwards, with the shift and negation applied.
    pub fn nodes_bottom_up(&self) -> impl Iterator<Item = Node> + '_ {
        self.file.nodes().iter().map(move |n| self.map_node(n))
    }

    /// Random access to the nodes, as used by the top-down sweeps.
    pub(crate) fn view(&self) -> NodeView {
        let nodes = if self.is_terminal() {
            HashMap::new()
        } else {
            self.nodes_bottom_up().map(|n| (n.uid, n)).collect()
        };
        NodeView {
            nodes,
            root: self.root(),
        }
    }
}

/// The nodes of a diagram, indexed by their uid.
#[derive(Debug, Clone)]
pub(crate) struct NodeView {
    nodes: HashMap<Ptr, Node>,
    root: Ptr,
}

impl NodeView {
    pub fn root(&self) -> Ptr {
        self.root
    }

    /// The node `p` points to, if it is a node.
    pub fn node(&self, p: Ptr) -> Option<&Node> {
        if !p.is_node() {
            return None;
        }
        let n = self.nodes.get(&p.essential());
        debug_assert!(n.is_some(), "Dangling pointer {}", p);
        n
    }

    /// The low and high cofactor of `p` on `level`.
    pub fn cofactor<P: DdPolicy>(&self, p: Ptr, level: Level) -> (Ptr, Ptr) {
        P::cofactor(p, self.node(p), level)
    }
}

/// Result of a top-down sweep: either a diagram that needed no work, or arcs to be reduced.
#[derive(Debug, Clone)]
pub enum Unreduced<P: DdPolicy> {
    Reduced(DecisionDiagram<P>),
    Arcs(ArcFile),
}

impl<P: DdPolicy> Unreduced<P> {
    /// Reduces the arcs, if any. An already reduced diagram is returned as-is.
    pub fn reduce(self) -> DecisionDiagram<P> {
        match self {
            Unreduced::Reduced(dd) => dd,
            Unreduced::Arcs(arcs) => DecisionDiagram::from(reduce::<P>(&arcs)),
        }
    }

    /// Reduces the arcs while relabelling their levels.
    pub(crate) fn reduce_with(self, map_level: impl Fn(Level) -> Level) -> DecisionDiagram<P> {
        match self {
            Unreduced::Reduced(dd) => dd,
            Unreduced::Arcs(arcs) => DecisionDiagram::from(reduce_with::<P>(&arcs, map_level)),
        }
    }

    pub fn is_reduced(&self) -> bool {
        matches!(self, Unreduced::Reduced(_))
    }
}

impl<P: DdPolicy> From<DecisionDiagram<P>> for Unreduced<P> {
    fn from(dd: DecisionDiagram<P>) -> Self {
        Unreduced::Reduced(dd)
    }
}

impl<P: DdPolicy> From<ArcFile> for Unreduced<P> {
    fn from(arcs: ArcFile) -> Self {
        Unreduced::Arcs(arcs)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::level_info::LevelInfo;
    use crate::policy::{BddPolicy, ZddPolicy};
    use crate::types::MAX_ID;

    fn x0_and_x1() -> NodeFile {
        let n1 = Node::new(1, MAX_ID, Ptr::FALSE, Ptr::TRUE);
        let n0 = Node::new(0, MAX_ID, Ptr::FALSE, n1.uid);
        NodeFile::from_nodes([n1, n0])
    }

    #[test]
    fn test_terminal() {
        let t = DecisionDiagram::<BddPolicy>::terminal(true);
        assert!(t.is_terminal());
        assert!(t.value());
        assert_eq!(t.root(), Ptr::TRUE);
        assert_eq!(t.topvar(), None);

        let f = t.negated();
        assert!(!f.value());
        assert!(Rc::ptr_eq(t.file_ptr(), f.file_ptr()));
        assert_eq!(f.number_of_terminals(false), 1);
        assert_eq!(f.max_1level_cut(), Cuts::new(0, 1, 0, 1));
    }

    #[test]
    fn test_shift_and_negation_are_applied() {
        let dd = DecisionDiagram::<BddPolicy>::from(x0_and_x1());
        let g = dd.negated().shifted(2);

        assert_eq!(g.root(), Ptr::node(2, MAX_ID));
        assert_eq!(g.support(), vec![2, 3]);
        assert_eq!(g.maxvar(), Some(3));
        assert_eq!(g.number_of_terminals(true), 2);
        assert_eq!(g.number_of_terminals(false), 1);

        let nodes: Vec<Node> = g.nodes_top_down().collect();
        assert_eq!(
            nodes,
            vec![
                Node::new(2, MAX_ID, Ptr::TRUE, Ptr::node(3, MAX_ID)),
                Node::new(3, MAX_ID, Ptr::TRUE, Ptr::FALSE),
            ]
        );
        assert_eq!(g.file().levels()[0], LevelInfo::new(1, 1));
    }

    #[test]
    fn test_view_cofactor() {
        let dd = DecisionDiagram::<ZddPolicy>::from(x0_and_x1());
        let view = dd.view();
        let root = view.root();
        assert_eq!(view.cofactor::<ZddPolicy>(root, 0), (Ptr::FALSE, Ptr::node(1, MAX_ID)));
        assert_eq!(view.cofactor::<ZddPolicy>(Ptr::node(1, MAX_ID), 0), (Ptr::node(1, MAX_ID), Ptr::FALSE));
        assert_eq!(view.cofactor::<BddPolicy>(Ptr::TRUE, 0), (Ptr::TRUE, Ptr::TRUE));
    }

    #[test]
    fn test_reduced_input_is_kept() {
        let dd = DecisionDiagram::<BddPolicy>::from(x0_and_x1()).negated();
        let u: Unreduced<BddPolicy> = dd.clone().into();
        assert!(u.is_reduced());
        let r = u.reduce();
        assert!(Rc::ptr_eq(r.file_ptr(), dd.file_ptr()));
        assert!(r.is_negated());
    }
}
