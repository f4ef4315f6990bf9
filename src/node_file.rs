//! Reduced diagrams stored level by level.
//!
//! A [`NodeFile`] holds its nodes bottom-up: the deepest level comes first, and within a level the
//! ids count down from [`MAX_ID`]. Next to the nodes it keeps per-level widths, the canonicity
//! flags, the number of arcs to each terminal and bounds on the 1-level and 2-level cuts.
//!
//! Files are only written through a [`NodeWriter`], which mutably borrows the file for as long as
//! it is alive. Dropping the writer finalizes the meta data.

use std::fmt::{Display, Formatter};

use crate::cut::{CutType, Cuts};
use crate::level_info::LevelInfo;
use crate::node::Node;
use crate::ptr::Ptr;
use crate::types::MAX_ID;

#[derive(Debug, Clone)]
pub struct NodeFile {
    nodes: Vec<Node>,
    levels: Vec<LevelInfo>,
    /// Nodes on each level are sorted by their children (descending).
    pub sorted: bool,
    /// Ids on each level are consecutive, starting from `MAX_ID`.
    pub indexable: bool,
    /// Largest number of nodes on a single level.
    pub width: usize,
    pub max_1level_cut: Cuts,
    pub max_2level_cut: Cuts,
    /// Number of arcs to the `false` and the `true` terminal.
    pub number_of_terminals: [usize; 2],
}

impl Default for NodeFile {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            levels: Vec::new(),
            sorted: true,
            indexable: true,
            width: 0,
            max_1level_cut: Cuts::MAX,
            max_2level_cut: Cuts::MAX,
            number_of_terminals: [0, 0],
        }
    }
}

impl NodeFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// File with a single terminal node.
    pub fn terminal(value: bool) -> Self {
        Self::from_nodes([Node::terminal(value)])
    }

    /// Writes the given nodes (bottom-up) through [`NodeWriter::push`].
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut file = NodeFile::new();
        {
            let mut writer = NodeWriter::new(&mut file);
            for n in nodes {
                writer.push(n);
            }
        }
        file
    }

    /// Number of stored nodes (a terminal file stores one).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_terminal(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].is_terminal()
    }

    /// Value of a terminal file.
    pub fn value(&self) -> bool {
        assert!(self.is_terminal(), "Only terminal files have a value");
        self.nodes[0].value()
    }

    pub fn is_canonical(&self) -> bool {
        self.sorted && self.indexable
    }

    /// Number of internal nodes.
    pub fn nodecount(&self) -> usize {
        if self.is_terminal() {
            0
        } else {
            self.nodes.len()
        }
    }

    /// Nodes in storage order, i.e. bottom-up.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Nodes from the root downwards.
    pub fn nodes_top_down(&self) -> impl DoubleEndedIterator<Item = &Node> + '_ {
        self.nodes.iter().rev()
    }

    /// Level information in storage order, i.e. bottom-up.
    pub fn levels(&self) -> &[LevelInfo] {
        &self.levels
    }

    pub fn levels_top_down(&self) -> impl DoubleEndedIterator<Item = &LevelInfo> + '_ {
        self.levels.iter().rev()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Pointer to the root, which is the last node written.
    pub fn root(&self) -> Ptr {
        self.nodes.last().map(|n| n.uid).unwrap_or(Ptr::NIL)
    }
}

impl Display for NodeFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, n) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", n)?;
        }
        write!(f, "]")
    }
}

/// Exclusive writer for a [`NodeFile`].
///
/// [`push`][NodeWriter::push] derives level information, canonicity and cuts itself; the
/// `*_unchecked` methods leave that to the caller.
pub struct NodeWriter<'a> {
    file: &'a mut NodeFile,
    latest: Option<Node>,
    level_size: usize,
    terminals_at_bottom: [usize; 2],
    max_1level_short_internal: usize,
    curr_1level_short_internal: usize,
    long_internal_ptr: Ptr,
    number_of_long_internal_arcs: usize,
    finished: bool,
}

impl<'a> NodeWriter<'a> {
    pub fn new(file: &'a mut NodeFile) -> Self {
        debug_assert!(file.is_empty(), "Can only write to an empty file");
        Self {
            file,
            latest: None,
            level_size: 0,
            terminals_at_bottom: [0, 0],
            max_1level_short_internal: 0,
            curr_1level_short_internal: 0,
            long_internal_ptr: Ptr::NIL,
            number_of_long_internal_arcs: 0,
            finished: false,
        }
    }

    /// Writes the next node, which must be above (or to the left of) all nodes written so far.
    pub fn push(&mut self, n: Node) {
        let first_push = self.latest.is_none();
        debug_assert!(first_push == !self.has_pushed(), "'push' is only meant for empty files");
        debug_assert!(
            self.latest.map_or(true, |l| !l.is_terminal()),
            "Cannot push after having pushed a terminal"
        );

        if n.is_terminal() {
            debug_assert!(first_push, "A terminal can only be pushed into an empty file");
            self.file.number_of_terminals[n.value() as usize] += 1;
        }

        let new_level = match self.latest {
            Some(l) => l.level() != n.level(),
            None => false,
        };

        match self.latest {
            None => {
                self.file.indexable &= n.is_terminal() || n.id() == MAX_ID;
            }
            Some(l) => {
                debug_assert!(!new_level || n.level() < l.level(), "Levels must be pushed bottom-up");
                self.file.sorted &= new_level || n.high < l.high || (n.high == l.high && n.low < l.low);
                self.file.indexable &= if new_level {
                    n.id() == MAX_ID
                } else {
                    n.id() + 1 == l.id()
                };
            }
        }

        if new_level {
            if let Some(l) = self.latest {
                self.push_level_unchecked(LevelInfo::new(l.level(), self.level_size));
                self.level_size = 0;

                self.max_1level_short_internal = self.max_1level_short_internal.max(self.curr_1level_short_internal);
                self.curr_1level_short_internal = 0;
                self.long_internal_ptr = Ptr::node(l.level(), MAX_ID);
            }
        }

        let pushing_to_bottom = self.long_internal_ptr == Ptr::NIL;
        for child in [n.low, n.high] {
            if child.is_terminal() && pushing_to_bottom {
                self.terminals_at_bottom[child.value() as usize] += 1;
            }
            if child.is_node() {
                if child > self.long_internal_ptr {
                    self.number_of_long_internal_arcs += 1;
                } else {
                    self.curr_1level_short_internal += 1;
                }
            }
        }

        self.latest = Some(n);
        self.level_size += 1;
        self.push_unchecked(n);
    }

    /// Writes a node without any checks. Only its terminal children are counted.
    pub fn push_unchecked(&mut self, n: Node) {
        if n.low.is_terminal() {
            self.file.number_of_terminals[n.low.value() as usize] += 1;
        }
        if n.high.is_terminal() {
            self.file.number_of_terminals[n.high.value() as usize] += 1;
        }
        self.file.nodes.push(n);
    }

    /// Writes level information without any checks.
    pub fn push_level_unchecked(&mut self, li: LevelInfo) {
        self.file.width = self.file.width.max(li.width);
        self.file.levels.push(li);
    }

    /// Raises the 1-level cut to at least `cuts`.
    pub fn max_1level_cut_with(&mut self, cuts: &Cuts) {
        self.file.max_1level_cut.max_with(cuts);
    }

    /// Adds `cuts` onto the 1-level cut.
    pub fn inc_1level_cut(&mut self, cuts: &Cuts) {
        self.file.max_1level_cut.inc(cuts);
    }

    pub fn set_1level_cut(&mut self, cuts: Cuts) {
        self.file.max_1level_cut = cuts;
    }

    pub fn set_2level_cut(&mut self, cuts: Cuts) {
        self.file.max_2level_cut = cuts;
    }

    /// Current value of the 1-level cut.
    pub fn max_1level_cut(&self) -> Cuts {
        self.file.max_1level_cut
    }

    pub fn set_number_of_terminals(&mut self, number_of_false: usize, number_of_true: usize) {
        self.file.number_of_terminals = [number_of_false, number_of_true];
    }

    pub fn set_sorted(&mut self, value: bool) {
        self.file.sorted = value;
    }

    pub fn set_indexable(&mut self, value: bool) {
        self.file.indexable = value;
    }

    pub fn set_canonical(&mut self, value: bool) {
        self.set_sorted(value);
        self.set_indexable(value);
    }

    pub fn has_pushed(&self) -> bool {
        !self.file.nodes.is_empty() || !self.file.levels.is_empty()
    }

    /// Finalizes the file. Equivalent to dropping the writer.
    pub fn finish(self) {}

    fn detach(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        if let Some(latest) = self.latest {
            if !latest.is_terminal() {
                self.push_level_unchecked(LevelInfo::new(latest.level(), self.level_size));
            }

            self.max_1level_short_internal = self.max_1level_short_internal.max(self.curr_1level_short_internal);
            let internal = self.max_1level_short_internal + self.number_of_long_internal_arcs;

            let [all_false, all_true] = self.file.number_of_terminals;
            let above_false = all_false - self.terminals_at_bottom[0];
            let above_true = all_true - self.terminals_at_bottom[1];

            self.file.max_1level_cut = Cuts::new(
                internal,
                (internal + above_false).max(all_false),
                (internal + above_true).max(all_true),
                (internal + above_false + above_true).max(all_false + all_true),
            );
        }

        self.fixup_ilevel_cuts();
    }

    /// Bounds the derived cuts by their trivial upper bounds.
    fn fixup_ilevel_cuts(&mut self) {
        let file = &mut *self.file;
        let number_of_nodes = file.nodes.len();
        let [number_of_false, number_of_true] = file.number_of_terminals;

        // Any directed cut is bounded by the number of nodes
        let max_cut = number_of_nodes.checked_add(1).unwrap_or(usize::MAX);

        // ... and by the number of arcs
        let all_arcs = if number_of_nodes <= usize::MAX / 2 {
            let arcs = 2 * number_of_nodes;
            Cuts::new(
                arcs.saturating_sub(number_of_false + number_of_true),
                arcs.saturating_sub(number_of_true),
                arcs.saturating_sub(number_of_false),
                arcs,
            )
        } else {
            Cuts::MAX
        };

        let is_terminal = number_of_false + number_of_true == 1;
        if is_terminal {
            file.max_1level_cut = Cuts::new(0, number_of_false, number_of_true, 1);
        } else {
            for ct in CutType::ALL_TYPES {
                // A non-terminal has at least the arc to its root
                file.max_1level_cut[ct] = file.max_1level_cut[ct].min(max_cut).min(all_arcs[ct]).max(1);
            }
        }

        if is_terminal || number_of_nodes == file.levels.len() {
            file.max_2level_cut = file.max_1level_cut;
        } else {
            let internal = file.max_1level_cut[CutType::Internal];
            for ct in CutType::ALL_TYPES {
                let c = file.max_1level_cut[ct];
                let from_1level = if c < usize::MAX / 3 {
                    (internal * 3) / 2 + (c - internal)
                } else {
                    usize::MAX
                };
                file.max_2level_cut[ct] = file.max_2level_cut[ct].min(from_1level).min(max_cut).min(all_arcs[ct]);
            }
        }
    }
}

impl Drop for NodeWriter<'_> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_terminal_file() {
        let f = NodeFile::terminal(true);
        assert!(f.is_terminal());
        assert!(f.value());
        assert_eq!(f.nodecount(), 0);
        assert_eq!(f.level_count(), 0);
        assert_eq!(f.width, 0);
        assert_eq!(f.number_of_terminals, [0, 1]);
        assert_eq!(f.max_1level_cut, Cuts::new(0, 0, 1, 1));
        assert_eq!(f.max_2level_cut, Cuts::new(0, 0, 1, 1));

        let f = NodeFile::terminal(false);
        assert_eq!(f.max_1level_cut, Cuts::new(0, 1, 0, 1));
        assert_eq!(f.max_2level_cut, Cuts::new(0, 1, 0, 1));
    }

    #[test]
    fn test_single_node() {
        let f = NodeFile::from_nodes([Node::new(0, MAX_ID, Ptr::FALSE, Ptr::TRUE)]);
        assert!(!f.is_terminal());
        assert!(f.is_canonical());
        assert_eq!(f.levels(), &[LevelInfo::new(0, 1)]);
        assert_eq!(f.width, 1);
        assert_eq!(f.number_of_terminals, [1, 1]);
        assert_eq!(f.max_1level_cut, Cuts::new(1, 1, 1, 2));
        assert_eq!(f.max_2level_cut, Cuts::new(1, 1, 1, 2));
        assert_eq!(f.root(), Ptr::node(0, MAX_ID));
    }

    #[test]
    fn test_levels_and_cuts() {
        //      1        ---- x0
        //     / \
        //     2  3      ---- x1
        //    / \/ \
        //    F  4  T    ---- x2
        //      / \
        //      F T
        let n4 = Node::new(2, MAX_ID, Ptr::FALSE, Ptr::TRUE);
        let n3 = Node::new(1, MAX_ID, n4.uid, Ptr::TRUE);
        let n2 = Node::new(1, MAX_ID - 1, Ptr::FALSE, n4.uid);
        let n1 = Node::new(0, MAX_ID, n2.uid, n3.uid);

        let f = NodeFile::from_nodes([n4, n3, n2, n1]);
        println!("f = {}", f);

        assert!(f.sorted);
        assert!(f.indexable);
        assert_eq!(f.nodecount(), 4);
        assert_eq!(
            f.levels(),
            &[LevelInfo::new(2, 1), LevelInfo::new(1, 2), LevelInfo::new(0, 1)]
        );
        assert_eq!(f.width, 2);
        assert_eq!(f.number_of_terminals, [2, 2]);
        assert_eq!(f.max_1level_cut[CutType::Internal], 2);
        assert_eq!(f.max_1level_cut[CutType::All], 4);
        assert_eq!(f.root(), n1.uid);
        assert_eq!(f.nodes_top_down().next(), Some(&n1));
    }

    #[test]
    fn test_not_indexable() {
        let f = NodeFile::from_nodes([Node::new(0, 3, Ptr::FALSE, Ptr::TRUE)]);
        assert!(f.sorted);
        assert!(!f.indexable);
        assert!(!f.is_canonical());
    }

    #[test]
    fn test_not_sorted() {
        let a = Node::new(1, MAX_ID, Ptr::TRUE, Ptr::FALSE);
        let b = Node::new(1, MAX_ID - 1, Ptr::FALSE, Ptr::TRUE);
        let f = NodeFile::from_nodes([a, b]);
        assert!(!f.sorted);
        assert!(f.indexable);
    }
}
