//! Unreduced diagrams as lists of arcs.
//!
//! Top-down sweeps output their result as an [`ArcFile`], which the reduction then consumes
//! bottom-up. Arcs to internal nodes are kept sorted by their target, so reading them back-to-front
//! visits the targets from the bottom up. Arcs to terminals are split in two lists: those written
//! in ascending order of their source, and those that were not. The latter are sorted when the
//! [`ArcWriter`] is dropped, and the [`ArcReader`] merges both lists on the fly.

use crate::arc::Arc;
use crate::level_info::LevelInfo;
use crate::node_file::NodeFile;
use crate::ptr::Ptr;
use crate::cut::CutType;

#[derive(Debug, Clone, Default)]
pub struct ArcFile {
    internal: Vec<Arc>,
    terminals_in_order: Vec<Arc>,
    terminals_out_of_order: Vec<Arc>,
    levels: Vec<LevelInfo>,
    /// Upper bound on the number of arcs crossing any level.
    pub max_1level_cut: usize,
    /// Number of arcs to the `false` and the `true` terminal.
    pub number_of_terminals: [usize; 2],
}

impl ArcFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arcs to internal nodes, sorted by their target.
    pub fn internal_arcs(&self) -> &[Arc] {
        &self.internal
    }

    /// Level information, top-down.
    pub fn levels(&self) -> &[LevelInfo] {
        &self.levels
    }

    pub fn number_of_internal_arcs(&self) -> usize {
        self.internal.len()
    }

    pub fn number_of_terminal_arcs(&self) -> usize {
        self.terminals_in_order.len() + self.terminals_out_of_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.number_of_terminal_arcs() == 0
    }

    pub(crate) fn reader(&self) -> ArcReader<'_> {
        ArcReader {
            file: self,
            internal_left: self.internal.len(),
            in_order_left: self.terminals_in_order.len(),
            out_of_order_left: self.terminals_out_of_order.len(),
            unread_terminals: self.number_of_terminals,
        }
    }
}

impl From<&NodeFile> for ArcFile {
    /// Re-expresses a reduced diagram as its arcs.
    fn from(file: &NodeFile) -> Self {
        assert!(!file.is_terminal(), "A terminal has no arcs");

        let mut arcs = ArcFile::new();
        {
            let mut writer = ArcWriter::new(&mut arcs);
            for li in file.levels_top_down() {
                writer.push_level(*li);
            }
            for n in file.nodes_top_down() {
                writer.push(Arc::new(n.uid, false, n.low));
                writer.push(Arc::new(n.uid, true, n.high));
            }
        }
        arcs.max_1level_cut = file.max_1level_cut[CutType::Internal];
        arcs
    }
}

/// Exclusive writer for an [`ArcFile`].
pub struct ArcWriter<'a> {
    file: &'a mut ArcFile,
    latest_terminal_source: Option<Ptr>,
    finished: bool,
}

impl<'a> ArcWriter<'a> {
    pub fn new(file: &'a mut ArcFile) -> Self {
        debug_assert!(file.is_empty(), "Can only write to an empty file");
        Self {
            file,
            latest_terminal_source: None,
            finished: false,
        }
    }

    pub fn push(&mut self, arc: Arc) {
        debug_assert!(!arc.target.is_nil(), "Should not push an arc to nil");
        if arc.target.is_node() {
            self.push_internal(arc);
        } else {
            self.push_terminal(arc);
        }
    }

    pub fn push_internal(&mut self, arc: Arc) {
        debug_assert!(arc.target.is_node());
        debug_assert!(!arc.source.is_nil());
        self.file.internal.push(arc);
    }

    pub fn push_terminal(&mut self, arc: Arc) {
        debug_assert!(arc.target.is_terminal());
        debug_assert!(!arc.source.is_nil());

        let in_order = self.latest_terminal_source.map_or(true, |s| arc.source > s);
        if in_order {
            self.latest_terminal_source = Some(arc.source);
            self.file.terminals_in_order.push(arc);
        } else {
            self.file.terminals_out_of_order.push(arc);
        }
        self.file.number_of_terminals[arc.target.value() as usize] += 1;
    }

    /// Adds the (unreduced) width of a level. Levels are pushed top-down.
    pub fn push_level(&mut self, li: LevelInfo) {
        debug_assert!(
            self.file.levels.last().map_or(true, |l| l.level < li.level),
            "Levels must be pushed top-down"
        );
        self.file.levels.push(li);
    }

    pub fn set_max_1level_cut(&mut self, cut: usize) {
        self.file.max_1level_cut = cut;
    }

    /// Finalizes the file. Equivalent to dropping the writer.
    pub fn finish(self) {}

    fn detach(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.file.internal.sort_by_key(|a| a.target);
        self.file.terminals_out_of_order.sort_by_key(|a| a.source);
    }
}

impl Drop for ArcWriter<'_> {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Reads an [`ArcFile`] bottom-up.
pub(crate) struct ArcReader<'a> {
    file: &'a ArcFile,
    internal_left: usize,
    in_order_left: usize,
    out_of_order_left: usize,
    unread_terminals: [usize; 2],
}

impl ArcReader<'_> {
    pub fn can_pull_internal(&self) -> bool {
        self.internal_left > 0
    }

    pub fn peek_internal(&self) -> Arc {
        self.file.internal[self.internal_left - 1]
    }

    pub fn pull_internal(&mut self) -> Arc {
        let a = self.peek_internal();
        self.internal_left -= 1;
        a
    }

    pub fn can_pull_terminal(&self) -> bool {
        self.unread_terminals[0] + self.unread_terminals[1] > 0
    }

    pub fn unread_terminals(&self, value: bool) -> usize {
        self.unread_terminals[value as usize]
    }

    /// Whether the next terminal arc comes from the in-order list.
    fn take_in_order(&self) -> bool {
        match (self.in_order_left > 0, self.out_of_order_left > 0) {
            (a, b) if a != b => a,
            _ => {
                let in_order = self.file.terminals_in_order[self.in_order_left - 1].source;
                let out_of_order = self.file.terminals_out_of_order[self.out_of_order_left - 1].source;
                in_order > out_of_order
            }
        }
    }

    pub fn peek_terminal(&self) -> Arc {
        if self.take_in_order() {
            self.file.terminals_in_order[self.in_order_left - 1]
        } else {
            self.file.terminals_out_of_order[self.out_of_order_left - 1]
        }
    }

    pub fn pull_terminal(&mut self) -> Arc {
        let a = if self.take_in_order() {
            self.in_order_left -= 1;
            self.file.terminals_in_order[self.in_order_left]
        } else {
            self.out_of_order_left -= 1;
            self.file.terminals_out_of_order[self.out_of_order_left]
        };
        let value = a.target.value() as usize;
        debug_assert!(self.unread_terminals[value] > 0, "Terminal counter should not be zero");
        self.unread_terminals[value] -= 1;
        a
    }
}
