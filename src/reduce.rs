//! Bottom-up reduction of an [`ArcFile`] into a canonical [`NodeFile`].
//!
//! The arcs are processed one level at a time, from the deepest level up to the root. On each level
//! the nodes are reassembled from their two outgoing arcs, which either come from the terminal
//! arcs of the input or have been forwarded from the level below through a priority queue.
//!
//! - **Rule 1**: a node that [`DdPolicy::reduction_rule`] deems redundant is replaced by one of its
//!   children. Arcs that are redirected this way are flagged, since they may skip past the levels in
//!   between and so cannot be attributed to a single level cut.
//! - **Rule 2**: the remaining nodes are sorted by their children, such that duplicates end up
//!   next to each other. Each group becomes a single output node, and ids are handed out from
//!   [`MAX_ID`] downwards in that order.
//!
//! The resulting mappings from old to new nodes are then forwarded to the parents on the levels
//! above, which is possible in a single pass since the internal arcs are sorted by their target.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, trace};

use crate::arc::{node_of, Arc};
use crate::arc_file::{ArcFile, ArcReader};
use crate::cut::Cuts;
use crate::level_info::LevelInfo;
use crate::node::Node;
use crate::node_file::{NodeFile, NodeWriter};
use crate::policy::DdPolicy;
use crate::ptr::Ptr;
use crate::stats;
use crate::types::{Level, MAX_ID};

/// Arc waiting in the [`ReduceQueue`]. The highest source comes out first, so the high arc of a
/// node is pulled right before its low arc.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct QueuedArc(Arc);

impl Ord for QueuedArc {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .source
            .cmp(&other.0.source)
            .then_with(|| self.0.target.cmp(&other.0.target))
    }
}

impl PartialOrd for QueuedArc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of forwarded arcs that also counts the arcs it holds to each terminal.
#[derive(Debug, Default)]
struct ReduceQueue {
    heap: BinaryHeap<QueuedArc>,
    terminals: [usize; 2],
}

impl ReduceQueue {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            terminals: [0, 0],
        }
    }

    fn push(&mut self, arc: Arc) {
        if arc.target.is_terminal() {
            self.terminals[arc.target.value() as usize] += 1;
        }
        self.heap.push(QueuedArc(arc));
    }

    /// Whether the next arc in the queue leaves from `level`.
    fn can_pull(&self, level: Level) -> bool {
        self.heap.peek().map_or(false, |a| a.0.source.level() == level)
    }

    fn top(&self) -> Option<Arc> {
        self.heap.peek().map(|a| a.0)
    }

    fn pull(&mut self) -> Option<Arc> {
        let arc = self.heap.pop()?.0;
        if arc.target.is_terminal() {
            self.terminals[arc.target.value() as usize] -= 1;
        }
        Some(arc)
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn len_without_terminals(&self) -> usize {
        self.heap.len() - self.terminals[0] - self.terminals[1]
    }

    fn terminals(&self, value: bool) -> usize {
        self.terminals[value as usize]
    }
}

/// Mapping of a node of the input to its counterpart in the output.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Mapping {
    old: Ptr,
    new: Ptr,
}

/// Next arc leaving `level`: whichever of the queue and the terminal arcs has the larger source.
fn next_arc(queue: &mut ReduceQueue, arcs: &mut ArcReader<'_>, level: Level) -> Arc {
    let take_terminal = match queue.top() {
        Some(top) if top.source.level() == level => {
            arcs.can_pull_terminal() && arcs.peek_terminal().source > top.source
        }
        _ => true,
    };
    if take_terminal {
        arcs.pull_terminal()
    } else {
        match queue.pull() {
            Some(arc) => arc,
            None => unreachable!("the queue was checked to be non-empty"),
        }
    }
}

/// Reduces `arcs` into the canonical diagram of kind `P`.
pub fn reduce<P: DdPolicy>(arcs: &ArcFile) -> NodeFile {
    reduce_with::<P>(arcs, |level| level)
}

/// Reduces `arcs` while relabelling every level with `map_level`.
///
/// `map_level` must be strictly monotone on the levels of `arcs`, since the output is written in
/// the same order as the input is read.
pub fn reduce_with<P: DdPolicy>(arcs: &ArcFile, map_level: impl Fn(Level) -> Level) -> NodeFile {
    assert!(!arcs.is_empty(), "Cannot reduce an empty arc file");
    debug!(
        "reduce<{}>(internal arcs = {}, terminal arcs = {}, levels = {})",
        P::NAME,
        arcs.number_of_internal_arcs(),
        arcs.number_of_terminal_arcs(),
        arcs.levels().len()
    );

    stats::record(|s| {
        s.reduce.runs += 1;
        s.reduce.sum_node_arcs += arcs.number_of_internal_arcs();
        s.reduce.sum_terminal_arcs += arcs.number_of_terminal_arcs();
    });

    let mut out = NodeFile::new();
    {
        let mut writer = NodeWriter::new(&mut out);
        writer.set_canonical(true);
        writer.set_1level_cut(Cuts::ZERO);

        let mut reader = arcs.reader();
        if !reader.can_pull_internal() {
            reduce_single_node::<P>(&mut reader, &mut writer, &map_level);
        } else {
            let mut queue = ReduceQueue::with_capacity(arcs.max_1level_cut);
            let mut previous_out_level: Option<Level> = None;

            for li in arcs.levels().iter().rev() {
                let out_level = map_level(li.level);
                debug_assert!(
                    previous_out_level.map_or(true, |prev| out_level < prev),
                    "Level mapping must preserve the order of levels"
                );
                previous_out_level = Some(out_level);

                reduce_level::<P>(&mut reader, &mut queue, &mut writer, li.level, out_level, li.width);
            }
        }
    }

    debug!(
        "reduce<{}>: {} nodes on {} levels (width {})",
        P::NAME,
        out.nodecount(),
        out.level_count(),
        out.width
    );
    out
}

/// The input consists of a single node, so all its arcs go to terminals.
fn reduce_single_node<P: DdPolicy>(
    arcs: &mut ArcReader<'_>,
    out: &mut NodeWriter<'_>,
    map_level: &impl Fn(Level) -> Level,
) {
    stats::record(|s| s.reduce.trivial += 1);

    let e_high = arcs.pull_terminal();
    let e_low = arcs.pull_terminal();
    let n = node_of(&e_low, &e_high);

    let ret = P::reduction_rule(&n);
    if ret != n.uid {
        stats::record(|s| s.reduce.removed_by_rule_1 += 1);

        let value = ret.value();
        trace!("single node {} reduced to terminal {}", n.uid, value);
        out.push_unchecked(Node::terminal(value));
        out.set_number_of_terminals(!value as usize, value as usize);

        let mut cut = out.max_1level_cut();
        cut.add(0, !value as usize, value as usize);
        out.set_1level_cut(cut);
    } else {
        let level = map_level(n.level());
        out.push_unchecked(Node::new(level, MAX_ID, n.low, n.high));
        out.push_level_unchecked(LevelInfo::new(level, 1));

        let false_arcs = (n.low.is_false() as usize) + (n.high.is_false() as usize);
        let true_arcs = (n.low.is_true() as usize) + (n.high.is_true() as usize);
        out.set_1level_cut(Cuts::new(1, false_arcs.max(1), true_arcs.max(1), 2));
    }

    let cut = out.max_1level_cut();
    out.set_2level_cut(cut);
}

/// Reduces all nodes on `in_level`, writes them to `out_level` and forwards the results to their
/// parents.
fn reduce_level<P: DdPolicy>(
    arcs: &mut ArcReader<'_>,
    queue: &mut ReduceQueue,
    out: &mut NodeWriter<'_>,
    in_level: Level,
    out_level: Level,
    unreduced_width: usize,
) {
    let mut red1: Vec<Mapping> = Vec::new();
    let mut child_grouping: Vec<Node> = Vec::with_capacity(unreduced_width);

    while (arcs.can_pull_terminal() && arcs.peek_terminal().source.level() == in_level) || queue.can_pull(in_level) {
        let e_high = next_arc(queue, arcs, in_level);
        let e_low = next_arc(queue, arcs, in_level);

        let n = node_of(&e_low, &e_high);
        debug_assert_eq!(n.level(), in_level, "Node should be on the level being reduced");

        let ret = P::reduction_rule(&n);
        if ret != n.uid {
            red1.push(Mapping { old: n.uid, new: ret });
        } else {
            child_grouping.push(n);
        }
    }

    // Arcs that cross below this level
    let mut local_cut = Cuts::ZERO;
    let mut tainted_cut = Cuts::ZERO;
    local_cut.add(
        queue.len_without_terminals(),
        queue.terminals(false) + arcs.unread_terminals(false),
        queue.terminals(true) + arcs.unread_terminals(true),
    );

    child_grouping.sort_unstable_by(|a, b| {
        b.high
            .unflag()
            .cmp(&a.high.unflag())
            .then_with(|| b.low.unflag().cmp(&a.low.unflag()))
            .then_with(|| b.uid.cmp(&a.uid))
    });

    let mut red2: Vec<Mapping> = Vec::with_capacity(child_grouping.len());
    let mut next_id = MAX_ID;
    let mut reduced_width = 0usize;
    let mut removed_by_rule_2 = 0usize;
    let mut out_node: Option<Node> = None;

    for n in &child_grouping {
        let (low, high) = (n.low.unflag(), n.high.unflag());
        let is_duplicate = out_node.map_or(false, |o| o.low == low && o.high == high);

        if is_duplicate {
            removed_by_rule_2 += 1;
        } else {
            let o = Node::new(out_level, next_id, low, high);
            next_id = next_id.saturating_sub(1);
            reduced_width += 1;
            out.push_unchecked(o);

            let low_cut = if n.low.is_flagged() { &mut tainted_cut } else { &mut local_cut };
            low_cut.add_target(low);
            let high_cut = if n.high.is_flagged() { &mut tainted_cut } else { &mut local_cut };
            high_cut.add_target(high);

            out_node = Some(o);
        }

        if let Some(o) = out_node {
            red2.push(Mapping { old: n.uid, new: o.uid });
        }
    }

    if reduced_width > 0 {
        out.push_level_unchecked(LevelInfo::new(out_level, reduced_width));
    }

    trace!(
        "level {} -> {}: {} nodes in, {} out, {} removed by rule 1, {} by rule 2",
        in_level,
        out_level,
        unreduced_width,
        reduced_width,
        red1.len(),
        removed_by_rule_2
    );
    stats::record(|s| {
        s.reduce.removed_by_rule_1 += red1.len();
        s.reduce.removed_by_rule_2 += removed_by_rule_2;
    });

    // Back in the order of the internal arcs, i.e. descending by the old uid
    red2.sort_unstable_by(|a, b| b.old.cmp(&a.old));

    let mut red1_iter = red1.iter().peekable();
    let mut red2_iter = red2.iter().peekable();
    loop {
        let (current, is_red1) = match (red1_iter.peek(), red2_iter.peek()) {
            (None, None) => break,
            (Some(m1), Some(m2)) if m1.old > m2.old => (**m1, true),
            (Some(m1), None) => (**m1, true),
            (_, Some(m2)) => (**m2, false),
        };
        if is_red1 {
            red1_iter.next();
        } else {
            red2_iter.next();
        }

        debug_assert!(
            !arcs.can_pull_internal() || arcs.peek_internal().target == current.old,
            "Mappings should be forwarded in sync with the internal arcs"
        );

        // Arcs redirected by Rule 1 are flagged, such that their parents count them as tainted
        let target = if is_red1 { current.new.flag() } else { current.new };
        while arcs.can_pull_internal() && arcs.peek_internal().target == current.old {
            let source = arcs.pull_internal().source;
            queue.push(Arc { source, target });
        }
    }

    out.max_1level_cut_with(&local_cut);
    out.inc_1level_cut(&tainted_cut);

    // Everything has collapsed into a single terminal
    if queue.is_empty() && !out.has_pushed() {
        debug_assert!(
            !arcs.can_pull_internal() && !arcs.can_pull_terminal(),
            "All arcs should be processed at this point"
        );
        let value = match red1.last() {
            Some(m) => m.new.is_terminal() && m.new.value(),
            None => false,
        };
        trace!("reduced to terminal {}", value);
        out.push_unchecked(Node::terminal(value));
        out.set_number_of_terminals(!value as usize, value as usize);
    }
}
