//! Plumbing shared by the top-down sweeps.
//!
//! A sweep processes *requests* level by level, from the root downwards. Each request is keyed by
//! whatever tuple of pointers the algorithm recurses on, and remembers the arcs (their sources)
//! that point to it. Requests with equal keys on the same level are merged, which is what keeps the
//! output a DAG.
//!
//! A request is either *output* as a node with a fresh id on its level, or *forwarded* to another
//! request (or a terminal) without creating a node. Forwarding moves its sources along.

use std::collections::BTreeMap;

use crate::arc::Arc;
use crate::arc_file::{ArcFile, ArcWriter};
use crate::level_info::LevelInfo;
use crate::ptr::Ptr;
use crate::types::{Id, Level};

/// Where a recursion ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target<K> {
    Terminal(bool),
    /// A request on the given level.
    Request(Level, K),
}

/// Pending requests, grouped by level.
#[derive(Debug)]
pub(crate) struct RequestQueue<K: Ord> {
    levels: BTreeMap<Level, BTreeMap<K, Vec<Ptr>>>,
    pending_arcs: usize,
}

impl<K: Ord> RequestQueue<K> {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
            pending_arcs: 0,
        }
    }

    /// Adds `sources` to the request `key` on `level`. The root request has no sources.
    pub fn push(&mut self, level: Level, key: K, sources: impl IntoIterator<Item = Ptr>) {
        let entry = self.levels.entry(level).or_default().entry(key).or_default();
        let before = entry.len();
        entry.extend(sources);
        self.pending_arcs += entry.len() - before;
    }

    /// Removes all requests of the topmost pending level.
    pub fn pop_level(&mut self) -> Option<(Level, BTreeMap<K, Vec<Ptr>>)> {
        let (level, requests) = self.levels.pop_first()?;
        self.pending_arcs -= requests.values().map(Vec::len).sum::<usize>();
        Some((level, requests))
    }

    /// Number of arcs waiting for their target to be processed.
    pub fn pending_arcs(&self) -> usize {
        self.pending_arcs
    }
}

/// Output side of a sweep.
pub(crate) struct SweepWriter<'a> {
    writer: ArcWriter<'a>,
    level: Option<Level>,
    next_id: Id,
    terminal_root: Option<bool>,
    has_root: bool,
    max_pending: usize,
}

impl<'a> SweepWriter<'a> {
    pub fn new(file: &'a mut ArcFile) -> Self {
        Self {
            writer: ArcWriter::new(file),
            level: None,
            next_id: 0,
            terminal_root: None,
            has_root: false,
            max_pending: 0,
        }
    }

    /// Starts a new level. The previous one is closed first.
    pub fn begin_level(&mut self, level: Level) {
        self.end_level();
        self.level = Some(level);
        self.next_id = 0;
    }

    fn end_level(&mut self) {
        if let Some(level) = self.level.take() {
            if self.next_id > 0 {
                self.writer.push_level(LevelInfo::new(level, self.next_id as usize));
            }
        }
    }

    /// Pointer to a fresh node on the current level, whose incoming arcs are `sources`.
    pub fn output_node(&mut self, sources: &[Ptr]) -> Ptr {
        let level = match self.level {
            Some(level) => level,
            None => unreachable!("a level is started before nodes are output"),
        };
        let uid = Ptr::node(level, self.next_id);
        self.next_id += 1;
        self.connect(sources, uid);
        uid
    }

    /// Arcs from each of `sources` to `target`.
    pub fn connect(&mut self, sources: &[Ptr], target: Ptr) {
        if sources.is_empty() {
            if target.is_terminal() {
                self.terminal_root = Some(target.value());
            } else {
                self.has_root = true;
            }
        }
        for &source in sources {
            self.writer.push(Arc { source, target });
        }
    }

    /// The arc leaving `uid` towards `out_idx` ends in the terminal `value`.
    pub fn terminal_arc(&mut self, uid: Ptr, out_idx: bool, value: bool) {
        self.writer.push_terminal(Arc::new(uid, out_idx, Ptr::terminal(value)));
    }

    pub fn observe_pending(&mut self, pending_arcs: usize) {
        self.max_pending = self.max_pending.max(pending_arcs);
    }

    /// Closes the output. Returns the value of the result if it collapsed into a terminal.
    pub fn finish(mut self) -> Option<bool> {
        self.end_level();
        self.writer.set_max_1level_cut(self.max_pending);
        if self.has_root {
            None
        } else {
            self.terminal_root
        }
    }
}
