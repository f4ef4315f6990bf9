use std::fmt::{Display, Formatter};
use std::ops::Not;

use crate::ptr::Ptr;
use crate::types::{Id, Level, SignedLevel};

/// A decision diagram node: its `uid` and its two children.
///
/// A terminal node has a terminal `uid` and `nil` children.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    pub uid: Ptr,
    pub low: Ptr,
    pub high: Ptr,
}

impl Node {
    pub fn new(level: Level, id: Id, low: Ptr, high: Ptr) -> Self {
        Self::from_uid(Ptr::node(level, id), low, high)
    }

    pub fn from_uid(uid: Ptr, low: Ptr, high: Ptr) -> Self {
        debug_assert!(uid.is_node() && uid == uid.essential());
        Self { uid, low, high }
    }

    pub fn terminal(value: bool) -> Self {
        Self {
            uid: Ptr::terminal(value),
            low: Ptr::NIL,
            high: Ptr::NIL,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.uid.is_terminal()
    }

    pub fn value(&self) -> bool {
        self.uid.value()
    }

    pub fn level(&self) -> Level {
        self.uid.level()
    }

    pub fn id(&self) -> Id {
        self.uid.id()
    }

    /// Child selected by the out-index.
    pub fn child(&self, out_idx: bool) -> Ptr {
        if out_idx {
            self.high
        } else {
            self.low
        }
    }

    /// Moves the node (and its node children) by `shift` levels.
    pub fn shifted(&self, shift: SignedLevel) -> Self {
        if shift == 0 || self.is_terminal() {
            return *self;
        }
        Self {
            uid: self.uid.shifted(shift),
            low: self.low.shifted(shift),
            high: self.high.shifted(shift),
        }
    }

    /// Relabels the node and its node children with `m`.
    pub fn relabeled(&self, m: impl Fn(Level) -> Level) -> Self {
        if self.is_terminal() {
            return *self;
        }
        let relabel = |p: Ptr| if p.is_node() { p.with_level(m(p.level())) } else { p };
        Self {
            uid: relabel(self.uid),
            low: relabel(self.low),
            high: relabel(self.high),
        }
    }
}

impl Not for Node {
    type Output = Node;

    /// Negates all terminals the node refers to.
    fn not(self) -> Self::Output {
        if self.is_terminal() {
            return Node::terminal(!self.value());
        }
        Node {
            uid: self.uid,
            low: self.low.negate_terminal(),
            high: self.high.negate_terminal(),
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_terminal() {
            write!(f, "{}", self.uid)
        } else {
            write!(f, "{}: {} ? {} : {}", self.uid, self.level(), self.high, self.low)
        }
    }
}
