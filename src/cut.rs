//! Bounds on the number of arcs crossing a level.
//!
//! A *1-level cut* is an upper bound on the arcs crossing any single level boundary; a *2-level
//! cut* bounds the arcs crossing two adjacent boundaries. Each is split by which terminal arcs are
//! included in the count.

use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};

use crate::ptr::Ptr;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CutType {
    /// Only arcs to internal nodes.
    Internal = 0,
    /// Internal arcs and arcs to `false`.
    InternalFalse = 1,
    /// Internal arcs and arcs to `true`.
    InternalTrue = 2,
    /// All arcs.
    All = 3,
}

impl CutType {
    pub const ALL_TYPES: [CutType; 4] = [
        CutType::Internal,
        CutType::InternalFalse,
        CutType::InternalTrue,
        CutType::All,
    ];

    pub fn new(include_false: bool, include_true: bool) -> Self {
        match (include_false, include_true) {
            (false, false) => CutType::Internal,
            (true, false) => CutType::InternalFalse,
            (false, true) => CutType::InternalTrue,
            (true, true) => CutType::All,
        }
    }

    pub fn includes(self, terminal: bool) -> bool {
        match self {
            CutType::Internal => false,
            CutType::InternalFalse => !terminal,
            CutType::InternalTrue => terminal,
            CutType::All => true,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Cuts([usize; 4]);

impl Cuts {
    /// The trivially sound bound.
    pub const MAX: Cuts = Cuts([usize::MAX; 4]);
    pub const ZERO: Cuts = Cuts([0; 4]);

    pub const fn new(internal: usize, internal_false: usize, internal_true: usize, all: usize) -> Self {
        Cuts([internal, internal_false, internal_true, all])
    }

    pub fn as_array(&self) -> [usize; 4] {
        self.0
    }

    /// Adds `internal` internal arcs and the given number of terminal arcs.
    pub fn add(&mut self, internal: usize, false_arcs: usize, true_arcs: usize) {
        self[CutType::Internal] += internal;
        self[CutType::InternalFalse] += internal + false_arcs;
        self[CutType::InternalTrue] += internal + true_arcs;
        self[CutType::All] += internal + false_arcs + true_arcs;
    }

    /// Adds a single arc to `target`.
    pub fn add_target(&mut self, target: Ptr) {
        let is_node = target.is_node() as usize;
        self[CutType::Internal] += is_node;
        self[CutType::InternalFalse] += is_node + target.is_false() as usize;
        self[CutType::InternalTrue] += is_node + target.is_true() as usize;
        self[CutType::All] += 1;
    }

    /// Raises every bound to at least the one in `other`.
    pub fn max_with(&mut self, other: &Cuts) {
        for (c, o) in self.0.iter_mut().zip(other.0) {
            *c = (*c).max(o);
        }
    }

    /// Adds the arcs of `other`.
    pub fn inc(&mut self, other: &Cuts) {
        for (c, o) in self.0.iter_mut().zip(other.0) {
            *c = c.saturating_add(o);
        }
    }

    /// The cuts of the negated diagram, i.e. with the terminal types swapped.
    pub fn negated(&self) -> Self {
        Cuts([self.0[0], self.0[2], self.0[1], self.0[3]])
    }

    pub fn negate_if(&self, negate: bool) -> Self {
        if negate {
            self.negated()
        } else {
            *self
        }
    }
}

impl Default for Cuts {
    fn default() -> Self {
        Cuts::MAX
    }
}

impl Index<CutType> for Cuts {
    type Output = usize;

    fn index(&self, ct: CutType) -> &Self::Output {
        &self.0[ct as usize]
    }
}

impl IndexMut<CutType> for Cuts {
    fn index_mut(&mut self, ct: CutType) -> &mut Self::Output {
        &mut self.0[ct as usize]
    }
}

impl Display for Cuts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}, {}, {}, {}}}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_cut_type() {
        assert_eq!(CutType::new(false, false), CutType::Internal);
        assert_eq!(CutType::new(true, true), CutType::All);
        assert!(CutType::InternalFalse.includes(false));
        assert!(!CutType::InternalFalse.includes(true));
        assert!(!CutType::Internal.includes(true));
    }

    #[test]
    fn test_add() {
        let mut c = Cuts::ZERO;
        c.add(2, 1, 3);
        assert_eq!(c, Cuts::new(2, 3, 5, 6));
        c.add_target(Ptr::FALSE);
        c.add_target(Ptr::node(0, 0));
        assert_eq!(c, Cuts::new(3, 5, 6, 8));
    }

    #[test]
    fn test_max_and_inc() {
        let mut c = Cuts::new(1, 4, 1, 4);
        c.max_with(&Cuts::new(2, 2, 2, 2));
        assert_eq!(c, Cuts::new(2, 4, 2, 4));
        c.inc(&Cuts::new(1, 0, 1, 1));
        assert_eq!(c, Cuts::new(3, 4, 3, 5));
        assert_eq!(c.negated(), Cuts::new(3, 3, 4, 5));
    }
}
