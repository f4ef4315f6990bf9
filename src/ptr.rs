//! Packed 64-bit pointers to nodes and terminals.
//!
//! ```text
//! node:     0 LLLLLLLLLLLLLLLLLLLLLLLL IIIIIIIIIIIIIIIIIIIIIIIIIIIIIIIIIIIII O F
//! terminal: 1 000000000000000000000000000000000000000000000000000000000000 V F
//! nil:      1 111111111111111111111111111111111111111111111111111111111111 1 F
//! ```
//!
//! `L` is the level, `I` the id, `O` the out-index (which child an arc leaves from), `V` the
//! terminal value, and `F` a flag bit that the reduction uses to mark arcs that were redirected by
//! Rule 1. Comparing the raw words orders every node before every terminal, and `false` before
//! `true`.

use std::fmt::{Debug, Display, Formatter};
use std::ops::Not;

use crate::types::{shift_level, Id, Level, SignedLevel, ID_BITS, MAX_ID, MAX_LEVEL};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ptr(u64);

impl Ptr {
    const FLAG_BIT: u64 = 1;
    const OUT_IDX_BIT: u64 = 1 << 1;
    const VALUE_BIT: u64 = 1 << 1;
    const TERMINAL_BIT: u64 = 1 << 63;
    const NIL_RAW: u64 = u64::MAX ^ Self::FLAG_BIT;
    const ID_SHIFT: u32 = 2;
    const LEVEL_SHIFT: u32 = ID_BITS + 2;

    pub const NIL: Ptr = Ptr(Self::NIL_RAW);
    pub const FALSE: Ptr = Ptr(Self::TERMINAL_BIT);
    pub const TRUE: Ptr = Ptr(Self::TERMINAL_BIT | Self::VALUE_BIT);

    /// Pointer to the node `(level, id)`.
    pub fn node(level: Level, id: Id) -> Self {
        assert!(level <= MAX_LEVEL, "Level {} exceeds the maximum of {}", level, MAX_LEVEL);
        assert!(id <= MAX_ID, "Id {} exceeds the maximum of {}", id, MAX_ID);
        Ptr(((level as u64) << Self::LEVEL_SHIFT) | (id << Self::ID_SHIFT))
    }

    /// Pointer to the node `(level, id)` with the given out-index.
    pub fn with_idx(level: Level, id: Id, out_idx: bool) -> Self {
        Self::node(level, id).with_out_idx(out_idx)
    }

    pub const fn terminal(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_nil(self) -> bool {
        self.0 >= Self::NIL_RAW
    }

    pub const fn is_node(self) -> bool {
        self.0 <= !Self::TERMINAL_BIT
    }

    pub const fn is_terminal(self) -> bool {
        !self.is_nil() && self.0 >= Self::TERMINAL_BIT
    }

    pub const fn is_false(self) -> bool {
        self.is_terminal() && !self.value()
    }

    pub const fn is_true(self) -> bool {
        self.is_terminal() && self.value()
    }

    /// Value of a terminal pointer (ignoring the flag).
    pub const fn value(self) -> bool {
        debug_assert!(self.is_terminal());
        (self.0 & Self::VALUE_BIT) != 0
    }

    pub const fn level(self) -> Level {
        debug_assert!(self.is_node());
        (self.0 >> Self::LEVEL_SHIFT) as Level
    }

    pub const fn id(self) -> Id {
        debug_assert!(self.is_node());
        (self.0 >> Self::ID_SHIFT) & MAX_ID
    }

    pub const fn out_idx(self) -> bool {
        debug_assert!(self.is_node());
        (self.0 & Self::OUT_IDX_BIT) != 0
    }

    /// Whether this points to a node on the given level.
    pub const fn on_level(self, level: Level) -> bool {
        self.is_node() && self.level() == level
    }

    /// Level of a node, or `None` for terminals. Terminals sort below all levels.
    pub fn level_or_none(self) -> Option<Level> {
        self.is_node().then(|| self.level())
    }

    pub const fn is_flagged(self) -> bool {
        (self.0 & Self::FLAG_BIT) != 0
    }

    pub const fn flag(self) -> Self {
        Ptr(self.0 | Self::FLAG_BIT)
    }

    pub const fn unflag(self) -> Self {
        Ptr(self.0 & !Self::FLAG_BIT)
    }

    /// Strips the flag and, for nodes, the out-index. This is the node's `uid`.
    pub const fn essential(self) -> Self {
        if self.is_node() {
            Ptr(self.0 & !(Self::FLAG_BIT | Self::OUT_IDX_BIT))
        } else {
            self.unflag()
        }
    }

    pub const fn with_out_idx(self, out_idx: bool) -> Self {
        debug_assert!(self.is_node());
        Ptr((self.0 & !Self::OUT_IDX_BIT) | ((out_idx as u64) << 1))
    }

    /// Moves a node pointer to another level, keeping id, out-index and flag.
    pub fn with_level(self, level: Level) -> Self {
        if !self.is_node() {
            return self;
        }
        let lower = self.0 & ((1 << Self::LEVEL_SHIFT) - 1);
        Ptr(Ptr::node(level, 0).0 | lower)
    }

    /// Shifts the level of a node pointer. Terminals are left untouched.
    pub fn shifted(self, shift: SignedLevel) -> Self {
        if shift == 0 || !self.is_node() {
            return self;
        }
        self.with_level(shift_level(self.level(), shift))
    }

    /// Negates the value of a terminal pointer (the flag is kept). Nodes are left untouched.
    pub const fn negate_terminal(self) -> Self {
        if self.is_terminal() {
            Ptr(self.0 ^ Self::VALUE_BIT)
        } else {
            self
        }
    }

    /// Negates terminals only when `negate` is set.
    pub const fn negate_if(self, negate: bool) -> Self {
        if negate {
            self.negate_terminal()
        } else {
            self
        }
    }
}

impl Not for Ptr {
    type Output = Ptr;

    fn not(self) -> Self::Output {
        assert!(self.is_terminal(), "Only terminal pointers can be negated");
        self.negate_terminal()
    }
}

impl From<bool> for Ptr {
    fn from(value: bool) -> Self {
        Ptr::terminal(value)
    }
}

impl Display for Ptr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_nil() {
            write!(f, "nil")?;
        } else if self.is_terminal() {
            write!(f, "{}", if self.value() { "T" } else { "F" })?;
        } else {
            write!(f, "({},{})", self.level(), self.id())?;
            if self.out_idx() {
                write!(f, "'")?;
            }
        }
        if !self.is_nil() && self.is_flagged() {
            write!(f, "*")?;
        }
        Ok(())
    }
}

impl Debug for Ptr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
