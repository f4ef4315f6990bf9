//! Primitive types shared by every decision diagram.
//!
//! Levels are 0-indexed and grow towards the terminals, i.e. the root of a diagram lives on its
//! smallest level. Ids are unique per level and are handed out downwards from [`MAX_ID`] by the
//! reduction, which makes `(level, id)` a canonical name for a node.

/// A level in the (fixed) variable ordering.
pub type Level = u32;

/// Signed level, used for level shifts and differences.
pub type SignedLevel = i32;

/// Per-level node identifier.
pub type Id = u64;

/// Number of bits reserved for a level inside a packed pointer.
pub const LEVEL_BITS: u32 = 24;

/// Number of bits reserved for an id inside a packed pointer.
pub const ID_BITS: u32 = 64 - 1 - LEVEL_BITS - 1 - 1;

/// Largest level that can be stored in a pointer.
pub const MAX_LEVEL: Level = (1 << LEVEL_BITS) - 1;

/// Largest id that can be stored in a pointer.
pub const MAX_ID: Id = (1 << ID_BITS) - 1;

/// Applies a signed shift to a level.
///
/// # Panics
///
/// Panics if the shifted level falls outside `0..=MAX_LEVEL`.
pub fn shift_level(level: Level, shift: SignedLevel) -> Level {
    let shifted = level as i64 + shift as i64;
    assert!(
        (0..=MAX_LEVEL as i64).contains(&shifted),
        "Level {} shifted by {} is out of range",
        level,
        shift
    );
    shifted as Level
}
