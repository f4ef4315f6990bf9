use std::fmt::{Display, Formatter};

use crate::types::{shift_level, Level, SignedLevel};

/// Number of nodes on a level.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LevelInfo {
    pub level: Level,
    pub width: usize,
}

impl LevelInfo {
    pub fn new(level: Level, width: usize) -> Self {
        Self { level, width }
    }

    pub fn shifted(&self, shift: SignedLevel) -> Self {
        Self::new(shift_level(self.level, shift), self.width)
    }
}

impl Display for LevelInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}[{}]", self.level, self.width)
    }
}
