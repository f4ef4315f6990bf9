//! Errors returned by the diagram operations.
//!
//! Only misuse that depends on the values of the arguments is reported as an error. Malformed
//! files and out-of-range labels are contract violations and panic instead.

use std::fmt;
use std::io;

use crate::replace::ReplaceType;
use crate::types::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdError {
    /// The declared kind of a level mapping is stricter than what the mapping actually does, or a
    /// monotone mapping was declared to be non-monotone.
    ReplaceTypeMismatch {
        declared: ReplaceType,
        inferred: ReplaceType,
    },
    /// The operation cannot handle a non-monotone level mapping.
    NonMonotoneUnsupported {
        /// Name of the operation
        operation: &'static str,
    },
    /// A level of the diagram has no image under a partial level mapping.
    UnmappedLevel { level: Level },
}

impl DdError {
    /// Whether the error was caused by an invalid argument.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            DdError::ReplaceTypeMismatch { .. } => true,
            DdError::NonMonotoneUnsupported { .. } => true,
            DdError::UnmappedLevel { .. } => true,
        }
    }
}

impl fmt::Display for DdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DdError::ReplaceTypeMismatch { declared, inferred } => write!(
                f,
                "Level mapping was declared as {} but behaves as {}",
                declared, inferred
            ),
            DdError::NonMonotoneUnsupported { operation } => {
                write!(f, "'{}' does not support non-monotone level mappings", operation)
            }
            DdError::UnmappedLevel { level } => {
                write!(f, "Level {} is not mapped to any level", level)
            }
        }
    }
}

impl std::error::Error for DdError {}

impl From<DdError> for io::Error {
    fn from(err: DdError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, err)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_display() {
        let e = DdError::ReplaceTypeMismatch {
            declared: ReplaceType::Shift,
            inferred: ReplaceType::Monotone,
        };
        assert_eq!(e.to_string(), "Level mapping was declared as shift but behaves as monotone");
        assert!(e.is_invalid_argument());

        let e = DdError::UnmappedLevel { level: 3 };
        assert_eq!(e.to_string(), "Level 3 is not mapped to any level");
    }

    #[test]
    fn test_into_io_error() {
        let e: io::Error = DdError::NonMonotoneUnsupported { operation: "relnext" }.into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidInput);
    }
}
