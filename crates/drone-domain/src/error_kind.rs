//! Fault/error tags injected into fire events and echoed back in telemetry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ErrorKind {
    #[default]
    None,
    /// Hard fault: the unit refuses new assignments until maintenance clears it.
    NozzleJam,
    /// Soft fault: clears automatically once the unit arrives back at base.
    DroneStuck,
}

impl ErrorKind {
    #[must_use]
    pub const fn is_hard_fault(self) -> bool {
        matches!(self, Self::NozzleJam)
    }

    #[must_use]
    pub const fn is_soft_fault(self) -> bool {
        matches!(self, Self::DroneStuck)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::NozzleJam => "NOZZLE_JAM",
            Self::DroneStuck => "DRONE_STUCK",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown error-kind token: {0}")]
pub struct ParseErrorKindError(pub String);

impl FromStr for ErrorKind {
    type Err = ParseErrorKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(Self::None),
            "NOZZLE_JAM" => Ok(Self::NozzleJam),
            "DRONE_STUCK" => Ok(Self::DroneStuck),
            other => Err(ParseErrorKindError(other.to_string())),
        }
    }
}

/// Recognizes the three literal tokens the wire codec classifies as an
/// error-kind tag, per spec §4.1's "first such token only" parsing rule.
#[must_use]
pub fn is_error_kind_token(token: &str) -> bool {
    matches!(token, "NONE" | "NOZZLE_JAM" | "DRONE_STUCK")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_and_soft_faults_are_distinct() {
        assert!(ErrorKind::NozzleJam.is_hard_fault());
        assert!(!ErrorKind::NozzleJam.is_soft_fault());
        assert!(ErrorKind::DroneStuck.is_soft_fault());
        assert!(!ErrorKind::DroneStuck.is_hard_fault());
    }

    #[test]
    fn token_recognition_matches_display() {
        for kind in [ErrorKind::None, ErrorKind::NozzleJam, ErrorKind::DroneStuck] {
            assert!(is_error_kind_token(&kind.to_string()));
        }
        assert!(!is_error_kind_token("GIBBERISH"));
    }
}
