//! Fire severity: drives both priority weighting and how many units/litres
//! a fire requires.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    None,
    Low,
    Moderate,
    High,
}

impl Severity {
    /// Priority weight used to order the dispatch queue; higher dequeues first.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::High => 100,
            Self::Moderate => 50,
            Self::Low => 10,
            Self::None => 0,
        }
    }

    /// Number of units required to suppress a fire of this severity.
    #[must_use]
    pub const fn units_required(self) -> u32 {
        match self {
            Self::Low => 1,
            Self::Moderate => 2,
            Self::High => 3,
            Self::None => 0,
        }
    }

    /// Suppressant litres required to extinguish a fire of this severity.
    #[must_use]
    pub const fn agent_litres_required(self) -> f64 {
        match self {
            Self::Low => 10.0,
            Self::Moderate => 20.0,
            Self::High => 30.0,
            Self::None => 0.0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown severity token: {0}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "LOW" => Ok(Self::Low),
            "MODERATE" => Ok(Self::Moderate),
            "HIGH" => Ok(Self::High),
            other => Err(ParseSeverityError(other.to_string())),
        }
    }
}
