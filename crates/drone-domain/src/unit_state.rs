//! The unit's mission state machine, §4.3. A closed set of states with a
//! small transition table — a tagged enum rather than dynamic dispatch, per
//! the design note in spec §9.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitState {
    Idle,
    EnRoute,
    DroppingAgent,
    ArrivedToBase,
    Fault,
}

impl UnitState {
    /// Whether `next` is a legal successor of `self` in the nominal lifecycle
    /// plus the fault branch (Fault can only return via ArrivedToBase, never
    /// straight back to Idle).
    #[must_use]
    pub fn can_transition_to(self, next: UnitState) -> bool {
        use UnitState::{ArrivedToBase, DroppingAgent, EnRoute, Fault, Idle};
        matches!(
            (self, next),
            (Idle, EnRoute)
                | (EnRoute, DroppingAgent)
                | (EnRoute, ArrivedToBase) // arrival finds the fire already out
                | (EnRoute, Fault)
                | (DroppingAgent, ArrivedToBase)
                | (DroppingAgent, Fault)
                | (ArrivedToBase, Idle)
                | (Fault, ArrivedToBase)
        )
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "Idle",
            Self::EnRoute => "EnRoute",
            Self::DroppingAgent => "DroppingAgent",
            Self::ArrivedToBase => "ArrivedToBase",
            Self::Fault => "Fault",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown unit-state token: {0}")]
pub struct ParseUnitStateError(pub String);

impl FromStr for UnitState {
    type Err = ParseUnitStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Idle" => Ok(Self::Idle),
            "EnRoute" => Ok(Self::EnRoute),
            "DroppingAgent" => Ok(Self::DroppingAgent),
            "ArrivedToBase" => Ok(Self::ArrivedToBase),
            "Fault" => Ok(Self::Fault),
            other => Err(ParseUnitStateError(other.to_string())),
        }
    }
}
