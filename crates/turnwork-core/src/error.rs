//! Error types for registry loading, scheduler entry points, persistence
//! and configuration.

use thiserror::Error;

use crate::components::{ActivityId, ActorId};

/// Data errors found while building the activity type registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("activity type {id} registered more than once")]
    DuplicateType { id: ActivityId },

    #[error("activity type {id} has no turn handler, no finish handler and is not special")]
    NoBehavior { id: ActivityId },

    #[error("activity type {id} allows {max} assistants, limit is {limit}")]
    InvalidMaxAssistants { id: ActivityId, max: u32, limit: u32 },

    #[error("activity type {id} is both special and complex_moves")]
    InconsistentFlags { id: ActivityId },

    #[error("special activity type {id} has no turn handler")]
    SpecialWithoutTurnHandler { id: ActivityId },

    #[error("handler bound to {id}, which has no type definition")]
    HandlerForUndefinedType { id: ActivityId },

    #[error("activity type {id} names unknown handler {handler}")]
    UnknownHandler { id: ActivityId, handler: String },

    #[error("activity type {id} requires unknown stat {stat}")]
    UnknownStat { id: ActivityId, stat: String },

    #[error("invalid activity type JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from scheduler entry points. Per-turn stepping never fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    #[error("unknown activity type {0}")]
    UnknownActivityType(ActivityId),

    #[error("{actor} is too unhappy to start {id}")]
    TooUnhappy { actor: ActorId, id: ActivityId },
}

/// Errors that can occur during save/load.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),

    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Errors while reading scheduler configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid scheduler config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RegistryError::DuplicateType {
            id: ActivityId::from("ACT_DIG"),
        };
        assert_eq!(err.to_string(), "activity type ACT_DIG registered more than once");

        let err = SchedulerError::UnknownActor(ActorId(3));
        assert_eq!(err.to_string(), "unknown actor actor#3");

        let err = SaveError::VersionMismatch {
            expected: 2,
            found: 1,
        };
        assert_eq!(err.to_string(), "Save version mismatch: expected 2, found 1");
    }
}
