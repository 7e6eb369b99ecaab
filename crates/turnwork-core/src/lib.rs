//! Turnwork Core - Turn-based Activity Scheduler
//!
//! Lets actors commit to long-running activities (digging, crafting,
//! reading, waiting) that span many simulation turns while the rest of the
//! world keeps advancing one turn at a time.
//!
//! # Architecture
//!
//! The scheduler uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Actors (players and NPCs)
//! - **Components**: [`Character`](components::Character), the foreground
//!   [`ActivityRecord`](components::ActivityRecord), the per-actor
//!   [`Backlog`](components::Backlog) and the helper-side
//!   [`AssistBinding`](components::AssistBinding)
//! - **Systems**: The turn driver, resumption, assistant coordination and
//!   progress descriptions
//!
//! Activity behavior lives in an immutable [`ActivityRegistry`](registry::ActivityRegistry)
//! of types, each holding plain function handlers.
//!
//! # Example
//!
//! ```rust,no_run
//! use turnwork_core::prelude::*;
//!
//! let registry = ActivityRegistry::with_builtins();
//! let mut engine = SchedulerEngine::new(registry, SchedulerConfig::default());
//!
//! let actor = engine.spawn_actor(Character::new("Avery"));
//! engine.start_activity(actor, ids::WAIT, 600).unwrap();
//!
//! while engine.has_activity(actor) {
//!     engine.step_turn();
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod persistence;
pub mod registry;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::SchedulerConfig;
    pub use crate::engine::SchedulerEngine;
    pub use crate::environment::{Environment, OpenField, Sandbox};
    pub use crate::error::{RegistryError, SchedulerError};
    pub use crate::registry::{ids, ActivityHandler, ActivityRegistry, ActivityType, ResumeRule};
    pub use crate::systems::ActorTurn;
}
