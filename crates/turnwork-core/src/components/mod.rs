//! Component definitions for the ECS scheduler.
//!
//! Components are data structs attached to actor entities.
//! Scheduling behavior lives in systems.

mod activity;
mod assist;
mod backlog;
mod character;
mod common;
mod tasks;

pub use activity::*;
pub use assist::*;
pub use backlog::*;
pub use character::*;
pub use common::*;
pub use tasks::*;
