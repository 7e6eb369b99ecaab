//! Pure activity speed logic for Turnwork.
//!
//! This crate contains the throughput math used by the activity scheduler.
//! Functions take plain data and return multipliers, making them
//! unit-testable without an ECS world or a turn loop.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`requirements`] | Skill, tool quality and stat requirements declared by activity types |
//! | [`speed`] | Sub-factor curves, clamping, diminishing combination, composite factors |

pub mod requirements;
pub mod speed;
