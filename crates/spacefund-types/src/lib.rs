//! Shared type definitions for the Space Fund mission game.
//!
//! This crate is the single source of truth for the values that move
//! between the session controller, the prediction service client, and the
//! browser front end. Types flow to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Mission and session identifiers
//! - [`enums`] -- Mission descriptors, difficulty bands, and screens
//! - [`structs`] -- Missions, results, and the session snapshot

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{Difficulty, LaunchVehicle, MissionType, Screen, TargetType};
pub use ids::{MissionId, SessionId};
pub use structs::{ActiveMissionView, Mission, MissionResult, MissionSpec, SessionSnapshot};
