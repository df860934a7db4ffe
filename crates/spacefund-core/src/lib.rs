//! Game Session Controller for the Space Fund game.
//!
//! This crate owns every rule of a play-through: the screen state machine,
//! the economy clock, the mission roster, the offer feed, and the async
//! runner that drives them from timers and the prediction service.
//!
//! # Modules
//!
//! - [`clock`] -- Countdown of game days and offer refresh days.
//! - [`config`] -- Configuration loading from `spacefund-config.yaml` into
//!   strongly-typed structs.
//! - [`event`] -- Player commands and epoch-stamped internal events.
//! - [`narrative`] -- Story, victory, and defeat texts.
//! - [`predictor`] -- [`Predictor`] trait, errors, and best-effort helpers.
//! - [`roster`] -- Single ordered map of missions and their stages.
//! - [`runner`] -- [`SessionRunner`] event loop and [`SessionHandle`].
//! - [`scheduler`] -- Cancellable day-clock and progress timers.
//! - [`session`] -- [`GameSession`], the synchronous state machine.
//!
//! [`Predictor`]: predictor::Predictor
//! [`SessionRunner`]: runner::SessionRunner
//! [`SessionHandle`]: runner::SessionHandle
//! [`GameSession`]: session::GameSession

pub mod clock;
pub mod config;
pub mod event;
pub mod narrative;
pub mod predictor;
pub mod roster;
pub mod runner;
pub mod scheduler;
pub mod session;

pub use config::{ConfigError, GameConfig};
pub use event::{CommandReply, PlayerCommand};
pub use predictor::{Clamp, Predictor, PredictorError};
pub use runner::{RunnerError, SessionHandle, SessionRunner};
pub use session::{Effect, GameSession, SessionError};
