//! HTTP client for the Space Fund prediction service.
//!
//! The service generates mission presets and predicts success chances:
//!
//! - `GET /preset?seed=<n>&difficulty=<easy|normal|hard>` returns a mission
//!   descriptor.
//! - `POST /predict` takes the descriptor plus `clamp_min`/`clamp_max` and
//!   returns `{ "success_final": <percent> }`.
//! - `GET /health` returns `{ "status", "model_loaded" }`.
//!
//! [`HttpPredictor`] implements [`spacefund_core::Predictor`]. It reports
//! every failure as a [`spacefund_core::PredictorError`]; the session
//! decides what to fall back to.

pub mod client;
pub mod wire;

pub use client::HttpPredictor;
pub use wire::HealthStatus;
