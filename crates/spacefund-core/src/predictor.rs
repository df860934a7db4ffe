//! The prediction service seam.
//!
//! The session needs two things from outside: procedurally generated
//! mission presets and a success probability for a given set of mission
//! parameters. [`Predictor`] abstracts where they come from -- the HTTP
//! service in production, a scripted stand-in in tests.
//!
//! Both calls are best-effort. Helpers in this module turn failures into
//! `warn!` lines and empty results; the session substitutes its own
//! fallbacks. Nothing here ever reaches the player as an error.

use std::future::Future;

use futures::future::join_all;
use spacefund_types::{Difficulty, MissionSpec};
use tracing::{debug, warn};

/// Errors a prediction service call can produce.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictorError {
    /// The request did not complete (connection refused, reset, DNS).
    #[error("transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for the log.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("response parse error: {message}")]
    Parse {
        /// Description of the failure.
        message: String,
    },

    /// The predicted probability is not a finite number inside the clamp.
    #[error("prediction {value} outside {min}..={max}")]
    OutOfRange {
        /// The value received, as text.
        value: String,
        /// Requested lower clamp.
        min: String,
        /// Requested upper clamp.
        max: String,
    },
}

/// Clamp bounds sent with a prediction request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamp {
    /// Lowest probability the service may return.
    pub min: f64,
    /// Highest probability the service may return.
    pub max: f64,
}

impl Clamp {
    /// The full percent range.
    pub const PERCENT: Self = Self {
        min: 0.0,
        max: 100.0,
    };

    /// Whether `value` is a finite number inside the bounds.
    pub fn contains(self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// A source of mission presets and success predictions.
///
/// Implementations must be cheap to clone: the runner clones one into
/// every spawned request task.
pub trait Predictor: Clone + Send + Sync + 'static {
    /// Fetch one mission preset for `seed` in the given difficulty band.
    fn preset(
        &self,
        seed: u64,
        difficulty: Difficulty,
    ) -> impl Future<Output = Result<MissionSpec, PredictorError>> + Send;

    /// Predict the success probability (percent) of `spec`.
    fn predict(
        &self,
        spec: &MissionSpec,
        clamp: Clamp,
    ) -> impl Future<Output = Result<f64, PredictorError>> + Send;
}

/// Fetch one preset per seed concurrently, dropping failures.
///
/// The returned specs keep the order of the seeds that succeeded.
pub async fn fetch_offers<P: Predictor>(
    predictor: &P,
    seeds: &[u64],
    difficulty: Difficulty,
) -> Vec<MissionSpec> {
    let requests = seeds.iter().map(|&seed| predictor.preset(seed, difficulty));
    let results = join_all(requests).await;

    let mut specs = Vec::with_capacity(results.len());
    for (seed, result) in seeds.iter().zip(results) {
        match result {
            Ok(spec) => specs.push(spec),
            Err(e) => warn!(seed, error = %e, "Failed to fetch mission preset"),
        }
    }
    debug!(
        requested = seeds.len(),
        received = specs.len(),
        "Offer batch fetched"
    );
    specs
}

/// Request a prediction, returning `None` on any failure.
///
/// Values outside `clamp` are treated as failures.
pub async fn request_prediction<P: Predictor>(
    predictor: &P,
    spec: &MissionSpec,
    clamp: Clamp,
) -> Option<f64> {
    match predictor.predict(spec, clamp).await {
        Ok(value) if clamp.contains(value) => Some(value),
        Ok(value) => {
            let e = PredictorError::OutOfRange {
                value: value.to_string(),
                min: clamp.min.to_string(),
                max: clamp.max.to_string(),
            };
            warn!(error = %e, "Discarding prediction");
            None
        }
        Err(e) => {
            warn!(error = %e, "Failed to predict mission success");
            None
        }
    }
}
