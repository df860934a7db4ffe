//! Headless Space Fund session.
//!
//! Wires the session runner to the HTTP prediction service and lets the
//! autopilot play one game to the end.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `spacefund-config.yaml`
//! 3. Probe the prediction service health endpoint
//! 4. Spawn the session runner
//! 5. Play with the autopilot until victory or defeat
//! 6. Log the outcome and the treasury state

mod autopilot;
mod error;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use spacefund_core::{GameConfig, SessionRunner};
use spacefund_predictor::HttpPredictor;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::autopilot::{Autopilot, AutopilotConfig};
use crate::error::EngineError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the runner fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("spacefund-engine starting");

    // 2. Load configuration.
    let config = GameConfig::load().map_err(EngineError::from)?;
    let autopilot_config = AutopilotConfig::load()?;
    info!(
        initial_funds = config.economy.initial_funds,
        victory_multiplier = config.economy.victory_multiplier,
        initial_days = config.economy.initial_days,
        day_interval_ms = config.economy.day_interval_ms,
        difficulty = config.offers.difficulty.as_str(),
        predictor_url = config.predictor.base_url,
        max_active = autopilot_config.max_active,
        "Configuration loaded"
    );

    // 3. Probe the prediction service. Failures only degrade the game to
    //    fallback predictions and empty offer batches.
    let predictor = HttpPredictor::from_config(&config.predictor);
    match predictor.health().await {
        Ok(health) if health.is_ready() => info!("Prediction service ready"),
        Ok(health) => warn!(
            status = health.status,
            model_loaded = health.model_loaded,
            "Prediction service is up but not ready"
        ),
        Err(e) => warn!(
            error = %e,
            url = predictor.base_url(),
            "Prediction service unreachable, predictions will fall back"
        ),
    }

    // 4. Spawn the session runner.
    let (runner, handle) = SessionRunner::new(config, predictor, SmallRng::from_os_rng())
        .map_err(EngineError::from)?;
    let runner_task = tokio::spawn(runner.run());

    // 5. Play.
    let outcome = Autopilot::new(handle, autopilot_config)
        .play()
        .await
        .map_err(EngineError::from)?;

    // 6. The autopilot owned the last handle; the runner stops and returns
    //    its final snapshot.
    let last = runner_task.await.map_err(|e| EngineError::Task {
        message: e.to_string(),
    })?;
    info!(
        outcome = ?outcome,
        funds = %last.funds,
        target = %last.target_funds,
        days_left = last.game_days,
        "spacefund-engine shutdown complete"
    );

    Ok(())
}
