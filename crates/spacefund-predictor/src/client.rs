//! `reqwest` implementation of [`Predictor`].

use spacefund_core::config::PredictorConfig;
use spacefund_core::{Clamp, Predictor, PredictorError};
use spacefund_types::{Difficulty, MissionSpec};
use tracing::debug;

use crate::wire::{HealthStatus, PredictRequest, PredictResponse};

/// Client for the prediction service.
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPredictor {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Create a client from the predictor configuration section.
    pub fn from_config(config: &PredictorConfig) -> Self {
        Self::new(&config.base_url)
    }

    /// Base URL requests are sent to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns a [`PredictorError`] if the service is unreachable, answers
    /// with an error status, or sends an unexpected body.
    pub async fn health(&self) -> Result<HealthStatus, PredictorError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await.map_err(transport)?;
        parse_json(response).await
    }

    async fn fetch_preset(
        &self,
        seed: u64,
        difficulty: Difficulty,
    ) -> Result<MissionSpec, PredictorError> {
        let url = format!("{}/preset", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("seed", seed.to_string()),
                ("difficulty", difficulty.as_str().to_owned()),
            ])
            .send()
            .await
            .map_err(transport)?;
        parse_json(response).await
    }

    async fn fetch_prediction(
        &self,
        spec: &MissionSpec,
        clamp: Clamp,
    ) -> Result<f64, PredictorError> {
        let url = format!("{}/predict", self.base_url);
        let body = PredictRequest {
            spec,
            clamp_min: clamp.min,
            clamp_max: clamp.max,
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let prediction: PredictResponse = parse_json(response).await?;
        debug!(
            success_final = prediction.success_final,
            success_raw = ?prediction.success_raw,
            applied_penalty = ?prediction.applied_penalty,
            "Prediction received"
        );
        Ok(prediction.success_final)
    }
}

impl Predictor for HttpPredictor {
    async fn preset(
        &self,
        seed: u64,
        difficulty: Difficulty,
    ) -> Result<MissionSpec, PredictorError> {
        self.fetch_preset(seed, difficulty).await
    }

    async fn predict(&self, spec: &MissionSpec, clamp: Clamp) -> Result<f64, PredictorError> {
        self.fetch_prediction(spec, clamp).await
    }
}

#[allow(clippy::needless_pass_by_value)]
fn transport(e: reqwest::Error) -> PredictorError {
    PredictorError::Transport {
        message: e.to_string(),
    }
}

/// Check the status and decode a JSON body.
async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PredictorError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(PredictorError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let text = response.text().await.map_err(transport)?;
    serde_json::from_str(&text).map_err(|e| PredictorError::Parse {
        message: e.to_string(),
    })
}
