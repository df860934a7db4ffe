//! JSON bodies exchanged with the prediction service.

use serde::{Deserialize, Serialize};
use spacefund_types::MissionSpec;

/// Body of `POST /predict`: the mission parameters plus clamp bounds.
#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    /// Mission parameters, flattened into the top-level object.
    #[serde(flatten)]
    pub spec: &'a MissionSpec,
    /// Lowest probability the service may return.
    pub clamp_min: f64,
    /// Highest probability the service may return.
    pub clamp_max: f64,
}

/// Response of `POST /predict`.
///
/// Only `success_final` is used; the rest is logged when present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictResponse {
    /// Success probability in percent, already clamped by the service.
    pub success_final: f64,
    /// Model output before penalties.
    #[serde(default)]
    pub success_raw: Option<f64>,
    /// Penalty subtracted for heavy payloads.
    #[serde(default)]
    pub applied_penalty: Option<f64>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    /// `"ok"` when the service is up.
    pub status: String,
    /// Whether the prediction model is loaded. Predictions from a service
    /// without a model are always zero.
    pub model_loaded: bool,
    /// Whether the feature range table is loaded.
    #[serde(default)]
    pub ranges_loaded: bool,
}

impl HealthStatus {
    /// Whether the service can answer predictions.
    pub fn is_ready(&self) -> bool {
        self.status == "ok" && self.model_loaded
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use spacefund_types::{LaunchVehicle, MissionType, TargetType};

    use super::*;

    #[test]
    fn predict_request_is_flat() {
        let spec = MissionSpec {
            payload_tons: 12.5,
            mission_type: MissionType::Colonization,
            target_type: TargetType::Exoplanet,
            launch_vehicle: LaunchVehicle::FalconHeavy,
            distance_ly: 45.0,
            duration_years: 12.0,
            science_pts: 60.0,
            crew_size: 10,
            fuel_tons: 3000.0,
        };
        let body = PredictRequest {
            spec: &spec,
            clamp_min: 0.0,
            clamp_max: 100.0,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["launch_vehicle"], "Falcon Heavy");
        assert_eq!(json["crew_size"], 10);
        assert_eq!(json["clamp_max"], 100.0);
        assert!(json.get("spec").is_none());
    }

    #[test]
    fn predict_response_ignores_extra_fields() {
        let json = r#"{
            "success_raw": 71.2,
            "success_final": 65.4,
            "applied_penalty": 5.8,
            "is_success": true,
            "features_used": {"distance_ly": 45.0}
        }"#;
        let response: PredictResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.success_raw, Some(71.2));
        assert!((response.success_final - 65.4).abs() < f64::EPSILON);
    }

    #[test]
    fn health_without_model_is_not_ready() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "ok", "model_loaded": false}"#).unwrap();
        assert!(!health.is_ready());
        assert!(!health.ranges_loaded);
    }
}
