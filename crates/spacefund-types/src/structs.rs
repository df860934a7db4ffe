//! Core data structs shared between the session controller, the predictor
//! client, and the front end.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Difficulty, LaunchVehicle, MissionType, Screen, TargetType};
use crate::ids::{MissionId, SessionId};

// ---------------------------------------------------------------------------
// Mission parameters
// ---------------------------------------------------------------------------

/// The procedurally generated parameters of a mission.
///
/// Field names match the prediction service's JSON so a spec can be
/// deserialized straight from a preset and sent back unchanged for a
/// prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionSpec {
    /// Payload mass in tons.
    pub payload_tons: f64,
    /// What the mission does at its target.
    pub mission_type: MissionType,
    /// What kind of body the mission travels to.
    pub target_type: TargetType,
    /// Launcher carrying the mission.
    pub launch_vehicle: LaunchVehicle,
    /// Distance to the target in light-years.
    pub distance_ly: f64,
    /// Declared mission duration in years.
    pub duration_years: f64,
    /// Expected scientific yield.
    pub science_pts: f64,
    /// Number of crew members.
    pub crew_size: u32,
    /// Fuel mass in tons.
    pub fuel_tons: f64,
}

/// A mission known to the session, either offered or in flight.
///
/// Missions are values: an investment produces a new `Mission` through
/// [`Mission::with_spec`] and the original is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Mission {
    /// Session-local identifier.
    pub id: MissionId,
    /// Mission parameters.
    #[serde(flatten)]
    pub spec: MissionSpec,
    /// Preset band this mission was drawn from.
    pub difficulty: Difficulty,
    /// Predicted success chance in percent, assigned once the mission is
    /// accepted.
    pub success_probability: Option<f64>,
}

impl Mission {
    /// Build a freshly offered mission with no prediction attached.
    pub const fn offered(id: MissionId, spec: MissionSpec, difficulty: Difficulty) -> Self {
        Self {
            id,
            spec,
            difficulty,
            success_probability: None,
        }
    }

    /// Derive a mission with new parameters under the same id.
    ///
    /// Any prediction is cleared because it described the old parameters.
    #[must_use]
    pub fn with_spec(&self, spec: MissionSpec) -> Self {
        Self {
            id: self.id,
            spec,
            difficulty: self.difficulty,
            success_probability: None,
        }
    }
}

/// Outcome of a mission whose progress reached completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionResult {
    /// The mission this result belongs to.
    pub mission_id: MissionId,
    /// Whether the success roll came in under the predicted probability.
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Read-only session view
// ---------------------------------------------------------------------------

/// An accepted mission together with its flight progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveMissionView {
    /// The mission as flown.
    pub mission: Mission,
    /// Flight progress in percent, 0 to 100.
    pub progress: f64,
    /// The resolution, once one has been rolled.
    pub result: Option<MissionResult>,
}

/// A point-in-time view of the whole session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionSnapshot {
    /// Which play-through this is.
    pub session_id: SessionId,
    /// Current screen.
    pub screen: Screen,
    /// Days left on the economy clock.
    pub game_days: u32,
    /// Current balance.
    #[ts(as = "String")]
    pub funds: Decimal,
    /// Balance that ends the session in victory.
    #[ts(as = "String")]
    pub target_funds: Decimal,
    /// Missions available to accept, oldest first.
    pub offered: Vec<Mission>,
    /// Accepted missions in acceptance order.
    pub active: Vec<ActiveMissionView>,
    /// Mission currently being edited in the investment dialog.
    pub investment_target: Option<MissionId>,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}
