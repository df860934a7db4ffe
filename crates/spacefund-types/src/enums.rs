//! Enumeration types for the Space Fund game.
//!
//! The string forms of [`MissionType`], [`TargetType`], and [`LaunchVehicle`]
//! match the values the prediction service emits and expects, so they are
//! serialized verbatim on the wire.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Mission descriptors
// ---------------------------------------------------------------------------

/// What a mission sets out to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MissionType {
    /// Survey an unknown body.
    Exploration,
    /// Run experiments on site.
    Research,
    /// Extract resources.
    Mining,
    /// Establish a settlement.
    Colonization,
}

/// The kind of body a mission travels to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TargetType {
    /// A planet in a known system.
    Planet,
    /// A natural satellite.
    Moon,
    /// A minor body.
    Asteroid,
    /// A planet outside the home system.
    Exoplanet,
    /// A star.
    Star,
}

/// Launch vehicle carrying the mission.
///
/// Switching vehicle during an investment costs a flat surcharge looked up
/// in the economy crate's vehicle price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LaunchVehicle {
    /// Fully reusable super-heavy launcher.
    Starship,
    /// Triple-core heavy launcher.
    #[serde(rename = "Falcon Heavy")]
    FalconHeavy,
    /// Space Launch System.
    #[serde(rename = "SLS")]
    Sls,
    /// European heavy launcher.
    #[serde(rename = "Ariane 6")]
    Ariane6,
}

impl LaunchVehicle {
    /// Every vehicle, in the order the investment dialog lists them.
    pub const ALL: [Self; 4] = [Self::Starship, Self::FalconHeavy, Self::Sls, Self::Ariane6];

    /// Wire and display name of the vehicle.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starship => "Starship",
            Self::FalconHeavy => "Falcon Heavy",
            Self::Sls => "SLS",
            Self::Ariane6 => "Ariane 6",
        }
    }
}

impl core::fmt::Display for LaunchVehicle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty band used when requesting mission presets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Difficulty {
    /// Short, close, cheap missions.
    Easy,
    /// The default band.
    #[default]
    Normal,
    /// Long, distant, heavy missions.
    Hard,
}

impl Difficulty {
    /// Query-string form of the difficulty.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }
}

impl core::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Screens
// ---------------------------------------------------------------------------

/// The screen the session is currently showing.
///
/// ```text
/// Menu --start--> Story --continue--> Missions --funds >= target--> Victory
///  |  ^             |                    |                            |
///  |  |             +--help--> Tutorial  +--days == 0-----> Defeat    |
///  +--+--tutorial---------------^   |                         |       |
///     +------------------back-------+-------------------------+-------+
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Screen {
    /// Title menu.
    #[default]
    Menu,
    /// Narrative intro.
    Story,
    /// How-to-play page.
    Tutorial,
    /// The mission board, where the economy runs.
    Missions,
    /// Funds reached the target.
    Victory,
    /// Days ran out before the target was reached.
    Defeat,
}

impl Screen {
    /// Whether the session has ended and its clocks are frozen.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}
