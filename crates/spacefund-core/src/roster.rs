//! The mission roster: one ordered map from id to mission entry.
//!
//! Offered, active, and resolved missions are views over the same map,
//! filtered by [`Stage`]. A mission therefore cannot be offered and active
//! at once, and a result can only exist for a mission that is active.
//! Ids are allocated in increasing order, so map order is arrival order.

use std::collections::BTreeMap;

use spacefund_types::{ActiveMissionView, Mission, MissionId, MissionResult};

/// Where a mission is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    /// Available to accept.
    Offered,
    /// Accepted and flying.
    InFlight {
        /// Percent complete, below 100.
        progress: f64,
    },
    /// Reached 100% and waiting for a success probability to roll against.
    AwaitingOutcome,
    /// Rolled and waiting for the player to acknowledge.
    Resolved {
        /// Outcome of the roll.
        success: bool,
    },
}

impl Stage {
    /// Whether the mission has been accepted.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Offered)
    }

    /// Flight progress in percent.
    pub const fn progress(self) -> f64 {
        match self {
            Self::Offered => 0.0,
            Self::InFlight { progress } => progress,
            Self::AwaitingOutcome | Self::Resolved { .. } => 100.0,
        }
    }
}

/// A mission and its lifecycle stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// The mission value; replaced wholesale when an investment applies.
    pub mission: Mission,
    /// Lifecycle stage.
    pub stage: Stage,
}

/// Result of advancing a mission's progress by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Still flying at the given percent.
    Progressed(f64),
    /// Crossed 100% on this tick. Reported exactly once per mission.
    Completed,
    /// Already at 100%; nothing changed.
    AlreadyComplete,
}

/// All missions known to the session.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: BTreeMap<MissionId, Entry>,
}

impl Roster {
    /// Create an empty roster.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Look up an entry.
    pub fn get(&self, id: MissionId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    /// Number of missions in any stage.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a newly offered mission. An existing entry with the same id is
    /// left alone and `false` is returned.
    pub fn insert_offer(&mut self, mission: Mission) -> bool {
        if self.entries.contains_key(&mission.id) {
            return false;
        }
        self.entries.insert(
            mission.id,
            Entry {
                mission,
                stage: Stage::Offered,
            },
        );
        true
    }

    /// Offered missions, oldest first.
    pub fn offered(&self) -> impl Iterator<Item = &Mission> {
        self.entries
            .values()
            .filter(|e| e.stage == Stage::Offered)
            .map(|e| &e.mission)
    }

    /// Number of offered missions.
    pub fn offered_count(&self) -> usize {
        self.offered().count()
    }

    /// Accepted missions with their stage, in id order.
    pub fn active(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values().filter(|e| e.stage.is_active())
    }

    /// Results rolled but not yet acknowledged.
    pub fn results(&self) -> impl Iterator<Item = MissionResult> + '_ {
        self.entries.values().filter_map(|e| match e.stage {
            Stage::Resolved { success } => Some(MissionResult {
                mission_id: e.mission.id,
                success,
            }),
            _ => None,
        })
    }

    /// Accepted missions as front-end views.
    pub fn active_views(&self) -> Vec<ActiveMissionView> {
        self.active()
            .map(|e| ActiveMissionView {
                mission: e.mission.clone(),
                progress: e.stage.progress(),
                result: match e.stage {
                    Stage::Resolved { success } => Some(MissionResult {
                        mission_id: e.mission.id,
                        success,
                    }),
                    _ => None,
                },
            })
            .collect()
    }

    /// Move an offered mission into flight at 0%, replacing its value with
    /// `flown` (which must carry the same id). Returns `false` and changes
    /// nothing if the mission is not currently offered.
    pub fn launch(&mut self, flown: Mission) -> bool {
        match self.entries.get_mut(&flown.id) {
            Some(entry) if entry.stage == Stage::Offered => {
                entry.mission = flown;
                entry.stage = Stage::InFlight { progress: 0.0 };
                true
            }
            _ => false,
        }
    }

    /// Attach a success probability to an accepted, unresolved mission.
    /// Returns `false` if the mission is unknown, only offered, or resolved.
    pub fn set_probability(&mut self, id: MissionId, probability: f64) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry)
                if matches!(
                    entry.stage,
                    Stage::InFlight { .. } | Stage::AwaitingOutcome
                ) =>
            {
                entry.mission.success_probability = Some(probability);
                true
            }
            _ => false,
        }
    }

    /// Advance a mission's progress by `step` percent, capped at 100.
    ///
    /// Returns `None` for unknown or merely offered missions.
    pub fn advance(&mut self, id: MissionId, step: f64) -> Option<Advance> {
        let entry = self.entries.get_mut(&id)?;
        match entry.stage {
            Stage::Offered => None,
            Stage::InFlight { progress } => {
                let next = (progress + step.max(0.0)).min(100.0);
                if next >= 100.0 {
                    entry.stage = Stage::AwaitingOutcome;
                    Some(Advance::Completed)
                } else {
                    entry.stage = Stage::InFlight { progress: next };
                    Some(Advance::Progressed(next))
                }
            }
            Stage::AwaitingOutcome | Stage::Resolved { .. } => Some(Advance::AlreadyComplete),
        }
    }

    /// Record the outcome of a mission that is awaiting one.
    ///
    /// Returns the new result, or `None` if the mission is not awaiting an
    /// outcome (including when it was already resolved).
    pub fn resolve(&mut self, id: MissionId, success: bool) -> Option<MissionResult> {
        let entry = self.entries.get_mut(&id)?;
        if entry.stage != Stage::AwaitingOutcome {
            return None;
        }
        entry.stage = Stage::Resolved { success };
        Some(MissionResult {
            mission_id: id,
            success,
        })
    }

    /// Remove a resolved mission, returning it and its outcome.
    pub fn acknowledge(&mut self, id: MissionId) -> Option<(Mission, bool)> {
        let success = match self.entries.get(&id)?.stage {
            Stage::Resolved { success } => success,
            _ => return None,
        };
        self.entries.remove(&id).map(|e| (e.mission, success))
    }

    /// Remove up to `count` of the oldest offers. Returns the removed ids.
    pub fn evict_oldest_offers(&mut self, count: usize) -> Vec<MissionId> {
        let doomed: Vec<MissionId> = self.offered().take(count).map(|m| m.id).collect();
        for id in &doomed {
            self.entries.remove(id);
        }
        doomed
    }

    /// Remove every offer, leaving active missions alone.
    pub fn clear_offers(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.stage.is_active());
        before.saturating_sub(self.entries.len())
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
