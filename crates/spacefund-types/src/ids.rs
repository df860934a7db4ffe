//! Type-safe identifier wrappers.
//!
//! Missions use a session-local monotonic counter so ids read naturally in
//! the UI ("Mission 7"). Sessions use UUID v7 so log lines from separate
//! runs never collide.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Identifier of a mission, unique within a single session.
///
/// Allocated by the session's id counter when an offer is received from
/// the predictor. Ids are never reused inside a session, even after the
/// mission is acknowledged and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionId(pub u64);

impl MissionId {
    /// The first id handed out in a fresh session.
    pub const FIRST: Self = Self(1);

    /// Return the raw counter value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Return the id that follows this one, or `None` on overflow.
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }
}

impl core::fmt::Display for MissionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MissionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier of one play-through, from menu start to return-to-title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
