//! Messages flowing into the session runner.
//!
//! Player commands arrive from a [`SessionHandle`](crate::SessionHandle)
//! with a reply channel. Everything else -- timer ticks and predictor
//! completions -- is an internal [`SessionEvent`] stamped with the epoch
//! of the session that caused it.

use rust_decimal::Decimal;
use spacefund_economy::InvestmentDeltas;
use spacefund_types::{LaunchVehicle, MissionId, MissionSpec};
use tokio::sync::oneshot;

use crate::session::SessionError;

/// A player action.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Leave the menu for the story.
    Start,
    /// Open the tutorial from the menu or the story.
    OpenTutorial,
    /// Continue from the story (or tutorial) to the mission board.
    Continue,
    /// Return to the menu, resetting the session.
    BackToMenu,
    /// Accept an offer unchanged.
    Accept(MissionId),
    /// Open the investment dialog for an offer.
    OpenInvestment(MissionId),
    /// Price the investment being edited.
    QuoteInvestment {
        /// Requested changes.
        deltas: InvestmentDeltas,
        /// Launcher to fly on.
        vehicle: LaunchVehicle,
    },
    /// Close the investment dialog.
    CancelInvestment,
    /// Pay for and launch the investment being edited.
    ConfirmInvestment {
        /// Requested changes.
        deltas: InvestmentDeltas,
        /// Launcher to fly on.
        vehicle: LaunchVehicle,
    },
    /// Replace every offer with a fresh batch.
    ResetOffers,
    /// Acknowledge a resolved mission.
    Acknowledge(MissionId),
}

/// Successful answer to a [`PlayerCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandReply {
    /// The command was applied.
    Done,
    /// Price of the investment being edited.
    Quote(Decimal),
}

/// A command plus the channel its answer goes back on.
#[derive(Debug)]
pub(crate) struct CommandEnvelope {
    pub(crate) command: PlayerCommand,
    pub(crate) reply: oneshot::Sender<Result<CommandReply, SessionError>>,
}

/// Internal event, tagged with the session epoch that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    /// Epoch of the session that scheduled this event.
    pub epoch: u64,
    /// What happened.
    pub kind: EventKind,
}

/// Kinds of internal event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// The day clock fired.
    DayTick,
    /// A mission's progress timer fired.
    ProgressTick(MissionId),
    /// An offer batch finished fetching.
    OffersFetched(Vec<MissionSpec>),
    /// A prediction request finished; `None` on failure.
    PredictionReady {
        /// Mission the prediction is for.
        mission_id: MissionId,
        /// Predicted success chance in percent.
        probability: Option<f64>,
    },
}
