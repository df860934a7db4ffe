//! The session runner: one task that owns a [`GameSession`].
//!
//! [`SessionRunner::run`] is an event loop over two channels:
//!
//! - **Player commands** from any number of [`SessionHandle`]s, each with a
//!   reply channel.
//! - **Internal events** from the [`Scheduler`]'s timers and from spawned
//!   predictor requests.
//!
//! Every message is handled to completion before the next one is read, so
//! the session needs no locking. The [`Effect`]s a handler returns are
//! carried out immediately: timers are started or aborted, and predictor
//! calls are spawned onto a [`JoinSet`]. Internal events carry the epoch of
//! the session that produced them; after a reset the epoch moves on and
//! anything still in flight from the old session is dropped on arrival.
//!
//! After every message the runner publishes a fresh [`SessionSnapshot`]
//! on a watch channel. The loop ends when the last handle is dropped.

use std::time::Duration;

use rand::Rng;
use spacefund_types::SessionSnapshot;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::{ConfigError, GameConfig};
use crate::event::{CommandEnvelope, CommandReply, EventKind, PlayerCommand, SessionEvent};
use crate::predictor::{Predictor, fetch_offers, request_prediction};
use crate::scheduler::Scheduler;
use crate::session::{Effect, GameSession, SessionError};

/// Capacity of the command and event channels.
const CHANNEL_CAPACITY: usize = 256;

/// Errors a [`SessionHandle`] can return.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunnerError {
    /// The runner task has stopped.
    #[error("session runner is not running")]
    Closed,

    /// The session refused the command.
    #[error("command rejected: {source}")]
    Rejected {
        /// Why the command was refused.
        #[from]
        source: SessionError,
    },
}

/// Cloneable handle for sending player commands to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<CommandEnvelope>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Send a command and wait for the session's answer.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Rejected`] if the session refused the
    /// command and [`RunnerError::Closed`] if the runner has stopped.
    pub async fn send(&self, command: PlayerCommand) -> Result<CommandReply, RunnerError> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(CommandEnvelope { command, reply })
            .await
            .map_err(|_| RunnerError::Closed)?;
        let result = answer.await.map_err(|_| RunnerError::Closed)?;
        Ok(result?)
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}

/// Drives one [`GameSession`] from commands, timers, and predictor results.
pub struct SessionRunner<P, R> {
    session: GameSession<R>,
    predictor: P,
    scheduler: Scheduler,
    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: mpsc::Receiver<SessionEvent>,
    commands: mpsc::Receiver<CommandEnvelope>,
    snapshots: watch::Sender<SessionSnapshot>,
    requests: JoinSet<()>,
}

impl<P, R> SessionRunner<P, R>
where
    P: Predictor,
    R: Rng + Send + 'static,
{
    /// Build a runner and the handle that controls it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails
    /// [`GameConfig::validate`].
    pub fn new(
        config: GameConfig,
        predictor: P,
        rng: R,
    ) -> Result<(Self, SessionHandle), ConfigError> {
        let day_period = Duration::from_millis(config.economy.day_interval_ms);
        let progress_period = Duration::from_millis(config.progress.tick_interval_ms);
        let session = GameSession::new(config, rng)?;

        let (events_tx, events_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (commands_tx, commands) = mpsc::channel(CHANNEL_CAPACITY);
        let (snapshots, snapshots_rx) = watch::channel(session.snapshot());

        let runner = Self {
            session,
            predictor,
            scheduler: Scheduler::new(events_tx.clone(), day_period, progress_period),
            events_tx,
            events_rx,
            commands,
            snapshots,
            requests: JoinSet::new(),
        };
        let handle = SessionHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
        };
        Ok((runner, handle))
    }

    /// Run until every [`SessionHandle`] is dropped. Returns the final
    /// snapshot.
    pub async fn run(mut self) -> SessionSnapshot {
        info!(session_id = %self.session.id(), "Session runner started");
        loop {
            tokio::select! {
                biased;
                envelope = self.commands.recv() => {
                    let Some(envelope) = envelope else { break };
                    self.handle_command(envelope);
                }
                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event);
                }
                Some(_) = self.requests.join_next(), if !self.requests.is_empty() => {}
            }
        }
        self.scheduler.stop_all();
        self.requests.abort_all();
        let snapshot = self.session.snapshot();
        info!(
            session_id = %snapshot.session_id,
            screen = ?snapshot.screen,
            funds = %snapshot.funds,
            "Session runner stopped"
        );
        snapshot
    }

    fn handle_command(&mut self, envelope: CommandEnvelope) {
        let CommandEnvelope { command, reply } = envelope;
        debug!(?command, "Player command");
        let result = self.apply_command(command);
        let answer = match result {
            Ok((reply, effects)) => {
                self.apply_effects(effects);
                self.publish();
                Ok(reply)
            }
            Err(e) => {
                debug!(error = %e, "Command rejected");
                Err(e)
            }
        };
        // The caller may have given up waiting.
        let _ = reply.send(answer);
    }

    fn apply_command(
        &mut self,
        command: PlayerCommand,
    ) -> Result<(CommandReply, Vec<Effect>), SessionError> {
        let s = &mut self.session;
        let effects = match command {
            PlayerCommand::Start => s.start()?,
            PlayerCommand::OpenTutorial => s.open_tutorial()?,
            PlayerCommand::Continue => s.continue_to_missions()?,
            PlayerCommand::BackToMenu => s.back_to_menu(),
            PlayerCommand::Accept(id) => s.accept(id)?,
            PlayerCommand::OpenInvestment(id) => s.open_investment(id)?,
            PlayerCommand::QuoteInvestment { deltas, vehicle } => {
                let quote = s.quote_investment(&deltas, vehicle)?;
                return Ok((CommandReply::Quote(quote), Vec::new()));
            }
            PlayerCommand::CancelInvestment => s.cancel_investment()?,
            PlayerCommand::ConfirmInvestment { deltas, vehicle } => {
                s.confirm_investment(&deltas, vehicle)?
            }
            PlayerCommand::ResetOffers => s.reset_offers()?,
            PlayerCommand::Acknowledge(id) => s.acknowledge(id)?,
        };
        Ok((CommandReply::Done, effects))
    }

    fn handle_event(&mut self, event: SessionEvent) {
        if event.epoch != self.session.epoch() {
            debug!(
                event_epoch = event.epoch,
                epoch = self.session.epoch(),
                "Dropping event from previous session"
            );
            return;
        }
        let effects = match event.kind {
            EventKind::DayTick => self.session.day_tick(),
            EventKind::ProgressTick(id) => self.session.progress_tick(id),
            EventKind::OffersFetched(specs) => {
                let ids = self.session.receive_offers(specs);
                if !ids.is_empty() {
                    info!(count = ids.len(), "New offers on the board");
                }
                Vec::new()
            }
            EventKind::PredictionReady {
                mission_id,
                probability,
            } => {
                self.session.prediction_ready(mission_id, probability);
                Vec::new()
            }
        };
        self.apply_effects(effects);
        self.publish();
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        let epoch = self.session.epoch();
        for effect in effects {
            match effect {
                Effect::FetchOffers { seeds } => {
                    let predictor = self.predictor.clone();
                    let tx = self.events_tx.clone();
                    let difficulty = self.session.config().offers.difficulty;
                    self.requests.spawn(async move {
                        let specs = fetch_offers(&predictor, &seeds, difficulty).await;
                        let event = SessionEvent {
                            epoch,
                            kind: EventKind::OffersFetched(specs),
                        };
                        let _ = tx.send(event).await;
                    });
                }
                Effect::RequestPrediction {
                    mission_id,
                    spec,
                    clamp,
                } => {
                    let predictor = self.predictor.clone();
                    let tx = self.events_tx.clone();
                    self.requests.spawn(async move {
                        let probability = request_prediction(&predictor, &spec, clamp).await;
                        let event = SessionEvent {
                            epoch,
                            kind: EventKind::PredictionReady {
                                mission_id,
                                probability,
                            },
                        };
                        let _ = tx.send(event).await;
                    });
                }
                Effect::StartClock => self.scheduler.start_clock(epoch),
                Effect::StopClock => self.scheduler.stop_clock(),
                Effect::StartProgress { mission_id } => {
                    self.scheduler.start_progress(epoch, mission_id);
                }
                Effect::StopProgress { mission_id } => self.scheduler.stop_progress(mission_id),
                Effect::StopAll => {
                    self.scheduler.stop_all();
                    self.requests.abort_all();
                }
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }
}
