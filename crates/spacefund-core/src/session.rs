//! The game session controller.
//!
//! [`GameSession`] owns every piece of mutable game state: the screen, the
//! economy clock, the treasury, and the mission roster. It never touches a
//! timer or the network itself. Each operation mutates state synchronously
//! and returns the [`Effect`]s the runner must carry out -- start or stop a
//! timer, fetch offers, request a prediction. Given the same inputs and
//! random source, a session always plays out the same way.
//!
//! # Lifecycle
//!
//! ```text
//! offered --accept / invest--> in flight --100%--> awaiting outcome
//!                                                     |
//!                      acknowledged <--player-- resolved (roll)
//! ```

use rand::Rng;
use rust_decimal::Decimal;
use spacefund_economy::{
    EconomyError, EntryKind, InvestmentDeltas, Treasury, apply_investment, base_cost,
    investment_cost, reward_for,
};
use spacefund_types::{
    LaunchVehicle, Mission, MissionId, MissionResult, MissionSpec, Screen, SessionId,
    SessionSnapshot,
};
use tracing::{debug, info, warn};

use crate::clock::EconomyClock;
use crate::config::{ConfigError, GameConfig};
use crate::predictor::Clamp;
use crate::roster::{Advance, Roster, Stage};

/// Errors returned when a player action is not allowed.
///
/// A rejected action leaves the session exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The action is not available on the current screen.
    #[error("{action} is not available on the {screen:?} screen")]
    WrongScreen {
        /// The attempted action.
        action: &'static str,
        /// The screen the session is on.
        screen: Screen,
    },

    /// No mission with this id exists.
    #[error("unknown mission {mission_id}")]
    UnknownMission {
        /// The requested id.
        mission_id: MissionId,
    },

    /// The mission exists but is not on offer.
    #[error("mission {mission_id} is not on offer")]
    NotOffered {
        /// The requested id.
        mission_id: MissionId,
    },

    /// The mission has no result waiting to be acknowledged.
    #[error("mission {mission_id} has no result to acknowledge")]
    NotResolved {
        /// The requested id.
        mission_id: MissionId,
    },

    /// The investment dialog is open and blocks the action.
    #[error("investment dialog is open")]
    InvestmentOpen,

    /// The action needs the investment dialog open.
    #[error("investment dialog is not open")]
    InvestmentNotOpen,

    /// Pricing or paying failed (including insufficient funds).
    #[error("economy error: {source}")]
    Economy {
        /// The underlying economy error.
        #[from]
        source: EconomyError,
    },
}

/// Work the runner must do on behalf of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch one preset per seed and hand the batch to
    /// [`GameSession::receive_offers`].
    FetchOffers {
        /// One seed per requested offer.
        seeds: Vec<u64>,
    },
    /// Ask for a success probability and hand it to
    /// [`GameSession::prediction_ready`].
    RequestPrediction {
        /// Mission the prediction is for.
        mission_id: MissionId,
        /// Parameters to predict.
        spec: MissionSpec,
        /// Bounds for the answer.
        clamp: Clamp,
    },
    /// Start (or restart) the day clock.
    StartClock,
    /// Suspend the day clock.
    StopClock,
    /// Start the progress timer of a mission.
    StartProgress {
        /// The mission to fly.
        mission_id: MissionId,
    },
    /// Stop the progress timer of a mission.
    StopProgress {
        /// The mission that landed.
        mission_id: MissionId,
    },
    /// Cancel every timer and discard in-flight requests.
    StopAll,
}

/// All mutable state of one play-through.
#[derive(Debug)]
pub struct GameSession<R> {
    id: SessionId,
    epoch: u64,
    screen: Screen,
    tutorial_from_story: bool,
    clock: EconomyClock,
    treasury: Treasury,
    target: Decimal,
    next_id: MissionId,
    roster: Roster,
    investment: Option<MissionId>,
    config: GameConfig,
    rng: R,
}

impl<R: Rng> GameSession<R> {
    /// Create a session on the menu screen.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails
    /// [`GameConfig::validate`].
    pub fn new(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: SessionId::new(),
            epoch: 0,
            screen: Screen::Menu,
            tutorial_from_story: false,
            clock: EconomyClock::new(config.economy.initial_days, config.offers.refresh_every_days),
            treasury: Treasury::new(config.economy.initial_funds()),
            target: config.economy.target_funds(),
            next_id: MissionId::FIRST,
            roster: Roster::new(),
            investment: None,
            config,
            rng,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Identifier of the current play-through.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Generation counter, bumped on every reset. Timer and request events
    /// stamped with an older epoch belong to a previous play-through.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Current screen.
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    /// Days left on the clock.
    pub const fn game_days(&self) -> u32 {
        self.clock.days_left()
    }

    /// Current balance.
    pub const fn funds(&self) -> Decimal {
        self.treasury.balance()
    }

    /// Balance that wins the game.
    pub const fn target_funds(&self) -> Decimal {
        self.target
    }

    /// The treasury and its journal.
    pub const fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    /// The mission roster.
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The active configuration.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Mission open in the investment dialog.
    pub const fn investment_target(&self) -> Option<MissionId> {
        self.investment
    }

    /// Whether the day clock should be running right now.
    pub const fn clock_running(&self) -> bool {
        matches!(self.screen, Screen::Missions) && self.investment.is_none()
    }

    /// Offered missions, oldest first.
    pub fn offered(&self) -> Vec<Mission> {
        self.roster.offered().cloned().collect()
    }

    /// Results waiting for acknowledgement.
    pub fn results(&self) -> Vec<MissionResult> {
        self.roster.results().collect()
    }

    /// Build a read-only view for the front end.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            screen: self.screen,
            game_days: self.clock.days_left(),
            funds: self.treasury.balance(),
            target_funds: self.target,
            offered: self.offered(),
            active: self.roster.active_views(),
            investment_target: self.investment,
            taken_at: chrono::Utc::now(),
        }
    }

    // -----------------------------------------------------------------------
    // Screen transitions
    // -----------------------------------------------------------------------

    /// Menu -> Story.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongScreen`] unless on the menu.
    pub fn start(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.require_screen("start", &[Screen::Menu])?;
        self.set_screen(Screen::Story);
        Ok(Vec::new())
    }

    /// Menu or Story -> Tutorial.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongScreen`] from any other screen.
    pub fn open_tutorial(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.require_screen("open tutorial", &[Screen::Menu, Screen::Story])?;
        self.tutorial_from_story = self.screen == Screen::Story;
        self.set_screen(Screen::Tutorial);
        Ok(Vec::new())
    }

    /// Story -> Missions, or Tutorial -> Missions when the tutorial was
    /// opened from the story.
    ///
    /// Starts the day clock and requests an initial batch of offers if the
    /// board is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongScreen`] from any other screen.
    pub fn continue_to_missions(&mut self) -> Result<Vec<Effect>, SessionError> {
        let allowed = match self.screen {
            Screen::Story => true,
            Screen::Tutorial => self.tutorial_from_story,
            _ => false,
        };
        if !allowed {
            return Err(SessionError::WrongScreen {
                action: "continue to missions",
                screen: self.screen,
            });
        }
        self.set_screen(Screen::Missions);

        let mut effects = vec![Effect::StartClock];
        for entry in self.roster.active() {
            if matches!(entry.stage, Stage::InFlight { .. }) {
                effects.push(Effect::StartProgress {
                    mission_id: entry.mission.id,
                });
            }
        }
        if self.roster.offered_count() == 0 {
            effects.push(self.fetch_offers(self.config.offers.initial_batch));
        }
        Ok(effects)
    }

    /// Return to the title menu from anywhere, resetting the session.
    ///
    /// From victory or defeat this is the acknowledgement transition. Funds,
    /// days, missions, and the id counter all start over, and every timer
    /// is cancelled.
    pub fn back_to_menu(&mut self) -> Vec<Effect> {
        let previous = self.screen;
        self.reset();
        info!(
            session_id = %self.id,
            from = ?previous,
            "Returned to menu, session reset"
        );
        vec![Effect::StopAll]
    }

    // -----------------------------------------------------------------------
    // Mission board actions
    // -----------------------------------------------------------------------

    /// Accept an offered mission as-is, paying its base cost.
    ///
    /// # Errors
    ///
    /// Fails if not on the missions screen, if the investment dialog is
    /// open, if the mission is not on offer, or if funds are insufficient.
    pub fn accept(&mut self, mission_id: MissionId) -> Result<Vec<Effect>, SessionError> {
        self.require_screen("accept", &[Screen::Missions])?;
        if self.investment.is_some() {
            return Err(SessionError::InvestmentOpen);
        }
        let mission = self.offered_mission(mission_id)?.clone();
        let cost = base_cost(&mission.spec)?;
        self.treasury.debit(mission_id, EntryKind::Launch, cost)?;
        Ok(self.launch(mission, cost))
    }

    /// Open the investment dialog for an offered mission. Suspends the day
    /// clock until the dialog closes.
    ///
    /// # Errors
    ///
    /// Fails if not on the missions screen, if a dialog is already open,
    /// or if the mission is not on offer.
    pub fn open_investment(&mut self, mission_id: MissionId) -> Result<Vec<Effect>, SessionError> {
        self.require_screen("invest", &[Screen::Missions])?;
        if self.investment.is_some() {
            return Err(SessionError::InvestmentOpen);
        }
        self.offered_mission(mission_id)?;
        self.investment = Some(mission_id);
        debug!(mission_id = %mission_id, "Investment dialog opened");
        Ok(vec![Effect::StopClock])
    }

    /// Price the investment currently being edited.
    ///
    /// # Errors
    ///
    /// Fails if the dialog is not open or the mission cannot be priced.
    pub fn quote_investment(
        &self,
        deltas: &InvestmentDeltas,
        vehicle: LaunchVehicle,
    ) -> Result<Decimal, SessionError> {
        let mission_id = self.investment.ok_or(SessionError::InvestmentNotOpen)?;
        let mission = self.offered_mission(mission_id)?;
        Ok(investment_cost(&mission.spec, deltas, vehicle)?)
    }

    /// Close the investment dialog without buying anything.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvestmentNotOpen`] if no dialog is open.
    pub fn cancel_investment(&mut self) -> Result<Vec<Effect>, SessionError> {
        let mission_id = self.investment.take().ok_or(SessionError::InvestmentNotOpen)?;
        debug!(mission_id = %mission_id, "Investment dialog cancelled");
        Ok(self.resume_clock())
    }

    /// Pay for the investment being edited and launch the modified mission.
    ///
    /// The offered mission is replaced by a derived one carrying the new
    /// parameters, and a fresh prediction is requested for it.
    ///
    /// # Errors
    ///
    /// Fails if the dialog is not open, the mission is no longer on offer,
    /// or funds do not cover the full investment cost. The dialog stays
    /// open on insufficient funds.
    pub fn confirm_investment(
        &mut self,
        deltas: &InvestmentDeltas,
        vehicle: LaunchVehicle,
    ) -> Result<Vec<Effect>, SessionError> {
        self.require_screen("invest", &[Screen::Missions])?;
        let mission_id = self.investment.ok_or(SessionError::InvestmentNotOpen)?;
        let original = self.offered_mission(mission_id)?.clone();
        let cost = investment_cost(&original.spec, deltas, vehicle)?;
        self.treasury
            .debit(mission_id, EntryKind::Investment, cost)?;

        let modified = apply_investment(&original, deltas, vehicle);
        self.investment = None;
        let mut effects = self.launch(modified, cost);
        effects.extend(self.resume_clock());
        Ok(effects)
    }

    /// Discard every offer and request a fresh batch. Active missions are
    /// untouched.
    ///
    /// # Errors
    ///
    /// Fails if not on the missions screen or if the investment dialog is
    /// open.
    pub fn reset_offers(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.require_screen("reset offers", &[Screen::Missions])?;
        if self.investment.is_some() {
            return Err(SessionError::InvestmentOpen);
        }
        let dropped = self.roster.clear_offers();
        info!(dropped, "Offers reset");
        Ok(vec![self.fetch_offers(self.config.offers.initial_batch)])
    }

    /// Acknowledge a resolved mission, removing it from the board.
    ///
    /// A success pays twice the mission's base cost. A failure pays nothing.
    ///
    /// # Errors
    ///
    /// Fails if not on the missions screen or if the mission has no result.
    pub fn acknowledge(&mut self, mission_id: MissionId) -> Result<Vec<Effect>, SessionError> {
        self.require_screen("acknowledge", &[Screen::Missions])?;
        let reward = match self.roster.get(mission_id) {
            None => return Err(SessionError::UnknownMission { mission_id }),
            Some(entry) => match entry.stage {
                Stage::Resolved { success: true } => reward_for(&entry.mission.spec)?,
                Stage::Resolved { success: false } => Decimal::ZERO,
                _ => return Err(SessionError::NotResolved { mission_id }),
            },
        };
        if !reward.is_zero() {
            self.treasury.credit(mission_id, EntryKind::Reward, reward)?;
        }
        let (_, success) = self
            .roster
            .acknowledge(mission_id)
            .ok_or(SessionError::NotResolved { mission_id })?;
        info!(
            mission_id = %mission_id,
            success,
            %reward,
            funds = %self.treasury.balance(),
            "Mission acknowledged"
        );
        Ok(self.evaluate_outcome())
    }

    // -----------------------------------------------------------------------
    // Timer and request events
    // -----------------------------------------------------------------------

    /// One day passes.
    ///
    /// Ignored unless the clock is running. Ends the session when the target
    /// is reached or the days run out, and refreshes part of the offer
    /// board on refresh days.
    pub fn day_tick(&mut self) -> Vec<Effect> {
        if !self.clock_running() {
            return Vec::new();
        }
        let tick = self.clock.tick();
        debug!(days_left = tick.days_left, "Day tick");

        let mut effects = self.evaluate_outcome();
        if self.screen == Screen::Missions && tick.refresh_due {
            let evicted = self.roster.evict_oldest_offers(self.config.offers.evict_max);
            let refill = self
                .rng
                .random_range(self.config.offers.refill_min..=self.config.offers.refill_max);
            info!(
                days_left = tick.days_left,
                evicted = evicted.len(),
                refill,
                "Refreshing offers"
            );
            effects.push(self.fetch_offers(refill));
        }
        effects
    }

    /// Add fetched presets to the board as new offers.
    ///
    /// Ignored outside the missions screen. Returns the ids allocated.
    pub fn receive_offers(&mut self, specs: Vec<MissionSpec>) -> Vec<MissionId> {
        if self.screen != Screen::Missions {
            debug!(count = specs.len(), "Dropping offers outside mission board");
            return Vec::new();
        }
        let difficulty = self.config.offers.difficulty;
        let mut ids = Vec::with_capacity(specs.len());
        for spec in specs {
            let id = self.next_id;
            let Some(next) = id.next() else {
                warn!("Mission id space exhausted, dropping offer");
                break;
            };
            self.next_id = next;
            self.roster.insert_offer(Mission::offered(id, spec, difficulty));
            ids.push(id);
        }
        ids
    }

    /// Advance one mission's flight by one progress tick.
    ///
    /// The first tick that reaches 100% stops the mission's timer and
    /// either rolls immediately (prediction already known) or requests one.
    pub fn progress_tick(&mut self, mission_id: MissionId) -> Vec<Effect> {
        if self.screen != Screen::Missions {
            return Vec::new();
        }
        let step = match self.roster.get(mission_id) {
            Some(entry) => self.config.progress.step_for(entry.mission.spec.duration_years),
            None => return vec![Effect::StopProgress { mission_id }],
        };
        match self.roster.advance(mission_id, step) {
            Some(Advance::Progressed(progress)) => {
                tracing::trace!(mission_id = %mission_id, progress, "Mission progress");
                Vec::new()
            }
            Some(Advance::Completed) => {
                info!(mission_id = %mission_id, "Mission reached its target");
                let mut effects = vec![Effect::StopProgress { mission_id }];
                let known = self
                    .roster
                    .get(mission_id)
                    .and_then(|e| e.mission.success_probability);
                match known {
                    Some(probability) => self.roll(mission_id, probability),
                    None => effects.push(self.prediction_request(mission_id)),
                }
                effects
            }
            Some(Advance::AlreadyComplete) | None => vec![Effect::StopProgress { mission_id }],
        }
    }

    /// A prediction request finished. `None` means it failed.
    ///
    /// The probability is stored on the mission. If the mission is waiting
    /// at 100% it is rolled now, using the random fallback when the request
    /// failed. Ignored outside the missions screen.
    pub fn prediction_ready(&mut self, mission_id: MissionId, probability: Option<f64>) {
        if self.screen != Screen::Missions {
            debug!(mission_id = %mission_id, "Dropping prediction outside mission board");
            return;
        }
        if let Some(p) = probability
            && self.roster.set_probability(mission_id, p)
        {
            debug!(mission_id = %mission_id, probability = p, "Prediction attached");
        }
        let awaiting = self
            .roster
            .get(mission_id)
            .is_some_and(|e| e.stage == Stage::AwaitingOutcome);
        if !awaiting {
            return;
        }
        let probability = match probability {
            Some(p) => p,
            None => {
                let p = self.fallback_probability();
                warn!(mission_id = %mission_id, probability = p, "Using fallback prediction");
                p
            }
        };
        self.roll(mission_id, probability);
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            info!(session_id = %self.id, from = ?self.screen, to = ?screen, "Screen change");
            self.screen = screen;
        }
    }

    fn require_screen(&self, action: &'static str, allowed: &[Screen]) -> Result<(), SessionError> {
        if allowed.contains(&self.screen) {
            Ok(())
        } else {
            Err(SessionError::WrongScreen {
                action,
                screen: self.screen,
            })
        }
    }

    fn offered_mission(&self, mission_id: MissionId) -> Result<&Mission, SessionError> {
        match self.roster.get(mission_id) {
            None => Err(SessionError::UnknownMission { mission_id }),
            Some(entry) if entry.stage == Stage::Offered => Ok(&entry.mission),
            Some(_) => Err(SessionError::NotOffered { mission_id }),
        }
    }

    /// Put a paid-for mission into flight.
    fn launch(&mut self, mission: Mission, cost: Decimal) -> Vec<Effect> {
        let mission_id = mission.id;
        if !self.roster.launch(mission) {
            // Guarded by `offered_mission` in every caller.
            warn!(mission_id = %mission_id, "Launch of a mission that is not on offer");
            return Vec::new();
        }
        info!(
            mission_id = %mission_id,
            %cost,
            funds = %self.treasury.balance(),
            "Mission launched"
        );
        vec![
            Effect::StartProgress { mission_id },
            self.prediction_request(mission_id),
        ]
    }

    fn prediction_request(&self, mission_id: MissionId) -> Effect {
        let spec = self
            .roster
            .get(mission_id)
            .map(|e| e.mission.spec.clone());
        match spec {
            Some(spec) => Effect::RequestPrediction {
                mission_id,
                spec,
                clamp: Clamp {
                    min: self.config.predictor.clamp_min,
                    max: self.config.predictor.clamp_max,
                },
            },
            None => Effect::StopProgress { mission_id },
        }
    }

    fn fetch_offers(&mut self, count: usize) -> Effect {
        let seeds = (0..count).map(|_| self.rng.random::<u64>()).collect();
        Effect::FetchOffers { seeds }
    }

    fn fallback_probability(&mut self) -> f64 {
        let p = &self.config.predictor;
        self.rng.random_range(p.fallback_min..p.fallback_max)
    }

    /// Draw one sample and record the outcome. No-op unless the mission is
    /// awaiting an outcome.
    fn roll(&mut self, mission_id: MissionId, probability: f64) {
        let roll = self.rng.random::<f64>() * 100.0;
        let success = roll < probability;
        if let Some(result) = self.roster.resolve(mission_id, success) {
            info!(
                mission_id = %result.mission_id,
                probability,
                roll,
                success = result.success,
                "Mission resolved"
            );
        }
    }

    fn resume_clock(&self) -> Vec<Effect> {
        if self.clock_running() {
            vec![Effect::StartClock]
        } else {
            Vec::new()
        }
    }

    /// Move to victory or defeat if the session is over. Victory is checked
    /// first so a tick that both reaches the target and runs out of days
    /// wins.
    fn evaluate_outcome(&mut self) -> Vec<Effect> {
        if self.screen != Screen::Missions {
            return Vec::new();
        }
        let next = if self.treasury.balance() >= self.target {
            Screen::Victory
        } else if self.clock.is_exhausted() {
            Screen::Defeat
        } else {
            return Vec::new();
        };
        self.investment = None;
        self.set_screen(next);
        info!(
            funds = %self.treasury.balance(),
            target = %self.target,
            days_left = self.clock.days_left(),
            outcome = ?next,
            "Session ended"
        );
        vec![Effect::StopAll]
    }

    fn reset(&mut self) {
        self.id = SessionId::new();
        self.epoch = self.epoch.wrapping_add(1);
        self.screen = Screen::Menu;
        self.tutorial_from_story = false;
        self.clock = EconomyClock::new(
            self.config.economy.initial_days,
            self.config.offers.refresh_every_days,
        );
        self.treasury = Treasury::new(self.config.economy.initial_funds());
        self.target = self.config.economy.target_funds();
        self.next_id = MissionId::FIRST;
        self.roster.clear();
        self.investment = None;
    }
}
