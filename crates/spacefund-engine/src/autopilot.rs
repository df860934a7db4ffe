//! A scripted player for headless sessions.
//!
//! The autopilot walks through the story, then reacts to every published
//! snapshot: it acknowledges finished missions and, while fewer than
//! `max_active` missions are flying, launches the cheapest offer it can
//! afford. When funds are comfortably above the price, it pays to halve
//! the mission's duration first.
//!
//! Rejected commands are expected (the snapshot it acted on may already be
//! stale) and are only logged.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use spacefund_core::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use spacefund_core::narrative;
use spacefund_core::{PlayerCommand, RunnerError, SessionHandle};
use spacefund_economy::{InvestmentDeltas, base_cost, investment_cost};
use spacefund_types::{Mission, Screen, SessionSnapshot};
use tracing::{debug, info};

use crate::error::EngineError;

/// Autopilot tuning, read from the `autopilot` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AutopilotConfig {
    /// Most missions flying at once.
    #[serde(default = "default_max_active")]
    pub max_active: usize,

    /// Invest only when funds cover the investment this many times over.
    #[serde(default = "default_invest_reserve")]
    pub invest_reserve: u32,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            max_active: default_max_active(),
            invest_reserve: default_invest_reserve(),
        }
    }
}

const fn default_max_active() -> usize {
    2
}

const fn default_invest_reserve() -> u32 {
    4
}

impl AutopilotConfig {
    /// Read the `autopilot` section from the game config file. A missing
    /// file or section yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Autopilot`] if the file cannot be read or the
    /// section does not parse.
    pub fn load() -> Result<Self, EngineError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        let path = Path::new(&path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| EngineError::Autopilot {
            message: format!("failed to read config file: {e}"),
        })?;
        Self::from_yaml(&contents)
    }

    /// Extract the `autopilot` section from a full config document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Autopilot`] for malformed YAML.
    pub fn from_yaml(contents: &str) -> Result<Self, EngineError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: serde_yml::Value =
            serde_yml::from_str(contents).map_err(|e| EngineError::Autopilot {
                message: format!("failed to parse config YAML: {e}"),
            })?;
        match raw.get("autopilot") {
            Some(section) => {
                serde_yml::from_value(section.clone()).map_err(|e| EngineError::Autopilot {
                    message: format!("failed to parse autopilot config: {e}"),
                })
            }
            None => Ok(Self::default()),
        }
    }
}

/// Plays one session through a [`SessionHandle`].
pub struct Autopilot {
    handle: SessionHandle,
    config: AutopilotConfig,
}

impl Autopilot {
    /// Create an autopilot for the session behind `handle`.
    pub const fn new(handle: SessionHandle, config: AutopilotConfig) -> Self {
        Self { handle, config }
    }

    /// Play until the session reaches victory or defeat. Returns the final
    /// screen.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Closed`] if the runner stops first.
    pub async fn play(&self) -> Result<Screen, RunnerError> {
        let mut updates = self.handle.subscribe();
        let mut narrated = None;

        self.command(PlayerCommand::Start).await?;
        narrate(&mut narrated, Screen::Story);
        self.command(PlayerCommand::Continue).await?;

        loop {
            let snapshot = updates.borrow_and_update().clone();
            narrate(&mut narrated, snapshot.screen);
            if snapshot.screen.is_terminal() {
                return Ok(snapshot.screen);
            }
            self.step(&snapshot).await?;
            updates.changed().await.map_err(|_| RunnerError::Closed)?;
        }
    }

    async fn step(&self, snapshot: &SessionSnapshot) -> Result<(), RunnerError> {
        if snapshot.screen != Screen::Missions {
            return Ok(());
        }
        for view in &snapshot.active {
            if let Some(result) = view.result {
                self.command(PlayerCommand::Acknowledge(result.mission_id)).await?;
            }
        }

        let flying = snapshot
            .active
            .iter()
            .filter(|v| v.result.is_none())
            .count();
        if flying >= self.config.max_active {
            return Ok(());
        }
        let Some(mission) = cheapest_affordable(&snapshot.offered, snapshot.funds) else {
            return Ok(());
        };

        if let Some(deltas) = plan_investment(mission, snapshot.funds, self.config.invest_reserve) {
            let vehicle = mission.spec.launch_vehicle;
            self.command(PlayerCommand::OpenInvestment(mission.id)).await?;
            let confirmed = self
                .handle
                .send(PlayerCommand::ConfirmInvestment { deltas, vehicle })
                .await;
            match confirmed {
                Ok(_) => {
                    info!(mission_id = %mission.id, "Autopilot invested in mission");
                    return Ok(());
                }
                Err(RunnerError::Closed) => return Err(RunnerError::Closed),
                Err(RunnerError::Rejected { source }) => {
                    debug!(error = %source, "Investment rejected, launching as offered");
                    self.command(PlayerCommand::CancelInvestment).await?;
                }
            }
        }
        self.command(PlayerCommand::Accept(mission.id)).await
    }

    async fn command(&self, command: PlayerCommand) -> Result<(), RunnerError> {
        match self.handle.send(command.clone()).await {
            Ok(_) => Ok(()),
            Err(RunnerError::Rejected { source }) => {
                debug!(?command, error = %source, "Autopilot command rejected");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

fn narrate(narrated: &mut Option<Screen>, screen: Screen) {
    if *narrated == Some(screen) {
        return;
    }
    *narrated = Some(screen);
    if let Some(text) = narrative::text_for(screen) {
        for line in text.lines() {
            info!(screen = ?screen, "{line}");
        }
    }
}

/// The offer with the lowest base cost that `funds` can pay for.
pub fn cheapest_affordable(offered: &[Mission], funds: Decimal) -> Option<&Mission> {
    offered
        .iter()
        .filter_map(|m| base_cost(&m.spec).ok().map(|cost| (m, cost)))
        .filter(|(_, cost)| *cost <= funds)
        .min_by_key(|(_, cost)| *cost)
        .map(|(m, _)| m)
}

/// Halve the mission's duration if funds cover the price `reserve` times.
pub fn plan_investment(
    mission: &Mission,
    funds: Decimal,
    reserve: u32,
) -> Option<InvestmentDeltas> {
    let deltas = InvestmentDeltas {
        duration_reduction: mission.spec.duration_years / 2.0,
        ..InvestmentDeltas::NONE
    };
    let cost = investment_cost(&mission.spec, &deltas, mission.spec.launch_vehicle).ok()?;
    let needed = cost.checked_mul(Decimal::from(reserve))?;
    (reserve > 0 && funds >= needed).then_some(deltas)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use spacefund_core::config::GameConfig;
    use spacefund_core::{Clamp, Predictor, PredictorError, SessionRunner};
    use spacefund_types::{
        Difficulty, LaunchVehicle, MissionId, MissionSpec, MissionType, TargetType,
    };

    use super::*;

    fn spec(payload_tons: f64) -> MissionSpec {
        MissionSpec {
            payload_tons,
            mission_type: MissionType::Exploration,
            target_type: TargetType::Planet,
            launch_vehicle: LaunchVehicle::Starship,
            distance_ly: 5.0,
            duration_years: 2.0,
            science_pts: 60.0,
            crew_size: 1,
            fuel_tons: 100.0,
        }
    }

    fn mission(id: u64, payload_tons: f64) -> Mission {
        Mission::offered(MissionId(id), spec(payload_tons), Difficulty::Normal)
    }

    #[derive(Clone)]
    struct FixedPredictor {
        probability: f64,
    }

    impl Predictor for FixedPredictor {
        async fn preset(
            &self,
            seed: u64,
            _difficulty: Difficulty,
        ) -> Result<MissionSpec, PredictorError> {
            Ok(spec(if seed % 2 == 0 { 10.0 } else { 20.0 }))
        }

        async fn predict(&self, _spec: &MissionSpec, _clamp: Clamp) -> Result<f64, PredictorError> {
            Ok(self.probability)
        }
    }

    async fn play(config: GameConfig, autopilot: AutopilotConfig, probability: f64) -> Screen {
        let (runner, handle) = SessionRunner::new(
            config,
            FixedPredictor { probability },
            SmallRng::seed_from_u64(3),
        )
        .unwrap();
        let runner = tokio::spawn(runner.run());
        let screen = Autopilot::new(handle, autopilot).play().await.unwrap();
        runner.abort();
        screen
    }

    #[test]
    fn picks_cheapest_offer_within_budget() {
        let offered = vec![mission(1, 20.0), mission(2, 10.0), mission(3, 15.0)];
        let picked = cheapest_affordable(&offered, Decimal::from(1_000_000));
        assert_eq!(picked.map(|m| m.id), Some(MissionId(2)));

        assert!(cheapest_affordable(&offered, Decimal::from(20_000)).is_none());
    }

    #[test]
    fn invests_only_with_reserve() {
        let m = mission(1, 10.0);
        // 23,500 base + 5,000 for one year off
        assert!(plan_investment(&m, Decimal::from(114_000), 4).is_some());
        assert!(plan_investment(&m, Decimal::from(113_999), 4).is_none());
        assert!(plan_investment(&m, Decimal::from(1_000_000), 0).is_none());
    }

    #[test]
    fn autopilot_section_is_optional() {
        assert_eq!(
            AutopilotConfig::from_yaml("economy:\n  initial_days: 10\n").unwrap(),
            AutopilotConfig::default()
        );
        let parsed = AutopilotConfig::from_yaml("autopilot:\n  max_active: 5\n").unwrap();
        assert_eq!(parsed.max_active, 5);
        assert_eq!(parsed.invest_reserve, 4);
        assert!(AutopilotConfig::from_yaml("autopilot: [").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn failing_missions_end_in_defeat() {
        let mut config = GameConfig::default();
        config.economy.initial_days = 4;
        let screen = play(config, AutopilotConfig::default(), 0.0).await;
        assert_eq!(screen, Screen::Defeat);
    }

    #[tokio::test(start_paused = true)]
    async fn one_successful_mission_reaches_a_low_target() {
        let mut config = GameConfig::default();
        config.economy.victory_multiplier = 1;
        let autopilot = AutopilotConfig {
            max_active: 1,
            invest_reserve: 4,
        };
        let screen = play(config, autopilot, 100.0).await;
        assert_eq!(screen, Screen::Victory);
    }
}
