//! Integration tests for the session runner.
//!
//! Time is paused so the day clock and progress timers advance
//! instantly and deterministically. The predictor is an in-process fake.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_decimal::Decimal;
use spacefund_core::config::GameConfig;
use spacefund_core::{
    Clamp, CommandReply, ConfigError, PlayerCommand, Predictor, PredictorError, RunnerError,
    SessionError, SessionHandle, SessionRunner,
};
use spacefund_economy::InvestmentDeltas;
use spacefund_types::{
    Difficulty, LaunchVehicle, MissionId, MissionSpec, MissionType, Screen, SessionSnapshot,
    TargetType,
};
use tokio::task::JoinHandle;

#[derive(Clone)]
struct FakePredictor {
    probability: Option<f64>,
}

impl Predictor for FakePredictor {
    async fn preset(
        &self,
        _seed: u64,
        _difficulty: Difficulty,
    ) -> Result<MissionSpec, PredictorError> {
        Ok(MissionSpec {
            payload_tons: 10.0,
            mission_type: MissionType::Mining,
            target_type: TargetType::Asteroid,
            launch_vehicle: LaunchVehicle::Starship,
            distance_ly: 5.0,
            duration_years: 2.0,
            science_pts: 30.0,
            crew_size: 1,
            fuel_tons: 100.0,
        })
    }

    async fn predict(&self, _spec: &MissionSpec, _clamp: Clamp) -> Result<f64, PredictorError> {
        self.probability.ok_or_else(|| PredictorError::Transport {
            message: String::from("connection refused"),
        })
    }
}

fn spawn_runner(
    config: GameConfig,
    probability: Option<f64>,
) -> (SessionHandle, JoinHandle<SessionSnapshot>) {
    let (runner, handle) = SessionRunner::new(
        config,
        FakePredictor { probability },
        SmallRng::seed_from_u64(11),
    )
    .unwrap();
    (handle, tokio::spawn(runner.run()))
}

async fn wait_for(handle: &SessionHandle, what: impl FnMut(&SessionSnapshot) -> bool) {
    let mut rx = handle.subscribe();
    tokio::time::timeout(Duration::from_secs(600), rx.wait_for(what))
        .await
        .unwrap()
        .unwrap();
}

async fn enter_board(handle: &SessionHandle) {
    handle.send(PlayerCommand::Start).await.unwrap();
    handle.send(PlayerCommand::Continue).await.unwrap();
    wait_for(handle, |s| s.offered.len() == 5).await;
}

#[tokio::test(start_paused = true)]
async fn accepted_mission_resolves_and_pays_on_acknowledge() {
    let (handle, runner) = spawn_runner(GameConfig::default(), Some(100.0));
    enter_board(&handle).await;

    handle
        .send(PlayerCommand::Accept(MissionId(1)))
        .await
        .unwrap();
    assert_eq!(handle.snapshot().funds, Decimal::from(976_500));

    wait_for(&handle, |s| {
        s.active
            .first()
            .is_some_and(|a| a.result.is_some_and(|r| r.success))
    })
    .await;

    handle
        .send(PlayerCommand::Acknowledge(MissionId(1)))
        .await
        .unwrap();
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.funds, Decimal::from(1_023_500));
    assert!(snapshot.active.is_empty());

    drop(handle);
    let last = runner.await.unwrap();
    assert_eq!(last.funds, Decimal::from(1_023_500));
}

#[tokio::test(start_paused = true)]
async fn failing_predictor_still_resolves_missions() {
    let (handle, _runner) = spawn_runner(GameConfig::default(), None);
    enter_board(&handle).await;

    handle
        .send(PlayerCommand::Accept(MissionId(3)))
        .await
        .unwrap();
    wait_for(&handle, |s| s.active.iter().any(|a| a.result.is_some())).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.active.len(), 1);
    assert!((snapshot.active[0].progress - 100.0).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn days_running_out_ends_in_defeat_and_freezes() {
    let mut config = GameConfig::default();
    config.economy.initial_days = 3;
    let (handle, _runner) = spawn_runner(config, Some(100.0));
    enter_board(&handle).await;
    handle
        .send(PlayerCommand::Accept(MissionId(1)))
        .await
        .unwrap();

    let started = tokio::time::Instant::now();
    wait_for(&handle, |s| s.screen == Screen::Defeat).await;
    assert!(started.elapsed() <= Duration::from_millis(9000));

    let frozen = handle.snapshot();
    assert_eq!(frozen.game_days, 0);
    tokio::time::sleep(Duration::from_secs(30)).await;
    let later = handle.snapshot();
    assert_eq!(later.game_days, 0);
    assert_eq!(later.active, frozen.active);
    assert_eq!(later.screen, Screen::Defeat);
}

#[tokio::test(start_paused = true)]
async fn investment_dialog_pauses_the_day_clock() {
    let (handle, _runner) = spawn_runner(GameConfig::default(), Some(50.0));
    enter_board(&handle).await;

    handle
        .send(PlayerCommand::OpenInvestment(MissionId(2)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(handle.snapshot().game_days, 30);

    let quote = handle
        .send(PlayerCommand::QuoteInvestment {
            deltas: InvestmentDeltas::NONE,
            vehicle: LaunchVehicle::Ariane6,
        })
        .await
        .unwrap();
    assert_eq!(quote, CommandReply::Quote(Decimal::from(63_500)));

    handle
        .send(PlayerCommand::CancelInvestment)
        .await
        .unwrap();
    wait_for(&handle, |s| s.game_days == 29).await;
}

#[tokio::test(start_paused = true)]
async fn back_to_menu_discards_the_old_session() {
    let (handle, _runner) = spawn_runner(GameConfig::default(), Some(100.0));
    enter_board(&handle).await;
    let old = handle.snapshot();
    handle
        .send(PlayerCommand::Accept(MissionId(1)))
        .await
        .unwrap();

    handle.send(PlayerCommand::BackToMenu).await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;

    let fresh = handle.snapshot();
    assert_ne!(fresh.session_id, old.session_id);
    assert_eq!(fresh.screen, Screen::Menu);
    assert_eq!(fresh.game_days, 30);
    assert_eq!(fresh.funds, Decimal::from(1_000_000));
    assert!(fresh.offered.is_empty());
    assert!(fresh.active.is_empty());
}

#[tokio::test(start_paused = true)]
async fn rejected_commands_report_the_reason() {
    let (handle, _runner) = spawn_runner(GameConfig::default(), Some(100.0));
    let err = handle
        .send(PlayerCommand::Accept(MissionId(1)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RunnerError::Rejected {
            source: SessionError::WrongScreen {
                screen: Screen::Menu,
                ..
            }
        }
    ));
}

#[test]
fn runner_refuses_zero_tick_interval() {
    let mut config = GameConfig::default();
    config.progress.tick_interval_ms = 0;
    let result = SessionRunner::new(
        config,
        FakePredictor {
            probability: Some(100.0),
        },
        SmallRng::seed_from_u64(11),
    );
    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
}
