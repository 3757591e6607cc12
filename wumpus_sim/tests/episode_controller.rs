//! Controller behaviour over simulated maps and the virtual clock.

use std::time::Duration;
use tokio::sync::watch;
use wumpus_core::{ControlMode, EpisodeConfig, EpisodeController, EpisodeEvent, EpisodeState};
use wumpus_env::{Coord, Direction, EpisodeContext, Hazard, WorldView};
use wumpus_sim::scenarios::ScenarioId;
use wumpus_sim::{SimConfig, SimContext, SimWorld, WumpusWorld};

fn classic() -> WumpusWorld {
    WumpusWorld::from_rows(&["..PP", "WG..", "..P.", "...."]).unwrap()
}

fn drain(rx: &mut wumpus_core::EventReceiver) -> Vec<EpisodeEvent> {
    let mut out = Vec::new();
    while let Ok(e) = rx.try_recv() {
        out.push(e);
    }
    out
}

#[test]
fn manual_walk_to_the_gold() {
    let context = SimContext::shared(1);
    let (mut ctl, mut rx) =
        EpisodeController::new(context, classic(), EpisodeConfig::default()).unwrap();
    ctl.start_episode().unwrap();

    // (0,3) -> (1,3) -> (1,2) -> (1,1)
    ctl.move_agent(Direction::Right).unwrap();
    ctl.move_agent(Direction::Up).unwrap();
    let last = ctl.move_agent(Direction::Up).unwrap();

    assert_eq!(last.at(), Coord::new(1, 1));
    assert_eq!(ctl.state(), EpisodeState::Won);
    let events = drain(&mut rx);
    assert_eq!(events.first(), Some(&EpisodeEvent::Started { attempt: 1 }));
    assert!(events.contains(&EpisodeEvent::Won { at: Coord::new(1, 1) }));
}

#[test]
fn manual_moves_off_the_grid_are_ignored() {
    let context = SimContext::shared(1);
    let (mut ctl, _rx) =
        EpisodeController::new(context, classic(), EpisodeConfig::default()).unwrap();
    ctl.start_episode().unwrap();

    assert_eq!(ctl.move_agent(Direction::Left), None);
    assert_eq!(ctl.move_agent(Direction::Down), None);
    assert_eq!(ctl.agent().unwrap().position(), Coord::new(0, 3));
    assert_eq!(ctl.state(), EpisodeState::Active);
}

#[test]
fn manual_mode_may_walk_into_known_danger() {
    let context = SimContext::shared(1);
    let (mut ctl, _rx) =
        EpisodeController::new(context, classic(), EpisodeConfig::default()).unwrap();
    ctl.start_episode().unwrap();

    // (0,3) -> (0,2) -> (0,1) is the wumpus
    ctl.move_agent(Direction::Up).unwrap();
    ctl.move_agent(Direction::Up).unwrap();
    assert_eq!(ctl.state(), EpisodeState::Lost { cause: Hazard::Wumpus });

    // Same walk on a retry: memory says danger, the human goes anyway
    ctl.retry_keeping_memory().unwrap();
    ctl.move_agent(Direction::Up).unwrap();
    ctl.move_agent(Direction::Up).unwrap();
    assert_eq!(ctl.state(), EpisodeState::Lost { cause: Hazard::Wumpus });
    assert_eq!(ctl.attempt(), 2);
}

#[test]
fn reset_run_forgets_everything() {
    let context = SimContext::shared(1);
    let (mut ctl, _rx) =
        EpisodeController::new(context, classic(), EpisodeConfig::default()).unwrap();
    ctl.start_episode().unwrap();
    ctl.move_agent(Direction::Up).unwrap();
    ctl.move_agent(Direction::Up).unwrap();

    ctl.reset_run().unwrap();

    let agent = ctl.agent().unwrap();
    assert_eq!(ctl.attempt(), 1);
    assert_eq!(agent.knowledge().visited_count(), 1);
    assert!(agent.knowledge().confirmed_dangers().is_empty());
}

#[tokio::test]
async fn async_driver_finishes_classic_on_virtual_time() {
    let context = SimContext::shared(42);
    let config = EpisodeConfig {
        mode: ControlMode::Autonomous,
        ..EpisodeConfig::default()
    };
    let (mut ctl, mut rx) = EpisodeController::new(context.clone(), classic(), config).unwrap();
    ctl.start_episode().unwrap();
    ctl.run_auto();

    let (_stop_tx, stop_rx) = watch::channel(false);
    let state = ctl.run(stop_rx).await;

    assert_eq!(state, EpisodeState::Won);
    assert_eq!(ctl.agent().unwrap().position(), classic().start());

    let events = drain(&mut rx);
    let deaths = events
        .iter()
        .filter(|e| matches!(e, EpisodeEvent::Died { .. }))
        .count();
    let restarts = events
        .iter()
        .filter(|e| matches!(e, EpisodeEvent::Restarted { .. }))
        .count();
    assert_eq!(deaths, restarts);
    assert_eq!(events.last(), Some(&EpisodeEvent::ReturnedToStart));
    assert!(context.now() >= Duration::from_millis(450));
}

#[tokio::test]
async fn async_driver_declares_walled_start_unsolvable() {
    let world = SimWorld::new(SimConfig::default(), ScenarioId::WalledStart).unwrap();
    let (mut ctl, mut rx) = world.controller().unwrap();
    ctl.start_episode().unwrap();
    ctl.run_auto();

    let (_stop_tx, stop_rx) = watch::channel(false);
    let state = ctl.run(stop_rx).await;

    assert_eq!(state, EpisodeState::Unsolvable);
    let events = drain(&mut rx);
    assert!(events.contains(&EpisodeEvent::MapUnsolvable));
    assert!(events.contains(&EpisodeEvent::RetryScheduled { attempt: 2, delay_ms: 350 }));
    assert_eq!(ctl.next_wakeup(), None);
}
