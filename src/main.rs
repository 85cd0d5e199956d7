//! User Study - 无界面模拟程序
//!
//! 入口：初始化日志、加载配置与场景（没有场景时先录制一段路线），再用自动驾驶回放整个序列。
//! 用法：`user-study [scenario.json|scenario.toml]`

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use glam::DVec3;
use user_study::{
    config::{load_config, AppConfig, SimulationSection, StudyConfig},
    core::{StudyCommand, StudySession},
    host::SimHost,
    observability,
    settings::StudySettings,
    simulation::{
        circle_position, ensure_locations, Autopilot, PilotAction, SimClock, SIM_ANCHOR,
        SIM_FRAME,
    },
};

/// 录制路线半径
const RECORD_RADIUS: f64 = 10.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    let scenario_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| cfg.scenario.path.clone());

    let mut host = SimHost::new();
    host.add_object(SIM_ANCHOR, SIM_FRAME, DVec3::ZERO);
    let mut session = StudySession::new(StudyConfig::from(&cfg), host);
    let mut clock = SimClock::new(cfg.simulation.tick_hz, cfg.simulation.time_scale);
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(
        1.0 / f64::from(cfg.simulation.tick_hz.max(1)),
    ));

    match scenario_path {
        Some(path) => {
            let settings = StudySettings::load(&path)
                .with_context(|| format!("Failed to load scenario {:?}", path))?;
            ensure_locations(session.host_mut(), &settings);
            session.load(settings);
        }
        None => {
            tracing::info!(
                "No scenario given, recording {}s of simulated walking",
                cfg.simulation.record_seconds
            );
            record_path(&mut session, &cfg.simulation, &mut clock, &mut ticker).await;
        }
    }

    let finished = play_back(&mut session, &cfg.simulation, &mut clock, &mut ticker).await;

    tracing::info!(
        "Playback {} at checkpoint {}/{} after {:.1}s simulated, {} result entries",
        if finished { "finished" } else { "stopped" },
        session.current_index() + 1,
        session.sequence().size(),
        clock.elapsed().as_secs_f64(),
        session.results().records().len()
    );

    if let Some(path) = &cfg.scenario.results_path {
        session
            .results()
            .write_jsonl(path)
            .with_context(|| format!("Failed to write results to {:?}", path))?;
        tracing::info!("Results written to {:?}", path);
    }

    Ok(())
}

/// 沿圆周行走并定时录制检查点
async fn record_path(
    session: &mut StudySession<SimHost>,
    sim: &SimulationSection,
    clock: &mut SimClock,
    ticker: &mut tokio::time::Interval,
) {
    session.host_mut().set_observer_position(circle_position(RECORD_RADIUS, 0.0));
    session.handle(StudyCommand::SetRecording(true), clock.now());

    let mut walked = 0.0;
    while clock.elapsed() < Duration::from_secs(sim.record_seconds) {
        ticker.tick().await;
        let now = clock.advance();
        walked += sim.walk_speed * clock.step_secs();
        session
            .host_mut()
            .set_observer_position(circle_position(RECORD_RADIUS, walked));
        session.update(now);
    }

    session.handle(StudyCommand::SetRecording(false), clock.now());
}

/// 自动驾驶回放，返回是否走完整个序列
async fn play_back(
    session: &mut StudySession<SimHost>,
    sim: &SimulationSection,
    clock: &mut SimClock,
    ticker: &mut tokio::time::Interval,
) -> bool {
    if session.sequence().is_empty() {
        tracing::warn!("Nothing to play back");
        return false;
    }

    session.handle(StudyCommand::GotoFirst, clock.now());
    let pilot = Autopilot::new(sim.walk_speed, sim.rating);
    let deadline = clock.elapsed() + Duration::from_secs(sim.max_seconds);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                return false;
            }
        }

        let now = clock.advance();
        if let PilotAction::Switched(path) = pilot.step(session, now, clock.step_secs()) {
            tracing::info!("Scenario switch requested: {}", path);
            return true;
        }
        session.update(now);

        if session.is_complete() {
            return true;
        }
        if clock.elapsed() >= deadline {
            tracing::warn!("Simulation time limit reached");
            return false;
        }
    }
}
