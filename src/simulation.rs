//! 无界面模拟：模拟时钟、录制路线与自动驾驶
//!
//! 供 `user-study` 程序在没有 3D 引擎时演练一次完整的录制 + 回放流程。

use std::time::{Duration, Instant};

use glam::DVec3;

use crate::core::{CheckpointKind, StudyCommand, StudySession};
use crate::host::{Location, LocationStore, SimHost};
use crate::settings::StudySettings;

/// 模拟锚点
pub const SIM_ANCHOR: &str = "Earth";
pub const SIM_FRAME: &str = "IAU_Earth";

/// 模拟时钟：每个节拍前进固定的模拟时长，与真实时间按比例缩放
#[derive(Debug, Clone)]
pub struct SimClock {
    start: Instant,
    elapsed: Duration,
    step: Duration,
}

impl SimClock {
    pub fn new(tick_hz: u32, time_scale: f64) -> Self {
        let tick = 1.0 / f64::from(tick_hz.max(1));
        Self {
            start: Instant::now(),
            elapsed: Duration::ZERO,
            step: Duration::from_secs_f64(tick * time_scale.max(0.0)),
        }
    }

    /// 前进一个节拍，返回新的模拟时刻
    pub fn advance(&mut self) -> Instant {
        self.elapsed += self.step;
        self.now()
    }

    pub fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn step_secs(&self) -> f64 {
        self.step.as_secs_f64()
    }
}

/// 录制路线：绕锚点原点的圆周，`distance` 为已行走的弧长
pub fn circle_position(radius: f64, distance: f64) -> DVec3 {
    let angle = distance / radius.max(f64::EPSILON);
    DVec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

/// 为场景中引用但宿主中不存在的位置补上合成位置（沿 x 轴每 5 个单位一个），返回补充数量
pub fn ensure_locations(host: &mut SimHost, settings: &StudySettings) -> usize {
    let mut added = 0;
    for (i, name) in settings.referenced_locations().iter().enumerate() {
        if host.resolve(name).is_none() {
            let position = DVec3::new(5.0 * (i as f64 + 1.0), 0.0, 0.0);
            host.register(
                name,
                Location::new(SIM_ANCHOR, SIM_FRAME).with_position(position),
            );
            added += 1;
        }
    }
    if added > 0 {
        tracing::warn!("Placed {} missing locations along the x axis", added);
    }
    added
}

/// 自动驾驶的一步结果
#[derive(Debug, Clone, PartialEq)]
pub enum PilotAction {
    Idle,
    Walking { distance: f64 },
    Answered(StudyCommand),
    /// 选择了另一个场景，会话应结束
    Switched(String),
}

/// 朝当前检查点行走，到达后自动回答评分 / 消息 / 测量 / 场景选择
#[derive(Debug, Clone)]
pub struct Autopilot {
    speed: f64,
    rating: u32,
}

impl Autopilot {
    pub fn new(speed: f64, rating: u32) -> Self {
        Self { speed, rating }
    }

    pub fn step(
        &self,
        session: &mut StudySession<SimHost>,
        now: Instant,
        dt_secs: f64,
    ) -> PilotAction {
        if session.playback().is_finished() {
            return PilotAction::Idle;
        }
        let Some(checkpoint) = session.current_checkpoint().cloned() else {
            return PilotAction::Idle;
        };
        let target = session
            .host()
            .resolve(&checkpoint.location_ref)
            .and_then(|l| session.host().world_position(&l));
        let Some(target) = target else {
            return PilotAction::Idle;
        };

        let offset = target - session.host().observer_world_position();
        let distance = offset.length();
        let stride = self.speed * dt_secs;
        if distance > stride {
            session
                .host_mut()
                .move_observer(offset / distance * stride);
            return PilotAction::Walking {
                distance: distance - stride,
            };
        }
        session.host_mut().move_observer(offset);

        let command = match checkpoint.kind {
            CheckpointKind::Simple => return PilotAction::Walking { distance: 0.0 },
            CheckpointKind::RequestRating => {
                session.handle(StudyCommand::SetRating(self.rating), now);
                StudyCommand::ConfirmRating
            }
            CheckpointKind::Message => StudyCommand::ConfirmMessage,
            CheckpointKind::RequestCenterOfGravity => {
                StudyCommand::SetMeasurement(!session.playback().is_measuring())
            }
            CheckpointKind::SwitchScenario => {
                let Some(scenario) = session.other_scenarios().first().cloned() else {
                    return PilotAction::Idle;
                };
                session.handle(StudyCommand::SelectScenario(scenario.path.clone()), now);
                return PilotAction::Switched(scenario.path);
            }
        };
        session.handle(command.clone(), now);
        PilotAction::Answered(command)
    }
}
