//! 回放控制：按检查点类型分派的交互状态机 + 前进 / 后退 / 瞬移协议
//!
//! 当前状态即当前检查点的类型。各类型只在「何时前进」上不同，槽位、层级与可见性机制共用 WindowScheduler。
//!
//! | 类型 | 前进条件 |
//! |---|---|
//! | Simple | 观察者与检查点距离小于阈值 |
//! | RequestRating | 确认评分（同时记录评分） |
//! | RequestCenterOfGravity | 关闭测量 |
//! | Message | 确认消息 |
//! | SwitchScenario | 不前进；选择场景后交给宿主加载 |

use super::sequence::CheckpointKind;
use super::session::StudySession;
use crate::host::Host;
use crate::results::ResultEvent;

/// 驱动状态机的输入
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Proximity,
    ConfirmRating,
    ConfirmMessage,
    Measurement(bool),
    SelectScenario(String),
}

/// 状态机给出的动作
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// 与当前类型不匹配，忽略
    Stay,
    /// 记录结果后前进
    Advance(ResultEvent),
    /// 只记录结果，不前进
    Record(ResultEvent),
    /// 记录后交给宿主加载场景
    LoadScenario(String),
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    proximity_threshold: f64,
    pending_rating: u32,
    measuring: bool,
    /// 最后一个检查点已完成；游标移动前忽略后续触发
    finished: bool,
}

impl PlaybackController {
    pub fn new(proximity_threshold: f64) -> Self {
        Self {
            proximity_threshold,
            pending_rating: 0,
            measuring: false,
            finished: false,
        }
    }

    /// 游标变化或会话加载时调用
    pub fn on_enter(&mut self) {
        self.pending_rating = 0;
        self.measuring = false;
        self.finished = false;
    }

    pub fn set_rating(&mut self, value: u32) {
        self.pending_rating = value;
    }

    pub fn pending_rating(&self) -> u32 {
        self.pending_rating
    }

    pub fn is_measuring(&self) -> bool {
        self.measuring
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn mark_finished(&mut self) {
        self.finished = true;
    }

    pub fn proximity_threshold(&self) -> f64 {
        self.proximity_threshold
    }

    pub fn is_within_reach(&self, distance: f64) -> bool {
        distance < self.proximity_threshold
    }

    pub fn on_trigger(&mut self, kind: CheckpointKind, trigger: Trigger) -> Transition {
        if self.finished {
            return Transition::Stay;
        }
        match (kind, trigger) {
            (CheckpointKind::Simple, Trigger::Proximity) => {
                Transition::Advance(ResultEvent::Passed)
            }
            (CheckpointKind::RequestRating, Trigger::ConfirmRating) => {
                Transition::Advance(ResultEvent::Rating {
                    value: self.pending_rating,
                })
            }
            (CheckpointKind::RequestCenterOfGravity, Trigger::Measurement(true)) => {
                self.measuring = true;
                Transition::Record(ResultEvent::MeasurementStarted)
            }
            (CheckpointKind::RequestCenterOfGravity, Trigger::Measurement(false)) => {
                self.measuring = false;
                Transition::Advance(ResultEvent::MeasurementStopped)
            }
            (CheckpointKind::Message, Trigger::ConfirmMessage) => {
                Transition::Advance(ResultEvent::MessageConfirmed)
            }
            (CheckpointKind::SwitchScenario, Trigger::SelectScenario(path)) => {
                Transition::LoadScenario(path)
            }
            _ => Transition::Stay,
        }
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl<H: Host> StudySession<H> {
    /// 前进一格（截断到末尾）；准备新进入窗口尾部的检查点，再刷新可见性
    pub fn next_checkpoint(&mut self) {
        if self.sequence.is_empty() {
            return;
        }
        let changed = self.sequence.advance();

        let newly_visible = self.sequence.current_index() + self.window.pool_size() - 1;
        self.window.prepare(
            newly_visible,
            &self.sequence,
            &self.other_scenarios,
            &mut self.host,
        );
        self.window.update_visibility(
            self.sequence.current_index(),
            self.sequence.size(),
            &mut self.host,
        );

        if changed {
            self.playback.on_enter();
        }
    }

    /// 后退一格（截断到 0）；当前检查点的槽位在后退时可能承载着更远的检查点，需重新准备
    pub fn previous_checkpoint(&mut self) {
        if self.sequence.is_empty() {
            return;
        }
        let changed = self.sequence.retreat();

        self.window.prepare(
            self.sequence.current_index(),
            &self.sequence,
            &self.other_scenarios,
            &mut self.host,
        );
        self.window.update_visibility(
            self.sequence.current_index(),
            self.sequence.size(),
            &mut self.host,
        );

        if changed {
            self.playback.on_enter();
        }
    }

    /// 逐格后退到第一个，复用 previous_checkpoint 的不变量
    pub fn goto_first(&mut self) {
        while self.sequence.current_index() > 0 {
            self.previous_checkpoint();
        }
    }

    /// 逐格前进到最后一个
    pub fn goto_last(&mut self) {
        while !self.sequence.is_empty() && !self.sequence.is_at_last() {
            self.next_checkpoint();
        }
    }

    /// 瞬移到当前索引的前一个检查点，使刚到达的检查点仍在前方可见
    pub fn teleport_to_current(&mut self) {
        let index = self.sequence.current_index().saturating_sub(1);
        let Some(checkpoint) = self.sequence.get(index) else {
            return;
        };
        let Some(location) = self.host.resolve(&checkpoint.location_ref) else {
            tracing::error!(
                "No location with the name \"{}\" could be found!",
                checkpoint.location_ref
            );
            return;
        };

        // 只有位置存在时才使用朝向
        let rotation = location.position.and(location.rotation);
        self.host.fly_to(
            &location.anchor,
            &location.frame,
            location.position,
            rotation,
            0.0,
        );
    }

    /// 把触发交给状态机并执行结果动作，返回是否产生了动作
    pub(crate) fn apply_trigger(&mut self, trigger: Trigger) -> bool {
        let Some(checkpoint) = self.sequence.current() else {
            return false;
        };
        let kind = checkpoint.kind;
        let name = checkpoint.location_ref.clone();

        match self.playback.on_trigger(kind, trigger.clone()) {
            Transition::Stay => {
                tracing::debug!("{}: ignored {:?} for {:?} checkpoint", name, trigger, kind);
                false
            }
            Transition::Record(event) => {
                self.results.record(Some(&name), event);
                true
            }
            Transition::Advance(event) => {
                if event == ResultEvent::Passed {
                    tracing::info!("{}: Passed Checkpoint", name);
                }
                self.results.record(Some(&name), event);
                if self.sequence.is_at_last() {
                    self.playback.mark_finished();
                }
                self.next_checkpoint();
                true
            }
            Transition::LoadScenario(path) => {
                self.results
                    .record(Some(&name), ResultEvent::ScenarioLoaded { path: path.clone() });
                self.host.load_scenario(&path);
                true
            }
        }
    }

    /// 当前为 Simple 检查点时检查观察者是否已到达；位置或对象缺失时本帧跳过
    pub(crate) fn check_proximity(&mut self) -> bool {
        let Some(checkpoint) = self.sequence.current() else {
            return false;
        };
        if checkpoint.kind != CheckpointKind::Simple || self.playback.is_finished() {
            return false;
        }
        let Some(location) = self.host.resolve(&checkpoint.location_ref) else {
            tracing::warn!(
                "Proximity skipped: location \"{}\" missing",
                checkpoint.location_ref
            );
            return false;
        };
        let Some(object) = self.host.find_object(&location.anchor, &location.frame) else {
            tracing::warn!(
                "Proximity skipped: no object for {} / {}",
                location.anchor,
                location.frame
            );
            return false;
        };

        let distance = object
            .observer_relative_position(location.position_or_origin())
            .length();
        if self.playback.is_within_reach(distance) {
            self.apply_trigger(Trigger::Proximity)
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_advances_on_proximity_only() {
        let mut pc = PlaybackController::new(1.0);
        assert_eq!(
            pc.on_trigger(CheckpointKind::Simple, Trigger::Proximity),
            Transition::Advance(ResultEvent::Passed)
        );
        assert_eq!(
            pc.on_trigger(CheckpointKind::Simple, Trigger::ConfirmMessage),
            Transition::Stay
        );
    }

    #[test]
    fn test_rating_ignores_proximity() {
        let mut pc = PlaybackController::new(1.0);
        assert_eq!(
            pc.on_trigger(CheckpointKind::RequestRating, Trigger::Proximity),
            Transition::Stay
        );
        pc.set_rating(6);
        assert_eq!(
            pc.on_trigger(CheckpointKind::RequestRating, Trigger::ConfirmRating),
            Transition::Advance(ResultEvent::Rating { value: 6 })
        );
    }

    #[test]
    fn test_measurement_enable_does_not_advance() {
        let mut pc = PlaybackController::new(1.0);
        let kind = CheckpointKind::RequestCenterOfGravity;
        assert_eq!(
            pc.on_trigger(kind, Trigger::Measurement(true)),
            Transition::Record(ResultEvent::MeasurementStarted)
        );
        assert!(pc.is_measuring());
        assert_eq!(
            pc.on_trigger(kind, Trigger::Measurement(false)),
            Transition::Advance(ResultEvent::MeasurementStopped)
        );
        assert!(!pc.is_measuring());
    }

    #[test]
    fn test_switch_scenario_loads_without_advance() {
        let mut pc = PlaybackController::new(1.0);
        assert_eq!(
            pc.on_trigger(
                CheckpointKind::SwitchScenario,
                Trigger::SelectScenario("b.json".into())
            ),
            Transition::LoadScenario("b.json".into())
        );
    }

    #[test]
    fn test_on_enter_resets_state() {
        let mut pc = PlaybackController::new(1.0);
        pc.set_rating(4);
        pc.on_trigger(CheckpointKind::RequestCenterOfGravity, Trigger::Measurement(true));
        pc.mark_finished();
        pc.on_enter();
        assert_eq!(pc.pending_rating(), 0);
        assert!(!pc.is_measuring());
        assert!(!pc.is_finished());
    }

    #[test]
    fn test_finished_blocks_triggers() {
        let mut pc = PlaybackController::new(1.0);
        pc.mark_finished();
        assert_eq!(
            pc.on_trigger(CheckpointKind::Message, Trigger::ConfirmMessage),
            Transition::Stay
        );
    }

    #[test]
    fn test_reach_is_strict() {
        let pc = PlaybackController::new(1.0);
        assert!(pc.is_within_reach(0.99));
        assert!(!pc.is_within_reach(1.0));
    }
}
