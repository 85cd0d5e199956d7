//! 研究会话：唯一的上下文对象
//!
//! 持有检查点序列与游标、视图池（经 WindowScheduler）、回放状态机、录制采样器、结果日志与宿主。
//! 加载时整体替换序列并准备窗口；拆除时清空。所有修改都在单线程的帧更新或界面回调中同步完成。

use std::time::Instant;

use uuid::Uuid;

use super::command::StudyCommand;
use super::playback::{PlaybackController, Trigger};
use super::recording::RecordingSampler;
use super::sequence::{Checkpoint, CheckpointSequence};
use super::view_pool::ViewPool;
use super::window::WindowScheduler;
use crate::config::StudyConfig;
use crate::host::Host;
use crate::results::{ResultEvent, ResultsLog};
use crate::settings::{Scenario, StudySettings, DEFAULT_RECORDING_INTERVAL};

pub struct StudySession<H: Host> {
    pub(crate) id: Uuid,
    pub(crate) config: StudyConfig,
    pub(crate) host: H,
    pub(crate) sequence: CheckpointSequence,
    pub(crate) other_scenarios: Vec<Scenario>,
    pub(crate) window: WindowScheduler,
    pub(crate) playback: PlaybackController,
    pub(crate) recorder: RecordingSampler,
    pub(crate) results: ResultsLog,
}

impl<H: Host> StudySession<H> {
    pub fn new(config: StudyConfig, host: H) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            window: WindowScheduler::new(config.pool_size, config.render_order_base),
            playback: PlaybackController::new(config.proximity_threshold),
            recorder: RecordingSampler::new(DEFAULT_RECORDING_INTERVAL),
            results: ResultsLog::new(id),
            sequence: CheckpointSequence::new(),
            other_scenarios: Vec::new(),
            config,
            host,
        }
    }

    /// 整体加载设置：替换序列、游标归零、准备前 N 个检查点并刷新可见性
    pub fn load(&mut self, settings: StudySettings) {
        self.unload();
        self.recorder.stop();
        self.host.set_recording_indicator(false);

        self.sequence = CheckpointSequence::from_checkpoints(settings.checkpoints);
        self.other_scenarios = settings.other_scenarios;
        self.recorder.set_interval_secs(settings.recording_interval);
        self.host.set_interval_display(self.recorder.interval_secs());

        for index in 0..self.window.pool_size() {
            self.window.prepare(
                index,
                &self.sequence,
                &self.other_scenarios,
                &mut self.host,
            );
        }
        self.window.update_visibility(
            self.sequence.current_index(),
            self.sequence.size(),
            &mut self.host,
        );
        self.playback.on_enter();

        tracing::info!(
            session = %self.id,
            "Loaded {} checkpoints, {} alternative scenarios",
            self.sequence.size(),
            self.other_scenarios.len()
        );
    }

    /// 解除所有槽位绑定并隐藏
    pub fn unload(&mut self) {
        self.window.reset();
        self.window.update_visibility(0, 0, &mut self.host);
    }

    /// 会话拆除：清空序列与场景列表，停止录制
    pub fn teardown(&mut self) {
        self.recorder.stop();
        self.unload();
        self.sequence.clear();
        self.other_scenarios.clear();
        self.playback.on_enter();
        tracing::info!(session = %self.id, "Session torn down");
    }

    /// 保存钩子：当前序列、场景与录制间隔
    pub fn snapshot_settings(&self) -> StudySettings {
        StudySettings {
            recording_interval: self.recorder.interval_secs(),
            other_scenarios: self.other_scenarios.clone(),
            checkpoints: self.sequence.checkpoints().to_vec(),
        }
    }

    /// 删除全部检查点以及录制生成的位置
    pub fn delete_all_checkpoints(&mut self) {
        self.sequence.clear();
        let removed = self.remove_recorded_locations();
        self.window.reset();
        self.window.update_visibility(0, 0, &mut self.host);
        self.playback.on_enter();
        tracing::info!("Deleted all checkpoints ({} recorded locations removed)", removed);
    }

    /// 滑块值截断为整数并限制在配置范围内
    pub fn set_recording_interval(&mut self, seconds: f64) {
        let secs = (seconds as u32).clamp(
            self.config.min_recording_interval,
            self.config.max_recording_interval,
        );
        self.recorder.set_interval_secs(secs);
        self.host.set_interval_display(secs);
    }

    /// 回到当前检查点（记录 RESET）
    pub fn reset_to_current(&mut self) {
        let Some(name) = self.sequence.current().map(|c| c.location_ref.clone()) else {
            return;
        };
        self.results.record(Some(&name), ResultEvent::Reset);
        self.teleport_to_current();
    }

    /// 从头开始：回到第一个检查点，飞往配置的起始位置
    pub fn restart(&mut self) {
        self.results.record(None, ResultEvent::Restart);
        self.goto_first();

        let target = self
            .config
            .restart_location
            .as_deref()
            .and_then(|name| self.host.resolve(name));
        match target {
            Some(location) => {
                let duration = self.config.restart_flight_secs;
                self.host.fly_to(
                    &location.anchor,
                    &location.frame,
                    location.position,
                    location.rotation,
                    duration,
                );
            }
            None => {
                if let Some(name) = &self.config.restart_location {
                    tracing::warn!(
                        "Restart location \"{}\" not found, teleporting instead",
                        name
                    );
                }
                self.teleport_to_current();
            }
        }
    }

    /// 处理一条用户命令
    pub fn handle(&mut self, command: StudyCommand, now: Instant) {
        tracing::debug!("Command: {:?}", command);
        match command {
            StudyCommand::SetRating(value) => self.playback.set_rating(value),
            StudyCommand::ConfirmRating => {
                self.apply_trigger(Trigger::ConfirmRating);
            }
            StudyCommand::ConfirmMessage => {
                self.apply_trigger(Trigger::ConfirmMessage);
            }
            StudyCommand::SetMeasurement(enable) => {
                self.apply_trigger(Trigger::Measurement(enable));
            }
            StudyCommand::SelectScenario(path) => {
                self.apply_trigger(Trigger::SelectScenario(path));
            }
            StudyCommand::GotoFirst => {
                self.goto_first();
                self.teleport_to_current();
            }
            StudyCommand::GotoPrevious => {
                self.previous_checkpoint();
                self.teleport_to_current();
            }
            StudyCommand::GotoNext => {
                self.next_checkpoint();
                self.teleport_to_current();
            }
            StudyCommand::GotoLast => {
                self.goto_last();
                self.teleport_to_current();
            }
            StudyCommand::SetRecording(true) => self.start_recording(now),
            StudyCommand::SetRecording(false) => self.stop_recording(),
            StudyCommand::SetRecordingInterval(seconds) => self.set_recording_interval(seconds),
            StudyCommand::DeleteAllCheckpoints => self.delete_all_checkpoints(),
            StudyCommand::ResetToCurrent => self.reset_to_current(),
            StudyCommand::Restart => self.restart(),
        }
    }

    /// 每帧调用：录制中采样，否则同步窗口变换并检查接近
    pub fn update(&mut self, now: Instant) {
        if self.recorder.is_active() {
            self.record_tick(now);
        } else {
            self.window.sync_transforms(&self.sequence, &mut self.host);
            self.check_proximity();
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn sequence(&self) -> &CheckpointSequence {
        &self.sequence
    }

    pub fn current_index(&self) -> usize {
        self.sequence.current_index()
    }

    pub fn current_checkpoint(&self) -> Option<&Checkpoint> {
        self.sequence.current()
    }

    pub fn other_scenarios(&self) -> &[Scenario] {
        &self.other_scenarios
    }

    pub fn pool(&self) -> &ViewPool {
        self.window.pool()
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_active()
    }

    pub fn recording_interval(&self) -> u32 {
        self.recorder.interval_secs()
    }

    pub fn results(&self) -> &ResultsLog {
        &self.results
    }

    /// 最后一个检查点已完成
    pub fn is_complete(&self) -> bool {
        !self.sequence.is_empty() && self.sequence.is_at_last() && self.playback.is_finished()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sequence::CheckpointKind;
    use crate::core::view_pool::SlotTier;
    use crate::host::{Location, SimHost};

    fn host_with(names: &[&str]) -> SimHost {
        let mut host = SimHost::new();
        host.add_object("Earth", "IAU_Earth", glam::DVec3::ZERO);
        for (i, name) in names.iter().enumerate() {
            host.add_location(
                name,
                Location::new("Earth", "IAU_Earth").with_position(glam::DVec3::new(
                    10.0 * (i as f64 + 1.0),
                    0.0,
                    0.0,
                )),
            );
        }
        host
    }

    fn session_with(kinds: &[CheckpointKind]) -> StudySession<SimHost> {
        let names: Vec<String> = (0..kinds.len()).map(|i| format!("cp-{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut session = StudySession::new(StudyConfig::default(), host_with(&refs));
        session.load(StudySettings {
            checkpoints: kinds
                .iter()
                .zip(&names)
                .map(|(k, n)| Checkpoint::new(*k, n.clone(), 1.0))
                .collect(),
            ..Default::default()
        });
        session
    }

    #[test]
    fn test_load_prepares_first_window() {
        let session = session_with(&[CheckpointKind::Simple; 5]);
        let slots: Vec<usize> = session.host().bind_calls().iter().map(|(s, _)| *s).collect();
        assert_eq!(slots, vec![0, 1, 2]);
        assert_eq!(
            session.host().slot_state(0).map(|s| s.tier),
            Some(SlotTier::Visible(0))
        );
        assert_eq!(session.pool().interactive_count(), 1);
    }

    #[test]
    fn test_snapshot_matches_loaded() {
        let mut session = session_with(&[CheckpointKind::Message, CheckpointKind::Simple]);
        session.set_recording_interval(7.9);
        let snap = session.snapshot_settings();
        assert_eq!(snap.checkpoints.len(), 2);
        assert_eq!(snap.recording_interval, 7);
    }

    #[test]
    fn test_interval_clamped_to_range() {
        let mut session = session_with(&[]);
        session.set_recording_interval(0.2);
        assert_eq!(session.recording_interval(), 1);
        session.set_recording_interval(99.0);
        assert_eq!(session.recording_interval(), 20);
        assert_eq!(session.host().interval_display(), Some(20));
    }

    #[test]
    fn test_mismatched_event_ignored() {
        let mut session = session_with(&[CheckpointKind::Simple, CheckpointKind::Simple]);
        session.handle(StudyCommand::ConfirmMessage, Instant::now());
        assert_eq!(session.current_index(), 0);
        assert!(session.results().records().is_empty());
    }

    #[test]
    fn test_teardown_clears() {
        let mut session = session_with(&[CheckpointKind::Simple; 3]);
        session.next_checkpoint();
        session.teardown();
        assert!(session.sequence().is_empty());
        assert_eq!(session.current_index(), 0);
        assert!(session
            .pool()
            .slots()
            .iter()
            .all(|s| s.bound_index.is_none() && s.tier == SlotTier::Hidden));
    }

    #[test]
    fn test_reset_on_empty_is_noop() {
        let mut session = session_with(&[]);
        session.reset_to_current();
        assert!(session.results().records().is_empty());
        assert!(session.host().flights().is_empty());
    }
}
