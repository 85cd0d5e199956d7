//! 定时录制：按固定时间间隔采样观察者位置，生成新的检查点
//!
//! 采样严格按时间（而非移动距离）进行；间隔的比较是纯时间比较，没有定时回调。
//! 录制与回放互斥：开始录制会清空序列，回放状态随之重置。

use std::time::{Duration, Instant};

use super::sequence::Checkpoint;
use super::session::StudySession;
use crate::host::{Host, Location};
use crate::settings::DEFAULT_RECORDING_INTERVAL;

#[derive(Debug, Clone)]
pub struct RecordingSampler {
    active: bool,
    last_sample: Option<Instant>,
    interval_secs: u32,
}

impl RecordingSampler {
    pub fn new(interval_secs: u32) -> Self {
        Self {
            active: false,
            last_sample: None,
            interval_secs: interval_secs.max(1),
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.active = true;
        self.last_sample = Some(now);
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    pub fn set_interval_secs(&mut self, secs: u32) {
        self.interval_secs = secs.max(1);
    }

    pub fn last_sample(&self) -> Option<Instant> {
        self.last_sample
    }

    /// 距上次采样已满一个间隔时返回 true，并把采样时间更新为 `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.active {
            return false;
        }
        let last = *self.last_sample.get_or_insert(now);
        let interval = Duration::from_secs(u64::from(self.interval_secs));
        if now.saturating_duration_since(last) >= interval {
            self.last_sample = Some(now);
            true
        } else {
            false
        }
    }
}

impl Default for RecordingSampler {
    fn default() -> Self {
        Self::new(DEFAULT_RECORDING_INTERVAL)
    }
}

impl<H: Host> StudySession<H> {
    /// 开始新的录制：清空序列与之前录制生成的位置，隐藏所有槽位
    pub fn start_recording(&mut self, now: Instant) {
        if self.recorder.is_active() {
            tracing::debug!("Recording already active");
            return;
        }

        self.sequence.clear();
        self.remove_recorded_locations();
        self.window.reset();
        self.window.update_visibility(0, 0, &mut self.host);
        self.playback.on_enter();

        self.recorder.start(now);
        self.host.set_recording_indicator(true);
        tracing::info!(
            "Recording started (interval {}s)",
            self.recorder.interval_secs()
        );
    }

    /// 结束录制：准备前 N 个检查点并刷新可见性，立即可回放
    pub fn stop_recording(&mut self) {
        if !self.recorder.is_active() {
            return;
        }
        self.recorder.stop();

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
        self.host.set_recording_indicator(false);
        tracing::info!(
            "Recording stopped with {} checkpoints",
            self.sequence.size()
        );
    }

    /// 录制中每帧调用；到期时采样观察者并追加一个 Simple 检查点
    pub(crate) fn record_tick(&mut self, now: Instant) -> bool {
        if !self.recorder.poll(now) {
            return false;
        }

        let name = format!("{}{}", self.config.marker_prefix, self.sequence.size());
        let location = Location {
            anchor: self.host.observer_anchor(),
            frame: self.host.observer_frame(),
            position: Some(self.host.observer_position()),
            rotation: Some(self.host.observer_rotation()),
        };
        self.host.register(&name, location);
        self.sequence
            .append(Checkpoint::simple(name.clone(), self.host.observer_scale()));

        tracing::info!("Recorded Checkpoint {}.", name);
        true
    }

    /// 删除名称带录制前缀的所有位置，返回删除数量
    pub(crate) fn remove_recorded_locations(&mut self) -> usize {
        let prefix = self.config.marker_prefix.clone();
        let mut removed = 0;
        for name in self.host.location_names() {
            if name.starts_with(&prefix) && self.host.remove(&name) {
                tracing::info!("Removing location {}.", name);
                removed += 1;
            }
        }
        removed
    }
}
