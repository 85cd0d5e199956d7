//! 窗口调度：让视图池始终映射序列中从当前索引开始的连续片段
//!
//! - prepare: 检查点首次进入窗口时，将其内容绑定到槽位 `index mod N`
//! - update_visibility: 按与当前索引的距离设置层级、交互与绘制顺序（由远及近）
//! - sync_transforms: 每帧把窗口内检查点的观察者相对变换推给对应槽位

use super::error::StudyError;
use super::sequence::CheckpointSequence;
use super::view_pool::{SlotContent, SlotTier, ViewPool};
use crate::host::Host;
use crate::settings::Scenario;

/// 窗口中的一个位置：第 `tier` 近的检查点 `index` 由槽位 `slot` 绘制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEntry {
    pub tier: usize,
    pub index: usize,
    pub slot: usize,
    pub visible: bool,
}

/// 纯计算：给定当前索引、序列长度与池大小，得到每个层级的绑定
pub fn window_layout(current: usize, len: usize, pool_size: usize) -> Vec<WindowEntry> {
    let n = pool_size.max(1);
    (0..n)
        .map(|tier| {
            let index = current + tier;
            WindowEntry {
                tier,
                index,
                slot: index % n,
                visible: index < len,
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct WindowScheduler {
    pool: ViewPool,
    render_order_base: usize,
}

impl WindowScheduler {
    pub fn new(pool_size: usize, render_order_base: usize) -> Self {
        Self {
            pool: ViewPool::new(pool_size),
            render_order_base,
        }
    }

    pub fn pool(&self) -> &ViewPool {
        &self.pool
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    /// 解除全部绑定（序列被替换 / 清空时）
    pub fn reset(&mut self) {
        self.pool.reset();
    }

    /// 将检查点 `index` 的内容绑定到槽位 `index mod N`，返回是否下发了内容。
    ///
    /// 越界或已绑定在同一槽位时为空操作。内容不依赖位置：位置无法解析时照常绑定，
    /// 只记录警告，变换与接近检测在每帧各自跳过该检查点。
    pub fn prepare<H: Host>(
        &mut self,
        index: usize,
        sequence: &CheckpointSequence,
        scenarios: &[Scenario],
        host: &mut H,
    ) -> bool {
        let Some(checkpoint) = sequence.get(index) else {
            return false;
        };
        if self.pool.is_bound(index) {
            return false;
        }
        if host.resolve(&checkpoint.location_ref).is_none() {
            tracing::warn!(
                "Checkpoint {}: {}",
                index,
                StudyError::LocationNotFound(checkpoint.location_ref.clone())
            );
        }

        let content = SlotContent::for_checkpoint(checkpoint, scenarios);
        let slot = self.pool.bind(index);
        host.bind_content(slot, &content);
        tracing::debug!(
            "Prepared checkpoint {} ({}) in slot {}",
            index,
            checkpoint.location_ref,
            slot
        );
        true
    }

    /// 第 i 近的检查点层级为 i；超出序列的槽位隐藏。仅层级 0 可交互，远处先绘制。
    pub fn update_visibility<H: Host>(&mut self, current: usize, len: usize, host: &mut H) {
        let n = self.pool.size();
        for entry in window_layout(current, len, n) {
            let tier = if entry.visible {
                SlotTier::Visible(entry.tier)
            } else {
                SlotTier::Hidden
            };
            let interactive = entry.visible && entry.tier == 0;
            let order = self.render_order_base + n - entry.tier;

            self.pool.place(entry.slot, tier, interactive, order);
            host.set_tier(entry.slot, tier);
            host.set_interactive(entry.slot, interactive);
            host.set_render_order(entry.slot, order);
        }
    }

    /// 更新窗口内每个检查点的观察者相对变换，返回成功更新的槽位数。
    /// 位置或对象缺失的检查点本帧跳过。
    pub fn sync_transforms<H: Host>(&self, sequence: &CheckpointSequence, host: &mut H) -> usize {
        let mut synced = 0;
        for entry in window_layout(sequence.current_index(), sequence.size(), self.pool.size()) {
            if !entry.visible {
                continue;
            }
            let Some(checkpoint) = sequence.get(entry.index) else {
                continue;
            };
            let Some(location) = host.resolve(&checkpoint.location_ref) else {
                tracing::warn!(
                    "{}",
                    StudyError::LocationNotFound(checkpoint.location_ref.clone())
                );
                continue;
            };
            let Some(object) = host.find_object(&location.anchor, &location.frame) else {
                tracing::warn!(
                    "{}",
                    StudyError::ObjectNotFound {
                        anchor: location.anchor.clone(),
                        frame: location.frame.clone(),
                    }
                );
                continue;
            };

            let transform = object.observer_relative_transform(
                location.position_or_origin(),
                location.rotation_or_identity(),
                checkpoint.scale,
            );
            host.set_transform(entry.slot, transform);
            synced += 1;
        }
        synced
    }
}

impl Default for WindowScheduler {
    fn default() -> Self {
        Self::new(super::view_pool::DEFAULT_POOL_SIZE, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sequence::Checkpoint;
    use crate::host::{Location, SimHost};

    fn setup(n: usize) -> (CheckpointSequence, SimHost) {
        let mut host = SimHost::new();
        let mut items = Vec::new();
        for i in 0..n {
            let name = format!("cp-{}", i);
            host.add_location(&name, Location::new("Earth", "IAU_Earth"));
            items.push(Checkpoint::simple(name, 1.0));
        }
        (CheckpointSequence::from_checkpoints(items), host)
    }

    #[test]
    fn test_window_layout_truncates_at_end() {
        let layout = window_layout(3, 5, 3);
        assert_eq!(layout.len(), 3);
        let entry = |tier, index, slot, visible| WindowEntry {
            tier,
            index,
            slot,
            visible,
        };
        assert_eq!(layout[0], entry(0, 3, 0, true));
        assert_eq!(layout[1], entry(1, 4, 1, true));
        assert_eq!(layout[2], entry(2, 5, 2, false));
    }

    #[test]
    fn test_prepare_binds_modulo_slot_once() {
        let (seq, mut host) = setup(5);
        let mut window = WindowScheduler::new(3, 100);
        assert!(window.prepare(4, &seq, &[], &mut host));
        assert_eq!(window.pool().slot(1).and_then(|s| s.bound_index), Some(4));
        assert!(!window.prepare(4, &seq, &[], &mut host));
        assert_eq!(host.bind_calls().len(), 1);
    }

    #[test]
    fn test_prepare_out_of_range_is_noop() {
        let (seq, mut host) = setup(2);
        let mut window = WindowScheduler::new(3, 100);
        assert!(!window.prepare(2, &seq, &[], &mut host));
        assert!(host.bind_calls().is_empty());
    }

    #[test]
    fn test_prepare_binds_content_without_location() {
        let (mut seq, mut host) = setup(1);
        seq.append(Checkpoint::message("nowhere", 1.0, "hello"));
        let mut window = WindowScheduler::new(3, 100);
        assert!(window.prepare(1, &seq, &[], &mut host));
        assert_eq!(window.pool().slot(1).and_then(|s| s.bound_index), Some(1));
        assert_eq!(
            host.slot_state(1).and_then(|s| s.content.clone()),
            Some(SlotContent::Message("hello".into()))
        );
    }

    #[test]
    fn test_update_visibility_tiers_and_order() {
        let (seq, mut host) = setup(4);
        let mut window = WindowScheduler::new(3, 100);
        window.update_visibility(2, seq.size(), &mut host);

        let pool = window.pool();
        // current = 2 -> slot 2 tier 0, slot 0 (index 3) tier 1, slot 1 (index 4) hidden
        assert_eq!(pool.slot(2).map(|s| s.tier), Some(SlotTier::Visible(0)));
        assert_eq!(pool.slot(0).map(|s| s.tier), Some(SlotTier::Visible(1)));
        assert_eq!(pool.slot(1).map(|s| s.tier), Some(SlotTier::Hidden));
        assert_eq!(pool.interactive_count(), 1);
        assert!(pool.slot(2).map(|s| s.interactive).unwrap_or(false));
        assert!(pool.slot(2).unwrap().render_order > pool.slot(0).unwrap().render_order);
    }

    #[test]
    fn test_update_visibility_empty_sequence() {
        let mut host = SimHost::new();
        let mut window = WindowScheduler::new(3, 100);
        window.update_visibility(0, 0, &mut host);
        assert!(window.pool().slots().iter().all(|s| s.tier == SlotTier::Hidden));
        assert_eq!(window.pool().interactive_count(), 0);
    }

    #[test]
    fn test_sync_transforms_skips_missing() {
        let (mut seq, mut host) = setup(1);
        seq.append(Checkpoint::simple("nowhere", 1.0));
        host.add_object("Earth", "IAU_Earth", glam::DVec3::ZERO);
        let window = WindowScheduler::new(3, 100);
        assert_eq!(window.sync_transforms(&seq, &mut host), 1);
        assert!(host.transform(0).is_some());
        assert!(host.transform(1).is_none());
    }
}
