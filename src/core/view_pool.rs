//! 视图池：固定 N 个可复用槽位
//!
//! 绝对索引 k 的检查点永远由槽位 `k mod N` 绘制；绑定表记录每个槽位当前承载的检查点，
//! 同一检查点只在首次进入窗口时绑定一次内容。槽位在会话期间只重绑、不增删。

use serde::Serialize;

use super::sequence::{Checkpoint, CheckpointKind};
use crate::settings::Scenario;

/// 默认槽位数
pub const DEFAULT_POOL_SIZE: usize = 3;

/// 槽位层级：`Visible(0)` 为当前检查点，数值越大越透明
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotTier {
    Visible(usize),
    Hidden,
}

/// 按检查点类型推送到槽位的内容
#[derive(Debug, Clone, PartialEq)]
pub enum SlotContent {
    /// 普通标记（重置外观）
    Marker,
    /// 评分控件
    RatingRequest,
    /// 重心测量控件
    MeasurementRequest,
    Message(String),
    /// 可选场景及其加载路径
    ScenarioChoice(Vec<Scenario>),
}

impl SlotContent {
    pub fn for_checkpoint(checkpoint: &Checkpoint, scenarios: &[Scenario]) -> Self {
        match checkpoint.kind {
            CheckpointKind::Simple => SlotContent::Marker,
            CheckpointKind::RequestRating => SlotContent::RatingRequest,
            CheckpointKind::RequestCenterOfGravity => SlotContent::MeasurementRequest,
            CheckpointKind::Message => {
                SlotContent::Message(checkpoint.data.clone().unwrap_or_default())
            }
            CheckpointKind::SwitchScenario => SlotContent::ScenarioChoice(scenarios.to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSlot {
    pub bound_index: Option<usize>,
    pub tier: SlotTier,
    pub interactive: bool,
    pub render_order: usize,
}

impl Default for ViewSlot {
    fn default() -> Self {
        Self {
            bound_index: None,
            tier: SlotTier::Hidden,
            interactive: false,
            render_order: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewPool {
    slots: Vec<ViewSlot>,
}

impl ViewPool {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![ViewSlot::default(); size.max(1)],
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// 固定映射：检查点索引 -> 槽位
    pub fn slot_for(&self, index: usize) -> usize {
        index % self.slots.len()
    }

    pub fn slot(&self, slot: usize) -> Option<&ViewSlot> {
        self.slots.get(slot)
    }

    pub fn slots(&self) -> &[ViewSlot] {
        &self.slots
    }

    /// 检查点 `index` 是否已绑定在它的槽位上
    pub fn is_bound(&self, index: usize) -> bool {
        self.slots[self.slot_for(index)].bound_index == Some(index)
    }

    /// 将检查点绑定到其槽位，返回槽位号
    pub fn bind(&mut self, index: usize) -> usize {
        let slot = self.slot_for(index);
        self.slots[slot].bound_index = Some(index);
        slot
    }

    pub fn place(&mut self, slot: usize, tier: SlotTier, interactive: bool, render_order: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.tier = tier;
            s.interactive = interactive;
            s.render_order = render_order;
        }
    }

    /// 解除全部绑定并隐藏（序列被整体替换或清空时）
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot = ViewSlot::default();
        }
    }

    pub fn interactive_count(&self) -> usize {
        self.slots.iter().filter(|s| s.interactive).count()
    }
}

impl Default for ViewPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_for_is_modulo_of_pool() {
        let pool = ViewPool::new(3);
        assert_eq!(pool.slot_for(0), 0);
        assert_eq!(pool.slot_for(4), 1);
        assert_eq!(pool.slot_for(5), 2);
        assert_eq!(pool.slot_for(9), 0);
    }

    #[test]
    fn test_zero_size_becomes_one() {
        let pool = ViewPool::new(0);
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.slot_for(7), 0);
    }

    #[test]
    fn test_bind_replaces_previous_binding() {
        let mut pool = ViewPool::new(3);
        assert_eq!(pool.bind(1), 1);
        assert!(pool.is_bound(1));
        assert_eq!(pool.bind(4), 1);
        assert!(!pool.is_bound(1));
        assert!(pool.is_bound(4));
    }

    #[test]
    fn test_reset_unbinds_and_hides() {
        let mut pool = ViewPool::new(2);
        pool.bind(0);
        pool.place(0, SlotTier::Visible(0), true, 102);
        pool.reset();
        assert_eq!(pool.slot(0), Some(&ViewSlot::default()));
        assert_eq!(pool.interactive_count(), 0);
    }

    #[test]
    fn test_content_for_kinds() {
        let scenarios = vec![Scenario::new("B", "scenarios/b.json")];
        let msg = Checkpoint::message("intro", 1.0, "Welcome");
        assert_eq!(
            SlotContent::for_checkpoint(&msg, &scenarios),
            SlotContent::Message("Welcome".into())
        );
        let switch = Checkpoint::new(CheckpointKind::SwitchScenario, "end", 1.0);
        assert_eq!(
            SlotContent::for_checkpoint(&switch, &scenarios),
            SlotContent::ScenarioChoice(scenarios.clone())
        );
        let bare = Checkpoint::new(CheckpointKind::Message, "m", 1.0);
        assert_eq!(
            SlotContent::for_checkpoint(&bare, &[]),
            SlotContent::Message(String::new())
        );
    }
}
