//! 检查点序列：有序检查点列表 + 当前游标
//!
//! 插入顺序即遍历顺序。游标始终满足 `0 <= current <= max(0, len - 1)`；空序列上所有基于索引的移动都是空操作。

use serde::{Deserialize, Serialize};

use super::error::StudyError;

/// 检查点类型，决定回放时的交互方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CheckpointKind {
    /// 靠近即通过
    #[default]
    #[serde(rename = "simple")]
    Simple,
    /// 请求晕动症评分（FMS），确认后前进
    #[serde(rename = "requestFMS")]
    RequestRating,
    /// 重心测量，关闭测量后前进
    #[serde(rename = "requestCOG")]
    RequestCenterOfGravity,
    /// 显示消息，确认后前进
    #[serde(rename = "message")]
    Message,
    /// 列出其他场景，选择后由宿主加载
    #[serde(rename = "switchScenario")]
    SwitchScenario,
}

fn default_scale() -> f64 {
    1.0
}

/// 序列中的一个停靠点；位置只以名称引用外部存储
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(rename = "type", default)]
    pub kind: CheckpointKind,
    #[serde(rename = "bookmark")]
    pub location_ref: String,
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// 目前仅 Message 使用（消息正文）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Checkpoint {
    pub fn new(kind: CheckpointKind, location_ref: impl Into<String>, scale: f64) -> Self {
        Self {
            kind,
            location_ref: location_ref.into(),
            scale,
            data: None,
        }
    }

    pub fn simple(location_ref: impl Into<String>, scale: f64) -> Self {
        Self::new(CheckpointKind::Simple, location_ref, scale)
    }

    pub fn message(location_ref: impl Into<String>, scale: f64, text: impl Into<String>) -> Self {
        Self::new(CheckpointKind::Message, location_ref, scale).with_data(text)
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointSequence {
    items: Vec<Checkpoint>,
    current: usize,
}

impl CheckpointSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换内容，游标归零
    pub fn from_checkpoints(items: Vec<Checkpoint>) -> Self {
        Self { items, current: 0 }
    }

    /// 追加到末尾，不移动游标
    pub fn append(&mut self, checkpoint: Checkpoint) {
        self.items.push(checkpoint);
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.current = 0;
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 带边界检查的访问；热路径上调用方应先检查 `size()`
    pub fn at(&self, index: usize) -> Result<&Checkpoint, StudyError> {
        self.items.get(index).ok_or(StudyError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    pub fn get(&self, index: usize) -> Option<&Checkpoint> {
        self.items.get(index)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Checkpoint> {
        self.items.get(self.current)
    }

    pub fn last_index(&self) -> usize {
        self.items.len().saturating_sub(1)
    }

    pub fn is_at_last(&self) -> bool {
        self.current == self.last_index()
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.items.iter()
    }

    /// 游标前进一格（截断到末尾），返回游标是否变化
    pub fn advance(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let next = (self.current + 1).min(self.last_index());
        let changed = next != self.current;
        self.current = next;
        changed
    }

    /// 游标后退一格（截断到 0），返回游标是否变化
    pub fn retreat(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let previous = self.current.saturating_sub(1);
        let changed = previous != self.current;
        self.current = previous;
        changed
    }
}
