//! 宿主协作者抽象
//!
//! 引擎本身不持有坐标、不渲染、不做飞行动画；这些能力全部由宿主（3D 场景引擎）通过以下 trait 提供：
//! - **LocationStore**: 具名位置（书签）的查找与登记
//! - **SpatialResolver**: 按参考系查找天体/对象，计算观察者相对变换
//! - **Observer**: 观察者位置、参考系与飞行/瞬移
//! - **Presenter**: 视图槽位的内容绑定、层级、交互与绘制顺序
//! - **ScenarioLoader**: 切换到另一个场景配置
//!
//! `SimHost`（见 sim）是全部 trait 的内存实现，供测试与模拟程序使用。

pub mod sim;

use std::sync::Arc;

use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::core::view_pool::{SlotContent, SlotTier};

pub use sim::{SimHost, SimObject};

/// 外部存储的位置：锚点（天体中心）、参考系，以及可选的偏移位置与朝向
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub anchor: String,
    pub frame: String,
    #[serde(default)]
    pub position: Option<DVec3>,
    #[serde(default)]
    pub rotation: Option<DQuat>,
}

impl Location {
    pub fn new(anchor: impl Into<String>, frame: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
            frame: frame.into(),
            position: None,
            rotation: None,
        }
    }

    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// 未设置位置时按原点处理
    pub fn position_or_origin(&self) -> DVec3 {
        self.position.unwrap_or(DVec3::ZERO)
    }

    pub fn rotation_or_identity(&self) -> DQuat {
        self.rotation.unwrap_or(DQuat::IDENTITY)
    }
}

/// 具名位置存储（宿主的书签表）；按名称精确匹配
pub trait LocationStore {
    fn resolve(&self, name: &str) -> Option<Location>;

    fn register(&mut self, name: &str, location: Location);

    /// 删除指定名称的位置，返回是否存在
    fn remove(&mut self, name: &str) -> bool;

    fn location_names(&self) -> Vec<String>;
}

/// 宿主场景中的对象：给出观察者相对的位置与变换
pub trait SpatialObject {
    fn observer_relative_position(&self, offset: DVec3) -> DVec3;

    fn observer_relative_transform(&self, offset: DVec3, rotation: DQuat, scale: f64) -> DMat4;
}

/// 按锚点 + 参考系查找对象
pub trait SpatialResolver {
    fn find_object(&self, anchor: &str, frame: &str) -> Option<Arc<dyn SpatialObject>>;
}

/// 观察者 / 导航服务
pub trait Observer {
    /// `duration_secs == 0.0` 为瞬移；否则由宿主执行飞行动画
    fn fly_to(
        &mut self,
        anchor: &str,
        frame: &str,
        position: Option<DVec3>,
        rotation: Option<DQuat>,
        duration_secs: f64,
    );

    fn observer_anchor(&self) -> String;

    fn observer_frame(&self) -> String;

    fn observer_position(&self) -> DVec3;

    fn observer_rotation(&self) -> DQuat;

    fn observer_scale(&self) -> f64;
}

/// 呈现层命令：引擎只下发命令，不负责渲染
pub trait Presenter {
    fn bind_content(&mut self, slot: usize, content: &SlotContent);

    fn set_tier(&mut self, slot: usize, tier: SlotTier);

    fn set_interactive(&mut self, slot: usize, interactive: bool);

    /// 数值越大越靠前绘制
    fn set_render_order(&mut self, slot: usize, key: usize);

    fn set_transform(&mut self, slot: usize, transform: DMat4);

    /// 录制按钮状态（开始 / 停止）
    fn set_recording_indicator(&mut self, _recording: bool) {}

    /// 录制间隔滑块显示值
    fn set_interval_display(&mut self, _seconds: u32) {}
}

/// 切换场景（由宿主重新加载配置，当前会话随之结束）
pub trait ScenarioLoader {
    fn load_scenario(&mut self, path: &str);
}

/// 会话所需的全部宿主能力
pub trait Host: LocationStore + SpatialResolver + Observer + Presenter + ScenarioLoader {}

impl<T> Host for T where
    T: LocationStore + SpatialResolver + Observer + Presenter + ScenarioLoader
{
}
