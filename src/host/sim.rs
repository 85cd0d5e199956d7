//! 模拟宿主（用于测试与无界面模拟，无需 3D 引擎）
//!
//! 所有对象放在同一个世界空间中：对象有一个世界原点，位置偏移相对于其锚点对象；
//! 观察者位置同样相对于它当前所在的锚点。呈现层命令按槽位记录，便于断言。

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::{DMat4, DQuat, DVec3};

use super::{
    Location, LocationStore, Observer, Presenter, ScenarioLoader, SpatialObject, SpatialResolver,
};
use crate::core::view_pool::{SlotContent, SlotTier};

/// find_object 返回的快照：对象原点 + 调用时的观察者姿态
#[derive(Debug, Clone)]
pub struct SimObject {
    pub origin: DVec3,
    pub observer_position: DVec3,
    pub observer_rotation: DQuat,
}

impl SpatialObject for SimObject {
    fn observer_relative_position(&self, offset: DVec3) -> DVec3 {
        self.observer_rotation.inverse() * (self.origin + offset - self.observer_position)
    }

    fn observer_relative_transform(&self, offset: DVec3, rotation: DQuat, scale: f64) -> DMat4 {
        DMat4::from_scale_rotation_translation(
            DVec3::splat(scale),
            self.observer_rotation.inverse() * rotation,
            self.observer_relative_position(offset),
        )
    }
}

#[derive(Debug, Clone)]
struct ObjectEntry {
    anchor: String,
    frame: String,
    origin: DVec3,
}

/// 一次 fly_to 调用
#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    pub anchor: String,
    pub frame: String,
    pub position: Option<DVec3>,
    pub rotation: Option<DQuat>,
    pub duration_secs: f64,
}

/// 呈现层中单个槽位的最新状态
#[derive(Debug, Clone, PartialEq)]
pub struct SimSlot {
    pub content: Option<SlotContent>,
    pub tier: SlotTier,
    pub interactive: bool,
    pub render_order: usize,
    pub transform: Option<DMat4>,
}

impl Default for SimSlot {
    fn default() -> Self {
        Self {
            content: None,
            tier: SlotTier::Hidden,
            interactive: false,
            render_order: 0,
            transform: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimHost {
    locations: Vec<(String, Location)>,
    objects: Vec<ObjectEntry>,
    observer_anchor: String,
    observer_frame: String,
    observer_position: DVec3,
    observer_rotation: DQuat,
    observer_scale: f64,
    flights: Vec<Flight>,
    slots: BTreeMap<usize, SimSlot>,
    bind_calls: Vec<(usize, SlotContent)>,
    loaded_scenarios: Vec<String>,
    recording_indicator: bool,
    interval_display: Option<u32>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    /// 观察者位于 Earth / IAU_Earth 原点
    pub fn new() -> Self {
        Self {
            locations: Vec::new(),
            objects: Vec::new(),
            observer_anchor: "Earth".to_string(),
            observer_frame: "IAU_Earth".to_string(),
            observer_position: DVec3::ZERO,
            observer_rotation: DQuat::IDENTITY,
            observer_scale: 1.0,
            flights: Vec::new(),
            slots: BTreeMap::new(),
            bind_calls: Vec::new(),
            loaded_scenarios: Vec::new(),
            recording_indicator: false,
            interval_display: None,
        }
    }

    pub fn add_location(&mut self, name: &str, location: Location) {
        self.register(name, location);
    }

    pub fn add_object(&mut self, anchor: &str, frame: &str, origin: DVec3) {
        self.objects.retain(|o| !(o.anchor == anchor && o.frame == frame));
        self.objects.push(ObjectEntry {
            anchor: anchor.to_string(),
            frame: frame.to_string(),
            origin,
        });
    }

    fn origin_of(&self, anchor: &str, frame: &str) -> Option<DVec3> {
        self.objects
            .iter()
            .find(|o| o.anchor == anchor && o.frame == frame)
            .map(|o| o.origin)
    }

    /// 观察者世界坐标（锚点对象缺失时按原点计算）
    pub fn observer_world_position(&self) -> DVec3 {
        self.origin_of(&self.observer_anchor, &self.observer_frame)
            .unwrap_or(DVec3::ZERO)
            + self.observer_position
    }

    /// 位置的世界坐标；锚点对象缺失时为 None
    pub fn world_position(&self, location: &Location) -> Option<DVec3> {
        self.origin_of(&location.anchor, &location.frame)
            .map(|origin| origin + location.position_or_origin())
    }

    pub fn set_observer_position(&mut self, position: DVec3) {
        self.observer_position = position;
    }

    pub fn move_observer(&mut self, delta: DVec3) {
        self.observer_position += delta;
    }

    pub fn set_observer_scale(&mut self, scale: f64) {
        self.observer_scale = scale;
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn bind_calls(&self) -> &[(usize, SlotContent)] {
        &self.bind_calls
    }

    pub fn clear_bind_calls(&mut self) {
        self.bind_calls.clear();
    }

    pub fn slot_state(&self, slot: usize) -> Option<&SimSlot> {
        self.slots.get(&slot)
    }

    pub fn transform(&self, slot: usize) -> Option<DMat4> {
        self.slots.get(&slot).and_then(|s| s.transform)
    }

    pub fn loaded_scenarios(&self) -> &[String] {
        &self.loaded_scenarios
    }

    pub fn recording_indicator(&self) -> bool {
        self.recording_indicator
    }

    pub fn interval_display(&self) -> Option<u32> {
        self.interval_display
    }

    fn slot_mut(&mut self, slot: usize) -> &mut SimSlot {
        self.slots.entry(slot).or_default()
    }
}

impl LocationStore for SimHost {
    fn resolve(&self, name: &str) -> Option<Location> {
        self.locations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, l)| l.clone())
    }

    fn register(&mut self, name: &str, location: Location) {
        if let Some(entry) = self.locations.iter_mut().find(|(n, _)| n == name) {
            entry.1 = location;
        } else {
            self.locations.push((name.to_string(), location));
        }
    }

    fn remove(&mut self, name: &str) -> bool {
        let before = self.locations.len();
        self.locations.retain(|(n, _)| n != name);
        self.locations.len() != before
    }

    fn location_names(&self) -> Vec<String> {
        self.locations.iter().map(|(n, _)| n.clone()).collect()
    }
}

impl SpatialResolver for SimHost {
    fn find_object(&self, anchor: &str, frame: &str) -> Option<Arc<dyn SpatialObject>> {
        let origin = self.origin_of(anchor, frame)?;
        Some(Arc::new(SimObject {
            origin,
            observer_position: self.observer_world_position(),
            observer_rotation: self.observer_rotation,
        }))
    }
}

impl Observer for SimHost {
    fn fly_to(
        &mut self,
        anchor: &str,
        frame: &str,
        position: Option<DVec3>,
        rotation: Option<DQuat>,
        duration_secs: f64,
    ) {
        self.flights.push(Flight {
            anchor: anchor.to_string(),
            frame: frame.to_string(),
            position,
            rotation,
            duration_secs,
        });
        // 模拟中飞行立即完成
        self.observer_anchor = anchor.to_string();
        self.observer_frame = frame.to_string();
        self.observer_position = position.unwrap_or(DVec3::ZERO);
        if let Some(rotation) = rotation {
            self.observer_rotation = rotation;
        }
    }

    fn observer_anchor(&self) -> String {
        self.observer_anchor.clone()
    }

    fn observer_frame(&self) -> String {
        self.observer_frame.clone()
    }

    fn observer_position(&self) -> DVec3 {
        self.observer_position
    }

    fn observer_rotation(&self) -> DQuat {
        self.observer_rotation
    }

    fn observer_scale(&self) -> f64 {
        self.observer_scale
    }
}

impl Presenter for SimHost {
    fn bind_content(&mut self, slot: usize, content: &SlotContent) {
        self.bind_calls.push((slot, content.clone()));
        self.slot_mut(slot).content = Some(content.clone());
    }

    fn set_tier(&mut self, slot: usize, tier: SlotTier) {
        self.slot_mut(slot).tier = tier;
    }

    fn set_interactive(&mut self, slot: usize, interactive: bool) {
        self.slot_mut(slot).interactive = interactive;
    }

    fn set_render_order(&mut self, slot: usize, key: usize) {
        self.slot_mut(slot).render_order = key;
    }

    fn set_transform(&mut self, slot: usize, transform: DMat4) {
        self.slot_mut(slot).transform = Some(transform);
    }

    fn set_recording_indicator(&mut self, recording: bool) {
        self.recording_indicator = recording;
    }

    fn set_interval_display(&mut self, seconds: u32) {
        self.interval_display = Some(seconds);
    }
}

impl ScenarioLoader for SimHost {
    fn load_scenario(&mut self, path: &str) {
        self.loaded_scenarios.push(path.to_string());
    }
}
