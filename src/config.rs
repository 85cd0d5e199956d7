//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `USER_STUDY__*` 覆盖（双下划线表示嵌套，如 `USER_STUDY__STUDY__POOL_SIZE=4`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::view_pool::DEFAULT_POOL_SIZE;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub study: StudySection,
    #[serde(default)]
    pub scenario: ScenarioSection,
    #[serde(default)]
    pub simulation: SimulationSection,
}

/// [study] 段：视图池大小、接近阈值、录制命名与间隔范围、重新开始时的飞行目标
#[derive(Debug, Clone, Deserialize)]
pub struct StudySection {
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// 观察者到检查点的距离小于该值即视为通过
    #[serde(default = "default_proximity_threshold")]
    pub proximity_threshold: f64,
    /// 录制生成的位置名前缀；删除全部检查点时按此前缀清理
    #[serde(default = "default_marker_prefix")]
    pub marker_prefix: String,
    /// 重新开始时飞往的位置名，未设置时瞬移到第一个检查点
    pub restart_location: Option<String>,
    #[serde(default = "default_restart_flight_secs")]
    pub restart_flight_secs: f64,
    /// 透明物体的基础绘制顺序
    #[serde(default = "default_render_order_base")]
    pub render_order_base: usize,
    #[serde(default = "default_min_recording_interval")]
    pub min_recording_interval: u32,
    #[serde(default = "default_max_recording_interval")]
    pub max_recording_interval: u32,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_proximity_threshold() -> f64 {
    1.0
}

fn default_marker_prefix() -> String {
    "user-study-bookmark-".to_string()
}

fn default_restart_flight_secs() -> f64 {
    5.0
}

fn default_render_order_base() -> usize {
    100
}

fn default_min_recording_interval() -> u32 {
    1
}

fn default_max_recording_interval() -> u32 {
    20
}

impl Default for StudySection {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            proximity_threshold: default_proximity_threshold(),
            marker_prefix: default_marker_prefix(),
            restart_location: None,
            restart_flight_secs: default_restart_flight_secs(),
            render_order_base: default_render_order_base(),
            min_recording_interval: default_min_recording_interval(),
            max_recording_interval: default_max_recording_interval(),
        }
    }
}

/// [scenario] 段：场景文件与结果输出
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScenarioSection {
    pub path: Option<PathBuf>,
    /// 结果 JSON Lines 输出路径
    pub results_path: Option<PathBuf>,
}

/// [simulation] 段：无界面模拟程序的节拍与自动驾驶参数
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSection {
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    /// 每真实秒对应的模拟秒数
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
    /// 自动驾驶行走速度（单位长度 / 秒）
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f64,
    #[serde(default = "default_max_seconds")]
    pub max_seconds: u64,
    /// 没有场景文件时录制的模拟时长
    #[serde(default = "default_record_seconds")]
    pub record_seconds: u64,
    /// 自动提交的评分
    #[serde(default = "default_rating")]
    pub rating: u32,
}

fn default_tick_hz() -> u32 {
    60
}

fn default_time_scale() -> f64 {
    10.0
}

fn default_walk_speed() -> f64 {
    2.0
}

fn default_max_seconds() -> u64 {
    600
}

fn default_record_seconds() -> u64 {
    20
}

fn default_rating() -> u32 {
    3
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            time_scale: default_time_scale(),
            walk_speed: default_walk_speed(),
            max_seconds: default_max_seconds(),
            record_seconds: default_record_seconds(),
            rating: default_rating(),
        }
    }
}

/// 会话使用的核心参数（已做下限修正）
#[derive(Debug, Clone, PartialEq)]
pub struct StudyConfig {
    pub pool_size: usize,
    pub proximity_threshold: f64,
    pub marker_prefix: String,
    pub restart_location: Option<String>,
    pub restart_flight_secs: f64,
    pub render_order_base: usize,
    pub min_recording_interval: u32,
    pub max_recording_interval: u32,
}

impl From<&StudySection> for StudyConfig {
    fn from(s: &StudySection) -> Self {
        let min = s.min_recording_interval.max(1);
        let threshold = if s.proximity_threshold > 0.0 {
            s.proximity_threshold
        } else {
            default_proximity_threshold()
        };
        Self {
            pool_size: s.pool_size.max(1),
            proximity_threshold: threshold,
            marker_prefix: s.marker_prefix.clone(),
            restart_location: s.restart_location.clone(),
            restart_flight_secs: s.restart_flight_secs.max(0.0),
            render_order_base: s.render_order_base,
            min_recording_interval: min,
            max_recording_interval: s.max_recording_interval.max(min),
        }
    }
}

impl From<&AppConfig> for StudyConfig {
    fn from(cfg: &AppConfig) -> Self {
        StudyConfig::from(&cfg.study)
    }
}

impl Default for StudyConfig {
    fn default() -> Self {
        StudyConfig::from(&StudySection::default())
    }
}

/// 从 config 目录加载配置，环境变量 USER_STUDY__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 USER_STUDY__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("USER_STUDY")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
