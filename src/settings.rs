//! 研究设置（场景文件）：检查点列表、可切换场景、录制间隔
//!
//! 以 JSON 为主格式（字段 otherScenarios / recordingInterval / checkpoints），扩展名为 .toml 时按 TOML 读写。
//! 引擎把它当作整体加载、整体保存的值。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::sequence::Checkpoint;

/// 默认录制间隔（秒）
pub const DEFAULT_RECORDING_INTERVAL: u32 = 5;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Unsupported settings file: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// 可切换的其他场景
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub path: String,
}

impl Scenario {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

fn default_recording_interval() -> u32 {
    DEFAULT_RECORDING_INTERVAL
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySettings {
    #[serde(default = "default_recording_interval")]
    pub recording_interval: u32,
    #[serde(default)]
    pub other_scenarios: Vec<Scenario>,
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            recording_interval: DEFAULT_RECORDING_INTERVAL,
            other_scenarios: Vec::new(),
            checkpoints: Vec::new(),
        }
    }
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> Result<Format, SettingsError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        _ => Err(SettingsError::UnsupportedFormat(path.to_path_buf())),
    }
}

impl StudySettings {
    pub fn from_json_str(s: &str) -> Result<Self, SettingsError> {
        let settings: StudySettings = serde_json::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 按扩展名（.json / .toml）读取并校验
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings: StudySettings = match format_of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        settings.validate()?;
        tracing::info!(
            "Loaded {} checkpoints from {:?}",
            settings.checkpoints.len(),
            path
        );
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.recording_interval == 0 {
            return Err(SettingsError::Invalid(
                "recordingInterval must be at least 1 second".into(),
            ));
        }
        for (i, cp) in self.checkpoints.iter().enumerate() {
            if !(cp.scale > 0.0) {
                return Err(SettingsError::Invalid(format!(
                    "checkpoint {} ({}) has non-positive scale {}",
                    i, cp.location_ref, cp.scale
                )));
            }
        }
        Ok(())
    }

    /// 所有被引用的位置名（去重，保持首次出现顺序）
    pub fn referenced_locations(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for cp in &self.checkpoints {
            if !names.contains(&cp.location_ref) {
                names.push(cp.location_ref.clone());
            }
        }
        names
    }
}
