//! User Study - 空间导航用户研究引擎
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 检查点序列、视图池 / 窗口调度、回放状态机、定时录制、会话上下文
//! - **host**: 宿主协作者抽象（位置存储、对象解析、观察者、呈现层）与模拟宿主
//! - **observability**: 日志初始化
//! - **results**: 研究结果日志
//! - **settings**: 场景文件（检查点列表、其他场景、录制间隔）
//! - **simulation**: 无界面模拟（模拟时钟、录制路线、自动驾驶）

pub mod config;
pub mod core;
pub mod host;
pub mod observability;
pub mod results;
pub mod settings;
pub mod simulation;

pub use crate::core::{StudyCommand, StudySession};
pub use settings::StudySettings;
