//! 研究结果日志
//!
//! 与诊断日志分开：评分、消息确认、通过检查点、重置等研究数据写入 target `user_study::results`，
//! 同时保存在内存中，会话结束时可导出为 JSON Lines。

use std::fmt;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 结果日志使用的 tracing target
pub const RESULTS_TARGET: &str = "user_study::results";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ResultEvent {
    /// 靠近普通检查点而通过
    Passed,
    /// 提交的 FMS 评分
    Rating { value: u32 },
    MessageConfirmed,
    MeasurementStarted,
    MeasurementStopped,
    ScenarioLoaded { path: String },
    /// 用户请求回到当前检查点
    Reset,
    /// 从头开始
    Restart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub at: DateTime<Utc>,
    pub session: Uuid,
    pub checkpoint: Option<String>,
    #[serde(flatten)]
    pub event: ResultEvent,
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cp = self.checkpoint.as_deref().unwrap_or("-");
        match &self.event {
            ResultEvent::Passed => write!(f, "{}: Passed Checkpoint", cp),
            ResultEvent::Rating { value } => write!(f, "{}: FMS: {}", cp, value),
            ResultEvent::MessageConfirmed => write!(f, "{}: MSG", cp),
            ResultEvent::MeasurementStarted => write!(f, "{}: COG start", cp),
            ResultEvent::MeasurementStopped => write!(f, "{}: COG stop", cp),
            ResultEvent::ScenarioLoaded { path } => write!(f, "Loading Scenario at {}", path),
            ResultEvent::Reset => write!(f, "{}: RESET", cp),
            ResultEvent::Restart => write!(f, "RESTART"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResultsLog {
    session: Uuid,
    records: Vec<ResultRecord>,
}

impl ResultsLog {
    pub fn new(session: Uuid) -> Self {
        Self {
            session,
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, checkpoint: Option<&str>, event: ResultEvent) {
        let record = ResultRecord {
            at: Utc::now(),
            session: self.session,
            checkpoint: checkpoint.map(str::to_string),
            event,
        };
        tracing::info!(target: RESULTS_TARGET, session = %self.session, "{}", record);
        self.records.push(record);
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// 按文本行输出（与日志中的一致）
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(|r| r.to_string()).collect()
    }

    pub fn last(&self) -> Option<&ResultRecord> {
        self.records.last()
    }

    /// 以 JSON Lines 追加写入文件
    pub fn write_jsonl(&self, path: &Path) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        for record in &self.records {
            let line = serde_json::to_string(record)?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}
