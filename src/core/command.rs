//! 从界面 / 键盘发往会话的用户命令

/// 用户输入事件
#[derive(Debug, Clone, PartialEq)]
pub enum StudyCommand {
    /// 评分滑块变化（只暂存，不记录）
    SetRating(u32),
    /// 提交评分并前进
    ConfirmRating,
    /// 确认消息并前进
    ConfirmMessage,
    /// 开启 / 关闭重心测量；关闭即前进
    SetMeasurement(bool),
    /// 选择要加载的场景
    SelectScenario(String),
    GotoFirst,
    GotoPrevious,
    GotoNext,
    GotoLast,
    SetRecording(bool),
    /// 录制间隔滑块（秒）
    SetRecordingInterval(f64),
    /// 删除全部检查点及录制生成的位置
    DeleteAllCheckpoints,
    /// 回到当前检查点（Backspace）
    ResetToCurrent,
    /// 从头开始（Home）
    Restart,
}
