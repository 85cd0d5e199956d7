//! 引擎错误类型
//!
//! 查找失败属于可恢复错误：调用方记录日志后跳过该检查点，不中断导航。
//! 越界只出现在绕过游标不变量的直接索引访问中，表示逻辑缺陷。

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StudyError {
    #[error("No location with the name \"{0}\" could be found")]
    LocationNotFound(String),

    #[error("No object found for anchor \"{anchor}\" in frame \"{frame}\"")]
    ObjectNotFound { anchor: String, frame: String },

    #[error("Checkpoint index {index} out of range (size {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StudyError::LocationNotFound("user-study-bookmark-4".into());
        assert!(err.to_string().contains("user-study-bookmark-4"));
        let err = StudyError::IndexOutOfRange { index: 7, len: 5 };
        assert_eq!(err.to_string(), "Checkpoint index 7 out of range (size 5)");
    }
}
