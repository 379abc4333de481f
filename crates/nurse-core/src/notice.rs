//! 界面通知
//!
//! 所有错误都在界面层捕获并转换成短暂通知，不会让当前视图崩溃或清空。

use serde::{Deserialize, Serialize};

use crate::error::TriageError;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// 短暂通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn from_error(error: &TriageError) -> Self {
        let level = match error {
            TriageError::ValidationMissing { .. } | TriageError::ExportFailed { .. } => {
                NoticeLevel::Warning
            }
            _ => NoticeLevel::Error,
        };
        tracing::debug!("Surfacing notice for error: {}", error);
        Self {
            level,
            message: error.user_message(),
        }
    }
}

impl From<&TriageError> for Notice {
    fn from(error: &TriageError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_failure_is_non_fatal_warning() {
        let notice = Notice::from_error(&TriageError::ExportFailed {
            reason: "font".to_string(),
        });
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("still available on screen"));
    }

    #[test]
    fn test_request_failure_is_error() {
        let notice = Notice::from_error(&TriageError::RequestFailed {
            status_code: 404,
            server_message: Some("Caso não encontrado".to_string()),
        });
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Caso não encontrado");
    }
}
