//! 错误定义模块

use thiserror::Error;

/// 服务端未提供消息时展示给用户的通用提示
pub const GENERIC_REQUEST_MESSAGE: &str = "The request could not be completed. Please try again.";

/// 网络不可达时展示给用户的提示
pub const CONNECTION_MESSAGE: &str =
    "Could not reach the case service. Check your connection and try again.";

/// 分诊客户端统一错误类型
#[derive(Error, Debug)]
pub enum TriageError {
    /// 必填的问诊字段为空，在任何网络请求之前拦截
    #[error("必填字段为空: {field}")]
    ValidationMissing { field: &'static str },

    /// 服务端返回了错误状态码
    #[error("请求失败 (HTTP {status_code}): {}", .server_message.as_deref().unwrap_or("无服务端消息"))]
    RequestFailed {
        status_code: u16,
        server_message: Option<String>,
    },

    /// 没有收到任何响应
    #[error("无法连接病例服务: {0}")]
    ConnectionUnavailable(String),

    /// 报告已渲染，但导出文档失败
    #[error("报告导出失败: {reason}")]
    ExportFailed { reason: String },

    #[error("当前没有登录的医生")]
    NotAuthenticated,

    #[error("配置错误: {0}")]
    Config(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),
}

impl TriageError {
    /// 生成面向用户的提示文本
    ///
    /// 服务端提供的消息原样透传；否则使用通用消息。网络错误单独提示检查连接，
    /// 避免用户把它误解为业务错误。
    pub fn user_message(&self) -> String {
        match self {
            Self::ValidationMissing { field } => {
                format!("Please fill in the required field: {}", field_label(field))
            }
            Self::RequestFailed { server_message, .. } => server_message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(GENERIC_REQUEST_MESSAGE)
                .to_string(),
            Self::ConnectionUnavailable(_) => CONNECTION_MESSAGE.to_string(),
            Self::ExportFailed { .. } => {
                "The report could not be exported. It is still available on screen.".to_string()
            }
            Self::NotAuthenticated => "Please sign in to continue.".to_string(),
            other => other.to_string(),
        }
    }

    /// 是否为网络层失败（无响应）
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::ConnectionUnavailable(_))
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "fullName" => "patient name",
        "gender" => "gender",
        "symptoms" => "symptoms",
        "email" => "email",
        "password" => "password",
        "crm" => "registration number",
        other => other,
    }
}

/// 分诊客户端统一结果类型
pub type Result<T> = std::result::Result<T, TriageError>;
