//! 校验引擎错误类型
//!
//! 这里的错误都属于配置错误（程序员错误），用户输入不合法不会走到这里，
//! 而是以 `Verdict { ok: false, .. }` 的形式正常返回。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("未知的校验规则: {0}")]
    UnknownRule(String),

    #[error("规则 {rule} 的参数无效: {reason}")]
    InvalidOptions { rule: String, reason: String },

    #[error("无效的正则表达式 '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("引用的字段不存在: {0}")]
    FieldNotFound(String),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl ValidationError {
    pub(crate) fn invalid_options(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownRule(_) => "UNKNOWN_RULE",
            Self::InvalidOptions { .. } => "INVALID_OPTIONS",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::FieldNotFound(_) => "FIELD_NOT_FOUND",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
