//! 校验规则名称定义

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 内置校验规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    // 必填
    Req,
    Confirm,

    // 格式
    Email,
    Password,
    Postcode,
    Phone,
    TaxId,
    Barrier,
    Regular,
    SignupToken,

    // 长度与数值
    Length,
    Min,
    Number,

    // 跨字段
    Compare,
    NotEqual,

    // 字符黑名单
    Address,
    General,
    LetterSymbol,
    PoBox,
}

impl RuleKind {
    pub const ALL: [RuleKind; 19] = [
        Self::Req,
        Self::Confirm,
        Self::Email,
        Self::Password,
        Self::Postcode,
        Self::Phone,
        Self::TaxId,
        Self::Barrier,
        Self::Regular,
        Self::SignupToken,
        Self::Length,
        Self::Min,
        Self::Number,
        Self::Compare,
        Self::NotEqual,
        Self::Address,
        Self::General,
        Self::LetterSymbol,
        Self::PoBox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Req => "req",
            Self::Confirm => "confirm",
            Self::Email => "email",
            Self::Password => "password",
            Self::Postcode => "postcode",
            Self::Phone => "phone",
            Self::TaxId => "tax_id",
            Self::Barrier => "barrier",
            Self::Regular => "regular",
            Self::SignupToken => "signup_token",
            Self::Length => "length",
            Self::Min => "min",
            Self::Number => "number",
            Self::Compare => "compare",
            Self::NotEqual => "not_equal",
            Self::Address => "address",
            Self::General => "general",
            Self::LetterSymbol => "letter_symbol",
            Self::PoBox => "po_box",
        }
    }

    /// 是否需要读取其他字段的值
    pub fn is_cross_field(&self) -> bool {
        matches!(self, Self::Compare | Self::NotEqual)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownRule(s.to_string()))
    }
}
