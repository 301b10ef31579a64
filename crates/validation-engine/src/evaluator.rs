//! 规则谓词
//!
//! 每个谓词只读取输入，不修改任何共享状态；需要动态消息的谓词通过
//! [`Outcome::FailWith`] 把消息和判定一起返回。

use crate::error::{Result, ValidationError};
use crate::message::Message;
use crate::models::{FieldResolver, NumericText, OptionValue, ValidationOptions};
use crate::number;
use crate::registry::PatternCache;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,63}$").unwrap()
});
static POSTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\s-]*$").unwrap());
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+((-|\s)*[0-9]){8,35}$").unwrap());
static TAX_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]*[a-zA-Z0-9_-]*$").unwrap());
static BARRIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+\.?[0-9]*$").unwrap());
static PO_BOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)p[.\s]+o[.\s]+box").unwrap());

// 字符黑名单
static ADDRESS_DENY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[`~!$%^&*_=+\[}{\]\\"?><|]"#).unwrap());
static GENERAL_DENY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[`~!@#$%^&*)(_=+\[}{\]\\/";:?><|]"#).unwrap());
static LETTER_SYMBOL_DENY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[`~!@#$%^&*)(_=+\[}{\]\\/";:?><,|0-9]"#).unwrap());

/// 谓词结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    /// 失败，消息取规则注册时的模板
    Fail,
    /// 失败，消息由谓词计算
    FailWith(Message),
}

impl Outcome {
    fn from_bool(ok: bool) -> Self {
        if ok { Self::Pass } else { Self::Fail }
    }
}

/// 谓词输入
pub struct RuleInput<'a> {
    pub value: Option<&'a Value>,
    pub options: &'a ValidationOptions,
    /// 字段显示名
    pub field: &'a str,
    pub resolver: &'a dyn FieldResolver,
    pub patterns: &'a PatternCache,
}

impl RuleInput<'_> {
    /// 把输入值转为字符串，缺失或 null 视为空串
    pub fn text(&self) -> Cow<'_, str> {
        value_text(self.value)
    }
}

pub(crate) fn value_text(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(Value::Bool(b)) => Cow::Owned(b.to_string()),
        Some(Value::Number(n)) => Cow::Owned(n.to_string()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

/// 内置谓词集合
pub struct Predicates;

impl Predicates {
    pub fn required(input: &RuleInput<'_>) -> Result<Outcome> {
        let ok = match input.value {
            None | Some(Value::Null) => false,
            Some(_) => input.text().chars().any(|c| !c.is_whitespace()),
        };
        Ok(Outcome::from_bool(ok))
    }

    pub fn confirm(input: &RuleInput<'_>) -> Result<Outcome> {
        Ok(Outcome::from_bool(matches!(input.value, Some(Value::Bool(true)))))
    }

    pub fn email(input: &RuleInput<'_>) -> Result<Outcome> {
        Ok(Outcome::from_bool(EMAIL_RE.is_match(&input.text())))
    }

    /// 至少一个小写、一个大写、一个数字，且只含可打印 ASCII
    pub fn password(input: &RuleInput<'_>) -> Result<Outcome> {
        let text = input.text();
        let ok = text.chars().any(|c| c.is_ascii_lowercase())
            && text.chars().any(|c| c.is_ascii_uppercase())
            && text.chars().any(|c| c.is_ascii_digit())
            && text.chars().all(|c| (' '..='~').contains(&c));
        Ok(Outcome::from_bool(ok))
    }

    pub fn postcode(input: &RuleInput<'_>) -> Result<Outcome> {
        let text = input.text();
        Ok(Outcome::from_bool(text.is_empty() || POSTCODE_RE.is_match(&text)))
    }

    pub fn phone(input: &RuleInput<'_>) -> Result<Outcome> {
        Ok(Outcome::from_bool(PHONE_RE.is_match(&input.text())))
    }

    pub fn tax_id(input: &RuleInput<'_>) -> Result<Outcome> {
        Ok(Outcome::from_bool(TAX_ID_RE.is_match(&input.text())))
    }

    pub fn barrier(input: &RuleInput<'_>) -> Result<Outcome> {
        Ok(Outcome::from_bool(BARRIER_RE.is_match(&input.text())))
    }

    pub fn regular(input: &RuleInput<'_>) -> Result<Outcome> {
        let pattern = input
            .options
            .regex
            .as_deref()
            .ok_or_else(|| ValidationError::invalid_options("regular", "缺少 regex 参数"))?;
        let regex = input.patterns.get_or_compile(pattern)?;
        Ok(Outcome::from_bool(regex.is_match(&input.text())))
    }

    pub fn signup_token(input: &RuleInput<'_>) -> Result<Outcome> {
        Ok(Outcome::from_bool(input.text().trim().chars().count() == 8))
    }

    pub fn length(input: &RuleInput<'_>) -> Result<Outcome> {
        let min = length_bound(input.options.min.as_ref(), "length", "min")?;
        let max = length_bound(input.options.max.as_ref(), "length", "max")?;
        let len = input.text().chars().count();

        let ok = min.is_none_or(|min| len >= min) && max.is_none_or(|max| len <= max);
        if ok {
            return Ok(Outcome::Pass);
        }

        let message = match (min, max) {
            (Some(min), Some(max)) => {
                Message::new("You should enter a value between {{min}} and {{max}} characters.")
                    .with_arg("min", min.to_string())
                    .with_arg("max", max.to_string())
            }
            (Some(min), None) => {
                Message::new("You should enter a value at least {{min}} characters.")
                    .with_arg("min", min.to_string())
            }
            (None, max) => Message::new("Maximum allowed characters are {{max}}.")
                .with_arg("max", max.unwrap_or_default().to_string()),
        };
        Ok(Outcome::FailWith(message))
    }

    pub fn min(input: &RuleInput<'_>) -> Result<Outcome> {
        let Some(min) = length_bound(input.options.min.as_ref(), "min", "min")? else {
            return Ok(Outcome::Pass);
        };

        if input.text().chars().count() >= min {
            Ok(Outcome::Pass)
        } else {
            Ok(Outcome::FailWith(
                Message::new("Minimum of {{value}} characters required.")
                    .with_arg("value", min.to_string()),
            ))
        }
    }

    pub fn number(input: &RuleInput<'_>) -> Result<Outcome> {
        number::validate_number(&input.text(), input.options)
    }

    pub fn compare(input: &RuleInput<'_>) -> Result<Outcome> {
        let other = Self::referenced_value(input, "compare")?;
        Ok(Outcome::from_bool(input.text() == value_text(Some(&other))))
    }

    pub fn not_equal(input: &RuleInput<'_>) -> Result<Outcome> {
        let other = Self::referenced_value(input, "not_equal")?;
        if input.text() != value_text(Some(&other)) {
            return Ok(Outcome::Pass);
        }

        let value_one = input.options.value_one.as_deref().unwrap_or(input.field);
        let value_two = input
            .options
            .value_two
            .as_deref()
            .or(input.options.target_field())
            .unwrap_or_default();
        Ok(Outcome::FailWith(
            Message::new("{{value_one}} and {{value_two}} cannot be the same.")
                .with_arg("value_one", value_one)
                .with_arg("value_two", value_two),
        ))
    }

    pub fn address(input: &RuleInput<'_>) -> Result<Outcome> {
        Ok(Outcome::from_bool(!ADDRESS_DENY_RE.is_match(&input.text())))
    }

    pub fn general(input: &RuleInput<'_>) -> Result<Outcome> {
        Ok(Outcome::from_bool(!GENERAL_DENY_RE.is_match(&input.text())))
    }

    pub fn letter_symbol(input: &RuleInput<'_>) -> Result<Outcome> {
        Ok(Outcome::from_bool(!LETTER_SYMBOL_DENY_RE.is_match(&input.text())))
    }

    pub fn po_box(input: &RuleInput<'_>) -> Result<Outcome> {
        Ok(Outcome::from_bool(!PO_BOX_RE.is_match(&input.text())))
    }

    /// 读取 `options.to` 指向的字段当前值
    fn referenced_value(input: &RuleInput<'_>, rule: &str) -> Result<Value> {
        let target = input
            .options
            .target_field()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ValidationError::invalid_options(rule, "缺少 to 参数"))?;

        input
            .resolver
            .resolve(target)
            .ok_or_else(|| ValidationError::FieldNotFound(target.to_string()))
    }
}

/// 长度边界，0 视为未设置
fn length_bound(
    bound: Option<&OptionValue<NumericText>>,
    rule: &str,
    name: &str,
) -> Result<Option<usize>> {
    let Some(bound) = bound.map(|b| b.resolve()) else {
        return Ok(None);
    };

    let parsed = bound
        .as_f64()
        .filter(|n| *n >= 0.0 && n.fract() == 0.0)
        .ok_or_else(|| {
            ValidationError::invalid_options(
                rule,
                format!("{} 需要非负整数, 实际为 '{}'", name, bound.as_str()),
            )
        })?;

    Ok(Some(parsed as usize).filter(|n| *n > 0))
}
