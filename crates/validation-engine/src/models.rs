//! 校验引擎领域模型

use crate::message::{Message, Translator};
use crate::rule_kind::RuleKind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 参数值：配置时给定的字面量，或在校验时才求值的 supplier
#[derive(Clone)]
pub enum OptionValue<T> {
    Literal(T),
    Deferred(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> OptionValue<T> {
    pub fn deferred(supplier: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::Deferred(Arc::new(supplier))
    }

    pub fn resolve(&self) -> T {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Deferred(supplier) => supplier(),
        }
    }
}

impl<T> From<T> for OptionValue<T> {
    fn from(value: T) -> Self {
        Self::Literal(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for OptionValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OptionValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Literal)
    }
}

impl<T: Serialize> Serialize for OptionValue<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(value) => value.serialize(serializer),
            Self::Deferred(_) => serializer.serialize_none(),
        }
    }
}

/// 数值边界的文本形式
///
/// 保留原始数字串，超出 f64 精度的整数边界才能逐位比较。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NumericText(pub String);

impl NumericText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_f64(&self) -> Option<f64> {
        parse_number(&self.0)
    }
}

impl From<&str> for NumericText {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NumericText {
    fn from(value: String) -> Self {
        Self(value)
    }
}

macro_rules! numeric_text_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for NumericText {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

numeric_text_from!(i32, i64, u32, u64, usize, f64);

impl<'de> Deserialize<'de> for NumericText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(Self(n.to_string())),
            Value::String(s) => Ok(Self(s)),
            other => Err(serde::de::Error::custom(format!(
                "数值边界需要数字或数字字符串, 实际为 {}",
                other
            ))),
        }
    }
}

/// 解析数字文本，空串视为 0
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `number` 规则的数值类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberType {
    #[default]
    Integer,
    Float,
}

/// 规则参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    pub min: Option<OptionValue<NumericText>>,
    pub max: Option<OptionValue<NumericText>>,
    pub decimals: Option<OptionValue<u32>>,
    #[serde(rename = "type")]
    pub number_type: NumberType,
    pub allow_empty: bool,
    /// 在消息中按金额格式显示边界时使用的小数位数
    pub format_money: Option<OptionValue<u32>>,
    pub regex: Option<String>,
    /// 跨字段引用，如 `#password`
    pub to: Option<String>,
    pub value_one: Option<String>,
    pub value_two: Option<String>,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: impl Into<NumericText>) -> Self {
        self.min = Some(OptionValue::Literal(min.into()));
        self
    }

    pub fn min_deferred(mut self, min: impl Fn() -> NumericText + Send + Sync + 'static) -> Self {
        self.min = Some(OptionValue::deferred(min));
        self
    }

    pub fn max(mut self, max: impl Into<NumericText>) -> Self {
        self.max = Some(OptionValue::Literal(max.into()));
        self
    }

    pub fn max_deferred(mut self, max: impl Fn() -> NumericText + Send + Sync + 'static) -> Self {
        self.max = Some(OptionValue::deferred(max));
        self
    }

    pub fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(OptionValue::Literal(decimals));
        self
    }

    pub fn decimals_deferred(mut self, decimals: impl Fn() -> u32 + Send + Sync + 'static) -> Self {
        self.decimals = Some(OptionValue::deferred(decimals));
        self
    }

    pub fn float(mut self) -> Self {
        self.number_type = NumberType::Float;
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn format_money(mut self, decimals: u32) -> Self {
        self.format_money = Some(OptionValue::Literal(decimals));
        self
    }

    pub fn format_money_deferred(
        mut self,
        decimals: impl Fn() -> u32 + Send + Sync + 'static,
    ) -> Self {
        self.format_money = Some(OptionValue::deferred(decimals));
        self
    }

    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    pub fn to(mut self, reference: impl Into<String>) -> Self {
        self.to = Some(reference.into());
        self
    }

    /// 去掉 `#` 前缀后的引用字段名
    pub fn target_field(&self) -> Option<&str> {
        self.to
            .as_deref()
            .map(|reference| reference.strip_prefix('#').unwrap_or(reference))
    }
}

/// 字段上的一条规则绑定：`(rule, message_override?, options?)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleBinding {
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub options: ValidationOptions,
}

impl RuleBinding {
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: None,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }
}

/// 字段绑定：字段名 + 有序规则列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldBinding {
    pub field: String,
    /// `req` 默认消息中显示的字段名，缺省时使用 `field`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub rules: Vec<RuleBinding>,
}

impl FieldBinding {
    pub fn new(field: impl Into<String>, rules: Vec<RuleBinding>) -> Self {
        Self {
            field: field.into(),
            label: None,
            rules,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field)
    }
}

/// 跨字段规则读取其他字段当前值的能力
#[cfg_attr(test, mockall::automock)]
pub trait FieldResolver {
    fn resolve(&self, field: &str) -> Option<Value>;
}

/// 不提供任何字段的解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFields;

impl FieldResolver for NoFields {
    fn resolve(&self, _field: &str) -> Option<Value> {
        None
    }
}

/// 表单当前值
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    data: Value,
}

impl FormValues {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let data: Value = serde_json::from_str(json)?;
        Ok(Self { data })
    }

    /// 获取字段值（支持点号分隔的路径，如 "address.city"）
    pub fn get_field(&self, path: &str) -> Option<&Value> {
        let mut current = &self.data;

        for part in path.split('.') {
            match current {
                Value::Object(map) => {
                    current = map.get(part)?;
                }
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    current = arr.get(index)?;
                }
                _ => return None,
            }
        }

        Some(current)
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

impl FieldResolver for FormValues {
    fn resolve(&self, field: &str) -> Option<Value> {
        self.get_field(field).cloned()
    }
}

/// 单条规则的判定结果，消息随判定一同返回
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub ok: bool,
    pub message: Option<Message>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn fail(message: Option<Message>) -> Self {
        Self { ok: false, message }
    }
}

/// 单个字段的校验结果
#[derive(Debug, Clone, Serialize)]
pub struct FieldResult {
    pub field: String,
    pub valid: bool,
    pub failed_rule: Option<RuleKind>,
    pub message: Option<Message>,
    /// 实际执行的规则数（短路后不再增加）
    pub rules_evaluated: usize,
    pub evaluation_trace: Vec<String>,
}

impl FieldResult {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            valid: true,
            failed_rule: None,
            message: None,
            rules_evaluated: 0,
            evaluation_trace: Vec::new(),
        }
    }
}

/// 整个表单的校验结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormReport {
    pub fields: Vec<FieldResult>,
}

impl FormReport {
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|f| f.valid)
    }

    pub fn field(&self, name: &str) -> Option<&FieldResult> {
        self.fields.iter().find(|f| f.field == name)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FieldResult> {
        self.fields.iter().filter(|f| !f.valid)
    }

    /// 渲染为 `字段 -> 错误文本`，供界面层内联展示
    pub fn errors(&self, translator: &dyn Translator) -> BTreeMap<String, String> {
        self.failures()
            .map(|f| {
                let text = f
                    .message
                    .as_ref()
                    .map(|m| m.render(translator))
                    .unwrap_or_default();
                (f.field.clone(), text)
            })
            .collect()
    }
}
