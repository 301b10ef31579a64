//! 规则注册表
//!
//! 规则名 -> (谓词, 消息模板) 的只读映射。进程内首次访问时构建，此后不再修改；
//! 唯一的内部状态是 `regular` 规则的正则编译缓存，使用 DashMap 并且只增不删。

use crate::error::{Result, ValidationError};
use crate::evaluator::{Outcome, Predicates, RuleInput};
use crate::message::Message;
use crate::models::{FieldResolver, ValidationOptions, Verdict};
use crate::rule_kind::RuleKind;
use dashmap::DashMap;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, info};

/// 谓词函数签名
pub type Predicate = fn(&RuleInput<'_>) -> Result<Outcome>;

/// 规则的默认失败消息
#[derive(Debug, Clone, Copy)]
pub enum MessageTemplate {
    /// 固定文本，可带固定的占位符取值
    Static {
        text: &'static str,
        args: &'static [(&'static str, &'static str)],
    },
    /// 以字段显示名填充 `{{field}}`
    FieldName(&'static str),
    /// 由谓词在失败时计算；谓词未给出时没有消息
    Computed,
}

impl MessageTemplate {
    const fn text(text: &'static str) -> Self {
        Self::Static { text, args: &[] }
    }

    fn to_message(self, field: &str) -> Option<Message> {
        match self {
            Self::Static { text, args } => Some(
                args.iter()
                    .fold(Message::new(text), |m, (k, v)| m.with_arg(*k, *v)),
            ),
            Self::FieldName(text) => Some(Message::new(text).with_arg("field", field)),
            Self::Computed => None,
        }
    }
}

/// 注册表中的规则定义
#[derive(Debug, Clone, Copy)]
pub struct RuleDef {
    pub kind: RuleKind,
    pub predicate: Predicate,
    pub message: MessageTemplate,
}

impl RuleDef {
    /// 执行谓词，并把消息和判定合成一个新的 [`Verdict`]
    pub fn check(&self, input: &RuleInput<'_>) -> Result<Verdict> {
        let verdict = match (self.predicate)(input)? {
            Outcome::Pass => Verdict::pass(),
            Outcome::Fail => Verdict::fail(self.message.to_message(input.field)),
            Outcome::FailWith(message) => Verdict::fail(Some(message)),
        };
        Ok(verdict)
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }
}

/// 调用方提供的正则编译缓存
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: DashMap<String, Regex>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&self, pattern: &str) -> Result<Regex> {
        if let Some(regex) = self.compiled.get(pattern) {
            return Ok(regex.clone());
        }

        let regex = Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        debug!(pattern, "正则已编译并缓存");
        self.compiled.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

static REGISTRY: OnceLock<RuleRegistry> = OnceLock::new();

/// 规则注册表
#[derive(Debug)]
pub struct RuleRegistry {
    rules: HashMap<RuleKind, RuleDef>,
    patterns: PatternCache,
}

impl RuleRegistry {
    /// 进程级注册表，首次调用时构建
    pub fn global() -> &'static RuleRegistry {
        REGISTRY.get_or_init(|| {
            let registry = Self::build();
            info!("规则注册表已初始化: {} 条规则", registry.len());
            registry
        })
    }

    fn build() -> Self {
        let rules = RuleKind::ALL
            .into_iter()
            .map(|kind| (kind, Self::definition(kind)))
            .collect();

        Self {
            rules,
            patterns: PatternCache::new(),
        }
    }

    fn definition(kind: RuleKind) -> RuleDef {
        let (predicate, message): (Predicate, MessageTemplate) = match kind {
            RuleKind::Req => (
                Predicates::required,
                MessageTemplate::FieldName("{{field}} is required"),
            ),
            RuleKind::Confirm => (Predicates::confirm, MessageTemplate::Computed),
            RuleKind::Email => (
                Predicates::email,
                MessageTemplate::text("Invalid email address."),
            ),
            RuleKind::Password => (
                Predicates::password,
                MessageTemplate::text(
                    "Password should have lower and uppercase English letters with numbers.",
                ),
            ),
            RuleKind::Postcode => (
                Predicates::postcode,
                MessageTemplate::text("Only letters, numbers, space, and hyphen are allowed."),
            ),
            RuleKind::Phone => (
                Predicates::phone,
                MessageTemplate::text("Only numbers and spaces are allowed."),
            ),
            RuleKind::TaxId => (
                Predicates::tax_id,
                MessageTemplate::text(
                    "Should start with letter or number, and may contain hyphen and underscore.",
                ),
            ),
            RuleKind::Barrier => (
                Predicates::barrier,
                MessageTemplate::Static {
                    text: "Only numbers and these special characters are allowed: {{permitted_characters}}",
                    args: &[("permitted_characters", "+ - .")],
                },
            ),
            RuleKind::Regular => (Predicates::regular, MessageTemplate::Computed),
            RuleKind::SignupToken => (
                Predicates::signup_token,
                MessageTemplate::text("The length of token should be 8."),
            ),
            RuleKind::Length => (Predicates::length, MessageTemplate::Computed),
            RuleKind::Min => (Predicates::min, MessageTemplate::Computed),
            RuleKind::Number => (Predicates::number, MessageTemplate::Computed),
            RuleKind::Compare => (
                Predicates::compare,
                MessageTemplate::text("The two passwords that you entered do not match."),
            ),
            RuleKind::NotEqual => (Predicates::not_equal, MessageTemplate::Computed),
            RuleKind::Address => (
                Predicates::address,
                MessageTemplate::Static {
                    text: "Only letters, numbers, space, and these special characters are allowed: {{permitted_characters}}",
                    args: &[("permitted_characters", "- . ' # ; : ( ) , @ /")],
                },
            ),
            RuleKind::General => (
                Predicates::general,
                MessageTemplate::text(
                    "Only letters, numbers, space, hyphen, period, and apostrophe are allowed.",
                ),
            ),
            RuleKind::LetterSymbol => (
                Predicates::letter_symbol,
                MessageTemplate::text(
                    "Only letters, space, hyphen, period, and apostrophe are allowed.",
                ),
            ),
            RuleKind::PoBox => (
                Predicates::po_box,
                MessageTemplate::text("P.O. Box is not accepted in address"),
            ),
        };

        RuleDef {
            kind,
            predicate,
            message,
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 按名称获取规则
    pub fn get(&self, name: &str) -> Result<&RuleDef> {
        let kind: RuleKind = name.parse()?;
        self.get_kind(kind)
    }

    pub fn get_kind(&self, kind: RuleKind) -> Result<&RuleDef> {
        self.rules
            .get(&kind)
            .ok_or_else(|| ValidationError::UnknownRule(kind.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// 所有规则名（按名称排序）
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.rules.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// 对单个值执行一条规则
    pub fn evaluate(
        &self,
        kind: RuleKind,
        value: Option<&Value>,
        options: &ValidationOptions,
        field: &str,
        resolver: &dyn FieldResolver,
    ) -> Result<Verdict> {
        let rule = self.get_kind(kind)?;
        let input = RuleInput {
            value,
            options,
            field,
            resolver,
            patterns: &self.patterns,
        };
        rule.check(&input)
    }
}

/// 从进程级注册表获取规则
pub fn get_rule(name: &str) -> Result<&'static RuleDef> {
    RuleRegistry::global().get(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Interpolator;
    use crate::models::NoFields;
    use serde_json::json;
    use std::thread;

    fn evaluate(kind: RuleKind, value: Value, options: &ValidationOptions) -> Verdict {
        RuleRegistry::global()
            .evaluate(kind, Some(&value), options, "Field", &NoFields)
            .unwrap()
    }

    #[test]
    fn test_get_rule_is_cached() {
        let first = RuleRegistry::global();
        let second = RuleRegistry::global();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.len(), RuleKind::ALL.len());

        let rule = get_rule("length").unwrap();
        assert_eq!(rule.kind, RuleKind::Length);
        assert_eq!(rule.name(), "length");
    }

    #[test]
    fn test_unknown_rule() {
        let err = get_rule("iban").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownRule(name) if name == "iban"));
    }

    #[test]
    fn test_names_sorted() {
        let names = RuleRegistry::global().names();
        assert_eq!(names.first(), Some(&"address"));
        assert!(names.contains(&"not_equal"));
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_required_message_uses_field_name() {
        let verdict = RuleRegistry::global()
            .evaluate(
                RuleKind::Req,
                None,
                &ValidationOptions::default(),
                "First name",
                &NoFields,
            )
            .unwrap();

        assert!(!verdict.ok);
        assert_eq!(
            verdict.message.unwrap().render(&Interpolator),
            "First name is required"
        );
    }

    #[test]
    fn test_static_message_args() {
        let verdict = evaluate(RuleKind::Address, json!("a|b"), &ValidationOptions::default());
        assert_eq!(
            verdict.message.unwrap().render(&Interpolator),
            "Only letters, numbers, space, and these special characters are allowed: - . ' # ; : ( ) , @ /"
        );
    }

    #[test]
    fn test_pass_has_no_message() {
        let verdict = evaluate(RuleKind::Email, json!("a@b.co"), &ValidationOptions::default());
        assert_eq!(verdict, Verdict::pass());
    }

    #[test]
    fn test_regular_without_message() {
        let opts = ValidationOptions::new().regex("^[0-9]+$");
        let verdict = evaluate(RuleKind::Regular, json!("abc"), &opts);
        assert!(!verdict.ok);
        assert!(verdict.message.is_none());
    }

    #[test]
    fn test_pattern_cache_compiles_once() {
        let cache = PatternCache::new();
        cache.get_or_compile("^a+$").unwrap();
        cache.get_or_compile("^a+$").unwrap();
        assert_eq!(cache.len(), 1);

        let err = cache.get_or_compile("(unclosed").unwrap_err();
        assert_eq!(err.code(), "INVALID_PATTERN");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_length_messages_do_not_interfere() {
        let handles: Vec<_> = (1..=8)
            .map(|min| {
                thread::spawn(move || {
                    let opts = ValidationOptions::new().min(min).max(min + 10);
                    for _ in 0..200 {
                        let verdict = evaluate(RuleKind::Length, json!(""), &opts);
                        let message = verdict.message.unwrap();
                        assert_eq!(message.arg("min"), Some(min.to_string().as_str()));
                        assert_eq!(
                            message.arg("max"),
                            Some((min + 10).to_string().as_str())
                        );
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
