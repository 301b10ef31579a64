//! 可本地化的失败消息
//!
//! 引擎本身与语言无关：它只给出消息模板（如 `Should be {{value}}`）和占位符取值，
//! 最终文本由调用方提供的 [`Translator`] 生成。

use serde::Serialize;
use std::borrow::Cow;

/// 失败消息：模板 + 命名占位符取值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub template: Cow<'static, str>,
    pub args: Vec<(String, String)>,
}

impl Message {
    pub fn new(template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            template: template.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    /// 查找占位符取值
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn render(&self, translator: &dyn Translator) -> String {
        translator.translate(&self.template, &self.args)
    }
}

/// 翻译函数：`(template, substitutions) -> String`
pub trait Translator: Send + Sync {
    fn translate(&self, template: &str, args: &[(String, String)]) -> String;
}

/// 默认翻译器：不做翻译，仅替换 `{{name}}` 占位符
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpolator;

impl Translator for Interpolator {
    fn translate(&self, template: &str, args: &[(String, String)]) -> String {
        // 只扫描模板本身，替换进来的值不会再被解析
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };

            let name = &after[..end];
            match args.iter().find(|(k, _)| k == name) {
                Some((_, value)) => out.push_str(value),
                None => out.push_str(&rest[start..start + end + 4]),
            }
            rest = &after[end + 2..];
        }

        out.push_str(rest);
        out
    }
}

impl<F> Translator for F
where
    F: Fn(&str, &[(String, String)]) -> String + Send + Sync,
{
    fn translate(&self, template: &str, args: &[(String, String)]) -> String {
        self(template, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate() {
        let msg = Message::new("You should enter a value between {{min}} and {{max}} characters.")
            .with_arg("min", "2")
            .with_arg("max", "4");
        assert_eq!(
            msg.render(&Interpolator),
            "You should enter a value between 2 and 4 characters."
        );
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        let msg = Message::new("{{field}} is required");
        assert_eq!(msg.render(&Interpolator), "{{field}} is required");
    }

    #[test]
    fn test_substituted_values_are_not_reinterpolated() {
        let msg = Message::new("{{value_one}} and {{value_two}} cannot be the same.")
            .with_arg("value_one", "Label {{value_two}}")
            .with_arg("value_two", "current password");
        assert_eq!(
            msg.render(&Interpolator),
            "Label {{value_two}} and current password cannot be the same."
        );
    }

    #[test]
    fn test_unclosed_placeholder() {
        let msg = Message::new("Should be {{value").with_arg("value", "1");
        assert_eq!(msg.render(&Interpolator), "Should be {{value");
    }

    #[test]
    fn test_closure_translator() {
        let upper = |template: &str, args: &[(String, String)]| {
            Interpolator.translate(template, args).to_uppercase()
        };
        let msg = Message::new("Should be {{value}}").with_arg("value", "one");
        assert_eq!(msg.render(&upper), "SHOULD BE ONE");
    }

    #[test]
    fn test_arg_lookup() {
        let msg = Message::new("x").with_arg("min_value", "10");
        assert_eq!(msg.arg("min_value"), Some("10"));
        assert_eq!(msg.arg("max_value"), None);
    }
}
