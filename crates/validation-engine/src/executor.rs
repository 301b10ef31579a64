//! 字段校验执行器
//!
//! 按顺序执行字段上的规则，遇到第一条失败的规则立即停止（短路求值）。

use crate::compiler::{CompiledBinding, FormSchema};
use crate::error::Result;
use crate::message::Message;
use crate::models::{FieldResolver, FieldResult, FormReport, FormValues};
use crate::registry::RuleRegistry;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, instrument};
use validation_shared::observability::metrics;

/// 字段校验执行器
pub struct FieldValidator {
    registry: &'static RuleRegistry,
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self {
            registry: RuleRegistry::global(),
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 校验单个字段
    pub fn validate_field(
        &self,
        binding: &CompiledBinding,
        value: Option<&Value>,
        resolver: &dyn FieldResolver,
    ) -> Result<FieldResult> {
        let mut result = FieldResult::new(binding.field.clone());

        for (i, rule) in binding.rules.iter().enumerate() {
            let verdict = self.registry.evaluate(
                rule.kind(),
                value,
                &rule.options,
                binding.display_name(),
                resolver,
            )?;
            result.rules_evaluated += 1;

            if self.trace_enabled {
                result.evaluation_trace.push(format!(
                    "{}.rules[{}]: {} => {}",
                    binding.field,
                    i,
                    rule.kind(),
                    if verdict.ok { "PASS" } else { "FAIL" }
                ));
            }

            if !verdict.ok {
                result.valid = false;
                result.failed_rule = Some(rule.kind());
                // 绑定上的消息优先于规则自身的消息
                result.message = match &rule.message {
                    Some(text) => Some(Message::new(text.clone())),
                    None => verdict.message,
                };

                if self.trace_enabled && i + 1 < binding.rules.len() {
                    result.evaluation_trace.push(format!(
                        "{}: 短路 - 跳过剩余 {} 条规则",
                        binding.field,
                        binding.rules.len() - i - 1
                    ));
                }
                break;
            }
        }

        metrics::record_field_validation(result.valid);
        if let Some(kind) = result.failed_rule {
            metrics::record_rule_failure(kind.as_str());
        }

        Ok(result)
    }

    /// 校验整张表单，表单值同时作为跨字段规则的解析器
    #[instrument(skip_all, fields(fields = schema.len()))]
    pub fn validate_form(&self, schema: &FormSchema, values: &FormValues) -> Result<FormReport> {
        let start = Instant::now();
        let mut report = FormReport::default();

        for binding in &schema.fields {
            let value = values.get_field(&binding.field);
            let result = self.validate_field(binding, value, values)?;
            if !result.valid {
                debug!(
                    field = %result.field,
                    rule = ?result.failed_rule,
                    "字段校验失败"
                );
            }
            report.fields.push(result);
        }

        debug!(
            valid = report.is_valid(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "表单校验完成"
        );
        Ok(report)
    }
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::BindingCompiler;
    use crate::message::Interpolator;
    use crate::models::{FieldBinding, MockFieldResolver, NoFields, RuleBinding, ValidationOptions};
    use crate::rule_kind::RuleKind;
    use serde_json::json;

    fn compile(binding: FieldBinding) -> CompiledBinding {
        BindingCompiler::new().compile(binding).unwrap()
    }

    #[test]
    fn test_short_circuit_stops_at_first_failure() {
        let binding = compile(FieldBinding::new(
            "email",
            vec![
                RuleBinding::new("req"),
                RuleBinding::new("email"),
                RuleBinding::new("length").with_options(ValidationOptions::new().max(3)),
            ],
        ));

        let result = FieldValidator::new()
            .with_trace()
            .validate_field(&binding, Some(&json!("")), &NoFields)
            .unwrap();

        assert!(!result.valid);
        assert_eq!(result.failed_rule, Some(RuleKind::Req));
        assert_eq!(result.rules_evaluated, 1);
        assert!(result.evaluation_trace.last().unwrap().contains("跳过剩余 2 条规则"));
    }

    #[test]
    fn test_all_rules_run_when_passing() {
        let binding = compile(FieldBinding::new(
            "email",
            vec![RuleBinding::new("req"), RuleBinding::new("email")],
        ));

        let result = FieldValidator::new()
            .validate_field(&binding, Some(&json!("a@b.co")), &NoFields)
            .unwrap();

        assert!(result.valid);
        assert_eq!(result.rules_evaluated, 2);
        assert!(result.message.is_none());
        assert!(result.evaluation_trace.is_empty());
    }

    #[test]
    fn test_message_override() {
        let binding = compile(FieldBinding::new(
            "address_line_1",
            vec![RuleBinding::new("req").with_message("Address line 1 is required")],
        ));

        let result = FieldValidator::new()
            .validate_field(&binding, None, &NoFields)
            .unwrap();

        assert_eq!(
            result.message.unwrap().render(&Interpolator),
            "Address line 1 is required"
        );
    }

    #[test]
    fn test_cross_field_not_resolved_after_short_circuit() {
        let binding = compile(FieldBinding::new(
            "password_confirm",
            vec![
                RuleBinding::new("req"),
                RuleBinding::new("compare").with_options(ValidationOptions::new().to("#password")),
            ],
        ));

        // req 失败后不应再读取 password 字段
        let mut resolver = MockFieldResolver::new();
        resolver.expect_resolve().never();

        let result = FieldValidator::new()
            .validate_field(&binding, Some(&json!("  ")), &resolver)
            .unwrap();
        assert_eq!(result.failed_rule, Some(RuleKind::Req));
    }

    #[test]
    fn test_validate_form() {
        let schema = BindingCompiler::new()
            .compile_schema(vec![
                FieldBinding::new("password", vec![RuleBinding::new("req"), RuleBinding::new("password")]),
                FieldBinding::new(
                    "password_confirm",
                    vec![
                        RuleBinding::new("compare").with_options(ValidationOptions::new().to("#password")),
                    ],
                ),
            ])
            .unwrap();

        let values = FormValues::new(json!({
            "password": "Secret123",
            "password_confirm": "Secret124"
        }));

        let report = FieldValidator::new().validate_form(&schema, &values).unwrap();
        assert!(!report.is_valid());
        assert!(report.field("password").unwrap().valid);

        let errors = report.errors(&Interpolator);
        assert_eq!(
            errors["password_confirm"],
            "The two passwords that you entered do not match."
        );
    }

    #[test]
    fn test_configuration_error_propagates() {
        let binding = compile(FieldBinding::new(
            "password_confirm",
            vec![RuleBinding::new("compare").with_options(ValidationOptions::new().to("#password"))],
        ));

        let err = FieldValidator::new()
            .validate_field(&binding, Some(&json!("x")), &NoFields)
            .unwrap_err();
        assert_eq!(err.code(), "FIELD_NOT_FOUND");
    }
}
