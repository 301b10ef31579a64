//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑：读取文件、编译绑定、执行校验并输出 JSON 结果。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use validation_shared::config::ValidationConfig;

use crate::compiler::BindingCompiler;
use crate::executor::FieldValidator;
use crate::forms::{AccountSettings, SignupContext, address_details_form};
use crate::message::{Interpolator, Translator};
use crate::models::{FormReport, FormValues};
use crate::registry::RuleRegistry;

/// 校验结果输出
#[derive(Debug, Serialize)]
pub struct ValidationOutput {
    pub valid: bool,
    /// 字段 -> 渲染后的失败消息
    pub errors: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<String>,
}

impl ValidationOutput {
    pub fn from_report(report: &FormReport, translator: &dyn Translator) -> Self {
        Self {
            valid: report.is_valid(),
            errors: report.errors(translator),
            trace: report
                .fields
                .iter()
                .flat_map(|f| f.evaluation_trace.iter().cloned())
                .collect(),
        }
    }
}

/// 命令执行器
pub struct CommandRunner {
    validator: FieldValidator,
    defaults: ValidationConfig,
}

impl CommandRunner {
    pub fn new(defaults: ValidationConfig, trace: bool) -> Self {
        let validator = if trace || defaults.trace_enabled {
            FieldValidator::new().with_trace()
        } else {
            FieldValidator::new()
        };

        Self {
            validator,
            defaults,
        }
    }

    /// 执行 validate 命令，返回表单是否通过
    pub fn run_validate(&self, schema_path: &Path, values_path: &Path) -> Result<bool> {
        let schema_json = read_file(schema_path)?;
        let schema = BindingCompiler::new()
            .compile_schema_json(&schema_json)
            .with_context(|| format!("编译绑定定义失败: {}", schema_path.display()))?;
        info!(fields = schema.len(), "绑定定义已编译");

        let values = load_values(values_path)?;
        let report = self.validator.validate_form(&schema, &values)?;

        self.print_report(&report)
    }

    /// 执行 address 命令，返回表单是否通过
    pub fn run_address(
        &self,
        settings_path: &Path,
        values_path: &Path,
        residence: Option<String>,
        target: Option<String>,
    ) -> Result<bool> {
        let settings: AccountSettings = read_json(settings_path)?;

        let context = SignupContext {
            account_settings: Some(settings),
            residence: residence.or_else(|| self.defaults.default_residence.clone()),
            real_account_signup_target: target.or_else(|| self.defaults.default_target.clone()),
            upgrade_info: None,
        };

        let form = address_details_form(&context)?;
        info!(
            fields = form.schema.len(),
            residence = ?context.residence,
            target = ?context.real_account_signup_target,
            "地址表单已构建"
        );

        let values = load_values(values_path)?;
        let report = form.validate(&self.validator, &values)?;

        self.print_report(&report)
    }

    /// 执行 rules 命令
    pub fn run_rules(&self) -> Vec<&'static str> {
        let names = RuleRegistry::global().names();
        for name in &names {
            println!("{}", name);
        }
        names
    }

    fn print_report(&self, report: &FormReport) -> Result<bool> {
        let output = ValidationOutput::from_report(report, &Interpolator);
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(output.valid)
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("读取文件失败: {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_file(path)?;
    serde_json::from_str(&content).with_context(|| format!("解析 JSON 失败: {}", path.display()))
}

fn load_values(path: &Path) -> Result<FormValues> {
    Ok(FormValues::new(read_json(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("field-validator-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_output_from_report() {
        let schema = BindingCompiler::new()
            .compile_schema_json(r#"{ "fields": [ { "field": "email", "rules": [ { "rule": "email" } ] } ] }"#)
            .unwrap();
        let report = FieldValidator::new()
            .validate_form(&schema, &FormValues::new(json!({ "email": "a@b" })))
            .unwrap();

        let output = ValidationOutput::from_report(&report, &Interpolator);
        assert!(!output.valid);
        assert_eq!(output.errors["email"], "Invalid email address.");

        let rendered = serde_json::to_value(&output).unwrap();
        assert!(rendered.get("trace").is_none());
    }

    #[test]
    fn test_run_validate_from_files() {
        let schema = write_temp(
            "schema.json",
            r#"{ "fields": [ { "field": "amount", "rules": [ { "rule": "number", "options": { "min": 1, "max": 10 } } ] } ] }"#,
        );
        let valid = write_temp("valid.json", r#"{ "amount": "5" }"#);
        let invalid = write_temp("invalid.json", r#"{ "amount": "50" }"#);

        let runner = CommandRunner::new(ValidationConfig::default(), false);
        assert!(runner.run_validate(&schema, &valid).unwrap());
        assert!(!runner.run_validate(&schema, &invalid).unwrap());
    }

    #[test]
    fn test_run_address_uses_default_residence() {
        let settings = write_temp("settings.json", r#"{ "address_line_1": "1 Main St" }"#);
        let values = write_temp(
            "address-values.json",
            r#"{ "address_line_1": "1 Main St", "address_city": "Douglas", "address_postcode": "" }"#,
        );

        let defaults = ValidationConfig {
            default_residence: Some("im".to_string()),
            ..Default::default()
        };

        // im 居住国要求邮编必填
        let runner = CommandRunner::new(defaults, true);
        assert!(!runner.run_address(&settings, &values, None, None).unwrap());

        // gb 以外、非 im 的居住国不要求邮编，svg 目标不要求州/省
        assert!(
            runner
                .run_address(&settings, &values, Some("de".to_string()), Some("svg".to_string()))
                .unwrap()
        );
    }

    #[test]
    fn test_missing_file_reports_path() {
        let runner = CommandRunner::new(ValidationConfig::default(), false);
        let err = runner
            .run_validate(Path::new("/nonexistent/schema.json"), Path::new("/nonexistent/v.json"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/schema.json"));
    }

    #[test]
    fn test_run_rules() {
        let runner = CommandRunner::new(ValidationConfig::default(), false);
        assert!(runner.run_rules().contains(&"letter_symbol"));
    }
}
