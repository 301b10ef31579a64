//! 开户流程中的地址信息表单
//!
//! 基础规则按居住国和开户目标调整：
//! - 居住国 `im`：不要求填写州/省
//! - 居住国 `im`/`gb`：邮编必填
//! - 无开户目标或目标为 `svg`：不要求填写州/省

use super::models::{AccountSettings, FieldConfig, FormConfig, SignupContext};
use crate::compiler::FormSchema;
use crate::error::Result;
use crate::executor::FieldValidator;
use crate::models::{FormReport, FormValues, RuleBinding, ValidationOptions};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

const SUPPORTED_IN: &[&str] = &["svg", "iom", "malta", "maltainvest"];

/// 城市：字母、空白、撇号、点、连字符及任何非 ASCII 单词字符，1-35 个
pub const CITY_PATTERN: &str = r"^[a-zA-Z\s'.\-[^0-9A-Za-z_]]{1,35}$";
/// 州/省：任意字符，最多 60 个
pub const STATE_PATTERN: &str = r"^[\w\s\W'.-;,]{0,60}$";

/// 基础地址表单配置；没有账户资料时返回空配置
pub fn address_details_config(account_settings: Option<&AccountSettings>) -> FormConfig {
    let Some(settings) = account_settings else {
        return FormConfig::default();
    };

    FormConfig {
        fields: vec![
            FieldConfig::new("address_line_1", SUPPORTED_IN, settings.address_line_1.as_deref())
                .rule(RuleBinding::new("req").with_message("Address line 1 is required"))
                .rule(RuleBinding::new("address").with_message("Address is not in a proper format")),
            FieldConfig::new("address_line_2", SUPPORTED_IN, settings.address_line_2.as_deref()).rule(
                RuleBinding::new("length")
                    .with_message("Address line 2 is not in a proper format")
                    .with_options(ValidationOptions::new().min(0).max(30)),
            ),
            FieldConfig::new("address_city", SUPPORTED_IN, settings.address_city.as_deref())
                .rule(RuleBinding::new("req").with_message("City is required"))
                .rule(
                    RuleBinding::new("regular")
                        .with_message("City field is not in a proper format")
                        .with_options(ValidationOptions::new().regex(CITY_PATTERN)),
                ),
            FieldConfig::new("address_state", SUPPORTED_IN, settings.address_state.as_deref())
                .rule(RuleBinding::new("req").with_message("State is required"))
                .rule(
                    RuleBinding::new("regular")
                        .with_message("State is not in a proper format")
                        .with_options(ValidationOptions::new().regex(STATE_PATTERN)),
                ),
            FieldConfig::new("address_postcode", SUPPORTED_IN, settings.address_postcode.as_deref())
                .rule(
                    RuleBinding::new("postcode")
                        .with_message("Please enter a postal/ZIP code under 20 characters."),
                ),
        ],
    }
}

/// 按居住国调整规则
pub fn transform_for_residence(mut config: FormConfig, residence: Option<&str>) -> FormConfig {
    let residence = residence.unwrap_or_default();

    // Isle of Man 没有州/省列表
    if residence == "im" {
        if let Some(state) = config.get_mut("address_state") {
            state.remove_rule("req");
        }
    }

    if matches!(residence, "im" | "gb") {
        if let Some(postcode) = config.get_mut("address_postcode") {
            if !postcode.has_rule("req") {
                postcode.prepend_rule(
                    RuleBinding::new("req").with_message("Postal/ZIP code is required"),
                );
            }
        }
    }

    config
}

/// 按开户目标调整规则
pub fn transform_for_target(mut config: FormConfig, target: Option<&str>) -> FormConfig {
    if target.is_none_or(|t| t == "svg") {
        if let Some(state) = config.get_mut("address_state") {
            state.remove_rule("req");
        }
    }

    config
}

/// 组装完成的地址表单
#[derive(Debug, Clone)]
pub struct AddressDetailsForm {
    /// 表单初始值
    pub form_values: BTreeMap<String, String>,
    pub schema: FormSchema,
    pub is_svg: bool,
}

impl AddressDetailsForm {
    pub fn validate(&self, validator: &FieldValidator, values: &FormValues) -> Result<FormReport> {
        validator.validate_form(&self.schema, values)
    }
}

/// 根据开户上下文构建地址表单
#[instrument(skip(context), fields(
    residence = ?context.residence,
    target = ?context.real_account_signup_target
))]
pub fn address_details_form(context: &SignupContext) -> Result<AddressDetailsForm> {
    let target = context.real_account_signup_target.as_deref();
    let config = address_details_config(context.account_settings.as_ref());

    let form_values = config.default_fields(target);

    let config = transform_for_residence(config, context.residence.as_deref());
    let config = transform_for_target(config, target);
    let schema = config.validation_schema(target)?;

    let is_svg = context
        .upgrade_info
        .as_ref()
        .and_then(|u| u.can_upgrade_to.as_deref())
        == Some("svg");

    debug!(fields = schema.len(), is_svg, "地址表单已构建");

    Ok(AddressDetailsForm {
        form_values,
        schema,
        is_svg,
    })
}
