//! 表单配置数据模型

use crate::compiler::{BindingCompiler, FormSchema};
use crate::error::Result;
use crate::models::{FieldBinding, RuleBinding};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 账户已保存的资料，用作表单默认值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub address_postcode: Option<String>,
}

/// 账户可升级信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeInfo {
    pub can_upgrade_to: Option<String>,
}

/// 构建表单所需的上下文
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupContext {
    pub account_settings: Option<AccountSettings>,
    /// 居住国代码，如 `gb`、`im`
    pub residence: Option<String>,
    /// 开户目标，如 `svg`、`iom`、`malta`、`maltainvest`
    pub real_account_signup_target: Option<String>,
    pub upgrade_info: Option<UpgradeInfo>,
}

/// 单个字段的配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    /// 支持该字段的开户目标
    pub supported_in: Vec<String>,
    pub default_value: String,
    pub rules: Vec<RuleBinding>,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, supported_in: &[&str], default_value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            supported_in: supported_in.iter().map(|s| s.to_string()).collect(),
            default_value: default_value.unwrap_or_default().to_string(),
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: RuleBinding) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn is_supported_in(&self, target: &str) -> bool {
        self.supported_in.iter().any(|t| t == target)
    }

    /// 删除第一条指定名称的规则，返回是否删除
    pub fn remove_rule(&mut self, rule: &str) -> bool {
        match self.rules.iter().position(|r| r.rule == rule) {
            Some(index) => {
                self.rules.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn prepend_rule(&mut self, rule: RuleBinding) {
        self.rules.insert(0, rule);
    }

    pub fn has_rule(&self, rule: &str) -> bool {
        self.rules.iter().any(|r| r.rule == rule)
    }
}

/// 表单配置：字段顺序即展示顺序
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormConfig {
    pub fields: Vec<FieldConfig>,
}

impl FormConfig {
    pub fn get(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldConfig> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 指定开户目标下可用的字段；未指定目标时返回全部字段
    pub fn supported_fields<'a>(
        &'a self,
        target: Option<&'a str>,
    ) -> impl Iterator<Item = &'a FieldConfig> + 'a {
        self.fields
            .iter()
            .filter(move |f| target.is_none_or(|t| f.is_supported_in(t)))
    }

    /// 表单初始值
    pub fn default_fields(&self, target: Option<&str>) -> BTreeMap<String, String> {
        self.supported_fields(target)
            .map(|f| (f.name.clone(), f.default_value.clone()))
            .collect()
    }

    /// 编译为可执行的校验 schema
    pub fn validation_schema(&self, target: Option<&str>) -> Result<FormSchema> {
        let bindings = self
            .supported_fields(target)
            .map(|f| FieldBinding::new(f.name.clone(), f.rules.clone()))
            .collect();
        BindingCompiler::new().compile_schema(bindings)
    }
}
