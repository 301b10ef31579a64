//! 字段绑定编译器
//!
//! 把 JSON 或代码里动态拼装的字段绑定编译成可执行的规则列表：
//! 校验规则名是否已注册、参数是否齐全、正则能否编译，并收集跨字段引用。

use crate::error::{Result, ValidationError};
use crate::models::{FieldBinding, OptionValue, RuleBinding, ValidationOptions};
use crate::number;
use crate::registry::{RuleDef, RuleRegistry};
use crate::rule_kind::RuleKind;
use serde::Deserialize;
use std::collections::BTreeSet;

/// 编译后的单条规则
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub def: &'static RuleDef,
    pub message: Option<String>,
    pub options: ValidationOptions,
}

impl CompiledRule {
    pub fn kind(&self) -> RuleKind {
        self.def.kind
    }
}

/// 编译后的字段绑定
#[derive(Debug, Clone)]
pub struct CompiledBinding {
    pub field: String,
    pub label: Option<String>,
    pub rules: Vec<CompiledRule>,
    /// 跨字段规则引用的字段
    pub references: BTreeSet<String>,
}

impl CompiledBinding {
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field)
    }
}

/// 编译后的表单：字段顺序与输入一致
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    pub fields: Vec<CompiledBinding>,
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&CompiledBinding> {
        self.fields.iter().find(|f| f.field == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.field.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Deserialize)]
struct SchemaDocument {
    fields: Vec<FieldBinding>,
}

/// 绑定编译器
pub struct BindingCompiler {
    registry: &'static RuleRegistry,
}

impl BindingCompiler {
    pub fn new() -> Self {
        Self {
            registry: RuleRegistry::global(),
        }
    }

    /// 从 JSON 编译整张表单，格式为 `{"fields": [FieldBinding, ...]}`
    pub fn compile_schema_json(&self, json: &str) -> Result<FormSchema> {
        let doc: SchemaDocument = serde_json::from_str(json)?;
        self.compile_schema(doc.fields)
    }

    pub fn compile_schema(&self, bindings: Vec<FieldBinding>) -> Result<FormSchema> {
        let mut fields: Vec<CompiledBinding> = Vec::with_capacity(bindings.len());

        for binding in bindings {
            if fields.iter().any(|f| f.field == binding.field) {
                return Err(ValidationError::invalid_options(
                    binding.field.clone(),
                    "字段重复定义",
                ));
            }
            fields.push(self.compile(binding)?);
        }

        Ok(FormSchema { fields })
    }

    pub fn compile_json(&self, json: &str) -> Result<CompiledBinding> {
        let binding: FieldBinding = serde_json::from_str(json)?;
        self.compile(binding)
    }

    /// 编译单个字段绑定
    pub fn compile(&self, binding: FieldBinding) -> Result<CompiledBinding> {
        if binding.field.is_empty() {
            return Err(ValidationError::invalid_options("field", "字段名不能为空"));
        }

        let mut references = BTreeSet::new();
        let mut rules = Vec::with_capacity(binding.rules.len());

        for (i, rule) in binding.rules.into_iter().enumerate() {
            let path = format!("{}.rules[{}]", binding.field, i);
            let compiled = self.compile_rule(rule, &path)?;

            if compiled.kind().is_cross_field() {
                if let Some(target) = compiled.options.target_field() {
                    references.insert(target.to_string());
                }
            }
            rules.push(compiled);
        }

        Ok(CompiledBinding {
            field: binding.field,
            label: binding.label,
            rules,
            references,
        })
    }

    fn compile_rule(&self, rule: RuleBinding, path: &str) -> Result<CompiledRule> {
        let def = self.registry.get(&rule.rule)?;
        self.validate_options(def.kind, &rule.options, path)?;

        Ok(CompiledRule {
            def,
            message: rule.message,
            options: rule.options,
        })
    }

    /// 校验规则参数是否齐全
    fn validate_options(&self, kind: RuleKind, options: &ValidationOptions, path: &str) -> Result<()> {
        match kind {
            RuleKind::Regular => {
                let pattern = options.regex.as_deref().ok_or_else(|| {
                    ValidationError::invalid_options(path, "regular 规则需要 regex 参数")
                })?;
                // 预编译，同时填充缓存
                self.registry.patterns().get_or_compile(pattern)?;
            }
            RuleKind::Compare | RuleKind::NotEqual => {
                if options.target_field().is_none_or(str::is_empty) {
                    return Err(ValidationError::invalid_options(
                        path,
                        format!("{} 规则需要 to 参数", kind),
                    ));
                }
            }
            RuleKind::Length | RuleKind::Min => {
                if options.min.is_none() && options.max.is_none() {
                    return Err(ValidationError::invalid_options(
                        path,
                        format!("{} 规则需要 min 或 max 参数", kind),
                    ));
                }
            }
            RuleKind::Number => {
                // 延迟参数只能在校验时求值
                for (name, bound) in [("min", &options.min), ("max", &options.max)] {
                    if let Some(OptionValue::Literal(bound)) = bound {
                        if !number::is_numeric_text(bound.as_str()) {
                            return Err(ValidationError::invalid_options(
                                path,
                                format!("number 规则的 {} 不是有效数字: '{}'", name, bound.as_str()),
                            ));
                        }
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }
}

impl Default for BindingCompiler {
    fn default() -> Self {
        Self::new()
    }
}
