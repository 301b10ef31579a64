//! 字段校验引擎
//!
//! 提供可复用的表单字段校验能力，支持：
//! - 按名称注册的校验规则（必填、邮箱、长度、数值范围、跨字段比较等）
//! - JSON 或代码拼装的字段绑定，编译期检查规则名和参数
//! - 短路求值执行，失败消息可本地化
//! - 开户地址表单的配置构建

pub mod cli;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod forms;
pub mod message;
pub mod models;
pub mod number;
pub mod registry;
pub mod rule_kind;

pub use compiler::{BindingCompiler, CompiledBinding, CompiledRule, FormSchema};
pub use error::{Result, ValidationError};
pub use evaluator::{Outcome, RuleInput};
pub use executor::FieldValidator;
pub use message::{Interpolator, Message, Translator};
pub use models::{
    FieldBinding, FieldResolver, FieldResult, FormReport, FormValues, NoFields, NumberType,
    NumericText, OptionValue, RuleBinding, ValidationOptions, Verdict,
};
pub use number::{add_comma, compare_numeric};
pub use registry::{RuleDef, RuleRegistry, get_rule};
pub use rule_kind::RuleKind;
