//! 表单配置构建
//!
//! 把字段名映射到默认值和有序规则列表，再编译成可执行的 [`FormSchema`](crate::compiler::FormSchema)。

pub mod address;
pub mod models;

pub use address::{
    AddressDetailsForm, address_details_config, address_details_form, transform_for_residence,
    transform_for_target,
};
pub use models::{AccountSettings, FieldConfig, FormConfig, SignupContext, UpgradeInfo};
