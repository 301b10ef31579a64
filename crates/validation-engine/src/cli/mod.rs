//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `validate` - 用 JSON 绑定定义校验一份表单值
//! - `address` - 构建地址表单并校验表单值
//! - `rules` - 列出已注册的规则
//!
//! # 使用示例
//!
//! ```bash
//! field-validator validate --schema signup.json --values input.json
//! field-validator address --settings account.json --values input.json --residence gb --target maltainvest
//! field-validator rules
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::{CommandRunner, ValidationOutput};
