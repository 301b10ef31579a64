//! 共享库
//!
//! 包含校验引擎与命令行工具共用的配置加载和可观测性初始化代码。

pub mod config;
pub mod observability;
