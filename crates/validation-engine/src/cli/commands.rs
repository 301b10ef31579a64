//! CLI 命令定义

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 表单字段校验工具
#[derive(Parser, Debug)]
#[command(name = "field-validator")]
#[command(version, about = "表单字段校验工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 输出每条规则的评估追踪
    #[arg(long)]
    pub trace: bool,

    /// 结束时把指标快照打印到 stderr
    #[arg(long)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 用 JSON 绑定定义校验表单值
    ///
    /// schema 格式为 `{"fields": [{"field": ..., "rules": [...]}]}`。
    /// 校验不通过时以非零状态码退出。
    Validate {
        /// 绑定定义文件
        #[arg(short, long)]
        schema: PathBuf,

        /// 表单值文件（JSON 对象）
        #[arg(short, long)]
        values: PathBuf,
    },

    /// 构建地址表单并校验表单值
    Address {
        /// 账户资料文件（JSON），用作默认值
        #[arg(long)]
        settings: PathBuf,

        /// 表单值文件（JSON 对象）
        #[arg(short, long)]
        values: PathBuf,

        /// 居住国代码
        #[arg(short, long)]
        residence: Option<String>,

        /// 开户目标
        #[arg(short, long)]
        target: Option<String>,
    },

    /// 列出已注册的规则
    Rules,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_validate() {
        let cli = Cli::parse_from([
            "field-validator",
            "validate",
            "--schema",
            "signup.json",
            "-v",
            "input.json",
        ]);
        match cli.command {
            Commands::Validate { schema, values } => {
                assert_eq!(schema, PathBuf::from("signup.json"));
                assert_eq!(values, PathBuf::from("input.json"));
            }
            _ => panic!("预期 Validate 命令"),
        }
        assert!(!cli.trace);
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_cli_parse_address() {
        let cli = Cli::parse_from([
            "field-validator",
            "address",
            "--settings",
            "account.json",
            "--values",
            "input.json",
            "-r",
            "gb",
        ]);
        match cli.command {
            Commands::Address {
                residence, target, ..
            } => {
                assert_eq!(residence.as_deref(), Some("gb"));
                assert!(target.is_none());
            }
            _ => panic!("预期 Address 命令"),
        }
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::parse_from([
            "field-validator",
            "--log-level",
            "debug",
            "--trace",
            "--print-metrics",
            "rules",
        ]);

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.trace);
        assert!(cli.print_metrics);
        assert!(matches!(cli.command, Commands::Rules));
    }
}
