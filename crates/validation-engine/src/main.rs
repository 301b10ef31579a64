//! 字段校验命令行工具

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use validation_engine::cli::{Cli, CommandRunner, Commands};
use validation_shared::config::AppConfig;
use validation_shared::observability;

const SERVICE_NAME: &str = "field-validator";

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 统一加载配置：从 config/{service_name}.toml 加载，包含可观测性配置
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig {
            service_name: SERVICE_NAME.to_string(),
            ..Default::default()
        }
    });

    let obs_config = config
        .observability_config()
        .with_log_level(cli.log_level.as_deref());
    let guard = observability::init(&obs_config)?;

    debug!(environment = %config.environment, "配置已加载");

    let runner = CommandRunner::new(config.validation.clone(), cli.trace);

    let valid = match cli.command {
        Commands::Validate { schema, values } => runner.run_validate(&schema, &values)?,
        Commands::Address {
            settings,
            values,
            residence,
            target,
        } => runner.run_address(&settings, &values, residence, target)?,
        Commands::Rules => {
            let names = runner.run_rules();
            info!(count = names.len(), "规则列表已输出");
            true
        }
    };

    if cli.print_metrics {
        if let Some(snapshot) = guard.metrics_snapshot() {
            eprintln!("{}", snapshot);
        }
    }

    Ok(if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
