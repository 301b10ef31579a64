//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集。
//! 只安装 recorder，不启动 HTTP 端点；快照通过 [`render`] 获取。

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use super::ObservabilityConfig;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 安装 Prometheus recorder
pub fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(&config.service_name);

    Ok(MetricsHandle { handle })
}

/// 注册指标描述
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!(
        "field_validations_total",
        "Total number of field validations"
    );
    metrics::describe_counter!(
        "rule_failures_total",
        "Total number of failed rule evaluations"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 获取全局 Prometheus handle
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// 渲染当前指标；recorder 未安装时返回 None
pub fn render() -> Option<String> {
    get_handle().map(|h| h.render())
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录一次字段校验
#[inline]
pub fn record_field_validation(valid: bool) {
    let outcome = if valid { "pass" } else { "fail" };
    metrics::counter!("field_validations_total", "outcome" => outcome).increment(1);
}

/// 记录一次规则失败
#[inline]
pub fn record_rule_failure(rule: &'static str) {
    metrics::counter!("rule_failures_total", "rule" => rule).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_contains_recorded_counters() {
        let handle = init(&ObservabilityConfig::default()).unwrap();

        record_field_validation(false);
        record_rule_failure("req");

        let snapshot = handle.render();
        assert!(snapshot.contains("field_validations_total"));
        assert!(snapshot.contains("rule=\"req\""));
        assert!(render().is_some());
    }
}
