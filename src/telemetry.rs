//! 日志与指标初始化

use crate::config::AppConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化 tracing 订阅器
/// RUST_LOG 优先，否则使用配置里的级别；格式 json/pretty 二选一
pub fn init_telemetry(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "pretty" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .init();
        }
    }

    tracing::info!(
        level = %config.logging.level,
        format = %config.logging.format,
        "Telemetry initialized"
    );
}

/// 预声明核心指标，保证导出端点从一开始就有序列
pub fn init_metrics() {
    metrics::counter!("http_requests_total", "status" => "200").absolute(0);
    metrics::counter!("authz_denials_total", "status" => "403").absolute(0);
    metrics::histogram!("http_request_duration_seconds").record(0.0);
}
