//! 日志初始化
//!
//! 日志写到标准错误，标准输出留给报告和名单内容。`RUST_LOG` 存在时优先于配置中的级别。
//! 日志中只记录 ID 和姓名，不记录症状或病史文本。

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_config(config: &LoggingConfig) -> Self {
        match config.format.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// 构造日志过滤器
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).context("Invalid RUST_LOG directives")
        }
        _ => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level: {}", config.level)),
    }
}

/// 初始化全局日志订阅器，只能调用一次
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    match LogFormat::from_config(config) {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .context("Failed to initialise logging")?;

    tracing::debug!("Logging initialised at level {}", config.level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_selection() {
        let mut config = LoggingConfig::default();
        assert_eq!(LogFormat::from_config(&config), LogFormat::Pretty);
        config.format = "JSON".to_string();
        assert_eq!(LogFormat::from_config(&config), LogFormat::Json);
    }

    #[test]
    fn test_filter_accepts_configured_level() {
        let config = LoggingConfig {
            level: "nurse_integration=debug,info".to_string(),
            ..Default::default()
        };
        assert!(build_filter(&config).is_ok());
    }
}
