//! 配置管理
//!
//! 配置按以下顺序叠加，后者覆盖前者：
//! 1. 内置默认值
//! 2. TOML 配置文件（默认 `nurse-assist.toml`，不存在时跳过）
//! 3. `NURSE_` 前缀的环境变量，嵌套字段用 `__` 分隔，如 `NURSE_SERVICE__BASE_URL`

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_CONFIG_FILE: &str = "nurse-assist.toml";

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置数据
    config: Arc<RwLock<AppConfig>>,
    /// 配置文件路径
    config_path: PathBuf,
}

/// 客户端完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 病例服务
    pub service: ServiceConfig,
    /// 报告与导出
    pub report: ReportConfig,
    /// 日志
    pub logging: LoggingConfig,
    /// 本地状态与导出目录
    pub storage: StorageConfig,
}

/// 病例服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// 连接超时（秒），不设置请求超时
    pub connect_timeout_secs: Option<u64>,
}

/// 报告配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 导出文件名前缀
    pub file_prefix: String,
    /// 日期显示格式
    pub date_format: String,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    /// 打印页脚中的应用名称
    pub app_name: String,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 日志格式：pretty 或 json
    pub format: String,
}

/// 本地存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 本地偏好与会话文件
    pub local_state_path: String,
    /// PDF 导出目录
    pub export_dir: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout_secs: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            file_prefix: "Relatorio_Medico".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            app_name: "AI Nurse Assist".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_state_path: ".nurse-assist/local.toml".to_string(),
            export_dir: ".".to_string(),
        }
    }
}

impl ConfigManager {
    /// 加载并校验配置
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let (config_path, required) = match config_path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let config = Self::load_config(&config_path, required)?;
        ConfigValidator::new().validate(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// 从文件和环境变量加载配置
    fn load_config(config_path: &Path, required: bool) -> Result<AppConfig> {
        let settings = Config::builder()
            .add_source(File::from(config_path).required(required))
            .add_source(
                Environment::with_prefix("NURSE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", config_path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        info!("Configuration loaded (file: {})", config_path.display());
        Ok(config)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 获取配置
    pub async fn get_config(&self) -> AppConfig {
        let config = self.config.read().await;
        config.clone()
    }
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    /// 验证规则
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: &'static str,
    /// 验证函数
    validator: fn(&AppConfig) -> Result<()>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "service.base_url",
                validator: |config| {
                    let url = config.service.base_url.trim();
                    if url.is_empty() {
                        Err(anyhow::anyhow!("Base URL cannot be empty"))
                    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
                        Err(anyhow::anyhow!("Base URL must use http or https: {}", url))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "report.page_width_mm",
                validator: |config| {
                    if config.report.page_width_mm <= 0.0 || config.report.page_height_mm <= 0.0 {
                        Err(anyhow::anyhow!("Page size must be positive"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "report.margin_mm",
                validator: |config| {
                    let report = &config.report;
                    if report.margin_mm < 0.0 {
                        return Err(anyhow::anyhow!("Margin cannot be negative"));
                    }
                    let printable = report.page_width_mm.min(report.page_height_mm)
                        - 2.0 * report.margin_mm;
                    if printable <= 0.0 {
                        Err(anyhow::anyhow!("Margins leave no printable area"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "report.file_prefix",
                validator: |config| {
                    if config.report.file_prefix.trim().is_empty() {
                        Err(anyhow::anyhow!("Report file prefix cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "logging.level",
                validator: |config| {
                    EnvFilter::try_new(&config.logging.level)
                        .map(|_| ())
                        .map_err(|e| anyhow::anyhow!("Invalid log level: {}", e))
                },
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &AppConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(anyhow::anyhow!("Invalid {}: {}", rule.field_path, e));
            }
        }
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(ConfigValidator::new().validate(&config).is_ok());
        assert_eq!(config.report.file_prefix, "Relatorio_Medico");
        assert_eq!(config.service.connect_timeout_secs, None);
    }

    #[test]
    fn test_validator_rejects_bad_values() {
        let validator = ConfigValidator::new();

        let mut config = AppConfig::default();
        config.service.base_url = "  ".to_string();
        assert!(validator.validate(&config).is_err());

        let mut config = AppConfig::default();
        config.report.margin_mm = 105.0;
        assert!(validator.validate(&config).is_err());

        let mut config = AppConfig::default();
        config.logging.level = "info,nurse_cli=loud".to_string();
        assert!(validator.validate(&config).is_err());
    }

    #[tokio::test]
    async fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nurse-assist.toml");
        std::fs::write(
            &path,
            "[service]\nbase_url = \"https://triagem.example.org\"\n\n[report]\nmargin_mm = 15.0\n",
        )
        .unwrap();

        let manager = ConfigManager::new(Some(&path)).unwrap();
        let config = manager.get_config().await;
        assert_eq!(config.service.base_url, "https://triagem.example.org");
        assert_eq!(config.report.margin_mm, 15.0);
        assert_eq!(config.report.date_format, "%d/%m/%Y");
        assert_eq!(manager.config_path(), path.as_path());
    }

    #[test]
    fn test_unknown_log_format_falls_back_to_pretty() {
        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(ConfigValidator::new().validate(&config).is_ok());
        assert_eq!(
            crate::logging::LogFormat::from_config(&config.logging),
            crate::logging::LogFormat::Pretty
        );
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigManager::new(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
