use crate::core::compositor::{
    parse_color, QrOptions, DEFAULT_DARK, DEFAULT_LIGHT, DEFAULT_MARGIN, DEFAULT_MAX_SIZE,
    DEFAULT_SIZE,
};
use crate::core::ConfigProvider;
use crate::utils::error::{AdminError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub qr: QrConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 10,
            email: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QrConfig {
    pub size: u32,
    pub margin: u32,
    pub dark: String,
    pub light: String,
    pub max_size: u32,
    pub verification_base_url: String,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            margin: DEFAULT_MARGIN,
            dark: DEFAULT_DARK.to_string(),
            light: DEFAULT_LIGHT.to_string(),
            max_size: DEFAULT_MAX_SIZE,
            verification_base_url: "http://localhost:3000/verify/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "./qr-codes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: Option<String>,
    pub level: Option<String>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdminError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SHOP_QR_PASSWORD})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AdminError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        if self.api.timeout_seconds == 0 {
            return Err(AdminError::InvalidValueError {
                field: "api.timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Value must be at least 1".to_string(),
            });
        }

        validate_url("qr.verification_base_url", &self.qr.verification_base_url)?;
        validate_positive_number("qr.max_size", self.qr.max_size, 1)?;
        validate_range("qr.size", self.qr.size, 1, self.qr.max_size)?;
        validate_range("qr.margin", self.qr.margin, DEFAULT_MARGIN, 16)?;
        parse_color("qr.dark", &self.qr.dark)?;
        parse_color("qr.light", &self.qr.light)?;

        validate_path("output.directory", &self.output.directory)?;

        if let Some(format) = &self.logging.format {
            if LogFormat::parse(format).is_none() {
                return Err(AdminError::InvalidValueError {
                    field: "logging.format".to_string(),
                    value: format.clone(),
                    reason: "Unsupported format. Valid formats: compact, json".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .format
            .as_deref()
            .and_then(LogFormat::parse)
            .unwrap_or_default()
    }

    /// 帳號密碼都有設定且沒有殘留未替換的 `${VAR}`
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let email = self.api.email.as_deref()?;
        let password = self.api.password.as_deref()?;
        let unresolved = |v: &str| v.is_empty() || v.contains("${");
        if unresolved(email) || unresolved(password) {
            return None;
        }
        Some((email, password))
    }
}

impl ConfigProvider for AppConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn verification_base_url(&self) -> &str {
        &self.qr.verification_base_url
    }

    fn output_directory(&self) -> &str {
        &self.output.directory
    }

    fn qr_options(&self) -> QrOptions {
        let defaults = QrOptions::default();
        QrOptions {
            size: self.qr.size,
            margin: self.qr.margin,
            dark: parse_color("qr.dark", &self.qr.dark).unwrap_or(defaults.dark),
            light: parse_color("qr.light", &self.qr.light).unwrap_or(defaults.light),
            max_size: self.qr.max_size,
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
