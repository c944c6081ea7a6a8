use crate::adapters::http::{IntraClient, DEFAULT_BASE_URL, DEFAULT_SCOPE};
use crate::adapters::rate_limit::{FixedDelay, DEFAULT_DELAY};
use crate::core::pipeline::{PipelineOptions, UpdatePolicy};
use crate::domain::model::Credentials;
use crate::utils::error::{GraderError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_POOL_LIST: &str = "pool-list.json";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraderConfig {
    pub api: ApiConfig,
    pub pools: Option<PoolsConfig>,
    pub update: Option<UpdateConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub client_id: String,
    pub client_secret: String,
    pub scope: Option<String>,
    pub request_timeout_seconds: Option<u64>,
    pub rate_limit_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolsConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    pub policy: Option<UpdatePolicy>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
    pub format: Option<LogFormat>,
}

impl GraderConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GraderError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GraderError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FT_CLIENT_SECRET})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GraderError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", self.base_url())?;
        validation::validate_secret("api.client_id", &self.api.client_id)?;
        validation::validate_secret("api.client_secret", &self.api.client_secret)?;
        validation::validate_non_empty_string("api.scope", self.scope())?;
        if let Some(timeout) = self.api.request_timeout_seconds {
            validation::validate_positive_number("api.request_timeout_seconds", timeout, 1)?;
        }

        validation::validate_path("pools.path", self.pool_list_path())?;

        if let Some(level) = self.logging.as_ref().and_then(|l| l.level.as_deref()) {
            validation::validate_one_of("logging.level", level, &LOG_LEVELS)?;
        }
        if let Some(file) = self.log_file() {
            validation::validate_path("logging.file", file)?;
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn scope(&self) -> &str {
        self.api.scope.as_deref().unwrap_or(DEFAULT_SCOPE)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.api
                .request_timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn rate_limit_delay(&self) -> Duration {
        self.api
            .rate_limit_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DELAY)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.api.client_id, &self.api.client_secret)
    }

    pub fn pool_list_path(&self) -> &str {
        self.pools
            .as_ref()
            .map(|p| p.path.as_str())
            .unwrap_or(DEFAULT_POOL_LIST)
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.update
            .as_ref()
            .and_then(|u| u.policy)
            .unwrap_or_default()
    }

    pub fn dry_run(&self) -> bool {
        self.update
            .as_ref()
            .and_then(|u| u.dry_run)
            .unwrap_or(false)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn log_file(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.file.as_deref())
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .as_ref()
            .and_then(|l| l.format)
            .unwrap_or_default()
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions::new(self.credentials())
            .with_policy(self.update_policy())
            .with_dry_run(self.dry_run())
    }

    pub fn build_client(&self) -> Result<IntraClient> {
        IntraClient::new(self.base_url(), self.scope(), self.request_timeout())
    }

    pub fn build_limiter(&self) -> FixedDelay {
        FixedDelay::new(self.rate_limit_delay())
    }
}

impl Validate for GraderConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
