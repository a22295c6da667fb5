use crate::core::pricing::{PricingPolicy, DEFAULT_MARKUP_RATE};
use crate::utils::error::{RateError, Result};
use crate::utils::validation::{validate_range, validate_url, Validate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_BASE_URL: &str = "https://apis.fedex.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 20;

pub const ENV_CLIENT_ID: &str = "FEDEX_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "FEDEX_CLIENT_SECRET";
pub const ENV_ACCOUNT_NUMBER: &str = "FEDEX_ACCOUNT_NUMBER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateConfig {
    #[serde(default)]
    pub carrier: CarrierConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub reference_data: ReferenceDataConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CarrierConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_packaging")]
    pub packaging_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_markup_rate")]
    pub markup_rate: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceDataConfig {
    pub zip_file: Option<PathBuf>,
    pub product_file: Option<PathBuf>,
    pub supplier_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_packaging() -> String {
    crate::adapters::fedex::rate_request::DEFAULT_PACKAGING.to_string()
}

fn default_markup_rate() -> Decimal {
    DEFAULT_MARKUP_RATE
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: None,
            client_secret: None,
            account_number: None,
            timeout_seconds: default_timeout(),
            packaging_type: default_packaging(),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            markup_rate: default_markup_rate(),
        }
    }
}

// 不把密鑰印進 log
impl std::fmt::Debug for CarrierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("account_number", &self.account_number)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("packaging_type", &self.packaging_type)
            .finish()
    }
}

/// Empty values and `${VAR}` placeholders left by substitution count as
/// absent.
fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !(v.starts_with("${") && v.ends_with('}')))
}

impl CarrierConfig {
    pub fn client_id(&self) -> Option<&str> {
        present(&self.client_id)
    }

    pub fn client_secret(&self) -> Option<&str> {
        present(&self.client_secret)
    }

    pub fn account_number(&self) -> Option<&str> {
        present(&self.account_number)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl RateConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| RateError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FEDEX_CLIENT_ID})；未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Fill absent credentials from `FEDEX_*` environment variables.
    pub fn with_env_credentials(mut self) -> Self {
        let from_env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if self.carrier.client_id().is_none() {
            self.carrier.client_id = from_env(ENV_CLIENT_ID);
        }
        if self.carrier.client_secret().is_none() {
            self.carrier.client_secret = from_env(ENV_CLIENT_SECRET);
        }
        if self.carrier.account_number().is_none() {
            self.carrier.account_number = from_env(ENV_ACCOUNT_NUMBER);
        }
        self
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy::new(self.pricing.markup_rate)
    }
}

impl Validate for RateConfig {
    fn validate(&self) -> Result<()> {
        validate_url("carrier.base_url", &self.carrier.base_url)?;
        validate_range("carrier.timeout_seconds", self.carrier.timeout_seconds, 1, 300)?;
        validate_range(
            "pricing.markup_rate",
            self.pricing.markup_rate,
            Decimal::ZERO,
            Decimal::TEN,
        )?;

        if self.carrier.packaging_type.trim().is_empty() {
            return Err(RateError::MissingConfig {
                field: "carrier.packaging_type".to_string(),
            });
        }

        Ok(())
    }
}
