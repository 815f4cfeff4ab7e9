//! # Booking Configuration
//!
//! Currency display and submission policy for the booking session.
//!
//! ## Load Order
//! ```text
//! ┌──────────────┐   ┌───────────────────────┐   ┌───────────────┐   ┌──────────┐
//! │   defaults   │ ─►│ booking.toml (if any) │ ─►│ SALON_* vars  │ ─►│ validate │
//! └──────────────┘   └───────────────────────┘   └───────────────┘   └──────────┘
//! ```
//!
//! ## Example File
//! ```toml
//! [currency]
//! code = "EUR"
//! symbol = "€"
//! decimals = 2
//!
//! [submission]
//! timeout_secs = 15
//! max_attempts = 3
//! initial_backoff_ms = 500
//! max_backoff_secs = 10
//! ```

use std::path::PathBuf;
use std::time::Duration;

use backoff::ExponentialBackoff;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use salon_core::Money;

use crate::error::{BookingError, BookingResult};

// =============================================================================
// Currency
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// ISO 4217 code
    #[serde(default = "default_currency_code")]
    pub code: String,

    #[serde(default = "default_currency_symbol")]
    pub symbol: String,

    /// Digits after the decimal point (0-4)
    #[serde(default = "default_currency_decimals")]
    pub decimals: u8,
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_currency_decimals() -> u8 {
    2
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            code: default_currency_code(),
            symbol: default_currency_symbol(),
            decimals: default_currency_decimals(),
        }
    }
}

// =============================================================================
// Submission
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionSettings {
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Attempts per submit, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_timeout() -> u64 {
    15
}
fn default_max_attempts() -> u32 {
    3
}
fn default_initial_backoff() -> u64 {
    500
}
fn default_max_backoff() -> u64 {
    10
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        SubmissionSettings {
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

impl SubmissionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff between submission attempts.
    ///
    /// The attempt count is enforced by the caller, so there is no elapsed
    /// time limit here.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(self.initial_backoff_ms),
            max_interval: Duration::from_secs(self.max_backoff_secs),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

// =============================================================================
// Booking Config
// =============================================================================

/// Configuration for the booking session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default)]
    pub currency: CurrencySettings,

    #[serde(default)]
    pub submission: SubmissionSettings,
}

impl BookingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (booking.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> BookingResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading booking config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load booking config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> BookingResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| BookingError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BookingError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| BookingError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Booking config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> BookingResult<()> {
        let code = &self.currency.code;
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(BookingError::InvalidConfig(format!(
                "currency code must be three uppercase letters, got: {}",
                code
            )));
        }

        if self.currency.decimals > 4 {
            return Err(BookingError::InvalidConfig(
                "currency decimals must be at most 4".into(),
            ));
        }

        if self.submission.max_attempts == 0 {
            return Err(BookingError::InvalidConfig(
                "max_attempts must be greater than 0".into(),
            ));
        }

        if self.submission.timeout_secs == 0 {
            return Err(BookingError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(code) = std::env::var("SALON_CURRENCY_CODE") {
            debug!(code = %code, "Overriding currency code from environment");
            self.currency.code = code.to_uppercase();
        }

        if let Ok(symbol) = std::env::var("SALON_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }

        if let Ok(attempts) = std::env::var("SALON_SUBMIT_MAX_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(n) => self.submission.max_attempts = n,
                Err(_) => warn!(value = %attempts, "Ignoring invalid SALON_SUBMIT_MAX_ATTEMPTS"),
            }
        }

        if let Ok(timeout) = std::env::var("SALON_SUBMIT_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.submission.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring invalid SALON_SUBMIT_TIMEOUT_SECS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "salon", "booking")
            .map(|dirs| dirs.config_dir().join("booking.toml"))
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    /// Formats an amount for display.
    ///
    /// Amounts are stored in hundredths; other `decimals` settings round
    /// or pad the minor part.
    ///
    /// ## Example
    /// ```rust
    /// use salon_booking::config::BookingConfig;
    /// use salon_core::Money;
    ///
    /// let config = BookingConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(10500)), "$105.00");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let decimals = u32::from(self.currency.decimals);
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();

        let body = match decimals {
            0 => ((abs + 50) / 100).to_string(),
            1 => {
                let tenths = (abs + 5) / 10;
                format!("{}.{}", tenths / 10, tenths % 10)
            }
            _ => {
                let pad = 10_u64.pow(decimals - 2);
                format!(
                    "{}.{:0width$}",
                    abs / 100,
                    (abs % 100) * pad,
                    width = decimals as usize
                )
            }
        };

        format!("{}{}{}", sign, self.currency.symbol, body)
    }
}
