//! Gateway configuration.
//!
//! `GatewayConfig` controls expiry periods for the cookies written by the
//! gateway and the consent controllers, and the path of the cookie settings
//! page (on which the banner is never shown).
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use consent_gateway::config::GatewayConfig;
//! let cfg = GatewayConfig::default();
//! assert_eq!(cfg.default_expiry_days, 30);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use consent_gateway::config::GatewayConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = GatewayConfig::builder()
//!     .default_expiry_days(14)
//!     .cookie_settings_path("/cookies")
//!     .build()?; // returns Result<GatewayConfig, ConfigError>
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`ConfigError`] when an expiry period is not
//! between 1 and [`MAX_EXPIRY_DAYS`] or the settings path is not absolute.

use std::fmt;

const DEFAULT_COOKIE_SETTINGS_PATH: &str = "/cookie-settings";

/// Longest lifetime browsers honour for a cookie (Chromium caps at 400 days).
pub const MAX_EXPIRY_DAYS: i64 = 400;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Expiry (in days) applied when a cookie is set without explicit options.
    pub default_expiry_days: i64,
    /// Expiry (in days) of the persisted consent record.
    pub consent_expiry_days: i64,
    /// Expiry (in days) of `seen_cookie_message` and `cookie_preferences_set`.
    pub acknowledgement_expiry_days: i64,
    /// Path of the cookie settings page.
    pub cookie_settings_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_expiry_days: 30,
            consent_expiry_days: 365,
            acknowledgement_expiry_days: 365,
            cookie_settings_path: DEFAULT_COOKIE_SETTINGS_PATH.to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }
}

/// Builder for [`GatewayConfig`].
#[derive(Debug, Clone, Default)]
pub struct GatewayConfigBuilder {
    inner: GatewayConfig,
}

impl GatewayConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut GatewayConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn default_expiry_days(self, days: i64) -> Self {
        self.map(|c| c.default_expiry_days = days)
    }
    pub fn consent_expiry_days(self, days: i64) -> Self {
        self.map(|c| c.consent_expiry_days = days)
    }
    pub fn acknowledgement_expiry_days(self, days: i64) -> Self {
        self.map(|c| c.acknowledgement_expiry_days = days)
    }
    pub fn cookie_settings_path<S: Into<String>>(self, path: S) -> Self {
        self.map(|c| c.cookie_settings_path = path.into())
    }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut GatewayConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<GatewayConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositiveExpiry { field: &'static str, days: i64 },
    ExpiryTooLong { field: &'static str, days: i64 },
    RelativeSettingsPath(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveExpiry { field, days } =>
                write!(f, "{field} must be at least 1 day (got {days})"),
            ConfigError::ExpiryTooLong { field, days } =>
                write!(f, "{field} must be at most {MAX_EXPIRY_DAYS} days (got {days})"),
            ConfigError::RelativeSettingsPath(p) =>
                write!(f, "cookie_settings_path {p:?} must start with '/'"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(c: &GatewayConfig) -> Result<(), ConfigError> {
    let periods = [
        ("default_expiry_days", c.default_expiry_days),
        ("consent_expiry_days", c.consent_expiry_days),
        ("acknowledgement_expiry_days", c.acknowledgement_expiry_days),
    ];
    for (field, days) in periods {
        if days < 1 {
            return Err(ConfigError::NonPositiveExpiry { field, days });
        }
        if days > MAX_EXPIRY_DAYS {
            return Err(ConfigError::ExpiryTooLong { field, days });
        }
    }
    if !c.cookie_settings_path.starts_with('/') {
        return Err(ConfigError::RelativeSettingsPath(c.cookie_settings_path.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_defaults_for_untouched_fields() {
        let cfg = GatewayConfig::builder().default_expiry_days(7).build().unwrap();
        assert_eq!(cfg.default_expiry_days, 7);
        assert_eq!(cfg.consent_expiry_days, 365);
        assert_eq!(cfg.cookie_settings_path, "/cookie-settings");
    }

    #[test]
    fn rejects_non_positive_expiry() {
        let err = GatewayConfig::builder().consent_expiry_days(0).build().unwrap_err();
        assert_eq!(err, ConfigError::NonPositiveExpiry { field: "consent_expiry_days", days: 0 });
    }

    #[test]
    fn rejects_expiry_beyond_browser_cap() {
        let err = GatewayConfig::builder().default_expiry_days(10_000_000).build().unwrap_err();
        assert_eq!(
            err,
            ConfigError::ExpiryTooLong { field: "default_expiry_days", days: 10_000_000 }
        );

        assert!(GatewayConfig::builder().consent_expiry_days(MAX_EXPIRY_DAYS).build().is_ok());
    }

    #[test]
    fn rejects_relative_settings_path() {
        let err = GatewayConfig::builder().cookie_settings_path("cookies").build().unwrap_err();
        assert!(matches!(err, ConfigError::RelativeSettingsPath(_)));
    }
}
