use std::path::Path;

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};

use crate::config::AppConfig;

/// Environment variables overriding file values, e.g.
/// `QUANTBT_BACKTEST__SHARES=50`.
pub const ENV_PREFIX: &str = "QUANTBT_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by merging the TOML file, a JSON file next to it,
    /// and environment variables. Missing files fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be parsed or a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
        Self::extract(Self::figment(path.as_ref(), None))
    }

    /// Loads configuration with a `Config.<profile>.toml` overlay read from
    /// the same directory as `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be parsed or a value is out of range.
    pub fn load_with_profile(path: impl AsRef<Path>, profile: &str) -> Result<AppConfig> {
        Self::extract(Self::figment(path.as_ref(), Some(profile)))
    }

    /// Builds the provider stack without extracting it.
    #[must_use]
    pub fn figment(path: &Path, profile: Option<&str>) -> Figment {
        let mut figment = Figment::new().merge(Toml::file(path));
        if let Some(profile) = profile {
            let overlay = path.with_file_name(format!("Config.{profile}.toml"));
            figment = figment.merge(Toml::file(overlay));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .join(Json::file(path.with_extension("json")))
    }

    /// Extracts and validates an `AppConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails or validation rejects a value.
    pub fn extract(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment
            .extract()
            .context("Failed to parse configuration")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}
