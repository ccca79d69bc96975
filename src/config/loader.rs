//! Configuration loading from disk and environment.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the Ethereum private key.
pub const ETH_PRIVATE_KEY_ENV_VAR: &str = "DUST_STAKE_ETH_PRIVATE_KEY";

/// Environment variable holding the Polkadot mnemonic or secret URI.
pub const POLKADOT_MNEMONIC_ENV_VAR: &str = "DUST_STAKE_POLKADOT_MNEMONIC";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    MissingSecret(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::MissingSecret(var) => write!(f, "Environment variable {} not set", var),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the config file if it exists, defaults otherwise.
pub fn load_or_default(path: &Path) -> Result<AppConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        Ok(AppConfig::default())
    }
}

/// Secrets read from the environment. Never logged or serialized.
#[derive(Clone, Default)]
pub struct Secrets {
    pub eth_private_key: Option<String>,
    pub polkadot_mnemonic: Option<String>,
}

impl Secrets {
    /// Read whichever secrets are present.
    pub fn from_env() -> Self {
        Self {
            eth_private_key: std::env::var(ETH_PRIVATE_KEY_ENV_VAR).ok(),
            polkadot_mnemonic: std::env::var(POLKADOT_MNEMONIC_ENV_VAR).ok(),
        }
    }

    pub fn eth_private_key(&self) -> Result<&str, ConfigError> {
        self.eth_private_key
            .as_deref()
            .ok_or(ConfigError::MissingSecret(ETH_PRIVATE_KEY_ENV_VAR))
    }

    pub fn polkadot_mnemonic(&self) -> Result<&str, ConfigError> {
        self.polkadot_mnemonic
            .as_deref()
            .ok_or(ConfigError::MissingSecret(POLKADOT_MNEMONIC_ENV_VAR))
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("eth_private_key", &self.eth_private_key.as_ref().map(|_| "<redacted>"))
            .field("polkadot_mnemonic", &self.polkadot_mnemonic.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
