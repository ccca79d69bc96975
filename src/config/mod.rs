//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! environment
//!     → loader.rs (Secrets: private key, mnemonic)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the tool is one-shot
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets never live in the config file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError, Secrets};
pub use schema::{
    AppConfig, BridgeConfig, DustConfig, EthereumConfig, FlowConfig, ObservabilityConfig,
    PolkadotConfig, RetryConfig, TokenConfig,
};
