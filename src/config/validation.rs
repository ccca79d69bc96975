//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check URLs, addresses and amounts parse
//! - Validate value ranges (timeouts > 0, validator count within limits)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use subxt::utils::AccountId32;

use crate::config::schema::AppConfig;
use crate::units::parse_amount;

/// Maximum number of nominations the relay chain accepts.
pub const MAX_NOMINATIONS: usize = 16;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `flow.amount`).
    pub field: String,
    /// Human readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "ethereum.rpc_url", &config.ethereum.rpc_url, &["http", "https", "ws", "wss"]);
    for url in &config.ethereum.failover_urls {
        check_url(&mut errors, "ethereum.failover_urls", url, &["http", "https"]);
    }
    check_url(&mut errors, "polkadot.ws_url", &config.polkadot.ws_url, &["ws", "wss"]);

    check_positive(&mut errors, "ethereum.rpc_timeout_secs", config.ethereum.rpc_timeout_secs);
    check_positive(&mut errors, "ethereum.confirmation_timeout_secs", config.ethereum.confirmation_timeout_secs);
    check_positive(&mut errors, "ethereum.gas_limit", config.ethereum.gas_limit);
    check_positive(&mut errors, "polkadot.connect_timeout_secs", config.polkadot.connect_timeout_secs);
    check_positive(&mut errors, "polkadot.request_timeout_secs", config.polkadot.request_timeout_secs);
    check_positive(&mut errors, "polkadot.finalization_timeout_secs", config.polkadot.finalization_timeout_secs);
    check_positive(&mut errors, "flow.arrival_poll_interval_secs", config.flow.arrival_poll_interval_secs);
    check_positive(&mut errors, "flow.arrival_timeout_secs", config.flow.arrival_timeout_secs);

    if Address::from_str(&config.bridge.contract_address).is_err() {
        errors.push(ValidationError::new("bridge.contract_address", "not a valid Ethereum address"));
    }

    if !config.flow.token.eq_ignore_ascii_case("ETH") && Address::from_str(&config.flow.token).is_err() {
        errors.push(ValidationError::new("flow.token", "expected \"ETH\" or an ERC-20 address"));
    }

    // ERC-20 decimals are only known on-chain; 18 is the widest common case.
    match parse_amount(&config.flow.amount, 18) {
        Ok(amount) if amount.is_zero() => {
            errors.push(ValidationError::new("flow.amount", "must be greater than zero"));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("flow.amount", e.to_string())),
    }

    if let Some(stake) = &config.flow.stake_amount {
        if let Err(e) = parse_amount(stake, config.polkadot.token_decimals) {
            errors.push(ValidationError::new("flow.stake_amount", e.to_string()));
        }
    }

    for validator in &config.flow.validators {
        if AccountId32::from_str(validator).is_err() {
            errors.push(ValidationError::new(
                "flow.validators",
                format!("'{}' is not a valid SS58 address", validator),
            ));
        }
    }
    if config.flow.validators.len() > MAX_NOMINATIONS {
        errors.push(ValidationError::new(
            "flow.validators",
            format!("at most {} validators can be nominated", MAX_NOMINATIONS),
        ));
    }
    if config.flow.max_validators == 0 || config.flow.max_validators > MAX_NOMINATIONS {
        errors.push(ValidationError::new(
            "flow.max_validators",
            format!("must be between 1 and {}", MAX_NOMINATIONS),
        ));
    }

    if config.dust.native_threshold_eth < 0.0 || config.dust.usd_threshold < 0.0 {
        errors.push(ValidationError::new("dust", "thresholds must not be negative"));
    }
    if config.dust.dot_price_usd <= 0.0 {
        errors.push(ValidationError::new("dust.dot_price_usd", "must be greater than zero"));
    }
    let mut symbols = HashSet::new();
    for token in &config.dust.tokens {
        if !symbols.insert(token.symbol.as_str()) {
            errors.push(ValidationError::new(
                "dust.tokens",
                format!("duplicate symbol {}", token.symbol),
            ));
        }
        if Address::from_str(&token.address).is_err() {
            errors.push(ValidationError::new(
                "dust.tokens",
                format!("{} has an invalid address", token.symbol),
            ));
        }
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str, schemes: &[&str]) {
    match url::Url::parse(value) {
        Ok(url) if schemes.contains(&url.scheme()) => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}' (expected one of {:?})", url.scheme(), schemes),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e))),
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::new(field, "must be greater than zero"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.polkadot.ws_url = "https://rpc.polkadot.io".to_string();
        config.flow.amount = "lots".to_string();
        config.flow.max_validators = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"polkadot.ws_url"));
        assert!(fields.contains(&"flow.amount"));
        assert!(fields.contains(&"flow.max_validators"));
    }

    #[test]
    fn test_rejects_bad_validator_address() {
        let mut config = AppConfig::default();
        config.flow.validators = vec![
            "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY".to_string(),
            "not-an-address".to_string(),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("not-an-address"));
    }

    #[test]
    fn test_token_must_be_eth_or_address() {
        let mut config = AppConfig::default();
        config.flow.token = "USDC".to_string();
        assert!(validate_config(&config).is_err());

        config.flow.token = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_duplicate_token_symbol_rejected() {
        let mut config = AppConfig::default();
        let mut copy = config.dust.tokens[0].clone();
        copy.address = "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599".to_string();
        config.dust.tokens.push(copy);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "dust.tokens");
        assert!(errors[0].message.contains("USDC"));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut config = AppConfig::default();
        config.flow.amount = "0".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "flow.amount");
    }
}
