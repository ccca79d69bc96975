//! sr25519 account derivation.
//!
//! # Security
//! - The mnemonic is read from the environment and dropped after derivation
//! - Only the public address is ever logged

use std::fmt;
use std::str::FromStr;

use subxt::utils::AccountId32;
use subxt_signer::sr25519::Keypair;
use subxt_signer::SecretUri;

use crate::polkadot::types::{PolkadotError, PolkadotResult};

/// Signing account on the relay chain.
#[derive(Clone)]
pub struct PolkadotAccount {
    keypair: Keypair,
    account_id: AccountId32,
}

impl PolkadotAccount {
    /// Derive an account from a BIP-39 mnemonic or a secret URI.
    ///
    /// Accepts a bare phrase, a phrase with derivation junctions
    /// (`phrase//hard/soft`), or a dev URI such as `//Alice`.
    pub fn from_secret(secret: &str) -> PolkadotResult<Self> {
        let uri = SecretUri::from_str(secret.trim())
            .map_err(|e| PolkadotError::Account(format!("Invalid secret: {}", e)))?;
        let keypair = Keypair::from_uri(&uri)
            .map_err(|e| PolkadotError::Account(format!("Key derivation failed: {}", e)))?;

        let account = Self::from_keypair(keypair);
        tracing::info!(address = %account.address(), "Polkadot account loaded");
        Ok(account)
    }

    /// Wrap an existing keypair.
    pub fn from_keypair(keypair: Keypair) -> Self {
        let account_id = AccountId32(keypair.public_key().0);
        Self {
            keypair,
            account_id,
        }
    }

    /// On-chain account id (the sr25519 public key).
    pub fn account_id(&self) -> &AccountId32 {
        &self.account_id
    }

    /// SS58 address (generic substrate prefix).
    pub fn address(&self) -> String {
        self.account_id.to_string()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl fmt::Debug for PolkadotAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolkadotAccount")
            .field("address", &self.address())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEV_PHRASE: &str = "bottom drive obey lake curtain smoke basket hold race lonely fit walk";
    const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

    #[test]
    fn test_dev_uri() {
        let account = PolkadotAccount::from_secret("//Alice").unwrap();
        assert_eq!(account.address(), ALICE);
    }

    #[test]
    fn test_phrase_with_junction_matches_dev_uri() {
        let from_phrase = PolkadotAccount::from_secret(&format!("{}//Alice", DEV_PHRASE)).unwrap();
        assert_eq!(from_phrase.address(), ALICE);
    }

    #[test]
    fn test_bare_phrase_is_deterministic() {
        let a = PolkadotAccount::from_secret(DEV_PHRASE).unwrap();
        let b = PolkadotAccount::from_secret(&format!("  {}  ", DEV_PHRASE)).unwrap();
        assert_eq!(a.account_id(), b.account_id());
        assert_ne!(a.address(), ALICE);
    }

    #[test]
    fn test_invalid_mnemonic() {
        let result = PolkadotAccount::from_secret("definitely not a valid bip39 phrase at all");
        assert!(matches!(result, Err(PolkadotError::Account(_))));
    }

    #[test]
    fn test_debug_shows_only_address() {
        let account = PolkadotAccount::from_secret("//Bob").unwrap();
        let rendered = format!("{:?}", account);
        assert!(rendered.contains(&account.address()));
        assert!(!rendered.contains("Bob"));
    }
}
