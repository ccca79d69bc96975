//! Wormhole token bridge transfers from Ethereum.
//!
//! # Sequence
//! ```text
//! balance check → (ERC-20) approve if allowance is short → wait receipt
//!     → transferTokens / wrapAndTransferETH → wait confirmations
//! ```
//!
//! Transfers are never retried: a resent transaction could bridge twice.

use std::str::FromStr;

use alloy::primitives::{Address, TxHash, B256, U256};
use alloy::providers::DynProvider;
use subxt::utils::AccountId32;

use crate::bridge::types::{BridgeError, BridgeReceipt, BridgeRequest, BridgeResult, BridgeToken};
use crate::config::BridgeConfig;
use crate::ethereum::contracts::{ITokenBridge, IERC20};
use crate::ethereum::transaction::{await_receipt, check_gas_price, signing_provider};
use crate::ethereum::{EthereumClient, EthereumError, Wallet};

/// Bridge recipient encoding: the raw 32-byte account id.
pub fn recipient_bytes32(account: &AccountId32) -> B256 {
    B256::from(account.0)
}

/// Random message nonce.
pub fn bridge_nonce() -> u32 {
    fastrand::u32(..)
}

/// Client for the Wormhole token bridge contract.
#[derive(Clone)]
pub struct WormholeBridge {
    reader: EthereumClient,
    signer: DynProvider,
    wallet: Wallet,
    contract: Address,
    config: BridgeConfig,
}

impl WormholeBridge {
    /// Create a bridge client sending from `wallet`.
    pub fn new(reader: EthereumClient, wallet: Wallet, config: BridgeConfig) -> BridgeResult<Self> {
        let contract = Address::from_str(&config.contract_address)
            .map_err(|_| BridgeError::InvalidContract(config.contract_address.clone()))?;
        let signer = signing_provider(reader.config(), &wallet)?;

        Ok(Self {
            reader,
            signer,
            wallet,
            contract,
            config,
        })
    }

    pub fn sender(&self) -> Address {
        self.wallet.address()
    }

    /// ETH attached to the bridge call: the amount itself for native
    /// transfers, the relayer fee for ERC-20 transfers.
    pub fn call_value(&self, request: &BridgeRequest) -> U256 {
        match request.token {
            BridgeToken::Native => request.amount,
            BridgeToken::Erc20(_) => U256::from(self.config.relayer_fee_wei),
        }
    }

    /// Bridge `request.amount` of `request.token` to `request.recipient`.
    pub async fn bridge(&self, request: &BridgeRequest) -> BridgeResult<BridgeReceipt> {
        if request.amount.is_zero() {
            return Err(BridgeError::InvalidAmount("amount must be greater than zero".to_string()));
        }

        let sender = self.sender();
        let value = self.call_value(request);
        let balance = self.reader.get_balance(sender).await?;
        tracing::info!(
            sender = %sender,
            balance_wei = %balance,
            "Connected to Ethereum"
        );
        if balance < value {
            return Err(BridgeError::InsufficientFunds {
                balance,
                required: value,
            });
        }

        check_gas_price(&self.reader).await?;

        let approve_tx_hash = match request.token {
            BridgeToken::Erc20(token) => self.ensure_allowance(token, request.amount).await?,
            BridgeToken::Native => None,
        };

        let recipient = recipient_bytes32(&request.recipient);
        let nonce = bridge_nonce();
        let arbiter_fee = U256::from(self.config.arbiter_fee);
        let chain = self.config.recipient_chain;
        let gas_limit = self.reader.config().gas_limit;
        let bridge = ITokenBridge::new(self.contract, self.signer.clone());

        tracing::info!(
            token = %request.token,
            amount = %request.amount,
            recipient = %request.recipient,
            recipient_chain = chain,
            nonce,
            "Initiating bridge transfer"
        );

        let pending = match request.token {
            BridgeToken::Native => bridge
                .wrapAndTransferETH(chain, recipient, arbiter_fee, nonce)
                .value(value)
                .gas(gas_limit)
                .send()
                .await
                .map_err(|e| EthereumError::Contract {
                    call: "wrapAndTransferETH",
                    reason: e.to_string(),
                })?,
            BridgeToken::Erc20(token) => bridge
                .transferTokens(token, request.amount, chain, recipient, arbiter_fee, nonce)
                .value(value)
                .gas(gas_limit)
                .send()
                .await
                .map_err(|e| EthereumError::Contract {
                    call: "transferTokens",
                    reason: e.to_string(),
                })?,
        };

        let receipt = await_receipt(pending, self.reader.config()).await?;
        tracing::info!(tx_hash = %receipt.transaction_hash, "Bridge transaction confirmed");

        Ok(BridgeReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            approve_tx_hash,
        })
    }

    /// Approve the bridge for `amount` unless the allowance already covers it.
    ///
    /// Returns the hash of the final approval.
    async fn ensure_allowance(&self, token: Address, amount: U256) -> BridgeResult<Option<TxHash>> {
        let allowance = self
            .reader
            .erc20_allowance(token, self.sender(), self.contract)
            .await?;

        let mut last = None;
        for value in approval_steps(allowance, amount) {
            tracing::info!(token = %token, allowance = %allowance, value = %value, "Approving token transfer");
            let pending = IERC20::new(token, self.signer.clone())
                .approve(self.contract, value)
                .send()
                .await
                .map_err(|e| EthereumError::Contract {
                    call: "approve",
                    reason: e.to_string(),
                })?;

            let receipt = await_receipt(pending, self.reader.config()).await?;
            tracing::info!(tx_hash = %receipt.transaction_hash, value = %value, "Approval confirmed");
            last = Some(receipt.transaction_hash);
        }

        if last.is_none() {
            tracing::debug!(token = %token, allowance = %allowance, "Allowance sufficient, skipping approval");
        }
        Ok(last)
    }
}

/// Approvals needed to raise `allowance` to `amount`.
///
/// A non-zero allowance is reset to zero first: USDT and similar tokens
/// revert `approve` from one non-zero value to another.
pub fn approval_steps(allowance: U256, amount: U256) -> Vec<U256> {
    if allowance >= amount {
        Vec::new()
    } else if allowance.is_zero() {
        vec![amount]
    } else {
        vec![U256::ZERO, amount]
    }
}

impl std::fmt::Debug for WormholeBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WormholeBridge")
            .field("contract", &self.contract)
            .field("sender", &self.sender())
            .field("recipient_chain", &self.config.recipient_chain)
            .finish()
    }
}
