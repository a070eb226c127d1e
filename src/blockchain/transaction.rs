//! Transaction building and receipt inspection.
//!
//! # Responsibilities
//! - Build value-transfer requests with nonce sync and a gas-price guard
//! - Map a receipt lookup to a confirmation status (one-shot; the
//!   gateway never blocks waiting for confirmations)

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};
use crate::blockchain::wallet::Wallet;

/// Builder for direct value transfers (the settlement failsafe path).
pub struct TxBuilder {
    client: BlockchainClient,
    wallet: Wallet,
}

impl TxBuilder {
    pub fn new(client: BlockchainClient, wallet: Wallet) -> Self {
        Self { client, wallet }
    }

    /// Build a value-transfer request to `to`.
    ///
    /// Syncs the nonce from the chain, prices gas with the configured
    /// multiplier, and refuses to build when gas exceeds the maximum.
    pub async fn build(&self, to: Address, value: U256) -> BlockchainResult<TransactionRequest> {
        let chain_nonce = self
            .client
            .get_transaction_count(self.wallet.address())
            .await?;
        self.wallet.set_nonce(chain_nonce);

        let gas_price = self.client.get_gas_price().await?;
        let gas_price_gwei = gas_price / 1_000_000_000;

        let config = self.client.config();
        if gas_price_gwei > config.max_gas_price_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: config.max_gas_price_gwei,
            });
        }

        let adjusted_gas_price = (gas_price as f64 * config.gas_price_multiplier) as u128;
        let nonce = self.wallet.get_and_increment_nonce();

        let tx = TransactionRequest::default()
            .with_to(to)
            .with_value(value)
            .with_nonce(nonce)
            .with_gas_price(adjusted_gas_price)
            .with_chain_id(self.wallet.chain_id())
            .with_gas_limit(21_000); // plain transfer, no calldata

        Ok(tx)
    }

    /// The signing wallet's address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

/// Look up a transaction once and report its confirmation status.
///
/// Callers poll this; nothing in the gateway waits for finality.
pub async fn confirmation_status(
    client: &BlockchainClient,
    tx_hash: TxHash,
) -> BlockchainResult<ConfirmationStatus> {
    let receipt = match client.get_transaction_receipt(tx_hash).await? {
        Some(r) => r,
        None => return Ok(ConfirmationStatus::Pending),
    };

    if !receipt.status() {
        return Ok(ConfirmationStatus::Failed {
            reason: "transaction reverted".to_string(),
        });
    }

    let current_block = client.get_block_number().await?;
    let tx_block = receipt.block_number.unwrap_or(current_block);
    let confirmations = current_block.saturating_sub(tx_block) as u32;
    let required = client.confirmation_blocks();

    if confirmations >= required {
        Ok(ConfirmationStatus::Confirmed {
            block_number: tx_block,
        })
    } else {
        Ok(ConfirmationStatus::Confirming {
            current: confirmations,
            required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_status_variants() {
        let status = ConfirmationStatus::Confirming {
            current: 2,
            required: 3,
        };
        assert!(matches!(status, ConfirmationStatus::Confirming { .. }));

        let status = ConfirmationStatus::Confirmed { block_number: 100 };
        assert!(matches!(status, ConfirmationStatus::Confirmed { .. }));
    }
}
