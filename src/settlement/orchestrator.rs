//! Blockchain settlement orchestrator.
//!
//! Bridges a priced claim to the on-chain settlement contract: scales
//! the payable to token units, correlates it with the claim via a
//! keccak document hash, and broadcasts the disbursement. Returns as
//! soon as the transaction is accepted into the pending pool; it never
//! waits for confirmation and never retries.

use alloy::network::EthereumWallet;
use alloy::primitives::{keccak256, Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::transaction::{self, TxBuilder};
use crate::blockchain::types::{BlockchainConfig, BlockchainResult, ConfirmationStatus};
use crate::blockchain::wallet::Wallet;
use crate::claims::money::Money;
use crate::observability::metrics;
use crate::settlement::contract::MediClaimSettlement;
use crate::settlement::types::{SettlementError, SubmittedClaim};

/// Decimal precision of the settlement token.
pub const TOKEN_DECIMALS: u8 = 18;

/// Orchestrates disbursements against the settlement contract.
pub struct Orchestrator {
    client: BlockchainClient,
    wallet: Wallet,
    contract_address: Address,
    rpc_url: url::Url,
}

impl Orchestrator {
    /// Build the orchestrator, verifying every required setting first.
    ///
    /// RPC URL, contract address, and the signing key must all be
    /// present; a missing one is a `Configuration` error raised before
    /// any network call is attempted.
    pub async fn from_config(config: &BlockchainConfig) -> Result<Self, SettlementError> {
        if config.rpc_url.trim().is_empty() {
            return Err(SettlementError::Configuration("rpc_url".into()));
        }
        if config.contract_address.trim().is_empty() {
            return Err(SettlementError::Configuration("contract_address".into()));
        }

        let contract_address: Address = config
            .contract_address
            .parse()
            .map_err(|_| SettlementError::Configuration("contract_address".into()))?;
        let rpc_url: url::Url = config
            .rpc_url
            .parse()
            .map_err(|_| SettlementError::Configuration("rpc_url".into()))?;
        let wallet = Wallet::from_env(config.chain_id)
            .map_err(|e| SettlementError::Configuration(e.to_string()))?;

        let client = BlockchainClient::new(config.clone()).await?;

        Ok(Self {
            client,
            wallet,
            contract_address,
            rpc_url,
        })
    }

    /// Submit a claim disbursement through the settlement contract.
    ///
    /// The payable is scaled to token units exactly (cents carry the
    /// only fractional precision), and the claim id is bound to the
    /// on-chain event through its keccak hash.
    pub async fn submit_claim(
        &self,
        amount: Money,
        claim_id: &str,
        provider_wallet: &str,
    ) -> Result<SubmittedClaim, SettlementError> {
        let provider_addr = parse_recipient(provider_wallet)?;
        let amount_units = amount.to_token_units(TOKEN_DECIMALS);
        let document_hash = keccak256(claim_id.as_bytes());

        let provider = self.signing_provider();
        let contract = MediClaimSettlement::new(self.contract_address, &provider);

        let pending = contract
            .payProvider(provider_addr, amount_units, document_hash)
            .send()
            .await
            .map_err(|e| SettlementError::Submission(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(
            claim_id,
            tx_hash = %tx_hash,
            amount = %amount,
            provider = %provider_addr,
            "Claim submitted to settlement contract"
        );
        metrics::record_settlement("contract");

        Ok(SubmittedClaim::pending(tx_hash.to_string()))
    }

    /// Failsafe path: a plain value transfer to the provider wallet.
    ///
    /// Used by the reviewed-claim flow so the hash can be recorded
    /// immediately, before any confirmation.
    pub async fn direct_transfer(
        &self,
        provider_wallet: &str,
        amount: Money,
    ) -> Result<SubmittedClaim, SettlementError> {
        let provider_addr = parse_recipient(provider_wallet)?;
        let amount_units = amount.to_token_units(TOKEN_DECIMALS);

        let builder = TxBuilder::new(self.client.clone(), self.wallet.clone());
        let tx = builder.build(provider_addr, amount_units).await?;

        let provider = self.signing_provider();
        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| SettlementError::Submission(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(
            tx_hash = %tx_hash,
            amount = %amount,
            provider = %provider_addr,
            "Direct provider transfer submitted"
        );
        metrics::record_settlement("direct");

        Ok(SubmittedClaim::pending(tx_hash.to_string()))
    }

    /// One-shot confirmation lookup for a previously submitted hash.
    pub async fn confirmation_status(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<ConfirmationStatus> {
        transaction::confirmation_status(&self.client, tx_hash).await
    }

    /// Native balance held by the signing wallet.
    pub async fn signer_balance(&self) -> BlockchainResult<U256> {
        self.client.get_balance(self.wallet.address()).await
    }

    /// Whether the chain RPC is currently reachable.
    pub async fn is_healthy(&self) -> bool {
        self.client.is_healthy().await
    }

    fn signing_provider(&self) -> impl Provider + '_ {
        ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.wallet.signer().clone()))
            .connect_http(self.rpc_url.clone())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("contract_address", &self.contract_address)
            .field("signer", &self.wallet.address())
            .finish()
    }
}

/// Parse and vet a disbursement target.
///
/// Absent or zero addresses are refused outright: sending funds to a
/// burn address on missing data is never the right outcome.
fn parse_recipient(provider_wallet: &str) -> Result<Address, SettlementError> {
    let trimmed = provider_wallet.trim();
    if trimmed.is_empty() {
        return Err(SettlementError::MissingRecipient);
    }
    let addr: Address = trimmed
        .parse()
        .map_err(|_| SettlementError::InvalidRecipient(trimmed.to_string()))?;
    if addr == Address::ZERO {
        return Err(SettlementError::MissingRecipient);
    }
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_parsing() {
        let addr = parse_recipient("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
        assert_eq!(
            addr.to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_missing_recipient_is_refused() {
        assert!(matches!(
            parse_recipient(""),
            Err(SettlementError::MissingRecipient)
        ));
        assert!(matches!(
            parse_recipient("   "),
            Err(SettlementError::MissingRecipient)
        ));
    }

    #[test]
    fn test_zero_address_is_refused() {
        assert!(matches!(
            parse_recipient("0x0000000000000000000000000000000000000000"),
            Err(SettlementError::MissingRecipient)
        ));
    }

    #[test]
    fn test_malformed_recipient_is_refused() {
        assert!(matches!(
            parse_recipient("not-an-address"),
            Err(SettlementError::InvalidRecipient(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_configuration_fails_before_any_network_call() {
        let mut config = BlockchainConfig::default();
        config.contract_address = String::new();
        let result = Orchestrator::from_config(&config).await;
        assert!(matches!(
            result,
            Err(SettlementError::Configuration(field)) if field == "contract_address"
        ));
    }

    #[test]
    fn test_amount_scaling_matches_contract_precision() {
        // $500.00 payable → 500 * 10^18 token base units
        let units = Money::from_major(500).to_token_units(TOKEN_DECIMALS);
        assert_eq!(
            units,
            U256::from(500u64) * U256::from(10u64).pow(U256::from(18u64))
        );
    }
}
