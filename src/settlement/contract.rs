//! Settlement contract surface and ledger semantics.
//!
//! The `sol!` block declares the ABI of the deployed contract the
//! orchestrator calls. `SettlementLedger` is a deterministic in-process
//! model of the same semantics: owner-gated disbursement, balance
//! check, transfer-then-emit, all-or-nothing. The model is what the
//! correctness properties are verified against, since the real contract
//! lives on the other side of the trust boundary.

use alloy::primitives::{Address, B256, U256};
use alloy::sol;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

sol! {
    /// On-chain settlement contract: holds deposited funds and pays
    /// providers on owner-authorized calls.
    #[sol(rpc)]
    contract MediClaimSettlement {
        function owner() external view returns (address);
        function payProvider(address provider, uint256 amount, bytes32 documentHash) external;
        event PaymentSettled(address indexed provider, uint256 amount, bytes32 documentHash);
    }
}

/// Reverts raised by a disbursement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("caller is not the contract owner")]
    NotOwner,
    #[error("contract balance is insufficient")]
    InsufficientBalance,
    #[error("recipient rejected the transfer")]
    TransferRejected,
}

/// A `PaymentSettled` emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledEvent {
    pub provider: Address,
    pub amount: U256,
    pub document_hash: B256,
}

/// Deterministic model of the settlement contract's ledger.
#[derive(Debug, Clone)]
pub struct SettlementLedger {
    /// Set once at creation, immutable thereafter.
    owner: Address,
    /// The contract's own native-currency balance.
    balance: U256,
    /// External account balances touched by disbursements.
    accounts: HashMap<Address, U256>,
    /// Recipients that refuse funds (models a reverting receiver).
    rejecting: HashSet<Address>,
    events: Vec<SettledEvent>,
}

impl SettlementLedger {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            balance: U256::ZERO,
            accounts: HashMap::new(),
            rejecting: HashSet::new(),
            events: Vec::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Deposit native currency into the contract.
    pub fn deposit(&mut self, amount: U256) {
        self.balance += amount;
    }

    /// The contract's current balance.
    pub fn balance(&self) -> U256 {
        self.balance
    }

    /// Balance of an external account.
    pub fn balance_of(&self, account: Address) -> U256 {
        self.accounts.get(&account).copied().unwrap_or(U256::ZERO)
    }

    /// Mark an account as refusing incoming transfers.
    pub fn set_rejecting(&mut self, account: Address) {
        self.rejecting.insert(account);
    }

    /// Emitted `PaymentSettled` events, in order.
    pub fn events(&self) -> &[SettledEvent] {
        &self.events
    }

    /// Disburse `amount` to `provider`, correlated by `document_hash`.
    ///
    /// Preconditions: `caller` is the owner and the contract balance
    /// covers `amount`. Any failure reverts the whole operation with no
    /// state change, and the event is appended only after the transfer
    /// has succeeded. The document hash is opaque to the ledger.
    pub fn pay_provider(
        &mut self,
        caller: Address,
        provider: Address,
        amount: U256,
        document_hash: B256,
    ) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::NotOwner);
        }
        if self.balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        if self.rejecting.contains(&provider) {
            return Err(LedgerError::TransferRejected);
        }

        self.balance -= amount;
        *self.accounts.entry(provider).or_insert(U256::ZERO) += amount;
        self.events.push(SettledEvent {
            provider,
            amount,
            document_hash,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::keccak256;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_owner_is_set_at_creation() {
        let ledger = SettlementLedger::new(addr(1));
        assert_eq!(ledger.owner(), addr(1));
    }

    #[test]
    fn test_non_owner_call_reverts_with_balance_unchanged() {
        let owner = addr(1);
        let provider = addr(2);
        let mut ledger = SettlementLedger::new(owner);
        ledger.deposit(U256::from(100));

        let result = ledger.pay_provider(addr(9), provider, U256::from(10), B256::ZERO);

        assert_eq!(result, Err(LedgerError::NotOwner));
        assert_eq!(ledger.balance(), U256::from(100));
        assert_eq!(ledger.balance_of(provider), U256::ZERO);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_insufficient_balance_reverts_without_event() {
        let owner = addr(1);
        let mut ledger = SettlementLedger::new(owner);
        ledger.deposit(U256::from(5));

        let result = ledger.pay_provider(owner, addr(2), U256::from(10), B256::ZERO);

        assert_eq!(result, Err(LedgerError::InsufficientBalance));
        assert_eq!(ledger.balance(), U256::from(5));
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_rejecting_recipient_leaves_state_untouched() {
        let owner = addr(1);
        let provider = addr(2);
        let mut ledger = SettlementLedger::new(owner);
        ledger.deposit(U256::from(100));
        ledger.set_rejecting(provider);

        let result = ledger.pay_provider(owner, provider, U256::from(10), B256::ZERO);

        assert_eq!(result, Err(LedgerError::TransferRejected));
        assert_eq!(ledger.balance(), U256::from(100));
        assert_eq!(ledger.balance_of(provider), U256::ZERO);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_successful_payment_transfers_then_emits_exact_event() {
        let owner = addr(1);
        let provider = addr(2);
        let hash = keccak256(b"claim-123");
        let mut ledger = SettlementLedger::new(owner);

        // Deposit one unit, pay out exactly one unit
        ledger.deposit(U256::from(1));
        ledger
            .pay_provider(owner, provider, U256::from(1), hash)
            .unwrap();

        assert_eq!(ledger.balance(), U256::ZERO);
        assert_eq!(ledger.balance_of(provider), U256::from(1));
        assert_eq!(
            ledger.events(),
            &[SettledEvent {
                provider,
                amount: U256::from(1),
                document_hash: hash,
            }]
        );
    }

    #[test]
    fn test_exactly_one_event_per_successful_call() {
        let owner = addr(1);
        let mut ledger = SettlementLedger::new(owner);
        ledger.deposit(U256::from(100));

        ledger
            .pay_provider(owner, addr(2), U256::from(30), keccak256(b"a"))
            .unwrap();
        let _ = ledger.pay_provider(addr(9), addr(2), U256::from(30), keccak256(b"b"));
        ledger
            .pay_provider(owner, addr(3), U256::from(30), keccak256(b"c"))
            .unwrap();

        // Two successes, one revert: two events
        assert_eq!(ledger.events().len(), 2);
        assert_eq!(ledger.balance(), U256::from(40));
    }
}
