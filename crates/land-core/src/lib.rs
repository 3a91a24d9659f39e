// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LAND DAO - CORE MODULE
//
// Sale-chain primitives: Ledger, AccountState, transactions, and the
// purchase fund-split arithmetic. All financial arithmetic uses u128 wei
// units (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::collections::BTreeMap;

pub mod config;

/// 1 ether = 10^18 wei. Every balance and price in the system is u128 wei.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// 1 gwei = 10^9 wei (gas prices are quoted in wei but set in gwei multiples)
pub const WEI_PER_GWEI: u128 = 1_000_000_000;

// ─────────────────────────────────────────────────────────────────
// SALE FUND-SPLIT CONSTANTS
// ─────────────────────────────────────────────────────────────────
// Every purchase is split three ways:
//   reserve  =  5.0%  → treasury (funds slot 0)
//   unlocked = 47.5%  → founders (funds slots 1..=4, a quarter each)
//   locked   = 47.5%  → held until the unlock timestamp; refunds draw here
// The split is integer-exact: the three parts always sum to the payment.
// ─────────────────────────────────────────────────────────────────

/// Treasury reserve share of every purchase, in basis points (5%)
pub const RESERVE_SHARE_BPS: u128 = 500;
/// Basis-point denominator
pub const BPS_DENOMINATOR: u128 = 10_000;
/// A refund returns the recorded unit price divided by this (half price back)
pub const REFUND_DIVISOR: u128 = 2;
/// Funds address slots: slot 0 = treasury, slots 1..=4 = founders
pub const FUNDS_ADDRESS_COUNT: usize = 5;
/// Founder slots sharing the unlocked/locked pools equally
pub const FOUNDER_SLOTS: usize = 4;

/// Three-way split of a single purchase payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsSplit {
    pub reserve: u128,
    pub unlocked: u128,
    pub locked: u128,
}

/// Split a purchase payment into reserve / unlocked / locked parts.
///
/// Integer arithmetic only; the parts always sum to `value` exactly
/// (the reserve takes its basis-point share rounded down, the remainder
/// halves into unlocked and locked with the odd wei landing in locked).
pub fn split_purchase(value: u128) -> FundsSplit {
    let reserve = value * RESERVE_SHARE_BPS / BPS_DENOMINATOR;
    let rest = value - reserve;
    let unlocked = rest / 2;
    let locked = rest - unlocked;
    FundsSplit {
        reserve,
        unlocked,
        locked,
    }
}

// ─────────────────────────────────────────────────────────────────
// ERRORS
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    UnknownAccount(String),
    InsufficientBalance { account: String, needed: u128, available: u128 },
    BadNonce { account: String, expected: u64, got: u64 },
    InvalidSignature,
    UnknownContract(String),
    AlreadyDeployed(String),
    BadTransaction(String),
    /// A contract rejected the call (the transaction-revert analog)
    Revert(String),
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ChainError::UnknownAccount(addr) => write!(f, "Unknown account: {}", addr),
            ChainError::InsufficientBalance {
                account,
                needed,
                available,
            } => write!(
                f,
                "Insufficient balance for {}: need {} wei, have {} wei",
                account, needed, available
            ),
            ChainError::BadNonce {
                account,
                expected,
                got,
            } => write!(
                f,
                "Bad nonce for {}: expected {}, got {}",
                account, expected, got
            ),
            ChainError::InvalidSignature => write!(f, "Invalid transaction signature"),
            ChainError::UnknownContract(addr) => write!(f, "Unknown contract: {}", addr),
            ChainError::AlreadyDeployed(name) => write!(f, "Contract already deployed: {}", name),
            ChainError::BadTransaction(msg) => write!(f, "Bad transaction: {}", msg),
            ChainError::Revert(msg) => write!(f, "Transaction reverted: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

// ─────────────────────────────────────────────────────────────────
// LEDGER
// ─────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountState {
    pub balance: u128,
    /// Strictly increasing per applied transaction — the replay guard
    pub nonce: u64,
}

/// Account table for the dev chain. BTreeMap keeps iteration and
/// serialization deterministic.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Ledger {
    pub accounts: BTreeMap<String, AccountState>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an address (0 for unknown accounts, like any chain query)
    pub fn balance(&self, address: &str) -> u128 {
        self.accounts.get(address).map(|a| a.balance).unwrap_or(0)
    }

    /// Current nonce of an address (0 for unknown accounts)
    pub fn nonce(&self, address: &str) -> u64 {
        self.accounts.get(address).map(|a| a.nonce).unwrap_or(0)
    }

    /// Credit an address, creating the account entry if needed.
    pub fn credit(&mut self, address: &str, amount: u128) {
        let entry = self.accounts.entry(address.to_string()).or_default();
        entry.balance = entry.balance.saturating_add(amount);
    }

    /// Debit an address. Fails on unknown accounts and on overdraw.
    pub fn debit(&mut self, address: &str, amount: u128) -> Result<(), ChainError> {
        let entry = self
            .accounts
            .get_mut(address)
            .ok_or_else(|| ChainError::UnknownAccount(address.to_string()))?;
        if entry.balance < amount {
            return Err(ChainError::InsufficientBalance {
                account: address.to_string(),
                needed: amount,
                available: entry.balance,
            });
        }
        entry.balance -= amount;
        Ok(())
    }

    /// Move value between two addresses atomically (debit checked first).
    pub fn transfer(&mut self, from: &str, to: &str, amount: u128) -> Result<(), ChainError> {
        self.debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    /// Bump the nonce after a transaction from `address` is applied.
    pub fn bump_nonce(&mut self, address: &str) {
        let entry = self.accounts.entry(address.to_string()).or_default();
        entry.nonce += 1;
    }

    /// Total wei across all accounts (conservation checks in tests)
    pub fn total_balance(&self) -> u128 {
        self.accounts.values().map(|a| a.balance).sum()
    }
}

// ─────────────────────────────────────────────────────────────────
// TRANSACTIONS
// ─────────────────────────────────────────────────────────────────

/// Which of the two sale-system contracts a Deploy targets.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContractName {
    Land,
    LandSale,
}

impl std::fmt::Display for ContractName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ContractName::Land => write!(f, "land"),
            ContractName::LandSale => write!(f, "land_sale"),
        }
    }
}

// Externally tagged on purpose: serde buffers the content of internally
// tagged enums, which cannot carry u128 amounts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    /// Plain value transfer. Paying the sale contract's address is the
    /// purchase entry point (the payable-default analog).
    Transfer { to: String, amount_wei: u128 },
    /// Deploy one of the two contracts. Land takes its six constructor
    /// args in order; LandSale takes none.
    Deploy {
        contract: ContractName,
        args: Vec<String>,
    },
    /// Invoke a state-changing contract method.
    Call {
        contract: String,
        method: String,
        args: Vec<String>,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Sender address — must match the address derived from the
    /// envelope's public key.
    pub from: String,
    /// Must equal the sender account's current nonce.
    pub nonce: u64,
    pub kind: TxKind,
}

impl Transaction {
    /// Canonical bytes covered by the envelope signature and tx hash.
    /// Struct fields serialize in declaration order, so the encoding is
    /// stable across node and clients.
    pub fn signing_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("transaction serialization cannot fail")
    }

    /// Hex SHA3-256 of the canonical payload bytes.
    pub fn hash(&self) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(self.signing_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Signed transaction envelope submitted to the node.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignedTransaction {
    pub payload: Transaction,
    /// Hex-encoded Ed25519 public key of the sender
    pub public_key: String,
    /// Hex-encoded Ed25519 signature over the canonical payload bytes
    pub signature: String,
}

impl SignedTransaction {
    /// Verify the signature and that the claimed sender address matches
    /// the signing key.
    pub fn verify(&self) -> Result<(), ChainError> {
        let pk = hex::decode(&self.public_key).map_err(|_| ChainError::InvalidSignature)?;
        let sig = hex::decode(&self.signature).map_err(|_| ChainError::InvalidSignature)?;
        if !land_crypto::verify_signature(&self.payload.signing_bytes(), &sig, &pk) {
            return Err(ChainError::InvalidSignature);
        }
        if land_crypto::public_key_to_address(&pk) != self.payload.from {
            return Err(ChainError::BadTransaction(
                "sender address does not match signing key".to_string(),
            ));
        }
        Ok(())
    }
}

/// Receipt of an applied transaction.
///
/// The dev chain does not charge gas (functional mode); `gas_used` is
/// reported for client compatibility and is always 0.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Receipt {
    pub tx_hash: String,
    pub height: u64,
    pub gas_used: u64,
    /// Method-specific output (minted token ids, payout list, ...)
    pub output: serde_json::Value,
}
