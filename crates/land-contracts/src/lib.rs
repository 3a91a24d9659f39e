// SPDX-License-Identifier: AGPL-3.0-only
//! # Land DAO native contracts
//!
//! The two sale-system contracts as native Rust state machines, plus the
//! single-node dev-chain executor that hosts them:
//!
//! - [`LandToken`] — the capped-supply collectible token: metadata,
//!   owner-gated URI management, mint/burn restricted to the linked sale
//!   logic contract.
//! - [`LandSale`] — the sale logic: per-address purchase allowances,
//!   reserve/unlocked/locked fund splitting, withdraw payouts, half-price
//!   refunds against the locked pool.
//! - [`Chain`] — instant-finality executor: signature and nonce checks,
//!   deploys, purchase routing (a plain payment to the sale address), and
//!   receipts.
//!
//! Calls are dispatched by method name with decimal-string args and JSON
//! results; a rejected call surfaces as a transaction revert. All amounts
//! are u128 wei — no floating-point.

pub mod chain;
pub mod land;
pub mod sale;

pub use chain::{Chain, DeployedLand, DeployedSale};
pub use land::LandToken;
pub use sale::{Allowance, LandSale};

/// Parse a u128 from a decimal string arg. Rejects empty and non-digit input.
pub(crate) fn parse_u128(s: &str) -> Result<u128, String> {
    if s.is_empty() {
        return Err("empty amount".to_string());
    }
    s.parse::<u128>()
        .map_err(|_| format!("invalid amount '{}'", s))
}

/// Parse a u64 from a decimal string arg.
pub(crate) fn parse_u64(s: &str) -> Result<u64, String> {
    if s.is_empty() {
        return Err("empty number".to_string());
    }
    s.parse::<u64>().map_err(|_| format!("invalid number '{}'", s))
}

/// Fetch a required positional arg by name.
pub(crate) fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str, String> {
    args.get(index)
        .map(|s| s.as_str())
        .ok_or_else(|| format!("missing argument '{}'", name))
}
