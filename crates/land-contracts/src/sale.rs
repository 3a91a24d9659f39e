// SPDX-License-Identifier: AGPL-3.0-only
//! # LandSale contract
//!
//! Sale logic for the Land token: per-address purchase allowances, a
//! three-way fund split on every payment, withdraw payouts to the
//! configured funds addresses, and half-price refunds drawn from the
//! locked pool.
//!
//! Funds slots: slot 0 is the treasury (paid the 5% reserve), slots
//! 1..=4 are founders sharing the 47.5% unlocked pool a quarter each.
//! The remaining 47.5% stays locked until `funds_unlock_timestamp`,
//! at which point it rolls into the founder accrual on the next
//! withdraw. Refunds draw from the locked pool while it lasts.
//!
//! ## Exported methods
//! | Method                      | Args                        | Access        |
//! |-----------------------------|-----------------------------|---------------|
//! | `token_contract`            | (none)                      | view          |
//! | `funds_addresses`           | index                       | view          |
//! | `funds_unlock_timestamp`    | (none)                      | view          |
//! | `allowance`                 | address                     | view          |
//! | `reserve_funds`             | (none)                      | view          |
//! | `unlocked_funds`            | (none)                      | view          |
//! | `locked_funds`              | (none)                      | view          |
//! | `set_token_contract`        | address                     | owner         |
//! | `set_funds_address`         | index, address              | owner         |
//! | `set_funds_unlock_timestamp`| timestamp                   | owner         |
//! | `set_allowance`             | address, count, price       | owner         |
//! | `batch_set_allowances`      | addresses, counts, prices   | owner         |
//! | `withdraw`                  | (none)                      | owner / funds |
//! | `refund`                    | (none)                      | last buyer    |
//!
//! The purchase entry point is not a method: it is a plain payment to
//! the sale's address, routed here by the chain executor.

use crate::{arg, parse_u128, parse_u64};
use land_core::{split_purchase, FOUNDER_SLOTS, FUNDS_ADDRESS_COUNT, REFUND_DIVISOR};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// A whitelisted address's remaining purchase count and per-unit price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowance {
    pub count: u64,
    pub price: u128,
}

/// One minted token and the unit price paid for it; the refund path
/// consumes these newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PurchaseRecord {
    token_id: u64,
    buyer: String,
    unit_price: u128,
}

/// Validated purchase, ready to apply.
#[derive(Debug, Clone, Copy)]
pub struct PurchaseQuote {
    pub token_count: u64,
    pub unit_price: u128,
}

/// Validated refund, ready to apply.
#[derive(Debug, Clone, Copy)]
pub struct RefundQuote {
    pub token_id: u64,
    pub amount: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandSale {
    owner: String,
    token_contract: Option<String>,
    funds_addresses: [Option<String>; FUNDS_ADDRESS_COUNT],
    /// 0 = never unlocks
    funds_unlock_timestamp: u64,
    allowances: BTreeMap<String, Allowance>,
    /// Owed to the treasury (slot 0)
    owed_reserve: u128,
    /// Owed per founder slot (slots 1..=4); quarter of every unlocked
    /// accrual each, remainder wei to the last slot
    owed_founder: [u128; FOUNDER_SLOTS],
    /// Pool refunds draw from; rolls into the founder accrual once the
    /// unlock timestamp has passed
    locked_funds: u128,
    purchases: Vec<PurchaseRecord>,
}

impl LandSale {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            token_contract: None,
            funds_addresses: Default::default(),
            funds_unlock_timestamp: 0,
            allowances: BTreeMap::new(),
            owed_reserve: 0,
            owed_founder: [0; FOUNDER_SLOTS],
            locked_funds: 0,
            purchases: Vec::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn token_contract(&self) -> Option<&str> {
        self.token_contract.as_deref()
    }

    pub fn funds_address(&self, index: usize) -> Result<Option<&str>, String> {
        if index >= FUNDS_ADDRESS_COUNT {
            return Err(format!(
                "funds address index {} out of range (0..{})",
                index, FUNDS_ADDRESS_COUNT
            ));
        }
        Ok(self.funds_addresses[index].as_deref())
    }

    pub fn funds_unlock_timestamp(&self) -> u64 {
        self.funds_unlock_timestamp
    }

    /// Allowance of an address (zero for addresses never whitelisted).
    pub fn allowance(&self, address: &str) -> Allowance {
        self.allowances.get(address).copied().unwrap_or_default()
    }

    pub fn reserve_funds(&self) -> u128 {
        self.owed_reserve
    }

    pub fn unlocked_funds(&self) -> u128 {
        self.owed_founder.iter().sum()
    }

    pub fn locked_funds(&self) -> u128 {
        self.locked_funds
    }

    fn require_owner(&self, caller: &str) -> Result<(), String> {
        if caller != self.owner {
            return Err("caller is not the contract owner".to_string());
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────
    // OWNER CONFIGURATION
    // ─────────────────────────────────────────────────────────────────

    pub fn set_token_contract(&mut self, caller: &str, address: &str) -> Result<(), String> {
        self.require_owner(caller)?;
        if address.is_empty() {
            return Err("token contract address must be set".to_string());
        }
        self.token_contract = Some(address.to_string());
        Ok(())
    }

    pub fn set_funds_address(
        &mut self,
        caller: &str,
        index: usize,
        address: &str,
    ) -> Result<(), String> {
        self.require_owner(caller)?;
        if index >= FUNDS_ADDRESS_COUNT {
            return Err(format!(
                "funds address index {} out of range (0..{})",
                index, FUNDS_ADDRESS_COUNT
            ));
        }
        if !land_crypto::validate_address(address) {
            return Err(format!("'{}' is not a valid address", address));
        }
        self.funds_addresses[index] = Some(address.to_string());
        Ok(())
    }

    pub fn set_funds_unlock_timestamp(&mut self, caller: &str, timestamp: u64) -> Result<(), String> {
        self.require_owner(caller)?;
        self.funds_unlock_timestamp = timestamp;
        Ok(())
    }

    pub fn set_allowance(
        &mut self,
        caller: &str,
        address: &str,
        count: u64,
        price: u128,
    ) -> Result<(), String> {
        self.require_owner(caller)?;
        if !land_crypto::validate_address(address) {
            return Err(format!("'{}' is not a valid address", address));
        }
        self.allowances
            .insert(address.to_string(), Allowance { count, price });
        Ok(())
    }

    pub fn batch_set_allowances(
        &mut self,
        caller: &str,
        addresses: &[String],
        counts: &[u64],
        prices: &[u128],
    ) -> Result<(), String> {
        self.require_owner(caller)?;
        if addresses.is_empty() {
            return Err("empty allowance batch".to_string());
        }
        if addresses.len() != counts.len() || addresses.len() != prices.len() {
            return Err(format!(
                "allowance batch length mismatch: {} addresses, {} counts, {} prices",
                addresses.len(),
                counts.len(),
                prices.len()
            ));
        }
        for address in addresses {
            if !land_crypto::validate_address(address) {
                return Err(format!("'{}' is not a valid address", address));
            }
        }
        for ((address, count), price) in addresses.iter().zip(counts).zip(prices) {
            self.allowances.insert(
                address.clone(),
                Allowance {
                    count: *count,
                    price: *price,
                },
            );
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────
    // PURCHASE
    // ─────────────────────────────────────────────────────────────────

    /// Validate a payment against the buyer's allowance. No state change.
    pub fn quote_purchase(&self, buyer: &str, value: u128) -> Result<PurchaseQuote, String> {
        let allowance = self.allowance(buyer);
        if allowance.count == 0 {
            return Err("address is not whitelisted for purchase".to_string());
        }
        if allowance.price == 0 {
            return Err("no token price set for address".to_string());
        }
        if value < allowance.price {
            return Err("payment is below the token price".to_string());
        }
        if value % allowance.price != 0 {
            return Err("payment must be a multiple of the token price".to_string());
        }
        let token_count = (value / allowance.price) as u64;
        if token_count > allowance.count {
            return Err(format!(
                "payment covers {} tokens but only {} remain allowed",
                token_count, allowance.count
            ));
        }
        Ok(PurchaseQuote {
            token_count,
            unit_price: allowance.price,
        })
    }

    /// Apply a validated purchase: consume the allowance, accrue the fund
    /// split per unit, and log each minted token for refund accounting.
    /// `minted_ids` comes from the token contract, one id per unit.
    pub fn apply_purchase(&mut self, buyer: &str, quote: PurchaseQuote, minted_ids: &[u64]) {
        debug_assert_eq!(minted_ids.len() as u64, quote.token_count);
        if let Some(allowance) = self.allowances.get_mut(buyer) {
            allowance.count = allowance.count.saturating_sub(quote.token_count);
        }
        for token_id in minted_ids {
            let split = split_purchase(quote.unit_price);
            self.owed_reserve += split.reserve;
            self.accrue_founders(split.unlocked);
            self.locked_funds += split.locked;
            self.purchases.push(PurchaseRecord {
                token_id: *token_id,
                buyer: buyer.to_string(),
                unit_price: quote.unit_price,
            });
        }
    }

    /// Quarter of `amount` to each founder slot; the sub-quarter
    /// remainder lands in the last slot so the pool total stays exact.
    fn accrue_founders(&mut self, amount: u128) {
        for slot in 0..FOUNDER_SLOTS {
            self.owed_founder[slot] += founder_share(amount, slot);
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // WITHDRAW
    // ─────────────────────────────────────────────────────────────────

    /// Pay out owed funds. Returns the (recipient, amount) transfers the
    /// executor must settle from the sale's balance.
    ///
    /// - owner: sweep — the treasury is paid the reserve pool and every
    ///   configured founder slot its accrued share; both pools zero.
    ///   Shares of unconfigured slots stay in the contract balance.
    /// - treasury / founder address: paid its own owed amount.
    /// - a caller with nothing owed is rejected.
    pub fn withdraw(&mut self, caller: &str, now: u64) -> Result<Vec<(String, u128)>, String> {
        // Locked money past the unlock timestamp counts as founder money.
        // Validation happens against the would-be pools; nothing commits
        // until the call is known to succeed.
        let release = self.pending_release(now);

        if caller == self.owner {
            if self.owed_reserve + self.unlocked_funds() + release == 0 {
                return Err("no funds owed".to_string());
            }
            self.commit_release(release);

            let mut payouts = Vec::new();
            if self.owed_reserve > 0 {
                if let Some(treasury) = &self.funds_addresses[0] {
                    payouts.push((treasury.clone(), self.owed_reserve));
                }
                self.owed_reserve = 0;
            }
            for (slot, owed) in self.owed_founder.iter_mut().enumerate() {
                if *owed > 0 {
                    if let Some(founder) = &self.funds_addresses[slot + 1] {
                        payouts.push((founder.clone(), *owed));
                    }
                    *owed = 0;
                }
            }
            return Ok(payouts);
        }

        let slot = self
            .funds_addresses
            .iter()
            .position(|a| a.as_deref() == Some(caller))
            .ok_or_else(|| "caller is not a funds address".to_string())?;

        let owed = if slot == 0 {
            self.owed_reserve
        } else {
            self.owed_founder[slot - 1] + founder_share(release, slot - 1)
        };
        if owed == 0 {
            return Err("no funds owed to caller".to_string());
        }

        self.commit_release(release);
        if slot == 0 {
            self.owed_reserve = 0;
        } else {
            self.owed_founder[slot - 1] = 0;
        }
        Ok(vec![(caller.to_string(), owed)])
    }

    /// Locked pool amount that the unlock timestamp has released.
    fn pending_release(&self, now: u64) -> u128 {
        if self.funds_unlock_timestamp != 0 && now >= self.funds_unlock_timestamp {
            self.locked_funds
        } else {
            0
        }
    }

    /// Fold released locked funds into the founder accrual.
    fn commit_release(&mut self, release: u128) {
        if release > 0 {
            self.locked_funds -= release;
            self.accrue_founders(release);
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // REFUND
    // ─────────────────────────────────────────────────────────────────

    /// Validate a refund request from `caller`. The most recently minted
    /// token must be theirs, and the locked pool must cover half its
    /// recorded unit price. No state change.
    pub fn quote_refund(&self, caller: &str) -> Result<RefundQuote, String> {
        let last = self
            .purchases
            .last()
            .ok_or_else(|| "no tokens outstanding".to_string())?;
        if last.buyer != caller {
            return Err("caller did not purchase the last minted token".to_string());
        }
        let amount = last.unit_price / REFUND_DIVISOR;
        if self.locked_funds < amount {
            return Err("locked funds cannot cover the refund".to_string());
        }
        Ok(RefundQuote {
            token_id: last.token_id,
            amount,
        })
    }

    /// Apply a validated refund: drop the purchase record and draw the
    /// refund from the locked pool.
    pub fn apply_refund(&mut self, quote: RefundQuote) {
        self.purchases.pop();
        self.locked_funds -= quote.amount;
    }

    // ─────────────────────────────────────────────────────────────────
    // DISPATCH
    // ─────────────────────────────────────────────────────────────────

    /// Read-only method dispatch. Amounts are returned as decimal
    /// strings; wei values overflow JSON numbers.
    pub fn view(&self, method: &str, args: &[String]) -> Result<Value, String> {
        match method {
            "token_contract" => Ok(json!(self.token_contract)),
            "funds_addresses" => {
                let index = parse_u64(arg(args, 0, "index")?)? as usize;
                Ok(json!(self.funds_address(index)?))
            }
            "funds_unlock_timestamp" => Ok(json!(self.funds_unlock_timestamp)),
            "allowance" => {
                let allowance = self.allowance(arg(args, 0, "address")?);
                Ok(json!({
                    "count": allowance.count,
                    "price": allowance.price.to_string(),
                }))
            }
            "reserve_funds" => Ok(json!(self.reserve_funds().to_string())),
            "unlocked_funds" => Ok(json!(self.unlocked_funds().to_string())),
            "locked_funds" => Ok(json!(self.locked_funds().to_string())),
            other => Err(format!("unknown sale view method '{}'", other)),
        }
    }

    /// State-changing method dispatch for the owner-gated configuration
    /// methods. `withdraw` and `refund` are handled by the chain executor
    /// because they settle balance transfers.
    pub fn execute(&mut self, caller: &str, method: &str, args: &[String]) -> Result<Value, String> {
        match method {
            "set_token_contract" => {
                self.set_token_contract(caller, arg(args, 0, "address")?)?;
                Ok(json!({"token_contract": self.token_contract}))
            }
            "set_funds_address" => {
                let index = parse_u64(arg(args, 0, "index")?)? as usize;
                self.set_funds_address(caller, index, arg(args, 1, "address")?)?;
                Ok(json!({"index": index, "address": self.funds_addresses[index]}))
            }
            "set_funds_unlock_timestamp" => {
                let timestamp = parse_u64(arg(args, 0, "timestamp")?)?;
                self.set_funds_unlock_timestamp(caller, timestamp)?;
                Ok(json!({"funds_unlock_timestamp": timestamp}))
            }
            "set_allowance" => {
                let address = arg(args, 0, "address")?;
                let count = parse_u64(arg(args, 1, "count")?)?;
                let price = parse_u128(arg(args, 2, "price")?)?;
                self.set_allowance(caller, address, count, price)?;
                Ok(json!({"address": address, "count": count, "price": price.to_string()}))
            }
            "batch_set_allowances" => {
                let addresses: Vec<String> = split_list(arg(args, 0, "addresses")?);
                let counts = split_list(arg(args, 1, "counts")?)
                    .iter()
                    .map(|s| parse_u64(s))
                    .collect::<Result<Vec<_>, _>>()?;
                let prices = split_list(arg(args, 2, "prices")?)
                    .iter()
                    .map(|s| parse_u128(s))
                    .collect::<Result<Vec<_>, _>>()?;
                self.batch_set_allowances(caller, &addresses, &counts, &prices)?;
                Ok(json!({"updated": addresses.len()}))
            }
            other => Err(format!("unknown sale method '{}'", other)),
        }
    }

    /// Contract summary for the node's registry routes.
    pub fn summary(&self, address: &str) -> Value {
        json!({
            "address": address,
            "kind": "land_sale",
            "owner": self.owner,
            "token_contract": self.token_contract,
            "funds_addresses": self.funds_addresses,
            "funds_unlock_timestamp": self.funds_unlock_timestamp,
            "whitelisted": self.allowances.len(),
            "reserve_funds": self.reserve_funds().to_string(),
            "unlocked_funds": self.unlocked_funds().to_string(),
            "locked_funds": self.locked_funds().to_string(),
            "tokens_sold": self.purchases.len(),
        })
    }
}

/// A founder slot's share of an unlocked accrual: a quarter each, with
/// the sub-quarter remainder going to the last slot.
fn founder_share(amount: u128, slot: usize) -> u128 {
    let quarter = amount / FOUNDER_SLOTS as u128;
    if slot == FOUNDER_SLOTS - 1 {
        quarter + amount % FOUNDER_SLOTS as u128
    } else {
        quarter
    }
}

/// Split a comma-separated batch list arg, trimming whitespace.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
