// SPDX-License-Identifier: AGPL-3.0-only
//! # Dev-chain executor
//!
//! Single-node, in-memory chain with instant finality hosting the two
//! sale-system contracts. Every submitted transaction is verified
//! (signature, sender address, account nonce), validated against
//! contract state, and then applied atomically — a revert leaves
//! nothing behind. Receipts are indexed by transaction hash.
//!
//! A plain value transfer to the sale contract's address is the
//! purchase entry point; the executor routes it through the sale's
//! allowance check and mints on the token contract, which only accepts
//! mint/burn calls attributed to the sale's address.

use crate::land::LandToken;
use crate::sale::LandSale;
use land_core::config::ChainConfig;
use land_core::{ChainError, ContractName, Ledger, Receipt, SignedTransaction, Transaction, TxKind};
use serde_json::{json, Value};
use sha3::{Digest, Sha3_256};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct DeployedLand {
    pub address: String,
    pub contract: LandToken,
}

#[derive(Debug, Clone)]
pub struct DeployedSale {
    pub address: String,
    pub contract: LandSale,
}

#[derive(Debug)]
pub struct Chain {
    pub config: ChainConfig,
    pub ledger: Ledger,
    land: Option<DeployedLand>,
    sale: Option<DeployedSale>,
    receipts: BTreeMap<String, Receipt>,
    /// Per-deployer deploy counter feeding contract address derivation
    deploy_nonces: BTreeMap<String, u64>,
    height: u64,
}

impl Chain {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            ledger: Ledger::new(),
            land: None,
            sale: None,
            receipts: BTreeMap::new(),
            deploy_nonces: BTreeMap::new(),
            height: 0,
        }
    }

    /// Credit a genesis account (dev-chain seeding).
    pub fn seed_account(&mut self, address: &str, balance_wei: u128) {
        self.ledger.credit(address, balance_wei);
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn land(&self) -> Option<&DeployedLand> {
        self.land.as_ref()
    }

    pub fn sale(&self) -> Option<&DeployedSale> {
        self.sale.as_ref()
    }

    pub fn receipt(&self, tx_hash: &str) -> Option<&Receipt> {
        self.receipts.get(tx_hash)
    }

    /// Summaries of the deployed contracts, sale first (deploy order).
    pub fn contract_summaries(&self) -> Vec<Value> {
        let mut out = Vec::new();
        if let Some(sale) = &self.sale {
            out.push(sale.contract.summary(&sale.address));
        }
        if let Some(land) = &self.land {
            out.push(land.contract.summary(&land.address));
        }
        out
    }

    pub fn contract_summary(&self, address: &str) -> Option<Value> {
        if let Some(sale) = &self.sale {
            if sale.address == address {
                return Some(sale.contract.summary(&sale.address));
            }
        }
        if let Some(land) = &self.land {
            if land.address == address {
                return Some(land.contract.summary(&land.address));
            }
        }
        None
    }

    /// Verify and apply one signed transaction. `now` is the chain's
    /// timestamp for this transaction (injected by the node so execution
    /// is deterministic and testable).
    pub fn submit(&mut self, signed: &SignedTransaction, now: u64) -> Result<Receipt, ChainError> {
        signed.verify()?;
        let tx = &signed.payload;

        let expected = self.ledger.nonce(&tx.from);
        if tx.nonce != expected {
            return Err(ChainError::BadNonce {
                account: tx.from.clone(),
                expected,
                got: tx.nonce,
            });
        }

        let output = self.dispatch(tx, now)?;

        self.ledger.bump_nonce(&tx.from);
        self.height += 1;
        let receipt = Receipt {
            tx_hash: tx.hash(),
            height: self.height,
            gas_used: 0,
            output,
        };
        self.receipts.insert(receipt.tx_hash.clone(), receipt.clone());
        Ok(receipt)
    }

    /// Read-only contract query — no signature, no state change.
    pub fn view(&self, contract: &str, method: &str, args: &[String]) -> Result<Value, ChainError> {
        if let Some(sale) = &self.sale {
            if sale.address == contract {
                return sale.contract.view(method, args).map_err(ChainError::Revert);
            }
        }
        if let Some(land) = &self.land {
            if land.address == contract {
                return land.contract.view(method, args).map_err(ChainError::Revert);
            }
        }
        Err(ChainError::UnknownContract(contract.to_string()))
    }

    fn dispatch(&mut self, tx: &Transaction, now: u64) -> Result<Value, ChainError> {
        match &tx.kind {
            TxKind::Transfer { to, amount_wei } => {
                if self.sale.as_ref().is_some_and(|s| &s.address == to) {
                    return self.purchase(&tx.from, *amount_wei);
                }
                if self.land.as_ref().is_some_and(|l| &l.address == to) {
                    return Err(ChainError::Revert(
                        "the token contract does not accept payments".to_string(),
                    ));
                }
                self.ledger.transfer(&tx.from, to, *amount_wei)?;
                Ok(json!({"to": to, "amount_wei": amount_wei.to_string()}))
            }
            TxKind::Deploy { contract, args } => self.deploy(&tx.from, *contract, args),
            TxKind::Call {
                contract,
                method,
                args,
            } => self.call(&tx.from, contract, method, args, now),
        }
    }

    /// Deterministic contract address: LNDCon + SHA3-256(deployer:nonce:height)
    fn next_contract_address(&mut self, deployer: &str) -> String {
        let nonce = self.deploy_nonces.entry(deployer.to_string()).or_insert(0);
        let input = format!("{}:{}:{}", deployer, nonce, self.height);
        *nonce += 1;
        let mut hasher = Sha3_256::new();
        hasher.update(input.as_bytes());
        let hash = hasher.finalize();
        format!("LNDCon{}", hex::encode(&hash[..16]))
    }

    fn deploy(
        &mut self,
        deployer: &str,
        contract: ContractName,
        args: &[String],
    ) -> Result<Value, ChainError> {
        if !self.ledger.accounts.contains_key(deployer) {
            return Err(ChainError::UnknownAccount(deployer.to_string()));
        }
        match contract {
            ContractName::LandSale => {
                if self.sale.is_some() {
                    return Err(ChainError::AlreadyDeployed("land_sale".to_string()));
                }
                if !args.is_empty() {
                    return Err(ChainError::Revert(
                        "land_sale constructor takes no args".to_string(),
                    ));
                }
                let address = self.next_contract_address(deployer);
                // The contract holds payments; give it a ledger account
                self.ledger.credit(&address, 0);
                self.sale = Some(DeployedSale {
                    address: address.clone(),
                    contract: LandSale::new(deployer),
                });
                Ok(json!({"contract": "land_sale", "address": address}))
            }
            ContractName::Land => {
                if self.land.is_some() {
                    return Err(ChainError::AlreadyDeployed("land".to_string()));
                }
                let address = self.next_contract_address(deployer);
                let token = LandToken::from_args(deployer, args).map_err(ChainError::Revert)?;
                self.ledger.credit(&address, 0);
                self.land = Some(DeployedLand {
                    address: address.clone(),
                    contract: token,
                });
                Ok(json!({"contract": "land", "address": address}))
            }
        }
    }

    fn call(
        &mut self,
        caller: &str,
        contract: &str,
        method: &str,
        args: &[String],
        now: u64,
    ) -> Result<Value, ChainError> {
        if self.sale.as_ref().is_some_and(|s| s.address == contract) {
            return match method {
                "withdraw" => self.withdraw(caller, now),
                "refund" => self.refund(caller),
                _ => {
                    let sale = self.sale.as_mut().expect("sale checked above");
                    sale.contract
                        .execute(caller, method, args)
                        .map_err(ChainError::Revert)
                }
            };
        }
        if let Some(land) = &mut self.land {
            if land.address == contract {
                return land
                    .contract
                    .execute(caller, method, args)
                    .map_err(ChainError::Revert);
            }
        }
        Err(ChainError::UnknownContract(contract.to_string()))
    }

    /// The payable default entry point: a payment to the sale address
    /// buys `value / unit_price` tokens. Everything is validated before
    /// any state moves.
    fn purchase(&mut self, buyer: &str, value: u128) -> Result<Value, ChainError> {
        let (sale, land) = match (&mut self.sale, &mut self.land) {
            (Some(sale), Some(land)) => (sale, land),
            _ => {
                return Err(ChainError::Revert(
                    "sale system is not fully deployed".to_string(),
                ))
            }
        };
        if sale.contract.token_contract() != Some(land.address.as_str()) {
            return Err(ChainError::Revert(
                "sale is not linked to the token contract".to_string(),
            ));
        }

        let quote = sale
            .contract
            .quote_purchase(buyer, value)
            .map_err(ChainError::Revert)?;
        if !land.contract.can_mint(quote.token_count) {
            return Err(ChainError::Revert(format!(
                "purchase of {} tokens exceeds the maximum supply",
                quote.token_count
            )));
        }

        // Validation done — settle the payment, then mint and record.
        self.ledger.transfer(buyer, &sale.address, value)?;
        let mut minted = Vec::with_capacity(quote.token_count as usize);
        for _ in 0..quote.token_count {
            let id = land
                .contract
                .mint(&sale.address, buyer)
                .map_err(ChainError::Revert)?;
            minted.push(id);
        }
        sale.contract.apply_purchase(buyer, quote, &minted);

        Ok(json!({
            "minted": minted,
            "token_count": quote.token_count,
            "unit_price": quote.unit_price.to_string(),
        }))
    }

    fn withdraw(&mut self, caller: &str, now: u64) -> Result<Value, ChainError> {
        let sale = self
            .sale
            .as_mut()
            .expect("withdraw dispatched on deployed sale");
        let sale_address = sale.address.clone();
        let payouts = sale
            .contract
            .withdraw(caller, now)
            .map_err(ChainError::Revert)?;
        // The pools only ever accrue from payments already credited to
        // the sale's account, so these transfers cannot overdraw.
        for (recipient, amount) in &payouts {
            self.ledger.transfer(&sale_address, recipient, *amount)?;
        }
        Ok(json!({
            "payouts": payouts
                .iter()
                .map(|(recipient, amount)| json!({
                    "recipient": recipient,
                    "amount_wei": amount.to_string(),
                }))
                .collect::<Vec<_>>(),
        }))
    }

    fn refund(&mut self, caller: &str) -> Result<Value, ChainError> {
        let (sale, land) = match (&mut self.sale, &mut self.land) {
            (Some(sale), Some(land)) => (sale, land),
            _ => {
                return Err(ChainError::Revert(
                    "sale system is not fully deployed".to_string(),
                ))
            }
        };
        let quote = sale
            .contract
            .quote_refund(caller)
            .map_err(ChainError::Revert)?;

        let burned = land
            .contract
            .burn_last(&sale.address)
            .map_err(ChainError::Revert)?;
        self.ledger.transfer(&sale.address, caller, quote.amount)?;
        sale.contract.apply_refund(quote);

        Ok(json!({
            "burned": burned,
            "refund_wei": quote.amount.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use land_core::config::SaleConfig;
    use land_core::WEI_PER_ETHER;
    use land_crypto::KeyPair;

    struct Account {
        keypair: KeyPair,
        address: String,
    }

    fn account(tag: u8) -> Account {
        let keypair = land_crypto::keypair_from_seed(&[tag; 32], 0);
        let address = land_crypto::public_key_to_address(&keypair.public_key);
        Account { keypair, address }
    }

    fn sign(chain: &Chain, from: &Account, kind: TxKind) -> SignedTransaction {
        let payload = Transaction {
            from: from.address.clone(),
            nonce: chain.ledger.nonce(&from.address),
            kind,
        };
        let signature =
            land_crypto::sign_message(&payload.signing_bytes(), &from.keypair.secret_key).unwrap();
        SignedTransaction {
            payload,
            public_key: hex::encode(&from.keypair.public_key),
            signature: hex::encode(&signature),
        }
    }

    fn submit(chain: &mut Chain, from: &Account, kind: TxKind) -> Result<Receipt, ChainError> {
        let signed = sign(chain, from, kind);
        chain.submit(&signed, 0)
    }

    fn call(
        chain: &mut Chain,
        from: &Account,
        contract: &str,
        method: &str,
        args: &[&str],
    ) -> Result<Receipt, ChainError> {
        submit(
            chain,
            from,
            TxKind::Call {
                contract: contract.to_string(),
                method: method.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    /// Deployed and linked sale system with funded accounts, the
    /// fixture every flow test starts from.
    fn deployed_chain() -> (Chain, Account, Account, String, String) {
        let owner = account(1);
        let buyer = account(2);
        let mut chain = Chain::new(ChainConfig::default());
        chain.seed_account(&owner.address, 1_000 * WEI_PER_ETHER);
        chain.seed_account(&buyer.address, 1_000 * WEI_PER_ETHER);

        let config = SaleConfig::default();
        submit(
            &mut chain,
            &owner,
            TxKind::Deploy {
                contract: ContractName::LandSale,
                args: vec![],
            },
        )
        .unwrap();
        let sale_addr = chain.sale().unwrap().address.clone();

        submit(
            &mut chain,
            &owner,
            TxKind::Deploy {
                contract: ContractName::Land,
                args: vec![
                    config.token_name.clone(),
                    config.token_symbol.clone(),
                    config.token_max_supply.to_string(),
                    config.token_contract_uri.clone(),
                    config.token_uri.clone(),
                    config.mainnet_proxy_registry_address.clone(),
                ],
            },
        )
        .unwrap();
        let land_addr = chain.land().unwrap().address.clone();

        call(&mut chain, &owner, &sale_addr, "set_token_contract", &[&land_addr]).unwrap();
        call(
            &mut chain,
            &owner,
            &land_addr,
            "set_logic_contract_address",
            &[&sale_addr],
        )
        .unwrap();
        (chain, owner, buyer, sale_addr, land_addr)
    }

    fn transfer(
        chain: &mut Chain,
        from: &Account,
        to: &str,
        amount_wei: u128,
    ) -> Result<Receipt, ChainError> {
        submit(
            chain,
            from,
            TxKind::Transfer {
                to: to.to_string(),
                amount_wei,
            },
        )
    }

    #[test]
    fn test_bad_nonce_rejected() {
        let alice = account(1);
        let bob = account(2);
        let mut chain = Chain::new(ChainConfig::default());
        chain.seed_account(&alice.address, 100);

        let mut signed = sign(
            &chain,
            &alice,
            TxKind::Transfer {
                to: bob.address.clone(),
                amount_wei: 1,
            },
        );
        signed.payload.nonce = 5;
        // Re-sign with the wrong nonce so only the nonce check trips
        signed.signature = hex::encode(
            land_crypto::sign_message(&signed.payload.signing_bytes(), &alice.keypair.secret_key)
                .unwrap(),
        );
        assert!(matches!(
            chain.submit(&signed, 0),
            Err(ChainError::BadNonce { .. })
        ));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let alice = account(1);
        let bob = account(2);
        let mut chain = Chain::new(ChainConfig::default());
        chain.seed_account(&alice.address, 100);

        let mut signed = sign(
            &chain,
            &alice,
            TxKind::Transfer {
                to: bob.address.clone(),
                amount_wei: 1,
            },
        );
        // Raise the amount after signing
        signed.payload.kind = TxKind::Transfer {
            to: bob.address.clone(),
            amount_wei: 100,
        };
        assert_eq!(chain.submit(&signed, 0), Err(ChainError::InvalidSignature));
        assert_eq!(chain.ledger.balance(&bob.address), 0);
    }

    #[test]
    fn test_plain_transfer_and_receipt() {
        let alice = account(1);
        let bob = account(2);
        let mut chain = Chain::new(ChainConfig::default());
        chain.seed_account(&alice.address, 100);

        let receipt = transfer(&mut chain, &alice, &bob.address, 40).unwrap();
        assert_eq!(receipt.height, 1);
        assert_eq!(receipt.gas_used, 0);
        assert_eq!(chain.ledger.balance(&bob.address), 40);
        assert_eq!(chain.receipt(&receipt.tx_hash).unwrap().height, 1);
    }

    #[test]
    fn test_deploy_twice_rejected() {
        let (mut chain, owner, ..) = deployed_chain();
        let err = submit(
            &mut chain,
            &owner,
            TxKind::Deploy {
                contract: ContractName::LandSale,
                args: vec![],
            },
        )
        .unwrap_err();
        assert!(matches!(err, ChainError::AlreadyDeployed(_)));
    }

    #[test]
    fn test_purchase_full_flow() {
        let (mut chain, owner, buyer, sale_addr, land_addr) = deployed_chain();
        let price = WEI_PER_ETHER;
        call(
            &mut chain,
            &owner,
            &sale_addr,
            "set_allowance",
            &[&buyer.address, "2", &price.to_string()],
        )
        .unwrap();

        let value = 2 * price;
        let buyer_before = chain.ledger.balance(&buyer.address);
        let receipt = transfer(&mut chain, &buyer, &sale_addr, value).unwrap();
        assert_eq!(receipt.output["minted"], json!([1, 2]));

        // Token state
        let land = &chain.land().unwrap().contract;
        assert_eq!(land.total_supply(), 2);
        assert_eq!(land.owner_of(2).unwrap(), buyer.address);

        // Balances moved into the sale account
        assert_eq!(chain.ledger.balance(&sale_addr), value);
        assert_eq!(chain.ledger.balance(&buyer.address), buyer_before - value);

        // Pools split 5 / 47.5 / 47.5
        let sale = &chain.sale().unwrap().contract;
        assert_eq!(sale.reserve_funds(), value / 20);
        assert_eq!(sale.unlocked_funds(), value * 95 / 200);
        assert_eq!(sale.locked_funds(), value * 95 / 200);
        assert_eq!(sale.allowance(&buyer.address).count, 0);

        // The view surface agrees
        assert_eq!(
            chain.view(&land_addr, "total_supply", &[]).unwrap(),
            json!(2)
        );
    }

    #[test]
    fn test_purchase_rejections_leave_state_untouched() {
        let (mut chain, owner, buyer, sale_addr, _) = deployed_chain();
        let price = WEI_PER_ETHER;

        // Not whitelisted
        let err = transfer(&mut chain, &buyer, &sale_addr, price).unwrap_err();
        assert!(matches!(err, ChainError::Revert(_)));

        call(
            &mut chain,
            &owner,
            &sale_addr,
            "set_allowance",
            &[&buyer.address, "1", &price.to_string()],
        )
        .unwrap();

        // Underpayment
        assert!(transfer(&mut chain, &buyer, &sale_addr, price / 1000).is_err());
        assert_eq!(chain.ledger.balance(&sale_addr), 0);
        assert_eq!(chain.land().unwrap().contract.total_supply(), 0);
    }

    #[test]
    fn test_withdraw_and_refund_settlement() {
        let (mut chain, owner, buyer, sale_addr, _) = deployed_chain();
        let treasury = account(3);
        let founder = account(4);
        chain.seed_account(&treasury.address, 0);
        chain.seed_account(&founder.address, 0);
        let price = WEI_PER_ETHER;

        call(&mut chain, &owner, &sale_addr, "set_funds_address", &["0", &treasury.address]).unwrap();
        call(&mut chain, &owner, &sale_addr, "set_funds_address", &["1", &founder.address]).unwrap();
        call(
            &mut chain,
            &owner,
            &sale_addr,
            "set_allowance",
            &[&buyer.address, "2", &price.to_string()],
        )
        .unwrap();
        transfer(&mut chain, &buyer, &sale_addr, 2 * price).unwrap();

        let value = 2 * price;
        let reserve = value / 20;
        let unlocked = value * 95 / 200;

        // Owner sweep settles real balances
        call(&mut chain, &owner, &sale_addr, "withdraw", &[]).unwrap();
        assert_eq!(chain.ledger.balance(&treasury.address), reserve);
        assert_eq!(chain.ledger.balance(&founder.address), unlocked / 4);
        assert_eq!(
            chain.ledger.balance(&sale_addr),
            value - reserve - unlocked / 4
        );

        // Refund burns the last token and returns half the unit price
        let buyer_before = chain.ledger.balance(&buyer.address);
        let locked_before = chain.sale().unwrap().contract.locked_funds();
        let receipt = call(&mut chain, &buyer, &sale_addr, "refund", &[]).unwrap();
        assert_eq!(receipt.output["burned"], json!(2));
        assert_eq!(
            chain.ledger.balance(&buyer.address),
            buyer_before + price / 2
        );
        assert_eq!(
            chain.sale().unwrap().contract.locked_funds(),
            locked_before - price / 2
        );
        assert_eq!(chain.land().unwrap().contract.total_supply(), 1);

        // Zero-owed funds address withdrawal is rejected
        let err = call(&mut chain, &treasury, &sale_addr, "withdraw", &[]).unwrap_err();
        assert_eq!(
            err,
            ChainError::Revert("no funds owed to caller".to_string())
        );
    }

    #[test]
    fn test_non_owner_admin_calls_rejected() {
        let (mut chain, _, buyer, sale_addr, land_addr) = deployed_chain();
        assert!(call(&mut chain, &buyer, &sale_addr, "set_funds_address", &["0", &buyer.address]).is_err());
        assert!(call(&mut chain, &buyer, &sale_addr, "set_funds_unlock_timestamp", &["1"]).is_err());
        assert!(call(&mut chain, &buyer, &land_addr, "set_contract_uri", &["ipfs://x"]).is_err());
        assert!(call(&mut chain, &buyer, &land_addr, "set_token_uri", &["ipfs://x"]).is_err());
    }

    #[test]
    fn test_wei_conservation_across_flows() {
        let (mut chain, owner, buyer, sale_addr, _) = deployed_chain();
        let treasury = account(3);
        chain.seed_account(&treasury.address, 0);
        let before = chain.ledger.total_balance();
        let price = WEI_PER_ETHER;

        call(&mut chain, &owner, &sale_addr, "set_funds_address", &["0", &treasury.address]).unwrap();
        call(
            &mut chain,
            &owner,
            &sale_addr,
            "set_allowance",
            &[&buyer.address, "1", &price.to_string()],
        )
        .unwrap();
        transfer(&mut chain, &buyer, &sale_addr, price).unwrap();
        call(&mut chain, &buyer, &sale_addr, "refund", &[]).unwrap();
        call(&mut chain, &owner, &sale_addr, "withdraw", &[]).unwrap();

        assert_eq!(chain.ledger.total_balance(), before);
    }
}
