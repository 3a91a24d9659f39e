// SPDX-License-Identifier: AGPL-3.0-only
//! # Land DAO client SDK
//!
//! Async client for the dev-chain node: a thin [`RpcClient`] over the
//! REST API, a mnemonic [`Wallet`] deriving the same accounts the node
//! seeds at genesis, typed handles for the two contracts, and the
//! deployment sequence ([`deploy::deploy_and_link`]).
//!
//! A transaction the chain rejects surfaces as [`SdkError::Rpc`], so
//! callers (and tests) can assert rejection paths without inspecting
//! response bodies.

use land_core::{ContractName, Receipt, SignedTransaction, Transaction, TxKind};
use land_crypto::KeyPair;
use serde_json::Value;

pub mod contracts;
pub mod deploy;

pub use contracts::{AllowanceView, LandHandle, SaleHandle};
pub use deploy::{deploy_and_link, Deployment};

#[derive(Debug)]
pub enum SdkError {
    /// Transport-level failure (connection refused, timeout, ...)
    Http(String),
    /// The node answered with an error envelope — transaction reverts
    /// and other rejections land here
    Rpc { code: u16, msg: String },
    /// The node answered, but not in the expected shape
    Decode(String),
    Crypto(String),
}

impl std::fmt::Display for SdkError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SdkError::Http(msg) => write!(f, "HTTP error: {}", msg),
            SdkError::Rpc { code, msg } => write!(f, "Node error ({}): {}", code, msg),
            SdkError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
            SdkError::Crypto(msg) => write!(f, "Crypto error: {}", msg),
        }
    }
}

impl std::error::Error for SdkError {}

impl SdkError {
    /// True when the node rejected the request (as opposed to transport
    /// or decoding trouble) — the transaction-revert assertion hook.
    pub fn is_rejection(&self) -> bool {
        matches!(self, SdkError::Rpc { .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// WALLET
// ─────────────────────────────────────────────────────────────────

/// A keypair bound to its derived address; signs transactions.
pub struct Signer {
    pub keypair: KeyPair,
    pub address: String,
}

impl Signer {
    pub fn new(keypair: KeyPair) -> Self {
        let address = land_crypto::public_key_to_address(&keypair.public_key);
        Self { keypair, address }
    }
}

/// Client-side account derivation from a mnemonic — the counterpart of
/// the node's genesis seeding. Account indexes line up with the node's.
pub struct Wallet {
    pub signers: Vec<Signer>,
}

impl Wallet {
    pub fn from_mnemonic(phrase: &str, count: u32) -> Result<Self, SdkError> {
        let keypairs = land_crypto::derive_dev_accounts(phrase, count)
            .map_err(|e| SdkError::Crypto(e.to_string()))?;
        Ok(Self {
            signers: keypairs.into_iter().map(Signer::new).collect(),
        })
    }

    pub fn signer(&self, index: usize) -> &Signer {
        &self.signers[index]
    }
}

/// Sign a transaction payload into the envelope the node accepts.
pub fn sign_transaction(payload: Transaction, keypair: &KeyPair) -> Result<SignedTransaction, SdkError> {
    let signature = land_crypto::sign_message(&payload.signing_bytes(), &keypair.secret_key)
        .map_err(|e| SdkError::Crypto(e.to_string()))?;
    Ok(SignedTransaction {
        public_key: hex::encode(&keypair.public_key),
        signature: hex::encode(&signature),
        payload,
    })
}

// ─────────────────────────────────────────────────────────────────
// RPC CLIENT
// ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
}

impl RpcClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Unwrap the node's uniform envelope; error envelopes become
    /// `SdkError::Rpc`.
    fn unpack(status: u16, body: Value) -> Result<Value, SdkError> {
        if body.get("status").and_then(|s| s.as_str()) == Some("error") {
            let code = body
                .get("code")
                .and_then(|c| c.as_u64())
                .unwrap_or(status as u64) as u16;
            let msg = body
                .get("msg")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown node error")
                .to_string();
            return Err(SdkError::Rpc { code, msg });
        }
        Ok(body)
    }

    async fn get_json(&self, path: &str) -> Result<Value, SdkError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| SdkError::Http(e.to_string()))?;
        let status = resp.status().as_u16();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| SdkError::Decode(e.to_string()))?;
        Self::unpack(status, body)
    }

    async fn post_json<T: serde::Serialize>(&self, path: &str, payload: &T) -> Result<Value, SdkError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(payload)
            .send()
            .await
            .map_err(|e| SdkError::Http(e.to_string()))?;
        let status = resp.status().as_u16();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| SdkError::Decode(e.to_string()))?;
        Self::unpack(status, body)
    }

    pub async fn node_info(&self) -> Result<Value, SdkError> {
        self.get_json("/node-info").await
    }

    pub async fn accounts(&self) -> Result<Vec<String>, SdkError> {
        let body = self.get_json("/accounts").await?;
        serde_json::from_value(body["accounts"].clone())
            .map_err(|e| SdkError::Decode(e.to_string()))
    }

    pub async fn balance(&self, address: &str) -> Result<u128, SdkError> {
        let body = self.get_json(&format!("/bal/{}", address)).await?;
        parse_wei(&body["balance_wei"])
    }

    pub async fn nonce(&self, address: &str) -> Result<u64, SdkError> {
        let body = self.get_json(&format!("/bal/{}", address)).await?;
        body["nonce"]
            .as_u64()
            .ok_or_else(|| SdkError::Decode("missing nonce".to_string()))
    }

    pub async fn send(&self, signed: &SignedTransaction) -> Result<Receipt, SdkError> {
        let body = self.post_json("/send", signed).await?;
        serde_json::from_value(body["receipt"].clone())
            .map_err(|e| SdkError::Decode(e.to_string()))
    }

    pub async fn view(&self, contract: &str, method: &str, args: &[&str]) -> Result<Value, SdkError> {
        let body = self
            .post_json(
                "/view",
                &serde_json::json!({
                    "contract": contract,
                    "method": method,
                    "args": args,
                }),
            )
            .await?;
        Ok(body["result"].clone())
    }

    pub async fn contract(&self, address: &str) -> Result<Value, SdkError> {
        let body = self.get_json(&format!("/contract/{}", address)).await?;
        Ok(body["contract"].clone())
    }

    pub async fn receipt(&self, tx_hash: &str) -> Result<Receipt, SdkError> {
        let body = self.get_json(&format!("/receipt/{}", tx_hash)).await?;
        serde_json::from_value(body["receipt"].clone())
            .map_err(|e| SdkError::Decode(e.to_string()))
    }

    /// Fetch the signer's nonce, sign `kind`, submit, return the receipt.
    pub async fn send_signed(&self, signer: &Signer, kind: TxKind) -> Result<Receipt, SdkError> {
        let nonce = self.nonce(&signer.address).await?;
        let payload = Transaction {
            from: signer.address.clone(),
            nonce,
            kind,
        };
        let signed = sign_transaction(payload, &signer.keypair)?;
        self.send(&signed).await
    }

    /// Plain value transfer — also the purchase entry point when `to`
    /// is the sale contract's address.
    pub async fn transfer(
        &self,
        signer: &Signer,
        to: &str,
        amount_wei: u128,
    ) -> Result<Receipt, SdkError> {
        self.send_signed(
            signer,
            TxKind::Transfer {
                to: to.to_string(),
                amount_wei,
            },
        )
        .await
    }

    /// State-changing contract call.
    pub async fn call(
        &self,
        signer: &Signer,
        contract: &str,
        method: &str,
        args: &[&str],
    ) -> Result<Receipt, SdkError> {
        self.send_signed(
            signer,
            TxKind::Call {
                contract: contract.to_string(),
                method: method.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
            },
        )
        .await
    }

    /// Deploy one of the two contracts; returns its assigned address.
    pub async fn deploy(
        &self,
        signer: &Signer,
        contract: ContractName,
        args: Vec<String>,
    ) -> Result<String, SdkError> {
        let receipt = self
            .send_signed(signer, TxKind::Deploy { contract, args })
            .await?;
        receipt.output["address"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| SdkError::Decode("deploy receipt without address".to_string()))
    }
}

/// Parse a decimal-string wei amount out of a response field.
pub(crate) fn parse_wei(value: &Value) -> Result<u128, SdkError> {
    value
        .as_str()
        .and_then(|s| s.parse::<u128>().ok())
        .ok_or_else(|| SdkError::Decode(format!("expected wei string, got {}", value)))
}
