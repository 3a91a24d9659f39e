// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LAND DAO DEV NODE
//
// Local chain emulator for the token sale: REST API over an in-memory
// instant-finality chain seeded with mnemonic-derived dev accounts.
// The development analog of a real node — no consensus, no P2P, no
// persistence, by design.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use land_contracts::Chain;
use land_core::{ChainError, SignedTransaction, WEI_PER_ETHER};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use warp::Filter;

pub mod genesis;

/// Shared node state handed to every route.
#[derive(Clone)]
pub struct NodeState {
    pub chain: Arc<Mutex<Chain>>,
    /// Dev account addresses in derivation order
    pub accounts: Arc<Vec<String>>,
}

impl NodeState {
    pub fn new(chain: Chain, accounts: Vec<String>) -> Self {
        Self {
            chain: Arc::new(Mutex::new(chain)),
            accounts: Arc::new(accounts),
        }
    }
}

/// Safe mutex lock that recovers from poisoned state instead of panicking.
fn safe_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            eprintln!("⚠️ WARNING: Mutex was poisoned, recovering...");
            poisoned.into_inner()
        }
    }
}

/// JSON reply with an explicit status code, so clients can distinguish
/// rejections without parsing the body.
fn api_json(body: serde_json::Value) -> warp::reply::WithStatus<warp::reply::Json> {
    let code = body
        .get("code")
        .and_then(|c| c.as_u64())
        .unwrap_or(200) as u16;
    let status = warp::http::StatusCode::from_u16(code)
        .unwrap_or(warp::http::StatusCode::INTERNAL_SERVER_ERROR);
    warp::reply::with_status(warp::reply::json(&body), status)
}

fn api_error(code: u16, msg: String) -> warp::reply::WithStatus<warp::reply::Json> {
    api_json(serde_json::json!({
        "status": "error",
        "code": code,
        "msg": msg,
    }))
}

/// HTTP status for a chain error: rejections are client errors, missing
/// entities are 404.
fn error_status(err: &ChainError) -> u16 {
    match err {
        ChainError::UnknownContract(_) | ChainError::UnknownAccount(_) => 404,
        _ => 400,
    }
}

fn with_state<T: Clone + Send>(
    state: T,
) -> impl Filter<Extract = (T,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Wei → ether string with full 18-digit precision.
fn format_ether(wei: u128) -> String {
    format!("{}.{:018}", wei / WEI_PER_ETHER, wei % WEI_PER_ETHER)
}

#[derive(Deserialize)]
struct ViewRequest {
    contract: String,
    method: String,
    #[serde(default)]
    args: Vec<String>,
}

/// The node's full route table.
pub fn routes(
    state: NodeState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    // GET /node-info
    let s = state.clone();
    let node_info = warp::path("node-info")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(s))
        .map(|state: NodeState| {
            let chain = safe_lock(&state.chain);
            api_json(serde_json::json!({
                "status": "ok",
                "chain": "landchain-dev",
                "network_id": chain.config.network_id,
                "height": chain.height(),
                "gas_limit": chain.config.gas_limit,
                "gas_price_wei": chain.config.gas_price_wei.to_string(),
                "total_accounts": chain.config.total_accounts,
                "land": chain.land().map(|l| l.address.clone()),
                "land_sale": chain.sale().map(|s| s.address.clone()),
            }))
        });

    // GET /accounts
    let s = state.clone();
    let accounts_route = warp::path("accounts")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(s))
        .map(|state: NodeState| {
            api_json(serde_json::json!({
                "status": "ok",
                "accounts": &*state.accounts,
            }))
        });

    // GET /bal/:address
    let s = state.clone();
    let balance_route = warp::path!("bal" / String)
        .and(warp::get())
        .and(with_state(s))
        .map(|address: String, state: NodeState| {
            let chain = safe_lock(&state.chain);
            let balance = chain.ledger.balance(&address);
            api_json(serde_json::json!({
                "status": "ok",
                "address": address,
                "balance_wei": balance.to_string(),
                "balance_eth": format_ether(balance),
                "nonce": chain.ledger.nonce(&address),
            }))
        });

    // POST /send — signed transaction envelope
    let s = state.clone();
    let send_route = warp::path("send")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::bytes())
        .and(with_state(s))
        .map(|body: bytes::Bytes, state: NodeState| {
            let signed: SignedTransaction = match serde_json::from_slice(&body) {
                Ok(tx) => tx,
                Err(e) => return api_error(400, format!("Invalid request body: {}", e)),
            };
            let now = chrono::Utc::now().timestamp().max(0) as u64;
            let mut chain = safe_lock(&state.chain);
            match chain.submit(&signed, now) {
                Ok(receipt) => api_json(serde_json::json!({
                    "status": "ok",
                    "receipt": receipt,
                })),
                Err(e) => api_error(error_status(&e), e.to_string()),
            }
        });

    // POST /view — read-only contract query
    let s = state.clone();
    let view_route = warp::path("view")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::bytes())
        .and(with_state(s))
        .map(|body: bytes::Bytes, state: NodeState| {
            let req: ViewRequest = match serde_json::from_slice(&body) {
                Ok(r) => r,
                Err(e) => return api_error(400, format!("Invalid request body: {}", e)),
            };
            let chain = safe_lock(&state.chain);
            match chain.view(&req.contract, &req.method, &req.args) {
                Ok(result) => api_json(serde_json::json!({
                    "status": "ok",
                    "result": result,
                })),
                Err(e) => api_error(error_status(&e), e.to_string()),
            }
        });

    // GET /contracts
    let s = state.clone();
    let contracts_route = warp::path("contracts")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(s))
        .map(|state: NodeState| {
            let chain = safe_lock(&state.chain);
            api_json(serde_json::json!({
                "status": "ok",
                "contracts": chain.contract_summaries(),
            }))
        });

    // GET /contract/:address
    let s = state.clone();
    let contract_route = warp::path!("contract" / String)
        .and(warp::get())
        .and(with_state(s))
        .map(|address: String, state: NodeState| {
            let chain = safe_lock(&state.chain);
            match chain.contract_summary(&address) {
                Some(summary) => api_json(serde_json::json!({
                    "status": "ok",
                    "contract": summary,
                })),
                None => api_error(404, format!("Unknown contract: {}", address)),
            }
        });

    // GET /receipt/:hash
    let s = state.clone();
    let receipt_route = warp::path!("receipt" / String)
        .and(warp::get())
        .and(with_state(s))
        .map(|hash: String, state: NodeState| {
            let chain = safe_lock(&state.chain);
            match chain.receipt(&hash) {
                Some(receipt) => api_json(serde_json::json!({
                    "status": "ok",
                    "receipt": receipt,
                })),
                None => api_error(404, format!("Unknown transaction: {}", hash)),
            }
        });

    node_info
        .or(accounts_route)
        .or(balance_route)
        .or(send_route)
        .or(view_route)
        .or(contracts_route)
        .or(contract_route)
        .or(receipt_route)
}

/// Bind an ephemeral local port and serve in a background task.
/// Used by the test harness to boot a fresh chain per test.
pub fn spawn(state: NodeState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let (addr, server) = warp::serve(routes(state)).bind_ephemeral(([127, 0, 0, 1], 0));
    let handle = tokio::spawn(server);
    (addr, handle)
}

/// Serve on the configured host:port until shutdown (the binary path).
pub async fn run(state: NodeState, addr: SocketAddr) {
    warp::serve(routes(state)).run(addr).await;
}
