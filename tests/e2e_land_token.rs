// ============================================================================
// E2E LAND TOKEN TEST — LAND DAO SALE
// ============================================================================
//
// Drives the deployed Land token over the node's REST API via the SDK:
// deployment state against the sale config, owner-only URI management,
// and rejection of unprivileged callers.
//
// Run: cargo test --test e2e_land_token
// ============================================================================

mod harness;

use harness::TestContext;

// ─────────────────────────────────────────────────────────────────
// STATE
// ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_token_state_matches_config() {
    let ctx = TestContext::bootstrap().await;

    assert_eq!(ctx.land.name().await.unwrap(), ctx.config.token_name);
    assert_eq!(ctx.land.symbol().await.unwrap(), ctx.config.token_symbol);
    assert_eq!(
        ctx.land.maximum_supply().await.unwrap(),
        ctx.config.token_max_supply
    );
    assert_eq!(
        ctx.land.contract_uri().await.unwrap(),
        ctx.config.token_contract_uri
    );
    assert_eq!(ctx.land.token_uri(0).await.unwrap(), ctx.config.token_uri);
    assert_eq!(ctx.land.total_supply().await.unwrap(), 0);
}

#[tokio::test]
async fn test_proxy_registry_is_the_local_placeholder() {
    let ctx = TestContext::bootstrap().await;
    // Local deployments carry the mainnet registry value as placeholder
    assert_eq!(
        ctx.land.proxy_registry_address().await.unwrap(),
        ctx.config.mainnet_proxy_registry_address
    );
}

#[tokio::test]
async fn test_sale_logic_contract_is_linked() {
    let ctx = TestContext::bootstrap().await;
    assert_eq!(
        ctx.land.logic_contract_address().await.unwrap().as_deref(),
        Some(ctx.sale.address.as_str())
    );
}

// ─────────────────────────────────────────────────────────────────
// OWNER METHODS
// ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_owner_sets_contract_uri() {
    let ctx = TestContext::bootstrap().await;
    ctx.land
        .set_contract_uri(ctx.primary_sender(), "ipfs://contract")
        .await
        .unwrap();
    assert_eq!(ctx.land.contract_uri().await.unwrap(), "ipfs://contract");
}

#[tokio::test]
async fn test_owner_sets_token_uri() {
    let ctx = TestContext::bootstrap().await;
    ctx.land
        .set_token_uri(ctx.primary_sender(), "ipfs://token")
        .await
        .unwrap();
    assert_eq!(ctx.land.token_uri(0).await.unwrap(), "ipfs://token");
}

// ─────────────────────────────────────────────────────────────────
// REJECTIONS
// ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_non_owner_cannot_set_contract_uri() {
    let ctx = TestContext::bootstrap().await;
    let err = ctx
        .land
        .set_contract_uri(ctx.secondary_sender(), "ipfs://contract")
        .await
        .unwrap_err();
    assert!(err.is_rejection(), "expected a revert, got: {}", err);
    // Nothing changed
    assert_eq!(
        ctx.land.contract_uri().await.unwrap(),
        ctx.config.token_contract_uri
    );
}

#[tokio::test]
async fn test_non_owner_cannot_set_token_uri() {
    let ctx = TestContext::bootstrap().await;
    let err = ctx
        .land
        .set_token_uri(ctx.secondary_sender(), "ipfs://token")
        .await
        .unwrap_err();
    assert!(err.is_rejection(), "expected a revert, got: {}", err);
    assert_eq!(ctx.land.token_uri(0).await.unwrap(), ctx.config.token_uri);
}

#[tokio::test]
async fn test_token_contract_rejects_plain_payments() {
    let ctx = TestContext::bootstrap().await;
    let err = ctx
        .client
        .transfer(ctx.primary_sender(), &ctx.land.address, 1)
        .await
        .unwrap_err();
    assert!(err.is_rejection(), "expected a revert, got: {}", err);
}
