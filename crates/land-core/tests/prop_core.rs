// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROPERTY-BASED TESTS — land-core
//
// Mathematical invariants of the fund-split and ledger arithmetic that
// MUST hold for ALL inputs. proptest generates thousands of random
// inputs per property.
//
// Run: cargo test --release -p land-core --test prop_core
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use land_core::{
    split_purchase, Ledger, BPS_DENOMINATOR, REFUND_DIVISOR, RESERVE_SHARE_BPS, WEI_PER_ETHER,
};
use proptest::prelude::*;

/// Largest plausible purchase: the full 256-token supply at 1000 ether each.
const MAX_PURCHASE_WEI: u128 = 256_000 * WEI_PER_ETHER;

proptest! {
    // ─────────────────────────────────────────────────────────────────
    // FUND-SPLIT PROPERTIES
    // ─────────────────────────────────────────────────────────────────

    /// The three split parts always sum to the payment — no wei is
    /// created or destroyed by the split.
    #[test]
    fn prop_split_conserves_value(value in 0u128..=MAX_PURCHASE_WEI) {
        let split = split_purchase(value);
        prop_assert_eq!(split.reserve + split.unlocked + split.locked, value);
    }

    /// The reserve share never exceeds its basis-point fraction.
    #[test]
    fn prop_reserve_share_bounded(value in 0u128..=MAX_PURCHASE_WEI) {
        let split = split_purchase(value);
        prop_assert!(split.reserve <= value * RESERVE_SHARE_BPS / BPS_DENOMINATOR);
        prop_assert!(split.reserve * BPS_DENOMINATOR <= value * RESERVE_SHARE_BPS);
    }

    /// Unlocked and locked differ by at most one wei (the odd remainder),
    /// and locked always gets the odd wei.
    #[test]
    fn prop_unlocked_locked_balanced(value in 0u128..=MAX_PURCHASE_WEI) {
        let split = split_purchase(value);
        prop_assert!(split.locked >= split.unlocked);
        prop_assert!(split.locked - split.unlocked <= 1);
    }

    /// A half-price refund of a unit price is always covered by that
    /// unit's locked + reserve contribution (locked alone is 47.5%,
    /// so the shortfall against the 50% refund sits inside the reserve).
    #[test]
    fn prop_refund_covered(price in 2u128..=1_000 * WEI_PER_ETHER) {
        let split = split_purchase(price);
        prop_assert!(price / REFUND_DIVISOR <= split.locked + split.reserve);
    }

    // ─────────────────────────────────────────────────────────────────
    // LEDGER PROPERTIES
    // ─────────────────────────────────────────────────────────────────

    /// Transfers conserve the total wei supply.
    #[test]
    fn prop_transfer_conserves_supply(
        funding in 1u128..=MAX_PURCHASE_WEI,
        amount in 0u128..=MAX_PURCHASE_WEI,
    ) {
        let mut ledger = Ledger::new();
        ledger.credit("LNDalice", funding);
        let before = ledger.total_balance();
        let _ = ledger.transfer("LNDalice", "LNDbob", amount);
        prop_assert_eq!(ledger.total_balance(), before);
    }

    /// A failed transfer leaves both balances untouched.
    #[test]
    fn prop_failed_transfer_is_noop(
        funding in 0u128..=1_000,
        excess in 1u128..=1_000,
    ) {
        let mut ledger = Ledger::new();
        ledger.credit("LNDalice", funding);
        let result = ledger.transfer("LNDalice", "LNDbob", funding + excess);
        prop_assert!(result.is_err());
        prop_assert_eq!(ledger.balance("LNDalice"), funding);
        prop_assert_eq!(ledger.balance("LNDbob"), 0);
    }
}
