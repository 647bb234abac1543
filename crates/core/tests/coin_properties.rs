//! Property-based tests for coin and fee arithmetic
//!
//! Fee totals are computed independently on every validating node, so the
//! merge must not depend on the order fees arrive in.

use chainfee_core::{Coin, Coins, Fee, FeeDistributeType};
use proptest::prelude::*;

fn coin_strategy() -> impl Strategy<Value = Coin> {
    (prop::sample::select(vec!["ABC", "BNB", "ETH", "XYZ"]), 1i64..1_000_000)
        .prop_map(|(denom, amount)| Coin::new(denom, amount))
}

fn coins_strategy() -> impl Strategy<Value = Coins> {
    prop::collection::vec(coin_strategy(), 0..6).prop_map(|v| Coins::new(v).unwrap())
}

fn fee_type_strategy() -> impl Strategy<Value = FeeDistributeType> {
    prop_oneof![
        Just(FeeDistributeType::ForProposer),
        Just(FeeDistributeType::ForAll),
        Just(FeeDistributeType::Free),
    ]
}

proptest! {
    /// Property: coin addition is commutative
    #[test]
    fn prop_coins_add_commutative(a in coins_strategy(), b in coins_strategy()) {
        prop_assert_eq!(a.checked_add(&b).unwrap(), b.checked_add(&a).unwrap());
    }

    /// Property: coin addition is associative
    #[test]
    fn prop_coins_add_associative(
        a in coins_strategy(),
        b in coins_strategy(),
        c in coins_strategy()
    ) {
        let left = a.checked_add(&b).unwrap().checked_add(&c).unwrap();
        let right = a.checked_add(&b.checked_add(&c).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }

    /// Property: merged coins stay sorted with unique denominations
    #[test]
    fn prop_coins_sorted_unique(a in coins_strategy(), b in coins_strategy()) {
        let sum = a.checked_add(&b).unwrap();
        let denoms: Vec<&str> = sum.iter().map(|c| c.denom.as_str()).collect();
        let mut sorted = denoms.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(denoms, sorted);
        for coin in &sum {
            prop_assert_eq!(coin.amount, a.amount_of(&coin.denom) + b.amount_of(&coin.denom));
        }
    }

    /// Property: fee totals do not depend on arrival order
    #[test]
    fn prop_fee_total_order_independent(
        fees in prop::collection::vec((coins_strategy(), fee_type_strategy()), 0..8)
    ) {
        let fees: Vec<Fee> = fees.into_iter().map(|(c, t)| Fee::new(c, t)).collect();

        let mut forward = Fee::free();
        for fee in &fees {
            forward.add_fee(fee).unwrap();
        }
        let mut backward = Fee::free();
        for fee in fees.iter().rev() {
            backward.add_fee(fee).unwrap();
        }

        prop_assert_eq!(forward.tokens(), backward.tokens());
        if fees.iter().any(|f| !f.is_empty() && f.fee_type() == FeeDistributeType::ForAll) {
            prop_assert_eq!(forward.fee_type(), FeeDistributeType::ForAll);
            prop_assert_eq!(backward.fee_type(), FeeDistributeType::ForAll);
        }
    }
}
