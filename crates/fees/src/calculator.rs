//! Fee calculation policies.
//!
//! A calculator is a pure function from a message to the fee it owes. A
//! generator builds a calculator from a governance fee parameter so the
//! policy bound to a message type can be rebuilt whenever parameters change.

use crate::params::FeeParam;
use chainfee_core::{Fee, FeeDistributeType, Msg};
use std::sync::Arc;

/// Computes the fee owed by a message.
pub type FeeCalculator = Arc<dyn Fn(&dyn Msg) -> Fee + Send + Sync>;

/// Builds a calculator from the current fee parameter of a message type.
pub type FeeCalculatorGenerator = Arc<dyn Fn(&FeeParam) -> FeeCalculator + Send + Sync>;

/// Charges nothing, whatever the message.
pub fn free_fee_calculator() -> FeeCalculator {
    Arc::new(|_msg: &dyn Msg| Fee::free())
}

/// Charges a constant `amount` of `denom` under `fee_type`.
///
/// Degrades to [`free_fee_calculator`] when `fee_type` is `Free` or
/// `amount <= 0`: a misconfigured fee is never negative or undefined.
pub fn fixed_fee_calculator(
    amount: i64,
    fee_type: FeeDistributeType,
    denom: impl Into<String>,
) -> FeeCalculator {
    if fee_type == FeeDistributeType::Free || amount <= 0 {
        return free_fee_calculator();
    }
    let fee = Fee::single(denom, amount, fee_type);
    Arc::new(move |_msg: &dyn Msg| fee.clone())
}

/// Charges `multi_transfer_fee` per coin movement once a message moves at
/// least `lower_limit_as_multi` coins, and the flat `fee` otherwise.
///
/// Same degrade-to-free rule as [`fixed_fee_calculator`].
pub fn transfer_fee_calculator(
    fee: i64,
    multi_transfer_fee: i64,
    lower_limit_as_multi: i64,
    fee_type: FeeDistributeType,
    denom: impl Into<String>,
) -> FeeCalculator {
    if fee_type == FeeDistributeType::Free || fee <= 0 {
        return free_fee_calculator();
    }
    let denom = denom.into();
    Arc::new(move |msg: &dyn Msg| {
        let count = i64::try_from(msg.transfer_count()).unwrap_or(i64::MAX);
        let amount = if count >= lower_limit_as_multi {
            multi_transfer_fee.saturating_mul(count)
        } else {
            fee
        };
        if amount <= 0 {
            Fee::free()
        } else {
            Fee::single(denom.clone(), amount, fee_type)
        }
    })
}

/// Generator for fixed-fee message types.
///
/// Uses the fixed part of whatever parameter it is handed.
pub fn fixed_fee_calculator_gen(denom: impl Into<String>) -> FeeCalculatorGenerator {
    let denom = denom.into();
    Arc::new(move |param: &FeeParam| {
        let fixed = param.fixed();
        fixed_fee_calculator(fixed.fee, fixed.fee_for, denom.clone())
    })
}

/// Generator for transfer message types.
///
/// A plain fixed parameter yields a fixed calculator.
pub fn transfer_fee_calculator_gen(denom: impl Into<String>) -> FeeCalculatorGenerator {
    let denom = denom.into();
    Arc::new(move |param: &FeeParam| match param {
        FeeParam::Transfer(p) => transfer_fee_calculator(
            p.fixed.fee,
            p.multi_transfer_fee,
            p.lower_limit_as_multi,
            p.fixed.fee_for,
            denom.clone(),
        ),
        FeeParam::Fixed(p) => fixed_fee_calculator(p.fee, p.fee_for, denom.clone()),
    })
}
