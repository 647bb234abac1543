//! End-of-block fee distribution.
//!
//! Consumes the committed block total and credits it to the block proposer
//! or splits it across every validator that signed the block.

use crate::{Error, Result};
use chainfee_core::{Coin, Coins, Fee, FeeDistributeType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Account identifier in the external account store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Wraps an address string
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Returns the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Account store that receives distributed fees.
pub trait FeeRecipientLedger {
    /// Adds `coins` to the balance of `account`. A failed credit must leave
    /// the balance unchanged.
    fn credit(&mut self, account: &AccountAddress, coins: &Coins) -> Result<()>;
}

/// In-memory account store, used by tests and embedders without a real store.
#[derive(Debug, Default)]
pub struct MemoryFeeLedger {
    balances: HashMap<AccountAddress, Coins>,
}

impl MemoryFeeLedger {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `account`, empty if never credited
    pub fn balance(&self, account: &AccountAddress) -> Coins {
        self.balances.get(account).cloned().unwrap_or_default()
    }

    /// Number of accounts with a balance
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Checks if nothing has been credited
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl FeeRecipientLedger for MemoryFeeLedger {
    fn credit(&mut self, account: &AccountAddress, coins: &Coins) -> Result<()> {
        let balance = self.balances.entry(account.clone()).or_default();
        *balance = balance.checked_add(coins)?;
        Ok(())
    }
}

/// Block facts needed to pay out fees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockContext {
    /// Block height
    pub height: u64,
    /// Proposer of the block
    pub proposer: AccountAddress,
    /// Validators that signed the block; may include the proposer
    pub voters: Vec<AccountAddress>,
}

impl BlockContext {
    /// Creates a block context
    pub fn new(height: u64, proposer: AccountAddress, voters: Vec<AccountAddress>) -> Self {
        Self {
            height,
            proposer,
            voters,
        }
    }
}

/// Published summary of a block's fee payout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFeeRecord {
    /// Block height
    pub height: u64,
    /// Distributed tokens, rendered as `"{amount}{denom}"` joined by commas
    pub fee: String,
    /// Credited validators, proposer first
    pub validators: Vec<AccountAddress>,
}

/// Credits of one block payout, in the order they are applied.
///
/// Applying stops at the first failed credit and remembers how far it got,
/// so applying again resumes with that credit and never pays a recipient
/// twice. Each recipient appears once; the proposer comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutPlan {
    record: BlockFeeRecord,
    credits: Vec<(AccountAddress, Coins)>,
    applied: usize,
}

impl PayoutPlan {
    /// Plans the payout of `fee` according to its distribution type.
    ///
    /// `ForAll` splits each token evenly across the voters and gives the
    /// rounding remainder to the proposer. If there are no voters, or every
    /// share rounds to zero, the proposer takes the whole fee. The record
    /// lists the credited validators only when `publish` is set.
    pub fn new(fee: &Fee, ctx: &BlockContext, publish: bool) -> Result<Self> {
        let credits = if fee.is_empty() {
            Vec::new()
        } else {
            match fee.fee_type() {
                FeeDistributeType::ForAll => split_for_all(fee.tokens(), ctx)?,
                // Free fees carry no tokens; anything else goes to the proposer.
                FeeDistributeType::ForProposer | FeeDistributeType::Free => {
                    vec![(ctx.proposer.clone(), fee.tokens().clone())]
                }
            }
        };

        let validators = if publish {
            credits.iter().map(|(account, _)| account.clone()).collect()
        } else {
            Vec::new()
        };
        Ok(Self {
            record: BlockFeeRecord {
                height: ctx.height,
                fee: fee.tokens().to_string(),
                validators,
            },
            credits,
            applied: 0,
        })
    }

    /// Height of the block being paid out
    pub fn height(&self) -> u64 {
        self.record.height
    }

    /// Every planned credit, applied or not
    pub fn credits(&self) -> &[(AccountAddress, Coins)] {
        &self.credits
    }

    /// Number of credits not yet applied
    pub fn remaining(&self) -> usize {
        self.credits.len() - self.applied
    }

    /// Checks if every credit has been applied
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Applies the outstanding credits in order.
    pub fn apply<L: FeeRecipientLedger + ?Sized>(&mut self, ledger: &mut L) -> Result<BlockFeeRecord> {
        if self.credits.is_empty() {
            debug!(height = self.record.height, "no fees to distribute");
            return Ok(self.record.clone());
        }

        while let Some((account, coins)) = self.credits.get(self.applied) {
            ledger.credit(account, coins)?;
            self.applied += 1;
        }

        info!(
            height = self.record.height,
            fee = %self.record.fee,
            recipients = self.credits.len(),
            "distributed block fees"
        );
        Ok(self.record.clone())
    }
}

/// Plans and applies the payout of `fee` in one go.
///
/// See [`PayoutPlan::new`] for the split. Callers that need to retry a failed
/// payout keep the [`PayoutPlan`] instead.
pub fn distribute_fee<L: FeeRecipientLedger + ?Sized>(
    fee: &Fee,
    ctx: &BlockContext,
    ledger: &mut L,
    publish: bool,
) -> Result<BlockFeeRecord> {
    PayoutPlan::new(fee, ctx, publish)?.apply(ledger)
}

fn split_for_all(tokens: &Coins, ctx: &BlockContext) -> Result<Vec<(AccountAddress, Coins)>> {
    let voters = ctx.voters.len() as i64;
    if voters == 0 {
        return Ok(vec![(ctx.proposer.clone(), tokens.clone())]);
    }

    let mut averages = Vec::with_capacity(tokens.len());
    let mut remainders = Vec::with_capacity(tokens.len());
    for coin in tokens {
        let average = coin.amount / voters;
        averages.push(Coin::new(coin.denom.clone(), average));
        remainders.push(Coin::new(coin.denom.clone(), coin.amount - average * voters));
    }
    let averages = Coins::new(averages).map_err(Error::from)?;
    let remainders = Coins::new(remainders).map_err(Error::from)?;

    if averages.is_empty() {
        return Ok(vec![(ctx.proposer.clone(), tokens.clone())]);
    }

    let mut credits: IndexMap<AccountAddress, Coins> = IndexMap::new();
    credits.insert(ctx.proposer.clone(), remainders);
    for voter in &ctx.voters {
        let owed = credits.entry(voter.clone()).or_default();
        *owed = owed.checked_add(&averages)?;
    }
    Ok(credits
        .into_iter()
        .filter(|(_, coins)| !coins.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> AccountAddress {
        AccountAddress::new(s)
    }

    fn ctx(voters: &[&str]) -> BlockContext {
        BlockContext::new(7, addr("val0"), voters.iter().map(|v| addr(v)).collect())
    }

    #[test]
    fn test_empty_fee_credits_nobody() {
        let mut ledger = MemoryFeeLedger::new();
        let record = distribute_fee(&Fee::free(), &ctx(&["val0", "val1"]), &mut ledger, true)
            .unwrap();
        assert!(ledger.is_empty());
        assert!(record.validators.is_empty());
        assert_eq!(record.fee, "");
    }

    #[test]
    fn test_for_proposer() {
        let mut ledger = MemoryFeeLedger::new();
        let fee = Fee::single("BNB", 100, FeeDistributeType::ForProposer);
        let record =
            distribute_fee(&fee, &ctx(&["val0", "val1"]), &mut ledger, true).unwrap();
        assert_eq!(ledger.balance(&addr("val0")).amount_of("BNB"), 100);
        assert!(ledger.balance(&addr("val1")).is_empty());
        assert_eq!(record.validators, vec![addr("val0")]);
        assert_eq!(record.fee, "100BNB");
    }

    #[test]
    fn test_for_all_remainder_goes_to_proposer() {
        let mut ledger = MemoryFeeLedger::new();
        let fee = Fee::single("BNB", 100, FeeDistributeType::ForAll);
        let record = distribute_fee(&fee, &ctx(&["val0", "val1", "val2"]), &mut ledger, true)
            .unwrap();
        assert_eq!(ledger.balance(&addr("val0")).amount_of("BNB"), 34);
        assert_eq!(ledger.balance(&addr("val1")).amount_of("BNB"), 33);
        assert_eq!(ledger.balance(&addr("val2")).amount_of("BNB"), 33);
        assert_eq!(record.validators, vec![addr("val0"), addr("val1"), addr("val2")]);
    }

    #[test]
    fn test_for_all_proposer_not_voting_still_gets_remainder() {
        let mut ledger = MemoryFeeLedger::new();
        let fee = Fee::single("BNB", 10, FeeDistributeType::ForAll);
        distribute_fee(&fee, &ctx(&["val1", "val2", "val3"]), &mut ledger, false).unwrap();
        assert_eq!(ledger.balance(&addr("val0")).amount_of("BNB"), 1);
        assert_eq!(ledger.balance(&addr("val1")).amount_of("BNB"), 3);
        assert_eq!(ledger.balance(&addr("val3")).amount_of("BNB"), 3);
    }

    #[test]
    fn test_for_all_tiny_fee_goes_to_proposer() {
        let mut ledger = MemoryFeeLedger::new();
        let fee = Fee::single("BNB", 2, FeeDistributeType::ForAll);
        let record = distribute_fee(&fee, &ctx(&["val0", "val1", "val2"]), &mut ledger, true)
            .unwrap();
        assert_eq!(ledger.balance(&addr("val0")).amount_of("BNB"), 2);
        assert_eq!(ledger.len(), 1);
        assert_eq!(record.validators, vec![addr("val0")]);
    }

    #[test]
    fn test_for_all_without_voters() {
        let mut ledger = MemoryFeeLedger::new();
        let fee = Fee::single("BNB", 9, FeeDistributeType::ForAll);
        distribute_fee(&fee, &ctx(&[]), &mut ledger, true).unwrap();
        assert_eq!(ledger.balance(&addr("val0")).amount_of("BNB"), 9);
    }

    #[test]
    fn test_unpublished_record_lists_no_validators() {
        let mut ledger = MemoryFeeLedger::new();
        let fee = Fee::single("BNB", 5, FeeDistributeType::ForProposer);
        let record = distribute_fee(&fee, &ctx(&["val0"]), &mut ledger, false).unwrap();
        assert_eq!(record.height, 7);
        assert!(record.validators.is_empty());
    }

    #[test]
    fn test_failing_store_surfaces_error() {
        struct Offline;
        impl FeeRecipientLedger for Offline {
            fn credit(&mut self, _: &AccountAddress, _: &Coins) -> Result<()> {
                Err(Error::Distribution("store offline".to_string()))
            }
        }
        let fee = Fee::single("BNB", 5, FeeDistributeType::ForProposer);
        let err = distribute_fee(&fee, &ctx(&["val0"]), &mut Offline, true).unwrap_err();
        assert!(!err.is_fatal());
    }

    /// Refuses the first credit to one account, then accepts everything.
    struct FlakyLedger {
        inner: MemoryFeeLedger,
        refuse: Option<AccountAddress>,
    }

    impl FeeRecipientLedger for FlakyLedger {
        fn credit(&mut self, account: &AccountAddress, coins: &Coins) -> Result<()> {
            if self.refuse.as_ref() == Some(account) {
                self.refuse = None;
                return Err(Error::Distribution(format!("{account} locked")));
            }
            self.inner.credit(account, coins)
        }
    }

    #[test]
    fn test_retried_payout_pays_each_recipient_once() {
        let mut ledger = FlakyLedger {
            inner: MemoryFeeLedger::new(),
            refuse: Some(addr("val1")),
        };
        let fee = Fee::single("BNB", 30, FeeDistributeType::ForAll);
        let mut plan = PayoutPlan::new(&fee, &ctx(&["val0", "val1", "val2"]), true).unwrap();
        assert_eq!(plan.remaining(), 3);

        assert!(plan.apply(&mut ledger).is_err());
        assert_eq!(plan.remaining(), 2);
        assert_eq!(ledger.inner.balance(&addr("val0")).amount_of("BNB"), 10);

        let record = plan.apply(&mut ledger).unwrap();
        assert!(plan.is_complete());
        assert_eq!(record.fee, "30BNB");

        let paid: i64 = ["val0", "val1", "val2"]
            .iter()
            .map(|v| ledger.inner.balance(&addr(v)).amount_of("BNB"))
            .sum();
        assert_eq!(paid, 30);
        assert_eq!(ledger.inner.balance(&addr("val1")).amount_of("BNB"), 10);

        // Nothing left to pay on a further apply.
        plan.apply(&mut ledger).unwrap();
        assert_eq!(ledger.inner.balance(&addr("val2")).amount_of("BNB"), 10);
    }

    #[test]
    fn test_plan_merges_proposer_share_and_remainder() {
        let fee = Fee::single("BNB", 100, FeeDistributeType::ForAll);
        let plan = PayoutPlan::new(&fee, &ctx(&["val1", "val0", "val2"]), false).unwrap();
        let credits: Vec<(&str, i64)> = plan
            .credits()
            .iter()
            .map(|(account, coins)| (account.as_str(), coins.amount_of("BNB")))
            .collect();
        assert_eq!(credits, vec![("val0", 34), ("val1", 33), ("val2", 33)]);
        assert_eq!(plan.height(), 7);
    }
}
