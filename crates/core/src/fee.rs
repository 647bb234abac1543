use crate::{Coin, Coins, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How collected fees are later distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeeDistributeType {
    /// Paid to the block proposer only
    ForProposer,
    /// Shared among all validators that voted on the block
    ForAll,
    /// Nothing is charged
    #[default]
    Free,
}

impl fmt::Display for FeeDistributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeDistributeType::ForProposer => write!(f, "for_proposer"),
            FeeDistributeType::ForAll => write!(f, "for_all"),
            FeeDistributeType::Free => write!(f, "free"),
        }
    }
}

/// A fee: the tokens charged and how they are distributed.
///
/// A `Free` fee never carries tokens; [`Fee::new`] drops them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fee {
    tokens: Coins,
    #[serde(rename = "type")]
    fee_type: FeeDistributeType,
}

impl Fee {
    /// Creates a fee. Tokens passed with [`FeeDistributeType::Free`] are discarded.
    pub fn new(tokens: Coins, fee_type: FeeDistributeType) -> Self {
        let tokens = match fee_type {
            FeeDistributeType::Free => Coins::empty(),
            _ => tokens,
        };
        Self { tokens, fee_type }
    }

    /// The zero fee
    pub fn free() -> Self {
        Self::new(Coins::empty(), FeeDistributeType::Free)
    }

    /// A fee of a single coin
    pub fn single(denom: impl Into<String>, amount: i64, fee_type: FeeDistributeType) -> Self {
        Self::new(Coins::from_coin(Coin::new(denom, amount)), fee_type)
    }

    /// Tokens charged
    pub fn tokens(&self) -> &Coins {
        &self.tokens
    }

    /// Distribution type
    pub fn fee_type(&self) -> FeeDistributeType {
        self.fee_type
    }

    /// Checks if the fee charges nothing
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Folds `other` into this fee.
    ///
    /// Empty fees are the identity. Otherwise tokens are merged by
    /// denomination and `ForAll` wins over `ForProposer`, so a block that
    /// collected any shared fee is distributed to all validators.
    pub fn add_fee(&mut self, other: &Fee) -> Result<()> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            self.tokens = other.tokens.clone();
            self.fee_type = other.fee_type;
            return Ok(());
        }
        self.tokens = self.tokens.checked_add(&other.tokens)?;
        if other.fee_type == FeeDistributeType::ForAll {
            self.fee_type = FeeDistributeType::ForAll;
        }
        Ok(())
    }
}

impl fmt::Display for Fee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens)
    }
}
