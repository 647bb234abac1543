use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// An amount of a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Token symbol
    pub denom: String,
    /// Amount in the token's smallest unit
    pub amount: i64,
}

impl Coin {
    /// Creates a new coin.
    pub fn new(denom: impl Into<String>, amount: i64) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Checks if the coin holds nothing
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A set of coins kept sorted by denomination.
///
/// Invariants: no two entries share a denomination, no entry is zero, and
/// entries are ordered by `denom`. Every constructor normalizes its input so
/// that two `Coins` holding the same amounts compare equal and iterate in the
/// same order on every node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Creates an empty set.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Builds a normalized set, summing duplicate denominations.
    pub fn new(coins: Vec<Coin>) -> Result<Self> {
        let mut result = Coins::empty();
        for coin in coins {
            if coin.denom.is_empty() || coin.denom.chars().any(char::is_whitespace) {
                return Err(CoreError::InvalidDenom(coin.denom));
            }
            result = result.checked_add(&Coins(vec![coin]))?;
        }
        Ok(result)
    }

    /// A set holding a single coin, or nothing if the coin is zero.
    pub fn from_coin(coin: Coin) -> Self {
        if coin.is_zero() {
            Coins::empty()
        } else {
            Coins(vec![coin])
        }
    }

    /// Checks if the set holds no coins
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct denominations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates coins in denomination order
    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.0.iter()
    }

    /// Coins as a slice
    pub fn as_slice(&self) -> &[Coin] {
        &self.0
    }

    /// Amount held of `denom`, zero if absent
    pub fn amount_of(&self, denom: &str) -> i64 {
        self.0
            .binary_search_by(|c| c.denom.as_str().cmp(denom))
            .map(|i| self.0[i].amount)
            .unwrap_or(0)
    }

    /// Multiset union by denomination.
    ///
    /// Same-denomination amounts are summed; entries summing to zero are
    /// dropped. Fails instead of wrapping when a sum overflows.
    pub fn checked_add(&self, other: &Coins) -> Result<Coins> {
        let mut merged = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut left, mut right) = (self.0.iter().peekable(), other.0.iter().peekable());

        loop {
            let next = match (left.peek(), right.peek()) {
                (Some(a), Some(b)) => match a.denom.cmp(&b.denom) {
                    Ordering::Less => left.next().cloned(),
                    Ordering::Greater => right.next().cloned(),
                    Ordering::Equal => {
                        let amount = a.amount.checked_add(b.amount).ok_or_else(|| {
                            CoreError::AmountOverflow {
                                denom: a.denom.clone(),
                                left: a.amount,
                                right: b.amount,
                            }
                        })?;
                        let denom = a.denom.clone();
                        left.next();
                        right.next();
                        Some(Coin::new(denom, amount))
                    }
                },
                (Some(_), None) => left.next().cloned(),
                (None, Some(_)) => right.next().cloned(),
                (None, None) => break,
            };
            if let Some(coin) = next {
                if !coin.is_zero() {
                    merged.push(coin);
                }
            }
        }

        Ok(Coins(merged))
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = CoreError;

    fn try_from(coins: Vec<Coin>) -> Result<Self> {
        Coins::new(coins)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", coin)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_and_merges() {
        let coins = Coins::new(vec![
            Coin::new("XYZ", 5),
            Coin::new("BNB", 10),
            Coin::new("XYZ", 7),
        ])
        .unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins.as_slice()[0], Coin::new("BNB", 10));
        assert_eq!(coins.as_slice()[1], Coin::new("XYZ", 12));
    }

    #[test]
    fn test_zero_coins_dropped() {
        assert!(Coins::from_coin(Coin::new("BNB", 0)).is_empty());
        let coins = Coins::new(vec![Coin::new("BNB", 0), Coin::new("ABC", 1)]).unwrap();
        assert_eq!(coins.len(), 1);
        assert_eq!(coins.amount_of("BNB"), 0);
        assert_eq!(coins.amount_of("ABC"), 1);
    }

    #[test]
    fn test_invalid_denom() {
        assert_eq!(
            Coins::new(vec![Coin::new("", 1)]),
            Err(CoreError::InvalidDenom(String::new()))
        );
        assert!(Coins::new(vec![Coin::new("B NB", 1)]).is_err());
    }

    #[test]
    fn test_checked_add_disjoint_and_shared() {
        let a = Coins::new(vec![Coin::new("BNB", 10), Coin::new("ETH", 1)]).unwrap();
        let b = Coins::new(vec![Coin::new("ABC", 3), Coin::new("BNB", 5)]).unwrap();
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.to_string(), "3ABC,15BNB,1ETH");
        assert_eq!(sum, b.checked_add(&a).unwrap());
    }

    #[test]
    fn test_checked_add_overflow() {
        let a = Coins::from_coin(Coin::new("BNB", i64::MAX));
        let b = Coins::from_coin(Coin::new("BNB", 1));
        assert!(matches!(
            a.checked_add(&b),
            Err(CoreError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn test_serde_normalizes() {
        let coins: Coins =
            serde_json::from_str(r#"[{"denom":"XYZ","amount":1},{"denom":"ABC","amount":2}]"#)
                .unwrap();
        assert_eq!(coins.to_string(), "2ABC,1XYZ");
        let json = serde_json::to_string(&coins).unwrap();
        assert_eq!(
            json,
            r#"[{"denom":"ABC","amount":2},{"denom":"XYZ","amount":1}]"#
        );
    }
}
