//! Coin amounts and their textual form (`"10atom,5stake"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing coin strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinsError {
    #[error("invalid coin expression '{0}'")]
    Malformed(String),

    #[error("invalid denomination '{0}': expected 3-16 lowercase alphanumerics starting with a letter")]
    InvalidDenom(String),

    #[error("duplicate denomination '{0}'")]
    Duplicate(String),
}

/// A single denomination and amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "amount_string")]
    pub amount: u128,
}

/// Amounts travel as decimal strings so values above `u64::MAX` survive JSON.
mod amount_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

impl Coin {
    pub fn new(amount: u128, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = CoinsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| CoinsError::Malformed(s.to_string()))?;
        let (digits, denom) = s.split_at(split);
        if digits.is_empty() {
            return Err(CoinsError::Malformed(s.to_string()));
        }
        let amount = digits
            .parse::<u128>()
            .map_err(|_| CoinsError::Malformed(s.to_string()))?;
        if !is_valid_denom(denom) {
            return Err(CoinsError::InvalidDenom(denom.to_string()));
        }
        Ok(Coin::new(amount, denom))
    }
}

fn is_valid_denom(denom: &str) -> bool {
    let len_ok = (3..=16).contains(&denom.len());
    let first_ok = denom.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_ok = denom
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    len_ok && first_ok && rest_ok
}

/// A set of coins, sorted by denomination with no duplicates.
///
/// Deserialization goes through [`Coins::new`], so ledger responses hold the
/// same invariants as parsed input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Build a coin set, sorting by denomination and rejecting duplicates.
    pub fn new(mut coins: Vec<Coin>) -> Result<Self, CoinsError> {
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        for pair in coins.windows(2) {
            if pair[0].denom == pair[1].denom {
                return Err(CoinsError::Duplicate(pair[0].denom.clone()));
            }
        }
        Ok(Self(coins))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    /// Amount held of one denomination (zero if absent).
    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or(0)
    }

    /// True when the set is non-empty and every amount is above zero.
    pub fn is_positive(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|c| c.amount > 0)
    }

    /// True when `self` holds at least `other` of every denomination in `other`.
    pub fn is_gte(&self, other: &Coins) -> bool {
        other.iter().all(|c| self.amount_of(&c.denom) >= c.amount)
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = CoinsError;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        Coins::new(coins)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", coin)?;
        }
        Ok(())
    }
}

impl FromStr for Coins {
    type Err = CoinsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Coins::default());
        }
        let coins = s
            .split(',')
            .map(str::parse::<Coin>)
            .collect::<Result<Vec<_>, _>>()?;
        Coins::new(coins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sorts_by_denom() {
        let coins: Coins = "5stake, 10atom".parse().unwrap();
        assert_eq!(coins.to_string(), "10atom,5stake");
        assert_eq!(coins.amount_of("stake"), 5);
        assert_eq!(coins.amount_of("mycoin"), 0);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "atom".parse::<Coins>(),
            Err(CoinsError::Malformed(_))
        ));
        assert!(matches!(
            "10".parse::<Coins>(),
            Err(CoinsError::Malformed(_))
        ));
        assert!(matches!(
            "10AT".parse::<Coins>(),
            Err(CoinsError::InvalidDenom(_))
        ));
        assert!(matches!(
            "1atom,2atom".parse::<Coins>(),
            Err(CoinsError::Duplicate(_))
        ));
    }

    #[test]
    fn test_empty_string_is_empty_set() {
        let coins: Coins = "".parse().unwrap();
        assert!(coins.is_empty());
        assert!(!coins.is_positive());
    }

    #[test]
    fn test_is_gte() {
        let balance: Coins = "100atom,3stake".parse().unwrap();
        assert!(balance.is_gte(&"10atom".parse().unwrap()));
        assert!(balance.is_gte(&"100atom,3stake".parse().unwrap()));
        assert!(!balance.is_gte(&"4stake".parse().unwrap()));
        assert!(!balance.is_gte(&"1gold".parse().unwrap()));
    }

    #[test]
    fn test_json_amounts_are_strings() {
        let coins: Coins = "340282366920938463463374607431768211455atom".parse().unwrap();
        let json = serde_json::to_string(&coins).unwrap();
        assert_eq!(
            json,
            r#"[{"denom":"atom","amount":"340282366920938463463374607431768211455"}]"#
        );
        let decoded: Coins = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, coins);
    }

    #[test]
    fn test_json_duplicates_are_rejected() {
        let json = r#"[{"denom":"atom","amount":"1"},{"denom":"atom","amount":"2"}]"#;
        let err = serde_json::from_str::<Coins>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate denomination 'atom'"));
    }

    #[test]
    fn test_json_input_is_sorted() {
        let json = r#"[{"denom":"stake","amount":"5"},{"denom":"atom","amount":"10"}]"#;
        let coins: Coins = serde_json::from_str(json).unwrap();
        assert_eq!(coins.to_string(), "10atom,5stake");
        assert!(coins.is_gte(&"10atom".parse().unwrap()));
    }

    #[test]
    fn test_zero_amount_is_not_positive() {
        let coins: Coins = "0atom".parse().unwrap();
        assert!(!coins.is_positive());
    }
}
