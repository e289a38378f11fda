//! Account domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// A bank account owned by a user
///
/// Balances are held in minor currency units (cents). The balance is only
/// ever changed through the store's balance adjustment primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub account_number: AccountNumber,
    pub name: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Normalize and validate a display name
    pub fn normalize_name(name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("account name cannot be empty"));
        }
        Ok(trimmed.to_string())
    }
}

/// Externally visible account number
///
/// A bounded positive integer of at most 18 decimal digits. Text input is
/// decoded strictly (ASCII digits only) so that nothing is silently truncated
/// or coerced on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct AccountNumber(i64);

impl AccountNumber {
    /// Largest accepted account number (18 nines)
    pub const MAX: i64 = 999_999_999_999_999_999;

    /// Maximum number of decimal digits in the text form
    pub const MAX_DIGITS: usize = 18;

    pub fn new(value: i64) -> Result<Self> {
        if !(1..=Self::MAX).contains(&value) {
            return Err(Error::validation(format!(
                "account number must be between 1 and {}, got {}",
                Self::MAX,
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for AccountNumber {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AccountNumber> for i64 {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

impl FromStr for AccountNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::validation("account number cannot be empty"));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::validation(format!(
                "account number must contain only digits: {:?}",
                s
            )));
        }
        if s.len() > Self::MAX_DIGITS {
            return Err(Error::validation(format!(
                "account number has more than {} digits",
                Self::MAX_DIGITS
            )));
        }
        // At most 18 digits always fits in an i64
        let value: i64 = s
            .parse()
            .map_err(|_| Error::validation(format!("invalid account number: {:?}", s)))?;
        Self::new(value)
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_number() {
        let number: AccountNumber = "1234567890".parse().unwrap();
        assert_eq!(number.value(), 1_234_567_890);
        assert_eq!(number.to_string(), "1234567890");

        let max: AccountNumber = "999999999999999999".parse().unwrap();
        assert_eq!(max.value(), AccountNumber::MAX);
    }

    #[test]
    fn test_reject_malformed_account_numbers() {
        for input in ["", "0", "-5", "+5", " 12", "12 ", "1e9", "12.0", "1_000", "abc"] {
            let err = input.parse::<AccountNumber>().unwrap_err();
            assert!(
                matches!(err, Error::Validation(_)),
                "expected validation error for {:?}",
                input
            );
        }
        // 19 digits would overflow the bounded range
        assert!("1000000000000000000".parse::<AccountNumber>().is_err());
    }

    #[test]
    fn test_account_number_serde_validates_range() {
        let number: AccountNumber = serde_json::from_str("42").unwrap();
        assert_eq!(number.value(), 42);
        assert_eq!(serde_json::to_string(&number).unwrap(), "42");

        assert!(serde_json::from_str::<AccountNumber>("0").is_err());
        assert!(serde_json::from_str::<AccountNumber>("-1").is_err());
        assert!(serde_json::from_str::<AccountNumber>("\"42\"").is_err());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(Account::normalize_name("  Savings ").unwrap(), "Savings");
        assert!(Account::normalize_name("   ").is_err());
    }
}
