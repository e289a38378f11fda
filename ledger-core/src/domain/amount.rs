//! Monetary amounts in minor currency units

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// A strictly positive amount of money in minor units (e.g. cents)
///
/// Direction is never encoded in the amount itself: the engine decides
/// whether it is applied as a debit or a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    pub fn new(minor_units: i64) -> Result<Self> {
        if minor_units <= 0 {
            return Err(Error::validation(format!(
                "amount must be greater than zero, got {}",
                minor_units
            )));
        }
        Ok(Self(minor_units))
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    /// Signed delta that increases a balance
    pub fn as_credit(self) -> i64 {
        self.0
    }

    /// Signed delta that decreases a balance
    pub fn as_debit(self) -> i64 {
        -self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl FromStr for Amount {
    type Err = Error;

    /// Parse an integer number of minor units. Signs, separators and
    /// fractional parts are rejected.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::validation(format!(
                "amount must be a whole number of minor units: {:?}",
                s
            )));
        }
        let value: i64 = s
            .parse()
            .map_err(|_| Error::validation(format!("amount is out of range: {}", s)))?;
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reject store identifiers that can never have been assigned
pub fn ensure_id(what: &str, id: i64) -> Result<i64> {
    if id <= 0 {
        return Err(Error::validation(format!("invalid {} id: {}", what, id)));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_must_be_positive() {
        assert!(Amount::new(1).is_ok());
        assert!(matches!(Amount::new(0), Err(Error::Validation(_))));
        assert!(matches!(Amount::new(-100), Err(Error::Validation(_))));
    }

    #[test]
    fn test_amount_direction() {
        let amount = Amount::new(250).unwrap();
        assert_eq!(amount.as_credit(), 250);
        assert_eq!(amount.as_debit(), -250);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!("1500".parse::<Amount>().unwrap().minor_units(), 1500);
        for input in ["", "0", "-1", "+1", "12.50", "1,000", "99999999999999999999"] {
            assert!(input.parse::<Amount>().is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_ensure_id() {
        assert_eq!(ensure_id("account", 3).unwrap(), 3);
        assert!(ensure_id("account", 0).is_err());
        assert!(ensure_id("user", -1).is_err());
    }
}
