//! User domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Owner of bank accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated first/last name pair used when creating or renaming a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName {
    pub first_name: String,
    pub last_name: String,
}

impl UserName {
    pub fn new(first_name: &str, last_name: &str) -> Result<Self> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        if first_name.is_empty() {
            return Err(Error::validation("first name cannot be empty"));
        }
        if last_name.is_empty() {
            return Err(Error::validation("last name cannot be empty"));
        }
        Ok(Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_name_trims() {
        let name = UserName::new(" Ada ", "Lovelace").unwrap();
        assert_eq!(name.first_name, "Ada");
        assert_eq!(name.last_name, "Lovelace");
    }

    #[test]
    fn test_user_name_rejects_blank() {
        assert!(UserName::new("", "Lovelace").is_err());
        assert!(UserName::new("Ada", "  ").is_err());
    }
}
