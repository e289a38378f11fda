//! User directory port

use crate::domain::result::Result;
use crate::domain::{User, UserName};

/// User storage abstraction
pub trait UserDirectory: Send + Sync {
    /// All users, ordered by id
    fn list_users(&self) -> Result<Vec<User>>;

    fn get_user(&self, id: i64) -> Result<User>;

    fn create_user(&self, name: &UserName) -> Result<User>;

    fn update_user(&self, id: i64, name: &UserName) -> Result<User>;

    /// Delete a user together with all of their accounts in one transaction.
    /// Returns the number of accounts removed.
    fn delete_user(&self, id: i64) -> Result<usize>;
}
