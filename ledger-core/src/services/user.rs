//! User service - thin validation layer over the user directory

use std::sync::Arc;

use tracing::debug;

use crate::domain::result::Result;
use crate::domain::{ensure_id, User, UserName};
use crate::ports::UserDirectory;

pub struct UserService {
    users: Arc<dyn UserDirectory>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }

    pub fn all(&self) -> Result<Vec<User>> {
        self.users.list_users()
    }

    pub fn user(&self, id: i64) -> Result<User> {
        self.users.get_user(ensure_id("user", id)?)
    }

    pub fn create_user(&self, first_name: &str, last_name: &str) -> Result<User> {
        let name = UserName::new(first_name, last_name)?;
        let user = self.users.create_user(&name)?;
        debug!(user_id = user.id, "user created");
        Ok(user)
    }

    pub fn update_user(&self, id: i64, first_name: &str, last_name: &str) -> Result<User> {
        let id = ensure_id("user", id)?;
        let name = UserName::new(first_name, last_name)?;
        self.users.update_user(id, &name)
    }

    /// Delete a user and every account they own. Returns the number of
    /// accounts removed.
    pub fn delete_user(&self, id: i64) -> Result<usize> {
        let id = ensure_id("user", id)?;
        let removed = self.users.delete_user(id)?;
        debug!(user_id = id, accounts_removed = removed, "user deleted");
        Ok(removed)
    }
}
