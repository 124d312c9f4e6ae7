//! User registry.

use std::collections::HashMap;

use vaultkey_core::{Error, Result};

use crate::user::User;

/// The set of known users, keyed by exact username.
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct UserRegistry {
    users: Vec<User>,
    index: HashMap<String, usize>,
}

impl UserRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-loaded with `users`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if a username is empty or repeated.
    pub fn with_seed(users: impl IntoIterator<Item = User>) -> Result<Self> {
        let mut registry = Self::new();
        for user in users {
            if user.username.is_empty() {
                return Err(Error::invalid_data("seed user has an empty username"));
            }
            let name = user.username.clone();
            if !registry.insert(user) {
                return Err(Error::invalid_data(format!(
                    "seed user '{name}' appears more than once"
                )));
            }
        }
        Ok(registry)
    }

    /// Look up a user by exact, case-sensitive username.
    pub fn find(&self, username: &str) -> Option<&User> {
        self.index.get(username).map(|&i| &self.users[i])
    }

    /// Whether `username` is registered.
    pub fn contains(&self, username: &str) -> bool {
        self.index.contains_key(username)
    }

    /// Insert `user` unless the username is taken.
    ///
    /// Returns `false` and leaves the registry untouched on collision.
    pub fn insert(&mut self, user: User) -> bool {
        if self.contains(&user.username) {
            return false;
        }
        self.index.insert(user.username.clone(), self.users.len());
        self.users.push(user);
        true
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Iterate users in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }
}
