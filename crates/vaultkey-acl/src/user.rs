//! Users and roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A user's role.
///
/// Any string is accepted; it is stored lowercased. Only [`Role::ADMIN`]
/// carries privileges, and [`Role::is_admin`] is the one place that decides
/// that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// The privileged role name.
    pub const ADMIN: &'static str = "admin";

    /// The conventional unprivileged role name.
    pub const USER: &'static str = "user";

    /// Create a role, trimming and lowercasing the name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    /// The admin role.
    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    /// The standard user role.
    pub fn user() -> Self {
        Self(Self::USER.to_string())
    }

    /// Whether this role grants admin privileges.
    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }

    /// The stored (lowercased) role name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A registered identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique, case-sensitive username.
    pub username: String,
    /// Assigned role.
    pub role: Role,
}

impl User {
    /// Create a user.
    pub fn new(username: impl Into<String>, role: impl Into<Role>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
        }
    }

    /// Whether this user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_lowercases() {
        assert_eq!(Role::new("Admin").as_str(), "admin");
        assert_eq!(Role::new("  USER ").as_str(), "user");
    }

    #[test]
    fn test_role_is_admin() {
        assert!(Role::admin().is_admin());
        assert!(Role::new("ADMIN").is_admin());
        assert!(!Role::user().is_admin());
        assert!(!Role::new("administrator").is_admin());
        assert!(!Role::new("").is_admin());
    }

    #[test]
    fn test_role_accepts_unknown_names() {
        let role = Role::new("auditor");
        assert_eq!(role.to_string(), "auditor");
        assert!(!role.is_admin());
    }

    #[test]
    fn test_user_is_admin() {
        assert!(User::new("root", Role::admin()).is_admin());
        assert!(!User::new("alice", "user").is_admin());
    }

    #[test]
    fn test_user_serializes_role_as_string() {
        let user = User::new("alice", "User");
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, r#"{"username":"alice","role":"user"}"#);
    }
}
