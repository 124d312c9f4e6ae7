//! The access controller.
//!
//! [`AccessController`] owns the user registry, the audit log and the
//! current session. Every operation returns an outcome value and records
//! what happened; nothing here fails with an error once the controller is
//! built.

use std::fmt;

use vaultkey_core::{Clock, Result, SystemClock};

use crate::audit::AuditLog;
use crate::registry::UserRegistry;
use crate::user::{Role, User};

/// Username of the built-in administrator.
pub const DEFAULT_ADMIN: &str = "admin";

/// Resource name used in access audit records.
pub const DEFAULT_RESOURCE: &str = "root";

// ============================================================================
// Outcomes
// ============================================================================

/// Result of [`AccessController::authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// The username is registered and now holds the session.
    Authenticated(String),
    /// Unknown username; the session is unchanged.
    Denied,
}

/// Result of [`AccessController::provision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionResult {
    /// A new user was added.
    Created,
    /// The username is already registered.
    DuplicateUser,
    /// The caller is anonymous or not an admin.
    Unauthorized,
    /// The requested username was empty.
    InvalidInput,
}

/// Result of [`AccessController::access_resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    /// The session user is an admin.
    Granted,
    /// No session, or the session user is not an admin.
    Denied,
}

impl fmt::Display for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated(user) => write!(f, "authenticated as {user}"),
            Self::Denied => f.write_str("denied"),
        }
    }
}

impl fmt::Display for ProvisionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::DuplicateUser => "duplicate user",
            Self::Unauthorized => "unauthorized",
            Self::InvalidInput => "invalid input",
        })
    }
}

impl fmt::Display for AccessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
        })
    }
}

// ============================================================================
// Session
// ============================================================================

/// The single authenticated identity, if any.
///
/// There is no logout: once set, a session only changes when a different
/// user authenticates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current_user: Option<String>,
}

impl Session {
    /// The session's username, or `None` while anonymous.
    pub fn username(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    /// Whether nobody has authenticated yet.
    pub fn is_anonymous(&self) -> bool {
        self.current_user.is_none()
    }

    /// Name used in audit records: the username, or `Anonymous`.
    pub fn display_name(&self) -> &str {
        self.username().unwrap_or("Anonymous")
    }
}

// ============================================================================
// AccessController
// ============================================================================

/// Role-gated access controller with an append-only audit trail.
///
/// # Example
///
/// ```
/// use vaultkey_acl::{AccessController, AccessResult, AuthResult, ProvisionResult};
///
/// let mut acl = AccessController::new();
/// assert_eq!(acl.authenticate("admin"), AuthResult::Authenticated("admin".into()));
/// assert_eq!(acl.provision("alice", "user"), ProvisionResult::Created);
/// assert_eq!(acl.access_resource(), AccessResult::Granted);
/// ```
pub struct AccessController {
    registry: UserRegistry,
    audit: AuditLog,
    session: Session,
    clock: Box<dyn Clock>,
    resource: String,
    log_invalid_input: bool,
}

impl AccessController {
    /// A controller seeded with the default `admin` user and the system clock.
    pub fn new() -> Self {
        let mut registry = UserRegistry::new();
        registry.insert(User::new(DEFAULT_ADMIN, Role::admin()));
        Self {
            registry,
            audit: AuditLog::new(),
            session: Session::default(),
            clock: Box::new(SystemClock),
            resource: DEFAULT_RESOURCE.to_string(),
            log_invalid_input: false,
        }
    }

    /// Start building a controller with custom seed, clock or settings.
    pub fn builder() -> AccessControllerBuilder {
        AccessControllerBuilder::default()
    }

    /// Log in as `username` if it is registered.
    ///
    /// Surrounding whitespace is trimmed; otherwise the match is exact.
    pub fn authenticate(&mut self, username: &str) -> AuthResult {
        let username = username.trim();
        if self.registry.contains(username) {
            self.session.current_user = Some(username.to_string());
            self.record(format!("SUCCESS: authenticated {username}"));
            AuthResult::Authenticated(username.to_string())
        } else {
            self.record(format!("FAILURE: authentication failed for {username}"));
            AuthResult::Denied
        }
    }

    /// Create a new user on behalf of the current session.
    ///
    /// The role is stored lowercased and is not validated.
    pub fn provision(&mut self, new_username: &str, new_role: &str) -> ProvisionResult {
        if !self.check_admin_privilege() {
            return ProvisionResult::Unauthorized;
        }

        let new_username = new_username.trim();
        if new_username.is_empty() {
            if self.log_invalid_input {
                self.record("WARNING: rejected provisioning request with empty username");
            }
            return ProvisionResult::InvalidInput;
        }

        if self.registry.contains(new_username) {
            self.record(format!("WARNING: duplicate user {new_username}"));
            return ProvisionResult::DuplicateUser;
        }

        let user = User::new(new_username, Role::new(new_role));
        let message = format!("PROVISION: created {} role={}", user.username, user.role);
        self.registry.insert(user);
        self.record(message);
        ProvisionResult::Created
    }

    /// Whether the current session belongs to an admin.
    ///
    /// A failed check is recorded as a security alert. The role is looked
    /// up on every call.
    pub fn check_admin_privilege(&mut self) -> bool {
        if self.session_user().is_some_and(User::is_admin) {
            return true;
        }
        let actor = self.session.display_name().to_string();
        self.record(format!(
            "SECURITY ALERT: privilege escalation attempt by {actor}"
        ));
        false
    }

    /// Attempt access to the protected resource.
    pub fn access_resource(&mut self) -> AccessResult {
        let Some(username) = self.session.username().map(str::to_string) else {
            self.record("WARNING: unauthenticated resource access attempt");
            return AccessResult::Denied;
        };

        if self.session_user().is_some_and(User::is_admin) {
            self.record(format!("ACCESS GRANTED: {username} accessed {}", self.resource));
            AccessResult::Granted
        } else {
            self.record(format!(
                "ACCESS DENIED: {username} attempted {} access",
                self.resource
            ));
            AccessResult::Denied
        }
    }

    /// The logged-in username, if any.
    pub fn current_user(&self) -> Option<&str> {
        self.session.username()
    }

    /// The current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read-only view of the registry.
    pub fn registry(&self) -> &UserRegistry {
        &self.registry
    }

    /// Read-only view of the audit trail.
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Name of the protected resource.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    fn session_user(&self) -> Option<&User> {
        self.session
            .username()
            .and_then(|name| self.registry.find(name))
    }

    fn record(&mut self, message: impl Into<String>) {
        let now = self.clock.now();
        self.audit.append(now, message);
    }
}

impl Default for AccessController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AccessController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessController")
            .field("registry", &self.registry)
            .field("session", &self.session)
            .field("audit_len", &self.audit.len())
            .field("resource", &self.resource)
            .field("log_invalid_input", &self.log_invalid_input)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`AccessController`].
///
/// Without any `seed_user` call the registry holds the default
/// `admin`/`admin` user.
#[derive(Default)]
pub struct AccessControllerBuilder {
    seed: Vec<User>,
    clock: Option<Box<dyn Clock>>,
    resource: Option<String>,
    log_invalid_input: bool,
}

impl AccessControllerBuilder {
    /// Add a user present from the start.
    pub fn seed_user(mut self, username: impl Into<String>, role: impl Into<Role>) -> Self {
        self.seed.push(User::new(username, role));
        self
    }

    /// Use a custom time source for audit records.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Name of the protected resource in access records.
    pub fn resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource = Some(name.into());
        self
    }

    /// Also record rejected empty-username provisioning requests.
    pub fn log_invalid_input(mut self, enabled: bool) -> Self {
        self.log_invalid_input = enabled;
        self
    }

    /// Build the controller.
    ///
    /// # Errors
    ///
    /// Returns [`vaultkey_core::Error::InvalidData`] if the seed contains an
    /// empty or repeated username.
    pub fn build(self) -> Result<AccessController> {
        let seed = if self.seed.is_empty() {
            vec![User::new(DEFAULT_ADMIN, Role::admin())]
        } else {
            self.seed
        };
        let registry = UserRegistry::with_seed(seed)?;
        log::debug!("access controller seeded with {} user(s)", registry.len());

        Ok(AccessController {
            registry,
            audit: AuditLog::new(),
            session: Session::default(),
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            resource: self
                .resource
                .unwrap_or_else(|| DEFAULT_RESOURCE.to_string()),
            log_invalid_input: self.log_invalid_input,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone};
    use proptest::prelude::*;

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    fn controller() -> AccessController {
        AccessController::builder()
            .clock(FixedClock(
                Local.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
            ))
            .build()
            .unwrap()
    }

    fn last_message(acl: &AccessController) -> &str {
        acl.audit_log().last().unwrap().message()
    }

    fn admin_with_alice() -> AccessController {
        let mut acl = controller();
        acl.authenticate("admin");
        acl.provision("alice", "user");
        acl
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    #[test]
    fn test_new_seeds_admin() {
        let acl = AccessController::new();
        assert_eq!(acl.registry().len(), 1);
        assert!(acl.registry().find("admin").unwrap().is_admin());
        assert!(acl.session().is_anonymous());
        assert!(acl.audit_log().is_empty());
        assert_eq!(acl.resource(), "root");
    }

    #[test]
    fn test_builder_custom_seed_replaces_default() {
        let acl = AccessController::builder()
            .seed_user("root", "Admin")
            .seed_user("guest", "user")
            .build()
            .unwrap();
        assert_eq!(acl.registry().len(), 2);
        assert!(acl.registry().find("admin").is_none());
        assert!(acl.registry().find("root").unwrap().is_admin());
    }

    #[test]
    fn test_builder_rejects_bad_seed() {
        let result = AccessController::builder().seed_user("", "admin").build();
        assert!(result.is_err());
    }

    // ------------------------------------------------------------------------
    // authenticate
    // ------------------------------------------------------------------------

    #[test]
    fn test_authenticate_known_user() {
        let mut acl = controller();
        assert_eq!(
            acl.authenticate("admin"),
            AuthResult::Authenticated("admin".into())
        );
        assert_eq!(acl.current_user(), Some("admin"));
        assert_eq!(last_message(&acl), "SUCCESS: authenticated admin");
    }

    #[test]
    fn test_authenticate_trims_input() {
        let mut acl = controller();
        assert_eq!(
            acl.authenticate("  admin \n"),
            AuthResult::Authenticated("admin".into())
        );
    }

    #[test]
    fn test_authenticate_unknown_user() {
        let mut acl = controller();
        assert_eq!(acl.authenticate("mallory"), AuthResult::Denied);
        assert!(acl.session().is_anonymous());
        assert_eq!(
            last_message(&acl),
            "FAILURE: authentication failed for mallory"
        );
    }

    #[test]
    fn test_authenticate_is_case_sensitive() {
        let mut acl = controller();
        assert_eq!(acl.authenticate("Admin"), AuthResult::Denied);
    }

    #[test]
    fn test_failed_authenticate_keeps_existing_session() {
        let mut acl = controller();
        acl.authenticate("admin");
        acl.authenticate("nobody");
        assert_eq!(acl.current_user(), Some("admin"));
    }

    // ------------------------------------------------------------------------
    // check_admin_privilege
    // ------------------------------------------------------------------------

    #[test]
    fn test_privilege_gate_anonymous() {
        let mut acl = controller();
        assert!(!acl.check_admin_privilege());
        assert_eq!(
            last_message(&acl),
            "SECURITY ALERT: privilege escalation attempt by Anonymous"
        );
    }

    #[test]
    fn test_privilege_gate_non_admin() {
        let mut acl = admin_with_alice();
        acl.authenticate("alice");
        assert!(!acl.check_admin_privilege());
        assert_eq!(
            last_message(&acl),
            "SECURITY ALERT: privilege escalation attempt by alice"
        );
    }

    #[test]
    fn test_privilege_gate_admin_is_silent() {
        let mut acl = controller();
        acl.authenticate("admin");
        let before = acl.audit_log().len();
        assert!(acl.check_admin_privilege());
        assert_eq!(acl.audit_log().len(), before);
    }

    // ------------------------------------------------------------------------
    // provision
    // ------------------------------------------------------------------------

    #[test]
    fn test_provision_as_admin() {
        let mut acl = controller();
        acl.authenticate("admin");
        assert_eq!(acl.provision("alice", "User"), ProvisionResult::Created);
        assert_eq!(acl.registry().find("alice").unwrap().role.as_str(), "user");
        assert_eq!(last_message(&acl), "PROVISION: created alice role=user");
    }

    #[test]
    fn test_provision_anonymous_is_unauthorized() {
        let mut acl = controller();
        assert_eq!(acl.provision("alice", "user"), ProvisionResult::Unauthorized);
        assert_eq!(acl.registry().len(), 1);
        assert_eq!(acl.audit_log().len(), 1);
        assert!(last_message(&acl).starts_with("SECURITY ALERT"));
    }

    #[test]
    fn test_provision_unauthorized_checked_before_input() {
        let mut acl = controller();
        assert_eq!(acl.provision("", "user"), ProvisionResult::Unauthorized);
    }

    #[test]
    fn test_provision_duplicate() {
        let mut acl = admin_with_alice();
        assert_eq!(acl.provision("alice", "admin"), ProvisionResult::DuplicateUser);
        assert!(!acl.registry().find("alice").unwrap().is_admin());
        assert_eq!(last_message(&acl), "WARNING: duplicate user alice");
    }

    #[test]
    fn test_provision_empty_username_not_logged_by_default() {
        let mut acl = controller();
        acl.authenticate("admin");
        let before = acl.audit_log().len();
        assert_eq!(acl.provision("   ", "user"), ProvisionResult::InvalidInput);
        assert_eq!(acl.audit_log().len(), before);
        assert_eq!(acl.registry().len(), 1);
    }

    #[test]
    fn test_provision_empty_username_logged_when_enabled() {
        let mut acl = AccessController::builder()
            .log_invalid_input(true)
            .build()
            .unwrap();
        acl.authenticate("admin");
        assert_eq!(acl.provision("", "user"), ProvisionResult::InvalidInput);
        assert_eq!(
            last_message(&acl),
            "WARNING: rejected provisioning request with empty username"
        );
        assert_eq!(acl.registry().len(), 1);
    }

    #[test]
    fn test_provision_accepts_unknown_role() {
        let mut acl = controller();
        acl.authenticate("admin");
        assert_eq!(acl.provision("eve", "Auditor"), ProvisionResult::Created);
        let eve = acl.registry().find("eve").unwrap();
        assert_eq!(eve.role.as_str(), "auditor");
        assert!(!eve.is_admin());
    }

    #[test]
    fn test_provisioned_admin_has_privileges() {
        let mut acl = controller();
        acl.authenticate("admin");
        acl.provision("carol", "ADMIN");
        acl.authenticate("carol");
        assert_eq!(acl.provision("dave", "user"), ProvisionResult::Created);
    }

    // ------------------------------------------------------------------------
    // access_resource
    // ------------------------------------------------------------------------

    #[test]
    fn test_access_anonymous() {
        let mut acl = controller();
        assert_eq!(acl.access_resource(), AccessResult::Denied);
        assert_eq!(
            last_message(&acl),
            "WARNING: unauthenticated resource access attempt"
        );
    }

    #[test]
    fn test_access_admin() {
        let mut acl = controller();
        acl.authenticate("admin");
        assert_eq!(acl.access_resource(), AccessResult::Granted);
        assert_eq!(last_message(&acl), "ACCESS GRANTED: admin accessed root");
    }

    #[test]
    fn test_access_standard_user() {
        let mut acl = admin_with_alice();
        acl.authenticate("alice");
        assert_eq!(acl.access_resource(), AccessResult::Denied);
        assert_eq!(last_message(&acl), "ACCESS DENIED: alice attempted root access");
    }

    #[test]
    fn test_access_custom_resource_name() {
        let mut acl = AccessController::builder()
            .resource_name("vault")
            .build()
            .unwrap();
        acl.authenticate("admin");
        acl.access_resource();
        assert_eq!(last_message(&acl), "ACCESS GRANTED: admin accessed vault");
    }

    #[test]
    fn test_audit_uses_injected_clock() {
        let mut acl = controller();
        acl.authenticate("admin");
        assert_eq!(
            acl.audit_log().records()[0].to_string(),
            "[2024-01-01 09:30:00] SUCCESS: authenticated admin"
        );
    }

    #[test]
    fn test_controller_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AccessController>();
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    #[derive(Debug, Clone)]
    enum Op {
        Authenticate(String),
        Provision(String, String),
        Access,
        Gate,
    }

    fn name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("admin".to_string()),
            Just("alice".to_string()),
            Just(String::new()),
            "[a-zA-Z]{1,6}",
        ]
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            name().prop_map(Op::Authenticate),
            (name(), prop_oneof![Just("admin"), Just("user"), Just("Other")])
                .prop_map(|(u, r)| Op::Provision(u, r.to_string())),
            Just(Op::Access),
            Just(Op::Gate),
        ]
    }

    fn apply(acl: &mut AccessController, op: &Op) {
        match op {
            Op::Authenticate(u) => {
                acl.authenticate(u);
            }
            Op::Provision(u, r) => {
                acl.provision(u, r);
            }
            Op::Access => {
                acl.access_resource();
            }
            Op::Gate => {
                acl.check_admin_privilege();
            }
        }
    }

    proptest! {
        #[test]
        fn prop_unknown_user_denied_and_session_unchanged(
            ops in prop::collection::vec(op(), 0..20),
            probe in "[a-z]{1,8}",
        ) {
            let mut acl = controller();
            for op in &ops {
                apply(&mut acl, op);
            }
            prop_assume!(!acl.registry().contains(&probe));
            let before = acl.session().clone();
            prop_assert_eq!(acl.authenticate(&probe), AuthResult::Denied);
            prop_assert_eq!(acl.session(), &before);
        }

        #[test]
        fn prop_registered_user_authenticates(ops in prop::collection::vec(op(), 0..20)) {
            let mut acl = controller();
            for op in &ops {
                apply(&mut acl, op);
            }
            let names: Vec<String> = acl.registry().iter().map(|u| u.username.clone()).collect();
            for name in names {
                prop_assert_eq!(acl.authenticate(&name), AuthResult::Authenticated(name.clone()));
                prop_assert_eq!(acl.current_user(), Some(name.as_str()));
            }
        }

        #[test]
        fn prop_provision_outcomes(
            ops in prop::collection::vec(op(), 0..20),
            user in name(),
            role in "[a-zA-Z]{0,6}",
        ) {
            let mut acl = controller();
            for op in &ops {
                apply(&mut acl, op);
            }
            let is_admin = acl
                .current_user()
                .and_then(|u| acl.registry().find(u))
                .is_some_and(User::is_admin);
            let existed = acl.registry().contains(user.trim());
            let before = acl.registry().len();

            let result = acl.provision(&user, &role);

            if !is_admin {
                prop_assert_eq!(result, ProvisionResult::Unauthorized);
                prop_assert_eq!(acl.registry().len(), before);
            } else if user.trim().is_empty() {
                prop_assert_eq!(result, ProvisionResult::InvalidInput);
                prop_assert_eq!(acl.registry().len(), before);
            } else if existed {
                prop_assert_eq!(result, ProvisionResult::DuplicateUser);
                prop_assert_eq!(acl.registry().len(), before);
            } else {
                prop_assert_eq!(result, ProvisionResult::Created);
                prop_assert_eq!(acl.registry().len(), before + 1);
                let created = acl.registry().find(user.trim()).unwrap();
                prop_assert_eq!(created.role.as_str(), role.to_lowercase());
            }
        }

        #[test]
        fn prop_access_granted_iff_admin(ops in prop::collection::vec(op(), 0..20)) {
            let mut acl = controller();
            for op in &ops {
                apply(&mut acl, op);
            }
            let is_admin = acl
                .current_user()
                .and_then(|u| acl.registry().find(u))
                .is_some_and(User::is_admin);
            let expected = if is_admin { AccessResult::Granted } else { AccessResult::Denied };
            prop_assert_eq!(acl.access_resource(), expected);
        }

        #[test]
        fn prop_audit_log_is_append_only(ops in prop::collection::vec(op(), 1..30)) {
            let mut acl = controller();
            let mut seen = Vec::new();
            for op in &ops {
                apply(&mut acl, op);
                let records = acl.audit_log().records();
                prop_assert!(records.len() >= seen.len());
                prop_assert_eq!(&records[..seen.len()], &seen[..]);
                seen = records.to_vec();
            }
        }
    }
}
