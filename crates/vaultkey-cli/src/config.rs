//! Configuration for the `vaultkey` CLI.
//!
//! [`VaultKeyConfig`] is loaded from a TOML file, environment variables,
//! and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `VAULTKEY_CONFIG` environment variable
//! 3. XDG default: `~/.config/vaultkey/config.toml`
//! 4. Built-in defaults

use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vaultkey_acl::{AccessController, DEFAULT_ADMIN, DEFAULT_RESOURCE};
use vaultkey_core::{Error, Result};

/// Env var naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "VAULTKEY_CONFIG";

const ENV_PREFIX: &str = "VAULTKEY";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the `vaultkey` CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultKeyConfig {
    /// Initial registry contents.
    pub seed: SeedConfig,

    /// Audit trail behaviour.
    pub audit: AuditConfig,

    /// Protected resource settings.
    pub access: AccessConfig,

    /// Interactive shell settings.
    pub shell: ShellConfig,
}

/// The administrator present at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Username of the seeded administrator.
    pub admin_username: String,

    /// Role of the seeded administrator.
    pub admin_role: String,
}

/// Audit trail configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Record provisioning attempts rejected for an empty username.
    pub log_invalid_input: bool,
}

/// Protected resource configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Name of the resource in access audit records.
    pub resource: String,
}

/// Shell configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt shown before each interactive command.
    pub prompt: String,

    /// Print the audit records each command produces.
    pub echo_audit: bool,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_username: DEFAULT_ADMIN.to_string(),
            admin_role: "admin".to_string(),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            resource: DEFAULT_RESOURCE.to_string(),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "vaultkey> ".to_string(),
            echo_audit: true,
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl VaultKeyConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                log::debug!("loading config from {}", path.display());
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level(ENV_PREFIX);
        env_opts.add_section("seed");
        env_opts.add_section("audit");
        env_opts.add_section("access");
        env_opts.add_section("shell");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vaultkey").join("config.toml"))
    }

    /// Build an [`AccessController`] from this configuration.
    pub fn build_controller(&self) -> Result<AccessController> {
        AccessController::builder()
            .seed_user(self.seed.admin_username.trim(), self.seed.admin_role.as_str())
            .resource_name(self.access.resource.clone())
            .log_invalid_input(self.audit.log_invalid_input)
            .build()
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `VAULTKEY_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, ENV_PREFIX, &mut vars);
        Ok(vars)
    }
}

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
