//! Handler functions for `vaultkey config {path,show,get,init,export}`.

use crate::cli::ConfigAction;
use crate::config::VaultKeyConfig;
use std::path::PathBuf;
use vaultkey_core::{Error, Result};

/// Handle a config subcommand.
///
/// Receives the raw `--config` path (not a loaded config) because some
/// commands (path, init) work before a config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Show => {
            let config = VaultKeyConfig::load(config_path)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        ConfigAction::Get { key } => {
            let config = VaultKeyConfig::load(config_path)?;
            println!("{}", config_value(&config, &key)?);
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let path = cmd_config_init(file.as_deref(), force)?;
            println!("Config file created at {}", path.display());
            Ok(())
        }
        ConfigAction::Export { docker_env } => {
            let config = VaultKeyConfig::load(config_path)?;
            for line in export_lines(&config, docker_env)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    let path = VaultKeyConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(file does not exist; run `vaultkey config init` to create it)");
    }
    Ok(())
}

/// Write a default config file and return where it went.
fn cmd_config_init(file: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => VaultKeyConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = VaultKeyConfig::default().to_toml_string()?;
    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(path)
}

/// Look up a dotted key such as `seed.admin_username`.
fn config_value(config: &VaultKeyConfig, key: &str) -> Result<String> {
    let root = toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))?;
    let mut current = &root;
    for part in key.split('.') {
        current = current
            .as_table()
            .and_then(|t| t.get(part))
            .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))?;
    }
    Ok(match current {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(_) | toml::Value::Array(_) => toml::to_string_pretty(current)
            .map_err(|e| Error::config(e.to_string()))?,
        other => other.to_string(),
    })
}

fn export_lines(config: &VaultKeyConfig, docker_env: bool) -> Result<Vec<String>> {
    Ok(config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| {
            if docker_env {
                format!("--env {key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect())
}
