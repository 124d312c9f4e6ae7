//! Terminal front end for the VaultKey access controller.
//!
//! - [`cli`]: clap argument types
//! - [`config`]: `VaultKeyConfig`, loaded with confyg
//! - [`config_handlers`]: `vaultkey config ...` subcommands
//! - [`shell`]: the line-oriented command shell
//! - [`app`]: `VaultKeyCli`, which wires the above together

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod shell;

pub use app::VaultKeyCli;
pub use cli::CliArgs;
pub use config::VaultKeyConfig;
pub use shell::{Shell, ShellCommand};
