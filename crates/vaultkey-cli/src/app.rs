//! The `vaultkey` application.
//!
//! Ties together argument parsing, configuration, logging and the shell.

use crate::cli::{BaseCommand, CliArgs};
use crate::config::VaultKeyConfig;
use crate::config_handlers;
use crate::shell::Shell;
use std::io::{BufReader, IsTerminal};
use tracing_subscriber::EnvFilter;
use vaultkey_core::{Error, Result};

/// CLI application state.
pub struct VaultKeyCli {
    name: String,
    config: VaultKeyConfig,
    version: String,
}

impl VaultKeyCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = VaultKeyConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: VaultKeyConfig) -> Self {
        Self {
            name: name.into(),
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The loaded configuration.
    pub fn config(&self) -> &VaultKeyConfig {
        &self.config
    }

    /// Initialise tracing-based logging on stderr.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(BaseCommand::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(BaseCommand::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            Some(BaseCommand::Shell { script }) => self.run_shell(script.as_deref()),
            None => self.run_shell(None),
        }
    }

    /// Run the shell over a script file, or over stdin when `script` is `None`.
    pub fn run_shell(&self, script: Option<&str>) -> Result<()> {
        let acl = self.config.build_controller()?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        match script {
            Some(path) => {
                tracing::info!(script = path, "running {} script", self.name);
                let file = std::fs::File::open(path).map_err(|e| Error::io_with_path(e, path))?;
                Shell::new(acl, &self.config.shell).run(BufReader::new(file), &mut out)
            }
            None => {
                let stdin = std::io::stdin();
                let interactive = stdin.is_terminal();
                tracing::debug!(interactive, "starting {} shell", self.name);
                if interactive {
                    println!("{} {} (type 'help' for commands)", self.name, self.version);
                }
                Shell::new(acl, &self.config.shell)
                    .interactive(interactive)
                    .run(stdin.lock(), &mut out)
            }
        }
    }
}
