//! Line-oriented front end for the access controller.
//!
//! Each input line maps to one controller call. The shell holds no access
//! state of its own: it renders whatever the controller returns and, when
//! enabled, echoes the audit records the call produced.

use std::io::{BufRead, Write};
use std::str::FromStr;

use vaultkey_acl::{
    AccessController, AccessResult, AuditFeed, AuthResult, ProvisionResult,
};
use vaultkey_core::{Error, Result};

use crate::config::ShellConfig;

const HELP: &str = "\
commands:
  login <username>               start a session as <username>
  provision <username> [role]    create a user (admin only)
  access                         access the protected resource
  whoami                         show the current session
  users                          list registered users
  log [--json]                   show the full audit log
  help                           show this message
  quit | exit                    leave the shell";

// ============================================================================
// Commands
// ============================================================================

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// `login <username>`
    Login(String),
    /// `provision <username> [role]`
    Provision {
        /// Requested username; may be empty.
        username: String,
        /// Requested role; empty when omitted.
        role: String,
    },
    /// `access`
    Access,
    /// `whoami`
    WhoAmI,
    /// `users`
    Users,
    /// `log [--json]`
    Log {
        /// Emit one JSON object per record.
        json: bool,
    },
    /// `help`
    Help,
    /// `quit` / `exit`
    Quit,
}

impl FromStr for ShellCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(Error::parse("empty command"));
        };
        let args: Vec<&str> = words.collect();

        let too_many = |max: usize| -> Result<()> {
            if args.len() > max {
                Err(Error::parse(format!(
                    "'{name}' takes at most {max} argument(s)"
                )))
            } else {
                Ok(())
            }
        };

        match name.to_lowercase().as_str() {
            "login" => {
                too_many(1)?;
                Ok(Self::Login(args.first().copied().unwrap_or_default().to_string()))
            }
            "provision" => {
                too_many(2)?;
                Ok(Self::Provision {
                    username: args.first().copied().unwrap_or_default().to_string(),
                    role: args.get(1).copied().unwrap_or_default().to_string(),
                })
            }
            "access" => too_many(0).map(|_| Self::Access),
            "whoami" => too_many(0).map(|_| Self::WhoAmI),
            "users" => too_many(0).map(|_| Self::Users),
            "log" => match args.as_slice() {
                [] => Ok(Self::Log { json: false }),
                ["--json"] => Ok(Self::Log { json: true }),
                _ => Err(Error::parse("usage: log [--json]")),
            },
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(Error::parse(format!("unknown command '{other}'"))),
        }
    }
}

/// Whether the shell should keep reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop.
    Quit,
}

// ============================================================================
// Shell
// ============================================================================

/// Interactive driver around an [`AccessController`].
pub struct Shell {
    acl: AccessController,
    feed: AuditFeed,
    prompt: String,
    echo_audit: bool,
    interactive: bool,
}

impl Shell {
    /// Create a shell over `acl` using the given settings.
    pub fn new(acl: AccessController, config: &ShellConfig) -> Self {
        let feed = acl.audit_log().feed();
        Self {
            acl,
            feed,
            prompt: config.prompt.clone(),
            echo_audit: config.echo_audit,
            interactive: false,
        }
    }

    /// Print prompts before each line (for terminals).
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// The controller driven by this shell.
    pub fn controller(&self) -> &AccessController {
        &self.acl
    }

    /// Read and execute commands until end of input or `quit`.
    ///
    /// Parse errors are reported on `out` and do not stop the loop.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        let mut lines = input.lines();
        loop {
            if self.interactive {
                write!(out, "{}", self.prompt)?;
                out.flush()?;
            }

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            match trimmed.parse::<ShellCommand>() {
                Ok(command) => {
                    log::debug!("shell command: {command:?}");
                    if self.execute(command, out)? == Flow::Quit {
                        break;
                    }
                }
                Err(e) => writeln!(out, "error: {e} (try 'help')")?,
            }
        }
        Ok(())
    }

    /// Execute a single command, writing its rendering to `out`.
    pub fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<Flow> {
        match command {
            ShellCommand::Login(username) => match self.acl.authenticate(&username) {
                AuthResult::Authenticated(user) => writeln!(out, "Logged in as: {user}")?,
                AuthResult::Denied => writeln!(out, "Access Denied: Invalid User.")?,
            },
            ShellCommand::Provision { username, role } => {
                match self.acl.provision(&username, &role) {
                    ProvisionResult::Created => {
                        writeln!(out, "User '{}' created successfully.", username.trim())?
                    }
                    ProvisionResult::DuplicateUser => writeln!(out, "User already exists.")?,
                    ProvisionResult::Unauthorized => {
                        writeln!(out, "Unauthorized: Admin privileges required.")?
                    }
                    ProvisionResult::InvalidInput => {
                        writeln!(out, "Username must not be empty.")?
                    }
                }
            }
            ShellCommand::Access => match self.acl.access_resource() {
                AccessResult::Granted => writeln!(out, "Access Granted: Root System Files.")?,
                AccessResult::Denied if self.acl.session().is_anonymous() => {
                    writeln!(out, "Please login first.")?
                }
                AccessResult::Denied => {
                    writeln!(out, "Forbidden: Standard Users cannot access Root.")?
                }
            },
            ShellCommand::WhoAmI => writeln!(out, "{}", self.acl.session().display_name())?,
            ShellCommand::Users => {
                for user in self.acl.registry().iter() {
                    writeln!(out, "{} ({})", user.username, user.role)?;
                }
            }
            ShellCommand::Log { json } => {
                for record in self.acl.audit_log().records() {
                    if json {
                        let line = serde_json::to_string(record)
                            .map_err(|e| Error::invalid_data(e.to_string()))?;
                        writeln!(out, "{line}")?;
                    } else {
                        writeln!(out, "{record}")?;
                    }
                }
            }
            ShellCommand::Help => writeln!(out, "{HELP}")?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }

        let fresh = self.feed.poll(self.acl.audit_log());
        if self.echo_audit {
            for record in fresh {
                writeln!(out, "  {record}")?;
            }
        }
        Ok(Flow::Continue)
    }
}

// ============================================================================
// Tests
// ============================================================================
