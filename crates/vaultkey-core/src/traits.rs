//! Core traits for VaultKey.
//!
//! The only extension point is [`Clock`], which abstracts where audit
//! timestamps come from so that tests can pin time.

use chrono::{DateTime, Local};

/// Display format for audit timestamps (`yyyy-MM-dd HH:mm:ss`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of wall-clock time for audit records.
///
/// # Example
///
/// ```
/// use chrono::{DateTime, Local, TimeZone};
/// use vaultkey_core::Clock;
///
/// struct Frozen(DateTime<Local>);
///
/// impl Clock for Frozen {
///     fn now(&self) -> DateTime<Local> {
///         self.0
///     }
/// }
///
/// let clock = Frozen(Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
/// assert_eq!(clock.now(), clock.now());
/// ```
pub trait Clock: Send + Sync + 'static {
    /// Current local time.
    fn now(&self) -> DateTime<Local>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Format a timestamp the way audit records display it.
pub fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
