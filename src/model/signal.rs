//! model::signal
//!
//! POSIX signal names for stop/kill operations.
//!
//! The runtime CLI accepts signal names (`SIGTERM`) on its `--signal` flag.
//! User input is more forgiving: bare names (`TERM`), lowercase, and
//! numbers are all accepted and normalized to the canonical name.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned for unrecognized signal spellings.
#[derive(Debug, Error)]
#[error("unknown signal: {0}")]
pub struct SignalParseError(String);

/// A normalized POSIX signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Signal(&'static str);

// Deserialize is implemented by hand: the derive's `try_from = "String"`
// path still infers a `'de: 'static` borrow bound from the &'static str
// field, which would forbid deserializing from transient buffers.
// Conversion goes through String, matching the derive's try_from behavior.
impl<'de> Deserialize<'de> for Signal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Signal::try_from(s).map_err(serde::de::Error::custom)
    }
}

/// Signals the runtime understands, with their conventional numbers.
const SIGNALS: &[(&str, u8)] = &[
    ("SIGHUP", 1),
    ("SIGINT", 2),
    ("SIGQUIT", 3),
    ("SIGABRT", 6),
    ("SIGKILL", 9),
    ("SIGUSR1", 10),
    ("SIGUSR2", 12),
    ("SIGPIPE", 13),
    ("SIGALRM", 14),
    ("SIGTERM", 15),
    ("SIGCONT", 18),
    ("SIGSTOP", 19),
    ("SIGWINCH", 28),
];

impl Signal {
    /// Default signal for graceful stop.
    pub const TERM: Signal = Signal("SIGTERM");

    /// Default signal for kill.
    pub const KILL: Signal = Signal("SIGKILL");

    /// Parse a signal from a name (`SIGTERM`, `term`) or number (`15`).
    pub fn parse(input: &str) -> Result<Self, SignalParseError> {
        let trimmed = input.trim();

        if let Ok(n) = trimmed.parse::<u8>() {
            return SIGNALS
                .iter()
                .find(|(_, num)| *num == n)
                .map(|(name, _)| Signal(name))
                .ok_or_else(|| SignalParseError(input.to_string()));
        }

        let upper = trimmed.to_ascii_uppercase();
        let canonical = if upper.starts_with("SIG") {
            upper
        } else {
            format!("SIG{}", upper)
        };

        SIGNALS
            .iter()
            .find(|(name, _)| *name == canonical)
            .map(|(name, _)| Signal(name))
            .ok_or_else(|| SignalParseError(input.to_string()))
    }

    /// The canonical name passed to the runtime's `--signal` flag.
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl std::str::FromStr for Signal {
    type Err = SignalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signal::parse(s)
    }
}

impl TryFrom<String> for Signal {
    type Error = SignalParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Signal::parse(&s)
    }
}

impl From<Signal> for String {
    fn from(s: Signal) -> Self {
        s.0.to_string()
    }
}
