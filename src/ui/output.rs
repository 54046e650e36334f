//! ui::output
//!
//! Human-readable output helpers, gated on the resolved verbosity.
//! When `--json` is enabled, command results are printed as a response
//! envelope (see [`crate::ops::Envelope`]) and these helpers stay quiet.

use std::fmt::Display;

/// How much the current invocation is allowed to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Results only.
    Quiet,
    /// Results plus progress lines.
    Normal,
    /// Everything, including subprocess argv traces.
    Debug,
}

impl Verbosity {
    /// Resolve the level from the global flags; quiet wins over debug.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Write a stdout line unless quiet.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Write a `[debug]`-prefixed stderr line at debug verbosity.
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Write an `error:`-prefixed stderr line, regardless of verbosity.
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Truncate a digest for display (`sha256:abcd1234...` style).
///
/// Keeps the algorithm prefix and the first 12 hex characters, which is
/// enough to disambiguate in any realistic local image store.
pub fn short_digest(digest: &str) -> String {
    match digest.split_once(':') {
        Some((algo, hex)) if hex.len() > 12 => format!("{}:{}", algo, &hex[..12]),
        _ => digest.to_string(),
    }
}

/// Format a padded table row for list output.
pub fn format_row(columns: &[&str], widths: &[usize]) -> String {
    let mut out = String::new();
    for (i, col) in columns.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(0);
        out.push_str(&format!("{:<width$}  ", col, width = width));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod verbosity {
        use super::*;

        #[test]
        fn quiet_wins() {
            assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        }

        #[test]
        fn debug_when_not_quiet() {
            assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        }

        #[test]
        fn normal_default() {
            assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        }
    }

    mod short_digest {
        use super::*;

        #[test]
        fn truncates_long_digest() {
            let d = "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
            assert_eq!(short_digest(d), "sha256:e3b0c44298fc");
        }

        #[test]
        fn leaves_short_values_alone() {
            assert_eq!(short_digest("sha256:abcd"), "sha256:abcd");
            assert_eq!(short_digest("latest"), "latest");
        }
    }

    #[test]
    fn format_row_pads_columns() {
        let row = format_row(&["abc", "def"], &[6, 3]);
        assert_eq!(row, "abc     def");
    }
}
