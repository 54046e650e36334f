//! runtime::argv
//!
//! Argument-array construction for runtime CLI invocations.
//!
//! # Design
//!
//! Tool inputs arrive as structured objects; the runtime wants flat argv
//! arrays. `ArgBuilder` keeps the translation in one place so the "given
//! input X, argv equals Y" property is testable without spawning anything.
//! Flags follow the runtime's kebab-case convention; repeated options
//! (`--env A --env B`) are emitted once per value.

/// Builder for a runtime CLI argument array.
#[derive(Debug, Clone, Default)]
pub struct ArgBuilder {
    args: Vec<String>,
}

impl ArgBuilder {
    /// Start from a subcommand path, e.g. `["images", "pull"]`.
    pub fn new<I, S>(base: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: base.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a bare positional argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Append several positional arguments.
    pub fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    /// Append `--flag` when `on` is true.
    pub fn flag(mut self, flag: &str, on: bool) -> Self {
        if on {
            self.args.push(format!("--{}", flag));
        }
        self
    }

    /// Append `--flag <value>` when a value is present.
    pub fn opt(mut self, flag: &str, value: Option<impl ToString>) -> Self {
        if let Some(v) = value {
            self.args.push(format!("--{}", flag));
            self.args.push(v.to_string());
        }
        self
    }

    /// Append `--flag <value>` once per value.
    pub fn opt_each<I, S>(mut self, flag: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for v in values {
            self.args.push(format!("--{}", flag));
            self.args.push(v.into());
        }
        self
    }

    /// Finish and return the argv array.
    pub fn build(self) -> Vec<String> {
        self.args
    }
}
