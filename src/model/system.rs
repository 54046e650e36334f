//! model::system
//!
//! System (daemon) status.

use serde::{Deserialize, Serialize};

/// Status of the container runtime's background services.
///
/// Three-valued: `not_registered` means the runtime is not installed or its
/// services were never registered; `not_running` means it is registered but
/// the API server does not answer; `running` means it answered a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    Running,
    NotRunning,
    NotRegistered,
}

impl std::fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SystemStatus::Running => "running",
            SystemStatus::NotRunning => "not_running",
            SystemStatus::NotRegistered => "not_registered",
        };
        f.write_str(s)
    }
}
