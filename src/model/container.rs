//! model::container
//!
//! Container records as reported by the runtime.
//!
//! The shape mirrors the runtime's `list`/`inspect` JSON: a record is a
//! status plus attached networks plus the full creation-time configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::image::Platform;

/// Lifecycle status of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    #[default]
    Unknown,
    Stopped,
    Running,
}

impl ContainerStatus {
    /// Whether the container is currently running.
    pub fn is_running(&self) -> bool {
        matches!(self, ContainerStatus::Running)
    }
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContainerStatus::Unknown => "unknown",
            ContainerStatus::Stopped => "stopped",
            ContainerStatus::Running => "running",
        };
        f.write_str(s)
    }
}

/// A container as reported by the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerRecord {
    #[serde(default)]
    pub status: ContainerStatus,

    /// Networks the container is attached to (empty when stopped).
    #[serde(default)]
    pub networks: Vec<ContainerNetwork>,

    pub configuration: ContainerConfig,
}

impl ContainerRecord {
    /// The container's identifier.
    pub fn id(&self) -> &str {
        &self.configuration.id
    }
}

/// An attached network interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerNetwork {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub gateway: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub network: String,
}

/// Creation-time configuration of a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerConfig {
    pub id: String,

    pub image: ImageReference,

    #[serde(default)]
    pub hostname: String,

    #[serde(default)]
    pub platform: Option<Platform>,

    #[serde(default)]
    pub networks: Vec<String>,

    #[serde(default)]
    pub mounts: Vec<Mount>,

    #[serde(default)]
    pub resources: Option<Resources>,

    #[serde(default)]
    pub labels: HashMap<String, String>,

    #[serde(default)]
    pub sysctls: HashMap<String, String>,

    #[serde(default)]
    pub runtime_handler: Option<String>,

    #[serde(default)]
    pub rosetta: bool,

    #[serde(default)]
    pub init_process: Option<InitProcess>,

    #[serde(default)]
    pub dns: Option<DnsConfig>,
}

/// The image a container was created from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReference {
    pub reference: String,
    #[serde(default)]
    pub descriptor: Option<super::image::ContentDescriptor>,
}

/// Resource allocation for a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    #[serde(default)]
    pub cpus: u32,
    #[serde(default)]
    pub memory_in_bytes: u64,
}

/// A filesystem mounted into a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mount {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Mount backend (block/virtiofs/tmpfs); shape varies per backend,
    /// so it is kept opaque.
    #[serde(default, rename = "type")]
    pub fs_type: Option<serde_json::Value>,
}

/// The container's init process description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitProcess {
    #[serde(default)]
    pub executable: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default)]
    pub environment: Vec<String>,
    #[serde(default)]
    pub working_directory: String,
    #[serde(default)]
    pub terminal: bool,
    #[serde(default)]
    pub supplemental_groups: Vec<u32>,
    #[serde(default)]
    pub rlimits: Vec<Rlimit>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// A resource limit applied to the init process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rlimit {
    pub limit: String,
    pub soft: u64,
    pub hard: u64,
}

/// DNS configuration for a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsConfig {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub nameservers: Vec<String>,
    #[serde(default)]
    pub search_domains: Vec<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "status": "running",
            "networks": [
                {"hostname": "web", "gateway": "192.168.64.1", "address": "192.168.64.3/24", "network": "default"}
            ],
            "configuration": {
                "id": "web",
                "hostname": "web",
                "image": {
                    "reference": "docker.io/library/nginx:latest",
                    "descriptor": {"mediaType": "application/vnd.oci.image.index.v1+json", "digest": "sha256:abc", "size": 1234}
                },
                "platform": {"os": "linux", "architecture": "arm64"},
                "networks": ["default"],
                "mounts": [],
                "resources": {"cpus": 4, "memoryInBytes": 1073741824},
                "labels": {},
                "sysctls": {},
                "rosetta": false
            }
        }"#
    }

    #[test]
    fn deserializes_runtime_record() {
        let record: ContainerRecord = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(record.id(), "web");
        assert_eq!(record.status, ContainerStatus::Running);
        assert!(record.status.is_running());
        assert_eq!(record.networks.len(), 1);
        assert_eq!(record.networks[0].gateway, "192.168.64.1");
        assert_eq!(
            record.configuration.image.reference,
            "docker.io/library/nginx:latest"
        );
        assert_eq!(record.configuration.resources.unwrap().cpus, 4);
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{
            "configuration": {
                "id": "bare",
                "image": {"reference": "alpine:latest"}
            }
        }"#;
        let record: ContainerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, ContainerStatus::Unknown);
        assert!(record.networks.is_empty());
        assert!(record.configuration.labels.is_empty());
        assert!(record.configuration.resources.is_none());
    }

    #[test]
    fn status_roundtrip() {
        for (status, text) in [
            (ContainerStatus::Running, "\"running\""),
            (ContainerStatus::Stopped, "\"stopped\""),
            (ContainerStatus::Unknown, "\"unknown\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), text);
            let back: ContainerStatus = serde_json::from_str(text).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn status_display_matches_wire() {
        assert_eq!(ContainerStatus::Running.to_string(), "running");
        assert_eq!(ContainerStatus::Stopped.to_string(), "stopped");
    }
}
