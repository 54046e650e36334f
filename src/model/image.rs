//! model::image
//!
//! OCI image types: indexes, descriptors, manifests, image configs, and the
//! aggregated records assembled by [`crate::ops::images`].
//!
//! The index/descriptor/manifest shapes follow the OCI image specification
//! as emitted by the runtime; the aggregated [`ImageRecord`] is this tool's
//! own view, grouping every tag of an image under its index digest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Annotation key marking attestation manifests inside an index.
///
/// Descriptors carrying this annotation with the value
/// `attestation-manifest` are provenance blobs, not runnable platforms,
/// and are excluded from listings.
pub const REFERENCE_TYPE_ANNOTATION: &str = "vnd.docker.reference.type";

/// Annotation value identifying an attestation manifest.
pub const ATTESTATION_MANIFEST: &str = "attestation-manifest";

/// An OS/architecture/variant triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub os: String,
    pub architecture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.variant {
            Some(v) => write!(f, "{}/{}/{}", self.os, self.architecture, v),
            None => write!(f, "{}/{}", self.os, self.architecture),
        }
    }
}

/// A content descriptor without platform information (config and layer
/// entries inside a manifest).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescriptor {
    pub media_type: String,
    pub digest: String,
    pub size: u64,
}

/// A descriptor inside an image index, optionally carrying a platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciDescriptor {
    pub media_type: String,
    pub digest: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<HashMap<String, String>>,
}

impl OciDescriptor {
    /// Whether this descriptor is an attestation manifest rather than a
    /// runnable platform manifest.
    pub fn is_attestation(&self) -> bool {
        self.annotations
            .as_ref()
            .and_then(|a| a.get(REFERENCE_TYPE_ANNOTATION))
            .is_some_and(|v| v == ATTESTATION_MANIFEST)
    }
}

/// An OCI image index (fat manifest).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIndex {
    pub schema_version: u32,
    pub media_type: String,
    #[serde(default)]
    pub manifests: Vec<OciDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<HashMap<String, String>>,
}

/// A platform-specific OCI manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciManifest {
    pub schema_version: u32,
    pub media_type: String,
    pub config: ContentDescriptor,
    #[serde(default)]
    pub layers: Vec<ContentDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<HashMap<String, String>>,
}

/// An OCI image config blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OciImageConfig {
    pub os: String,
    pub architecture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RuntimeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rootfs: Option<RootFs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
}

/// The runnable portion of an image config.
///
/// Field names are capitalized on the wire (Docker heritage).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default, rename = "Cmd", skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,
    #[serde(default, rename = "Entrypoint", skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,
    #[serde(default, rename = "Env", skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,
    #[serde(default, rename = "WorkingDir", skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    #[serde(default, rename = "Labels", skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
    #[serde(default, rename = "StopSignal", skip_serializing_if = "Option::is_none")]
    pub stop_signal: Option<String>,
}

/// Layer digests of the unpacked root filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootFs {
    #[serde(rename = "type")]
    pub fs_type: String,
    #[serde(default)]
    pub diff_ids: Vec<String>,
}

/// One build-history entry of an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_layer: Option<bool>,
}

/// One platform of an image: its index descriptor plus the fetched
/// config and manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageVariant {
    pub descriptor: OciDescriptor,
    pub config: OciImageConfig,
    pub manifest: OciManifest,
}

/// An aggregated image: one entry per index digest, carrying every tag
/// that points at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub digest: String,
    /// All references (tags) resolving to this digest, sorted.
    pub references: Vec<String>,
    pub schema_version: u32,
    pub media_type: String,
    pub variants: Vec<ImageVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<HashMap<String, String>>,
}

impl ImageRecord {
    /// Total size in bytes across all variant layers.
    pub fn total_size(&self) -> u64 {
        self.variants
            .iter()
            .flat_map(|v| v.manifest.layers.iter())
            .map(|l| l.size)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(annotations: Option<HashMap<String, String>>) -> OciDescriptor {
        OciDescriptor {
            media_type: "application/vnd.oci.image.manifest.v1+json".into(),
            digest: "sha256:feed".into(),
            size: 428,
            platform: Some(Platform {
                os: "linux".into(),
                architecture: "arm64".into(),
                variant: None,
            }),
            annotations,
        }
    }

    #[test]
    fn attestation_detection() {
        let mut annotations = HashMap::new();
        annotations.insert(
            REFERENCE_TYPE_ANNOTATION.to_string(),
            ATTESTATION_MANIFEST.to_string(),
        );
        assert!(descriptor(Some(annotations)).is_attestation());
        assert!(!descriptor(None).is_attestation());

        let mut other = HashMap::new();
        other.insert(REFERENCE_TYPE_ANNOTATION.to_string(), "sbom".to_string());
        assert!(!descriptor(Some(other)).is_attestation());
    }

    #[test]
    fn platform_display() {
        let p = Platform {
            os: "linux".into(),
            architecture: "arm64".into(),
            variant: None,
        };
        assert_eq!(p.to_string(), "linux/arm64");

        let v = Platform {
            os: "linux".into(),
            architecture: "arm".into(),
            variant: Some("v7".into()),
        };
        assert_eq!(v.to_string(), "linux/arm/v7");
    }

    #[test]
    fn index_deserializes_with_camel_case() {
        let json = r#"{
            "schemaVersion": 2,
            "mediaType": "application/vnd.oci.image.index.v1+json",
            "manifests": [
                {"mediaType": "application/vnd.oci.image.manifest.v1+json",
                 "digest": "sha256:aa", "size": 100,
                 "platform": {"os": "linux", "architecture": "amd64"}}
            ]
        }"#;
        let index: ImageIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.schema_version, 2);
        assert_eq!(index.manifests.len(), 1);
        assert_eq!(
            index.manifests[0].platform.as_ref().unwrap().architecture,
            "amd64"
        );
    }

    #[test]
    fn runtime_config_capitalized_keys() {
        let json = r#"{"Cmd": ["nginx"], "Env": ["PATH=/bin"], "WorkingDir": "/srv"}"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.cmd.unwrap(), vec!["nginx"]);
        assert_eq!(cfg.working_dir.unwrap(), "/srv");
    }

    #[test]
    fn total_size_sums_layers() {
        let manifest = OciManifest {
            schema_version: 2,
            media_type: "application/vnd.oci.image.manifest.v1+json".into(),
            config: ContentDescriptor {
                media_type: "application/vnd.oci.image.config.v1+json".into(),
                digest: "sha256:cfg".into(),
                size: 10,
            },
            layers: vec![
                ContentDescriptor {
                    media_type: "application/vnd.oci.image.layer.v1.tar+gzip".into(),
                    digest: "sha256:l1".into(),
                    size: 100,
                },
                ContentDescriptor {
                    media_type: "application/vnd.oci.image.layer.v1.tar+gzip".into(),
                    digest: "sha256:l2".into(),
                    size: 250,
                },
            ],
            annotations: None,
        };
        let record = ImageRecord {
            digest: "sha256:idx".into(),
            references: vec!["alpine:latest".into()],
            schema_version: 2,
            media_type: "application/vnd.oci.image.index.v1+json".into(),
            variants: vec![ImageVariant {
                descriptor: descriptor(None),
                config: OciImageConfig {
                    os: "linux".into(),
                    architecture: "arm64".into(),
                    variant: None,
                    created: None,
                    config: None,
                    rootfs: None,
                    history: None,
                },
                manifest,
            }],
            annotations: None,
        };
        assert_eq!(record.total_size(), 350);
    }
}
