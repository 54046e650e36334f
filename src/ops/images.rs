//! ops::images
//!
//! Image operations, including the fan-out listing aggregation.
//!
//! # Architecture
//!
//! `list` mirrors the runtime's per-reference metadata: every listed
//! reference gets its index fetched concurrently (one task per reference
//! in a `JoinSet`); each runnable platform descriptor is resolved to its
//! config and manifest; results are grouped by index digest so several
//! tags of one image collapse into a single [`ImageRecord`].
//!
//! # Invariants
//!
//! - Attestation manifests and descriptors without a platform never
//!   appear in the output.
//! - A failed config/manifest fetch skips that platform only; a failed
//!   index fetch fails the whole listing.
//! - `references` within a record are sorted; records are ordered by
//!   digest.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tokio::task::JoinSet;

use crate::model::{ImageIndex, ImageRecord, ImageVariant, OciImageConfig, OciManifest};
use crate::runtime::{ArgBuilder, ExecOptions, Runner};

use super::{run, OpsError};

/// One line of `images list --format json`.
#[derive(Debug, Clone, Deserialize)]
struct ListedImage {
    reference: String,
    digest: String,
}

/// One entry of `images inspect <ref>`.
#[derive(Debug, Deserialize)]
struct InspectedImage {
    index: ImageIndex,
}

/// One entry of `images inspect <ref> --platform <p>`.
#[derive(Debug, Deserialize)]
struct PlatformDetail {
    config: OciImageConfig,
    manifest: OciManifest,
}

/// Everything fetched for a single reference, before digest grouping.
#[derive(Debug)]
struct TaggedImage {
    digest: String,
    reference: String,
    schema_version: u32,
    media_type: String,
    variants: Vec<ImageVariant>,
    annotations: Option<std::collections::HashMap<String, String>>,
}

/// List all images with their per-platform metadata, grouped by digest.
pub async fn list(runner: &Arc<dyn Runner>) -> Result<Vec<ImageRecord>, OpsError> {
    let args = ArgBuilder::new(["images", "list"])
        .opt("format", Some("json"))
        .build();
    let opts = ExecOptions::with_timeout(runner.timeouts().default);
    let output = run(runner.as_ref(), args, &opts).await?;
    let listed: Vec<ListedImage> = output.json()?;

    let mut set = JoinSet::new();
    for image in listed {
        let runner = Arc::clone(runner);
        set.spawn(async move { fetch_reference(runner.as_ref(), image).await });
    }

    let mut tagged = Vec::new();
    while let Some(joined) = set.join_next().await {
        let item = joined.map_err(|e| OpsError::Failed(format!("listing task failed: {}", e)))?;
        tagged.push(item?);
    }

    Ok(group_by_digest(tagged))
}

/// Fetch the index and per-platform metadata for one reference.
async fn fetch_reference(
    runner: &dyn Runner,
    image: ListedImage,
) -> Result<TaggedImage, OpsError> {
    let opts = ExecOptions::with_timeout(runner.timeouts().default);
    let args = ArgBuilder::new(["images", "inspect"])
        .arg(&image.reference)
        .build();
    let output = run(runner, args, &opts).await?;
    let mut inspected: Vec<InspectedImage> = output.json()?;
    if inspected.is_empty() {
        return Err(OpsError::NotFound(format!("image {}", image.reference)));
    }
    let index = inspected.remove(0).index;

    let mut variants = Vec::new();
    for descriptor in &index.manifests {
        if descriptor.is_attestation() {
            continue;
        }
        let Some(platform) = &descriptor.platform else {
            continue;
        };

        let args = ArgBuilder::new(["images", "inspect"])
            .arg(&image.reference)
            .opt("platform", Some(platform))
            .build();
        // A platform whose blobs are missing locally is skipped, not fatal.
        let Ok(output) = run(runner, args, &opts).await else {
            continue;
        };
        let Ok(mut details) = output.json::<Vec<PlatformDetail>>() else {
            continue;
        };
        if details.is_empty() {
            continue;
        }
        let detail = details.remove(0);
        variants.push(ImageVariant {
            descriptor: descriptor.clone(),
            config: detail.config,
            manifest: detail.manifest,
        });
    }

    Ok(TaggedImage {
        digest: image.digest,
        reference: image.reference,
        schema_version: index.schema_version,
        media_type: index.media_type,
        variants,
        annotations: index.annotations,
    })
}

/// Collapse per-reference fetches into one record per digest.
fn group_by_digest(tagged: Vec<TaggedImage>) -> Vec<ImageRecord> {
    let mut by_digest: BTreeMap<String, ImageRecord> = BTreeMap::new();
    for item in tagged {
        match by_digest.get_mut(&item.digest) {
            Some(record) => {
                record.references.push(item.reference);
            }
            None => {
                by_digest.insert(
                    item.digest.clone(),
                    ImageRecord {
                        digest: item.digest,
                        references: vec![item.reference],
                        schema_version: item.schema_version,
                        media_type: item.media_type,
                        variants: item.variants,
                        annotations: item.annotations,
                    },
                );
            }
        }
    }

    let mut records: Vec<ImageRecord> = by_digest.into_values().collect();
    for record in &mut records {
        record.references.sort();
    }
    records
}

/// Options shared by pull and push.
#[derive(Debug, Clone, Default)]
pub struct TransferRequest {
    pub reference: String,
    pub platform: Option<String>,
    pub scheme: Option<String>,
    pub disable_progress: bool,
}

impl TransferRequest {
    fn argv(&self, verb: &str) -> Vec<String> {
        ArgBuilder::new(["images", verb])
            .opt("platform", self.platform.as_ref())
            .opt("scheme", self.scheme.as_ref())
            .flag("disable-progress-updates", self.disable_progress)
            .arg(&self.reference)
            .build()
    }
}

/// Pull an image from a registry.
pub async fn pull(runner: &dyn Runner, req: &TransferRequest) -> Result<String, OpsError> {
    let opts = ExecOptions::with_timeout(runner.timeouts().transfer);
    let output = run(runner, req.argv("pull"), &opts).await?;
    Ok(output.stdout.trim().to_string())
}

/// Push an image to a registry.
pub async fn push(runner: &dyn Runner, req: &TransferRequest) -> Result<String, OpsError> {
    let opts = ExecOptions::with_timeout(runner.timeouts().transfer);
    let output = run(runner, req.argv("push"), &opts).await?;
    Ok(output.stdout.trim().to_string())
}

/// Tag a source image with a new reference.
pub async fn tag(runner: &dyn Runner, source: &str, target: &str) -> Result<(), OpsError> {
    let args = ArgBuilder::new(["images", "tag"])
        .arg(source)
        .arg(target)
        .build();
    run(runner, args, &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    Ok(())
}

/// Delete the named images, or all of them.
pub async fn delete(runner: &dyn Runner, references: &[String], all: bool) -> Result<(), OpsError> {
    if !all && references.is_empty() {
        return Err(OpsError::Invalid(
            "specify images to delete, or delete all".to_string(),
        ));
    }
    let mut builder = ArgBuilder::new(["images", "delete"]).flag("all", all);
    if !all {
        builder = builder.args(references.iter().cloned());
    }
    run(runner, builder.build(), &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    Ok(())
}

/// Save an image to a tar archive.
pub async fn save(
    runner: &dyn Runner,
    reference: &str,
    output_path: &str,
    platform: Option<&str>,
) -> Result<(), OpsError> {
    let args = ArgBuilder::new(["images", "save"])
        .opt("platform", platform)
        .opt("output", Some(output_path))
        .arg(reference)
        .build();
    run(runner, args, &ExecOptions::with_timeout(runner.timeouts().build)).await?;
    Ok(())
}

/// Load images from a tar archive.
pub async fn load(runner: &dyn Runner, input_path: &str) -> Result<String, OpsError> {
    let args = ArgBuilder::new(["images", "load"])
        .opt("input", Some(input_path))
        .build();
    let output = run(runner, args, &ExecOptions::with_timeout(runner.timeouts().build)).await?;
    Ok(output.stdout.trim().to_string())
}

/// Remove unreferenced images, returning the runtime's report.
pub async fn prune(runner: &dyn Runner) -> Result<String, OpsError> {
    let args = ArgBuilder::new(["images", "prune"]).build();
    let output = run(runner, args, &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    Ok(output.stdout.trim().to_string())
}

/// Inspect images by reference, returning the raw JSON.
pub async fn inspect(
    runner: &dyn Runner,
    references: &[String],
) -> Result<serde_json::Value, OpsError> {
    if references.is_empty() {
        return Err(OpsError::Invalid("specify at least one image".to_string()));
    }
    let args = ArgBuilder::new(["images", "inspect"])
        .args(references.iter().cloned())
        .build();
    let output = run(runner, args, &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    Ok(output.json()?)
}

/// Options for building an image.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    pub context_dir: Option<String>,
    pub dockerfile: Option<String>,
    pub tag: Option<String>,
    pub build_args: Vec<String>,
    pub labels: Vec<String>,
    pub no_cache: bool,
    pub target: Option<String>,
    pub quiet: bool,
    pub cpus: Option<String>,
    pub memory: Option<String>,
}

impl BuildRequest {
    fn argv(&self) -> Vec<String> {
        ArgBuilder::new(["build"])
            .opt("file", self.dockerfile.as_ref())
            .opt("tag", self.tag.as_ref())
            .opt_each("build-arg", self.build_args.iter().cloned())
            .opt_each("label", self.labels.iter().cloned())
            .flag("no-cache", self.no_cache)
            .opt("target", self.target.as_ref())
            .flag("quiet", self.quiet)
            .opt("cpus", self.cpus.as_ref())
            .opt("memory", self.memory.as_ref())
            .arg(self.context_dir.as_deref().unwrap_or("."))
            .build()
    }
}

/// Build an image from a build context.
pub async fn build(runner: &dyn Runner, req: &BuildRequest) -> Result<String, OpsError> {
    let opts = ExecOptions::with_timeout(runner.timeouts().build);
    let output = run(runner, req.argv(), &opts).await?;
    Ok(output.stdout.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RecordingRunner;
    use serde_json::json;

    fn index_json(manifests: serde_json::Value) -> serde_json::Value {
        json!({
            "schemaVersion": 2,
            "mediaType": "application/vnd.oci.image.index.v1+json",
            "manifests": manifests
        })
    }

    fn manifest_descriptor(digest: &str, platform: Option<serde_json::Value>) -> serde_json::Value {
        let mut d = json!({
            "mediaType": "application/vnd.oci.image.manifest.v1+json",
            "digest": digest,
            "size": 428
        });
        if let Some(p) = platform {
            d["platform"] = p;
        }
        d
    }

    fn platform_detail() -> serde_json::Value {
        json!([{
            "config": {"os": "linux", "architecture": "arm64"},
            "manifest": {
                "schemaVersion": 2,
                "mediaType": "application/vnd.oci.image.manifest.v1+json",
                "config": {"mediaType": "application/vnd.oci.image.config.v1+json",
                           "digest": "sha256:cfg", "size": 10},
                "layers": [{"mediaType": "application/vnd.oci.image.layer.v1.tar+gzip",
                            "digest": "sha256:l1", "size": 500}]
            }
        }])
    }

    fn shared(runner: RecordingRunner) -> Arc<dyn Runner> {
        Arc::new(runner)
    }

    #[tokio::test]
    async fn list_aggregates_platforms() {
        let mock = RecordingRunner::new();
        mock.respond_json(
            &["images", "list"],
            json!([{"reference": "alpine:latest", "digest": "sha256:idx"}]),
        );
        mock.respond_json(
            &["images", "inspect", "alpine:latest"],
            json!([{
                "reference": "alpine:latest",
                "digest": "sha256:idx",
                "index": index_json(json!([
                    manifest_descriptor("sha256:m1", Some(json!({"os": "linux", "architecture": "arm64"})))
                ]))
            }]),
        );
        mock.respond_json(
            &["images", "inspect", "alpine:latest", "--platform", "linux/arm64"],
            platform_detail(),
        );

        let runner = shared(mock.clone());
        let records = list(&runner).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].digest, "sha256:idx");
        assert_eq!(records[0].references, vec!["alpine:latest"]);
        assert_eq!(records[0].variants.len(), 1);
        assert_eq!(records[0].total_size(), 500);
    }

    #[tokio::test]
    async fn list_skips_attestation_and_platformless_descriptors() {
        let mock = RecordingRunner::new();
        mock.respond_json(
            &["images", "list"],
            json!([{"reference": "web:1", "digest": "sha256:d1"}]),
        );

        let mut attestation =
            manifest_descriptor("sha256:att", Some(json!({"os": "unknown", "architecture": "unknown"})));
        attestation["annotations"] =
            json!({"vnd.docker.reference.type": "attestation-manifest"});

        mock.respond_json(
            &["images", "inspect", "web:1"],
            json!([{
                "reference": "web:1",
                "digest": "sha256:d1",
                "index": index_json(json!([
                    attestation,
                    manifest_descriptor("sha256:bare", None),
                    manifest_descriptor("sha256:ok", Some(json!({"os": "linux", "architecture": "arm64"})))
                ]))
            }]),
        );
        mock.respond_json(
            &["images", "inspect", "web:1", "--platform", "linux/arm64"],
            platform_detail(),
        );

        let runner = shared(mock.clone());
        let records = list(&runner).await.unwrap();

        assert_eq!(records[0].variants.len(), 1);
        assert_eq!(records[0].variants[0].descriptor.digest, "sha256:ok");
        // Only the runnable platform was resolved.
        assert!(!mock.was_called_with(&["images", "inspect", "web:1", "--platform", "unknown/unknown"]));
    }

    #[tokio::test]
    async fn list_tolerates_per_platform_failure() {
        let mock = RecordingRunner::new();
        mock.respond_json(
            &["images", "list"],
            json!([{"reference": "multi:1", "digest": "sha256:d2"}]),
        );
        mock.respond_json(
            &["images", "inspect", "multi:1"],
            json!([{
                "reference": "multi:1",
                "digest": "sha256:d2",
                "index": index_json(json!([
                    manifest_descriptor("sha256:a", Some(json!({"os": "linux", "architecture": "amd64"}))),
                    manifest_descriptor("sha256:b", Some(json!({"os": "linux", "architecture": "arm64"})))
                ]))
            }]),
        );
        mock.respond_fail(
            &["images", "inspect", "multi:1", "--platform", "linux/amd64"],
            1,
            "blob not found locally",
        );
        mock.respond_json(
            &["images", "inspect", "multi:1", "--platform", "linux/arm64"],
            platform_detail(),
        );

        let runner = shared(mock.clone());
        let records = list(&runner).await.unwrap();

        assert_eq!(records[0].variants.len(), 1);
        assert_eq!(records[0].variants[0].descriptor.digest, "sha256:b");
    }

    #[tokio::test]
    async fn list_merges_tags_sharing_a_digest() {
        let mock = RecordingRunner::new();
        mock.respond_json(
            &["images", "list"],
            json!([
                {"reference": "app:latest", "digest": "sha256:same"},
                {"reference": "app:1.2.3", "digest": "sha256:same"}
            ]),
        );
        for reference in ["app:latest", "app:1.2.3"] {
            mock.respond_json(
                &["images", "inspect", reference],
                json!([{
                    "reference": reference,
                    "digest": "sha256:same",
                    "index": index_json(json!([]))
                }]),
            );
        }

        let runner = shared(mock.clone());
        let records = list(&runner).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].references, vec!["app:1.2.3", "app:latest"]);
    }

    #[tokio::test]
    async fn pull_argv_shape() {
        let runner = RecordingRunner::new();
        runner.respond_ok(&["images", "pull"], "pulled");

        let req = TransferRequest {
            reference: "ubuntu:latest".into(),
            platform: Some("linux/arm64".into()),
            scheme: None,
            disable_progress: true,
        };
        let report = pull(&runner, &req).await.unwrap();
        assert_eq!(report, "pulled");
        assert_eq!(
            runner.calls()[0],
            vec![
                "images",
                "pull",
                "--platform",
                "linux/arm64",
                "--disable-progress-updates",
                "ubuntu:latest"
            ]
        );
    }

    #[tokio::test]
    async fn transfers_run_under_the_runner_timeout() {
        use crate::runtime::Timeouts;
        use std::time::Duration;

        let runner = RecordingRunner::new();
        runner.set_timeouts(Timeouts {
            transfer: Duration::from_secs(1200),
            ..Timeouts::default()
        });
        runner.respond_ok(&["images", "pull"], "pulled");

        let req = TransferRequest {
            reference: "ubuntu:latest".into(),
            ..TransferRequest::default()
        };
        pull(&runner, &req).await.unwrap();

        assert_eq!(runner.call_timeouts()[0], Some(Duration::from_secs(1200)));
    }

    #[tokio::test]
    async fn delete_requires_target_or_all() {
        let runner = RecordingRunner::new();
        let err = delete(&runner, &[], false).await.unwrap_err();
        assert!(matches!(err, OpsError::Invalid(_)));
        assert_eq!(runner.call_count(), 0);

        runner.respond_ok(&["images", "delete", "--all"], "");
        delete(&runner, &[], true).await.unwrap();
        assert_eq!(runner.calls()[0], vec!["images", "delete", "--all"]);
    }

    #[tokio::test]
    async fn build_argv_shape() {
        let runner = RecordingRunner::new();
        runner.respond_ok(&["build"], "sha256:built");

        let req = BuildRequest {
            dockerfile: Some("Dockerfile.prod".into()),
            tag: Some("app:1".into()),
            build_args: vec!["A=1".into()],
            no_cache: true,
            ..BuildRequest::default()
        };
        build(&runner, &req).await.unwrap();
        assert_eq!(
            runner.calls()[0],
            vec![
                "build",
                "--file",
                "Dockerfile.prod",
                "--tag",
                "app:1",
                "--build-arg",
                "A=1",
                "--no-cache",
                "."
            ]
        );
    }

    #[tokio::test]
    async fn save_argv_shape() {
        let runner = RecordingRunner::new();
        runner.respond_ok(&["images", "save"], "");

        save(&runner, "app:1", "/tmp/app.tar", None).await.unwrap();
        assert_eq!(
            runner.calls()[0],
            vec!["images", "save", "--output", "/tmp/app.tar", "app:1"]
        );
    }
}
