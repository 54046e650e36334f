//! model
//!
//! Serde mirrors of the container runtime's JSON vocabulary.
//!
//! # Design
//!
//! This repository does not own the data model: containers, images, OCI
//! descriptors, and platforms are defined by the external runtime and the
//! OCI image specification. These types deserialize what the daemon reports
//! and re-serialize it unchanged. Fields the runtime may omit are optional
//! or defaulted; unknown fields are ignored rather than rejected.

pub mod container;
pub mod image;
pub mod signal;
pub mod system;

pub use container::{ContainerConfig, ContainerRecord, ContainerStatus};
pub use image::{
    ImageIndex, ImageRecord, ImageVariant, OciDescriptor, OciImageConfig, OciManifest, Platform,
};
pub use signal::Signal;
pub use system::SystemStatus;
