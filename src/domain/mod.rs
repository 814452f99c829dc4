//! Immutable value types shared across the resolve pipeline.

pub mod descriptor;
pub mod tag;
pub mod version;

pub use descriptor::{RepositoryDescriptor, NO_TAG_VERSION};
pub use tag::ImageTag;
pub use version::VersionIdentity;
