//! Supporting services.

pub mod artifact_store;

pub use artifact_store::{ArtifactStore, StoredArtifact};
