mod artifact_repository;

pub use artifact_repository::{ArtifactRepository, PgArtifactRepository};
