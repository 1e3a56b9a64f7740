mod artifact;

pub use artifact::{Artifact, ArtifactSort, NewArtifact};
