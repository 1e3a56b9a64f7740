//! Storage module for artifact bytes
//!
//! Defines the `BlobStore` seam used by the artifact service and the
//! MinIO/S3-compatible implementation used in production.

mod blob_store;
mod minio_client;

pub use blob_store::{BlobStore, BoxReader};
pub use minio_client::MinIOClient;
