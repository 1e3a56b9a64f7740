use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for artifact metadata
#[derive(Debug, Clone, FromRow)]
pub struct Artifact {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub upload_date: DateTime<Utc>,
    /// Object key of the bytes in the blob store
    pub blob_ref: String,
    pub like_count: i32,
    pub liked_by_users: Vec<String>,
}

impl Artifact {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.liked_by_users.iter().any(|u| u == user_id)
    }
}

/// Fields supplied when recording a freshly uploaded artifact
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub blob_ref: String,
}

/// Sort orders supported by the paginated listing, both descending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactSort {
    /// Most recent first
    #[default]
    UploadDate,
    /// Most liked first
    Likes,
}

impl ArtifactSort {
    /// Parse a `sortBy` value case-insensitively; anything unrecognised sorts by upload date
    pub fn from_query(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "likes" => ArtifactSort::Likes,
            _ => ArtifactSort::UploadDate,
        }
    }
}
