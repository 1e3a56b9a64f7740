//! In-memory stores used by service and handler tests

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::artifacts::models::{Artifact, ArtifactSort, NewArtifact};
use crate::features::artifacts::repositories::ArtifactRepository;
use crate::features::artifacts::services::ArtifactService;
use crate::features::profiles::models::{NewProfile, Profile, ProfilePatch};
use crate::features::profiles::repositories::ProfileRepository;
use crate::features::profiles::services::ProfileService;
use crate::modules::storage::{BlobStore, BoxReader};
use crate::shared::types::PageRequest;

pub fn reader_from(bytes: Vec<u8>) -> BoxReader {
    Box::new(Cursor::new(bytes))
}

pub async fn read_all(mut reader: BoxReader) -> Vec<u8> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await.unwrap();
    buf
}

// =============================================================================
// BLOB STORE
// =============================================================================

#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    failing: bool,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    pub fn remove(&self, key: &str) {
        self.blobs.lock().unwrap().remove(key);
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put_stream(
        &self,
        key: &str,
        mut reader: BoxReader,
        _content_type: &str,
    ) -> std::result::Result<(), AppError> {
        if self.failing {
            return Err(AppError::Storage("simulated outage".to_string()));
        }

        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        self.blobs.lock().unwrap().insert(key.to_string(), buf);
        Ok(())
    }

    async fn get_stream(&self, key: &str) -> std::result::Result<Option<BoxReader>, AppError> {
        Ok(self.get_bytes(key).map(reader_from))
    }

    async fn exists(&self, key: &str) -> std::result::Result<bool, AppError> {
        Ok(self.blobs.lock().unwrap().contains_key(key))
    }

    async fn delete(&self, key: &str) -> std::result::Result<bool, AppError> {
        Ok(self.blobs.lock().unwrap().remove(key).is_some())
    }

    fn generate_key(&self, file_name: &str) -> String {
        format!("artifacts/{}_{}", Uuid::new_v4(), file_name)
    }
}

// =============================================================================
// ARTIFACT REPOSITORY
// =============================================================================

#[derive(Default)]
struct ArtifactTable {
    rows: HashMap<Uuid, Artifact>,
    inserted: i64,
}

/// Artifact store with the same ordering and like semantics as Postgres.
///
/// Each insert is stamped one second after the previous so upload order is stable.
pub struct InMemoryArtifactRepository {
    table: Mutex<ArtifactTable>,
    epoch: DateTime<Utc>,
    failing_inserts: bool,
}

impl InMemoryArtifactRepository {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(ArtifactTable::default()),
            epoch: Utc::now(),
            failing_inserts: false,
        }
    }

    pub fn failing_inserts() -> Self {
        Self {
            failing_inserts: true,
            ..Self::new()
        }
    }

    fn sorted(&self, filter: impl Fn(&Artifact) -> bool) -> Vec<Artifact> {
        let table = self.table.lock().unwrap();
        let mut rows: Vec<Artifact> = table.rows.values().filter(|a| filter(a)).cloned().collect();
        rows.sort_by(|a, b| b.upload_date.cmp(&a.upload_date).then(a.id.cmp(&b.id)));
        rows
    }

    fn modify(&self, id: Uuid, f: impl FnOnce(&mut Artifact)) -> Option<Artifact> {
        let mut table = self.table.lock().unwrap();
        table.rows.get_mut(&id).map(|artifact| {
            f(artifact);
            artifact.clone()
        })
    }
}

#[async_trait]
impl ArtifactRepository for InMemoryArtifactRepository {
    async fn insert(&self, artifact: NewArtifact) -> Result<Artifact> {
        if self.failing_inserts {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut table = self.table.lock().unwrap();
        table.inserted += 1;
        let row = Artifact {
            id: artifact.id,
            file_name: artifact.file_name,
            content_type: artifact.content_type,
            file_size: artifact.file_size,
            upload_date: self.epoch + Duration::seconds(table.inserted),
            blob_ref: artifact.blob_ref,
            like_count: 0,
            liked_by_users: Vec::new(),
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Artifact>> {
        Ok(self.table.lock().unwrap().rows.get(&id).cloned())
    }

    async fn find_page(&self, sort: ArtifactSort, page: PageRequest) -> Result<Vec<Artifact>> {
        let mut rows = self.sorted(|_| true);
        if sort == ArtifactSort::Likes {
            rows.sort_by(|a, b| b.like_count.cmp(&a.like_count).then(a.id.cmp(&b.id)));
        }
        Ok(rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.table.lock().unwrap().rows.len() as i64)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        Ok(self.table.lock().unwrap().rows.remove(&id).is_some())
    }

    async fn toggle_like(&self, id: Uuid, user_id: &str) -> Result<Option<Artifact>> {
        Ok(self.modify(id, |a| {
            if a.is_liked_by(user_id) {
                a.liked_by_users.retain(|u| u != user_id);
                a.like_count = (a.like_count - 1).max(0);
            } else {
                a.liked_by_users.push(user_id.to_string());
                a.like_count += 1;
            }
        }))
    }

    async fn increment_like(&self, id: Uuid) -> Result<Option<Artifact>> {
        Ok(self.modify(id, |a| a.like_count += 1))
    }

    async fn decrement_like(&self, id: Uuid) -> Result<Option<Artifact>> {
        Ok(self.modify(id, |a| a.like_count = (a.like_count - 1).max(0)))
    }

    async fn search_by_file_name(&self, fragment: &str) -> Result<Vec<Artifact>> {
        let needle = fragment.to_lowercase();
        Ok(self.sorted(|a| a.file_name.to_lowercase().contains(&needle)))
    }

    async fn find_by_content_type(&self, content_type: &str) -> Result<Vec<Artifact>> {
        Ok(self.sorted(|a| a.content_type == content_type))
    }
}

// =============================================================================
// PROFILE REPOSITORY
// =============================================================================

#[derive(Default)]
pub struct InMemoryProfileRepository {
    rows: Mutex<Vec<Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn insert(&self, profile: NewProfile) -> Result<Profile> {
        let now = Utc::now();
        let row = Profile {
            id: profile.id,
            display_name: profile.display_name,
            email: profile.email,
            avatar_id: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Profile>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<Option<Profile>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|p| p.id == id).map(|p| {
            if let Some(display_name) = patch.display_name {
                p.display_name = display_name;
            }
            if let Some(email) = patch.email {
                p.email = email;
            }
            if let Some(avatar_id) = patch.avatar_id {
                p.avatar_id = Some(avatar_id);
            }
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        let mut rows = self.rows.lock().unwrap();
        let index = rows.iter().position(|p| p.id == id);
        Ok(index.map(|i| rows.remove(i)))
    }
}

// =============================================================================
// ROUTERS
// =============================================================================

/// Artifact service over fresh in-memory stores, with the blob store exposed
pub fn artifact_service() -> (Arc<ArtifactService>, Arc<InMemoryBlobStore>) {
    let blob_store = Arc::new(InMemoryBlobStore::new());
    let service = ArtifactService::new(
        Arc::new(InMemoryArtifactRepository::new()),
        blob_store.clone(),
    );
    (Arc::new(service), blob_store)
}

pub fn artifacts_router() -> (Router, Arc<ArtifactService>, Arc<InMemoryBlobStore>) {
    let (service, blob_store) = artifact_service();
    let router = crate::features::artifacts::routes(service.clone());
    (router, service, blob_store)
}

pub fn profiles_router() -> Router {
    let service = ProfileService::new(Arc::new(InMemoryProfileRepository::new()));
    crate::features::profiles::routes(Arc::new(service))
}
