use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a user profile
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    /// Artifact id used as the avatar, not checked against `artifacts`
    pub avatar_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
}

/// Merge-patch for a profile; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_id: Option<String>,
}

