//! Domain entities mirrored from persistent storage.
//!
//! Every entity carries `created_at`, `updated_at` and an optional `deleted_at`.
//! A present `deleted_at` is the soft-delete marker: the row still exists but is
//! excluded from every default read.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Drop sub-microsecond precision, which Postgres `TIMESTAMPTZ` does not keep.
pub fn to_store_precision(at: OffsetDateTime) -> OffsetDateTime {
    at.replace_nanosecond(at.nanosecond() / 1_000 * 1_000)
        .unwrap_or(at)
}

/// Current UTC time as the store will persist it.
///
/// Write-through entries are cached from the in-memory record, so every
/// timestamp a service stamps must already match the committed row.
pub fn stored_now() -> OffsetDateTime {
    to_store_precision(OffsetDateTime::now_utc())
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    /// Never written to the cache; only the uncached email lookup needs it.
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
}

impl UserRecord {
    pub fn new(email: String, username: String, password_hash: String, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Profile visible to other users: the email address is withheld.
    pub fn public_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: None,
            username: self.username.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Profile returned to the owner of the account.
    pub fn self_profile(&self) -> UserProfile {
        UserProfile {
            email: Some(self.email.clone()),
            ..self.public_profile()
        }
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("deleted_at", &self.deleted_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub username: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    /// `Some` once the post is published.
    pub published_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
}

impl PostRecord {
    pub fn new(
        user_id: Uuid,
        title: String,
        slug: String,
        content: String,
        published_at: Option<OffsetDateTime>,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            slug,
            content,
            published_at,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }

    pub fn mark_deleted(&mut self, now: OffsetDateTime) {
        self.deleted_at = Some(now);
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn belongs_to(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_user() -> UserRecord {
        UserRecord::new(
            "reader@example.com".to_string(),
            "reader".to_string(),
            "hashed-secret".to_string(),
            datetime!(2024-03-01 10:00 UTC),
        )
    }

    #[test]
    fn user_json_omits_password_hash() {
        let user = sample_user();
        let json = serde_json::to_string(&user).expect("serialize user");
        assert!(!json.contains("hashed-secret"));

        let decoded: UserRecord = serde_json::from_str(&json).expect("deserialize user");
        assert_eq!(decoded.id, user.id);
        assert!(decoded.password_hash.is_empty());
    }

    #[test]
    fn debug_output_redacts_password_hash() {
        let rendered = format!("{:?}", sample_user());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hashed-secret"));
    }

    #[test]
    fn public_profile_hides_email() {
        let user = sample_user();
        assert_eq!(user.public_profile().email, None);
        assert_eq!(
            user.self_profile().email.as_deref(),
            Some("reader@example.com")
        );
    }

    #[test]
    fn store_precision_truncates_to_microseconds() {
        let at = datetime!(2024-03-01 10:00:00.123_456_789 UTC);

        let truncated = to_store_precision(at);
        assert_eq!(truncated, datetime!(2024-03-01 10:00:00.123_456 UTC));
        assert_eq!(to_store_precision(truncated), truncated);
        assert_eq!(stored_now().nanosecond() % 1_000, 0);
    }

    #[test]
    fn soft_delete_marker_is_optional_timestamp() {
        let now = datetime!(2024-03-01 10:00 UTC);
        let mut post = PostRecord::new(
            Uuid::new_v4(),
            "A sample title".to_string(),
            "a-sample-title".to_string(),
            "body".to_string(),
            None,
            now,
        );
        assert!(!post.is_deleted());
        assert!(!post.is_published());

        let later = datetime!(2024-03-02 10:00 UTC);
        post.mark_deleted(later);
        post.touch(later);
        assert_eq!(post.deleted_at, Some(later));
        assert_eq!(post.updated_at, later);
        assert_eq!(post.created_at, now);
    }
}
