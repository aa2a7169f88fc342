//! Cache key definitions.

use std::fmt;

use uuid::Uuid;

/// Addresses the cached copy of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    User(Uuid),
    Post(Uuid),
}

impl CacheKey {
    /// Render the key, namespaced as `{prefix}:{key}` when a prefix is set.
    pub fn render(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) => format!("{prefix}:{self}"),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::User(id) => write!(f, "user-cache-key-{id}"),
            CacheKey::Post(id) => write!(f, "post-cache-key-{id}"),
        }
    }
}
