use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub login: String,
    /// Argon2id PHC string; never rendered.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Unsaved record stamped with the current time. `id` is assigned on insert.
    pub fn new(login: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            login: login.into(),
            password: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Page {
    pub id: i64,
    pub slug: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn new(slug: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            slug: slug.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_json_hides_password() {
        let user = User::new("admin", "$argon2id$secret");
        let json = serde_json::to_string_pretty(&user).expect("serialize");
        assert!(json.contains("\"login\": \"admin\""));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn new_records_share_timestamps() {
        let page = Page::new("about", "hello");
        assert_eq!(page.id, 0);
        assert_eq!(page.created_at, page.updated_at);
    }
}
