use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account row. `password_hash` never leaves the process: it is skipped on
/// serialization so a `User` can be returned in API payloads as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: crate::task::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_not_serialized() {
        let user = User::new("a@example.com", "$argon2id$secret");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "a@example.com");
        assert!(json.get("password_hash").is_none());
    }
}
