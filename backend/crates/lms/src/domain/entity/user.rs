//! User Entity

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{Email, UserName, UserRole};

/// Registered account
///
/// Older documents store the hash under `password` and may omit `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(alias = "password", default)]
    pub password_hash: HashedPassword,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn register(
        id: UserId,
        name: UserName,
        email: Email,
        password_hash: HashedPassword,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.as_str().to_string(),
            email,
            password_hash,
            role,
            created_at: Some(now),
        }
    }

    /// Registering again with a known email replaces name, hash and role
    pub fn reregister(&mut self, name: UserName, password_hash: HashedPassword, role: UserRole) {
        self.name = name.as_str().to_string();
        self.password_hash = password_hash;
        self.role = role;
    }

    pub fn set_password(&mut self, password_hash: HashedPassword) {
        self.password_hash = password_hash;
    }

    pub fn set_email(&mut self, email: Email) {
        self.email = email;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_document() {
        let json = r#"{"id":3,"name":"Old","email":"Old@X.com","password":"$2b$10$abc","role":"admin"}"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert_eq!(user.id.value(), 3);
        assert_eq!(user.password_hash.as_phc_string(), "$2b$10$abc");
        assert!(user.created_at.is_none());
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn test_serializes_password_hash_key() {
        let user = User::register(
            UserId::new(1),
            UserName::new("Ann").unwrap(),
            Email::new("ann@x.com").unwrap(),
            HashedPassword::from_stored("$argon2id$x"),
            UserRole::Student,
            Utc::now(),
        );
        let value = serde_json::to_value(&user).unwrap();

        assert_eq!(value["passwordHash"], "$argon2id$x");
        assert!(value.get("password").is_none());
        assert!(value["createdAt"].is_string());
    }
}
