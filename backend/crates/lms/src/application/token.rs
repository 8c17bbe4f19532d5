//! Token Service
//!
//! Issues and verifies bearer tokens carrying `{id, email, role}`.
//! Tokens cannot be revoked; expiry is the only cutoff.

use std::time::Duration;

use chrono::Utc;
use kernel::id::UserId;
use platform::jwt::JwtSigner;
use serde::{Deserialize, Serialize};

use crate::domain::User;
use crate::domain::value_object::UserRole;
use crate::error::{LmsError, LmsResult};

/// Who a request is acting as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_string(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: UserId,
    email: String,
    role: UserRole,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
pub struct TokenService {
    signer: JwtSigner,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            signer: JwtSigner::new(secret),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issue(&self, identity: &Identity) -> LmsResult<String> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    fn issue_at(&self, identity: &Identity, issued_at: i64) -> LmsResult<String> {
        let claims = Claims {
            id: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            iat: issued_at,
            exp: issued_at + self.lifetime.as_secs() as i64,
        };

        self.signer
            .sign(&claims)
            .map_err(|e| LmsError::Internal(e.to_string()))
    }

    /// `None` for any bad signature, expired or malformed token
    pub fn verify(&self, token: &str) -> Option<Identity> {
        match self.signer.verify::<Claims>(token) {
            Ok(claims) => Some(Identity {
                id: claims.id,
                email: claims.email,
                role: claims.role,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: UserId::new(7),
            email: "ann@x.com".to_string(),
            role: UserRole::Student,
        }
    }

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::from_secs(3600))
    }

    #[test]
    fn test_round_trip() {
        let service = service();
        let token = service.issue(&identity()).unwrap();
        assert_eq!(service.verify(&token), Some(identity()));
    }

    #[test]
    fn test_expired_token() {
        let service = service();
        let two_hours_ago = Utc::now().timestamp() - 7200;
        let token = service.issue_at(&identity(), two_hours_ago).unwrap();
        assert_eq!(service.verify(&token), None);
    }

    #[test]
    fn test_tampered_token() {
        let service = service();
        let token = service.issue(&identity()).unwrap();

        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert_eq!(service.verify(&tampered), None);
        assert_eq!(service.verify("garbage"), None);
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = service().issue(&identity()).unwrap();
        let other = TokenService::new(b"other-secret", Duration::from_secs(3600));
        assert_eq!(other.verify(&token), None);
    }
}
