//! Password hashing off the async runtime
//!
//! Argon2 is deliberately slow, so every hash and verify runs on the
//! blocking thread pool.

use platform::password::{ClearTextPassword, CredentialHasher, HashCost, HashedPassword};

use crate::error::LmsResult;

/// Cleartext behind the placeholder hash checked for unknown accounts
const PLACEHOLDER_PASSWORD: &str = "placeholder-for-unknown-accounts";

#[derive(Debug, Clone)]
pub struct PasswordService {
    hasher: CredentialHasher,
    /// Verified when no account matches, so both paths pay for one Argon2 run
    placeholder: HashedPassword,
}

impl PasswordService {
    pub fn new(cost: HashCost) -> LmsResult<Self> {
        let hasher = CredentialHasher::new(cost)?;
        let placeholder =
            hasher.hash(&ClearTextPassword::unchecked(PLACEHOLDER_PASSWORD.to_string()))?;
        Ok(Self {
            hasher,
            placeholder,
        })
    }

    pub async fn hash(&self, password: ClearTextPassword) -> LmsResult<HashedPassword> {
        let hasher = self.hasher.clone();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
        Ok(hashed)
    }

    pub async fn verify(
        &self,
        password: ClearTextPassword,
        hashed: HashedPassword,
    ) -> LmsResult<bool> {
        let hasher = self.hasher.clone();
        let valid = tokio::task::spawn_blocking(move || hasher.verify(&password, &hashed)).await?;
        Ok(valid)
    }

    /// Spend the same work as [`Self::verify`] for an account that does not exist
    ///
    /// Always `false`.
    pub async fn verify_missing(&self, password: ClearTextPassword) -> LmsResult<bool> {
        self.verify(password, self.placeholder.clone()).await?;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PasswordService {
        PasswordService::new(HashCost::MINIMUM).unwrap()
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let service = service();
        let hashed = service
            .hash(ClearTextPassword::new("Abcdef1".to_string()).unwrap())
            .await
            .unwrap();

        assert!(
            service
                .verify(ClearTextPassword::unchecked("Abcdef1".to_string()), hashed.clone())
                .await
                .unwrap()
        );
        assert!(
            !service
                .verify(ClearTextPassword::unchecked("Abcdef2".to_string()), hashed)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_verify_missing_never_matches() {
        let service = service();
        let guess = ClearTextPassword::unchecked(PLACEHOLDER_PASSWORD.to_string());

        assert!(!service.verify_missing(guess).await.unwrap());
    }
}
