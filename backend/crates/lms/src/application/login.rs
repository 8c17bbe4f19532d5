//! Login Use Case
//!
//! Unknown email and wrong password fail with the same error, after the
//! same amount of hashing, so callers cannot tell which emails exist.
//! Accounts still on a legacy bcrypt hash are moved to Argon2id on login.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::context::DataContext;
use crate::application::credentials::PasswordService;
use crate::application::token::{Identity, TokenService};
use crate::domain::User;
use crate::domain::repository::EntityStore;
use crate::domain::value_object::{Email, UserRole};
use crate::error::{LmsError, LmsResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Login output
pub struct LoginOutput {
    pub user: User,
    pub token: String,
}

/// Login use case
pub struct LoginUseCase<S> {
    data: Arc<DataContext<S>>,
    passwords: Arc<PasswordService>,
    tokens: Arc<TokenService>,
}

impl<S> LoginUseCase<S>
where
    S: EntityStore + Sync,
{
    pub fn new(
        data: Arc<DataContext<S>>,
        passwords: Arc<PasswordService>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            data,
            passwords,
            tokens,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> LmsResult<LoginOutput> {
        let email = Email::new(input.email)?;
        let password = ClearTextPassword::unchecked(input.password);
        if password.is_blank() {
            return Err(LmsError::validation("password", "Password is required"));
        }
        let role: UserRole = input.role.parse()?;

        let found = self
            .data
            .read(|data| data.user_by_email(&email).cloned())
            .await;
        let Some(mut user) = found else {
            self.passwords.verify_missing(password).await?;
            return Err(LmsError::InvalidCredentials);
        };

        let valid = self
            .passwords
            .verify(password.clone(), user.password_hash.clone())
            .await?;
        if !valid {
            return Err(LmsError::InvalidCredentials);
        }

        if user.role != role {
            return Err(LmsError::RoleMismatch);
        }

        if user.password_hash.is_legacy() {
            self.upgrade_hash(&mut user, password).await;
        }

        let token = self.tokens.issue(&Identity::from(&user))?;
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginOutput { user, token })
    }

    /// Replace a legacy bcrypt hash with Argon2id
    ///
    /// The login already succeeded, so failures are logged and ignored.
    async fn upgrade_hash(&self, user: &mut User, password: ClearTextPassword) {
        let new_hash = match self.passwords.hash(password).await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Legacy hash upgrade failed");
                return;
            }
        };

        let user_id = user.id;
        let stored = new_hash.clone();
        let result = self
            .data
            .mutate(move |data| {
                let user = data.user_mut(user_id).ok_or(LmsError::UserNotFound)?;
                user.set_password(stored);
                Ok(())
            })
            .await;

        match result {
            Ok(()) => {
                user.set_password(new_hash);
                tracing::info!(user_id = %user_id, "Legacy password hash upgraded");
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Legacy hash upgrade failed");
            }
        }
    }
}
