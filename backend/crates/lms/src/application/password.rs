//! Password Use Cases
//!
//! - Change password (authenticated, re-verifies the current password)
//! - Reset password (unauthenticated, never reveals whether the email exists)

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::context::DataContext;
use crate::application::credentials::PasswordService;
use crate::application::token::Identity;
use crate::domain::repository::EntityStore;
use crate::domain::value_object::Email;
use crate::error::{LmsError, LmsResult};

/// Same answer whether or not the account exists
pub const RESET_PASSWORD_MESSAGE: &str =
    "If the email exists, a password reset link would be sent.";

/// Change password input
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

/// Change password use case
pub struct ChangePasswordUseCase<S> {
    data: Arc<DataContext<S>>,
    passwords: Arc<PasswordService>,
}

impl<S> ChangePasswordUseCase<S>
where
    S: EntityStore + Sync,
{
    pub fn new(data: Arc<DataContext<S>>, passwords: Arc<PasswordService>) -> Self {
        Self { data, passwords }
    }

    pub async fn execute(&self, identity: &Identity, input: ChangePasswordInput) -> LmsResult<()> {
        let current = ClearTextPassword::unchecked(input.current_password);
        if current.is_blank() {
            return Err(LmsError::validation(
                "currentPassword",
                "Current password is required",
            ));
        }
        let new_password = ClearTextPassword::new(input.new_password)?;

        let user_id = identity.id;
        let stored_hash = self
            .data
            .read(|data| data.user(user_id).map(|u| u.password_hash.clone()))
            .await
            .ok_or(LmsError::UserNotFound)?;

        if !self.passwords.verify(current, stored_hash).await? {
            return Err(LmsError::CurrentPasswordIncorrect);
        }

        let new_hash = self.passwords.hash(new_password).await?;

        self.data
            .mutate(move |data| {
                let user = data.user_mut(user_id).ok_or(LmsError::UserNotFound)?;
                user.set_password(new_hash);
                Ok(())
            })
            .await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}

/// Reset password use case
///
/// No email is sent; an existing account is reset by registering again.
pub struct ResetPasswordUseCase<S> {
    data: Arc<DataContext<S>>,
}

impl<S> ResetPasswordUseCase<S>
where
    S: EntityStore + Sync,
{
    pub fn new(data: Arc<DataContext<S>>) -> Self {
        Self { data }
    }

    pub async fn execute(&self, email: String) -> LmsResult<&'static str> {
        let email = Email::new(email)?;

        let user_id = self
            .data
            .read(|data| data.user_by_email(&email).map(|u| u.id))
            .await;

        match user_id {
            Some(id) => tracing::info!(user_id = %id, "Password reset requested"),
            None => tracing::info!("Password reset requested for unknown email"),
        }

        Ok(RESET_PASSWORD_MESSAGE)
    }
}
