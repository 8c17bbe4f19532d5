//! Register Use Case
//!
//! Creates an account, or (when the email is already known) overwrites the
//! existing account's name, password and role. The overwrite path doubles as
//! the password-reset flow.

use std::sync::Arc;

use chrono::Utc;
use platform::password::ClearTextPassword;

use crate::application::context::DataContext;
use crate::application::credentials::PasswordService;
use crate::application::token::{Identity, TokenService};
use crate::domain::User;
use crate::domain::repository::EntityStore;
use crate::domain::value_object::{Email, UserName, UserRole};
use crate::error::LmsResult;

/// Register input
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Register output
pub struct RegisterOutput {
    pub user: User,
    pub token: String,
    /// `false` when an existing account was overwritten
    pub created: bool,
}

/// Register use case
pub struct RegisterUseCase<S> {
    data: Arc<DataContext<S>>,
    passwords: Arc<PasswordService>,
    tokens: Arc<TokenService>,
}

impl<S> RegisterUseCase<S>
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

    pub async fn execute(&self, input: RegisterInput) -> LmsResult<RegisterOutput> {
        let name = UserName::new(&input.name)?;
        let email = Email::new(input.email)?;
        let password = ClearTextPassword::new(input.password)?;
        let role: UserRole = input.role.parse()?;

        let password_hash = self.passwords.hash(password).await?;

        let (user, created) = self
            .data
            .mutate(move |data| {
                if let Some(existing) = data.user_by_email_mut(&email) {
                    existing.reregister(name, password_hash, role);
                    return Ok((existing.clone(), false));
                }

                let id = data.counters.allocate_user_id();
                let user = User::register(id, name, email, password_hash, role, Utc::now());
                data.users.push(user.clone());
                Ok((user, true))
            })
            .await?;

        if created {
            tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        } else {
            tracing::warn!(
                user_id = %user.id,
                role = %user.role,
                "Registration with existing email overwrote name, password and role"
            );
        }

        let token = self.tokens.issue(&Identity::from(&user))?;

        Ok(RegisterOutput {
            user,
            token,
            created,
        })
    }
}
