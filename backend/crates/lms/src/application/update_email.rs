//! Update Email Use Case
//!
//! The token embeds the email, so a fresh token is issued.

use std::sync::Arc;

use crate::application::context::DataContext;
use crate::application::token::{Identity, TokenService};
use crate::domain::User;
use crate::domain::repository::EntityStore;
use crate::domain::value_object::Email;
use crate::error::{LmsError, LmsResult};

/// Update email output
pub struct UpdateEmailOutput {
    pub user: User,
    pub token: String,
}

pub struct UpdateEmailUseCase<S> {
    data: Arc<DataContext<S>>,
    tokens: Arc<TokenService>,
}

impl<S> UpdateEmailUseCase<S>
where
    S: EntityStore + Sync,
{
    pub fn new(data: Arc<DataContext<S>>, tokens: Arc<TokenService>) -> Self {
        Self { data, tokens }
    }

    pub async fn execute(&self, identity: &Identity, email: String) -> LmsResult<UpdateEmailOutput> {
        let email = Email::new(email)?;
        let user_id = identity.id;

        let user = self
            .data
            .mutate(move |data| {
                if data.user(user_id).is_none() {
                    return Err(LmsError::UserNotFound);
                }
                if data.user_by_email(&email).is_some_and(|other| other.id != user_id) {
                    return Err(LmsError::EmailTaken);
                }

                let user = data.user_mut(user_id).ok_or(LmsError::UserNotFound)?;
                user.set_email(email);
                Ok(user.clone())
            })
            .await?;

        let token = self.tokens.issue(&Identity::from(&user))?;
        tracing::info!(user_id = %user.id, "Email updated");

        Ok(UpdateEmailOutput { user, token })
    }
}
