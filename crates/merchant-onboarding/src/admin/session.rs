use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::gateway::{Acknowledgement, ApplicationGateway, GatewayError, Transport};
use crate::onboarding::{LocalStorage, StorageError};

pub const ADMIN_TOKEN_KEY: &str = "admin_token";
pub const USER_ACCOUNTS_KEY: &str = "user_accounts";

/// Signed-in admin as persisted under [`USER_ACCOUNTS_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no admin is signed in")]
    NotSignedIn,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Admin login state, mirrored into local storage and onto the gateway's bearer token.
pub struct AdminSession<S, T> {
    storage: Arc<S>,
    gateway: Arc<ApplicationGateway<T>>,
    user: Option<AdminUser>,
}

impl<S: LocalStorage, T: Transport> AdminSession<S, T> {
    pub fn new(storage: Arc<S>, gateway: Arc<ApplicationGateway<T>>) -> Self {
        Self {
            storage,
            gateway,
            user: None,
        }
    }

    pub fn current_user(&self) -> Option<&AdminUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.gateway.bearer_token().is_some()
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<&AdminUser, SessionError> {
        let response = self.gateway.login(username, password).await?;
        let user = AdminUser {
            id: "1".to_string(),
            username: username.trim().to_string(),
        };
        self.persist(&user, &response.token)?;
        self.gateway.set_bearer_token(Some(response.token));
        info!(username = %user.username, "admin session started");
        Ok(self.user.insert(user))
    }

    /// Re-reads a stored session. An unparseable user record clears both keys.
    pub fn restore(&mut self) -> Result<bool, SessionError> {
        let token = self.storage.get_item(ADMIN_TOKEN_KEY)?;
        let stored_user = self.storage.get_item(USER_ACCOUNTS_KEY)?;
        let (Some(token), Some(stored_user)) = (token, stored_user) else {
            return Ok(false);
        };

        match serde_json::from_str::<AdminUser>(&stored_user) {
            Ok(user) => {
                self.gateway.set_bearer_token(Some(token));
                self.user = Some(user);
                Ok(true)
            }
            Err(err) => {
                debug!(error = %err, "discarding unreadable admin session");
                self.logout()?;
                Ok(false)
            }
        }
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.user = None;
        self.gateway.set_bearer_token(None);
        self.storage.remove_item(USER_ACCOUNTS_KEY)?;
        self.storage.remove_item(ADMIN_TOKEN_KEY)?;
        Ok(())
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<Acknowledgement, SessionError> {
        if !self.is_authenticated() {
            return Err(SessionError::NotSignedIn);
        }
        Ok(self
            .gateway
            .change_password(current_password, new_password)
            .await?)
    }

    /// Renames the account and rewrites the stored user record.
    pub async fn change_username(
        &mut self,
        new_username: &str,
        current_password: &str,
    ) -> Result<Acknowledgement, SessionError> {
        let Some(user) = self.user.clone() else {
            return Err(SessionError::NotSignedIn);
        };
        let token = self.gateway.bearer_token().ok_or(SessionError::NotSignedIn)?;
        let ack = self
            .gateway
            .change_username(new_username, current_password)
            .await?;

        let renamed = AdminUser {
            username: new_username.trim().to_string(),
            ..user
        };
        self.persist(&renamed, &token)?;
        self.user = Some(renamed);
        Ok(ack)
    }

    fn persist(&self, user: &AdminUser, token: &str) -> Result<(), SessionError> {
        let encoded = serde_json::to_string(user).map_err(StorageError::from)?;
        self.storage.set_item(USER_ACCOUNTS_KEY, &encoded)?;
        self.storage.set_item(ADMIN_TOKEN_KEY, token)?;
        Ok(())
    }
}
