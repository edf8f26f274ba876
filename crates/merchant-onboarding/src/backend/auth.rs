use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use tracing::info;
use uuid::Uuid;

use crate::config::AdminAccountConfig;

const MIN_PASSWORD_LENGTH: usize = 6;
const MIN_USERNAME_LENGTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("missing or expired session token")]
    InvalidToken,
    #[error("current password is incorrect")]
    WrongPassword,
    #[error("password must be at least 6 characters")]
    WeakPassword,
    #[error("username must be at least 3 characters")]
    InvalidUsername,
}

#[derive(Debug)]
struct AccountState {
    username: String,
    password: String,
    tokens: HashSet<String>,
}

/// The single seeded admin account and its live session tokens.
#[derive(Debug)]
pub struct AdminAccounts {
    state: Mutex<AccountState>,
}

impl AdminAccounts {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(AccountState {
                username: username.into(),
                password: password.into(),
                tokens: HashSet::new(),
            }),
        }
    }

    pub fn from_config(config: &AdminAccountConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }

    /// Issues a fresh bearer token.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.username != username.trim() || state.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        let token = Uuid::new_v4().to_string();
        state.tokens.insert(token.clone());
        info!(username = %state.username, "admin logged in");
        Ok(token)
    }

    /// Returns the account name the token belongs to.
    pub fn authorize(&self, token: Option<&str>) -> Result<String, AuthError> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match token {
            Some(token) if state.tokens.contains(token) => Ok(state.username.clone()),
            _ => Err(AuthError::InvalidToken),
        }
    }

    pub fn change_password(
        &self,
        token: Option<&str>,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.authorize(token)?;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.password != current_password {
            return Err(AuthError::WrongPassword);
        }
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }
        state.password = new_password.to_string();
        info!(username = %state.username, "admin password changed");
        Ok(())
    }

    pub fn change_username(
        &self,
        token: Option<&str>,
        new_username: &str,
        current_password: &str,
    ) -> Result<String, AuthError> {
        self.authorize(token)?;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.password != current_password {
            return Err(AuthError::WrongPassword);
        }
        let new_username = new_username.trim();
        if new_username.chars().count() < MIN_USERNAME_LENGTH {
            return Err(AuthError::InvalidUsername);
        }
        info!(from = %state.username, to = new_username, "admin username changed");
        state.username = new_username.to_string();
        Ok(state.username.clone())
    }
}
