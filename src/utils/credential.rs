use std::{env, fmt};

use thiserror::Error;

pub const API_KEY_VAR: &str = "MTA_API_KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        ApiKey(key.into())
    }

    pub fn from_env() -> Result<Self, CredentialError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(API_KEY_VAR) {
            Some(key) if !key.is_empty() => Ok(ApiKey(key)),
            _ => Err(CredentialError::Missing(API_KEY_VAR)),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
