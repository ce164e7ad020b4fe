use std::{fmt, result, sync::Arc};

use log::{error, info};

use crate::backend::{Backend, FindError, InsertError};
use crate::user::User;

/// Account registration and login checks over a storage backend.
pub struct Credentials(Arc<Backend>);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    DuplicateUsername,
    Storage,
}

pub type Result<T> = result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateUsername => write!(f, "username already exists"),
            Self::Storage => write!(f, "credential storage failed"),
        }
    }
}

impl std::error::Error for Error {}

impl Credentials {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self(backend)
    }

    /// Prepares the underlying storage. Safe to call on every start.
    pub async fn initialize(&self) -> Result<()> {
        self.0.init().await.map_err(|()| {
            error!("couldn't initialize credential storage");
            Error::Storage
        })
    }

    /// Creates an account. Both fields are expected to be non-empty.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let user = User::new(username, password);

        self.0.insert_user(&user).await.map_err(|e| match e {
            InsertError::Exists => {
                info!("{username} register: name taken");
                Error::DuplicateUsername
            }
            InsertError::Internal => {
                error!("couldn't register user {username}");
                Error::Storage
            }
        })?;

        info!("{username} registered");
        Ok(())
    }

    /// Checks a username/password pair.
    ///
    /// An unknown user and a wrong password both give `Ok(false)`; callers
    /// can't tell which happened. Only storage failures are errors.
    pub async fn verify_login(&self, username: &str, password: &str) -> Result<bool> {
        let user = match self.0.find_user(username).await {
            Ok(user) => user,
            Err(FindError::NotFound) => {
                info!("rejecting non-existant user {username}");
                return Ok(false);
            }
            Err(FindError::Internal) => {
                error!("couldn't authenticate user {username}");
                return Err(Error::Storage);
            }
        };

        // plaintext equality; see DESIGN.md
        if user.password != password {
            info!("wrong password for user {username}");
            return Ok(false);
        }

        info!("{username} login: credentials accepted");
        Ok(true)
    }
}
