use std::sync::Arc;

use log::{error, info};

use crate::backend::Backend;

const KEY: &str = "isLoggedIn";
const ACTIVE: &str = "true";

/// The persisted "someone is logged in" marker.
pub struct Session(Arc<Backend>);

impl Session {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self(backend)
    }

    pub async fn set_active(&self) -> Result<(), ()> {
        info!("session start");
        self.0.set_item(KEY, ACTIVE).await.map_err(|()| {
            error!("couldn't persist session");
        })
    }

    pub async fn clear_active(&self) -> Result<(), ()> {
        info!("session end");
        self.0.remove_item(KEY).await.map_err(|()| {
            error!("couldn't clear session");
        })
    }

    /// Unreadable storage counts as logged out.
    pub async fn is_active(&self) -> bool {
        match self.0.get_item(KEY).await {
            Ok(value) => value.as_deref() == Some(ACTIVE),
            Err(()) => {
                error!("couldn't read session, treating as logged out");
                false
            }
        }
    }
}
