//! Resolution of validated claims to directory users.

use accessgate_core::ports::DirectoryService;
use accessgate_core::{Claims, DirectoryUserId, ResolutionError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maps the configured username claim onto a directory user id.
pub struct IdentityResolver {
    directory: Arc<dyn DirectoryService>,
    identity_store_id: String,
    username_attribute: String,
}

impl IdentityResolver {
    pub fn new(
        directory: Arc<dyn DirectoryService>,
        identity_store_id: impl Into<String>,
        username_attribute: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            identity_store_id: identity_store_id.into(),
            username_attribute: username_attribute.into(),
        }
    }

    /// Look the caller up in the directory.
    pub async fn try_resolve(&self, claims: &Claims) -> Result<DirectoryUserId, ResolutionError> {
        let user_name = claims
            .string_claim(&self.username_attribute)
            .ok_or_else(|| ResolutionError::MissingUsernameClaim(self.username_attribute.clone()))?;

        self.directory
            .find_user_id(&self.identity_store_id, user_name)
            .await?
            .ok_or_else(|| ResolutionError::UserNotFound(user_name.to_string()))
    }

    /// Like [`try_resolve`](Self::try_resolve), but any failure means "no identity".
    pub async fn resolve(&self, claims: &Claims) -> Option<DirectoryUserId> {
        match self.try_resolve(claims).await {
            Ok(user_id) => {
                debug!(user_id = %user_id, "Resolved directory user");
                Some(user_id)
            }
            Err(e) => {
                warn!(error = %e, "Identity resolution failed");
                None
            }
        }
    }
}
