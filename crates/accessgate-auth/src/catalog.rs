//! Grant listing for resolved identities.

use accessgate_core::ports::AccessGrantsService;
use accessgate_core::{DirectoryUserId, Grant};
use std::sync::Arc;
use tracing::{info, warn};

/// Best-effort listing of the grants a directory user holds.
pub struct GrantCatalog {
    grants: Arc<dyn AccessGrantsService>,
    account_id: String,
    max_results: i32,
}

impl GrantCatalog {
    pub fn new(
        grants: Arc<dyn AccessGrantsService>,
        account_id: impl Into<String>,
        max_results: i32,
    ) -> Self {
        Self {
            grants,
            account_id: account_id.into(),
            max_results,
        }
    }

    /// One page of grants. An unresolved identity or upstream failure yields
    /// an empty list; listing never fails the request.
    pub async fn list_grants(&self, user_id: Option<&DirectoryUserId>) -> Vec<Grant> {
        let Some(user_id) = user_id else {
            return Vec::new();
        };

        match self
            .grants
            .list_grants(&self.account_id, user_id, self.max_results)
            .await
        {
            Ok(grants) => {
                info!(user_id = %user_id, count = grants.len(), "Listed access grants");
                grants
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Listing access grants failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessgate_core::ports::ServiceResult;
    use accessgate_core::{DataAccess, Permission, ServiceError, TemporaryCredentials};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGrants {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AccessGrantsService for FakeGrants {
        async fn list_grants(
            &self,
            account_id: &str,
            grantee: &DirectoryUserId,
            max_results: i32,
        ) -> ServiceResult<Vec<Grant>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(account_id, "111111111111");
            assert_eq!(max_results, 100);
            if self.fail {
                return Err(ServiceError::request("s3control", "AccessDenied"));
            }
            Ok(vec![Grant {
                grantee_identifier: grantee.to_string(),
                permission: "READ".to_string(),
                access_grants_location_id: "default".into(),
                grant_scope: "s3://bucket/team-a/*".to_string(),
            }])
        }

        async fn get_data_access(
            &self,
            _credentials: &TemporaryCredentials,
            _account_id: &str,
            _target: &str,
            _permission: Permission,
        ) -> ServiceResult<DataAccess> {
            unreachable!("listing never mints credentials")
        }
    }

    fn catalog(fail: bool) -> (GrantCatalog, Arc<FakeGrants>) {
        let fake = Arc::new(FakeGrants {
            fail,
            calls: AtomicUsize::new(0),
        });
        (GrantCatalog::new(fake.clone(), "111111111111", 100), fake)
    }

    #[tokio::test]
    async fn test_lists_grants() {
        let (catalog, _) = catalog(false);
        let user = DirectoryUserId::new("user-1");
        let grants = catalog.list_grants(Some(&user)).await;
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].grantee_identifier, "user-1");
    }

    #[tokio::test]
    async fn test_unresolved_identity_skips_upstream() {
        let (catalog, fake) = catalog(false);
        assert!(catalog.list_grants(None).await.is_empty());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_error_is_empty() {
        let (catalog, fake) = catalog(true);
        let user = DirectoryUserId::new("user-1");
        assert!(catalog.list_grants(Some(&user)).await.is_empty());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }
}
