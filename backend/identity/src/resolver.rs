use std::sync::Arc;

use thinker_core::{ExternalId, LocalAccountId, Profile, UserStore};
use tracing::debug;

use crate::error::IdentityError;

/// Outcome of looking a LINE id up in the user store.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Linked {
        account_id: LocalAccountId,
        profile: Box<Profile>,
    },
    Unlinked,
}

impl Resolution {
    pub fn account_id(&self) -> Option<&LocalAccountId> {
        match self {
            Resolution::Linked { account_id, .. } => Some(account_id),
            Resolution::Unlinked => None,
        }
    }
}

#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Parse `raw` as a LINE id and resolve it.
    pub async fn resolve_str(&self, raw: &str) -> Result<Resolution, IdentityError> {
        let id = ExternalId::parse(raw)?;
        self.resolve(&id).await
    }

    /// A store failure is always an error, never `Unlinked`.
    pub async fn resolve(&self, id: &ExternalId) -> Result<Resolution, IdentityError> {
        let found = self.store.find_by_line_id(id).await?;
        let resolution = match found {
            Some(profile) => Resolution::Linked {
                account_id: profile.account_id.clone(),
                profile: Box::new(profile),
            },
            None => Resolution::Unlinked,
        };
        debug!(line_user_id = %id, linked = resolution.account_id().is_some(), "Resolved LINE identity");
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use thinker_core::{IdentityLink, LinkProvenance, NewProfile, StoreError};
    use thinker_store::SqliteStore;

    use super::*;

    struct DownStore;

    #[async_trait]
    impl UserStore for DownStore {
        async fn find_by_line_id(&self, _id: &ExternalId) -> Result<Option<Profile>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn find_by_account(&self, _a: &LocalAccountId) -> Result<Option<Profile>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn insert_profile(&self, _p: NewProfile) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn refresh_line_profile(
            &self,
            _a: &LocalAccountId,
            _id: &ExternalId,
            _d: Option<&str>,
            _p: Option<&str>,
        ) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn link_line_identity(&self, _a: &LocalAccountId, _l: &IdentityLink) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn set_friend_status(&self, _id: &ExternalId, _f: bool, _at: DateTime<Utc>) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn rejects_malformed_ids() {
        let resolver = IdentityResolver::new(Arc::new(SqliteStore::in_memory().unwrap()));
        for raw in ["", "U", "abc123", "Uabc-123", "uabc"] {
            let err = resolver.resolve_str(raw).await.unwrap_err();
            assert!(matches!(err, IdentityError::InvalidIdentifier(_)), "{raw:?}");
        }
    }

    #[tokio::test]
    async fn linked_and_unlinked() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .insert_profile(NewProfile {
                account_id: LocalAccountId::new("acc-1"),
                full_name: None,
                link: Some(IdentityLink {
                    external_id: ExternalId::parse("Uabc123").unwrap(),
                    display_name: None,
                    picture_url: None,
                    provenance: LinkProvenance::Native,
                }),
            })
            .await
            .unwrap();
        let resolver = IdentityResolver::new(store);

        let linked = resolver.resolve_str("Uabc123").await.unwrap();
        assert_eq!(linked.account_id(), Some(&LocalAccountId::new("acc-1")));
        assert_eq!(resolver.resolve_str("Unobody").await.unwrap(), Resolution::Unlinked);
    }

    #[tokio::test]
    async fn store_failure_is_not_unlinked() {
        let resolver = IdentityResolver::new(Arc::new(DownStore));
        let err = resolver.resolve_str("Uabc123").await.unwrap_err();
        assert!(matches!(err, IdentityError::StoreUnavailable(_)));
    }
}
