use std::sync::Arc;

use thinker_core::{AuthProvider, LocalAccountId, Session};
use tracing::debug;

use crate::error::IdentityError;

/// Issues sessions through the auth collaborator without a password challenge.
#[derive(Clone)]
pub struct SessionIssuer {
    auth: Arc<dyn AuthProvider>,
}

impl SessionIssuer {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self { auth }
    }

    pub async fn issue(&self, account: &LocalAccountId) -> Result<Session, IdentityError> {
        let session = self
            .auth
            .issue_session(account)
            .await
            .map_err(|e| IdentityError::SessionIssuanceFailed(e.to_string()))?;
        debug!(account = %account, expires_at = session.expires_at, "Issued session");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use thinker_core::NewAccount;
    use thinker_store::SqliteStore;

    use super::*;

    #[tokio::test]
    async fn issues_for_known_account_only() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let account = store
            .create_account(NewAccount {
                email: "a@b.co".into(),
                password: "pw".into(),
                metadata: json!({}),
            })
            .await
            .unwrap();
        let issuer = SessionIssuer::new(store.clone());

        let session = issuer.issue(&account).await.unwrap();
        assert_eq!(session.token_type, "bearer");
        assert_eq!(store.authenticate(&session.access_token).await.unwrap(), Some(account));

        let err = issuer.issue(&LocalAccountId::new("ghost")).await.unwrap_err();
        assert!(matches!(err, IdentityError::SessionIssuanceFailed(_)));
    }
}
