//! Account provisioning and linking.
//!
//! Three cases, decided by a fresh resolver lookup right before any write:
//!
//! - **A** fresh login, id unlinked: create an account under a synthetic
//!   email with a throwaway random password, then insert its linked profile.
//! - **B** fresh login, id linked: refresh display name / avatar only.
//! - **C** migration by a signed-in caller: link the caller's existing
//!   profile, unless either side is already linked elsewhere.
//!
//! Concurrent Case A calls for one id converge through the auth
//! collaborator's email uniqueness and the profile table's UNIQUE LINE id.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde_json::json;
use thinker_core::{
    AuthError, AuthProvider, ExternalId, IdentityLink, LinkProvenance, LocalAccountId,
    NewAccount, NewProfile, StoreError, UserStore,
};
use tracing::{info, warn};

use crate::error::IdentityError;
use crate::resolver::{IdentityResolver, Resolution};

#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub external_id: ExternalId,
    pub display_name: Option<String>,
    pub picture_url: Option<String>,
    /// Set only on the migration path.
    pub caller: Option<LocalAccountId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOutcome {
    pub account_id: LocalAccountId,
    pub created: bool,
    pub already_migrated: bool,
}

impl ProvisionOutcome {
    fn existing(account_id: LocalAccountId) -> Self {
        Self {
            account_id,
            created: false,
            already_migrated: false,
        }
    }
}

#[derive(Clone)]
pub struct AccountProvisioner {
    store: Arc<dyn UserStore>,
    auth: Arc<dyn AuthProvider>,
    resolver: IdentityResolver,
    synthetic_email_domain: String,
}

impl AccountProvisioner {
    pub fn new(
        store: Arc<dyn UserStore>,
        auth: Arc<dyn AuthProvider>,
        synthetic_email_domain: impl Into<String>,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(store.clone()),
            store,
            auth,
            synthetic_email_domain: synthetic_email_domain.into(),
        }
    }

    pub fn synthetic_email(&self, id: &ExternalId) -> String {
        format!("{}@{}", id, self.synthetic_email_domain)
    }

    pub async fn provision_or_link(
        &self,
        request: ProvisionRequest,
    ) -> Result<ProvisionOutcome, IdentityError> {
        match request.caller.clone() {
            None => self.login(&request).await,
            Some(caller) => self.migrate(&caller, &request).await,
        }
    }

    async fn login(&self, request: &ProvisionRequest) -> Result<ProvisionOutcome, IdentityError> {
        match self.resolver.resolve(&request.external_id).await? {
            Resolution::Linked { account_id, .. } => {
                self.refresh(&account_id, request).await;
                Ok(ProvisionOutcome::existing(account_id))
            }
            Resolution::Unlinked => self.create(request).await,
        }
    }

    /// Case B. A failed refresh never fails the login.
    async fn refresh(&self, account_id: &LocalAccountId, request: &ProvisionRequest) {
        if let Err(e) = self
            .store
            .refresh_line_profile(
                account_id,
                &request.external_id,
                request.display_name.as_deref(),
                request.picture_url.as_deref(),
            )
            .await
        {
            warn!(account = %account_id, error = %e, "Failed to refresh LINE profile fields");
        }
    }

    /// Case A.
    async fn create(&self, request: &ProvisionRequest) -> Result<ProvisionOutcome, IdentityError> {
        let email = self.synthetic_email(&request.external_id);
        let account = NewAccount {
            email: email.clone(),
            password: throwaway_secret(),
            metadata: json!({
                "lineUserId": request.external_id.as_str(),
                "displayName": request.display_name,
                "pictureUrl": request.picture_url,
                "authProvider": "line",
            }),
        };

        let account_id = match self.auth.create_account(account).await {
            Ok(id) => id,
            Err(AuthError::EmailTaken(_)) => {
                // Another login for this id got there first, or an earlier
                // attempt stopped before writing the profile.
                self.auth
                    .find_account_by_email(&email)
                    .await?
                    .ok_or_else(|| {
                        IdentityError::UpstreamUnavailable(format!(
                            "account for {email} reported taken but not found"
                        ))
                    })?
            }
            Err(e) => return Err(e.into()),
        };

        let profile = NewProfile {
            account_id: account_id.clone(),
            full_name: request.display_name.clone(),
            link: Some(IdentityLink {
                external_id: request.external_id.clone(),
                display_name: request.display_name.clone(),
                picture_url: request.picture_url.clone(),
                provenance: LinkProvenance::Native,
            }),
        };

        match self.store.insert_profile(profile).await {
            Ok(()) => {
                info!(account = %account_id, line_user_id = %request.external_id, "Created LINE account");
                Ok(ProvisionOutcome {
                    account_id,
                    created: true,
                    already_migrated: false,
                })
            }
            Err(StoreError::Conflict(_)) => match self.resolver.resolve(&request.external_id).await? {
                Resolution::Linked { account_id, .. } => {
                    info!(account = %account_id, "Concurrent login already linked this LINE id");
                    self.refresh(&account_id, request).await;
                    Ok(ProvisionOutcome::existing(account_id))
                }
                Resolution::Unlinked => Err(IdentityError::StoreUnavailable(format!(
                    "profile for {account_id} conflicts but {} is unlinked",
                    request.external_id
                ))),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Case C.
    async fn migrate(
        &self,
        caller: &LocalAccountId,
        request: &ProvisionRequest,
    ) -> Result<ProvisionOutcome, IdentityError> {
        let profile = self
            .store
            .find_by_account(caller)
            .await?
            .ok_or_else(|| IdentityError::AccountNotFound(caller.to_string()))?;

        if let Some(linked) = &profile.line_user_id {
            return if *linked == request.external_id {
                Ok(ProvisionOutcome {
                    account_id: caller.clone(),
                    created: false,
                    already_migrated: true,
                })
            } else {
                Err(IdentityError::AlreadyLinked)
            };
        }

        if let Resolution::Linked { account_id, .. } = self.resolver.resolve(&request.external_id).await? {
            if account_id != *caller {
                return Err(IdentityError::IdentifierTaken);
            }
        }

        let link = IdentityLink {
            external_id: request.external_id.clone(),
            display_name: request.display_name.clone(),
            picture_url: request.picture_url.clone(),
            provenance: LinkProvenance::Migrated,
        };
        match self.store.link_line_identity(caller, &link).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(IdentityError::IdentifierTaken),
            Err(StoreError::NoMatch(_)) => {
                // Linked between our read and write.
                let now = self.store.find_by_account(caller).await?;
                return match now.and_then(|p| p.line_user_id) {
                    Some(id) if id == request.external_id => Ok(ProvisionOutcome {
                        account_id: caller.clone(),
                        created: false,
                        already_migrated: true,
                    }),
                    Some(_) => Err(IdentityError::AlreadyLinked),
                    None => Err(IdentityError::AccountNotFound(caller.to_string())),
                };
            }
            Err(e) => return Err(e.into()),
        }

        let metadata = json!({
            "authProvider": "line",
            "lineUserId": request.external_id.as_str(),
            "displayName": request.display_name,
            "pictureUrl": request.picture_url,
            "migratedAt": Utc::now().to_rfc3339(),
        });
        if let Err(e) = self.auth.update_metadata(caller, metadata).await {
            warn!(account = %caller, error = %e, "Linked LINE id but failed to update auth metadata");
        }

        info!(account = %caller, line_user_id = %request.external_id, "Migrated account to LINE login");
        Ok(ProvisionOutcome::existing(caller.clone()))
    }
}

/// 32 bytes from the OS RNG, hex encoded. Handed to the auth collaborator
/// once and never kept.
fn throwaway_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
