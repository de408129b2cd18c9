use std::sync::Arc;

use serde::Serialize;
use thinker_core::{LocalAccountId, Session, UserStore};
use tracing::{info, warn};

use crate::error::IdentityError;
use crate::provisioner::{AccountProvisioner, ProvisionRequest};
use crate::request::LineAuthRequest;
use crate::session::SessionIssuer;
use crate::token::AccessTokenChecker;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginProfile {
    pub full_name: Option<String>,
    pub display_name: Option<String>,
    pub picture_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub is_new_user: bool,
    pub local_account_id: LocalAccountId,
    /// `None` only when a brand-new account could not get a session yet.
    pub session: Option<Session>,
    pub profile: LoginProfile,
}

/// LINE login: token check, resolve / provision, session.
#[derive(Clone)]
pub struct LoginService {
    store: Arc<dyn UserStore>,
    tokens: AccessTokenChecker,
    provisioner: AccountProvisioner,
    sessions: SessionIssuer,
}

impl LoginService {
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: AccessTokenChecker,
        provisioner: AccountProvisioner,
        sessions: SessionIssuer,
    ) -> Self {
        Self {
            store,
            tokens,
            provisioner,
            sessions,
        }
    }

    pub async fn login(&self, request: LineAuthRequest) -> Result<LoginResponse, IdentityError> {
        let (external_id, token) = request.validate()?;
        let verified = self.tokens.check(token, Some(&external_id)).await?;

        let platform = verified.profile.unwrap_or_default();
        let display_name = request.display_name.clone().or(platform.display_name);
        let picture_url = request.picture_url.clone().or(platform.picture_url);

        let outcome = self
            .provisioner
            .provision_or_link(ProvisionRequest {
                external_id: external_id.clone(),
                display_name: display_name.clone(),
                picture_url: picture_url.clone(),
                caller: None,
            })
            .await?;

        let session = match self.sessions.issue(&outcome.account_id).await {
            Ok(session) => Some(session),
            // The account is durable; logging in again recovers a session.
            Err(e) if outcome.created => {
                warn!(account = %outcome.account_id, error = %e, "New account created without a session");
                None
            }
            Err(e) => return Err(e),
        };

        let full_name = match self.store.find_by_account(&outcome.account_id).await {
            Ok(Some(profile)) => profile.full_name,
            Ok(None) => None,
            Err(e) => {
                warn!(account = %outcome.account_id, error = %e, "Could not load profile for login response");
                None
            }
        }
        .or_else(|| display_name.clone());

        info!(
            account = %outcome.account_id,
            line_user_id = %external_id,
            new_user = outcome.created,
            "LINE login"
        );
        Ok(LoginResponse {
            success: true,
            is_new_user: outcome.created,
            local_account_id: outcome.account_id,
            session,
            profile: LoginProfile {
                full_name,
                display_name,
                picture_url,
            },
        })
    }
}
