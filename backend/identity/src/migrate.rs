use serde::Serialize;
use thinker_core::{ExternalId, LocalAccountId};
use tracing::info;

use crate::error::IdentityError;
use crate::provisioner::{AccountProvisioner, ProvisionRequest};
use crate::request::LineAuthRequest;
use crate::token::AccessTokenChecker;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigratedUser {
    pub id: LocalAccountId,
    pub line_user_id: ExternalId,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateResponse {
    pub success: bool,
    pub message: String,
    pub already_migrated: bool,
    pub user: MigratedUser,
}

/// Links a signed-in email account to the caller's LINE identity.
#[derive(Clone)]
pub struct MigrationService {
    tokens: AccessTokenChecker,
    provisioner: AccountProvisioner,
}

impl MigrationService {
    pub fn new(tokens: AccessTokenChecker, provisioner: AccountProvisioner) -> Self {
        Self { tokens, provisioner }
    }

    pub async fn migrate(
        &self,
        caller: &LocalAccountId,
        request: LineAuthRequest,
    ) -> Result<MigrateResponse, IdentityError> {
        let (external_id, token) = request.validate()?;
        self.tokens.check(token, Some(&external_id)).await?;

        let outcome = self
            .provisioner
            .provision_or_link(ProvisionRequest {
                external_id: external_id.clone(),
                display_name: request.display_name.clone(),
                picture_url: request.picture_url.clone(),
                caller: Some(caller.clone()),
            })
            .await?;

        let message = if outcome.already_migrated {
            "Already migrated to LINE"
        } else {
            info!(account = %caller, "Account migrated to LINE login");
            "Successfully migrated to LINE"
        };
        Ok(MigrateResponse {
            success: true,
            message: message.to_string(),
            already_migrated: outcome.already_migrated,
            user: MigratedUser {
                id: outcome.account_id,
                line_user_id: external_id,
                display_name: request.display_name,
            },
        })
    }
}
