//! Server-side LINE access-token checks.

use std::sync::Arc;

use thinker_core::{ExternalId, PlatformProfile, TokenInfo, TokenVerifier};
use tracing::{debug, warn};

use crate::error::IdentityError;

/// What a successful check established.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub info: TokenInfo,
    pub profile: Option<PlatformProfile>,
}

#[derive(Clone)]
pub struct AccessTokenChecker {
    verifier: Arc<dyn TokenVerifier>,
    channel_id: String,
}

impl AccessTokenChecker {
    pub fn new(verifier: Arc<dyn TokenVerifier>, channel_id: impl Into<String>) -> Self {
        Self {
            verifier,
            channel_id: channel_id.into(),
        }
    }

    /// The token must be live and issued to our channel. When `expected_user`
    /// is given, the token's profile must belong to that LINE user.
    pub async fn check(
        &self,
        access_token: &str,
        expected_user: Option<&ExternalId>,
    ) -> Result<VerifiedToken, IdentityError> {
        if access_token.trim().is_empty() {
            return Err(IdentityError::Unauthorized("missing access token".into()));
        }

        let info = self.verifier.verify(access_token).await?;
        if info.client_id != self.channel_id {
            warn!(client_id = %info.client_id, "Access token issued for another channel");
            return Err(IdentityError::Unauthorized("channel id mismatch".into()));
        }
        if info.expires_in <= 0 {
            return Err(IdentityError::Unauthorized("access token expired".into()));
        }

        let Some(expected) = expected_user else {
            return Ok(VerifiedToken { info, profile: None });
        };

        let profile = self.verifier.profile(access_token).await?;
        if profile.user_id != expected.as_str() {
            warn!(expected = %expected, "Access token belongs to a different LINE user");
            return Err(IdentityError::Unauthorized("token does not belong to this user".into()));
        }
        debug!(line_user_id = %expected, "Access token verified");
        Ok(VerifiedToken {
            info,
            profile: Some(profile),
        })
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use async_trait::async_trait;
    use thinker_core::TokenError;

    use super::*;

    /// Accepts `"token-<userId>"` for channel `1650000000`; `"other-channel"`
    /// verifies for a different channel; everything else is invalid.
    pub(crate) struct FakeVerifier;

    pub(crate) const CHANNEL: &str = "1650000000";

    #[async_trait]
    impl TokenVerifier for FakeVerifier {
        async fn verify(&self, token: &str) -> Result<TokenInfo, TokenError> {
            let client_id = match token {
                "other-channel" => "999".to_string(),
                t if t.starts_with("token-") => CHANNEL.to_string(),
                "down" => return Err(TokenError::Unavailable("timeout".into())),
                _ => return Err(TokenError::Invalid("invalid_request".into())),
            };
            Ok(TokenInfo {
                client_id,
                expires_in: 3600,
                scope: Some("profile".into()),
            })
        }

        async fn profile(&self, token: &str) -> Result<PlatformProfile, TokenError> {
            let user_id = token
                .strip_prefix("token-")
                .ok_or_else(|| TokenError::Invalid("no profile".into()))?;
            Ok(PlatformProfile {
                user_id: user_id.to_string(),
                display_name: Some("Cruz".into()),
                picture_url: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::{FakeVerifier, CHANNEL};
    use super::*;

    fn checker() -> AccessTokenChecker {
        AccessTokenChecker::new(Arc::new(FakeVerifier), CHANNEL)
    }

    #[tokio::test]
    async fn accepts_matching_token() {
        let id = ExternalId::parse("Uabc123").unwrap();
        let verified = checker().check("token-Uabc123", Some(&id)).await.unwrap();
        assert_eq!(verified.profile.unwrap().user_id, "Uabc123");
        assert!(checker().check("token-Uabc123", None).await.unwrap().profile.is_none());
    }

    #[tokio::test]
    async fn rejects_foreign_channel_and_user() {
        let id = ExternalId::parse("Uabc123").unwrap();
        let c = checker();
        assert!(matches!(c.check("other-channel", None).await, Err(IdentityError::Unauthorized(_))));
        assert!(matches!(c.check("token-Uother", Some(&id)).await, Err(IdentityError::Unauthorized(_))));
        assert!(matches!(c.check("garbage", None).await, Err(IdentityError::Unauthorized(_))));
        assert!(matches!(c.check("", None).await, Err(IdentityError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn platform_outage_is_upstream() {
        assert!(matches!(
            checker().check("down", None).await,
            Err(IdentityError::UpstreamUnavailable(_))
        ));
    }
}
