use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix LINE puts on every user id.
pub const LINE_USER_ID_PREFIX: char = 'U';

/// Returned when a string is not a LINE user id.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid LINE user id: {0:?}")]
pub struct InvalidIdentifier(pub String);

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A LINE platform user id (`U` followed by alphanumerics).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId(String);

impl ExternalId {
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        let valid = raw.len() > 1
            && raw.starts_with(LINE_USER_ID_PREFIX)
            && raw.chars().all(|c| c.is_ascii_alphanumeric());
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidIdentifier(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ExternalId {
    type Error = InvalidIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ExternalId> for String {
    fn from(id: ExternalId) -> Self {
        id.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque account id owned by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalAccountId(String);

impl LocalAccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Profiles and identity links
// ---------------------------------------------------------------------------

/// How the account signs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProviderKind {
    Email,
    Line,
}

impl AuthProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthProviderKind::Email => "email",
            AuthProviderKind::Line => "line",
        }
    }

    pub fn from_db(raw: &str) -> Self {
        match raw {
            "line" => AuthProviderKind::Line,
            _ => AuthProviderKind::Email,
        }
    }
}

/// Where a LINE link came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkProvenance {
    /// The account was created by LINE login.
    Native,
    /// An email account was migrated to LINE.
    Migrated,
}

/// The association written when an account is linked to a LINE user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityLink {
    pub external_id: ExternalId,
    pub display_name: Option<String>,
    pub picture_url: Option<String>,
    pub provenance: LinkProvenance,
}

/// A user-store record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub account_id: LocalAccountId,
    pub full_name: Option<String>,
    pub line_user_id: Option<ExternalId>,
    pub line_display_name: Option<String>,
    pub line_picture_url: Option<String>,
    pub auth_provider: AuthProviderKind,
    pub migrated_from_email: bool,
    pub line_is_friend: bool,
    pub line_friend_added_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn provenance(&self) -> Option<LinkProvenance> {
        self.line_user_id.as_ref().map(|_| {
            if self.migrated_from_email {
                LinkProvenance::Migrated
            } else {
                LinkProvenance::Native
            }
        })
    }
}

/// Insert payload for a profile row.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub account_id: LocalAccountId,
    pub full_name: Option<String>,
    pub link: Option<IdentityLink>,
}

// ---------------------------------------------------------------------------
// Auth collaborator payloads
// ---------------------------------------------------------------------------

/// Account creation request handed to the auth collaborator.
#[derive(Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub metadata: serde_json::Value,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// A bearer session issued for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: i64,
    pub user_id: LocalAccountId,
}

// ---------------------------------------------------------------------------
// LINE login payloads
// ---------------------------------------------------------------------------

/// Result of `GET /oauth2/v2.1/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub client_id: String,
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Result of `GET /v2/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformProfile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub picture_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// A course order as the notification service needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: i64,
    pub user_id: LocalAccountId,
    pub course_id: i64,
    pub course_name: String,
    pub total: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_id_requires_prefix() {
        assert!(ExternalId::parse("Uabc123").is_ok());
        assert!(ExternalId::parse("U4af4980629").is_ok());
        assert!(ExternalId::parse("abc123").is_err());
        assert!(ExternalId::parse("U").is_err());
        assert!(ExternalId::parse("").is_err());
        assert!(ExternalId::parse("Uabc 123").is_err());
    }

    #[test]
    fn external_id_deserialize_validates() {
        let ok: Result<ExternalId, _> = serde_json::from_str("\"Uabc\"");
        assert!(ok.is_ok());
        let bad: Result<ExternalId, _> = serde_json::from_str("\"Cgroup\"");
        assert!(bad.is_err());
    }

    #[test]
    fn provenance_follows_migration_flag() {
        let mut profile = Profile {
            account_id: LocalAccountId::new("a"),
            full_name: None,
            line_user_id: None,
            line_display_name: None,
            line_picture_url: None,
            auth_provider: AuthProviderKind::Email,
            migrated_from_email: false,
            line_is_friend: false,
            line_friend_added_at: None,
        };
        assert_eq!(profile.provenance(), None);
        profile.line_user_id = Some(ExternalId::parse("Uabc").unwrap());
        assert_eq!(profile.provenance(), Some(LinkProvenance::Native));
        profile.migrated_from_email = true;
        assert_eq!(profile.provenance(), Some(LinkProvenance::Migrated));
    }

    #[test]
    fn new_account_debug_hides_password() {
        let account = NewAccount {
            email: "Uabc@line.thinker.cafe".into(),
            password: "hunter2".into(),
            metadata: serde_json::json!({}),
        };
        assert!(!format!("{account:?}").contains("hunter2"));
    }
}
