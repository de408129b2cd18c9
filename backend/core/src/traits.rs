use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AuthError, PushError, StoreError, TokenError};
use crate::message::OutboundMessage;
use crate::types::{
    ExternalId, IdentityLink, LocalAccountId, NewAccount, NewProfile, Order, PlatformProfile,
    Profile, Session, TokenInfo,
};

/// The user-record store (profiles table).
///
/// Every method is a single-record read or write. Lookups return `Ok(None)`
/// when nothing matches; `Err` always means the store itself failed or a
/// constraint rejected the write.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_line_id(&self, id: &ExternalId) -> Result<Option<Profile>, StoreError>;

    async fn find_by_account(&self, account: &LocalAccountId) -> Result<Option<Profile>, StoreError>;

    /// Insert a profile. A duplicate account id or LINE id yields `StoreError::Conflict`.
    async fn insert_profile(&self, profile: NewProfile) -> Result<(), StoreError>;

    /// Refresh display name / avatar on the row linked to exactly `id`.
    /// Never changes the linked identifier.
    async fn refresh_line_profile(
        &self,
        account: &LocalAccountId,
        id: &ExternalId,
        display_name: Option<&str>,
        picture_url: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Link an unlinked account. Fails with `NoMatch` when the row is
    /// missing or already linked, `Conflict` when the id is taken.
    async fn link_line_identity(
        &self,
        account: &LocalAccountId,
        link: &IdentityLink,
    ) -> Result<(), StoreError>;

    /// Record whether the user has the official account as a friend.
    /// Returns `false` when no profile carries `id`.
    async fn set_friend_status(
        &self,
        id: &ExternalId,
        is_friend: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

/// The account + session collaborator.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_account(&self, account: NewAccount) -> Result<LocalAccountId, AuthError>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<LocalAccountId>, AuthError>;

    /// Issue a session without a password challenge.
    async fn issue_session(&self, account: &LocalAccountId) -> Result<Session, AuthError>;

    /// Resolve a bearer session token to its account, if still valid.
    async fn authenticate(&self, access_token: &str) -> Result<Option<LocalAccountId>, AuthError>;

    /// Merge `metadata` into the account's user metadata.
    async fn update_metadata(
        &self,
        account: &LocalAccountId,
        metadata: serde_json::Value,
    ) -> Result<(), AuthError>;
}

/// Order lookups for the notification service.
#[async_trait]
pub trait OrderDirectory: Send + Sync {
    async fn find_order(&self, order_id: i64) -> Result<Option<Order>, StoreError>;
}

/// LINE Messaging API: push and reply.
#[async_trait]
pub trait PushClient: Send + Sync {
    async fn push(&self, to: &ExternalId, messages: &[OutboundMessage]) -> Result<(), PushError>;

    async fn reply(&self, reply_token: &str, messages: &[OutboundMessage]) -> Result<(), PushError>;
}

/// LINE Login API: access-token verification.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, access_token: &str) -> Result<TokenInfo, TokenError>;

    async fn profile(&self, access_token: &str) -> Result<PlatformProfile, TokenError>;
}
