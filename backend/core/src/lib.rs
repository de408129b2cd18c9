//! Shared types, error taxonomy and collaborator traits for the thinker
//! LINE identity service.

pub mod error;
pub mod event;
pub mod message;
pub mod traits;
pub mod types;

pub use error::{AuthError, Classify, ErrorKind, PushError, StoreError, ThinkerError, TokenError};
pub use event::{
    EventMeta, EventSource, FollowEvent, MalformedEvent, MessageEvent, PostbackEvent,
    UnfollowEvent, WebhookEnvelope, WebhookEvent,
};
pub use message::OutboundMessage;
pub use traits::{AuthProvider, OrderDirectory, PushClient, TokenVerifier, UserStore};
pub use types::{
    AuthProviderKind, ExternalId, IdentityLink, InvalidIdentifier, LinkProvenance,
    LocalAccountId, NewAccount, NewProfile, Order, PlatformProfile, Profile, Session, TokenInfo,
};
