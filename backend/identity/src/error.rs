use thinker_core::{AuthError, Classify, ErrorKind, InvalidIdentifier, StoreError, TokenError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid LINE user id: {0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("user store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("account {0} not found")]
    AccountNotFound(String),

    /// The caller's own account is already linked to another LINE id.
    #[error("account is already linked to a different LINE account")]
    AlreadyLinked,

    /// The LINE id belongs to some other account.
    #[error("this LINE account is already linked to another user")]
    IdentifierTaken,

    #[error("failed to issue session: {0}")]
    SessionIssuanceFailed(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl Classify for IdentityError {
    fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::InvalidIdentifier(_) | IdentityError::InvalidInput(_) => {
                ErrorKind::InvalidInput
            }
            IdentityError::Unauthorized(_) => ErrorKind::Unauthorized,
            IdentityError::AccountNotFound(_) => ErrorKind::NotFound,
            IdentityError::AlreadyLinked | IdentityError::IdentifierTaken => ErrorKind::Conflict,
            IdentityError::StoreUnavailable(_) | IdentityError::UpstreamUnavailable(_) => {
                ErrorKind::UpstreamUnavailable
            }
            IdentityError::SessionIssuanceFailed(_) => ErrorKind::Internal,
        }
    }
}

impl From<InvalidIdentifier> for IdentityError {
    fn from(err: InvalidIdentifier) -> Self {
        IdentityError::InvalidIdentifier(err.0)
    }
}

impl From<StoreError> for IdentityError {
    fn from(err: StoreError) -> Self {
        IdentityError::StoreUnavailable(err.to_string())
    }
}

impl From<AuthError> for IdentityError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AccountNotFound(id) => IdentityError::AccountNotFound(id),
            other => IdentityError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<TokenError> for IdentityError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(msg) => IdentityError::Unauthorized(msg),
            TokenError::Unavailable(msg) => IdentityError::UpstreamUnavailable(msg),
        }
    }
}
