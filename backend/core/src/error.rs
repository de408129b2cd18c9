use thiserror::Error;

/// Coarse failure classes shared by every component.
///
/// The gateway maps each kind onto one HTTP status; component errors only
/// need to say which kind they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed request fields.
    InvalidInput,
    /// Signature or token check failed.
    Unauthorized,
    /// No matching account, order or profile.
    NotFound,
    /// Identifier already linked elsewhere.
    Conflict,
    /// A collaborator (store, auth, LINE platform) could not be reached.
    UpstreamUnavailable,
    /// Anything unexpected.
    Internal,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidInput => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::UpstreamUnavailable | ErrorKind::Internal => 500,
        }
    }
}

/// Implemented by every component error so callers can classify it.
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}

/// Top-level error type for the thinker runtime.
#[derive(Debug, Error)]
pub enum ThinkerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Classify for ThinkerError {
    fn kind(&self) -> ErrorKind {
        match self {
            ThinkerError::InvalidInput(_) => ErrorKind::InvalidInput,
            ThinkerError::Unauthorized(_) => ErrorKind::Unauthorized,
            ThinkerError::NotFound(_) => ErrorKind::NotFound,
            ThinkerError::Conflict(_) => ErrorKind::Conflict,
            ThinkerError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            ThinkerError::ConfigError(_) | ThinkerError::Other(_) => ErrorKind::Internal,
        }
    }
}

/// Errors from the user-record store.
///
/// "No such row" is never an error here: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A guarded update matched no row.
    #[error("no matching record: {0}")]
    NoMatch(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl Classify for StoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::NoMatch(_) => ErrorKind::NotFound,
            StoreError::Unavailable(_) => ErrorKind::UpstreamUnavailable,
        }
    }
}

/// Errors from the auth (account + session) collaborator.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("an account with email {0} already exists")]
    EmailTaken(String),

    #[error("account {0} does not exist")]
    AccountNotFound(String),

    #[error("auth backend unavailable: {0}")]
    Unavailable(String),
}

impl Classify for AuthError {
    fn kind(&self) -> ErrorKind {
        match self {
            AuthError::EmailTaken(_) => ErrorKind::Conflict,
            AuthError::AccountNotFound(_) => ErrorKind::NotFound,
            AuthError::Unavailable(_) => ErrorKind::UpstreamUnavailable,
        }
    }
}

/// Errors from the LINE push / reply API.
#[derive(Debug, Error)]
pub enum PushError {
    /// The platform answered with a non-success status (e.g. the user blocked the bot).
    #[error("LINE rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("LINE messaging API unreachable: {0}")]
    Unavailable(String),
}

impl Classify for PushError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::UpstreamUnavailable
    }
}

/// Errors from LINE access-token verification.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("access token rejected: {0}")]
    Invalid(String),

    #[error("LINE login API unreachable: {0}")]
    Unavailable(String),
}

impl Classify for TokenError {
    fn kind(&self) -> ErrorKind {
        match self {
            TokenError::Invalid(_) => ErrorKind::Unauthorized,
            TokenError::Unavailable(_) => ErrorKind::UpstreamUnavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(ErrorKind::InvalidInput.status_code(), 400);
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::UpstreamUnavailable.status_code(), 500);
        assert_eq!(ErrorKind::Internal.status_code(), 500);
    }

    #[test]
    fn store_errors_classify() {
        assert_eq!(StoreError::Conflict("x".into()).kind(), ErrorKind::Conflict);
        assert_eq!(
            StoreError::Unavailable("db locked".into()).kind(),
            ErrorKind::UpstreamUnavailable
        );
        assert_eq!(TokenError::Invalid("expired".into()).kind(), ErrorKind::Unauthorized);
    }
}
