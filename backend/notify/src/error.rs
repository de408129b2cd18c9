use thinker_core::{Classify, ErrorKind, PushError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("unknown notification type: {0}")]
    UnknownKind(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("order {0} not found")]
    OrderNotFound(i64),

    #[error("recipient has no linked LINE account")]
    RecipientNotLinked,

    #[error("recipient has not added the LINE official account as a friend")]
    NotFriend,

    #[error("payment deadline for order {0} is out of range")]
    DeadlineOutOfRange(i64),

    #[error("push rejected: {0}")]
    PushRejected(#[from] PushError),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl Classify for NotifyError {
    fn kind(&self) -> ErrorKind {
        match self {
            NotifyError::UnknownKind(_) | NotifyError::InvalidInput(_) => ErrorKind::InvalidInput,
            NotifyError::OrderNotFound(_)
            | NotifyError::RecipientNotLinked
            | NotifyError::NotFriend => ErrorKind::NotFound,
            NotifyError::DeadlineOutOfRange(_) => ErrorKind::Internal,
            NotifyError::PushRejected(_) | NotifyError::StoreUnavailable(_) => {
                ErrorKind::UpstreamUnavailable
            }
        }
    }
}
