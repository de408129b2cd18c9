//! Order-lifecycle notifications pushed to students over LINE.

pub mod error;
pub mod sender;
pub mod service;
pub mod templates;

pub use error::NotifyError;
pub use sender::{NotificationKind, NotificationSender};
pub use service::{NotificationService, NotifyReceipt, DEFAULT_STUDENT_NAME};
pub use templates::{RenderedFields, TemplateContext};
