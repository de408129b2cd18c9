//! LINE platform plumbing for thinker: webhook signature checks, event
//! dispatch and the Messaging / Login API client.

pub mod client;
pub mod dispatcher;
pub mod handlers;
pub mod signature;

pub use client::{LineClient, DEFAULT_API_BASE};
pub use dispatcher::Dispatcher;
pub use handlers::{EventHandler, FriendshipHandler, LoggingHandler};
pub use signature::SIGNATURE_HEADER;
