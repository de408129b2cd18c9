//! thinker HTTP gateway.
//!
//! Routes the LINE webhook, LINE login / migration, access-token checks and
//! the internal notification trigger onto the identity and notify services.

pub mod auth;
pub mod error;
pub mod health;
pub mod line_auth;
pub mod notify;
pub mod server;
pub mod webhook;


pub use error::ApiError;
pub use server::{build_router, start_server, GatewayState};
