//! LINE identity for thinker: resolve a LINE user id to a local account,
//! provision or link accounts, and issue sessions.

pub mod error;
pub mod login;
pub mod migrate;
pub mod provisioner;
pub mod request;
pub mod resolver;
pub mod session;
pub mod token;

pub use error::IdentityError;
pub use login::{LoginProfile, LoginResponse, LoginService};
pub use migrate::{MigrateResponse, MigratedUser, MigrationService};
pub use provisioner::{AccountProvisioner, ProvisionOutcome, ProvisionRequest};
pub use request::LineAuthRequest;
pub use resolver::{IdentityResolver, Resolution};
pub use session::SessionIssuer;
pub use token::{AccessTokenChecker, VerifiedToken};
