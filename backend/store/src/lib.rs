//! SQLite-backed collaborators for the thinker service.
//!
//! One [`SqliteStore`] implements the user-record store ([`UserStore`]),
//! the account/session collaborator ([`AuthProvider`]) and the order
//! directory ([`OrderDirectory`]). The LINE id column carries a UNIQUE
//! constraint; writes that violate it surface as `StoreError::Conflict`.
//!
//! [`UserStore`]: thinker_core::UserStore
//! [`AuthProvider`]: thinker_core::AuthProvider
//! [`OrderDirectory`]: thinker_core::OrderDirectory

mod accounts;
mod orders;
mod profiles;
mod schema;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::{Connection, ErrorCode};
use thinker_core::StoreError;
use tokio::sync::Mutex;
use tracing::info;

/// Default session lifetime when none is configured.
const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

pub struct SqliteStore {
    conn: Mutex<Connection>,
    /// `None` when the configured lifetime does not fit a `Duration`.
    session_ttl: Option<Duration>,
}

impl SqliteStore {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open SQLite database at {:?}", path.as_ref()))?;
        conn.execute_batch(schema::PRAGMAS)
            .context("Failed to configure SQLite connection")?;
        conn.execute_batch(schema::SCHEMA)
            .context("Failed to initialize thinker schema")?;

        info!("SqliteStore opened at {:?}", path.as_ref());
        Ok(Self::with_connection(conn))
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            session_ttl: Duration::try_seconds(DEFAULT_SESSION_TTL_SECS),
        }
    }

    /// Override how long issued sessions stay valid.
    pub fn with_session_ttl(mut self, secs: i64) -> Self {
        self.session_ttl = Duration::try_seconds(secs);
        self
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Map a rusqlite failure onto the store taxonomy.
pub(crate) fn store_error(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::Conflict(err.to_string())
        }
        _ => StoreError::Unavailable(err.to_string()),
    }
}

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

pub(crate) fn from_unix(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}
