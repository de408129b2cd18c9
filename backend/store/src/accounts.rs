use async_trait::async_trait;
use chrono::Utc;
use rand::RngCore;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};
use thinker_core::{AuthError, AuthProvider, LocalAccountId, NewAccount, Session};
use tracing::{debug, info};

use crate::{is_constraint_violation, SqliteStore};

fn unavailable(err: rusqlite::Error) -> AuthError {
    AuthError::Unavailable(err.to_string())
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Trim and lowercase the domain. The local part keeps its case: synthetic
/// addresses embed case-sensitive LINE ids.
fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_ascii_lowercase()),
        None => email.to_string(),
    }
}

/// `salt$sha256(salt || password)`
fn hash_password(password: &str) -> String {
    let salt = random_hex(16);
    let digest = sha256_hex(&format!("{salt}{password}"));
    format!("{salt}${digest}")
}

/// Shallow-merge `patch` into `base` when both are objects; otherwise replace.
fn merge_metadata(base: serde_json::Value, patch: serde_json::Value) -> serde_json::Value {
    match (base, patch) {
        (serde_json::Value::Object(mut base), serde_json::Value::Object(patch)) => {
            base.extend(patch);
            serde_json::Value::Object(base)
        }
        (_, patch) => patch,
    }
}

#[async_trait]
impl AuthProvider for SqliteStore {
    async fn create_account(&self, account: NewAccount) -> Result<LocalAccountId, AuthError> {
        let id = uuid::Uuid::new_v4().to_string();
        let email = normalize_email(&account.email);
        let password_hash = hash_password(&account.password);

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO accounts (id, email, password_hash, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                email,
                password_hash,
                account.metadata.to_string(),
                Utc::now().timestamp()
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                AuthError::EmailTaken(email.clone())
            } else {
                unavailable(e)
            }
        })?;

        info!(account = %id, "Created account");
        Ok(LocalAccountId::new(id))
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<LocalAccountId>, AuthError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id FROM accounts WHERE email = ?1",
            params![normalize_email(email)],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map(|id| id.map(LocalAccountId::new))
        .map_err(unavailable)
    }

    async fn issue_session(&self, account: &LocalAccountId) -> Result<Session, AuthError> {
        let token = random_hex(32);
        let now = Utc::now();
        let ttl = self
            .session_ttl
            .ok_or_else(|| AuthError::Unavailable("session lifetime is out of range".into()))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Unavailable("session expiry is out of range".into()))?
            .timestamp();

        let conn = self.conn.lock().await;
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1)",
                params![account.as_str()],
                |row| row.get(0),
            )
            .map_err(unavailable)?;
        if !exists {
            return Err(AuthError::AccountNotFound(account.to_string()));
        }

        let pruned = conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now.timestamp()])
            .map_err(unavailable)?;
        if pruned > 0 {
            debug!(pruned, "Removed expired sessions");
        }

        conn.execute(
            "INSERT INTO sessions (token_hash, account_id, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![sha256_hex(&token), account.as_str(), expires_at, now.timestamp()],
        )
        .map_err(unavailable)?;

        debug!(account = %account, "Issued session");
        Ok(Session {
            access_token: token,
            token_type: "bearer".to_string(),
            expires_in: ttl.num_seconds(),
            expires_at,
            user_id: account.clone(),
        })
    }

    async fn authenticate(&self, access_token: &str) -> Result<Option<LocalAccountId>, AuthError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT account_id FROM sessions WHERE token_hash = ?1 AND expires_at > ?2",
            params![sha256_hex(access_token), Utc::now().timestamp()],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map(|id| id.map(LocalAccountId::new))
        .map_err(unavailable)
    }

    async fn update_metadata(
        &self,
        account: &LocalAccountId,
        metadata: serde_json::Value,
    ) -> Result<(), AuthError> {
        let conn = self.conn.lock().await;
        let current: Option<String> = conn
            .query_row(
                "SELECT metadata FROM accounts WHERE id = ?1",
                params![account.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(unavailable)?;
        let Some(current) = current else {
            return Err(AuthError::AccountNotFound(account.to_string()));
        };

        let base = serde_json::from_str(&current).unwrap_or(serde_json::Value::Null);
        let merged = merge_metadata(base, metadata);
        conn.execute(
            "UPDATE accounts SET metadata = ?2 WHERE id = ?1",
            params![account.as_str(), merged.to_string()],
        )
        .map_err(unavailable)?;
        Ok(())
    }
}

impl SqliteStore {
    /// Raw user metadata for an account.
    pub async fn account_metadata(
        &self,
        account: &LocalAccountId,
    ) -> Result<Option<serde_json::Value>, AuthError> {
        let conn = self.conn.lock().await;
        let raw: Option<String> = conn
            .query_row(
                "SELECT metadata FROM accounts WHERE id = ?1",
                params![account.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(unavailable)?;
        Ok(raw.and_then(|s| serde_json::from_str(&s).ok()))
    }

    /// Number of accounts, for `thinker status`.
    pub async fn account_count(&self) -> anyhow::Result<i64> {
        let conn = self.conn.lock().await;
        Ok(conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?)
    }
}
