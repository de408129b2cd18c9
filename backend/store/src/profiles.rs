use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use thinker_core::{
    AuthProviderKind, ExternalId, IdentityLink, LinkProvenance, LocalAccountId, NewProfile,
    Profile, StoreError, UserStore,
};
use tracing::{debug, warn};

use crate::{from_unix, store_error, SqliteStore};

const PROFILE_COLUMNS: &str = "user_id, full_name, line_user_id, line_display_name, line_picture_url,
     auth_provider, migrated_from_email, line_is_friend, line_friend_added_at";

fn row_to_profile(row: &Row) -> rusqlite::Result<Profile> {
    let account_id: String = row.get(0)?;
    let line_user_id: Option<String> = row.get(2)?;
    let auth_provider: String = row.get(5)?;
    let friend_added_at: Option<i64> = row.get(8)?;
    let line_user_id = line_user_id.and_then(|raw| match ExternalId::parse(&raw) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(account = %account_id, error = %e, "Stored LINE id is malformed, treating profile as unlinked");
            None
        }
    });
    Ok(Profile {
        account_id: LocalAccountId::new(account_id),
        full_name: row.get(1)?,
        line_user_id,
        line_display_name: row.get(3)?,
        line_picture_url: row.get(4)?,
        auth_provider: AuthProviderKind::from_db(&auth_provider),
        migrated_from_email: row.get::<_, i64>(6)? != 0,
        line_is_friend: row.get::<_, i64>(7)? != 0,
        line_friend_added_at: friend_added_at.map(from_unix),
    })
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn find_by_line_id(&self, id: &ExternalId) -> Result<Option<Profile>, StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE line_user_id = ?1"),
            params![id.as_str()],
            row_to_profile,
        )
        .optional()
        .map_err(store_error)
    }

    async fn find_by_account(&self, account: &LocalAccountId) -> Result<Option<Profile>, StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
            params![account.as_str()],
            row_to_profile,
        )
        .optional()
        .map_err(store_error)
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let link = profile.link.as_ref();
        let provider = if link.is_some() {
            AuthProviderKind::Line
        } else {
            AuthProviderKind::Email
        };
        let migrated = link.is_some_and(|l| l.provenance == LinkProvenance::Migrated);

        conn.execute(
            "INSERT INTO profiles (user_id, full_name, line_user_id, line_display_name,
                                   line_picture_url, auth_provider, migrated_from_email, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                profile.account_id.as_str(),
                profile.full_name,
                link.map(|l| l.external_id.as_str()),
                link.and_then(|l| l.display_name.as_deref()),
                link.and_then(|l| l.picture_url.as_deref()),
                provider.as_str(),
                migrated,
                Utc::now().timestamp(),
            ],
        )
        .map_err(store_error)?;
        debug!(account = %profile.account_id, "Inserted profile");
        Ok(())
    }

    async fn refresh_line_profile(
        &self,
        account: &LocalAccountId,
        id: &ExternalId,
        display_name: Option<&str>,
        picture_url: Option<&str>,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn
            .execute(
                "UPDATE profiles
                 SET line_display_name = COALESCE(?3, line_display_name),
                     line_picture_url  = COALESCE(?4, line_picture_url),
                     updated_at        = ?5
                 WHERE user_id = ?1 AND line_user_id = ?2",
                params![
                    account.as_str(),
                    id.as_str(),
                    display_name,
                    picture_url,
                    Utc::now().timestamp(),
                ],
            )
            .map_err(store_error)?;
        if changed == 0 {
            return Err(StoreError::NoMatch(format!("{account} is not linked to {id}")));
        }
        Ok(())
    }

    async fn link_line_identity(
        &self,
        account: &LocalAccountId,
        link: &IdentityLink,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn
            .execute(
                "UPDATE profiles
                 SET line_user_id        = ?2,
                     line_display_name   = ?3,
                     line_picture_url    = ?4,
                     auth_provider       = 'line',
                     migrated_from_email = ?5,
                     updated_at          = ?6
                 WHERE user_id = ?1 AND line_user_id IS NULL",
                params![
                    account.as_str(),
                    link.external_id.as_str(),
                    link.display_name,
                    link.picture_url,
                    link.provenance == LinkProvenance::Migrated,
                    Utc::now().timestamp(),
                ],
            )
            .map_err(store_error)?;
        if changed == 0 {
            return Err(StoreError::NoMatch(format!("{account} has no unlinked profile")));
        }
        debug!(account = %account, line_user_id = %link.external_id, "Linked LINE identity");
        Ok(())
    }

    async fn set_friend_status(
        &self,
        id: &ExternalId,
        is_friend: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let changed = if is_friend {
            conn.execute(
                "UPDATE profiles SET line_is_friend = 1, line_friend_added_at = ?2, updated_at = ?2
                 WHERE line_user_id = ?1",
                params![id.as_str(), at.timestamp()],
            )
        } else {
            conn.execute(
                "UPDATE profiles SET line_is_friend = 0, updated_at = ?2 WHERE line_user_id = ?1",
                params![id.as_str(), at.timestamp()],
            )
        }
        .map_err(store_error)?;
        Ok(changed > 0)
    }
}
