//! Webhook event handlers.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use thinker_core::{
    FollowEvent, MessageEvent, OutboundMessage, PostbackEvent, PushClient, UnfollowEvent,
    UserStore,
};
use tracing::{info, warn};

/// One async method per LINE event type. The defaults log and do nothing.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_message(&self, event: MessageEvent) -> Result<()> {
        info!(
            user = ?event.meta.source.user_id,
            kind = %event.message.kind,
            "LINE message received"
        );
        Ok(())
    }

    async fn on_follow(&self, event: FollowEvent) -> Result<()> {
        info!(user = ?event.meta.source.user_id, "LINE user followed");
        Ok(())
    }

    async fn on_unfollow(&self, event: UnfollowEvent) -> Result<()> {
        info!(user = ?event.meta.source.user_id, "LINE user unfollowed");
        Ok(())
    }

    async fn on_postback(&self, event: PostbackEvent) -> Result<()> {
        info!(
            user = ?event.meta.source.user_id,
            data = %event.postback.data,
            "LINE postback received"
        );
        Ok(())
    }

    async fn on_unknown(&self, event_type: &str) -> Result<()> {
        info!(event_type, "Ignoring unhandled LINE event");
        Ok(())
    }
}

/// Logs every event and changes nothing.
pub struct LoggingHandler;

#[async_trait]
impl EventHandler for LoggingHandler {}

/// Keeps `line_is_friend` in sync and greets new friends.
pub struct FriendshipHandler {
    store: Arc<dyn UserStore>,
    push: Arc<dyn PushClient>,
    welcome_message: Option<String>,
}

impl FriendshipHandler {
    pub fn new(
        store: Arc<dyn UserStore>,
        push: Arc<dyn PushClient>,
        welcome_message: Option<String>,
    ) -> Self {
        Self {
            store,
            push,
            welcome_message,
        }
    }
}

#[async_trait]
impl EventHandler for FriendshipHandler {
    async fn on_follow(&self, event: FollowEvent) -> Result<()> {
        let Some(user) = event.meta.source.external_id() else {
            info!("Follow event without a user source, skipping");
            return Ok(());
        };
        let at = Utc
            .timestamp_millis_opt(event.meta.timestamp)
            .single()
            .unwrap_or_else(Utc::now);

        match self.store.set_friend_status(&user, true, at).await {
            Ok(true) => info!(user = %user, "Marked LINE user as friend"),
            Ok(false) => info!(user = %user, "Follower has no profile yet"),
            Err(e) => warn!(user = %user, error = %e, "Failed to record follow"),
        }

        let Some(welcome) = &self.welcome_message else {
            return Ok(());
        };
        if let Err(e) = self
            .push
            .reply(&event.reply_token, &[OutboundMessage::text(welcome)])
            .await
        {
            warn!(user = %user, error = %e, "Failed to send welcome message");
        }
        Ok(())
    }

    async fn on_unfollow(&self, event: UnfollowEvent) -> Result<()> {
        let Some(user) = event.meta.source.external_id() else {
            return Ok(());
        };
        match self.store.set_friend_status(&user, false, Utc::now()).await {
            Ok(_) => info!(user = %user, "Cleared LINE friend flag"),
            Err(e) => warn!(user = %user, error = %e, "Failed to record unfollow"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use thinker_core::{
        ExternalId, IdentityLink, LinkProvenance, LocalAccountId, NewProfile, PushError,
        WebhookEvent,
    };
    use thinker_store::SqliteStore;

    use super::*;

    #[derive(Default)]
    struct RecordingPush {
        replies: Mutex<Vec<(String, Vec<OutboundMessage>)>>,
    }

    #[async_trait]
    impl PushClient for RecordingPush {
        async fn push(&self, _to: &ExternalId, _messages: &[OutboundMessage]) -> Result<(), PushError> {
            Ok(())
        }

        async fn reply(&self, token: &str, messages: &[OutboundMessage]) -> Result<(), PushError> {
            self.replies
                .lock()
                .unwrap()
                .push((token.to_string(), messages.to_vec()));
            Ok(())
        }
    }

    fn follow(user: &str) -> FollowEvent {
        let raw = json!({
            "type": "follow",
            "replyToken": "rt-1",
            "timestamp": 1_700_000_000_000i64,
            "source": { "type": "user", "userId": user },
            "webhookEventId": "01H",
            "deliveryContext": { "isRedelivery": false }
        });
        match WebhookEvent::parse(raw).unwrap() {
            WebhookEvent::Follow(e) => e,
            other => panic!("expected follow, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn follow_marks_friend_and_replies() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .insert_profile(NewProfile {
                account_id: LocalAccountId::new("acc-1"),
                full_name: None,
                link: Some(IdentityLink {
                    external_id: ExternalId::parse("Ufriend").unwrap(),
                    display_name: None,
                    picture_url: None,
                    provenance: LinkProvenance::Native,
                }),
            })
            .await
            .unwrap();
        let push = Arc::new(RecordingPush::default());
        let handler = FriendshipHandler::new(store.clone(), push.clone(), Some("welcome!".into()));

        handler.on_follow(follow("Ufriend")).await.unwrap();

        let profile = store
            .find_by_line_id(&ExternalId::parse("Ufriend").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(profile.line_is_friend);
        assert_eq!(
            profile.line_friend_added_at.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );

        let replies = push.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, "rt-1");
        assert_eq!(replies[0].1, vec![OutboundMessage::text("welcome!")]);
    }

    #[tokio::test]
    async fn follow_from_unknown_user_still_greets() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let push = Arc::new(RecordingPush::default());
        let handler = FriendshipHandler::new(store, push.clone(), Some("hi".into()));

        handler.on_follow(follow("Ustranger")).await.unwrap();
        assert_eq!(push.replies.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn no_welcome_configured_means_no_reply() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let push = Arc::new(RecordingPush::default());
        let handler = FriendshipHandler::new(store, push.clone(), None);

        handler.on_follow(follow("Uquiet")).await.unwrap();
        assert!(push.replies.lock().unwrap().is_empty());
    }
}
