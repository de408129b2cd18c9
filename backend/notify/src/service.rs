use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use thinker_core::{ExternalId, LocalAccountId, OrderDirectory, UserStore};
use tracing::{debug, info};

use crate::error::NotifyError;
use crate::sender::{NotificationKind, NotificationSender};
use crate::templates::RenderedFields;

/// Shown when the profile has no name.
pub const DEFAULT_STUDENT_NAME: &str = "學員";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyReceipt {
    pub kind: NotificationKind,
    pub order_id: i64,
    pub line_user_id: ExternalId,
}

/// Order id -> owner profile -> rendered fields -> push.
#[derive(Clone)]
pub struct NotificationService {
    orders: Arc<dyn OrderDirectory>,
    store: Arc<dyn UserStore>,
    sender: NotificationSender,
    site_url: String,
    /// `None` when the configured hours do not fit a `Duration`.
    payment_window: Option<Duration>,
}

impl NotificationService {
    pub fn new(
        orders: Arc<dyn OrderDirectory>,
        store: Arc<dyn UserStore>,
        sender: NotificationSender,
        site_url: impl Into<String>,
        payment_window_hours: i64,
    ) -> Self {
        Self {
            orders,
            store,
            sender,
            site_url: site_url.into().trim_end_matches('/').to_string(),
            payment_window: Duration::try_hours(payment_window_hours),
        }
    }

    pub fn payment_url(&self, order_id: i64) -> String {
        format!("{}/order/{}", self.site_url, order_id)
    }

    pub async fn notify(
        &self,
        kind: NotificationKind,
        order_id: i64,
        user_id: Option<&LocalAccountId>,
    ) -> Result<NotifyReceipt, NotifyError> {
        let order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or(NotifyError::OrderNotFound(order_id))?;

        if let Some(user_id) = user_id {
            if *user_id != order.user_id {
                return Err(NotifyError::InvalidInput(format!(
                    "order {order_id} does not belong to user {user_id}"
                )));
            }
        }

        let profile = self
            .store
            .find_by_account(&order.user_id)
            .await?
            .ok_or(NotifyError::RecipientNotLinked)?;
        let line_user_id = profile
            .line_user_id
            .clone()
            .ok_or(NotifyError::RecipientNotLinked)?;
        if kind.requires_friendship() && !profile.line_is_friend {
            info!(%kind, order_id, line_user_id = %line_user_id, "Recipient is not a friend, skipping push");
            return Err(NotifyError::NotFriend);
        }

        let deadline = self
            .payment_window
            .and_then(|window| order.created_at.checked_add_signed(window))
            .ok_or(NotifyError::DeadlineOutOfRange(order_id))?;

        let fields = RenderedFields {
            student_name: profile
                .full_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STUDENT_NAME.to_string()),
            order_id: order.order_id.to_string(),
            course_name: order.course_name.clone(),
            amount: order.total,
            payment_url: self.payment_url(order.order_id),
            payment_deadline: Some(deadline),
        };
        debug!(%kind, order_id, "Rendered notification fields");

        self.sender.send(kind, Some(&line_user_id), &fields).await?;
        Ok(NotifyReceipt {
            kind,
            order_id,
            line_user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use thinker_core::{IdentityLink, LinkProvenance, NewProfile, Order, OutboundMessage};
    use thinker_store::SqliteStore;

    use super::*;
    use crate::sender::fakes::RecordingPush;
    use crate::templates::TemplateContext;

    async fn seeded(linked: bool, name: Option<&str>) -> (Arc<SqliteStore>, Arc<RecordingPush>, NotificationService) {
        seeded_with(linked, linked, name, 24).await
    }

    async fn seeded_with(
        linked: bool,
        friend: bool,
        name: Option<&str>,
        window_hours: i64,
    ) -> (Arc<SqliteStore>, Arc<RecordingPush>, NotificationService) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let owner = LocalAccountId::new("acc-1");
        store
            .insert_profile(NewProfile {
                account_id: owner.clone(),
                full_name: name.map(str::to_string),
                link: linked.then(|| IdentityLink {
                    external_id: ExternalId::parse("Ustudent").unwrap(),
                    display_name: None,
                    picture_url: None,
                    provenance: LinkProvenance::Native,
                }),
            })
            .await
            .unwrap();
        if friend {
            store
                .set_friend_status(&ExternalId::parse("Ustudent").unwrap(), true, Utc::now())
                .await
                .unwrap();
        }
        store
            .upsert_order(&Order {
                order_id: 42,
                user_id: owner,
                course_id: 3,
                course_name: "手沖入門".into(),
                total: 3200,
                created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            })
            .await
            .unwrap();

        let push = Arc::new(RecordingPush::default());
        let sender = NotificationSender::new(
            push.clone(),
            TemplateContext {
                brand_name: "思考者咖啡".into(),
                payment_window_hours: 24,
            },
        );
        let svc = NotificationService::new(
            store.clone(),
            store.clone(),
            sender,
            "https://thinker.cafe/",
            window_hours,
        );
        (store, push, svc)
    }

    #[tokio::test]
    async fn reminder_uses_order_and_deadline() {
        let (_store, push, svc) = seeded(true, None).await;
        let receipt = svc
            .notify(NotificationKind::PaymentReminder, 42, None)
            .await
            .unwrap();
        assert_eq!(receipt.line_user_id.as_str(), "Ustudent");

        let pushed = push.pushed.lock().unwrap();
        let OutboundMessage::Flex { contents, .. } = &pushed[0].1[0] else {
            panic!("expected flex");
        };
        let body = contents["body"]["contents"].clone();
        assert_eq!(body[0]["text"], "學員 您好！");
        let rows = &body[3]["contents"];
        assert_eq!(rows[3]["contents"][1]["text"], "2025/01/02 08:00");
        assert_eq!(
            contents["footer"]["contents"][0]["action"]["uri"],
            "https://thinker.cafe/order/42"
        );
    }

    #[tokio::test]
    async fn unknown_order_and_unlinked_owner() {
        let (_store, _push, svc) = seeded(false, Some("王")).await;
        assert!(matches!(
            svc.notify(NotificationKind::PaymentSuccess, 99, None).await,
            Err(NotifyError::OrderNotFound(99))
        ));
        assert!(matches!(
            svc.notify(NotificationKind::PaymentSuccess, 42, None).await,
            Err(NotifyError::RecipientNotLinked)
        ));
    }

    #[tokio::test]
    async fn user_must_own_order() {
        let (_store, push, svc) = seeded(true, Some("王")).await;
        let stranger = LocalAccountId::new("acc-2");
        assert!(matches!(
            svc.notify(NotificationKind::OrderConfirmation, 42, Some(&stranger)).await,
            Err(NotifyError::InvalidInput(_))
        ));
        assert!(push.pushed.lock().unwrap().is_empty());

        let owner = LocalAccountId::new("acc-1");
        svc.notify(NotificationKind::PaymentSuccess, 42, Some(&owner))
            .await
            .unwrap();
        let pushed = push.pushed.lock().unwrap();
        let OutboundMessage::Text { text } = &pushed[0].1[0] else {
            panic!("expected text");
        };
        assert!(text.contains("王 您好！"));
    }

    #[tokio::test]
    async fn reminder_skips_users_who_are_not_friends() {
        let (_store, push, svc) = seeded_with(true, false, Some("王"), 24).await;
        assert!(matches!(
            svc.notify(NotificationKind::PaymentReminder, 42, None).await,
            Err(NotifyError::NotFriend)
        ));
        assert!(push.pushed.lock().unwrap().is_empty());

        // Transactional notices are not gated on friendship.
        svc.notify(NotificationKind::PaymentSuccess, 42, None)
            .await
            .unwrap();
        assert_eq!(push.pushed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn oversized_window_is_an_error_not_a_panic() {
        for hours in [3_000_000_000, i64::MAX] {
            let (_store, push, svc) = seeded_with(true, true, None, hours).await;
            let err = svc
                .notify(NotificationKind::PaymentReminder, 42, None)
                .await
                .unwrap_err();
            assert!(matches!(err, NotifyError::DeadlineOutOfRange(42)), "{hours}: {err}");
            assert!(push.pushed.lock().unwrap().is_empty());
        }
    }
}
