use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thinker_core::{ExternalId, OutboundMessage, PushClient};
use tracing::{info, warn};

use crate::error::NotifyError;
use crate::templates::{self, RenderedFields, TemplateContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PaymentReminder,
    OrderConfirmation,
    PaymentSuccess,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::PaymentReminder => "payment_reminder",
            NotificationKind::OrderConfirmation => "order_confirmation",
            NotificationKind::PaymentSuccess => "payment_success",
        }
    }

    /// Reminders only go to users who still follow the official account.
    pub fn requires_friendship(self) -> bool {
        matches!(self, NotificationKind::PaymentReminder)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment_reminder" => Ok(NotificationKind::PaymentReminder),
            "order_confirmation" => Ok(NotificationKind::OrderConfirmation),
            "payment_success" => Ok(NotificationKind::PaymentSuccess),
            other => Err(NotifyError::UnknownKind(other.to_string())),
        }
    }
}

/// Builds the kind-specific message and pushes it. No lookups happen here.
#[derive(Clone)]
pub struct NotificationSender {
    push: Arc<dyn PushClient>,
    context: TemplateContext,
}

impl NotificationSender {
    pub fn new(push: Arc<dyn PushClient>, context: TemplateContext) -> Self {
        Self { push, context }
    }

    pub fn compose(&self, kind: NotificationKind, fields: &RenderedFields) -> OutboundMessage {
        match kind {
            NotificationKind::PaymentReminder => templates::payment_reminder(&self.context, fields),
            NotificationKind::OrderConfirmation => templates::order_confirmation(&self.context, fields),
            NotificationKind::PaymentSuccess => templates::payment_success(fields),
        }
    }

    pub async fn send(
        &self,
        kind: NotificationKind,
        recipient: Option<&ExternalId>,
        fields: &RenderedFields,
    ) -> Result<(), NotifyError> {
        let recipient = recipient.ok_or(NotifyError::RecipientNotLinked)?;
        let message = self.compose(kind, fields);

        if let Err(e) = self.push.push(recipient, &[message]).await {
            warn!(%kind, to = %recipient, order = %fields.order_id, error = %e, "LINE notification rejected");
            return Err(e.into());
        }
        info!(%kind, to = %recipient, order = %fields.order_id, "LINE notification sent");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use thinker_core::PushError;

    use super::*;

    /// Records pushes; rejects recipients listed in `blocked`.
    #[derive(Default)]
    pub(crate) struct RecordingPush {
        pub(crate) pushed: Mutex<Vec<(ExternalId, Vec<OutboundMessage>)>>,
        pub(crate) blocked: Vec<String>,
    }

    #[async_trait]
    impl PushClient for RecordingPush {
        async fn push(&self, to: &ExternalId, messages: &[OutboundMessage]) -> Result<(), PushError> {
            if self.blocked.iter().any(|b| b == to.as_str()) {
                return Err(PushError::Rejected {
                    status: 403,
                    body: r#"{"message":"The user blocked this account"}"#.into(),
                });
            }
            self.pushed.lock().unwrap().push((to.clone(), messages.to_vec()));
            Ok(())
        }

        async fn reply(&self, _token: &str, _messages: &[OutboundMessage]) -> Result<(), PushError> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::RecordingPush;
    use super::*;

    fn sender(push: Arc<RecordingPush>) -> NotificationSender {
        NotificationSender::new(
            push,
            TemplateContext {
                brand_name: "思考者咖啡".into(),
                payment_window_hours: 24,
            },
        )
    }

    fn fields() -> RenderedFields {
        RenderedFields {
            student_name: "學員".into(),
            order_id: "7".into(),
            course_name: "拉花".into(),
            amount: 1500,
            payment_url: "https://thinker.cafe/order/7".into(),
            payment_deadline: None,
        }
    }

    #[test]
    fn kind_wire_names() {
        for kind in [
            NotificationKind::PaymentReminder,
            NotificationKind::OrderConfirmation,
            NotificationKind::PaymentSuccess,
        ] {
            assert_eq!(kind.as_str().parse::<NotificationKind>().unwrap(), kind);
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
        }
        assert!(matches!("course_start".parse::<NotificationKind>(), Err(NotifyError::UnknownKind(_))));
    }

    #[tokio::test]
    async fn missing_recipient_sends_nothing() {
        let push = Arc::new(RecordingPush::default());
        let err = sender(push.clone())
            .send(NotificationKind::PaymentSuccess, None, &fields())
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::RecipientNotLinked));
        assert!(push.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn pushes_composed_message() {
        let push = Arc::new(RecordingPush::default());
        let to = ExternalId::parse("Ustudent").unwrap();
        sender(push.clone())
            .send(NotificationKind::OrderConfirmation, Some(&to), &fields())
            .await
            .unwrap();

        let pushed = push.pushed.lock().unwrap();
        assert_eq!(pushed[0].0, to);
        assert!(matches!(pushed[0].1[0], OutboundMessage::Flex { .. }));
    }

    #[tokio::test]
    async fn blocked_recipient_is_push_rejected() {
        let push = Arc::new(RecordingPush {
            blocked: vec!["Ublocked".into()],
            ..Default::default()
        });
        let to = ExternalId::parse("Ublocked").unwrap();
        let err = sender(push)
            .send(NotificationKind::PaymentReminder, Some(&to), &fields())
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::PushRejected(_)));
    }
}
