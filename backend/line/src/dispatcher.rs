//! Fan webhook events out to an [`EventHandler`] without blocking the
//! acknowledgement.

use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use thinker_core::{WebhookEnvelope, WebhookEvent};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::handlers::EventHandler;

#[derive(Clone)]
pub struct Dispatcher {
    handler: Arc<dyn EventHandler>,
}

impl Dispatcher {
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self { handler }
    }

    /// Parse every raw event in the envelope and dispatch the valid ones.
    /// Returns the number of events handed to the handler.
    pub fn dispatch_envelope(&self, envelope: WebhookEnvelope) -> usize {
        let mut dispatched = 0;
        for raw in envelope.events {
            if self.dispatch_raw(raw).is_some() {
                dispatched += 1;
            }
        }
        dispatched
    }

    /// Parse and dispatch one raw event; malformed events are logged and dropped.
    pub fn dispatch_raw(&self, raw: Value) -> Option<JoinHandle<()>> {
        match WebhookEvent::parse(raw) {
            Ok(event) => Some(self.dispatch(event)),
            Err(e) => {
                warn!(event_type = %e.event_type, error = %e, "Skipping malformed LINE event");
                None
            }
        }
    }

    /// Handle `event` on its own task. Never fails; handler errors and
    /// panics are logged.
    pub fn dispatch(&self, event: WebhookEvent) -> JoinHandle<()> {
        let handler = self.handler.clone();
        let event_type = event.event_type().to_string();
        if let Some(meta) = event.meta() {
            if meta.delivery_context.is_redelivery {
                debug!(event_type = %event_type, id = ?meta.webhook_event_id, "Redelivered LINE event");
            }
        }

        let task = tokio::spawn(async move { handle(handler.as_ref(), event).await });
        tokio::spawn(async move {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(event_type = %event_type, error = %e, "LINE event handler failed"),
                Err(e) if e.is_panic() => error!(event_type = %event_type, "LINE event handler panicked"),
                Err(e) => warn!(event_type = %event_type, error = %e, "LINE event handler cancelled"),
            }
        })
    }
}

async fn handle(handler: &dyn EventHandler, event: WebhookEvent) -> Result<()> {
    match event {
        WebhookEvent::Message(e) => handler.on_message(e).await,
        WebhookEvent::Follow(e) => handler.on_follow(e).await,
        WebhookEvent::Unfollow(e) => handler.on_unfollow(e).await,
        WebhookEvent::Postback(e) => handler.on_postback(e).await,
        WebhookEvent::Unknown { event_type } => handler.on_unknown(&event_type).await,
    }
}
