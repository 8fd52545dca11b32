use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};

use crate::domain::SessionKey;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IdleAlert {
    pub key: SessionKey,
    pub idle_minutes: i64,
}

impl IdleAlert {
    pub fn from_idle_secs(key: SessionKey, idle_secs: i64) -> Self {
        Self {
            key,
            idle_minutes: idle_secs.max(0) / 60,
        }
    }

    pub fn message(&self) -> String {
        format!(
            "slurmux: session '{}' on {} has been idle for {} minute{}",
            self.key.session,
            self.key.node,
            self.idle_minutes,
            if self.idle_minutes == 1 { "" } else { "s" }
        )
    }
}

pub trait AlertSink: Send + Sync {
    fn notify(&self, alert: &IdleAlert) -> Result<(), String>;
}

/// Posts alerts as `{"text": ...}` to a chat-style incoming webhook.
#[derive(Clone, Debug)]
pub struct WebhookNotifier {
    url: Option<String>,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(url: Option<&str>, timeout: Duration) -> Self {
        Self {
            url: url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(ToString::to_string),
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    pub fn send_text(&self, text: &str) -> Result<(), String> {
        let Some(url) = self.url.as_deref() else {
            return Ok(());
        };
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_json(json!({ "text": text }))
            .map_err(|err| format!("webhook delivery failed: {err}"))?;
        Ok(())
    }
}

impl AlertSink for WebhookNotifier {
    fn notify(&self, alert: &IdleAlert) -> Result<(), String> {
        if !self.is_configured() {
            return Ok(());
        }
        match self.send_text(&alert.message()) {
            Ok(()) => {
                info!(key = %alert.key, idle_minutes = alert.idle_minutes, "idle alert sent");
                Ok(())
            }
            Err(err) => {
                warn!(key = %alert.key, error = %err, "idle alert failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_message_names_session_node_and_minutes() {
        let alert = IdleAlert::from_idle_secs(SessionKey::new("gpu03", "train"), 7 * 60 + 20);
        assert_eq!(alert.idle_minutes, 7);
        assert_eq!(
            alert.message(),
            "slurmux: session 'train' on gpu03 has been idle for 7 minutes"
        );
    }

    #[test]
    fn unconfigured_webhook_is_a_noop() {
        let notifier = WebhookNotifier::new(Some("   "), Duration::from_secs(1));
        assert!(!notifier.is_configured());
        let alert = IdleAlert::from_idle_secs(SessionKey::new("gpu03", "train"), 600);
        assert_eq!(notifier.notify(&alert), Ok(()));
    }
}
