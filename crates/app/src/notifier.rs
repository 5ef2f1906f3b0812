//! Webhook delivery of engine notifications.

use async_trait::async_trait;
use engine::{BookingConfirmation, MembershipInquiryNotice, Notifier, NotifyError};
use reqwest::Client;
use serde::Serialize;

#[derive(Serialize)]
struct Event<'a, T: Serialize> {
    event: &'a str,
    data: &'a T,
}

/// Posts every notification as JSON to one URL; the mail service behind it
/// renders and sends the message.
pub struct WebhookNotifier {
    http_client: Client,
    url: String,
    api_key: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            url: url.into(),
            api_key,
        }
    }

    async fn post<T: Serialize + Sync>(&self, event: &str, data: &T) -> Result<(), NotifyError> {
        let mut request = self.http_client.post(&self.url).json(&Event { event, data });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifyError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError(format!("webhook answered {status}: {body}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn booking_confirmed(
        &self,
        confirmation: &BookingConfirmation,
    ) -> Result<(), NotifyError> {
        self.post("booking_confirmed", confirmation).await
    }

    async fn membership_inquiry(
        &self,
        inquiry: &MembershipInquiryNotice,
    ) -> Result<(), NotifyError> {
        self.post("membership_inquiry", inquiry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_envelope_shape() {
        let notice = MembershipInquiryNotice {
            inquiry_id: 7,
            name: "Jordan".to_string(),
            email: "jordan@example.com".to_string(),
            phone: None,
            message: "hello".to_string(),
        };
        let value = serde_json::to_value(Event {
            event: "membership_inquiry",
            data: &notice,
        })
        .unwrap();
        assert_eq!(value["event"], "membership_inquiry");
        assert_eq!(value["data"]["inquiry_id"], 7);
    }
}
