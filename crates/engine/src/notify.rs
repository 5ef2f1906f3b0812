//! Outgoing notifications (booking confirmations, membership inquiries).
//!
//! Delivery is best effort: the engine hands payloads to a [`Notifier`] on a
//! detached task and only logs failures, so a booking never fails because an
//! email could not be sent.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Simulator;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: i64,
    pub recipient_email: String,
    pub recipient_name: String,
    pub simulator: Simulator,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipInquiryNotice {
    pub inquiry_id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

#[derive(Error, Debug)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_confirmed(&self, confirmation: &BookingConfirmation)
    -> Result<(), NotifyError>;

    async fn membership_inquiry(&self, inquiry: &MembershipInquiryNotice)
    -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of sending them.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_confirmed(
        &self,
        confirmation: &BookingConfirmation,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            booking_id = confirmation.booking_id,
            recipient = %confirmation.recipient_email,
            simulator = confirmation.simulator.as_str(),
            start_time = %confirmation.start_time,
            "booking confirmation"
        );
        Ok(())
    }

    async fn membership_inquiry(
        &self,
        inquiry: &MembershipInquiryNotice,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            inquiry_id = inquiry.inquiry_id,
            from = %inquiry.email,
            "membership inquiry"
        );
        Ok(())
    }
}

pub(crate) fn dispatch_booking_confirmation(
    notifier: &Arc<dyn Notifier>,
    confirmation: BookingConfirmation,
) {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        if let Err(err) = notifier.booking_confirmed(&confirmation).await {
            tracing::warn!(
                booking_id = confirmation.booking_id,
                "booking confirmation not delivered: {err}"
            );
        }
    });
}

pub(crate) fn dispatch_membership_inquiry(
    notifier: &Arc<dyn Notifier>,
    notice: MembershipInquiryNotice,
) {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        if let Err(err) = notifier.membership_inquiry(&notice).await {
            tracing::warn!(
                inquiry_id = notice.inquiry_id,
                "membership inquiry notice not delivered: {err}"
            );
        }
    });
}
