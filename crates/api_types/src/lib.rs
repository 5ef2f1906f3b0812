//! JSON bodies exchanged with the booking server.
//!
//! Money travels as signed integer cents in `*_minor` fields; timestamps are
//! RFC 3339 strings.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable kind, e.g. `slot_conflict`.
    pub error: String,
    pub message: String,
}

pub mod profile {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        #[default]
        User,
        Admin,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CapabilitiesView {
        pub can_book_for_others: bool,
        pub can_bypass_quota: bool,
        pub can_manage_ledger_for_any_user: bool,
        pub can_manage_announcements: bool,
        pub can_manage_profiles: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileView {
        pub id: String,
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
        pub role: Role,
        pub active_until: Option<DateTime<Utc>>,
        pub is_member: bool,
        pub profile_picture_url: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    /// `GET /me`: the caller's profile and what they may do.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MeResponse {
        pub profile: ProfileView,
        pub capabilities: CapabilitiesView,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub name: Option<String>,
        pub phone: Option<String>,
        pub profile_picture_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileNew {
        /// Identity-provider id; generated when missing.
        pub id: Option<String>,
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
        #[serde(default)]
        pub role: Role,
        pub active_until: Option<DateTime<FixedOffset>>,
    }

    /// Response of `POST /profiles`. `access_token` is shown only once.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileCreated {
        pub profile: ProfileView,
        pub access_token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileList {
        pub profiles: Vec<ProfileView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleUpdate {
        pub role: Role,
    }

    /// `null` clears the membership.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembershipUpdate {
        pub active_until: Option<DateTime<FixedOffset>>,
    }
}

pub mod booking {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Simulator {
        East,
        West,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingNew {
        pub simulator: Simulator,
        /// Must fall on a whole hour.
        pub start_time: DateTime<FixedOffset>,
        /// Book on behalf of another member (admins only).
        pub user_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingView {
        pub id: i64,
        pub user_id: String,
        pub simulator: Simulator,
        pub start_time: DateTime<Utc>,
        pub end_time: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }

    /// Query string of `GET /bookings`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BookingQuery {
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
        pub simulator: Option<Simulator>,
        pub user_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingList {
        pub bookings: Vec<BookingView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingCancelled {
        pub booking_id: i64,
        pub deleted_guest_fees: u64,
    }
}

pub mod ledger {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EntryKind {
        GuestFee,
        Payment,
        Adjustment,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryView {
        pub id: i64,
        pub user_id: String,
        pub booking_id: Option<i64>,
        pub kind: EntryKind,
        pub amount_minor: i64,
        pub description: String,
        pub created_at: DateTime<Utc>,
        pub created_by: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerList {
        pub entries: Vec<LedgerEntryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub user_id: String,
        /// Plain ledger sum; negative means credit.
        pub raw_minor: i64,
        /// Amount owed, never below zero.
        pub balance_minor: i64,
        /// Human readable, e.g. `$20.00`.
        pub formatted: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceList {
        pub balances: Vec<BalanceView>,
    }

    /// Body of `POST /bookings/{id}/guest-fees`. Both fields are optional.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GuestFeeNew {
        pub user_id: Option<String>,
        pub amount_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceAdjust {
        pub target_minor: i64,
        pub reason: String,
    }
}

pub mod announcement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnnouncementView {
        pub id: i64,
        /// Raw HTML.
        pub message: String,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnnouncementList {
        pub announcements: Vec<AnnouncementView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnnouncementNew {
        pub message: String,
        #[serde(default)]
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnnouncementUpdate {
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnnouncementActive {
        pub is_active: bool,
    }
}

pub mod inquiry {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InquiryNew {
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InquiryView {
        pub id: i64,
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
        pub message: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InquiryList {
        pub inquiries: Vec<InquiryView>,
    }
}

pub mod contact {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContactNew {
        pub subject: String,
        pub message: String,
        /// Public URL of an already uploaded image.
        pub attachment_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContactView {
        pub id: i64,
        pub user_id: String,
        pub subject: String,
        pub message: String,
        pub attachment_url: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContactList {
        pub messages: Vec<ContactView>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_new_accepts_offsets() {
        let body: booking::BookingNew = serde_json::from_str(
            r#"{"simulator":"east","start_time":"2026-05-01T12:00:00+02:00"}"#,
        )
        .unwrap();
        assert_eq!(body.simulator, booking::Simulator::East);
        assert_eq!(
            body.start_time.with_timezone(&Utc).to_rfc3339(),
            "2026-05-01T10:00:00+00:00"
        );
        assert!(body.user_id.is_none());
    }

    #[test]
    fn profile_new_defaults_to_user_role() {
        let body: profile::ProfileNew =
            serde_json::from_str(r#"{"name":"Pat","email":"pat@example.com"}"#).unwrap();
        assert_eq!(body.role, profile::Role::User);
    }

    #[test]
    fn entry_kind_is_snake_case() {
        let json = serde_json::to_string(&ledger::EntryKind::GuestFee).unwrap();
        assert_eq!(json, "\"guest_fee\"");
    }
}
