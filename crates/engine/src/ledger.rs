//! Ledger entries.
//!
//! The ledger is append-only: entries are inserted and, in a few well defined
//! cases, deleted, but never updated. A member's balance is always the sum of
//! their entries and is never stored.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    GuestFee,
    Payment,
    Adjustment,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GuestFee => "guest_fee",
            Self::Payment => "payment",
            Self::Adjustment => "adjustment",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "guest_fee" => Ok(Self::GuestFee),
            "payment" => Ok(Self::Payment),
            "adjustment" => Ok(Self::Adjustment),
            other => Err(EngineError::Validation(format!(
                "invalid ledger entry kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub user_id: String,
    pub booking_id: Option<i64>,
    pub kind: EntryKind,
    pub amount: MoneyCents,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// A member's balance.
///
/// `raw` is the plain ledger sum and may be negative after an overpayment;
/// `display` never drops below zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: String,
    pub raw: MoneyCents,
    pub display: MoneyCents,
}

impl Balance {
    pub fn from_raw(user_id: impl Into<String>, raw: MoneyCents) -> Self {
        Self {
            user_id: user_id.into(),
            raw,
            display: raw.clamp_non_negative(),
        }
    }
}

fn check_entry_limit(amount: MoneyCents, what: &str) -> ResultEngine<()> {
    if amount > MoneyCents::MAX_ENTRY {
        return Err(EngineError::Validation(format!(
            "{what} must be <= {}",
            MoneyCents::MAX_ENTRY
        )));
    }
    Ok(())
}

/// An entry that has not been persisted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NewEntry {
    pub user_id: String,
    pub booking_id: Option<i64>,
    pub kind: EntryKind,
    pub amount: MoneyCents,
    pub description: String,
    pub created_by: String,
}

impl NewEntry {
    /// Guest fees always raise the amount owed and reference their booking.
    pub fn guest_fee(
        user_id: &str,
        booking_id: i64,
        amount: MoneyCents,
        created_by: &str,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "guest fee must be > 0".to_string(),
            ));
        }
        check_entry_limit(amount, "guest fee")?;
        Ok(Self {
            user_id: user_id.to_string(),
            booking_id: Some(booking_id),
            kind: EntryKind::GuestFee,
            amount,
            description: format!("Guest fee for booking #{booking_id}"),
            created_by: created_by.to_string(),
        })
    }

    /// Payments are recorded as positive input and stored negated.
    pub fn payment(user_id: &str, amount: MoneyCents, created_by: &str) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "payment amount must be > 0".to_string(),
            ));
        }
        check_entry_limit(amount, "payment amount")?;
        Ok(Self {
            user_id: user_id.to_string(),
            booking_id: None,
            kind: EntryKind::Payment,
            amount: -amount,
            description: format!("Payment of {amount}"),
            created_by: created_by.to_string(),
        })
    }

    /// The signed difference that moves `before` to `target`.
    pub fn adjustment(
        user_id: &str,
        before: MoneyCents,
        target: MoneyCents,
        reason: &str,
        created_by: &str,
    ) -> ResultEngine<Self> {
        if target.is_negative() {
            return Err(EngineError::Validation(
                "target balance must be >= 0".to_string(),
            ));
        }
        check_entry_limit(target, "target balance")?;
        let amount = target
            .checked_sub(before)
            .ok_or_else(|| EngineError::Validation("adjustment too large".to_string()))?;
        let reason = reason.trim();
        let description = if reason.is_empty() {
            format!("Balance adjusted from {before} to {target}")
        } else {
            format!("Balance adjusted from {before} to {target}: {reason}")
        };
        Ok(Self {
            user_id: user_id.to_string(),
            booking_id: None,
            kind: EntryKind::Adjustment,
            amount,
            description,
            created_by: created_by.to_string(),
        })
    }

    pub fn into_active_model(self, created_at: DateTime<Utc>) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(self.user_id),
            booking_id: ActiveValue::Set(self.booking_id),
            kind: ActiveValue::Set(self.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(self.amount.cents()),
            description: ActiveValue::Set(self.description),
            created_at: ActiveValue::Set(created_at),
            created_by: ActiveValue::Set(self.created_by),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub booking_id: Option<i64>,
    pub kind: String,
    pub amount_minor: i64,
    pub description: String,
    pub created_at: DateTimeUtc,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profiles::Entity",
        from = "Column::UserId",
        to = "super::profiles::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Profiles,
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Bookings,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profiles.def()
    }
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            booking_id: model.booking_id,
            kind: EntryKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            description: model.description,
            created_at: model.created_at,
            created_by: model.created_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_is_stored_negative() {
        let entry = NewEntry::payment("u1", MoneyCents::new(1500), "admin").unwrap();
        assert_eq!(entry.kind, EntryKind::Payment);
        assert_eq!(entry.amount.cents(), -1500);
        assert!(entry.booking_id.is_none());
    }

    #[test]
    fn payment_rejects_non_positive_input() {
        assert!(NewEntry::payment("u1", MoneyCents::ZERO, "admin").is_err());
        assert!(NewEntry::payment("u1", MoneyCents::new(-10), "admin").is_err());
    }

    #[test]
    fn guest_fee_references_booking() {
        let entry = NewEntry::guest_fee("u1", 42, MoneyCents::new(2000), "u1").unwrap();
        assert_eq!(entry.booking_id, Some(42));
        assert_eq!(entry.amount.cents(), 2000);
        assert_eq!(entry.description, "Guest fee for booking #42");
    }

    #[test]
    fn adjustment_moves_balance_to_target() {
        let entry = NewEntry::adjustment(
            "u1",
            MoneyCents::new(2000),
            MoneyCents::ZERO,
            "waived",
            "admin",
        )
        .unwrap();
        assert_eq!(entry.amount.cents(), -2000);
        assert_eq!(
            entry.description,
            "Balance adjusted from $20.00 to $0.00: waived"
        );
    }

    #[test]
    fn adjustment_rejects_negative_target() {
        assert!(matches!(
            NewEntry::adjustment("u1", MoneyCents::ZERO, MoneyCents::new(-1), "x", "admin"),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn amounts_above_the_entry_limit_are_rejected() {
        let too_much = MoneyCents::new(MoneyCents::MAX_ENTRY.cents() + 1);
        assert!(matches!(
            NewEntry::guest_fee("u1", 1, too_much, "u1"),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            NewEntry::payment("u1", too_much, "admin"),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            NewEntry::adjustment("u1", MoneyCents::ZERO, too_much, "x", "admin"),
            Err(EngineError::Validation(_))
        ));
        assert!(NewEntry::guest_fee("u1", 1, MoneyCents::MAX_ENTRY, "u1").is_ok());
    }
}
