//! Simulator bookings.
//!
//! A booking always covers a fixed [`BOOKING_LENGTH`] window starting on a
//! whole hour. The window arithmetic lives in [`Slot`] so the allocator and
//! its tests share one definition of "overlap".

use chrono::{DateTime, Duration, Timelike, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Length of every booking.
pub const BOOKING_LENGTH: Duration = Duration::hours(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Simulator {
    East,
    West,
}

impl Simulator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::East => "east",
            Self::West => "west",
        }
    }
}

impl TryFrom<&str> for Simulator {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "east" => Ok(Self::East),
            "west" => Ok(Self::West),
            other => Err(EngineError::Validation(format!(
                "invalid simulator: {other}"
            ))),
        }
    }
}

/// A simulator plus a half-open `[start, end)` window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub simulator: Simulator,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Slot {
    /// Builds the slot starting at `start_time`.
    ///
    /// `start_time` must sit exactly on an hour.
    pub fn new(simulator: Simulator, start_time: DateTime<Utc>) -> ResultEngine<Self> {
        if start_time.minute() != 0 || start_time.second() != 0 || start_time.nanosecond() != 0 {
            return Err(EngineError::Validation(
                "start_time must be aligned to the hour".to_string(),
            ));
        }
        let end_time = start_time
            .checked_add_signed(BOOKING_LENGTH)
            .ok_or_else(|| EngineError::Validation("start_time out of range".to_string()))?;
        Ok(Self {
            simulator,
            start_time,
            end_time,
        })
    }

    /// Two slots overlap when they share a simulator and their half-open
    /// windows intersect.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.simulator == other.simulator
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: String,
    pub simulator: Simulator,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn slot(&self) -> Slot {
        Slot {
            simulator: self.simulator,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Result of a cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelledBooking {
    pub booking_id: i64,
    pub deleted_guest_fees: u64,
}

/// Calendar filter. Every field narrows the listing.
#[derive(Clone, Debug, Default)]
pub struct BookingFilter {
    /// Only bookings ending after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only bookings starting before this instant.
    pub to: Option<DateTime<Utc>>,
    pub simulator: Option<Simulator>,
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub simulator: String,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    pub created_at: DateTimeUtc,
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
    #[sea_orm(has_many = "super::ledger::Entity")]
    GuestFees,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profiles.def()
    }
}

impl Related<super::ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GuestFees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn for_slot(user_id: &str, slot: &Slot, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id.to_string()),
            simulator: ActiveValue::Set(slot.simulator.as_str().to_string()),
            start_time: ActiveValue::Set(slot.start_time),
            end_time: ActiveValue::Set(slot.end_time),
            created_at: ActiveValue::Set(created_at),
        }
    }
}

impl TryFrom<Model> for Booking {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            simulator: Simulator::try_from(model.simulator.as_str())?,
            start_time: model.start_time,
            end_time: model.end_time,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 5, 4, hour, minute, 0).unwrap()
    }

    #[test]
    fn slot_is_two_hours_long() {
        let slot = Slot::new(Simulator::East, at(10, 0)).unwrap();
        assert_eq!(slot.end_time - slot.start_time, Duration::hours(2));
        assert_eq!(slot.end_time, at(12, 0));
    }

    #[test]
    fn slot_rejects_unaligned_start() {
        assert!(matches!(
            Slot::new(Simulator::West, at(10, 30)),
            Err(EngineError::Validation(_))
        ));
        let with_seconds = at(10, 0) + Duration::seconds(5);
        assert!(Slot::new(Simulator::West, with_seconds).is_err());
    }

    #[test]
    fn staggered_start_overlaps() {
        let existing = Slot::new(Simulator::East, at(10, 0)).unwrap();
        let later = Slot::new(Simulator::East, at(11, 0)).unwrap();
        let earlier = Slot::new(Simulator::East, at(9, 0)).unwrap();
        assert!(existing.overlaps(&later));
        assert!(later.overlaps(&existing));
        assert!(existing.overlaps(&earlier));
        assert!(existing.overlaps(&existing));
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let existing = Slot::new(Simulator::East, at(10, 0)).unwrap();
        let next = Slot::new(Simulator::East, at(12, 0)).unwrap();
        let previous = Slot::new(Simulator::East, at(8, 0)).unwrap();
        assert!(!existing.overlaps(&next));
        assert!(!existing.overlaps(&previous));
    }

    #[test]
    fn other_simulator_never_overlaps() {
        let east = Slot::new(Simulator::East, at(10, 0)).unwrap();
        let west = Slot::new(Simulator::West, at(10, 0)).unwrap();
        assert!(!east.overlaps(&west));
    }

    #[test]
    fn simulator_parses_storage_names() {
        assert_eq!(Simulator::try_from("east").unwrap(), Simulator::East);
        assert_eq!(Simulator::try_from("west").unwrap(), Simulator::West);
        assert!(Simulator::try_from("north").is_err());
    }
}
