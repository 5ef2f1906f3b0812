use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, Condition, DbErr, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
    TransactionTrait, prelude::*,
};

use crate::{
    Booking, BookingConfirmation, BookingFilter, CancelledBooking, EngineError, EntryKind,
    Principal, ResultEngine, Simulator, Slot, bookings, ledger, notify,
};

use super::{Engine, with_tx};

/// The unique `(simulator, start_time)` index is the last word on double
/// bookings; its violation is a slot conflict, not a storage failure.
fn map_insert_error(err: DbErr) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            EngineError::SlotConflict("slot already booked".to_string())
        }
        _ => EngineError::Database(err),
    }
}

impl Engine {
    /// Books `simulator` for the two hours starting at `start_time`.
    ///
    /// - `target_user_id` books on behalf of another member and requires
    ///   `can_book_for_others`.
    /// - Unless the requester can bypass the quota or the beneficiary is an
    ///   admin, the beneficiary may not already hold a booking that has not
    ///   ended.
    /// - Any booking on the same simulator whose window intersects the new
    ///   one is a [`EngineError::SlotConflict`].
    ///
    /// A confirmation is sent to the beneficiary after commit; its failure
    /// is logged and does not affect the result.
    pub async fn create_booking(
        &self,
        principal: &Principal,
        simulator: Simulator,
        start_time: DateTime<Utc>,
        target_user_id: Option<&str>,
    ) -> ResultEngine<Booking> {
        let slot = Slot::new(simulator, start_time)?;

        let beneficiary_id = match target_user_id {
            Some(target) if !principal.is(target) => {
                if !principal.capabilities.can_book_for_others {
                    return Err(EngineError::Forbidden(
                        "cannot book for another member".to_string(),
                    ));
                }
                target
            }
            _ => principal.user_id.as_str(),
        };

        let now = Utc::now();
        let (booking, beneficiary) = with_tx!(self, |db_tx| {
            let beneficiary = self.require_profile(&db_tx, beneficiary_id).await?;

            if !principal.capabilities.can_bypass_quota && !beneficiary.role.is_admin() {
                let active = bookings::Entity::find()
                    .filter(bookings::Column::UserId.eq(beneficiary_id))
                    .filter(bookings::Column::EndTime.gte(now))
                    .count(&db_tx)
                    .await?;
                if active > 0 {
                    return Err(EngineError::QuotaExceeded(
                        "member already holds an upcoming booking".to_string(),
                    ));
                }
            }

            let conflicting = bookings::Entity::find()
                .filter(bookings::Column::Simulator.eq(slot.simulator.as_str()))
                .filter(bookings::Column::StartTime.lt(slot.end_time))
                .filter(bookings::Column::EndTime.gt(slot.start_time))
                .one(&db_tx)
                .await?;
            if let Some(existing) = conflicting {
                return Err(EngineError::SlotConflict(format!(
                    "{} is booked from {} to {}",
                    slot.simulator.as_str(),
                    existing.start_time,
                    existing.end_time
                )));
            }

            let model = bookings::ActiveModel::for_slot(beneficiary_id, &slot, now)
                .insert(&db_tx)
                .await
                .map_err(map_insert_error)?;
            Ok((Booking::try_from(model)?, beneficiary))
        })?;

        tracing::info!(
            booking_id = booking.id,
            user_id = %booking.user_id,
            simulator = booking.simulator.as_str(),
            start_time = %booking.start_time,
            "booking created"
        );

        notify::dispatch_booking_confirmation(
            &self.notifier,
            BookingConfirmation {
                booking_id: booking.id,
                recipient_email: beneficiary.email,
                recipient_name: beneficiary.name,
                simulator: booking.simulator,
                start_time: booking.start_time,
                end_time: booking.end_time,
            },
        );

        Ok(booking)
    }

    /// Cancels a booking together with the guest fees charged on it.
    ///
    /// Both deletes share one database transaction: if removing the fees
    /// fails, the booking is left untouched.
    pub async fn cancel_booking(
        &self,
        principal: &Principal,
        booking_id: i64,
    ) -> ResultEngine<CancelledBooking> {
        let cancelled = with_tx!(self, |db_tx| {
            let booking = self.require_booking(&db_tx, booking_id).await?;
            self.require_booking_access(principal, &booking)?;

            let fees = ledger::Entity::delete_many()
                .filter(ledger::Column::BookingId.eq(booking_id))
                .filter(ledger::Column::Kind.eq(EntryKind::GuestFee.as_str()))
                .exec(&db_tx)
                .await?;

            bookings::Entity::delete_by_id(booking_id)
                .exec(&db_tx)
                .await?;

            Ok(CancelledBooking {
                booking_id,
                deleted_guest_fees: fees.rows_affected,
            })
        })?;

        tracing::info!(
            booking_id,
            deleted_guest_fees = cancelled.deleted_guest_fees,
            cancelled_by = %principal.user_id,
            "booking cancelled"
        );
        Ok(cancelled)
    }

    pub async fn booking(&self, principal: &Principal, booking_id: i64) -> ResultEngine<Booking> {
        let booking = self.require_booking(&self.database, booking_id).await?;
        self.require_booking_access(principal, &booking)?;
        Ok(booking)
    }

    /// Calendar listing, ordered by start time.
    ///
    /// Everyone sees which slots are taken; filtering by another member's id
    /// requires `can_manage_profiles`.
    pub async fn list_bookings(
        &self,
        principal: &Principal,
        filter: &BookingFilter,
    ) -> ResultEngine<Vec<Booking>> {
        if let Some(user_id) = filter.user_id.as_deref()
            && !principal.is(user_id)
            && !principal.capabilities.can_manage_profiles
        {
            return Err(EngineError::Forbidden(
                "cannot list another member's bookings".to_string(),
            ));
        }
        if let (Some(from), Some(to)) = (filter.from, filter.to)
            && from >= to
        {
            return Err(EngineError::Validation(
                "from must be before to".to_string(),
            ));
        }

        let mut condition = Condition::all();
        if let Some(from) = filter.from {
            condition = condition.add(bookings::Column::EndTime.gt(from));
        }
        if let Some(to) = filter.to {
            condition = condition.add(bookings::Column::StartTime.lt(to));
        }
        if let Some(simulator) = filter.simulator {
            condition = condition.add(bookings::Column::Simulator.eq(simulator.as_str()));
        }
        if let Some(user_id) = filter.user_id.as_deref() {
            condition = condition.add(bookings::Column::UserId.eq(user_id));
        }

        bookings::Entity::find()
            .filter(condition)
            .order_by_asc(bookings::Column::StartTime)
            .order_by_asc(bookings::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Booking::try_from)
            .collect()
    }

    /// The requester's booking that has not ended yet, if any.
    pub async fn upcoming_booking(&self, principal: &Principal) -> ResultEngine<Option<Booking>> {
        bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(principal.user_id.as_str()))
            .filter(bookings::Column::EndTime.gte(Utc::now()))
            .order_by_asc(bookings::Column::StartTime)
            .one(&self.database)
            .await?
            .map(Booking::try_from)
            .transpose()
    }
}
