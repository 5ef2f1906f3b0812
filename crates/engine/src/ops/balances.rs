use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    Balance, EngineError, EntryKind, LedgerEntry, MoneyCents, Principal, ResultEngine,
    ledger::{self, NewEntry},
};

use super::{Engine, with_tx};

fn sum_out_of_range() -> EngineError {
    EngineError::Validation("ledger sum out of range".to_string())
}

impl Engine {
    /// Sums every ledger entry of `user_id`.
    ///
    /// Balances are never stored: each read replays the ledger so concurrent
    /// appends can never be lost.
    async fn ledger_sum<C: ConnectionTrait>(&self, db: &C, user_id: &str) -> ResultEngine<MoneyCents> {
        let amounts: Vec<i64> = ledger::Entity::find()
            .select_only()
            .column(ledger::Column::AmountMinor)
            .filter(ledger::Column::UserId.eq(user_id))
            .into_tuple()
            .all(db)
            .await?;
        MoneyCents::checked_sum(amounts.into_iter().map(MoneyCents::new))
            .ok_or_else(sum_out_of_range)
    }

    /// Inserts `entry` unless it would push the owner's running sum out of
    /// range.
    async fn append_entry<C: ConnectionTrait>(
        &self,
        db: &C,
        entry: NewEntry,
    ) -> ResultEngine<LedgerEntry> {
        self.ledger_sum(db, &entry.user_id)
            .await?
            .checked_add(entry.amount)
            .ok_or_else(sum_out_of_range)?;
        let model = entry.into_active_model(Utc::now()).insert(db).await?;
        LedgerEntry::try_from(model)
    }

    /// Current balance of `user_id`, readable by the member and by admins.
    pub async fn balance(&self, principal: &Principal, user_id: &str) -> ResultEngine<Balance> {
        principal.require_ledger_access(user_id)?;
        let raw = self.ledger_sum(&self.database, user_id).await?;
        Ok(Balance::from_raw(user_id, raw))
    }

    /// Balances of every member who owes something, ordered by user id.
    pub async fn all_balances(&self, principal: &Principal) -> ResultEngine<Vec<Balance>> {
        principal.require_ledger_admin()?;
        let rows: Vec<(String, i64)> = ledger::Entity::find()
            .select_only()
            .column(ledger::Column::UserId)
            .column(ledger::Column::AmountMinor)
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut sums: BTreeMap<String, MoneyCents> = BTreeMap::new();
        for (user_id, amount_minor) in rows {
            let sum = sums.entry(user_id).or_default();
            *sum = sum
                .checked_add(MoneyCents::new(amount_minor))
                .ok_or_else(sum_out_of_range)?;
        }

        Ok(sums
            .into_iter()
            .filter(|(_, raw)| raw.is_positive())
            .map(|(user_id, raw)| Balance::from_raw(user_id, raw))
            .collect())
    }

    /// Appends the one adjustment that brings `user_id`'s balance to `target`.
    ///
    /// The adjustment is computed against the raw ledger sum, not the clamped
    /// display balance, so after it the ledger adds up to exactly `target`.
    /// A member in credit (raw sum below zero) loses that credit: adjusting
    /// a raw sum of -$5.00 to $0.00 appends +$5.00, not a zero entry.
    pub async fn adjust_balance_to(
        &self,
        principal: &Principal,
        user_id: &str,
        target: MoneyCents,
        reason: &str,
    ) -> ResultEngine<LedgerEntry> {
        principal.require_ledger_admin()?;
        if target.is_negative() {
            return Err(EngineError::Validation(
                "target balance must be >= 0".to_string(),
            ));
        }

        let entry = with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, user_id).await?;
            let before = self.ledger_sum(&db_tx, user_id).await?;
            let entry = NewEntry::adjustment(user_id, before, target, reason, &principal.user_id)?;
            self.append_entry(&db_tx, entry).await
        })?;

        tracing::info!(
            user_id,
            amount = %entry.amount,
            adjusted_by = %principal.user_id,
            "balance adjusted"
        );
        Ok(entry)
    }

    /// Records a payment of `amount` (> 0), stored as a negative entry.
    pub async fn record_payment(
        &self,
        principal: &Principal,
        user_id: &str,
        amount: MoneyCents,
    ) -> ResultEngine<LedgerEntry> {
        principal.require_ledger_admin()?;
        let entry = NewEntry::payment(user_id, amount, &principal.user_id)?;

        let entry = with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, user_id).await?;
            self.append_entry(&db_tx, entry).await
        })?;

        tracing::info!(user_id, amount = %amount, "payment recorded");
        Ok(entry)
    }

    /// Charges a guest fee on a booking.
    ///
    /// The fee is always charged to the booking owner; `user_id`, when given,
    /// must name that owner. `amount` defaults to the configured guest fee.
    pub async fn assess_guest_fee(
        &self,
        principal: &Principal,
        booking_id: i64,
        user_id: Option<&str>,
        amount: Option<MoneyCents>,
    ) -> ResultEngine<LedgerEntry> {
        let amount = amount.unwrap_or(self.guest_fee);

        let entry = with_tx!(self, |db_tx| {
            let booking = self.require_booking(&db_tx, booking_id).await?;
            if !principal.is(&booking.user_id) {
                principal.require_ledger_admin()?;
            }
            if let Some(user_id) = user_id
                && user_id != booking.user_id
            {
                return Err(EngineError::Validation(
                    "guest fee must be charged to the booking owner".to_string(),
                ));
            }
            let entry = NewEntry::guest_fee(&booking.user_id, booking.id, amount, &principal.user_id)?;
            self.append_entry(&db_tx, entry).await
        })?;

        tracing::info!(
            booking_id,
            user_id = %entry.user_id,
            amount = %entry.amount,
            "guest fee assessed"
        );
        Ok(entry)
    }

    /// Deletes a ledger entry.
    ///
    /// Admins may delete any entry; members only their own guest fees.
    pub async fn delete_ledger_entry(
        &self,
        principal: &Principal,
        entry_id: i64,
    ) -> ResultEngine<LedgerEntry> {
        let entry = with_tx!(self, |db_tx| {
            let model = ledger::Entity::find_by_id(entry_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("ledger entry not exists".to_string()))?;
            let entry = LedgerEntry::try_from(model)?;

            let own_guest_fee = principal.is(&entry.user_id) && entry.kind == EntryKind::GuestFee;
            if !own_guest_fee && !principal.capabilities.can_manage_ledger_for_any_user {
                return Err(EngineError::Forbidden(
                    "members may only remove their own guest fees".to_string(),
                ));
            }

            ledger::Entity::delete_by_id(entry_id).exec(&db_tx).await?;
            Ok(entry)
        })?;

        tracing::info!(
            entry_id,
            user_id = %entry.user_id,
            kind = entry.kind.as_str(),
            deleted_by = %principal.user_id,
            "ledger entry deleted"
        );
        Ok(entry)
    }

    /// Every entry of `user_id`, newest first.
    pub async fn ledger(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        principal.require_ledger_access(user_id)?;
        self.entries(user_id, None).await
    }

    /// Guest fees charged to `user_id`, newest first.
    pub async fn guest_fees(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        principal.require_ledger_access(user_id)?;
        self.entries(user_id, Some(EntryKind::GuestFee)).await
    }

    async fn entries(
        &self,
        user_id: &str,
        kind: Option<EntryKind>,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        let mut query = ledger::Entity::find().filter(ledger::Column::UserId.eq(user_id));
        if let Some(kind) = kind {
            query = query.filter(ledger::Column::Kind.eq(kind.as_str()));
        }
        query
            .order_by_desc(ledger::Column::CreatedAt)
            .order_by_desc(ledger::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect()
    }
}
