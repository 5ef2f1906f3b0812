use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, NewProfile, Principal, Profile, ProfileUpdate, ResultEngine, Role, access_tokens,
    bookings, contact_messages, ledger, profiles,
};

use super::{Engine, normalize_email, normalize_optional_text, normalize_required_text, with_tx};

impl Engine {
    /// Creates a profile without an acting principal.
    ///
    /// This is the bootstrap path used when the identity record is created
    /// outside of a request (admin tooling, first admin).
    pub async fn create_profile(&self, new: NewProfile) -> ResultEngine<Profile> {
        let profile = Profile {
            id: normalize_optional_text(new.id.as_deref())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: normalize_required_text(&new.name, "name")?,
            email: normalize_email(&new.email)?,
            phone: normalize_optional_text(new.phone.as_deref()),
            role: new.role,
            active_until: new.active_until,
            profile_picture_url: None,
            created_at: Utc::now(),
        };

        with_tx!(self, |db_tx| {
            if self.find_profile(&db_tx, &profile.id).await?.is_some() {
                return Err(EngineError::ExistingKey(profile.id.clone()));
            }
            let email_taken = profiles::Entity::find()
                .filter(profiles::Column::Email.eq(profile.email.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if email_taken {
                return Err(EngineError::ExistingKey(profile.email.clone()));
            }
            profiles::ActiveModel::from(&profile).insert(&db_tx).await?;
            Ok(())
        })?;

        tracing::info!(user_id = %profile.id, role = profile.role.as_str(), "profile created");
        Ok(profile)
    }

    /// Admin-driven profile creation.
    pub async fn register_profile(
        &self,
        principal: &Principal,
        new: NewProfile,
    ) -> ResultEngine<Profile> {
        principal.require_profiles()?;
        self.create_profile(new).await
    }

    pub async fn profile(&self, principal: &Principal, user_id: &str) -> ResultEngine<Profile> {
        if !principal.is(user_id) {
            principal.require_profiles()?;
        }
        self.require_profile(&self.database, user_id).await
    }

    pub async fn list_profiles(&self, principal: &Principal) -> ResultEngine<Vec<Profile>> {
        principal.require_profiles()?;
        profiles::Entity::find()
            .order_by_asc(profiles::Column::Name)
            .order_by_asc(profiles::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Profile::try_from)
            .collect()
    }

    /// Updates the fields a member owns. Role and membership expiry are not
    /// among them.
    pub async fn update_own_profile(
        &self,
        principal: &Principal,
        update: ProfileUpdate,
    ) -> ResultEngine<Profile> {
        let name = update
            .name
            .as_deref()
            .map(|name| normalize_required_text(name, "name"))
            .transpose()?;
        self.modify_profile(&principal.user_id, |active| {
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(phone) = update.phone.as_deref() {
                active.phone = ActiveValue::Set(normalize_optional_text(Some(phone)));
            }
            if let Some(url) = update.profile_picture_url.as_deref() {
                active.profile_picture_url = ActiveValue::Set(normalize_optional_text(Some(url)));
            }
        })
        .await
    }

    pub async fn set_role(
        &self,
        principal: &Principal,
        user_id: &str,
        role: Role,
    ) -> ResultEngine<Profile> {
        principal.require_profiles()?;
        let profile = self
            .modify_profile(user_id, |active| {
                active.role = ActiveValue::Set(role.as_str().to_string());
            })
            .await?;
        tracing::info!(user_id, role = role.as_str(), changed_by = %principal.user_id, "role changed");
        Ok(profile)
    }

    /// Sets or clears the membership expiry of `user_id`.
    pub async fn set_active_until(
        &self,
        principal: &Principal,
        user_id: &str,
        active_until: Option<DateTime<Utc>>,
    ) -> ResultEngine<Profile> {
        principal.require_profiles()?;
        self.modify_profile(user_id, |active| {
            active.active_until = ActiveValue::Set(active_until);
        })
        .await
    }

    /// Deletes a profile with everything it owns: access tokens, contact
    /// messages, bookings, the guest fees on those bookings and every ledger
    /// entry charged to the member.
    pub async fn delete_profile(&self, principal: &Principal, user_id: &str) -> ResultEngine<()> {
        principal.require_profiles()?;
        if principal.is(user_id) {
            return Err(EngineError::Validation(
                "admins cannot delete their own profile".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, user_id).await?;
            self.delete_profile_rows(&db_tx, user_id).await
        })?;

        tracing::info!(user_id, deleted_by = %principal.user_id, "profile deleted");
        Ok(())
    }

    async fn delete_profile_rows<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<()> {
        let booking_ids: Vec<i64> = bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .all(db)
            .await?
            .into_iter()
            .map(|b| b.id)
            .collect();

        if !booking_ids.is_empty() {
            ledger::Entity::delete_many()
                .filter(ledger::Column::BookingId.is_in(booking_ids))
                .exec(db)
                .await?;
        }
        ledger::Entity::delete_many()
            .filter(ledger::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        bookings::Entity::delete_many()
            .filter(bookings::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        contact_messages::Entity::delete_many()
            .filter(contact_messages::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        access_tokens::Entity::delete_many()
            .filter(access_tokens::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        profiles::Entity::delete_by_id(user_id.to_string())
            .exec(db)
            .await?;
        Ok(())
    }

    async fn modify_profile(
        &self,
        user_id: &str,
        change: impl FnOnce(&mut profiles::ActiveModel),
    ) -> ResultEngine<Profile> {
        with_tx!(self, |db_tx| {
            let model = profiles::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("profile not exists".to_string()))?;
            let mut active: profiles::ActiveModel = model.into();
            change(&mut active);
            let model = active.update(&db_tx).await?;
            Profile::try_from(model)
        })
    }

    /// Issues a new bearer credential for `user_id`.
    ///
    /// The returned string is the only copy of the credential; only its hash
    /// is stored.
    pub async fn issue_access_token(&self, user_id: &str) -> ResultEngine<String> {
        let credential = access_tokens::generate_credential();
        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, user_id).await?;
            access_tokens::ActiveModel {
                token_hash: ActiveValue::Set(access_tokens::hash_credential(&credential)),
                user_id: ActiveValue::Set(user_id.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(())
        })?;
        tracing::info!(user_id, "access token issued");
        Ok(credential)
    }

    /// Revokes every credential of `user_id`, returning how many were removed.
    pub async fn revoke_access_tokens(&self, user_id: &str) -> ResultEngine<u64> {
        let result = access_tokens::Entity::delete_many()
            .filter(access_tokens::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }
}
