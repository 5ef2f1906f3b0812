use sea_orm::{ConnectionTrait, prelude::*};

use crate::{
    Booking, EngineError, Principal, Profile, ResultEngine, access_tokens, bookings, profiles,
};

use super::Engine;

impl Engine {
    /// Resolves the requester of an operation.
    ///
    /// The profile is looked up once and its role turned into the capability
    /// set every other operation consults. An unknown id means the identity
    /// has no profile, which is reported as [`EngineError::Unauthenticated`].
    pub async fn principal(&self, user_id: &str) -> ResultEngine<Principal> {
        let profile = self
            .find_profile(&self.database, user_id)
            .await?
            .ok_or(EngineError::Unauthenticated)?;
        Ok(Principal::new(profile.id, profile.role))
    }

    /// Maps a bearer credential to the user it was issued for.
    pub async fn resolve_access_token(&self, credential: &str) -> ResultEngine<Option<String>> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Ok(None);
        }
        let hash = access_tokens::hash_credential(credential);
        Ok(access_tokens::Entity::find_by_id(hash)
            .one(&self.database)
            .await?
            .map(|model| model.user_id))
    }

    pub(super) async fn find_profile<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<Option<Profile>> {
        profiles::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .map(Profile::try_from)
            .transpose()
    }

    pub(super) async fn require_profile<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<Profile> {
        self.find_profile(db, user_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("profile not exists".to_string()))
    }

    pub(super) async fn require_booking<C: ConnectionTrait>(
        &self,
        db: &C,
        booking_id: i64,
    ) -> ResultEngine<Booking> {
        let model = bookings::Entity::find_by_id(booking_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("booking not exists".to_string()))?;
        Booking::try_from(model)
    }

    /// Owner of the booking or someone who manages bookings for others.
    pub(super) fn require_booking_access(
        &self,
        principal: &Principal,
        booking: &Booking,
    ) -> ResultEngine<()> {
        if principal.is(&booking.user_id) || principal.capabilities.can_book_for_others {
            return Ok(());
        }
        Err(EngineError::Forbidden(
            "booking belongs to another member".to_string(),
        ))
    }
}
