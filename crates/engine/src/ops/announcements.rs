use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{Announcement, EngineError, Principal, ResultEngine, announcements};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Announcements visible to `viewer`, newest first.
    ///
    /// Admins see every message; members and anonymous visitors only the
    /// active ones.
    pub async fn announcements(
        &self,
        viewer: Option<&Principal>,
    ) -> ResultEngine<Vec<Announcement>> {
        let see_all = viewer.is_some_and(|p| p.capabilities.can_manage_announcements);
        let mut query = announcements::Entity::find();
        if !see_all {
            query = query.filter(announcements::Column::IsActive.eq(true));
        }
        Ok(query
            .order_by_desc(announcements::Column::CreatedAt)
            .order_by_desc(announcements::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Announcement::from)
            .collect())
    }

    pub async fn create_announcement(
        &self,
        principal: &Principal,
        message: &str,
        is_active: bool,
    ) -> ResultEngine<Announcement> {
        principal.require_announcements()?;
        let message = normalize_required_text(message, "message")?;
        let now = Utc::now();
        let model = announcements::ActiveModel {
            id: ActiveValue::NotSet,
            message: ActiveValue::Set(message),
            is_active: ActiveValue::Set(is_active),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            created_by: ActiveValue::Set(principal.user_id.clone()),
        }
        .insert(&self.database)
        .await?;
        Ok(model.into())
    }

    pub async fn update_announcement(
        &self,
        principal: &Principal,
        announcement_id: i64,
        message: &str,
    ) -> ResultEngine<Announcement> {
        principal.require_announcements()?;
        let message = normalize_required_text(message, "message")?;
        self.modify_announcement(announcement_id, |active| {
            active.message = ActiveValue::Set(message);
        })
        .await
    }

    /// The explicit toggle between the active and inactive states.
    pub async fn set_announcement_active(
        &self,
        principal: &Principal,
        announcement_id: i64,
        is_active: bool,
    ) -> ResultEngine<Announcement> {
        principal.require_announcements()?;
        self.modify_announcement(announcement_id, |active| {
            active.is_active = ActiveValue::Set(is_active);
        })
        .await
    }

    pub async fn delete_announcement(
        &self,
        principal: &Principal,
        announcement_id: i64,
    ) -> ResultEngine<()> {
        principal.require_announcements()?;
        let result = announcements::Entity::delete_by_id(announcement_id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "announcement not exists".to_string(),
            ));
        }
        Ok(())
    }

    async fn modify_announcement(
        &self,
        announcement_id: i64,
        change: impl FnOnce(&mut announcements::ActiveModel),
    ) -> ResultEngine<Announcement> {
        with_tx!(self, |db_tx| {
            let model = announcements::Entity::find_by_id(announcement_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("announcement not exists".to_string()))?;
            let mut active: announcements::ActiveModel = model.into();
            change(&mut active);
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Ok(Announcement::from(model))
        })
    }
}
