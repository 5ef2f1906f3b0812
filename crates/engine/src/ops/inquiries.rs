use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, QueryOrder, prelude::*};

use crate::{
    ContactMessage, EngineError, MembershipInquiry, MembershipInquiryNotice, NewInquiry,
    Principal, ResultEngine, contact_messages, inquiries, notify,
};

use super::{Engine, normalize_email, normalize_optional_text, normalize_required_text};

impl Engine {
    /// Stores a membership inquiry from the public site and notifies the
    /// staff. No principal is needed.
    pub async fn submit_membership_inquiry(
        &self,
        inquiry: NewInquiry,
    ) -> ResultEngine<MembershipInquiry> {
        let model = inquiries::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(normalize_required_text(&inquiry.name, "name")?),
            email: ActiveValue::Set(normalize_email(&inquiry.email)?),
            phone: ActiveValue::Set(normalize_optional_text(inquiry.phone.as_deref())),
            message: ActiveValue::Set(normalize_required_text(&inquiry.message, "message")?),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;
        let inquiry = MembershipInquiry::from(model);

        notify::dispatch_membership_inquiry(
            &self.notifier,
            MembershipInquiryNotice {
                inquiry_id: inquiry.id,
                name: inquiry.name.clone(),
                email: inquiry.email.clone(),
                phone: inquiry.phone.clone(),
                message: inquiry.message.clone(),
            },
        );
        Ok(inquiry)
    }

    pub async fn membership_inquiries(
        &self,
        principal: &Principal,
    ) -> ResultEngine<Vec<MembershipInquiry>> {
        principal.require_profiles()?;
        Ok(inquiries::Entity::find()
            .order_by_desc(inquiries::Column::CreatedAt)
            .order_by_desc(inquiries::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(MembershipInquiry::from)
            .collect())
    }

    pub async fn delete_membership_inquiry(
        &self,
        principal: &Principal,
        inquiry_id: i64,
    ) -> ResultEngine<()> {
        principal.require_profiles()?;
        let result = inquiries::Entity::delete_by_id(inquiry_id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("inquiry not exists".to_string()));
        }
        Ok(())
    }

    /// Stores a message from a signed-in member. `attachment_url` is the
    /// public URL the object store returned for an uploaded image.
    pub async fn submit_contact_message(
        &self,
        principal: &Principal,
        subject: &str,
        message: &str,
        attachment_url: Option<&str>,
    ) -> ResultEngine<ContactMessage> {
        let model = contact_messages::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(principal.user_id.clone()),
            subject: ActiveValue::Set(normalize_required_text(subject, "subject")?),
            message: ActiveValue::Set(normalize_required_text(message, "message")?),
            attachment_url: ActiveValue::Set(normalize_optional_text(attachment_url)),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;
        Ok(model.into())
    }

    pub async fn contact_messages(
        &self,
        principal: &Principal,
    ) -> ResultEngine<Vec<ContactMessage>> {
        principal.require_profiles()?;
        Ok(contact_messages::Entity::find()
            .order_by_desc(contact_messages::Column::CreatedAt)
            .order_by_desc(contact_messages::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ContactMessage::from)
            .collect())
    }

    pub async fn delete_contact_message(
        &self,
        principal: &Principal,
        message_id: i64,
    ) -> ResultEngine<()> {
        principal.require_profiles()?;
        let result = contact_messages::Entity::delete_by_id(message_id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("contact message not exists".to_string()));
        }
        Ok(())
    }
}
