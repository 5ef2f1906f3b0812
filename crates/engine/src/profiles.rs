//! Member profiles.
//!
//! A profile is created together with an identity record (an access token)
//! and owns the member's bookings and ledger entries.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Role};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub active_until: Option<DateTime<Utc>>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Whether the membership is still running at `now`.
    pub fn is_member(&self, now: DateTime<Utc>) -> bool {
        self.active_until.is_some_and(|until| until > now)
    }
}

/// Input for a new profile.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewProfile {
    /// Identity-provider id. A random UUID is generated when missing.
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub active_until: Option<DateTime<Utc>>,
}

/// Fields a member may change on their own profile.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub profile_picture_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub active_until: Option<DateTimeUtc>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::ledger::Entity")]
    LedgerEntries,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Profile> for ActiveModel {
    fn from(profile: &Profile) -> Self {
        Self {
            id: ActiveValue::Set(profile.id.clone()),
            name: ActiveValue::Set(profile.name.clone()),
            email: ActiveValue::Set(profile.email.clone()),
            phone: ActiveValue::Set(profile.phone.clone()),
            role: ActiveValue::Set(profile.role.as_str().to_string()),
            active_until: ActiveValue::Set(profile.active_until),
            profile_picture_url: ActiveValue::Set(profile.profile_picture_url.clone()),
            created_at: ActiveValue::Set(profile.created_at),
        }
    }
}

impl TryFrom<Model> for Profile {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            role: Role::try_from(model.role.as_str())?,
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            active_until: model.active_until,
            profile_picture_url: model.profile_picture_url,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn profile(active_until: Option<DateTime<Utc>>) -> Profile {
        Profile {
            id: "p1".to_string(),
            name: "Pat".to_string(),
            email: "pat@example.com".to_string(),
            phone: None,
            role: Role::User,
            active_until,
            profile_picture_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn membership_expires_at_active_until() {
        let now = Utc::now();
        assert!(profile(Some(now + Duration::days(30))).is_member(now));
        assert!(!profile(Some(now - Duration::seconds(1))).is_member(now));
        assert!(!profile(None).is_member(now));
    }
}
