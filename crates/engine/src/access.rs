//! Roles and the capability set derived from them.
//!
//! Authorization is evaluated once per request: the caller resolves a
//! [`Principal`] through [`Engine::principal`](crate::Engine::principal) and
//! hands it to every operation, which only ever asks the principal's
//! [`Capabilities`] what it may do.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(EngineError::Validation(format!("invalid role: {other}"))),
        }
    }
}

/// What a principal is allowed to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub can_book_for_others: bool,
    pub can_bypass_quota: bool,
    pub can_manage_ledger_for_any_user: bool,
    pub can_manage_announcements: bool,
    pub can_manage_profiles: bool,
}

impl Capabilities {
    pub fn for_role(role: Role) -> Self {
        let admin = role.is_admin();
        Self {
            can_book_for_others: admin,
            can_bypass_quota: admin,
            can_manage_ledger_for_any_user: admin,
            can_manage_announcements: admin,
            can_manage_profiles: admin,
        }
    }
}

/// The resolved requester of an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
    pub capabilities: Capabilities,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            capabilities: Capabilities::for_role(role),
        }
    }

    /// `true` when the principal is `user_id` itself.
    pub fn is(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Allows acting on `user_id`'s ledger: the owner, or anyone who manages
    /// every ledger.
    pub(crate) fn require_ledger_access(&self, user_id: &str) -> ResultEngine<()> {
        if self.is(user_id) || self.capabilities.can_manage_ledger_for_any_user {
            return Ok(());
        }
        Err(EngineError::Forbidden(
            "cannot access another member's ledger".to_string(),
        ))
    }

    pub(crate) fn require_ledger_admin(&self) -> ResultEngine<()> {
        if self.capabilities.can_manage_ledger_for_any_user {
            return Ok(());
        }
        Err(EngineError::Forbidden("admin only".to_string()))
    }

    pub(crate) fn require_announcements(&self) -> ResultEngine<()> {
        if self.capabilities.can_manage_announcements {
            return Ok(());
        }
        Err(EngineError::Forbidden("admin only".to_string()))
    }

    pub(crate) fn require_profiles(&self) -> ResultEngine<()> {
        if self.capabilities.can_manage_profiles {
            return Ok(());
        }
        Err(EngineError::Forbidden("admin only".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_gets_every_capability() {
        let caps = Capabilities::for_role(Role::Admin);
        assert!(caps.can_book_for_others);
        assert!(caps.can_bypass_quota);
        assert!(caps.can_manage_ledger_for_any_user);
        assert!(caps.can_manage_announcements);
        assert!(caps.can_manage_profiles);
    }

    #[test]
    fn user_gets_none() {
        assert_eq!(Capabilities::for_role(Role::User), Capabilities::default());
    }

    #[test]
    fn user_reaches_only_own_ledger() {
        let alice = Principal::new("alice", Role::User);
        assert!(alice.require_ledger_access("alice").is_ok());
        assert!(matches!(
            alice.require_ledger_access("bob"),
            Err(EngineError::Forbidden(_))
        ));
        assert!(alice.require_ledger_admin().is_err());
    }

    #[test]
    fn role_round_trips_through_storage_string() {
        assert_eq!(Role::try_from("admin").unwrap(), Role::Admin);
        assert_eq!(Role::try_from(Role::User.as_str()).unwrap(), Role::User);
        assert!(Role::try_from("owner").is_err());
    }
}
