use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::ErrorBody;
pub use identity::{IdentityProvider, TokenIdentity};
pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod announcements;
mod bookings;
mod identity;
mod inquiries;
mod ledger;
mod profiles;
mod server;
mod views;

pub mod types {
    pub mod profile {
        pub use api_types::profile::{
            CapabilitiesView, MeResponse, MembershipUpdate, ProfileCreated, ProfileList,
            ProfileNew, ProfileUpdate, ProfileView, Role, RoleUpdate,
        };
    }

    pub mod booking {
        pub use api_types::booking::{
            BookingCancelled, BookingList, BookingNew, BookingQuery, BookingView, Simulator,
        };
    }

    pub mod ledger {
        pub use api_types::ledger::{
            BalanceAdjust, BalanceList, BalanceView, EntryKind, GuestFeeNew, LedgerEntryView,
            LedgerList, PaymentNew,
        };
    }

    pub mod announcement {
        pub use api_types::announcement::{
            AnnouncementActive, AnnouncementList, AnnouncementNew, AnnouncementUpdate,
            AnnouncementView,
        };
    }

    pub mod inquiry {
        pub use api_types::contact::{ContactList, ContactNew, ContactView};
        pub use api_types::inquiry::{InquiryList, InquiryNew, InquiryView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthenticated => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::SlotConflict(_)
        | EngineError::QuotaExceeded(_) => StatusCode::CONFLICT,
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error, message) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                err.kind().to_string(),
                message_for_engine_error(err),
            ),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, "bad_request".to_string(), err),
        };

        (status, Json(ErrorBody { error, message })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_unauthenticated_maps_to_401() {
        let res = ServerError::from(EngineError::Unauthenticated).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflicts_map_to_409() {
        for err in [
            EngineError::ExistingKey("x".to_string()),
            EngineError::SlotConflict("x".to_string()),
            EngineError::QuotaExceeded("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn database_error_is_hidden() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("secret table".to_string()));
        assert_eq!(status_for_engine_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message_for_engine_error(err), "internal server error");
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
