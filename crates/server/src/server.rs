use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{
    IdentityProvider, ServerError, announcements, bookings, inquiries, ledger, profiles,
};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Resolves the bearer credential into a [`engine::Principal`] once per
/// request and stores it as a request extension.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(EngineError::Unauthenticated.into());
    };

    let user_id = state
        .identity
        .user_id(bearer.token())
        .await?
        .ok_or(EngineError::Unauthenticated)?;
    let principal = state.engine.principal(&user_id).await?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/public/announcements", get(announcements::list_public))
        .route("/public/inquiries", post(inquiries::inquiry_new));

    let authenticated = Router::new()
        .route("/me", get(profiles::me).patch(profiles::update_me))
        .route(
            "/profiles",
            get(profiles::list).post(profiles::profile_new),
        )
        .route(
            "/profiles/{id}",
            get(profiles::get).delete(profiles::remove),
        )
        .route("/profiles/{id}/role", put(profiles::set_role))
        .route("/profiles/{id}/membership", put(profiles::set_membership))
        .route(
            "/bookings",
            get(bookings::list).post(bookings::booking_new),
        )
        .route(
            "/bookings/{id}",
            get(bookings::get).delete(bookings::cancel),
        )
        .route("/bookings/{id}/guest-fees", post(ledger::guest_fee_new))
        .route("/balances", get(ledger::all_balances))
        .route("/balances/{user_id}", get(ledger::balance))
        .route("/ledger/{user_id}", get(ledger::entries))
        .route("/ledger/{user_id}/guest-fees", get(ledger::guest_fees))
        .route("/ledger/{user_id}/payments", post(ledger::payment_new))
        .route("/ledger/{user_id}/adjustments", post(ledger::adjust))
        .route("/ledger/entries/{id}", delete(ledger::remove_entry))
        .route(
            "/announcements",
            get(announcements::list).post(announcements::announcement_new),
        )
        .route(
            "/announcements/{id}",
            axum::routing::patch(announcements::update).delete(announcements::remove),
        )
        .route("/announcements/{id}/active", post(announcements::set_active))
        .route("/inquiries", get(inquiries::list))
        .route("/inquiries/{id}", delete(inquiries::remove))
        .route(
            "/contact",
            get(inquiries::contact_list).post(inquiries::contact_new),
        )
        .route("/contact/{id}", delete(inquiries::contact_remove))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    public.merge(authenticated).with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
