use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument};

use super::dto::{CreatePaymentRequest, CreatePaymentResponse, ProviderStatusResponse, QuoteResponse};
use super::services;
use crate::{
    error::CheckoutError,
    menu::{self, MenuCatalog},
    state::AppState,
};

pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/create-payment", post(create_payment))
        .route("/quote", post(quote))
}

pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(get_menu))
        .route("/provider/status", get(provider_status))
}

#[instrument(skip(state, payload))]
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<Json<CreatePaymentResponse>, CheckoutError> {
    let Json(payload) = payload?;
    let session = services::submit_checkout(&state, &payload).await?;
    Ok(Json(CreatePaymentResponse {
        redirect_url: session.redirect_url,
        order_id: session.order_id,
    }))
}

#[instrument(skip(payload))]
pub async fn quote(
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse>, CheckoutError> {
    let Json(payload) = payload?;
    Ok(Json(services::quote(&payload)?))
}

pub async fn get_menu() -> Json<MenuCatalog> {
    Json(menu::catalog())
}

#[instrument(skip(state))]
pub async fn provider_status(
    State(state): State<AppState>,
) -> (StatusCode, Json<ProviderStatusResponse>) {
    match state.provider.check_credentials().await {
        Ok(locations) => {
            info!(count = locations.len(), "provider credentials valid");
            (
                StatusCode::OK,
                Json(ProviderStatusResponse {
                    ok: true,
                    locations: locations.into_iter().map(|l| l.id).collect(),
                    error: None,
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "provider credential check failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ProviderStatusResponse {
                    ok: false,
                    locations: Vec::new(),
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
