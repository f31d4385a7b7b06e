mod dto;
pub mod handlers;
pub mod payload;
mod services;
pub mod square;
mod submission;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::checkout_routes())
        .merge(handlers::menu_routes())
}
