//! HTTP adapter over `CabService`.
//!
//! Six GET endpoints, each translating query parameters into one service call
//! and the outcome into a `{status, data | message}` JSON envelope.

pub mod error;
pub mod handlers;

use crate::application::service::CabService;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CabService>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/login", get(handlers::login))
        .route("/verify", get(handlers::verify))
        .route("/validate", get(handlers::validate))
        .route("/requestcab", get(handlers::request_cab))
        .route("/getrequestinfo", get(handlers::get_request_info))
        .route("/cancelrequest", get(handlers::cancel_request))
        .with_state(state)
}
