//! HTTP API application wiring (Axum router + shop services).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and conversion into domain forms
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use pitstop_infra::{DynStore, Shop};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Services shared by every handler.
pub type AppServices = Shop<DynStore>;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(shop: AppServices) -> Router {
    let services = Arc::new(shop);

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_requests))
                .layer(Extension(services)),
        )
}
