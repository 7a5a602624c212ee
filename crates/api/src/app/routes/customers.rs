use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
};

use pitstop_core::CustomerId;
use pitstop_infra::DEFAULT_SEARCH_LIMIT;
use pitstop_parties::CustomerForm;

use crate::app::routes::{found, items, removed, respond};
use crate::app::{AppServices, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_customers).post(save_customer))
        .route("/search", get(search))
        .route("/:id", get(get_customer).delete(delete_customer))
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    items(services.directory().customers())
}

pub async fn save_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(form): Json<CustomerForm>,
) -> axum::response::Response {
    let status = if form.id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    respond(status, services.directory().save_customer(&form))
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CustomerId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    found("customer", id, services.directory().customer(id))
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CustomerId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    removed("customer", id, services.directory().delete_customer(id))
}

/// Customer/vehicle pairs by customer name or plate.
pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    let term = query.q.unwrap_or_default();
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    items(services.directory().search(&term, limit))
}
