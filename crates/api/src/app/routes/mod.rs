use axum::{Json, Router, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use pitstop_infra::ShopResult;

use crate::app::errors;

pub mod customers;
pub mod parts;
pub mod reminders;
pub mod system;
pub mod vehicles;
pub mod vendors;
pub mod visits;

/// Router for every shop endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .nest("/customers", customers::router())
        .nest("/vehicles", vehicles::router())
        .nest("/parts", parts::router())
        .nest("/vendors", vendors::router())
        .nest("/visits", visits::router())
        .merge(reminders::router())
}

#[derive(Serialize)]
struct Items<T> {
    items: Vec<T>,
}

/// `{"items": [...]}` on success.
pub(crate) fn items<T: Serialize>(result: ShopResult<Vec<T>>) -> axum::response::Response {
    respond(StatusCode::OK, result.map(|items| Items { items }))
}

pub(crate) fn respond<T: Serialize>(
    status: StatusCode,
    result: ShopResult<T>,
) -> axum::response::Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => errors::shop_error_to_response(e),
    }
}

/// 200 with the record, or 404 when it does not exist.
pub(crate) fn found<T: Serialize>(
    what: &str,
    id: impl std::fmt::Display,
    result: ShopResult<Option<T>>,
) -> axum::response::Response {
    match result {
        Ok(Some(body)) => (StatusCode::OK, Json(body)).into_response(),
        Ok(None) => errors::not_found(what, id),
        Err(e) => errors::shop_error_to_response(e),
    }
}

/// 204 when something was removed, 404 when there was nothing to remove.
pub(crate) fn removed(
    what: &str,
    id: impl std::fmt::Display,
    result: ShopResult<bool>,
) -> axum::response::Response {
    match result {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::not_found(what, id),
        Err(e) => errors::shop_error_to_response(e),
    }
}
