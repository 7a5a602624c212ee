use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::json;

use pitstop_core::PartId;
use pitstop_infra::DEFAULT_SEARCH_LIMIT;

use crate::app::routes::{found, items, removed, respond};
use crate::app::{AppServices, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_parts).post(save_part))
        .route("/audit", post(audit_stock))
        .route("/:id", get(get_part).delete(delete_part))
        .route("/:id/adjust", post(adjust_stock))
}

/// All parts, or those matching `?q=` by name or part number.
pub async fn list_parts(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    let ledger = services.ledger();
    match query.q.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => items(
            ledger.search_parts(term, query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)),
        ),
        _ => items(ledger.parts().map(|parts| parts.as_ref().clone())),
    }
}

pub async fn save_part(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SavePartRequest>,
) -> axum::response::Response {
    let status = if body.id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    respond(status, services.ledger().save_part(&body.into_form()))
}

pub async fn get_part(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PartId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    found("spare part", id, services.ledger().part(id))
}

pub async fn delete_part(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PartId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    removed("spare part", id, services.ledger().delete_part(id))
}

pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AdjustStockRequest>,
) -> axum::response::Response {
    let id: PartId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let result = services
        .ledger()
        .adjust_stock(id, body.delta, body.reason())
        .map(|stock| stock.map(|stock| json!({ "partId": id, "stock": stock })));
    found("spare part", id, result)
}

pub async fn audit_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AuditRequest>,
) -> axum::response::Response {
    let counts: Vec<(PartId, i64)> = body.counts.iter().map(|c| (c.part_id, c.count)).collect();
    items(services.ledger().audit_stock(&counts))
}
