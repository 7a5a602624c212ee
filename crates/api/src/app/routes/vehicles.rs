use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
};

use pitstop_core::VehicleId;
use pitstop_parties::VehicleForm;

use crate::app::routes::{found, items, removed, respond};
use crate::app::{AppServices, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_vehicles).post(save_vehicle))
        .route("/:id", get(get_vehicle).delete(delete_vehicle))
}

pub async fn list_vehicles(
    Extension(services): Extension<Arc<AppServices>>,
    Query(filter): Query<dto::VehicleFilter>,
) -> axum::response::Response {
    items(services.directory().vehicles(filter.customer_id))
}

pub async fn save_vehicle(
    Extension(services): Extension<Arc<AppServices>>,
    Json(form): Json<VehicleForm>,
) -> axum::response::Response {
    let status = if form.id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    respond(status, services.directory().save_vehicle(&form))
}

pub async fn get_vehicle(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VehicleId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    found("vehicle", id, services.directory().vehicle(id))
}

pub async fn delete_vehicle(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VehicleId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    removed("vehicle", id, services.directory().delete_vehicle(id))
}
