use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::json;

use pitstop_core::VendorId;
use pitstop_inventory::VendorForm;

use crate::app::routes::{found, items, removed, respond};
use crate::app::{AppServices, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_vendors).post(save_vendor))
        .route("/:id", get(get_vendor).delete(delete_vendor))
        .route("/:id/credit", post(adjust_credit))
        .route("/:id/payments", get(list_payments).post(record_payment))
}

pub async fn list_vendors(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    items(services.ledger().vendors())
}

pub async fn save_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Json(form): Json<VendorForm>,
) -> axum::response::Response {
    let status = if form.id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    respond(status, services.ledger().save_vendor(&form))
}

pub async fn get_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VendorId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    found("vendor", id, services.ledger().vendor(id))
}

pub async fn delete_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VendorId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    removed("vendor", id, services.ledger().delete_vendor(id))
}

/// Add a signed amount to the vendor's credit.
pub async fn adjust_credit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AmountRequest>,
) -> axum::response::Response {
    let id: VendorId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let amount = match body.amount.decimal("amount") {
        Ok(amount) => amount,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let result = services
        .ledger()
        .adjust_vendor_credit(id, amount)
        .map(|credit| credit.map(|credit| json!({ "vendorId": id, "credit": credit })));
    found("vendor", id, result)
}

pub async fn list_payments(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VendorId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    items(services.ledger().vendor_payments(Some(id)))
}

pub async fn record_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::VendorPaymentRequest>,
) -> axum::response::Response {
    let id: VendorId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let amount = match body.amount.decimal("amount") {
        Ok(amount) => amount,
        Err(e) => return errors::domain_error_to_response(e),
    };
    respond(
        StatusCode::CREATED,
        services
            .ledger()
            .record_vendor_payment(id, amount, body.notes.as_deref()),
    )
}
