use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};

use pitstop_core::VisitNumber;
use pitstop_core::money::parse_amount_or_zero;
use pitstop_visits::VisitDetails;

use crate::app::routes::{items, respond};
use crate::app::{AppServices, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_visits).post(begin_visit))
        .route(
            "/:number",
            get(get_visit).patch(update_details).delete(delete_visit),
        )
        .route("/:number/services", post(add_service))
        .route("/:number/services/:index", delete(remove_service))
        .route("/:number/parts", post(add_part))
        .route("/:number/parts/:index", delete(remove_part))
        .route("/:number/complete", post(complete_visit))
        .route("/:number/invoice", get(invoice))
}

fn visit_number(raw: &str) -> Result<VisitNumber, axum::response::Response> {
    errors::parse_id(raw)
}

/// Stored visits, or `?active=true` for draft rows newest first.
pub async fn list_visits(
    Extension(services): Extension<Arc<AppServices>>,
    Query(filter): Query<dto::VisitFilter>,
) -> axum::response::Response {
    if filter.active {
        items(services.active_visits())
    } else {
        items(services.workflow().visits())
    }
}

/// Start a draft and save it, issuing its number.
pub async fn begin_visit(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::BeginVisitRequest>,
) -> axum::response::Response {
    let workflow = services.workflow();
    let result = workflow
        .begin(body.customer_id, body.vehicle_id)
        .and_then(|mut visit| workflow.save(&mut visit).map(|_| visit));
    respond(StatusCode::CREATED, result)
}

pub async fn get_visit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(number): Path<String>,
) -> axum::response::Response {
    let number = match visit_number(&number) {
        Ok(n) => n,
        Err(res) => return res,
    };
    respond(StatusCode::OK, services.workflow().require(number))
}

pub async fn delete_visit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(number): Path<String>,
) -> axum::response::Response {
    let number = match visit_number(&number) {
        Ok(n) => n,
        Err(res) => return res,
    };
    match services.workflow().delete(number) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::shop_error_to_response(e),
    }
}

pub async fn update_details(
    Extension(services): Extension<Arc<AppServices>>,
    Path(number): Path<String>,
    Json(details): Json<VisitDetails>,
) -> axum::response::Response {
    let number = match visit_number(&number) {
        Ok(n) => n,
        Err(res) => return res,
    };
    let result = services
        .workflow()
        .edit(number, |wf, visit| wf.update_details(visit, details));
    respond(StatusCode::OK, result)
}

pub async fn add_service(
    Extension(services): Extension<Arc<AppServices>>,
    Path(number): Path<String>,
    Json(body): Json<dto::AddServiceRequest>,
) -> axum::response::Response {
    let number = match visit_number(&number) {
        Ok(n) => n,
        Err(res) => return res,
    };
    let raw_cost = body.cost.as_ref().map(dto::Amount::raw).unwrap_or_default();
    let cost = match parse_amount_or_zero("cost", &raw_cost) {
        Ok(cost) => cost,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let result = services
        .workflow()
        .edit(number, |wf, visit| wf.add_service(visit, &body.name, cost));
    respond(StatusCode::OK, result)
}

pub async fn remove_service(
    Extension(services): Extension<Arc<AppServices>>,
    Path((number, index)): Path<(String, usize)>,
) -> axum::response::Response {
    let number = match visit_number(&number) {
        Ok(n) => n,
        Err(res) => return res,
    };
    let result = services
        .workflow()
        .edit(number, |wf, visit| wf.remove_service(visit, index));
    respond(StatusCode::OK, result)
}

/// Add one unit of a part; repeated calls raise the line quantity.
pub async fn add_part(
    Extension(services): Extension<Arc<AppServices>>,
    Path(number): Path<String>,
    Json(body): Json<dto::AddPartRequest>,
) -> axum::response::Response {
    let number = match visit_number(&number) {
        Ok(n) => n,
        Err(res) => return res,
    };
    let result = services
        .workflow()
        .edit(number, |wf, visit| wf.add_part(visit, body.part_id));
    respond(StatusCode::OK, result)
}

pub async fn remove_part(
    Extension(services): Extension<Arc<AppServices>>,
    Path((number, index)): Path<(String, usize)>,
) -> axum::response::Response {
    let number = match visit_number(&number) {
        Ok(n) => n,
        Err(res) => return res,
    };
    let result = services
        .workflow()
        .edit(number, |wf, visit| wf.remove_part(visit, index));
    respond(StatusCode::OK, result)
}

pub async fn complete_visit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(number): Path<String>,
) -> axum::response::Response {
    let number = match visit_number(&number) {
        Ok(n) => n,
        Err(res) => return res,
    };
    let result = services.workflow().complete_stored(number);
    respond(StatusCode::OK, result)
}

pub async fn invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(number): Path<String>,
) -> axum::response::Response {
    let number = match visit_number(&number) {
        Ok(n) => n,
        Err(res) => return res,
    };
    respond(StatusCode::OK, services.invoice(number))
}
