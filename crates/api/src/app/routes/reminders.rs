use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Query},
    routing::get,
};
use chrono::Utc;

use pitstop_infra::projections::UpcomingQuery;

use crate::app::routes::items;
use crate::app::{AppServices, dto};

pub fn router() -> Router {
    Router::new()
        .route("/reminders", get(maintenance_reminders))
        .route("/upcoming", get(upcoming_visits))
}

pub async fn maintenance_reminders(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    items(services.reminders(Utc::now()))
}

pub async fn upcoming_visits(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::UpcomingParams>,
) -> axum::response::Response {
    let query = UpcomingQuery::from(params);
    items(services.upcoming(Utc::now().date_naive(), &query))
}
