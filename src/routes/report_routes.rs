//! Rutas REST de reportes (solo lectura)

use axum::{extract::State, routing::get, Json, Router};
use std::collections::HashMap;

use crate::models::Trajet;
use crate::services::report_service::SummaryReport;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_report_router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(summary_report))
        .route("/by-bus", get(report_by_bus))
        .route("/by-chauffeur", get(report_by_chauffeur))
}

async fn summary_report(State(state): State<AppState>) -> Result<Json<SummaryReport>, AppError> {
    Ok(Json(state.report_service.summary().await?))
}

async fn report_by_bus(
    State(state): State<AppState>,
) -> Result<Json<HashMap<String, Vec<Trajet>>>, AppError> {
    Ok(Json(state.report_service.by_bus().await?))
}

async fn report_by_chauffeur(
    State(state): State<AppState>,
) -> Result<Json<HashMap<String, Vec<Trajet>>>, AppError> {
    Ok(Json(state.report_service.by_chauffeur().await?))
}
