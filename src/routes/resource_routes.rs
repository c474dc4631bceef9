//! Rutas REST del catálogo de recursos (buses y chauffeurs)
//!
//! Listados combinados: fixtures locales primero, recursos remotos después.
//! Si un servicio externo está caído, el catálogo degrada a "solo fixtures"
//! sin fallar la llamada.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::clients::ResourceAvailability;
use crate::models::ResourceDescriptor;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

pub fn create_bus_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_buses))
        .route("/:id", get(get_bus))
        .route("/:id/availability", get(get_bus_availability))
}

pub fn create_chauffeur_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_chauffeurs))
        .route("/:id", get(get_chauffeur))
        .route("/:id/availability", get(get_chauffeur_availability))
}

async fn list_resources(
    client: &dyn ResourceAvailability,
) -> Json<Vec<ResourceDescriptor>> {
    Json(client.list_available().await)
}

async fn describe_resource(
    client: &dyn ResourceAvailability,
    id: i64,
    resource: &str,
) -> Result<Json<serde_json::Value>, AppError> {
    match client.describe(id).await {
        Some(label) => Ok(Json(json!({ "id": id, "label": label }))),
        None => Err(not_found_error(resource, id)),
    }
}

async fn resource_availability(
    client: &dyn ResourceAvailability,
    id: i64,
    date: NaiveDate,
) -> Json<serde_json::Value> {
    let available = client.is_available(id, date).await;
    Json(json!({ "id": id, "date": date, "available": available }))
}

async fn list_buses(State(state): State<AppState>) -> Json<Vec<ResourceDescriptor>> {
    list_resources(state.bus_client.as_ref()).await
}

async fn get_bus(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    describe_resource(state.bus_client.as_ref(), id, "Bus").await
}

async fn get_bus_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> Json<serde_json::Value> {
    resource_availability(state.bus_client.as_ref(), id, query.date).await
}

async fn list_chauffeurs(State(state): State<AppState>) -> Json<Vec<ResourceDescriptor>> {
    list_resources(state.chauffeur_client.as_ref()).await
}

async fn get_chauffeur(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    describe_resource(state.chauffeur_client.as_ref(), id, "Chauffeur").await
}

async fn get_chauffeur_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> Json<serde_json::Value> {
    resource_availability(state.chauffeur_client.as_ref(), id, query.date).await
}
