//! Rutas REST de trajets

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use validator::Validate;

use crate::dto::trajet_dto::{
    AssignBusQuery, AssignChauffeurQuery, CreateDirectTrajetRequest, CreateTrajetQuery,
    UpdateTrajetRequest,
};
use crate::dto::ApiResponse;
use crate::models::Trajet;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

pub fn create_trajet_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_trajet))
        .route("/", get(list_trajets))
        .route("/direct", post(create_direct_trajet))
        .route("/:id", get(get_trajet))
        .route("/:id", put(update_trajet))
        .route("/:id", delete(delete_trajet))
        .route("/status/:status", get(list_trajets_by_status))
        .route("/reservation/:reservation_id", get(get_trajet_by_reservation))
        .route("/:id/assign-bus", post(assign_bus))
        .route("/:id/assign-chauffeur", post(assign_chauffeur))
        .route("/:id/start", post(start_trajet))
        .route("/:id/complete", post(complete_trajet))
        .route("/:id/cancel", post(cancel_trajet))
}

async fn create_trajet(
    State(state): State<AppState>,
    Query(query): Query<CreateTrajetQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Trajet>>), AppError> {
    let trajet = state
        .trajet_service
        .create_from_reservation(query.reservation_id, query.bus_id, query.chauffeur_id)
        .await
        .map_err(|e| match e {
            // La reserva ausente es un error del request, no un 404 del trajet
            AppError::NotFound(msg) => AppError::BadRequest(msg),
            other => other,
        })?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(trajet, "Trajet created".to_string())),
    ))
}

async fn create_direct_trajet(
    State(state): State<AppState>,
    Json(request): Json<CreateDirectTrajetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Trajet>>), AppError> {
    request.validate()?;
    let trajet = state.trajet_service.create_direct(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(trajet, "Trajet created".to_string())),
    ))
}

async fn list_trajets(State(state): State<AppState>) -> Result<Json<Vec<Trajet>>, AppError> {
    Ok(Json(state.trajet_service.find_all().await?))
}

async fn get_trajet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Trajet>, AppError> {
    let trajet = state
        .trajet_service
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Trajet", id))?;
    Ok(Json(trajet))
}

async fn list_trajets_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<Trajet>>, AppError> {
    Ok(Json(state.trajet_service.find_by_status(&status).await?))
}

async fn get_trajet_by_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<i64>,
) -> Result<Json<Trajet>, AppError> {
    let trajet = state
        .trajet_service
        .find_by_reservation(reservation_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No trajet for reservation '{}'", reservation_id))
        })?;
    Ok(Json(trajet))
}

async fn update_trajet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTrajetRequest>,
) -> Result<Json<ApiResponse<Trajet>>, AppError> {
    request.validate()?;
    let trajet = state
        .trajet_service
        .update(id, request)
        .await?
        .ok_or_else(|| not_found_error("Trajet", id))?;
    Ok(Json(ApiResponse::success_with_message(trajet, "Trajet updated".to_string())))
}

async fn assign_bus(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<AssignBusQuery>,
) -> Result<Json<ApiResponse<Trajet>>, AppError> {
    let trajet = state.trajet_service.assign_bus(id, query.bus_id).await?;
    Ok(Json(ApiResponse::success_with_message(trajet, "Bus assigned".to_string())))
}

async fn assign_chauffeur(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<AssignChauffeurQuery>,
) -> Result<Json<ApiResponse<Trajet>>, AppError> {
    let trajet = state
        .trajet_service
        .assign_chauffeur(id, query.chauffeur_id)
        .await?;
    Ok(Json(ApiResponse::success_with_message(trajet, "Chauffeur assigned".to_string())))
}

async fn start_trajet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Trajet>>, AppError> {
    let trajet = state.trajet_service.start(id).await?;
    Ok(Json(ApiResponse::success_with_message(trajet, "Trajet started".to_string())))
}

async fn complete_trajet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Trajet>>, AppError> {
    let trajet = state.trajet_service.complete(id).await?;
    Ok(Json(ApiResponse::success_with_message(trajet, "Trajet completed".to_string())))
}

async fn cancel_trajet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Trajet>>, AppError> {
    let trajet = state.trajet_service.cancel(id).await?;
    Ok(Json(ApiResponse::success_with_message(trajet, "Trajet cancelled".to_string())))
}

async fn delete_trajet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let removed = state.trajet_service.delete(id).await?;
    if removed {
        Ok(Json(ApiResponse::ok("Trajet deleted".to_string())))
    } else {
        Err(not_found_error("Trajet", id))
    }
}
