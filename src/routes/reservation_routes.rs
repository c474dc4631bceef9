//! Rutas REST de reservas

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use validator::Validate;

use crate::dto::reservation_dto::{
    ConfirmReservationQuery, CreateReservationRequest, UpdateReservationRequest,
};
use crate::dto::ApiResponse;
use crate::models::Reservation;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

pub fn create_reservation_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_reservation))
        .route("/", get(list_reservations))
        .route("/:id", get(get_reservation))
        .route("/:id", put(update_reservation))
        .route("/:id", delete(delete_reservation))
        .route("/status/:status", get(list_reservations_by_status))
        .route("/:id/confirm", post(confirm_reservation))
        .route("/:id/cancel", post(cancel_reservation))
}

async fn create_reservation(
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Reservation>>), AppError> {
    request.validate()?;
    let reservation = state.reservation_service.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            reservation,
            "Reservation created".to_string(),
        )),
    ))
}

async fn list_reservations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(state.reservation_service.find_all().await?))
}

async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state
        .reservation_service
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Reservation", id))?;
    Ok(Json(reservation))
}

async fn list_reservations_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(state.reservation_service.find_by_status(&status).await?))
}

async fn update_reservation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateReservationRequest>,
) -> Result<Json<ApiResponse<Reservation>>, AppError> {
    request.validate()?;
    let reservation = state
        .reservation_service
        .update(id, request)
        .await?
        .ok_or_else(|| not_found_error("Reservation", id))?;
    Ok(Json(ApiResponse::success_with_message(
        reservation,
        "Reservation updated".to_string(),
    )))
}

async fn confirm_reservation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ConfirmReservationQuery>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let confirmed = state
        .reservation_service
        .confirm(id, query.bus_id, query.chauffeur_id)
        .await?;

    if confirmed {
        Ok(Json(ApiResponse::ok("Reservation confirmed".to_string())))
    } else {
        Err(AppError::BadRequest(
            "Reservation could not be confirmed: bus or chauffeur unavailable".to_string(),
        ))
    }
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let cancelled = state.reservation_service.cancel(id).await?;
    if cancelled {
        Ok(Json(ApiResponse::ok("Reservation cancelled".to_string())))
    } else {
        Err(not_found_error("Reservation", id))
    }
}

async fn delete_reservation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let removed = state.reservation_service.delete(id).await?;
    if removed {
        Ok(Json(ApiResponse::ok("Reservation deleted".to_string())))
    } else {
        Err(not_found_error("Reservation", id))
    }
}
