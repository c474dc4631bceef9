//! DTOs de Reservation
//!
//! Requests validados para crear/actualizar reservas y los query params
//! de confirmación. Los nombres de query params (`busId`, `chauffeurId`)
//! se conservan tal cual los expone la API pública.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Request para crear una nueva reserva
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationRequest {
    #[validate(length(min = 1, max = 100))]
    pub passenger_name: String,

    #[validate(email)]
    pub passenger_email: String,

    #[validate(length(min = 6, max = 30))]
    pub passenger_phone: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub departure_location: String,

    #[validate(length(min = 1, max = 200))]
    pub destination_location: String,

    pub departure_date: DateTime<Utc>,

    #[validate(range(min = 1, max = 100))]
    pub number_of_seats: i32,
}

/// Request para actualizar una reserva existente.
/// El estado no se toca por aquí: los cambios de estado pasan por
/// confirm/cancel.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReservationRequest {
    #[validate(length(min = 1, max = 100))]
    pub passenger_name: Option<String>,

    #[validate(email)]
    pub passenger_email: Option<String>,

    #[validate(length(min = 6, max = 30))]
    pub passenger_phone: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub departure_location: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub destination_location: Option<String>,

    pub departure_date: Option<DateTime<Utc>>,

    #[validate(range(min = 1, max = 100))]
    pub number_of_seats: Option<i32>,
}

/// Query params de POST /reservations/{id}/confirm
#[derive(Debug, Deserialize)]
pub struct ConfirmReservationQuery {
    #[serde(rename = "busId")]
    pub bus_id: i64,
    #[serde(rename = "chauffeurId")]
    pub chauffeur_id: i64,
}
