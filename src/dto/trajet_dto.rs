//! DTOs de Trajet

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Query params de POST /trajets (creación desde una reserva)
#[derive(Debug, Deserialize)]
pub struct CreateTrajetQuery {
    #[serde(rename = "reservationId")]
    pub reservation_id: i64,
    #[serde(rename = "busId")]
    pub bus_id: Option<i64>,
    #[serde(rename = "chauffeurId")]
    pub chauffeur_id: Option<i64>,
}

/// Request para crear un trajet manual, sin reserva asociada
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDirectTrajetRequest {
    #[validate(length(min = 1, max = 200))]
    pub departure_location: String,

    #[validate(length(min = 1, max = 200))]
    pub destination_location: String,

    pub departure_date: DateTime<Utc>,

    pub arrival_date: Option<DateTime<Utc>>,

    pub bus_id: Option<i64>,

    pub chauffeur_id: Option<i64>,

    pub distance_km: Option<f64>,

    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Request para actualizar los campos editables de un trajet
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTrajetRequest {
    pub arrival_date: Option<DateTime<Utc>>,

    pub distance_km: Option<f64>,

    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Query params de POST /trajets/{id}/assign-bus
#[derive(Debug, Deserialize)]
pub struct AssignBusQuery {
    #[serde(rename = "busId")]
    pub bus_id: i64,
}

/// Query params de POST /trajets/{id}/assign-chauffeur
#[derive(Debug, Deserialize)]
pub struct AssignChauffeurQuery {
    #[serde(rename = "chauffeurId")]
    pub chauffeur_id: i64,
}
