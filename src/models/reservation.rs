//! Modelo de Reservation
//!
//! Una reserva es la solicitud de transporte de un pasajero antes de que
//! se comprometan recursos (bus + chauffeur). Se persiste como documento
//! JSON en la colección `reservations`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Estado de la reserva
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    // El filtrado por estado es case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(ReservationStatus::Pending),
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            other => Err(format!("Unknown reservation status: {}", other)),
        }
    }
}

/// Reservation principal - documento completo tal como se persiste
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub passenger_name: String,
    pub passenger_email: String,
    pub passenger_phone: Option<String>,
    pub departure_location: String,
    pub destination_location: String,
    pub departure_date: DateTime<Utc>,
    pub number_of_seats: i32,
    pub status: ReservationStatus,
    /// Trajet materializado a partir de esta reserva, si existe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajet_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!(
            "pending".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Pending
        );
        assert_eq!(
            "Confirmed".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Confirmed
        );
        assert!("SHIPPED".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_screaming() {
        let json = serde_json::to_string(&ReservationStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}
