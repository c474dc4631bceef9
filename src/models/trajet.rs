//! Modelo de Trajet (viaje)
//!
//! Un trajet es una salida concreta con recursos asignados, normalmente
//! derivado de una reserva confirmada. Los campos de origen/destino/fecha
//! son una copia tomada en el momento de la creación: ediciones posteriores
//! de la reserva no modifican un trajet ya creado.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Estado del trajet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrajetStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl TrajetStatus {
    /// COMPLETED y CANCELLED son terminales: ninguna transición los abandona
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrajetStatus::Completed | TrajetStatus::Cancelled)
    }
}

impl fmt::Display for TrajetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrajetStatus::Planned => "PLANNED",
            TrajetStatus::InProgress => "IN_PROGRESS",
            TrajetStatus::Completed => "COMPLETED",
            TrajetStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TrajetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PLANNED" => Ok(TrajetStatus::Planned),
            "IN_PROGRESS" => Ok(TrajetStatus::InProgress),
            "COMPLETED" => Ok(TrajetStatus::Completed),
            "CANCELLED" => Ok(TrajetStatus::Cancelled),
            other => Err(format!("Unknown trajet status: {}", other)),
        }
    }
}

/// Trajet principal - documento completo tal como se persiste
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajet {
    pub id: i64,
    /// Ausente cuando el trajet fue creado manualmente
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_id: Option<i64>,
    /// Etiqueta cacheada del bus; best-effort, nunca bloquea una transición
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chauffeur_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chauffeur_name: Option<String>,
    pub departure_location: String,
    pub destination_location: String,
    pub departure_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_arrival_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: TrajetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trajet {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TrajetStatus::Completed.is_terminal());
        assert!(TrajetStatus::Cancelled.is_terminal());
        assert!(!TrajetStatus::Planned.is_terminal());
        assert!(!TrajetStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "in_progress".parse::<TrajetStatus>().unwrap(),
            TrajetStatus::InProgress
        );
        assert!("DELAYED".parse::<TrajetStatus>().is_err());
    }
}
