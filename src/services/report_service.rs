//! Reportes de lectura sobre reservas y trajets
//!
//! Agregación derivada: consume únicamente las operaciones públicas de
//! lectura de los dos ciclos de vida, nunca muta estado.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::clients::ResourceAvailability;
use crate::models::{ReservationStatus, Trajet, TrajetStatus};
use crate::utils::errors::AppResult;

use super::reservation_service::ReservationService;
use super::trajet_service::TrajetService;

#[derive(Debug, Serialize)]
pub struct ReservationStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Serialize)]
pub struct TrajetStats {
    pub total: usize,
    pub planned: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
}

/// Reporte resumen del estado global de la agencia
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub reservations: ReservationStats,
    pub trajets: TrajetStats,
    /// Fracción de trajets terminados en COMPLETED; 0.0 sin trajets
    pub completion_rate: f64,
}

pub struct ReportService {
    reservation_service: Arc<ReservationService>,
    trajet_service: Arc<TrajetService>,
    bus_client: Arc<dyn ResourceAvailability>,
    chauffeur_client: Arc<dyn ResourceAvailability>,
}

impl ReportService {
    pub fn new(
        reservation_service: Arc<ReservationService>,
        trajet_service: Arc<TrajetService>,
        bus_client: Arc<dyn ResourceAvailability>,
        chauffeur_client: Arc<dyn ResourceAvailability>,
    ) -> Self {
        Self { reservation_service, trajet_service, bus_client, chauffeur_client }
    }

    pub async fn summary(&self) -> AppResult<SummaryReport> {
        let reservations = self.reservation_service.find_all().await?;
        let trajets = self.trajet_service.find_all().await?;

        let count_reservations = |status: ReservationStatus| {
            reservations.iter().filter(|r| r.status == status).count()
        };
        let count_trajets =
            |status: TrajetStatus| trajets.iter().filter(|t| t.status == status).count();

        let completed = count_trajets(TrajetStatus::Completed);
        let completion_rate = if trajets.is_empty() {
            0.0
        } else {
            completed as f64 / trajets.len() as f64
        };

        let report = SummaryReport {
            reservations: ReservationStats {
                total: reservations.len(),
                pending: count_reservations(ReservationStatus::Pending),
                confirmed: count_reservations(ReservationStatus::Confirmed),
                cancelled: count_reservations(ReservationStatus::Cancelled),
            },
            trajets: TrajetStats {
                total: trajets.len(),
                planned: count_trajets(TrajetStatus::Planned),
                in_progress: count_trajets(TrajetStatus::InProgress),
                completed,
                cancelled: count_trajets(TrajetStatus::Cancelled),
            },
            completion_rate,
        };

        log::info!("📊 Summary report generated");
        Ok(report)
    }

    /// Trajets agrupados por etiqueta de bus. La etiqueta se resuelve una
    /// sola vez por id; si el servicio no responde se usa el marcador
    /// "Bus #id (Indisponible)".
    pub async fn by_bus(&self) -> AppResult<HashMap<String, Vec<Trajet>>> {
        self.group_by_resource(self.bus_client.as_ref(), |t| t.bus_id, |id| {
            format!("Bus #{} (Indisponible)", id)
        })
        .await
    }

    /// Trajets agrupados por etiqueta de chauffeur
    pub async fn by_chauffeur(&self) -> AppResult<HashMap<String, Vec<Trajet>>> {
        self.group_by_resource(self.chauffeur_client.as_ref(), |t| t.chauffeur_id, |id| {
            format!("Chauffeur #{} (Indisponible)", id)
        })
        .await
    }

    async fn group_by_resource<F, P>(
        &self,
        client: &dyn ResourceAvailability,
        resource_id: F,
        placeholder: P,
    ) -> AppResult<HashMap<String, Vec<Trajet>>>
    where
        F: Fn(&Trajet) -> Option<i64>,
        P: Fn(i64) -> String,
    {
        let mut report: HashMap<String, Vec<Trajet>> = HashMap::new();
        let mut labels: HashMap<i64, String> = HashMap::new();

        for trajet in self.trajet_service.find_all().await? {
            let Some(id) = resource_id(&trajet) else { continue };

            if !labels.contains_key(&id) {
                let label = match client.describe(id).await {
                    Some(label) => label,
                    None => placeholder(id),
                };
                labels.insert(id, label);
            }

            report
                .entry(labels[&id].clone())
                .or_default()
                .push(trajet);
        }

        Ok(report)
    }
}
