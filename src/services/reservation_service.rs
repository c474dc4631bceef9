//! Ciclo de vida de las reservas
//!
//! Una reserva nace PENDING, se confirma contra los dos servicios de
//! recursos (bus y chauffeur) y puede cancelarse en cualquier momento.
//! La cancelación es deliberadamente permisiva: cualquier estado pasa a
//! CANCELLED sin guarda, tal como lo expone la API pública histórica.

use std::sync::Arc;

use chrono::Utc;

use crate::clients::ResourceAvailability;
use crate::dto::reservation_dto::{CreateReservationRequest, UpdateReservationRequest};
use crate::models::{Reservation, ReservationStatus};
use crate::store::{next_id, DocumentStore};
use crate::utils::errors::{AppError, AppResult};

use super::trajet_service::TrajetService;

/// Nombre de la colección de reservas en el DocumentStore
pub const RESERVATIONS: &str = "reservations";

pub struct ReservationService {
    store: Arc<DocumentStore>,
    bus_client: Arc<dyn ResourceAvailability>,
    chauffeur_client: Arc<dyn ResourceAvailability>,
    trajet_service: Arc<TrajetService>,
}

impl ReservationService {
    pub fn new(
        store: Arc<DocumentStore>,
        bus_client: Arc<dyn ResourceAvailability>,
        chauffeur_client: Arc<dyn ResourceAvailability>,
        trajet_service: Arc<TrajetService>,
    ) -> Self {
        Self { store, bus_client, chauffeur_client, trajet_service }
    }

    /// Crea una reserva: id = max + 1 de la colección (bajo el lock del
    /// store), estado forzado a PENDING, ambos timestamps sellados a ahora.
    pub async fn create(&self, request: CreateReservationRequest) -> AppResult<Reservation> {
        let now = Utc::now();
        let reservation = self
            .store
            .mutate(RESERVATIONS, |all: &mut Vec<Reservation>| {
                let id = next_id(all.iter().map(|r| r.id));
                let reservation = Reservation {
                    id,
                    passenger_name: request.passenger_name,
                    passenger_email: request.passenger_email,
                    passenger_phone: request.passenger_phone,
                    departure_location: request.departure_location,
                    destination_location: request.destination_location,
                    departure_date: request.departure_date,
                    number_of_seats: request.number_of_seats,
                    status: ReservationStatus::Pending,
                    trajet_id: None,
                    created_at: now,
                    updated_at: now,
                };
                all.push(reservation.clone());
                reservation
            })
            .await?;

        log::info!("✅ Reservation created: {}", reservation.id);
        Ok(reservation)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Reservation>> {
        self.store.load_all(RESERVATIONS).await
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Reservation>> {
        Ok(self.find_all().await?.into_iter().find(|r| r.id == id))
    }

    pub async fn find_by_status(&self, status: &str) -> AppResult<Vec<Reservation>> {
        let status: ReservationStatus = status.parse().map_err(AppError::BadRequest)?;
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|r| r.status == status)
            .collect())
    }

    /// Reemplaza los campos editables y refresca updated_at.
    /// None si el id no existe.
    pub async fn update(
        &self,
        id: i64,
        request: UpdateReservationRequest,
    ) -> AppResult<Option<Reservation>> {
        let updated = self
            .store
            .mutate(RESERVATIONS, |all: &mut Vec<Reservation>| {
                let reservation = all.iter_mut().find(|r| r.id == id)?;
                if let Some(v) = request.passenger_name {
                    reservation.passenger_name = v;
                }
                if let Some(v) = request.passenger_email {
                    reservation.passenger_email = v;
                }
                if request.passenger_phone.is_some() {
                    reservation.passenger_phone = request.passenger_phone;
                }
                if let Some(v) = request.departure_location {
                    reservation.departure_location = v;
                }
                if let Some(v) = request.destination_location {
                    reservation.destination_location = v;
                }
                if let Some(v) = request.departure_date {
                    reservation.departure_date = v;
                }
                if let Some(v) = request.number_of_seats {
                    reservation.number_of_seats = v;
                }
                reservation.touch();
                Some(reservation.clone())
            })
            .await?;

        match &updated {
            Some(r) => log::info!("✅ Reservation updated: {}", r.id),
            None => log::warn!("⚠️ Reservation not found for update: {}", id),
        }
        Ok(updated)
    }

    /// Confirma la reserva contra ambos servicios de recursos.
    ///
    /// - Si la reserva ya referencia un trajet, primero empuja el bus y el
    ///   chauffeur elegidos sobre ese trajet (best-effort: un fallo aquí no
    ///   aborta la confirmación).
    /// - El chequeo de disponibilidad usa solo la porción de fecha de la
    ///   salida, descartando la hora.
    /// - false si cualquiera de los dos chequeos falla; el estado queda
    ///   intacto. No es idempotente frente a cambios de recursos: cada
    ///   llamada re-chequea con los ids recibidos.
    pub async fn confirm(&self, id: i64, bus_id: i64, chauffeur_id: i64) -> AppResult<bool> {
        let Some(reservation) = self.find_by_id(id).await? else {
            log::warn!("⚠️ Reservation not found for confirm: {}", id);
            return Ok(false);
        };

        if let Some(trajet_id) = reservation.trajet_id {
            if let Err(e) = self.trajet_service.assign_bus(trajet_id, bus_id).await {
                log::warn!("⚠️ Could not push bus {} onto trajet {}: {}", bus_id, trajet_id, e);
            }
            if let Err(e) = self.trajet_service.assign_chauffeur(trajet_id, chauffeur_id).await {
                log::warn!(
                    "⚠️ Could not push chauffeur {} onto trajet {}: {}",
                    chauffeur_id,
                    trajet_id,
                    e
                );
            }
        }

        let date = reservation.departure_date.date_naive();
        let (bus_ok, chauffeur_ok) = futures::join!(
            self.bus_client.is_available(bus_id, date),
            self.chauffeur_client.is_available(chauffeur_id, date)
        );

        if !bus_ok {
            log::warn!("❌ Bus {} not available on {}, reservation {} stays as is", bus_id, date, id);
            return Ok(false);
        }
        if !chauffeur_ok {
            log::warn!(
                "❌ Chauffeur {} not available on {}, reservation {} stays as is",
                chauffeur_id,
                date,
                id
            );
            return Ok(false);
        }

        let confirmed = self
            .store
            .mutate(RESERVATIONS, |all: &mut Vec<Reservation>| {
                match all.iter_mut().find(|r| r.id == id) {
                    Some(r) => {
                        r.status = ReservationStatus::Confirmed;
                        r.touch();
                        true
                    }
                    None => false,
                }
            })
            .await?;

        if confirmed {
            log::info!("✅ Reservation confirmed: {}", id);
        }
        Ok(confirmed)
    }

    /// Cancela incondicionalmente: cualquier estado pasa a CANCELLED.
    /// false solo si el id no existe.
    pub async fn cancel(&self, id: i64) -> AppResult<bool> {
        let cancelled = self
            .store
            .mutate(RESERVATIONS, |all: &mut Vec<Reservation>| {
                match all.iter_mut().find(|r| r.id == id) {
                    Some(r) => {
                        r.status = ReservationStatus::Cancelled;
                        r.touch();
                        true
                    }
                    None => false,
                }
            })
            .await?;

        if cancelled {
            log::info!("🛑 Reservation cancelled: {}", id);
        }
        Ok(cancelled)
    }

    /// Elimina la reserva. No hay borrado en cascada del trajet asociado.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let removed = self
            .store
            .mutate(RESERVATIONS, |all: &mut Vec<Reservation>| {
                let before = all.len();
                all.retain(|r| r.id != id);
                all.len() < before
            })
            .await?;

        if removed {
            log::info!("🗑️ Reservation deleted: {}", id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ResourceServiceClient;
    use crate::dto::trajet_dto::UpdateTrajetRequest;
    use crate::models::ResourceKind;
    use crate::services::local_resources::LocalResourceProvider;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};

    // Puerto sin servicio: toda llamada remota falla de inmediato
    const DEAD_URL: &str = "http://127.0.0.1:9/api";

    /// Stub de servicio de recursos con respuesta fija para ids remotos
    struct StubClient {
        kind: ResourceKind,
        remote_available: bool,
    }

    #[async_trait]
    impl ResourceAvailability for StubClient {
        fn kind(&self) -> ResourceKind {
            self.kind
        }

        async fn is_available(&self, id: i64, _date: NaiveDate) -> bool {
            if id < 0 {
                return true;
            }
            self.remote_available
        }

        async fn describe(&self, _id: i64) -> Option<String> {
            None
        }

        async fn list_available(&self) -> Vec<crate::models::ResourceDescriptor> {
            Vec::new()
        }
    }

    fn offline_client(kind: ResourceKind) -> Arc<dyn ResourceAvailability> {
        Arc::new(ResourceServiceClient::new(
            kind,
            DEAD_URL.to_string(),
            500,
            Arc::new(LocalResourceProvider::default()),
            false,
        ))
    }

    fn build_services(
        dir: &std::path::Path,
        bus: Arc<dyn ResourceAvailability>,
        chauffeur: Arc<dyn ResourceAvailability>,
    ) -> (ReservationService, Arc<TrajetService>) {
        let store = Arc::new(DocumentStore::new(dir).unwrap());
        let trajet_service = Arc::new(TrajetService::new(
            store.clone(),
            bus.clone(),
            chauffeur.clone(),
        ));
        let reservation_service =
            ReservationService::new(store, bus, chauffeur, trajet_service.clone());
        (reservation_service, trajet_service)
    }

    fn offline_services(dir: &std::path::Path) -> (ReservationService, Arc<TrajetService>) {
        build_services(
            dir,
            offline_client(ResourceKind::Bus),
            offline_client(ResourceKind::Chauffeur),
        )
    }

    fn dupont_request() -> CreateReservationRequest {
        CreateReservationRequest {
            passenger_name: "A. Dupont".to_string(),
            passenger_email: "a.dupont@example.fr".to_string(),
            passenger_phone: None,
            departure_location: "CityA".to_string(),
            destination_location: "CityB".to_string(),
            departure_date: chrono::Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            number_of_seats: 2,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_monotonic_ids_and_forces_pending() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());

        let first = service.create(dupont_request()).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.status, ReservationStatus::Pending);

        let second = service.create(dupont_request()).await.unwrap();
        assert_eq!(second.id, 2);

        // El id no se reutiliza después de un borrado
        assert!(service.delete(2).await.unwrap());
        let third = service.create(dupont_request()).await.unwrap();
        assert!(third.id > 1);
    }

    #[tokio::test]
    async fn test_confirm_with_local_fixtures_needs_no_network() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());

        let reservation = service.create(dupont_request()).await.unwrap();
        // Ambos servicios externos están "caídos" (URL muerta): solo los
        // fixtures locales pueden confirmar
        assert!(service.confirm(reservation.id, -1, -1).await.unwrap());

        let stored = service.find_by_id(reservation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_confirm_fails_closed_when_service_down() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());

        let reservation = service.create(dupont_request()).await.unwrap();
        assert!(service.confirm(reservation.id, -1, -1).await.unwrap());

        // Re-confirmar con un bus remoto inalcanzable: false, y el estado
        // previo queda intacto
        assert!(!service.confirm(reservation.id, 501, -1).await.unwrap());
        let stored = service.find_by_id(reservation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_confirm_requires_both_resources() {
        let dir = tempfile::tempdir().unwrap();
        let bus: Arc<dyn ResourceAvailability> = Arc::new(StubClient {
            kind: ResourceKind::Bus,
            remote_available: true,
        });
        let chauffeur: Arc<dyn ResourceAvailability> = Arc::new(StubClient {
            kind: ResourceKind::Chauffeur,
            remote_available: false,
        });
        let (service, _) = build_services(dir.path(), bus, chauffeur);

        let reservation = service.create(dupont_request()).await.unwrap();
        // Bus disponible pero chauffeur no: la confirmación entera falla
        assert!(!service.confirm(reservation.id, 501, 77).await.unwrap());
        let stored = service.find_by_id(reservation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Pending);
    }

    #[tokio::test]
    async fn test_confirm_with_both_remotes_available() {
        let dir = tempfile::tempdir().unwrap();
        let bus: Arc<dyn ResourceAvailability> = Arc::new(StubClient {
            kind: ResourceKind::Bus,
            remote_available: true,
        });
        let chauffeur: Arc<dyn ResourceAvailability> = Arc::new(StubClient {
            kind: ResourceKind::Chauffeur,
            remote_available: true,
        });
        let (service, _) = build_services(dir.path(), bus, chauffeur);

        let reservation = service.create(dupont_request()).await.unwrap();
        assert!(service.confirm(reservation.id, 501, 77).await.unwrap());
    }

    #[tokio::test]
    async fn test_confirm_missing_reservation_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());
        assert!(!service.confirm(42, -1, -1).await.unwrap());
    }

    #[tokio::test]
    async fn test_confirm_pushes_resources_onto_linked_trajet() {
        let dir = tempfile::tempdir().unwrap();
        let (service, trajet_service) = offline_services(dir.path());

        let reservation = service.create(dupont_request()).await.unwrap();
        let trajet = trajet_service
            .create_from_reservation(reservation.id, Some(-1), Some(-1))
            .await
            .unwrap();

        // Confirmar eligiendo el otro fixture: el trajet existente recibe
        // los nuevos recursos antes del chequeo
        assert!(service.confirm(reservation.id, -2, -2).await.unwrap());

        let stored = trajet_service.find_by_id(trajet.id).await.unwrap().unwrap();
        assert_eq!(stored.bus_id, Some(-2));
        assert_eq!(stored.bus_number.as_deref(), Some("BUS-TEST-002"));
        assert_eq!(stored.chauffeur_id, Some(-2));
        assert_eq!(stored.chauffeur_name.as_deref(), Some("Marie Martin (Test)"));
    }

    #[tokio::test]
    async fn test_cancel_is_unconditional() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());

        let reservation = service.create(dupont_request()).await.unwrap();
        assert!(service.confirm(reservation.id, -1, -1).await.unwrap());

        // CONFIRMED -> CANCELLED sin guarda
        assert!(service.cancel(reservation.id).await.unwrap());
        let stored = service.find_by_id(reservation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Cancelled);

        // Cancelar lo ya cancelado también "funciona"
        assert!(service.cancel(reservation.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_status_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());

        service.create(dupont_request()).await.unwrap();
        let pending = service.find_by_status("pending").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert!(service.find_by_status("SHIPPED").await.is_err());
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());

        let request = UpdateReservationRequest {
            passenger_name: Some("B. Martin".to_string()),
            passenger_email: None,
            passenger_phone: None,
            departure_location: None,
            destination_location: None,
            departure_date: None,
            number_of_seats: None,
        };
        assert!(service.update(9, request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_refreshes_updated_at() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());

        let reservation = service.create(dupont_request()).await.unwrap();
        let request = UpdateReservationRequest {
            passenger_name: None,
            passenger_email: None,
            passenger_phone: Some("+33 6 00 00 00 00".to_string()),
            departure_location: None,
            destination_location: None,
            departure_date: None,
            number_of_seats: Some(3),
        };
        let updated = service.update(reservation.id, request).await.unwrap().unwrap();
        assert_eq!(updated.number_of_seats, 3);
        assert!(updated.updated_at >= reservation.updated_at);
        // Los campos no enviados se conservan
        assert_eq!(updated.passenger_name, "A. Dupont");
    }

    #[tokio::test]
    async fn test_delete_does_not_cascade_to_trajet() {
        let dir = tempfile::tempdir().unwrap();
        let (service, trajet_service) = offline_services(dir.path());

        let reservation = service.create(dupont_request()).await.unwrap();
        let trajet = trajet_service
            .create_from_reservation(reservation.id, None, None)
            .await
            .unwrap();

        assert!(service.delete(reservation.id).await.unwrap());
        assert!(service.find_by_id(reservation.id).await.unwrap().is_none());
        // El trajet sobrevive al borrado de la reserva
        assert!(trajet_service.find_by_id(trajet.id).await.unwrap().is_some());
    }

    // Asegura que el último `update` de la reserva no toca un trajet ya creado
    #[tokio::test]
    async fn test_trajet_snapshot_survives_reservation_edits() {
        let dir = tempfile::tempdir().unwrap();
        let (service, trajet_service) = offline_services(dir.path());

        let reservation = service.create(dupont_request()).await.unwrap();
        let trajet = trajet_service
            .create_from_reservation(reservation.id, Some(-1), Some(-1))
            .await
            .unwrap();
        assert_eq!(trajet.departure_location, "CityA");

        let request = UpdateReservationRequest {
            passenger_name: None,
            passenger_email: None,
            passenger_phone: None,
            departure_location: Some("CityZ".to_string()),
            destination_location: None,
            departure_date: None,
            number_of_seats: None,
        };
        service.update(reservation.id, request).await.unwrap().unwrap();

        let stored = trajet_service.find_by_id(trajet.id).await.unwrap().unwrap();
        assert_eq!(stored.departure_location, "CityA");

        // Y a la inversa: actualizar el trajet no toca la reserva
        trajet_service
            .update(trajet.id, UpdateTrajetRequest {
                arrival_date: None,
                distance_km: Some(250.0),
                notes: None,
            })
            .await
            .unwrap();
        let reloaded = service.find_by_id(reservation.id).await.unwrap().unwrap();
        assert_eq!(reloaded.departure_location, "CityZ");
    }
}
