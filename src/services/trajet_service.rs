//! Ciclo de vida de los trajets
//!
//! Creación a partir de una reserva (copia snapshot de origen/destino/fecha),
//! creación manual, (re)asignación de recursos y transiciones de estado:
//! PLANNED -> IN_PROGRESS -> COMPLETED, con CANCELLED alcanzable desde
//! cualquier estado no terminal. COMPLETED y CANCELLED nunca se abandonan;
//! una transición sobre un estado terminal es un no-op.

use chrono::Utc;
use std::sync::Arc;

use crate::clients::ResourceAvailability;
use crate::dto::trajet_dto::{CreateDirectTrajetRequest, UpdateTrajetRequest};
use crate::models::{Reservation, Trajet, TrajetStatus};
use crate::store::{next_id, DocumentStore};
use crate::utils::errors::{not_found_error, AppError, AppResult};

use super::reservation_service::RESERVATIONS;

/// Nombre de la colección de trajets en el DocumentStore
pub const TRAJETS: &str = "trajets";

pub struct TrajetService {
    store: Arc<DocumentStore>,
    bus_client: Arc<dyn ResourceAvailability>,
    chauffeur_client: Arc<dyn ResourceAvailability>,
}

/// Resuelve la etiqueta de un recurso, con patrón de relleno si el
/// servicio externo no responde. Nunca falla: la ausencia de etiqueta
/// no bloquea ninguna operación.
async fn resolve_label(client: &dyn ResourceAvailability, id: i64) -> String {
    match client.describe(id).await {
        Some(label) => label,
        None => client.kind().placeholder_label(id),
    }
}

impl TrajetService {
    pub fn new(
        store: Arc<DocumentStore>,
        bus_client: Arc<dyn ResourceAvailability>,
        chauffeur_client: Arc<dyn ResourceAvailability>,
    ) -> Self {
        Self { store, bus_client, chauffeur_client }
    }

    /// Crea un trajet a partir de una reserva existente. Los datos del
    /// viaje se copian de la reserva en este momento: ediciones
    /// posteriores de la reserva no alteran el trajet.
    pub async fn create_from_reservation(
        &self,
        reservation_id: i64,
        bus_id: Option<i64>,
        chauffeur_id: Option<i64>,
    ) -> AppResult<Trajet> {
        let reservations: Vec<Reservation> = self.store.load_all(RESERVATIONS).await?;
        let reservation = reservations
            .into_iter()
            .find(|r| r.id == reservation_id)
            .ok_or_else(|| not_found_error("Reservation", reservation_id))?;

        // Etiquetas resueltas fuera del lock de la colección
        let bus_number = match bus_id {
            Some(id) => Some(resolve_label(self.bus_client.as_ref(), id).await),
            None => None,
        };
        let chauffeur_name = match chauffeur_id {
            Some(id) => Some(resolve_label(self.chauffeur_client.as_ref(), id).await),
            None => None,
        };

        let now = Utc::now();
        let trajet = self
            .store
            .mutate(TRAJETS, |all: &mut Vec<Trajet>| {
                let id = next_id(all.iter().map(|t| t.id));
                let trajet = Trajet {
                    id,
                    reservation_id: Some(reservation_id),
                    bus_id,
                    bus_number,
                    chauffeur_id,
                    chauffeur_name,
                    departure_location: reservation.departure_location.clone(),
                    destination_location: reservation.destination_location.clone(),
                    departure_date: reservation.departure_date,
                    arrival_date: None,
                    actual_arrival_date: None,
                    distance_km: None,
                    notes: None,
                    status: TrajetStatus::Planned,
                    created_at: now,
                    updated_at: now,
                };
                all.push(trajet.clone());
                trajet
            })
            .await?;

        // Enlazar la reserva con su trajet para confirmaciones posteriores
        self.store
            .mutate(RESERVATIONS, |all: &mut Vec<Reservation>| {
                if let Some(r) = all.iter_mut().find(|r| r.id == reservation_id) {
                    r.trajet_id = Some(trajet.id);
                    r.touch();
                }
            })
            .await?;

        log::info!("✅ Created trajet {} from reservation {}", trajet.id, reservation_id);
        Ok(trajet)
    }

    /// Creación manual de un trajet, sin reserva asociada
    pub async fn create_direct(&self, request: CreateDirectTrajetRequest) -> AppResult<Trajet> {
        let bus_number = match request.bus_id {
            Some(id) => Some(resolve_label(self.bus_client.as_ref(), id).await),
            None => None,
        };
        let chauffeur_name = match request.chauffeur_id {
            Some(id) => Some(resolve_label(self.chauffeur_client.as_ref(), id).await),
            None => None,
        };

        let now = Utc::now();
        let trajet = self
            .store
            .mutate(TRAJETS, |all: &mut Vec<Trajet>| {
                let id = next_id(all.iter().map(|t| t.id));
                let trajet = Trajet {
                    id,
                    reservation_id: None,
                    bus_id: request.bus_id,
                    bus_number,
                    chauffeur_id: request.chauffeur_id,
                    chauffeur_name,
                    departure_location: request.departure_location,
                    destination_location: request.destination_location,
                    departure_date: request.departure_date,
                    arrival_date: request.arrival_date,
                    actual_arrival_date: None,
                    distance_km: request.distance_km,
                    notes: request.notes,
                    status: TrajetStatus::Planned,
                    created_at: now,
                    updated_at: now,
                };
                all.push(trajet.clone());
                trajet
            })
            .await?;

        log::info!("✅ Created direct trajet: {}", trajet.id);
        Ok(trajet)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Trajet>> {
        self.store.load_all(TRAJETS).await
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Trajet>> {
        Ok(self.find_all().await?.into_iter().find(|t| t.id == id))
    }

    pub async fn find_by_status(&self, status: &str) -> AppResult<Vec<Trajet>> {
        let status: TrajetStatus = status.parse().map_err(AppError::BadRequest)?;
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|t| t.status == status)
            .collect())
    }

    /// Primer trajet asociado a la reserva; a lo sumo uno por invariante
    pub async fn find_by_reservation(&self, reservation_id: i64) -> AppResult<Option<Trajet>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .find(|t| t.reservation_id == Some(reservation_id)))
    }

    pub async fn update(&self, id: i64, request: UpdateTrajetRequest) -> AppResult<Option<Trajet>> {
        self.store
            .mutate(TRAJETS, |all: &mut Vec<Trajet>| {
                let trajet = all.iter_mut().find(|t| t.id == id)?;
                if request.arrival_date.is_some() {
                    trajet.arrival_date = request.arrival_date;
                }
                if request.distance_km.is_some() {
                    trajet.distance_km = request.distance_km;
                }
                if request.notes.is_some() {
                    trajet.notes = request.notes;
                }
                trajet.touch();
                Some(trajet.clone())
            })
            .await
    }

    /// Asigna un bus y re-resuelve su etiqueta. Sin guarda contra
    /// reasignación después de la salida (comportamiento heredado,
    /// documentado como gap).
    pub async fn assign_bus(&self, id: i64, bus_id: i64) -> AppResult<Trajet> {
        let label = resolve_label(self.bus_client.as_ref(), bus_id).await;
        self.store
            .mutate(TRAJETS, |all: &mut Vec<Trajet>| {
                let trajet = all.iter_mut().find(|t| t.id == id)?;
                trajet.bus_id = Some(bus_id);
                trajet.bus_number = Some(label);
                trajet.touch();
                Some(trajet.clone())
            })
            .await?
            .ok_or_else(|| not_found_error("Trajet", id))
    }

    pub async fn assign_chauffeur(&self, id: i64, chauffeur_id: i64) -> AppResult<Trajet> {
        let label = resolve_label(self.chauffeur_client.as_ref(), chauffeur_id).await;
        self.store
            .mutate(TRAJETS, |all: &mut Vec<Trajet>| {
                let trajet = all.iter_mut().find(|t| t.id == id)?;
                trajet.chauffeur_id = Some(chauffeur_id);
                trajet.chauffeur_name = Some(label);
                trajet.touch();
                Some(trajet.clone())
            })
            .await?
            .ok_or_else(|| not_found_error("Trajet", id))
    }

    async fn apply_transition<F>(&self, id: i64, transition: F) -> AppResult<Trajet>
    where
        F: FnOnce(&mut Trajet) + Send,
    {
        self.store
            .mutate(TRAJETS, |all: &mut Vec<Trajet>| {
                let trajet = all.iter_mut().find(|t| t.id == id)?;
                transition(trajet);
                Some(trajet.clone())
            })
            .await?
            .ok_or_else(|| not_found_error("Trajet", id))
    }

    /// PLANNED -> IN_PROGRESS; cualquier otro estado queda intacto
    pub async fn start(&self, id: i64) -> AppResult<Trajet> {
        let trajet = self
            .apply_transition(id, |t| {
                if t.status == TrajetStatus::Planned {
                    t.status = TrajetStatus::InProgress;
                    t.touch();
                }
            })
            .await?;
        log::info!("🚌 Started trajet: {}", id);
        Ok(trajet)
    }

    /// PLANNED o IN_PROGRESS -> COMPLETED, sellando la llegada real.
    /// Sobre un estado terminal es un no-op.
    pub async fn complete(&self, id: i64) -> AppResult<Trajet> {
        let trajet = self
            .apply_transition(id, |t| {
                if matches!(t.status, TrajetStatus::Planned | TrajetStatus::InProgress) {
                    t.status = TrajetStatus::Completed;
                    t.actual_arrival_date = Some(Utc::now());
                    t.touch();
                }
            })
            .await?;
        log::info!("🏁 Completed trajet: {}", id);
        Ok(trajet)
    }

    /// -> CANCELLED salvo que el trajet ya esté en un estado terminal
    pub async fn cancel(&self, id: i64) -> AppResult<Trajet> {
        let trajet = self
            .apply_transition(id, |t| {
                if !t.status.is_terminal() {
                    t.status = TrajetStatus::Cancelled;
                    t.touch();
                }
            })
            .await?;
        log::info!("🛑 Cancelled trajet: {}", id);
        Ok(trajet)
    }

    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let removed = self
            .store
            .mutate(TRAJETS, |all: &mut Vec<Trajet>| {
                let before = all.len();
                all.retain(|t| t.id != id);
                all.len() < before
            })
            .await?;
        if removed {
            log::info!("🗑️ Trajet deleted: {}", id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ResourceServiceClient;
    use crate::dto::reservation_dto::CreateReservationRequest;
    use crate::models::{ReservationStatus, ResourceKind};
    use crate::services::local_resources::LocalResourceProvider;
    use crate::services::reservation_service::ReservationService;
    use chrono::TimeZone;

    const DEAD_URL: &str = "http://127.0.0.1:9/api";

    fn offline_client(kind: ResourceKind) -> Arc<dyn ResourceAvailability> {
        Arc::new(ResourceServiceClient::new(
            kind,
            DEAD_URL.to_string(),
            500,
            Arc::new(LocalResourceProvider::default()),
            false,
        ))
    }

    fn offline_services(dir: &std::path::Path) -> (Arc<TrajetService>, ReservationService) {
        let store = Arc::new(DocumentStore::new(dir).unwrap());
        let bus = offline_client(ResourceKind::Bus);
        let chauffeur = offline_client(ResourceKind::Chauffeur);
        let trajet_service = Arc::new(TrajetService::new(
            store.clone(),
            bus.clone(),
            chauffeur.clone(),
        ));
        let reservation_service =
            ReservationService::new(store, bus, chauffeur, trajet_service.clone());
        (trajet_service, reservation_service)
    }

    async fn seed_reservation(service: &ReservationService) -> i64 {
        service
            .create(CreateReservationRequest {
                passenger_name: "A. Dupont".to_string(),
                passenger_email: "a.dupont@example.fr".to_string(),
                passenger_phone: None,
                departure_location: "CityA".to_string(),
                destination_location: "CityB".to_string(),
                departure_date: chrono::Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
                number_of_seats: 2,
            })
            .await
            .unwrap()
            .id
    }

    fn direct_request() -> CreateDirectTrajetRequest {
        CreateDirectTrajetRequest {
            departure_location: "CityC".to_string(),
            destination_location: "CityD".to_string(),
            departure_date: chrono::Utc.with_ymd_and_hms(2025, 7, 10, 9, 30, 0).unwrap(),
            arrival_date: None,
            bus_id: None,
            chauffeur_id: None,
            distance_km: Some(120.5),
            notes: Some("Affrètement privé".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_from_reservation_copies_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let (service, reservations) = offline_services(dir.path());
        let reservation_id = seed_reservation(&reservations).await;

        let trajet = service
            .create_from_reservation(reservation_id, Some(-1), Some(-1))
            .await
            .unwrap();

        assert_eq!(trajet.id, 1);
        assert_eq!(trajet.reservation_id, Some(reservation_id));
        assert_eq!(trajet.departure_location, "CityA");
        assert_eq!(trajet.destination_location, "CityB");
        assert_eq!(trajet.status, TrajetStatus::Planned);
        // Etiquetas resueltas desde los fixtures locales, sin red
        assert_eq!(trajet.bus_number.as_deref(), Some("BUS-TEST-001"));
        assert_eq!(trajet.chauffeur_name.as_deref(), Some("Jean Dupont (Test)"));

        // La reserva queda enlazada a su trajet
        let reservation = reservations.find_by_id(reservation_id).await.unwrap().unwrap();
        assert_eq!(reservation.trajet_id, Some(trajet.id));
        assert_eq!(reservation.status, ReservationStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_from_missing_reservation_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());

        let err = service.create_from_reservation(99, None, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unresolvable_label_falls_back_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let (service, reservations) = offline_services(dir.path());
        let reservation_id = seed_reservation(&reservations).await;

        // Ids remotos con el servicio caído: etiqueta de relleno, pero la
        // creación no se bloquea
        let trajet = service
            .create_from_reservation(reservation_id, Some(501), Some(88))
            .await
            .unwrap();
        assert_eq!(trajet.bus_number.as_deref(), Some("BUS-501"));
        assert_eq!(trajet.chauffeur_name.as_deref(), Some("CHAUFFEUR-88"));
    }

    #[tokio::test]
    async fn test_create_direct_has_no_reservation_ref() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());

        let trajet = service.create_direct(direct_request()).await.unwrap();
        assert_eq!(trajet.id, 1);
        assert!(trajet.reservation_id.is_none());
        assert_eq!(trajet.status, TrajetStatus::Planned);
        assert_eq!(trajet.distance_km, Some(120.5));

        let second = service.create_direct(direct_request()).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_lifecycle_start_complete() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());
        let trajet = service.create_direct(direct_request()).await.unwrap();

        let started = service.start(trajet.id).await.unwrap();
        assert_eq!(started.status, TrajetStatus::InProgress);

        let completed = service.complete(trajet.id).await.unwrap();
        assert_eq!(completed.status, TrajetStatus::Completed);
        assert!(completed.actual_arrival_date.is_some());
    }

    #[tokio::test]
    async fn test_complete_directly_from_planned() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());
        let trajet = service.create_direct(direct_request()).await.unwrap();

        let completed = service.complete(trajet.id).await.unwrap();
        assert_eq!(completed.status, TrajetStatus::Completed);
        let arrival = completed.actual_arrival_date.unwrap();

        // Completar de nuevo es un no-op: el estado terminal no cambia
        // y la llegada sellada se conserva
        let again = service.complete(trajet.id).await.unwrap();
        assert_eq!(again.status, TrajetStatus::Completed);
        assert_eq!(again.actual_arrival_date, Some(arrival));
    }

    #[tokio::test]
    async fn test_terminal_states_are_never_left() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());

        let trajet = service.create_direct(direct_request()).await.unwrap();
        service.complete(trajet.id).await.unwrap();

        let cancelled = service.cancel(trajet.id).await.unwrap();
        assert_eq!(cancelled.status, TrajetStatus::Completed);

        let started = service.start(trajet.id).await.unwrap();
        assert_eq!(started.status, TrajetStatus::Completed);

        let other = service.create_direct(direct_request()).await.unwrap();
        service.cancel(other.id).await.unwrap();
        let revived = service.start(other.id).await.unwrap();
        assert_eq!(revived.status, TrajetStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_start_only_from_planned() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());
        let trajet = service.create_direct(direct_request()).await.unwrap();

        service.start(trajet.id).await.unwrap();
        // Un segundo start no re-transiciona
        let again = service.start(trajet.id).await.unwrap();
        assert_eq!(again.status, TrajetStatus::InProgress);
    }

    #[tokio::test]
    async fn test_assign_bus_reresolves_label() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());
        let trajet = service.create_direct(direct_request()).await.unwrap();

        let assigned = service.assign_bus(trajet.id, -2).await.unwrap();
        assert_eq!(assigned.bus_id, Some(-2));
        assert_eq!(assigned.bus_number.as_deref(), Some("BUS-TEST-002"));

        let reassigned = service.assign_chauffeur(trajet.id, -1).await.unwrap();
        assert_eq!(reassigned.chauffeur_name.as_deref(), Some("Jean Dupont (Test)"));
    }

    #[tokio::test]
    async fn test_assign_on_missing_trajet_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());
        assert!(matches!(
            service.assign_bus(7, -1).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_find_by_reservation_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let (service, reservations) = offline_services(dir.path());
        let reservation_id = seed_reservation(&reservations).await;

        service.create_direct(direct_request()).await.unwrap();
        let linked = service
            .create_from_reservation(reservation_id, None, None)
            .await
            .unwrap();

        let found = service.find_by_reservation(reservation_id).await.unwrap().unwrap();
        assert_eq!(found.id, linked.id);
        assert!(service.find_by_reservation(42).await.unwrap().is_none());

        service.start(linked.id).await.unwrap();
        let planned = service.find_by_status("planned").await.unwrap();
        assert_eq!(planned.len(), 1);
        let in_progress = service.find_by_status("IN_PROGRESS").await.unwrap();
        assert_eq!(in_progress.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = offline_services(dir.path());
        let trajet = service.create_direct(direct_request()).await.unwrap();

        assert!(service.delete(trajet.id).await.unwrap());
        assert!(!service.delete(trajet.id).await.unwrap());
        assert!(service.find_by_id(trajet.id).await.unwrap().is_none());
    }
}
