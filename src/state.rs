//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: el almacén de documentos, los dos clientes
//! de recursos y los servicios de ciclo de vida.

use std::sync::Arc;

use crate::clients::{ResourceAvailability, ResourceServiceClient};
use crate::config::environment::EnvironmentConfig;
use crate::models::ResourceKind;
use crate::services::{LocalResourceProvider, ReportService, ReservationService, TrajetService};
use crate::store::DocumentStore;
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub store: Arc<DocumentStore>,
    pub bus_client: Arc<dyn ResourceAvailability>,
    pub chauffeur_client: Arc<dyn ResourceAvailability>,
    pub reservation_service: Arc<ReservationService>,
    pub trajet_service: Arc<TrajetService>,
    pub report_service: Arc<ReportService>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig) -> AppResult<Self> {
        let store = Arc::new(DocumentStore::new(config.data_dir.clone())?);
        let fixtures = Arc::new(LocalResourceProvider::default());

        let bus_client: Arc<dyn ResourceAvailability> = Arc::new(ResourceServiceClient::new(
            ResourceKind::Bus,
            config.bus_service_url.clone(),
            config.resource_service_timeout_ms,
            fixtures.clone(),
            config.resource_fail_open,
        ));
        let chauffeur_client: Arc<dyn ResourceAvailability> = Arc::new(ResourceServiceClient::new(
            ResourceKind::Chauffeur,
            config.chauffeur_service_url.clone(),
            config.resource_service_timeout_ms,
            fixtures,
            config.resource_fail_open,
        ));

        let trajet_service = Arc::new(TrajetService::new(
            store.clone(),
            bus_client.clone(),
            chauffeur_client.clone(),
        ));
        let reservation_service = Arc::new(ReservationService::new(
            store.clone(),
            bus_client.clone(),
            chauffeur_client.clone(),
            trajet_service.clone(),
        ));
        let report_service = Arc::new(ReportService::new(
            reservation_service.clone(),
            trajet_service.clone(),
            bus_client.clone(),
            chauffeur_client.clone(),
        ));

        Ok(Self {
            config,
            store,
            bus_client,
            chauffeur_client,
            reservation_service,
            trajet_service,
            report_service,
        })
    }
}
