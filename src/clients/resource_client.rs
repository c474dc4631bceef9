//! Cliente REST de los servicios externos de recursos
//!
//! Una única implementación parametrizada por tipo de recurso atiende tanto
//! al servicio de buses como al de chauffeurs: ambos exponen la misma
//! superficie (`GET /{id}/availability?date=`, `GET /{id}`,
//! `GET ?available=true`).
//!
//! Política de fallo: fail-closed. Cualquier respuesta no-200, timeout o
//! error de transporte cuenta como "no disponible" para los chequeos, y como
//! etiqueta irresoluble para los detalles. `RESOURCE_FAIL_OPEN=true` invierte
//! solo el chequeo de disponibilidad, para despliegues de demostración.
//!
//! Los ids negativos son fixtures locales: siempre disponibles, resueltos sin
//! ninguna llamada de red.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{ResourceDescriptor, ResourceKind};
use crate::services::local_resources::LocalResourceProvider;

/// Coordinador de disponibilidad de un tipo de recurso.
/// Seam de inyección: los tests de los servicios sustituyen esta interfaz
/// por stubs sin red.
#[async_trait]
pub trait ResourceAvailability: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// true solo si el recurso está explícitamente disponible para la fecha
    async fn is_available(&self, id: i64, date: NaiveDate) -> bool;

    /// Etiqueta legible del recurso; None si no se pudo resolver
    async fn describe(&self, id: i64) -> Option<String>;

    /// Fixtures locales primero, después los recursos remotos disponibles.
    /// Si el servicio externo falla, degrada a "solo fixtures".
    async fn list_available(&self) -> Vec<ResourceDescriptor>;
}

/// Cuerpo de `GET /{id}/availability?date=`
#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    available: bool,
}

/// Detalle de bus o chauffeur tal como lo devuelve el servicio externo
#[derive(Debug, Deserialize)]
struct RemoteResource {
    id: i64,
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    capacity: Option<i32>,
    #[serde(default)]
    license: Option<String>,
}

impl RemoteResource {
    fn display_label(&self) -> Option<String> {
        self.number.clone().or_else(|| self.name.clone())
    }
}

pub struct ResourceServiceClient {
    kind: ResourceKind,
    base_url: String,
    client: reqwest::Client,
    fixtures: Arc<LocalResourceProvider>,
    fail_open: bool,
}

impl ResourceServiceClient {
    pub fn new(
        kind: ResourceKind,
        base_url: String,
        timeout_ms: u64,
        fixtures: Arc<LocalResourceProvider>,
        fail_open: bool,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self { kind, base_url, client, fixtures, fail_open }
    }

    /// Resolución local de un fallo de disponibilidad según la política configurada
    fn resolve_failure(&self, id: i64, reason: &str) -> bool {
        if self.fail_open {
            log::warn!(
                "⚠️ {} {} availability check failed ({}), fail-open mode reports available",
                self.kind.as_str(),
                id,
                reason
            );
            true
        } else {
            log::warn!(
                "⚠️ {} {} availability check failed ({}), treating as unavailable",
                self.kind.as_str(),
                id,
                reason
            );
            false
        }
    }
}

#[async_trait]
impl ResourceAvailability for ResourceServiceClient {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn is_available(&self, id: i64, date: NaiveDate) -> bool {
        // Todo el espacio de ids negativos es local: siempre disponible,
        // sin llamada de red
        if LocalResourceProvider::is_fixture_id(id) {
            log::info!("✅ Local {} fixture {} is always available", self.kind.as_str(), id);
            return true;
        }

        let url = format!("{}/{}/availability", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .query(&[("date", date.format("%Y-%m-%d").to_string())])
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<AvailabilityResponse>().await {
                Ok(body) => body.available,
                Err(e) => self.resolve_failure(id, &format!("malformed body: {}", e)),
            },
            Ok(resp) => self.resolve_failure(id, &format!("status {}", resp.status())),
            Err(e) => self.resolve_failure(id, &e.to_string()),
        }
    }

    async fn describe(&self, id: i64) -> Option<String> {
        if LocalResourceProvider::is_fixture_id(id) {
            return self.fixtures.get(self.kind, id).map(|r| r.label.clone());
        }

        let url = format!("{}/{}", self.base_url, id);
        let response = self.client.get(&url).send().await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<RemoteResource>().await {
                Ok(detail) => detail.display_label(),
                Err(e) => {
                    log::warn!("⚠️ Malformed {} detail for {}: {}", self.kind.as_str(), id, e);
                    None
                }
            },
            Ok(resp) => {
                log::warn!(
                    "⚠️ {} detail service returned {} for {}",
                    self.kind.as_str(),
                    resp.status(),
                    id
                );
                None
            }
            Err(e) => {
                log::warn!("⚠️ Error getting {} details for {}: {}", self.kind.as_str(), id, e);
                None
            }
        }
    }

    async fn list_available(&self) -> Vec<ResourceDescriptor> {
        // Los fixtures locales van siempre primero
        let mut all: Vec<ResourceDescriptor> = self.fixtures.fixtures(self.kind).to_vec();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("available", "true")])
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<Vec<RemoteResource>>().await {
                Ok(remote) => {
                    let count = remote.len();
                    for r in remote {
                        let label = r
                            .display_label()
                            .unwrap_or_else(|| self.kind.placeholder_label(r.id));
                        all.push(ResourceDescriptor {
                            id: r.id,
                            label,
                            capacity: r.capacity,
                            license: r.license,
                            is_local: false,
                        });
                    }
                    log::info!("✅ Loaded {} external {}s", count, self.kind.as_str());
                }
                Err(e) => {
                    log::warn!(
                        "⚠️ Malformed {} list, using local fixtures only: {}",
                        self.kind.as_str(),
                        e
                    );
                }
            },
            Ok(resp) => {
                log::warn!(
                    "⚠️ {} list service returned {}, using local fixtures only",
                    self.kind.as_str(),
                    resp.status()
                );
            }
            Err(e) => {
                log::warn!(
                    "⚠️ Error listing external {}s, using local fixtures only: {}",
                    self.kind.as_str(),
                    e
                );
            }
        }

        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Puerto sin servicio: la conexión se rechaza de inmediato
    const DEAD_URL: &str = "http://127.0.0.1:9/api/bus";

    fn client(fail_open: bool) -> ResourceServiceClient {
        ResourceServiceClient::new(
            ResourceKind::Bus,
            DEAD_URL.to_string(),
            500,
            Arc::new(LocalResourceProvider::default()),
            fail_open,
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_fixture_always_available_without_network() {
        // La URL apunta a un puerto muerto: si se intentara una llamada
        // de red el resultado sería false
        assert!(client(false).is_available(-1, date()).await);
    }

    #[tokio::test]
    async fn test_whole_negative_namespace_counts_as_local() {
        assert!(client(false).is_available(-99, date()).await);
        assert!(client(false).describe(-99).await.is_none());
    }

    #[tokio::test]
    async fn test_fail_closed_when_service_down() {
        assert!(!client(false).is_available(501, date()).await);
    }

    #[tokio::test]
    async fn test_fail_open_mode_when_service_down() {
        assert!(client(true).is_available(501, date()).await);
    }

    #[tokio::test]
    async fn test_describe_fixture_returns_static_label() {
        let label = client(false).describe(-1).await;
        assert_eq!(label.as_deref(), Some("BUS-TEST-001"));
    }

    #[tokio::test]
    async fn test_describe_unresolvable_when_service_down() {
        assert!(client(false).describe(501).await.is_none());
    }

    #[tokio::test]
    async fn test_list_degrades_to_fixtures_when_service_down() {
        let all = client(false).list_available().await;
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|r| r.is_local));
        assert_eq!(all[0].label, "BUS-TEST-001");
    }
}
