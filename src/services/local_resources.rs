//! Fixtures locales de buses y chauffeurs
//!
//! Recursos de demostración siempre disponibles, usables incluso cuando los
//! dos servicios externos están caídos. Viven en el espacio de ids negativos
//! para no colisionar nunca con ids emitidos por los servicios reales.
//!
//! El conjunto se inyecta por constructor (configurable por despliegue o por
//! test); `Default` reproduce el catálogo de demostración clásico.

use crate::models::{LocalBusFixture, LocalChauffeurFixture, ResourceDescriptor, ResourceKind};

/// Proveedor inyectable de fixtures locales
#[derive(Debug, Clone)]
pub struct LocalResourceProvider {
    buses: Vec<ResourceDescriptor>,
    chauffeurs: Vec<ResourceDescriptor>,
}

impl Default for LocalResourceProvider {
    fn default() -> Self {
        Self::new(
            vec![
                LocalBusFixture { id: -1, number: "BUS-TEST-001".to_string(), capacity: 50 },
                LocalBusFixture { id: -2, number: "BUS-TEST-002".to_string(), capacity: 30 },
            ],
            vec![
                LocalChauffeurFixture {
                    id: -1,
                    name: "Jean Dupont (Test)".to_string(),
                    license: "TEST-LIC-001".to_string(),
                },
                LocalChauffeurFixture {
                    id: -2,
                    name: "Marie Martin (Test)".to_string(),
                    license: "TEST-LIC-002".to_string(),
                },
            ],
        )
    }
}

impl LocalResourceProvider {
    pub fn new(buses: Vec<LocalBusFixture>, chauffeurs: Vec<LocalChauffeurFixture>) -> Self {
        Self {
            buses: buses.into_iter().map(ResourceDescriptor::from).collect(),
            chauffeurs: chauffeurs.into_iter().map(ResourceDescriptor::from).collect(),
        }
    }

    /// Los fixtures locales se identifican por su id negativo
    pub fn is_fixture_id(id: i64) -> bool {
        ResourceDescriptor::is_local_id(id)
    }

    pub fn fixtures(&self, kind: ResourceKind) -> &[ResourceDescriptor] {
        match kind {
            ResourceKind::Bus => &self.buses,
            ResourceKind::Chauffeur => &self.chauffeurs,
        }
    }

    pub fn get(&self, kind: ResourceKind, id: i64) -> Option<&ResourceDescriptor> {
        self.fixtures(kind).iter().find(|r| r.id == id)
    }
}
