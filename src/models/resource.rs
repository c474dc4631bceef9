//! Descriptores de recursos (buses y chauffeurs)
//!
//! Cada tipo de recurso pertenece a un servicio externo independiente.
//! Los fixtures locales ocupan el espacio de ids negativos, de modo que
//! nunca colisionan con ids emitidos por los servicios externos.

use serde::{Deserialize, Serialize};

/// Tipo de recurso gestionado por un servicio externo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Bus,
    Chauffeur,
}

impl ResourceKind {
    /// Etiqueta de relleno cuando el servicio externo no responde
    pub fn placeholder_label(&self, id: i64) -> String {
        match self {
            ResourceKind::Bus => format!("BUS-{}", id),
            ResourceKind::Chauffeur => format!("CHAUFFEUR-{}", id),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Bus => "bus",
            ResourceKind::Chauffeur => "chauffeur",
        }
    }
}

/// Descriptor unificado de bus o chauffeur, local o remoto
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub id: i64,
    /// Matrícula/número de bus o nombre de chauffeur
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub is_local: bool,
}

impl ResourceDescriptor {
    /// Los fixtures locales viven en el espacio de ids negativos
    pub fn is_local_id(id: i64) -> bool {
        id < 0
    }
}

/// Bus de prueba siempre disponible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalBusFixture {
    pub id: i64,
    pub number: String,
    pub capacity: i32,
}

impl From<LocalBusFixture> for ResourceDescriptor {
    fn from(bus: LocalBusFixture) -> Self {
        ResourceDescriptor {
            id: bus.id,
            label: bus.number,
            capacity: Some(bus.capacity),
            license: None,
            is_local: true,
        }
    }
}

/// Chauffeur de prueba siempre disponible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalChauffeurFixture {
    pub id: i64,
    pub name: String,
    pub license: String,
}

impl From<LocalChauffeurFixture> for ResourceDescriptor {
    fn from(chauffeur: LocalChauffeurFixture) -> Self {
        ResourceDescriptor {
            id: chauffeur.id,
            label: chauffeur.name,
            capacity: None,
            license: Some(chauffeur.license),
            is_local: true,
        }
    }
}
