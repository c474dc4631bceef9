//! Configuración de variables de entorno
//!
//! Este módulo maneja las URLs de los servicios externos (buses y chauffeurs),
//! el directorio de datos y el modo de fallo de los chequeos de disponibilidad.
//! Todas las variables tienen defaults para poder arrancar sin configuración,
//! igual que el `application.properties` del sistema original.

use std::env;
use std::path::PathBuf;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub port: u16,
    pub host: String,
    /// Directorio donde se escriben las colecciones JSON
    pub data_dir: PathBuf,
    /// URL base del servicio de gestión de buses
    pub bus_service_url: String,
    /// URL base del servicio de gestión de chauffeurs
    pub chauffeur_service_url: String,
    /// Timeout por llamada a los servicios externos, en milisegundos
    pub resource_service_timeout_ms: u64,
    /// true = un fallo del servicio externo cuenta como "disponible".
    /// El default es fail-closed: un upstream caído nunca confirma nada.
    pub resource_fail_open: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),
            bus_service_url: env::var("BUS_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/servicegestionbus/api/bus".to_string()),
            chauffeur_service_url: env::var("CHAUFFEUR_SERVICE_URL").unwrap_or_else(|_| {
                "http://localhost:8080/AgenceTransportPART2/api/chauffeurs".to_string()
            }),
            resource_service_timeout_ms: env::var("RESOURCE_SERVICE_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("RESOURCE_SERVICE_TIMEOUT_MS must be a valid number"),
            resource_fail_open: env::var("RESOURCE_FAIL_OPEN")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

fn default_data_dir() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join("AgenceTransport_data")
}

impl EnvironmentConfig {
    /// Obtener la dirección de escucha del servidor
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
