//! Agence de transport - workflow de reservas y trajets
//!
//! Backend de la agencia: los pasajeros crean reservas, un operador las
//! confirma contra dos servicios de recursos independientes (buses y
//! chauffeurs) y las reservas confirmadas se materializan en trajets con
//! su propio ciclo de vida. La persistencia es un almacén de documentos
//! JSON, una colección por tipo de entidad.

pub mod clients;
pub mod config;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;

use axum::{routing::get, Json, Router};
use serde_json::json;

use middleware::cors::cors_middleware;
use state::AppState;

/// Construye el router completo de la API sobre un estado ya inicializado
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/reservations", routes::reservation_routes::create_reservation_router())
        .nest("/api/trajets", routes::trajet_routes::create_trajet_router())
        .nest("/api/buses", routes::resource_routes::create_bus_router())
        .nest("/api/chauffeurs", routes::resource_routes::create_chauffeur_router())
        .nest("/api/reports", routes::report_routes::create_report_router())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors_middleware())
        .with_state(state)
}

/// Health check simple
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "service": "agence-transport",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
