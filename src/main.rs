use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use agence_transport::config::environment::EnvironmentConfig;
use agence_transport::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenvy::dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚌 Agence de Transport - Reservas y Trajets");
    info!("===========================================");

    let config = EnvironmentConfig::default();
    info!("📁 Data directory: {}", config.data_dir.display());
    info!("🔗 Bus service: {}", config.bus_service_url);
    info!("🔗 Chauffeur service: {}", config.chauffeur_service_url);
    if config.resource_fail_open {
        info!("⚠️ Availability checks run in FAIL-OPEN mode");
    }

    let state = match AppState::new(config.clone()) {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Error inicializando el estado: {}", e);
            return Err(anyhow::anyhow!("Initialization error: {}", e));
        }
    };

    let app = agence_transport::build_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("📝 Reservations:");
    info!("   POST /api/reservations - Crear reserva");
    info!("   GET  /api/reservations - Listar reservas");
    info!("   GET  /api/reservations/:id - Obtener reserva");
    info!("   GET  /api/reservations/status/:status - Filtrar por estado");
    info!("   PUT  /api/reservations/:id - Actualizar reserva");
    info!("   POST /api/reservations/:id/confirm?busId=&chauffeurId= - Confirmar");
    info!("   POST /api/reservations/:id/cancel - Cancelar");
    info!("   DELETE /api/reservations/:id - Eliminar");
    info!("🚌 Trajets:");
    info!("   POST /api/trajets?reservationId=&busId=&chauffeurId= - Crear desde reserva");
    info!("   POST /api/trajets/direct - Crear trajet manual");
    info!("   GET  /api/trajets - Listar trajets");
    info!("   GET  /api/trajets/:id - Obtener trajet");
    info!("   GET  /api/trajets/status/:status - Filtrar por estado");
    info!("   GET  /api/trajets/reservation/:reservationId - Trajet de una reserva");
    info!("   POST /api/trajets/:id/assign-bus?busId= - Asignar bus");
    info!("   POST /api/trajets/:id/assign-chauffeur?chauffeurId= - Asignar chauffeur");
    info!("   POST /api/trajets/:id/start - Iniciar");
    info!("   POST /api/trajets/:id/complete - Completar");
    info!("   POST /api/trajets/:id/cancel - Cancelar");
    info!("🚍 Recursos:");
    info!("   GET  /api/buses - Catálogo de buses (fixtures + remotos)");
    info!("   GET  /api/buses/:id/availability?date=YYYY-MM-DD - Disponibilidad");
    info!("   GET  /api/chauffeurs - Catálogo de chauffeurs");
    info!("   GET  /api/chauffeurs/:id/availability?date=YYYY-MM-DD - Disponibilidad");
    info!("📊 Reportes:");
    info!("   GET  /api/reports/summary - Resumen global");
    info!("   GET  /api/reports/by-bus - Trajets por bus");
    info!("   GET  /api/reports/by-chauffeur - Trajets por chauffeur");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
