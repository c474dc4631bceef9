pub mod local_resources;
pub mod report_service;
pub mod reservation_service;
pub mod trajet_service;

pub use local_resources::LocalResourceProvider;
pub use report_service::ReportService;
pub use reservation_service::ReservationService;
pub use trajet_service::TrajetService;
