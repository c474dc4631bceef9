pub mod report_routes;
pub mod reservation_routes;
pub mod resource_routes;
pub mod trajet_routes;
