pub mod resource_client;

pub use resource_client::{ResourceAvailability, ResourceServiceClient};
