pub mod reservation;
pub mod resource;
pub mod trajet;

pub use reservation::{Reservation, ReservationStatus};
pub use resource::{LocalChauffeurFixture, LocalBusFixture, ResourceDescriptor, ResourceKind};
pub use trajet::{Trajet, TrajetStatus};
