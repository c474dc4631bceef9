pub mod common;
pub mod reservation_dto;
pub mod trajet_dto;

pub use common::ApiResponse;
