pub mod models;
pub mod handlers;
pub mod services;

pub use models::*;
pub use handlers::*;
pub use services::PatientService;
