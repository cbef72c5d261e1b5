pub mod cli;
pub mod config;
pub mod error;
pub mod schema;
pub mod services;

pub use error::{ControlApiError, Status, StatusCode};
pub use services::ControlApi;
pub use services::validate::SpecValidator;
