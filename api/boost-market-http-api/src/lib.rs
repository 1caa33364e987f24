mod error;
mod http;
pub mod jwt;

pub use error::ServiceError;
pub use http::{AppState, router, run};
