//! REST API surface (axum).

pub mod error;
pub mod router;
pub mod siret_routes;

pub use error::ErrorResponse;
pub use router::build_router;
pub use siret_routes::{AppState, HealthResponse, MessageResponse};
