//! HTTP server: shared state, route table and readiness probe.

pub mod health;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
