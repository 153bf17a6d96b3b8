//! HTTP surface of the image lookup relay

pub mod extract;
pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::AppState;
pub use routes::{build_router, init_app_state, init_app_state_with_provider};
