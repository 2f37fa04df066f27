//! Web layer for the bus network server.
//!
//! Provides HTTP endpoints for stop and bus summaries and for route
//! queries between stops.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
