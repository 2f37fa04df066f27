//! Application state for the web layer.

use std::sync::Arc;

use crate::register::TransitRegister;

/// Shared application state.
///
/// The register is immutable once built, so handlers only ever read it.
#[derive(Clone)]
pub struct AppState {
    /// The network register all queries go through.
    pub register: Arc<TransitRegister>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(register: TransitRegister) -> Self {
        Self {
            register: Arc::new(register),
        }
    }
}
