use std::sync::Arc;

use crate::auth::IdentityProvider;
use crate::database::FarmStore;

/// Shared handles cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FarmStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(store: Arc<dyn FarmStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }
}
