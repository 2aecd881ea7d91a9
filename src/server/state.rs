use std::sync::Arc;

use crate::supervisor::Supervisor;

/// Shared handler state. Cloned per request by axum.
#[derive(Clone)]
pub struct ServeState {
    pub supervisor: Arc<Supervisor>,
}

impl ServeState {
    pub fn new(supervisor: Arc<Supervisor>) -> Self {
        Self { supervisor }
    }
}
