use parking_lot::Mutex;
use std::sync::Arc;

use crate::fleet::Fleet;
use crate::health::HealthTracker;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// État unique partagé par les handlers Axum
#[derive(Clone)]
pub struct AppState {
    pub fleet: Fleet,
    pub health_tracker: HealthTracker,
}

impl AppState {
    pub fn new(fleet: Fleet) -> Self {
        Self { fleet, health_tracker: HealthTracker::new() }
    }
}
