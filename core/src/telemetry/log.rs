use log::{info, warn};

/// Tags log lines with the component that emitted them.
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.component, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.component, message);
    }
}
