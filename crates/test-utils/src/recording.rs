use std::sync::{Arc, Mutex};

use applink::bus::{DomainEvent, EventListener};
use applink::errors::Result;

/// Listener that records every event it sees, in delivery order.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle; clone before subscribing to keep reading afterwards.
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Packages named by recorded `BuildRequested` events, in order.
    pub fn requested(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DomainEvent::BuildRequested { package_name } => Some(package_name),
                _ => None,
            })
            .collect()
    }

    /// Payloads of recorded `PackagesRebuilt` events.
    pub fn rebuilt(&self) -> Vec<Vec<String>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DomainEvent::PackagesRebuilt { package_names } => Some(package_names),
                _ => None,
            })
            .collect()
    }
}

impl EventListener for RecordingListener {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn on_event(&mut self, event: &DomainEvent) -> Result<Vec<DomainEvent>> {
        self.events.lock().unwrap().push(event.clone());
        Ok(Vec::new())
    }
}
