// src/bus/event_bus.rs

use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use crate::bus::events::DomainEvent;
use crate::errors::Result;

/// Something that reacts to domain events.
///
/// Listeners never publish directly; they return the events they want to
/// emit and the bus queues them behind the event currently being delivered.
pub trait EventListener: Send {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn on_event(&mut self, event: &DomainEvent) -> Result<Vec<DomainEvent>>;
}

/// Synchronous, ordered publish/subscribe channel.
///
/// - Listeners receive every event in registration order.
/// - An event reaches every listener before any event emitted in response to
///   it is delivered.
/// - Emitted events are delivered FIFO; nothing is dropped.
///
/// `publish` takes `&mut self`, so a listener cannot re-enter the bus while
/// it is dispatching.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn EventListener>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.listeners.iter().map(|l| l.name()).collect();
        f.debug_struct("EventBus")
            .field("listeners", &names)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it is delivered to after all earlier ones.
    pub fn subscribe<L>(&mut self, listener: L)
    where
        L: EventListener + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Deliver `event`, then everything emitted in response, until the queue
    /// drains.
    ///
    /// Returns the emitted events in delivery order (not including `event`
    /// itself). The first listener error aborts delivery and is returned.
    pub fn publish(&mut self, event: DomainEvent) -> Result<Vec<DomainEvent>> {
        let mut queue = VecDeque::from([event]);
        let mut emitted = Vec::new();
        let mut first = true;

        while let Some(current) = queue.pop_front() {
            if !first {
                emitted.push(current.clone());
            }
            first = false;

            for listener in self.listeners.iter_mut() {
                trace!(listener = listener.name(), event = current.kind(), "delivering event");
                let out = listener.on_event(&current)?;
                queue.extend(out);
            }
        }

        Ok(emitted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::errors::ApplinkError;

    /// Records what it saw and answers `BuildStarted` with a `BuildFinished`.
    struct Echo {
        name: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl EventListener for Echo {
        fn name(&self) -> &'static str {
            self.name
        }

        fn on_event(&mut self, event: &DomainEvent) -> Result<Vec<DomainEvent>> {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, event.kind()));
            match event {
                DomainEvent::BuildStarted { package_name } if self.name == "first" => {
                    Ok(vec![DomainEvent::BuildFinished {
                        package_name: package_name.clone(),
                        exit_code: 0,
                    }])
                }
                _ => Ok(Vec::new()),
            }
        }
    }

    struct Failing;

    impl EventListener for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn on_event(&mut self, _event: &DomainEvent) -> Result<Vec<DomainEvent>> {
            Err(ApplinkError::EventOrder("boom".into()))
        }
    }

    #[test]
    fn delivers_in_registration_order_and_queues_emitted_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(Echo { name: "first", seen: seen.clone() });
        bus.subscribe(Echo { name: "second", seen: seen.clone() });

        let emitted = bus
            .publish(DomainEvent::BuildStarted {
                package_name: "a".into(),
            })
            .unwrap();

        assert_eq!(
            emitted,
            vec![DomainEvent::BuildFinished {
                package_name: "a".into(),
                exit_code: 0
            }]
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "first:BuildStarted",
                "second:BuildStarted",
                "first:BuildFinished",
                "second:BuildFinished",
            ]
        );
    }

    #[test]
    fn listener_errors_abort_delivery() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(Failing);
        bus.subscribe(Echo { name: "after", seen: seen.clone() });

        let result = bus.publish(DomainEvent::ShutdownRequested);
        assert!(matches!(result, Err(ApplinkError::EventOrder(_))));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_bus_accepts_events() {
        let mut bus = EventBus::new();
        assert!(bus.publish(DomainEvent::ShutdownRequested).unwrap().is_empty());
    }
}
