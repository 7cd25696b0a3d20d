// src/bus/mod.rs

//! Typed domain events and the synchronous publish/subscribe bus that carries
//! them.
//!
//! - [`events`] defines [`DomainEvent`], one variant per event kind.
//! - [`event_bus`] holds [`EventBus`] and the [`EventListener`] trait.

pub mod event_bus;
pub mod events;

pub use event_bus::{EventBus, EventListener};
pub use events::{DomainEvent, PackageChange};
