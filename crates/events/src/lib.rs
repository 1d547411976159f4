//! Outbound notifications and the pub/sub plumbing that carries them.
//!
//! The storefront publishes "view cart" and "checkout" signals to whatever
//! UI context encloses it. This crate only knows how to move messages; the
//! payload types live with the code that produces them.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
