//! `orderdesk-runtime`: an in-process host for the domain crates.
//!
//! Plays the part of the external platform: it owns an in-memory store,
//! drives the record change pipeline around each write (before phase,
//! persist, after phase, apply), and serves product queries to storefront
//! sessions.

pub mod config;
pub mod dispatcher;
pub mod store;

pub use config::RuntimeConfig;
pub use dispatcher::{DmlResult, LineChange, TriggerDispatcher};
pub use store::{InMemoryOrderStore, StoreError};
