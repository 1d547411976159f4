//! `orderdesk-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns),
//! plus the small settings helpers every crate shares.

pub mod config;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use config::ConfigError;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{OrderId, OrderLineId, ProductId};
pub use money::Money;
pub use value_object::ValueObject;
