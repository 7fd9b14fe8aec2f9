//! Core engine for chain-parameter resolution and pending-transaction tracking.
//!
//! The engine ties the per-family chain adapters to the shared parameter cache
//! and runs one cancellable poll loop per chain with transactions awaiting
//! confirmation. Callers build it with [`EngineBuilder`] and interact only with
//! [`ChainParamsEngine`].

pub mod builder;
pub mod engine;
pub mod monitoring;
pub mod registry;
pub mod resolver;

pub use builder::{BuilderError, EngineBuilder};
pub use engine::{event_bus::EventBus, ChainParamsEngine};
pub use monitoring::PendingTracker;
pub use registry::AdapterRegistry;
pub use resolver::ParamsResolver;

#[cfg(test)]
pub(crate) mod test_support;
