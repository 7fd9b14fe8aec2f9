//! Monitoring of broadcast transactions.
//!
//! Keeps the pending set and the per-chain poll loops that confirm entries by
//! watching the sender's account sequence.

pub mod pending;

pub use pending::PendingTracker;
