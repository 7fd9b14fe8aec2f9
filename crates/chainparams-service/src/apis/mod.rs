//! Request and response types of the HTTP API.

pub mod error;
pub mod pending;
pub mod swap;

pub use error::APIError;
