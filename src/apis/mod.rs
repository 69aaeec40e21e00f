//! External API clients

pub mod backend;
pub mod client;

pub use backend::{BackendApi, BackendClient};
