// userdeck-api: Async Rust client for the users/profiles REST API

pub mod client;
pub mod error;
pub mod transport;
pub mod types;
mod users;

pub use client::ApiClient;
pub use error::Error;
pub use transport::TransportConfig;
