// ccsbridge-api: Async Rust client for the CCS 1000 D conference system HTTP API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod speakers;
pub mod transport;

pub use auth::SessionToken;
pub use client::DeviceClient;
pub use error::Error;
pub use models::Speaker;
pub use transport::TransportConfig;
