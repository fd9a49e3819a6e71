pub mod client;

// Re-export the client for convenient access (e.g. `use crate::yahoo::YahooClient`).
pub use client::YahooClient;
