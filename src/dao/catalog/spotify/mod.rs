//! Spotify Web API implementation of the catalog gateway.

mod client;
pub mod config;
pub mod error;
mod models;

pub use client::SpotifyCatalog;
