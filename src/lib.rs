pub mod admin;
pub mod cache;
pub mod config;
pub mod dns;
pub mod error;
pub mod resolver;
pub mod server;
pub mod transport;
pub mod web;

pub use error::{ConfigError, DnsCachedError, Result};
