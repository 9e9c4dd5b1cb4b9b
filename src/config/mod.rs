//! JSON configuration loading (spec.md §6). Field names are `PascalCase` to
//! match the wire format the original program and its operators already use.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::Path;

use serde::Deserialize;

use crate::cache::Policy;
use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// UDP bind endpoint for the resolver itself.
    #[serde(rename = "Address")]
    pub address: String,

    /// Ordered list of classic-UDP upstream endpoints, tried after DoH.
    #[serde(rename = "Servers", default)]
    pub servers: Vec<String>,

    /// Ordered list of DoH endpoint URLs, tried before UDP.
    #[serde(rename = "ServersHTTPS", default)]
    pub servers_https: Vec<String>,

    /// Bind address for the admin JSON API. Not part of the distilled spec's
    /// config table (which only documents `Server`/`Cache`/`CacheEntries`);
    /// added so the admin surface's port isn't hardcoded, the way the
    /// original Go program hardcodes `:8282`.
    #[serde(rename = "AdminAddress", default = "default_admin_address")]
    pub admin_address: String,

    /// Bind address for the operator-facing HTML view, mirroring the
    /// original's hardcoded `:8080`.
    #[serde(rename = "WebAddress", default = "default_web_address")]
    pub web_address: String,
}

fn default_admin_address() -> String {
    "127.0.0.1:8282".to_string()
}

fn default_web_address() -> String {
    "127.0.0.1:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Capacity ceiling; a non-positive value defaults to 1000.
    #[serde(rename = "MaxEntries")]
    pub max_entries: i64,

    /// Floor applied to non-zero upstream TTLs.
    #[serde(rename = "MinTTL", default)]
    pub min_ttl: u32,

    /// Sweeper period, in seconds.
    #[serde(rename = "FlushInterval")]
    pub flush_interval: u64,

    /// Must be `"default"` or `"keep-most-used"`.
    #[serde(rename = "Policy")]
    pub policy: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSeedEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Type")]
    pub rtype: String,
    #[serde(rename = "Ttl")]
    pub ttl: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "Server")]
    pub server: ServerConfig,
    #[serde(rename = "Cache")]
    pub cache: CacheConfig,
    #[serde(rename = "CacheEntries", default)]
    pub entries: Vec<CacheSeedEntry>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if Policy::parse(&self.cache.policy).is_none() {
            return Err(ConfigError::InvalidPolicy(self.cache.policy.clone()));
        }

        for entry in &self.entries {
            let valid = match entry.rtype.as_str() {
                "A" => entry.value.parse::<Ipv4Addr>().is_ok(),
                "AAAA" => entry.value.parse::<Ipv6Addr>().is_ok(),
                _ => false,
            };
            if !valid {
                return Err(ConfigError::InvalidSeedEntry {
                    key: entry.key.clone(),
                    reason: format!("type {:?} / value {:?} mismatch", entry.rtype, entry.value),
                });
            }
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .address
            .parse()
            .map_err(|_| ConfigError::InvalidSeedEntry {
                key: "Server.Address".to_string(),
                reason: format!("{:?} is not a socket address", self.server.address),
            })
    }
}
