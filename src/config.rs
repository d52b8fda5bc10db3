//! Server configuration.

use std::env;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8123;
pub const DEFAULT_CACHE_SIZE: usize = 10;

/// Runtime configuration, read from the environment with per-field
/// defaults. Unparseable values fall back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Number of loaded books kept in memory
    pub cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            host: env::var("READER3_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("READER3_PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_PORT),
            cache_size: env::var("READER3_CACHE_SIZE")
                .unwrap_or_else(|_| DEFAULT_CACHE_SIZE.to_string())
                .parse()
                .unwrap_or(DEFAULT_CACHE_SIZE),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
