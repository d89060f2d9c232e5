use serde::Deserialize;
use std::collections::HashMap;
use std::env;

use cartoffer_core::UserId;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub segments: SegmentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            redis_url: default_redis_url(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SegmentSource {
    #[default]
    Memory,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SegmentConfig {
    #[serde(default)]
    pub source: SegmentSource,
    #[serde(default = "default_segment_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: usize,
    #[serde(default = "default_reset_timeout")]
    pub reset_timeout_seconds: u64,
    /// user id -> segment, loaded into the in-memory directory at startup
    #[serde(default)]
    pub seed: HashMap<String, String>,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            source: SegmentSource::Memory,
            base_url: default_segment_url(),
            timeout_ms: default_timeout_ms(),
            failure_threshold: default_failure_threshold(),
            reset_timeout_seconds: default_reset_timeout(),
            seed: HashMap::new(),
        }
    }
}

fn default_segment_url() -> String {
    "http://localhost:1080".to_string()
}
fn default_timeout_ms() -> u64 { 2000 }
fn default_failure_threshold() -> usize { 5 }
fn default_reset_timeout() -> u64 { 30 }

impl SegmentConfig {
    /// Seed entries with parsed user ids.
    pub fn seed_entries(&self) -> Result<Vec<(UserId, String)>, config::ConfigError> {
        self.seed
            .iter()
            .map(|(user, segment)| {
                user.trim()
                    .parse::<UserId>()
                    .map(|id| (id, segment.clone()))
                    .map_err(|_| {
                        config::ConfigError::Message(format!(
                            "segments.seed key '{}' is not a user id",
                            user
                        ))
                    })
            })
            .collect()
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `CARTOFFER__SERVER__PORT=9001` would set `server.port`
            .add_source(config::Environment::with_prefix("CARTOFFER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
