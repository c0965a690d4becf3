use crate::backend::RoomLimits;
use crate::catalog::Catalog;
use crate::room::SessionConfig;
use crate::speaker::{SpeakerArbiter, SpeakerError, CAPACITY, DEFAULT_THRESHOLD};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub channel: ChannelConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub speaker: SpeakerConfig,
    #[serde(default)]
    pub catalog: Catalog,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    #[serde(default)]
    pub rooms: RoomLimits,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the REST backend (e.g. "http://localhost:8000")
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Deserialize)]
pub struct ChannelConfig {
    pub nats_url: String,
    /// Prefix of every channel subject
    pub subject_prefix: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SpeakerConfig {
    pub capacity: usize,
    pub threshold: u32,
}

impl SpeakerConfig {
    pub fn arbiter(&self) -> Result<SpeakerArbiter, SpeakerError> {
        SpeakerArbiter::with_threshold(self.capacity, self.threshold)
    }
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            capacity: CAPACITY,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Config {
    /// Load `path` (any format the config crate recognises by extension),
    /// then apply `BABEL__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("BABEL").separator("__"))
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.speaker.arbiter().context("Invalid [speaker] section")?;

        Ok(cfg)
    }
}
