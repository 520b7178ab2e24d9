use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

use crate::sampler::DEFAULT_RETENTION;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct KernelConfig {
    pub http: HttpConf,
    pub cors: CorsConf,
    pub sampler: SamplerConf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HttpConf {
    pub bind: String, // ex: "0.0.0.0:8080"
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CorsConf {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SamplerConf {
    pub interval_secs: u64,
    pub retention_secs: u64,
}

impl Default for HttpConf {
    fn default() -> Self {
        Self { bind: "0.0.0.0:8080".into() }
    }
}

impl Default for CorsConf {
    fn default() -> Self {
        // origine du dashboard React
        Self { allowed_origins: vec!["http://localhost:3001".into()] }
    }
}

impl Default for SamplerConf {
    fn default() -> Self {
        Self { interval_secs: 60, retention_secs: DEFAULT_RETENTION.as_secs() }
    }
}

impl SamplerConf {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs.max(1))
    }
}

pub fn parse_config(txt: &str) -> Result<KernelConfig, serde_yaml::Error> {
    if txt.trim().is_empty() {
        return Ok(KernelConfig::default());
    }
    serde_yaml::from_str(txt)
}

pub async fn load_config() -> KernelConfig {
    let path = std::env::var("NETPULSE_CONFIG").unwrap_or_else(|_| "netpulse.yaml".into());
    let mut cfg = if Path::new(&path).exists() {
        match fs::read_to_string(&path).await {
            Ok(txt) => parse_config(&txt).unwrap_or_else(|e| {
                tracing::warn!(%path, error = %e, "invalid config, using defaults");
                KernelConfig::default()
            }),
            Err(e) => {
                tracing::warn!(%path, error = %e, "unreadable config, using defaults");
                KernelConfig::default()
            }
        }
    } else {
        tracing::info!(%path, "no config file, using defaults");
        KernelConfig::default()
    };

    if let Ok(bind) = std::env::var("NETPULSE_BIND") {
        cfg.http.bind = bind;
    }
    cfg
}
