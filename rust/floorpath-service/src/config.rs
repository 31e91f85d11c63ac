use std::env;
use std::path::PathBuf;

use anyhow::Context;
use floorpath_core::RoutingOptions;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub venue_path: Option<PathBuf>,
    pub options: RoutingOptions,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("FLOORPATH_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("FLOORPATH_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        let venue_path = env::var("FLOORPATH_VENUE").ok().map(PathBuf::from);
        let options = match env::var("FLOORPATH_OPTIONS") {
            Ok(raw) => parse_options(&raw)?,
            Err(_) => RoutingOptions::default(),
        };

        Ok(Self {
            host,
            port,
            venue_path,
            options,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Partial JSON object; unnamed fields keep their defaults.
pub fn parse_options(raw: &str) -> anyhow::Result<RoutingOptions> {
    let value: serde_json::Value = serde_json::from_str(raw).context("FLOORPATH_OPTIONS is not valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("FLOORPATH_OPTIONS must be a JSON object");
    }
    serde_json::from_value(value).context("FLOORPATH_OPTIONS is not a valid routing options object")
}
