//! Configuration management

use anyhow::{Context, Result};

use crate::services::hos::RegulatoryConfig;
use crate::services::routing::OpenRouteServiceConfig;

pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";
pub const DEFAULT_ORS_URL: &str = "https://api.openrouteservice.org";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// OpenRouteService settings (None without an API key, falls back to mock distances)
    pub ors: Option<OpenRouteServiceConfig>,

    /// Hours-of-Service limits
    pub regulatory: RegulatoryConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| DEFAULT_NATS_URL.to_string());

        let ors = ors_config(
            std::env::var("ORS_URL").ok(),
            std::env::var("ORS_API_KEY").ok(),
            std::env::var("ORS_PROFILE").ok(),
        );

        let regulatory = RegulatoryConfig::from_env()
            .context("Invalid Hours-of-Service configuration")?;

        Ok(Self {
            nats_url,
            ors,
            regulatory,
        })
    }
}

/// OpenRouteService is only used when an API key is present.
fn ors_config(
    url: Option<String>,
    api_key: Option<String>,
    profile: Option<String>,
) -> Option<OpenRouteServiceConfig> {
    let api_key = api_key.filter(|key| !key.trim().is_empty())?;
    let url = url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ORS_URL.to_string());

    let config = OpenRouteServiceConfig::new(url, api_key);
    Some(match profile.filter(|p| !p.trim().is_empty()) {
        Some(profile) => config.with_profile(profile),
        None => config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ors_config_none_without_key() {
        assert!(ors_config(None, None, None).is_none());
        assert!(ors_config(Some("http://localhost:8080/ors".to_string()), Some("  ".to_string()), None).is_none());
    }

    #[test]
    fn test_ors_config_defaults_to_public_api() {
        let config = ors_config(None, Some("secret".to_string()), None).unwrap();
        assert_eq!(config.base_url, "https://api.openrouteservice.org");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.profile, "driving-car");
    }

    #[test]
    fn test_ors_config_uses_local_when_set() {
        let config = ors_config(
            Some("http://localhost:8080/ors".to_string()),
            Some("secret".to_string()),
            Some("driving-hgv".to_string()),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/ors");
        assert_eq!(config.profile, "driving-hgv");
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_nats_url_defaults_to_localhost() {
        std::env::remove_var("NATS_URL");

        let config = Config::from_env().unwrap();
        assert_eq!(config.nats_url, "nats://localhost:4222");
    }
}
