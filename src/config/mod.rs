//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/ecobloom/config.toml

pub mod defaults;

use crate::constants::api::{DETECTION_URL, IP_API_URL, NOMINATIM_URL, NOMINATIM_USER_AGENT};
use crate::constants::location::{MAXIMUM_AGE_SECS, TIMEOUT_MS};
use crate::error::{Error, Result};
use crate::geo::nominatim::NominatimBackend;
use crate::geo::position::{PositionOptions, PositionSource};
use crate::geo::{GeocoderSource, OfflineGeocoder};
use crate::listings::rest::RestListingStore;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listing store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Reverse/forward geocoding
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Position acquisition
    #[serde(default)]
    pub location: LocationConfig,

    /// Search defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Material detection backend
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Listing store connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project base URL of the REST store
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Anonymous API key
    #[serde(default)]
    pub api_key: String,
}

/// Geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// If false, addresses always use the coordinate fallback
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Nominatim base URL
    #[serde(default = "default_nominatim_url")]
    pub url: String,

    /// Client identifier sent as User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Position acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Position provider: "ip" or "none"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// IP geolocation endpoint
    #[serde(default = "default_ip_api_url")]
    pub ip_api_url: String,

    /// Request the most accurate fix available
    #[serde(default = "default_true")]
    pub high_accuracy: bool,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum age of a reusable cached fix in seconds
    #[serde(default = "default_maximum_age_secs")]
    pub maximum_age_secs: u64,
}

/// Search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Radius in km used when searching around a location
    #[serde(default = "default_radius")]
    pub radius_km: f64,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,
}

/// Material detection backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_detection_url")]
    pub url: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions for serde
fn default_true() -> bool {
    true
}
fn default_store_url() -> String {
    DEFAULT_STORE_URL.to_string()
}
fn default_nominatim_url() -> String {
    NOMINATIM_URL.to_string()
}
fn default_user_agent() -> String {
    NOMINATIM_USER_AGENT.to_string()
}
fn default_provider() -> String {
    DEFAULT_POSITION_PROVIDER.to_string()
}
fn default_ip_api_url() -> String {
    IP_API_URL.to_string()
}
fn default_timeout_ms() -> u64 {
    TIMEOUT_MS
}
fn default_maximum_age_secs() -> u64 {
    MAXIMUM_AGE_SECS
}
fn default_radius() -> f64 {
    DEFAULT_RADIUS_KM
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_detection_url() -> String {
    DETECTION_URL.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            api_key: String::new(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_nominatim_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            ip_api_url: default_ip_api_url(),
            high_accuracy: true,
            timeout_ms: default_timeout_ms(),
            maximum_age_secs: default_maximum_age_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius(),
            format: default_format(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            url: default_detection_url(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist. Store credentials
    /// from the environment take precedence over the file.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            let config = Config::default();
            config.save_to(&path)?;
            config
        };

        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_STORE_URL) {
            self.store.url = url;
        }
        if let Ok(key) = std::env::var(ENV_STORE_KEY) {
            self.store.api_key = key;
        }
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["store", "url"] => Some(self.store.url.clone()),
            ["store", "api_key"] => Some(self.store.api_key.clone()),

            ["geocoding", "enabled"] => Some(self.geocoding.enabled.to_string()),
            ["geocoding", "url"] => Some(self.geocoding.url.clone()),
            ["geocoding", "user_agent"] => Some(self.geocoding.user_agent.clone()),

            ["location", "provider"] => Some(self.location.provider.clone()),
            ["location", "ip_api_url"] => Some(self.location.ip_api_url.clone()),
            ["location", "high_accuracy"] => Some(self.location.high_accuracy.to_string()),
            ["location", "timeout_ms"] => Some(self.location.timeout_ms.to_string()),
            ["location", "maximum_age_secs"] => Some(self.location.maximum_age_secs.to_string()),

            ["search", "radius_km"] => Some(self.search.radius_km.to_string()),
            ["search", "format"] => Some(self.search.format.clone()),

            ["detection", "url"] => Some(self.detection.url.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["store", "url"] => self.store.url = value.to_string(),
            ["store", "api_key"] => self.store.api_key = value.to_string(),

            ["geocoding", "enabled"] => self.geocoding.enabled = parse_value(key, value)?,
            ["geocoding", "url"] => self.geocoding.url = value.to_string(),
            ["geocoding", "user_agent"] => self.geocoding.user_agent = value.to_string(),

            ["location", "provider"] => match value {
                "ip" | "none" => self.location.provider = value.to_string(),
                _ => {
                    return Err(Error::Config(format!(
                        "Unknown position provider: {} (expected ip or none)",
                        value
                    )))
                }
            },
            ["location", "ip_api_url"] => self.location.ip_api_url = value.to_string(),
            ["location", "high_accuracy"] => self.location.high_accuracy = parse_value(key, value)?,
            ["location", "timeout_ms"] => self.location.timeout_ms = parse_value(key, value)?,
            ["location", "maximum_age_secs"] => {
                self.location.maximum_age_secs = parse_value(key, value)?
            }

            ["search", "radius_km"] => {
                let radius: f64 = parse_value(key, value)?;
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(Error::InvalidRadius(format!("Radius must be positive: {}", value)));
                }
                self.search.radius_km = radius;
            }
            ["search", "format"] => self.search.format = value.to_string(),

            ["detection", "url"] => self.detection.url = value.to_string(),

            ["server", "host"] => self.server.host = value.to_string(),
            ["server", "port"] => self.server.port = parse_value(key, value)?,

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "store.url",
            "store.api_key",
            "geocoding.enabled",
            "geocoding.url",
            "geocoding.user_agent",
            "location.provider",
            "location.ip_api_url",
            "location.high_accuracy",
            "location.timeout_ms",
            "location.maximum_age_secs",
            "search.radius_km",
            "search.format",
            "detection.url",
            "server.host",
            "server.port",
        ]
    }

    /// Position request options from the location section
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.location.high_accuracy,
            timeout: Duration::from_millis(self.location.timeout_ms),
            maximum_age: Duration::from_secs(self.location.maximum_age_secs),
        }
    }

    /// Position source named in the location section
    pub fn position_source(&self) -> PositionSource {
        PositionSource::from_name(&self.location.provider, &self.location.ip_api_url)
    }

    /// Nominatim backend from the geocoding section
    pub fn geocoder(&self) -> NominatimBackend {
        NominatimBackend::new()
            .with_base_url(&self.geocoding.url)
            .with_user_agent(&self.geocoding.user_agent)
    }

    /// Reverse geocoder; offline when geocoding is disabled
    pub fn reverse_geocoder(&self) -> GeocoderSource {
        if self.geocoding.enabled {
            GeocoderSource::Nominatim(self.geocoder())
        } else {
            GeocoderSource::Offline(OfflineGeocoder)
        }
    }

    /// REST listing store, if a store URL is configured
    pub fn listing_store(&self) -> Result<RestListingStore> {
        if self.store.url.trim().is_empty() {
            return Err(Error::Config(format!(
                "No listing store configured. Set store.url or {}",
                ENV_STORE_URL
            )));
        }
        Ok(RestListingStore::new(&self.store.url, &self.store.api_key))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.location.provider, "ip");
        assert_eq!(config.location.timeout_ms, 10_000);
        assert_eq!(config.location.maximum_age_secs, 300);
        assert_eq!(config.geocoding.user_agent, "EcoBloom/1.0");
        assert_eq!(config.search.radius_km, 10.0);
        assert_eq!(config.server.port, 7878);
    }

    #[test]
    fn test_position_options() {
        let mut config = Config::default();
        assert_eq!(config.position_options(), PositionOptions::default());

        config.set("location.timeout_ms", "2500").unwrap();
        config.set("location.high_accuracy", "false").unwrap();
        let options = config.position_options();
        assert_eq!(options.timeout, Duration::from_millis(2500));
        assert!(!options.high_accuracy);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("location.provider"), Some("ip".to_string()));

        config.set("location.provider", "none").unwrap();
        assert_eq!(config.get("location.provider"), Some("none".to_string()));

        config.set("search.radius_km", "25").unwrap();
        assert_eq!(config.get("search.radius_km"), Some("25".to_string()));
        assert_eq!(config.search.radius_km, 25.0);
    }

    #[test]
    fn test_every_key_is_readable() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "{} has no value", key);
        }
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
        assert!(config.set("location.timeout_ms", "soon").is_err());
        assert!(config.set("location.provider", "gps").is_err());
        assert!(matches!(
            config.set("search.radius_km", "-1"),
            Err(Error::InvalidRadius(_))
        ));
    }

    #[test]
    fn test_reverse_geocoder_follows_enabled_flag() {
        let mut config = Config::default();
        assert!(matches!(config.reverse_geocoder(), GeocoderSource::Nominatim(_)));

        config.set("geocoding.enabled", "false").unwrap();
        assert!(matches!(config.reverse_geocoder(), GeocoderSource::Offline(_)));
    }

    #[test]
    fn test_listing_store_requires_url() {
        let mut config = Config::default();
        assert!(matches!(config.listing_store(), Err(Error::Config(_))));

        config.set("store.url", "https://db.example.com").unwrap();
        assert!(config.listing_store().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.store.url = "https://db.example.com".to_string();
        config.search.radius_km = 50.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.store.url, "https://db.example.com");
        assert_eq!(loaded.search.radius_km, 50.0);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[location]\nprovider = \"none\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.location.provider, "none");
        assert_eq!(loaded.location.timeout_ms, 10_000);
        assert_eq!(loaded.server.port, 7878);
    }

    #[test]
    fn test_serialization_format() {
        let toml = toml::to_string_pretty(&Config::default()).unwrap();

        assert!(toml.contains("[store]"));
        assert!(toml.contains("[geocoding]"));
        assert!(toml.contains("[location]"));
        assert!(toml.contains("[server]"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:7878");
    }
}
