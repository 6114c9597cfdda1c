//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default listing store URL (empty: not configured)
pub const DEFAULT_STORE_URL: &str = "";

/// Default position provider
pub const DEFAULT_POSITION_PROVIDER: &str = "ip";

/// Default search radius in km
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Environment variable overriding the store URL
pub const ENV_STORE_URL: &str = "ECOBLOOM_STORE_URL";

/// Environment variable overriding the store API key
pub const ENV_STORE_KEY: &str = "ECOBLOOM_STORE_KEY";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "ecobloom";
