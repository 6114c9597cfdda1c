//! Position acquisition
//!
//! `PositionProvider` abstracts the host's geolocation capability. The
//! acquisition entry point applies the request policy (availability check,
//! timeout) so individual providers only report what went wrong.

use crate::constants::location::{MAXIMUM_AGE_SECS, TIMEOUT_MS};
use crate::coord::Coordinates;
use crate::error::LocationError;
use crate::geo::ip_location::IpLocator;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Options for a single position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Ask for the most precise fix the provider can give
    pub high_accuracy: bool,
    /// Upper bound on the whole request
    pub timeout: Duration,
    /// A cached fix younger than this may be returned without a new lookup
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(TIMEOUT_MS),
            maximum_age: Duration::from_secs(MAXIMUM_AGE_SECS),
        }
    }
}

/// Host geolocation capability
pub trait PositionProvider: Send + Sync {
    /// Whether this environment can produce a position at all
    fn is_available(&self) -> bool {
        true
    }

    /// Produce a single position fix
    ///
    /// May suspend for as long as the host needs (e.g. while a permission
    /// prompt is open). `get_current_position` bounds it with the timeout.
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
}

/// Get the current position from `provider`
///
/// Fails with `UnsupportedEnvironment` without calling the provider when it
/// is unavailable, and with `Timeout` once `options.timeout` elapses. No
/// retries: callers decide whether to ask again.
pub async fn get_current_position<P>(
    provider: &P,
    options: &PositionOptions,
) -> Result<Coordinates, LocationError>
where
    P: PositionProvider,
{
    if !provider.is_available() {
        return Err(LocationError::UnsupportedEnvironment);
    }

    let coords = tokio::time::timeout(options.timeout, provider.current_position(options))
        .await
        .map_err(|_| {
            warn!("Position request exceeded {:?}", options.timeout);
            LocationError::Timeout
        })??;

    debug!("Acquired position {}", coords);
    Ok(coords)
}

/// Provider that always answers with the same coordinates
///
/// Backs `locate --at` and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedPositionProvider {
    coords: Coordinates,
}

impl FixedPositionProvider {
    pub fn new(coords: Coordinates) -> Self {
        Self { coords }
    }
}

impl PositionProvider for FixedPositionProvider {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, LocationError> {
        Ok(self.coords)
    }
}

/// Provider that always fails with the same error
#[derive(Debug, Clone)]
pub struct FailingPositionProvider {
    error: LocationError,
}

impl FailingPositionProvider {
    pub fn new(error: LocationError) -> Self {
        Self { error }
    }
}

impl PositionProvider for FailingPositionProvider {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, LocationError> {
        Err(self.error.clone())
    }
}

/// Stand-in for an environment without any geolocation capability
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPositionProvider;

impl PositionProvider for NoPositionProvider {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, LocationError> {
        Err(LocationError::UnsupportedEnvironment)
    }
}

/// Position source selected at runtime (CLI flags, config)
#[derive(Debug)]
pub enum PositionSource {
    Fixed(FixedPositionProvider),
    Ip(IpLocator),
    Unsupported,
}

impl PositionSource {
    /// Pick a source from a provider name in the config
    ///
    /// `"ip"` uses IP geolocation, `"none"` disables acquisition.
    pub fn from_name(name: &str, ip_api_url: &str) -> Self {
        match name.to_lowercase().as_str() {
            "ip" => Self::Ip(IpLocator::new().with_base_url(ip_api_url)),
            _ => Self::Unsupported,
        }
    }
}

impl PositionProvider for PositionSource {
    fn is_available(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, LocationError> {
        match self {
            Self::Fixed(p) => p.current_position(options).await,
            Self::Ip(p) => p.current_position(options).await,
            Self::Unsupported => Err(LocationError::UnsupportedEnvironment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Never answers, like a permission prompt nobody clicks
    struct PendingProvider;

    impl PositionProvider for PendingProvider {
        async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, LocationError> {
            std::future::pending().await
        }
    }

    /// Counts calls to check the unavailable path never reaches it
    struct CountingUnavailable(AtomicUsize);

    impl PositionProvider for CountingUnavailable {
        fn is_available(&self) -> bool {
            false
        }

        async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, LocationError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Coordinates::new(0.0, 0.0))
        }
    }

    #[test]
    fn test_default_options() {
        let options = PositionOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_fixed_provider() {
        let provider = FixedPositionProvider::new(Coordinates::new(1.5, 2.5));
        let coords = get_current_position(&provider, &PositionOptions::default()).await.unwrap();
        assert_eq!(coords, Coordinates::new(1.5, 2.5));
    }

    #[tokio::test]
    async fn test_error_kinds_propagate_verbatim() {
        for error in [
            LocationError::PermissionDenied,
            LocationError::PositionUnavailable,
            LocationError::Timeout,
            LocationError::Other("sensor offline".to_string()),
        ] {
            let provider = FailingPositionProvider::new(error.clone());
            let result = get_current_position(&provider, &PositionOptions::default()).await;
            assert_eq!(result, Err(error));
        }
    }

    #[tokio::test]
    async fn test_unavailable_fails_without_calling_provider() {
        let provider = CountingUnavailable(AtomicUsize::new(0));
        let result = get_current_position(&provider, &PositionOptions::default()).await;

        assert_eq!(result, Err(LocationError::UnsupportedEnvironment));
        assert_eq!(provider.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_pending_provider() {
        let options = PositionOptions {
            timeout: Duration::from_millis(10_000),
            ..PositionOptions::default()
        };
        let result = get_current_position(&PendingProvider, &options).await;
        assert_eq!(result, Err(LocationError::Timeout));
    }

    #[test]
    fn test_source_from_name() {
        assert!(matches!(PositionSource::from_name("ip", "http://localhost"), PositionSource::Ip(_)));
        assert!(matches!(PositionSource::from_name("IP", "http://localhost"), PositionSource::Ip(_)));
        assert!(matches!(PositionSource::from_name("none", "http://localhost"), PositionSource::Unsupported));
        assert!(!PositionSource::Unsupported.is_available());
    }
}
