use crate::model::GeoPosition;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GeoError {
    #[error("geolocation is not supported on this device")]
    Unsupported,
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
}

/// The device's location capability.
pub trait GeolocationHost {
    fn current_position(&self) -> impl Future<Output = Result<GeoPosition, GeoError>>;
}

/// Host that always answers with a configured position, or
/// `PositionUnavailable` when none is configured.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FixedPosition(pub Option<GeoPosition>);

impl GeolocationHost for FixedPosition {
    async fn current_position(&self) -> Result<GeoPosition, GeoError> {
        self.0.ok_or(GeoError::PositionUnavailable)
    }
}

/// Wraps an optional host; a probe without one is unsupported.
#[derive(Clone, Debug)]
pub struct GeolocationProbe<H> {
    host: Option<H>,
}

impl<H: GeolocationHost> GeolocationProbe<H> {
    pub fn new(host: H) -> Self {
        Self { host: Some(host) }
    }

    pub fn unsupported() -> Self {
        Self { host: None }
    }

    pub fn is_supported(&self) -> bool {
        self.host.is_some()
    }

    /// One position per call. Non-finite readings count as unavailable.
    pub async fn capture(&self) -> Result<GeoPosition, GeoError> {
        let Some(host) = &self.host else {
            return Err(GeoError::Unsupported);
        };

        let position = host.current_position().await?;
        if !position.latitude.is_finite() || !position.longitude.is_finite() {
            debug!(?position, "discarding non-finite position");
            return Err(GeoError::PositionUnavailable);
        }
        Ok(position)
    }
}
