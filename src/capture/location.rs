//! Geolocation capability.

use crate::error::CaptureError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A one-shot position lookup. No pooling, one outstanding call per screen.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, CaptureError>;
}

/// Always reports the same position (manual entry, tests, fixed installs).
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn locate(&self) -> Result<Coordinates, CaptureError> {
        Ok(self.0)
    }
}

/// A source where the user refused location access.
pub struct DeniedLocation;

#[async_trait]
impl LocationSource for DeniedLocation {
    async fn locate(&self) -> Result<Coordinates, CaptureError> {
        Err(CaptureError::PermissionDenied)
    }
}
