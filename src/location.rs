//! Device geolocation acquisition.

use async_trait::async_trait;

use crate::error::{Error, Result};

/// A coordinate pair as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Seam over the platform location services.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Ask for foreground location permission. `true` means granted.
    async fn request_permission(&self) -> bool;

    /// The device's current position. Only meaningful after permission was
    /// granted.
    async fn current_position(&self) -> Result<Position>;

    /// Permission check followed by a position read, with the denial mapped
    /// to the standard failure.
    async fn acquire(&self) -> Result<Position> {
        if !self.request_permission().await {
            return Err(Error::location("Permission to access location was denied"));
        }
        self.current_position().await
    }
}

/// A provider that always reports one position. Used by the CLI, where the
/// coordinates come from flags rather than hardware.
pub struct FixedLocation(pub Position);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn request_permission(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Position> {
        Ok(self.0)
    }
}
