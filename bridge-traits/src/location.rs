//! Image location metadata
//!
//! GPS data lives in EXIF blocks that may be missing, malformed, or not
//! readable on a given runtime. Readers report `Ok(None)` for "nothing there"
//! and reserve errors for I/O problems; callers treat both as a soft miss.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Decimal-degree coordinates. South and west are negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Coordinates within the valid lat/long range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Extracts GPS coordinates from an image file.
#[async_trait::async_trait]
pub trait LocationReader: Send + Sync {
    async fn read_location(&self, path: &Path) -> Result<Option<GeoLocation>>;
}
