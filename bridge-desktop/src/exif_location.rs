//! GPS extraction from EXIF metadata

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    location::{GeoLocation, LocationReader},
};
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads GPS coordinates with `kamadak-exif`.
///
/// Files without an EXIF block, or with incomplete GPS tags, yield `Ok(None)`.
/// Decoding runs on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifLocationReader;

impl ExifLocationReader {
    pub fn new() -> Self {
        Self
    }

    fn read_blocking(path: &Path) -> Result<Option<GeoLocation>> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::Io(e)) => return Err(BridgeError::Io(e)),
            Err(e) => {
                debug!(error = %e, "No readable EXIF block");
                return Ok(None);
            }
        };

        Ok(location_from_exif(&exif))
    }
}

#[async_trait]
impl LocationReader for ExifLocationReader {
    async fn read_location(&self, path: &Path) -> Result<Option<GeoLocation>> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::read_blocking(&path))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("EXIF task failed: {}", e)))?
    }
}

fn location_from_exif(exif: &Exif) -> Option<GeoLocation> {
    let latitude = gps_coordinate(
        dms_components(exif, Tag::GPSLatitude)?,
        ascii_value(exif, Tag::GPSLatitudeRef).as_deref(),
    );
    let longitude = gps_coordinate(
        dms_components(exif, Tag::GPSLongitude)?,
        ascii_value(exif, Tag::GPSLongitudeRef).as_deref(),
    );

    Some(GeoLocation::new(latitude, longitude)).filter(GeoLocation::is_valid)
}

fn dms_components(exif: &Exif, tag: Tag) -> Option<[f64; 3]> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) if values.len() >= 3 => Some([
            values[0].to_f64(),
            values[1].to_f64(),
            values[2].to_f64(),
        ]),
        _ => None,
    }
}

fn ascii_value(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(values) => values
            .first()
            .and_then(|raw| std::str::from_utf8(raw).ok())
            .map(|s| s.trim_matches('\u{0}').trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Degrees/minutes/seconds to signed decimal degrees.
fn gps_coordinate(components: [f64; 3], reference: Option<&str>) -> f64 {
    let [degrees, minutes, seconds] = components;
    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;
    match reference.map(|r| r.trim().to_ascii_uppercase()) {
        Some(r) if r == "S" || r == "W" => -magnitude,
        _ => magnitude,
    }
}
