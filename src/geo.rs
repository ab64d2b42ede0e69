use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

/// A point on the globe, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolves a ZIP code to its centroid. An injected capability: the core never
/// talks to a geocoding provider directly.
pub trait Geocoder: Send + Sync {
    fn locate(&self, zip: &str) -> Option<GeoPoint>;
}

/// Great-circle distance in miles.
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    const EARTH_RADIUS_MILES: f64 = 3958.8;
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// ZIP → centroid lookup table loaded from a `zip,latitude,longitude` CSV.
pub struct ZipTable {
    centroids: HashMap<String, GeoPoint>,
}

impl ZipTable {
    pub fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ZIP table at {}", path.display()))?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Result<Self, anyhow::Error> {
        let mut centroids = HashMap::new();
        for (number, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split(',');
            let (Some(zip), Some(lat), Some(lon)) =
                (fields.next(), fields.next(), fields.next())
            else {
                anyhow::bail!("Malformed ZIP table line {}", number + 1);
            };
            let point = GeoPoint {
                latitude: lat
                    .trim()
                    .parse()
                    .with_context(|| format!("Bad latitude on line {}", number + 1))?,
                longitude: lon
                    .trim()
                    .parse()
                    .with_context(|| format!("Bad longitude on line {}", number + 1))?,
            };
            centroids.insert(zip.trim().to_string(), point);
        }
        Ok(Self { centroids })
    }
}

impl Geocoder for ZipTable {
    fn locate(&self, zip: &str) -> Option<GeoPoint> {
        self.centroids.get(zip).copied()
    }
}
