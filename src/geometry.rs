use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{MapError, Result};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

/// A polygon as lon/lat rings in degrees; the first ring is the exterior.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Vec<[f64; 2]>>,
}

impl Polygon {
    pub fn exterior(&self) -> &[[f64; 2]] {
        self.rings.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountryShape {
    pub polygons: Vec<Polygon>,
}

impl CountryShape {
    /// Centroid of the largest exterior ring, used to anchor bubbles.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        self.polygons
            .iter()
            .map(|polygon| polygon.exterior())
            .filter(|ring| !ring.is_empty())
            .map(|ring| (signed_area(ring).abs(), ring))
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, ring)| ring_centroid(ring))
    }
}

fn signed_area(ring: &[[f64; 2]]) -> f64 {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a[0] * b[1] - b[0] * a[1])
        .sum::<f64>()
        / 2.0
}

fn ring_centroid(ring: &[[f64; 2]]) -> (f64, f64) {
    let area = signed_area(ring);
    if area.abs() < 1e-12 {
        // degenerate ring, fall back to the vertex mean
        let n = ring.len() as f64;
        let (sx, sy) = ring.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
        return (sx / n, sy / n);
    }
    let (cx, cy) = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .fold((0.0, 0.0), |(cx, cy), (a, b)| {
            let cross = a[0] * b[1] - b[0] * a[1];
            (cx + (a[0] + b[0]) * cross, cy + (a[1] + b[1]) * cross)
        });
    (cx / (6.0 * area), cy / (6.0 * area))
}

/// Country borders keyed by ISO-3 code. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct BorderGeometry {
    shapes: BTreeMap<String, CountryShape>,
}

impl BorderGeometry {
    pub fn load(path: &Path, feature_key: &str) -> Result<BorderGeometry> {
        let text = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let geometry = Self::from_geojson_str(&text, feature_key).map_err(|source| MapError::Geometry {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), countries = geometry.len(), "loaded border geometry");
        Ok(geometry)
    }

    /// Parse a GeoJSON FeatureCollection. Each feature is keyed by the string
    /// property `feature_key`, or by its `id` when that property is absent.
    /// Features sharing a key are merged.
    pub fn from_geojson_str(text: &str, feature_key: &str) -> serde_json::Result<BorderGeometry> {
        let collection: FeatureCollection = serde_json::from_str(text)?;
        let mut shapes: BTreeMap<String, CountryShape> = BTreeMap::new();

        for feature in collection.features {
            let key = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(feature_key))
                .or(feature.id.as_ref())
                .and_then(Value::as_str)
                .map(str::to_string);
            let Some(key) = key else {
                debug!("skipping feature without `{feature_key}`");
                continue;
            };

            let polygons = match feature.geometry {
                Some(RawGeometry::Polygon { coordinates }) => vec![to_polygon(coordinates)],
                Some(RawGeometry::MultiPolygon { coordinates }) => {
                    coordinates.into_iter().map(to_polygon).collect()
                }
                Some(RawGeometry::Unsupported) | None => Vec::new(),
            };
            shapes.entry(key).or_default().polygons.extend(polygons);
        }

        Ok(BorderGeometry { shapes })
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&CountryShape> {
        self.shapes.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.shapes.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CountryShape)> {
        self.shapes.iter().map(|(code, shape)| (code.as_str(), shape))
    }
}

// Positions may carry an altitude; only lon/lat are kept.
fn to_polygon(rings: Vec<Vec<Vec<f64>>>) -> Polygon {
    Polygon {
        rings: rings
            .into_iter()
            .map(|ring| {
                ring.into_iter()
                    .filter(|position| position.len() >= 2)
                    .map(|position| [position[0], position[1]])
                    .collect()
            })
            .collect(),
    }
}
