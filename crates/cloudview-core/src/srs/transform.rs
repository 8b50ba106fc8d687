//! Coordinate transforms between catalog systems
//!
//! Only identity and the spherical Pseudo-Mercator pair are supported.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

use super::SpatialReference;
use crate::error::{Error, Result};

const SPHERE_RADIUS: f64 = 6_378_137.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Identity,
    /// EPSG:4326 degrees to EPSG:3857 metres.
    GeographicToMercator,
    /// EPSG:3857 metres to EPSG:4326 degrees.
    MercatorToGeographic,
}

impl Transform {
    pub fn between(from: &SpatialReference, to: &SpatialReference) -> Result<Transform> {
        if from.is_empty() {
            return Err(Error::SpatialReference(
                "source has no spatial reference".to_string(),
            ));
        }
        if from == to {
            return Ok(Transform::Identity);
        }
        match (from.epsg(), to.epsg()) {
            (Some(a), Some(b)) if a == b => Ok(Transform::Identity),
            (Some(4326), Some(3857)) => Ok(Transform::GeographicToMercator),
            (Some(3857), Some(4326)) => Ok(Transform::MercatorToGeographic),
            (a, b) => Err(Error::SpatialReference(format!(
                "no transform from {:?} to {:?}",
                a, b
            ))),
        }
    }

    /// Transform one horizontal coordinate pair.
    pub fn apply(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Transform::Identity => (x, y),
            Transform::GeographicToMercator => {
                let lon = x.to_radians();
                let lat = y.to_radians();
                (
                    SPHERE_RADIUS * lon,
                    SPHERE_RADIUS * (FRAC_PI_4 + lat / 2.0).tan().ln(),
                )
            }
            Transform::MercatorToGeographic => {
                let lon = x / SPHERE_RADIUS;
                let lat = 2.0 * (y / SPHERE_RADIUS).exp().atan() - FRAC_PI_2;
                (lon.to_degrees(), lat.to_degrees())
            }
        }
    }
}
