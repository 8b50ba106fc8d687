//! Spatial reference strings
//!
//! [`SpatialReference`] is the string-producing service views use for their
//! Proj4 and WKT accessors. It understands `EPSG:<code>` input, WKT1 and
//! Proj4 strings for the codes in its catalog, and carries unknown WKT
//! through unchanged (with an empty Proj4 form).

mod catalog;
mod transform;
mod wkt;

pub use catalog::{CatalogEntry, CATALOG};
pub use transform::Transform;
pub use wkt::{WktItem, WktNode};

use crate::error::{Error, Result};

/// A parsed spatial reference, or the empty reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialReference {
    wkt: Option<WktNode>,
    proj4: String,
    epsg: Option<u32>,
}

impl SpatialReference {
    /// Reference with no coordinate system attached.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from user input: `EPSG:<code>`, WKT1 or a Proj4 string.
    /// Empty input yields the empty reference.
    pub fn from_user_input(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::empty());
        }

        if let Some(code) = strip_prefix_ignore_case(input, "EPSG:") {
            let code: u32 = code
                .trim()
                .parse()
                .map_err(|_| Error::SpatialReference(format!("bad EPSG code: {}", input)))?;
            return Self::from_epsg(code);
        }

        if input.starts_with('+') {
            let entry = catalog::find_by_proj4(input).ok_or_else(|| {
                Error::SpatialReference(format!("unsupported proj4 definition: {}", input))
            })?;
            return Self::from_epsg(entry.code);
        }

        let node = WktNode::parse(input)?;
        let epsg = node
            .authority()
            .filter(|(name, _)| name.eq_ignore_ascii_case("EPSG"))
            .and_then(|(_, code)| code.parse::<u32>().ok());
        let proj4 = epsg
            .and_then(catalog::find_by_code)
            .map(|entry| entry.proj4.to_string())
            .unwrap_or_default();
        Ok(Self {
            wkt: Some(node),
            proj4,
            epsg,
        })
    }

    pub fn from_epsg(code: u32) -> Result<Self> {
        let entry = catalog::find_by_code(code)
            .ok_or_else(|| Error::SpatialReference(format!("unknown EPSG code {}", code)))?;
        Ok(Self {
            wkt: Some(WktNode::parse(entry.wkt)?),
            proj4: entry.proj4.to_string(),
            epsg: Some(code),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.wkt.is_none()
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Proj4 definition, empty when unknown.
    pub fn proj4(&self) -> &str {
        &self.proj4
    }

    /// WKT1, either compact or pretty-printed. Empty for the empty reference.
    pub fn wkt(&self, pretty: bool) -> String {
        match &self.wkt {
            Some(node) if pretty => node.to_pretty(),
            Some(node) => node.to_compact(),
            None => String::new(),
        }
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .and_then(|_| s.get(prefix.len()..))
}
