//! Built-in EPSG definitions

/// One coordinate system known to the spatial reference service.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub code: u32,
    pub wkt: &'static str,
    pub proj4: &'static str,
}

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        code: 4326,
        wkt: concat!(
            "GEOGCS[\"WGS 84\",",
            "DATUM[\"WGS_1984\",",
            "SPHEROID[\"WGS 84\",6378137,298.257223563,AUTHORITY[\"EPSG\",\"7030\"]],",
            "AUTHORITY[\"EPSG\",\"6326\"]],",
            "PRIMEM[\"Greenwich\",0,AUTHORITY[\"EPSG\",\"8901\"]],",
            "UNIT[\"degree\",0.0174532925199433,AUTHORITY[\"EPSG\",\"9122\"]],",
            "AUTHORITY[\"EPSG\",\"4326\"]]"
        ),
        proj4: "+proj=longlat +datum=WGS84 +no_defs",
    },
    CatalogEntry {
        code: 3857,
        wkt: concat!(
            "PROJCS[\"WGS 84 / Pseudo-Mercator\",",
            "GEOGCS[\"WGS 84\",",
            "DATUM[\"WGS_1984\",",
            "SPHEROID[\"WGS 84\",6378137,298.257223563,AUTHORITY[\"EPSG\",\"7030\"]],",
            "AUTHORITY[\"EPSG\",\"6326\"]],",
            "PRIMEM[\"Greenwich\",0,AUTHORITY[\"EPSG\",\"8901\"]],",
            "UNIT[\"degree\",0.0174532925199433,AUTHORITY[\"EPSG\",\"9122\"]],",
            "AUTHORITY[\"EPSG\",\"4326\"]],",
            "PROJECTION[\"Mercator_1SP\"],",
            "PARAMETER[\"central_meridian\",0],",
            "PARAMETER[\"scale_factor\",1],",
            "PARAMETER[\"false_easting\",0],",
            "PARAMETER[\"false_northing\",0],",
            "UNIT[\"metre\",1,AUTHORITY[\"EPSG\",\"9001\"]],",
            "AXIS[\"Easting\",EAST],",
            "AXIS[\"Northing\",NORTH],",
            "AUTHORITY[\"EPSG\",\"3857\"]]"
        ),
        proj4: "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +wktext +no_defs",
    },
];

pub fn find_by_code(code: u32) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.code == code)
}

/// Match a Proj4 string against the catalog, ignoring term order and
/// repeated whitespace.
pub fn find_by_proj4(proj4: &str) -> Option<&'static CatalogEntry> {
    let wanted = normalize(proj4);
    CATALOG.iter().find(|entry| normalize(entry.proj4) == wanted)
}

fn normalize(proj4: &str) -> Vec<&str> {
    let mut terms: Vec<&str> = proj4.split_whitespace().collect();
    terms.sort_unstable();
    terms
}
