//! Planar reference frames for metric computation
//!
//! Geometries are stored in WGS84 and projected to either a UTM zone or a
//! single equal-area frame (ETRS89 / LAEA Europe, EPSG:3035) before any
//! distance, length, area or buffer is computed.

pub mod projector;
pub mod selector;

pub use projector::GeometryProjector;
pub use selector::{select_crs, select_crs_for_geometries, select_crs_for_geometry, utm_zone};

use crate::vocabulary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// PROJ.4 definition of WGS84 longitude/latitude
pub(crate) const WGS84_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// PROJ.4 definition of the equal-area fallback (EPSG:3035)
const EQUAL_AREA_PROJ: &str = "+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 \
     +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// Planar CRS chosen for a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsDescriptor {
    /// Universal Transverse Mercator zone 1..=60
    Utm { zone: u8, north: bool },
    /// Fixed wide-area projection for geometries spanning several zones
    ///
    /// ETRS89 / LAEA Europe is centred on 52°N 10°E. Areas stay exact
    /// everywhere, but distances and lengths grow less accurate the farther
    /// the geometry lies from Europe. Between Sydney and Auckland the error
    /// is roughly a factor of three.
    EqualAreaFallback,
}

impl CrsDescriptor {
    /// EPSG code: 326zz / 327zz for WGS84 UTM, 3035 for the fallback
    ///
    /// # Examples
    ///
    /// ```
    /// use oxirs_geospatial::projection::CrsDescriptor;
    ///
    /// assert_eq!(CrsDescriptor::Utm { zone: 32, north: true }.epsg_code(), 32632);
    /// assert_eq!(CrsDescriptor::Utm { zone: 5, north: false }.epsg_code(), 32705);
    /// assert_eq!(CrsDescriptor::EqualAreaFallback.epsg_code(), 3035);
    /// ```
    pub fn epsg_code(&self) -> u32 {
        match *self {
            CrsDescriptor::Utm { zone, north: true } => 32600 + u32::from(zone),
            CrsDescriptor::Utm { zone, north: false } => 32700 + u32::from(zone),
            CrsDescriptor::EqualAreaFallback => vocabulary::EQUAL_AREA_EPSG,
        }
    }

    /// EPSG URI, as rendered by `geof:getSRID`
    pub fn uri(&self) -> String {
        vocabulary::epsg_uri(self.epsg_code())
    }

    /// PROJ.4 definition handed to the projection library
    pub fn proj_string(&self) -> String {
        match *self {
            CrsDescriptor::Utm { zone, north } => {
                let south = if north { "" } else { " +south" };
                format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs")
            }
            CrsDescriptor::EqualAreaFallback => EQUAL_AREA_PROJ.to_string(),
        }
    }
}

impl fmt::Display for CrsDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsDescriptor::Utm { zone, north: true } => write!(f, "UTM {zone}N"),
            CrsDescriptor::Utm { zone, north: false } => write!(f, "UTM {zone}S"),
            CrsDescriptor::EqualAreaFallback => write!(f, "EPSG:{}", vocabulary::EQUAL_AREA_EPSG),
        }
    }
}
