//! GeoSPARQL vocabulary: namespaces, literal datatypes and CRS URIs

/// GeoSPARQL ontology namespace
pub const GEO: &str = "http://www.opengis.net/ont/geosparql#";

/// GeoSPARQL function namespace
pub const GEOF: &str = "http://www.opengis.net/def/function/geosparql/";

/// Prefix conventionally bound to [`GEOF`]
pub const GEOF_PREFIX: &str = "geof";

/// XML Schema namespace
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// `geo:wktLiteral`
pub const WKT_LITERAL: &str = "http://www.opengis.net/ont/geosparql#wktLiteral";

/// `geo:gmlLiteral`
pub const GML_LITERAL: &str = "http://www.opengis.net/ont/geosparql#gmlLiteral";

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";

/// GML 3.2 namespace
pub const GML_NAMESPACE: &str = "http://www.opengis.net/gml/3.2";

/// Default CRS of GeoSPARQL literals (WGS84 with longitude first)
pub const DEFAULT_CRS: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

/// Prefix of EPSG CRS URIs
pub const EPSG_PREFIX: &str = "http://www.opengis.net/def/crs/EPSG/0/";

/// EPSG code of WGS84 geographic coordinates
pub const WGS84_EPSG: u32 = 4326;

/// EPSG code of the equal-area fallback (ETRS89 / LAEA Europe)
pub const EQUAL_AREA_EPSG: u32 = 3035;

/// Build the EPSG URI for `code`
pub fn epsg_uri(code: u32) -> String {
    format!("{EPSG_PREFIX}{code}")
}

/// Whether `uri` names WGS84 with longitude/latitude coordinates
pub fn is_wgs84_uri(uri: &str) -> bool {
    uri == DEFAULT_CRS || uri == epsg_uri(WGS84_EPSG) || uri == "EPSG:4326"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsg_uri() {
        assert_eq!(
            epsg_uri(32632),
            "http://www.opengis.net/def/crs/EPSG/0/32632"
        );
        assert!(is_wgs84_uri(DEFAULT_CRS));
        assert!(is_wgs84_uri(&epsg_uri(4326)));
        assert!(!is_wgs84_uri(&epsg_uri(3857)));
    }
}
