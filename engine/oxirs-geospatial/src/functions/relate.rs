//! DE-9IM relate
//!
//! A pattern is nine characters over `T F * 0 1 2`, read row by row over
//! interior, boundary and exterior of the first geometry against those of
//! the second.

use crate::error::{Result, SpatialError};
use crate::geometry::Geometry;
use geo::algorithm::relate::{IntersectionMatrix, Relate};

/// Check that `pattern` is a well-formed DE-9IM pattern
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::functions::relate::validate_pattern;
///
/// assert!(validate_pattern("T*F**FFF*").is_ok());
/// assert!(validate_pattern("TTX******").is_err());
/// assert!(validate_pattern("T*F").is_err());
/// ```
pub fn validate_pattern(pattern: &str) -> Result<()> {
    let valid = pattern.chars().count() == 9
        && pattern
            .chars()
            .all(|c| matches!(c, 'T' | 'F' | '*' | '0' | '1' | '2'));
    if valid {
        Ok(())
    } else {
        Err(SpatialError::InvalidPattern(pattern.to_string()))
    }
}

/// Intersection matrix of two geometries in the same frame
pub fn relate(geom1: &Geometry, geom2: &Geometry) -> Result<IntersectionMatrix> {
    geom1.validate_crs_compatibility(geom2)?;
    Ok(geom1.geom.relate(&geom2.geom))
}

/// Whether the intersection matrix of two geometries matches `pattern`
///
/// # Examples
///
/// ```
/// use oxirs_geospatial::geometry::Geometry;
/// use oxirs_geospatial::functions::relate::relate_pattern;
///
/// let outer = Geometry::from_wkt("POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))").unwrap();
/// let inner = Geometry::from_wkt("POLYGON((1 1, 2 1, 2 2, 1 2, 1 1))").unwrap();
///
/// // Contains
/// assert!(relate_pattern(&outer, &inner, "T*****FF*").unwrap());
/// ```
pub fn relate_pattern(geom1: &Geometry, geom2: &Geometry, pattern: &str) -> Result<bool> {
    validate_pattern(pattern)?;
    let matrix = relate(geom1, geom2)?;
    matrix
        .matches(pattern)
        .map_err(|_| SpatialError::InvalidPattern(pattern.to_string()))
}

/// Whether the matrix matches at least one of `patterns`
pub fn relate_any(geom1: &Geometry, geom2: &Geometry, patterns: &[&str]) -> Result<bool> {
    let matrix = relate(geom1, geom2)?;
    for pattern in patterns {
        let matched = matrix
            .matches(pattern)
            .map_err(|_| SpatialError::InvalidPattern(pattern.to_string()))?;
        if matched {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_validation() {
        assert!(validate_pattern("TFFFTFFFT").is_ok());
        assert!(validate_pattern("012012012").is_ok());
        assert!(matches!(
            validate_pattern("tffftffft"),
            Err(SpatialError::InvalidPattern(_))
        ));
        assert!(validate_pattern("TFFFTFFFTT").is_err());
        assert!(validate_pattern("").is_err());
    }

    #[test]
    fn test_relate_patterns() {
        let a = Geometry::from_wkt("POLYGON((0 0, 3 0, 3 3, 0 3, 0 0))").unwrap();
        let b = Geometry::from_wkt("POLYGON((2 2, 5 2, 5 5, 2 5, 2 2))").unwrap();

        assert!(relate_pattern(&a, &b, "T*T***T**").unwrap());
        assert!(!relate_pattern(&a, &b, "FF*FF****").unwrap());
        assert!(relate_pattern(&a, &b, "212101212").unwrap());
    }

    #[test]
    fn test_relate_any() {
        let a = Geometry::from_wkt("POINT(0 0)").unwrap();
        let b = Geometry::from_wkt("LINESTRING(0 0, 1 1)").unwrap();

        // Point on the line's endpoint: interior meets the line's boundary
        assert!(relate_any(&a, &b, &["T********", "FT*******"]).unwrap());
        assert!(!relate_any(&a, &b, &["T********"]).unwrap());
    }
}
