//! Registered feature geometries
//!
//! Every entity owns at most one default geometry and any number of
//! secondary geometries. Each is stored as a [`GeometryPair`]: the WGS84
//! source together with its planar projection. The registry only grows;
//! inserting under an existing default is a no-op.

use crate::geometry::Geometry;
use crate::projection::CrsDescriptor;
use indexmap::IndexMap;
use tracing::debug;

/// A WGS84 geometry and its planar projection
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryPair {
    wgs84: Geometry,
    projected: Geometry,
    crs: CrsDescriptor,
}

impl GeometryPair {
    /// Assemble a pair; callers go through
    /// [`GeometryProjector::pair`](crate::projection::GeometryProjector::pair)
    pub(crate) fn from_parts(wgs84: Geometry, projected: Geometry, crs: CrsDescriptor) -> Self {
        Self {
            wgs84,
            projected,
            crs,
        }
    }

    pub fn wgs84(&self) -> &Geometry {
        &self.wgs84
    }

    pub fn projected(&self) -> &Geometry {
        &self.projected
    }

    pub fn crs(&self) -> CrsDescriptor {
        self.crs
    }
}

/// Role of a geometry within its feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryRole {
    /// The feature's authoritative shape
    Default,
    /// An additional shape of the same feature
    Secondary,
}

/// Geometries registered for one entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureGeometrySet {
    default: Option<GeometryPair>,
    secondaries: Vec<GeometryPair>,
}

impl FeatureGeometrySet {
    pub fn default_geometry(&self) -> Option<&GeometryPair> {
        self.default.as_ref()
    }

    pub fn secondaries(&self) -> &[GeometryPair] {
        &self.secondaries
    }

    /// Default first, then secondaries in declaration order
    pub fn all(&self) -> impl Iterator<Item = &GeometryPair> {
        self.default.iter().chain(self.secondaries.iter())
    }

    /// The default geometry, or the first secondary when there is none
    pub fn primary(&self) -> Option<&GeometryPair> {
        self.default.as_ref().or_else(|| self.secondaries.first())
    }

    pub fn len(&self) -> usize {
        usize::from(self.default.is_some()) + self.secondaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.secondaries.is_empty()
    }
}

/// Mapping from entity identifier to its registered geometries
///
/// Iteration follows first-declaration order.
#[derive(Debug, Clone, Default)]
pub struct SpatialFeatureRegistry {
    features: IndexMap<String, FeatureGeometrySet>,
}

impl SpatialFeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a geometry unless it is already present
    ///
    /// A default is dropped when the entity already has one. A secondary is
    /// dropped only when an identical pair is already registered. Returns
    /// whether the registry changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use oxirs_geospatial::geometry::Geometry;
    /// use oxirs_geospatial::projection::GeometryProjector;
    /// use oxirs_geospatial::registry::{GeometryRole, SpatialFeatureRegistry};
    ///
    /// let projector = GeometryProjector::default();
    /// let mut registry = SpatialFeatureRegistry::new();
    ///
    /// let first = projector.pair(Geometry::from_wkt("POINT(9.18854 45.464664)").unwrap()).unwrap();
    /// let second = projector.pair(Geometry::from_wkt("POINT(9.2 45.5)").unwrap()).unwrap();
    ///
    /// assert!(registry.insert_if_absent("milan", first.clone(), GeometryRole::Default));
    /// assert!(!registry.insert_if_absent("milan", second, GeometryRole::Default));
    /// assert_eq!(registry.default_of("milan"), Some(&first));
    /// ```
    pub fn insert_if_absent(&mut self, id: &str, pair: GeometryPair, role: GeometryRole) -> bool {
        let set = self.features.entry(id.to_string()).or_default();

        match role {
            GeometryRole::Default if set.default.is_some() => {
                debug!(entity = id, "Default geometry already declared, ignoring");
                false
            }
            GeometryRole::Default => {
                set.default = Some(pair);
                true
            }
            GeometryRole::Secondary if set.secondaries.contains(&pair) => {
                debug!(entity = id, "Identical secondary geometry already declared");
                false
            }
            GeometryRole::Secondary => {
                set.secondaries.push(pair);
                true
            }
        }
    }

    pub fn default_of(&self, id: &str) -> Option<&GeometryPair> {
        self.features.get(id).and_then(|set| set.default.as_ref())
    }

    /// Secondary geometries of an entity; empty when unknown
    pub fn secondaries_of(&self, id: &str) -> &[GeometryPair] {
        self.features
            .get(id)
            .map(|set| set.secondaries.as_slice())
            .unwrap_or_default()
    }

    /// All geometries of an entity, `None` when it has none
    pub fn geometries_of(&self, id: &str) -> Option<&FeatureGeometrySet> {
        self.features.get(id).filter(|set| !set.is_empty())
    }

    /// Every registered geometry of every entity, flattened
    pub fn all_with_geometry(&self) -> impl Iterator<Item = (&str, &GeometryPair)> {
        self.features
            .iter()
            .flat_map(|(id, set)| set.all().map(move |pair| (id.as_str(), pair)))
    }

    /// The default-or-first geometry of every entity
    pub fn primaries(&self) -> impl Iterator<Item = (&str, &GeometryPair)> {
        self.features
            .iter()
            .filter_map(|(id, set)| set.primary().map(|pair| (id.as_str(), pair)))
    }

    /// Number of entities with at least one geometry
    pub fn len(&self) -> usize {
        self.features.values().filter(|set| !set.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.geometries_of(id).is_some()
    }

    /// Identifiers of spatial entities in declaration order
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(id, _)| id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::GeometryProjector;

    fn pair(wkt: &str) -> GeometryPair {
        GeometryProjector::default()
            .pair(Geometry::from_wkt(wkt).unwrap())
            .unwrap()
    }

    #[test]
    fn test_first_default_wins() {
        let mut registry = SpatialFeatureRegistry::new();
        let first = pair("POINT(9.18854 45.464664)");
        let second = pair("POINT(12.496366 41.902782)");

        assert!(registry.insert_if_absent("a", first.clone(), GeometryRole::Default));
        assert!(!registry.insert_if_absent("a", second, GeometryRole::Default));
        assert_eq!(registry.default_of("a"), Some(&first));
        assert!(registry.secondaries_of("a").is_empty());
    }

    #[test]
    fn test_secondaries_accumulate() {
        let mut registry = SpatialFeatureRegistry::new();
        let p1 = pair("POINT(9.18854 45.464664)");
        let p2 = pair("POINT(9.19 45.47)");

        assert!(registry.insert_if_absent("a", p1.clone(), GeometryRole::Secondary));
        assert!(registry.insert_if_absent("a", p2.clone(), GeometryRole::Secondary));
        assert!(!registry.insert_if_absent("a", p1.clone(), GeometryRole::Secondary));

        assert_eq!(registry.secondaries_of("a"), &[p1.clone(), p2]);
        assert_eq!(registry.default_of("a"), None);
        assert_eq!(
            registry.geometries_of("a").and_then(|set| set.primary()),
            Some(&p1)
        );
    }

    #[test]
    fn test_flattening_order() {
        let mut registry = SpatialFeatureRegistry::new();
        let d = pair("POINT(1 1)");
        let s = pair("POINT(1 2)");
        let other = pair("POINT(3 3)");

        registry.insert_if_absent("a", s.clone(), GeometryRole::Secondary);
        registry.insert_if_absent("a", d.clone(), GeometryRole::Default);
        registry.insert_if_absent("b", other.clone(), GeometryRole::Default);

        let flat: Vec<_> = registry.all_with_geometry().collect();
        assert_eq!(flat, vec![("a", &d), ("a", &s), ("b", &other)]);

        let primaries: Vec<_> = registry.primaries().collect();
        assert_eq!(primaries, vec![("a", &d), ("b", &other)]);
    }

    #[test]
    fn test_unknown_entity() {
        let registry = SpatialFeatureRegistry::new();
        assert!(registry.default_of("missing").is_none());
        assert!(registry.secondaries_of("missing").is_empty());
        assert!(registry.geometries_of("missing").is_none());
        assert!(!registry.contains("missing"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_introspection() {
        let mut registry = SpatialFeatureRegistry::new();
        registry.insert_if_absent("b", pair("POINT(1 1)"), GeometryRole::Default);
        registry.insert_if_absent("a", pair("POINT(2 2)"), GeometryRole::Secondary);

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
        assert_eq!(registry.entities().collect::<Vec<_>>(), vec!["b", "a"]);
    }
}
