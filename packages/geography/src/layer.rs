//! The layer contract shared by all partitionings.

use std::sync::OnceLock;

use geo::{BoundingRect, Contains, LineString, MultiPolygon, Polygon};
use rstar::{AABB, RTree, RTreeObject};
use serde::{Deserialize, Serialize};
use sif_map_analytics::{QueryError, SifStore};
use sif_map_geography_models::{
    DateRange, GeographicRegion, LayerKind, ProjectedRing, RegionRef, SeriesPoint, SifTable,
};

/// A region stored in the hit-test R-tree with its exact geometry.
struct RegionHit {
    index: usize,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for RegionHit {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// A named partitioning of the study area into regions, with the date
/// bounds and fact-table mapping its aggregations run against.
///
/// The three variants (state, county, world grid) share this type; they
/// differ only in construction — see [`crate::boundaries`] and
/// [`crate::grid`].
#[derive(Serialize, Deserialize)]
pub struct Layer {
    kind: LayerKind,
    regions: Vec<GeographicRegion>,
    bounds: DateRange,
    table: SifTable,
    /// Built lazily on first tap; not part of the snapshot.
    #[serde(skip)]
    hit_index: OnceLock<RTree<RegionHit>>,
}

impl Layer {
    /// Assembles a layer from already-prepared regions.
    #[must_use]
    pub fn from_parts(
        kind: LayerKind,
        regions: Vec<GeographicRegion>,
        bounds: DateRange,
        table: SifTable,
    ) -> Self {
        Self {
            kind,
            regions,
            bounds,
            table,
            hit_index: OnceLock::new(),
        }
    }

    /// Which partitioning this is.
    #[must_use]
    pub const fn kind(&self) -> LayerKind {
        self.kind
    }

    /// The full span over which this layer's sounding data exists,
    /// captured when the layer was built.
    #[must_use]
    pub const fn date_range(&self) -> DateRange {
        self.bounds
    }

    /// The fact-table mapping this layer aggregates against.
    #[must_use]
    pub const fn table(&self) -> &SifTable {
        &self.table
    }

    /// All regions in enumeration order.
    #[must_use]
    pub fn regions(&self) -> &[GeographicRegion] {
        &self.regions
    }

    /// One region by enumeration index.
    #[must_use]
    pub fn region(&self, index: usize) -> Option<&GeographicRegion> {
        self.regions.get(index)
    }

    /// Projected boundary rings and display names for every region, in
    /// enumeration order. Pure and safe to call repeatedly.
    #[must_use]
    pub fn map_details(&self) -> (Vec<Vec<ProjectedRing>>, Vec<String>) {
        let rings = self.regions.iter().map(|r| r.rings.clone()).collect();
        let names = self.regions.iter().map(|r| r.name.clone()).collect();
        (rings, names)
    }

    /// Mean value per region over `range`, in enumeration order.
    ///
    /// Regions with no matching soundings yield `None`, which is the
    /// no-data sentinel — never `0.0`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the store query fails.
    pub async fn aggregate_for_date_range(
        &self,
        store: &dyn SifStore,
        range: DateRange,
    ) -> Result<Vec<Option<f64>>, QueryError> {
        let wkts: Vec<String> = self.regions.iter().map(|r| r.wkt.clone()).collect();
        let averages = store.region_averages(&self.table, &wkts, range).await?;
        Ok((0..self.regions.len())
            .map(|idx| averages.get(&idx).copied())
            .collect())
    }

    /// Full-history daily series for one region, plus its display name
    /// as the series title.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the store query fails.
    pub async fn time_series_for_region(
        &self,
        store: &dyn SifStore,
        region: &GeographicRegion,
    ) -> Result<(String, Vec<SeriesPoint>), QueryError> {
        let series = store.daily_series(&self.table, &region.wkt).await?;
        Ok((region.name.clone(), series))
    }

    /// Resolves a tap event to a region index.
    #[must_use]
    pub fn resolve(&self, region_ref: RegionRef) -> Option<usize> {
        match region_ref {
            RegionRef::Index(index) if index < self.regions.len() => Some(index),
            RegionRef::Index(_) => None,
            RegionRef::ProjectedPoint { x, y } => self.hit_test(x, y),
        }
    }

    /// Finds the region containing a projected-space point.
    ///
    /// Bounding-box prefilter through the R-tree, then an exact
    /// point-in-polygon test. Regions tile the study area without
    /// overlap, so first match wins.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<usize> {
        let index = self
            .hit_index
            .get_or_init(|| build_hit_index(&self.regions));

        let point = geo::Point::new(x, y);
        let query_env = AABB::from_point([x, y]);

        for hit in index.locate_in_envelope_intersecting(&query_env) {
            if hit.polygon.contains(&point) {
                return Some(hit.index);
            }
        }
        None
    }
}

fn build_hit_index(regions: &[GeographicRegion]) -> RTree<RegionHit> {
    let mut entries = Vec::with_capacity(regions.len());

    for (index, region) in regions.iter().enumerate() {
        let polygons: Vec<Polygon<f64>> = region
            .rings
            .iter()
            .map(|ring| {
                let points: Vec<(f64, f64)> = ring.points().collect();
                Polygon::new(LineString::from(points), Vec::new())
            })
            .collect();
        let polygon = MultiPolygon(polygons);

        let Some(rect) = polygon.bounding_rect() else {
            continue;
        };
        let envelope =
            AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        entries.push(RegionHit {
            index,
            envelope,
            polygon,
        });
    }

    RTree::bulk_load(entries)
}
