//! The persisted layer snapshot.
//!
//! Building all three layers means reading and reprojecting every
//! boundary polygon, so the built set is serialized once and later runs
//! deserialize it directly. The snapshot embeds a content stamp over the
//! boundary-table ids; a stamp mismatch (new boundary vintage) or an
//! unreadable snapshot falls back to a full rebuild, never a startup
//! failure.

use std::path::Path;

use duckdb::Connection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sif_map_analytics::SifStore;
use sif_map_geography_models::LayerKind;

use crate::{GeoError, Layer};

/// The three built layers plus the boundary-source stamp they were
/// built from. Process-wide, read-only after construction.
#[derive(Serialize, Deserialize)]
pub struct LayerSet {
    stamp: String,
    states: Layer,
    counties: Layer,
    world_grid: Layer,
}

impl LayerSet {
    /// Assembles a set from already-built layers.
    #[must_use]
    pub fn from_layers(
        stamp: impl Into<String>,
        states: Layer,
        counties: Layer,
        world_grid: Layer,
    ) -> Self {
        Self {
            stamp: stamp.into(),
            states,
            counties,
            world_grid,
        }
    }

    /// The layer for a given kind.
    #[must_use]
    pub const fn get(&self, kind: LayerKind) -> &Layer {
        match kind {
            LayerKind::State => &self.states,
            LayerKind::County => &self.counties,
            LayerKind::WorldGrid => &self.world_grid,
        }
    }

    /// The boundary-source stamp this set was built from.
    #[must_use]
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// Builds all three layers from scratch.
    ///
    /// Deterministic for the same boundary data: regions enumerate in
    /// id order and grid synthesis is procedural.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if boundary loading or a store query fails.
    pub async fn build(conn: &Connection, store: &dyn SifStore) -> Result<Self, GeoError> {
        let stamp = boundary_stamp(conn)?;
        log::info!("building layers from scratch");

        let states = Layer::states(conn, store).await?;
        let counties = Layer::counties(conn, store).await?;
        let world_grid = Layer::world_grid(store).await?;

        Ok(Self::from_layers(stamp, states, counties, world_grid))
    }
}

/// Content stamp over the boundary tables.
///
/// Hashes the ordered id columns only — enough to catch a different
/// boundary vintage (added, removed, or renumbered units) without
/// re-reading every geometry on startup.
///
/// # Errors
///
/// Returns [`GeoError`] if the id queries fail.
pub fn boundary_stamp(conn: &Connection) -> Result<String, GeoError> {
    let mut hasher = Sha256::new();

    for (table, column) in [("census_states", "fips"), ("census_counties", "geoid")] {
        let mut stmt = conn.prepare(&format!("SELECT {column} FROM {table} ORDER BY {column}"))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            hasher.update(id.as_bytes());
            hasher.update(b"\n");
        }
        hasher.update(b"--\n");
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Reads a persisted snapshot.
///
/// # Errors
///
/// Returns [`GeoError`] if the file cannot be read or decoded.
pub fn read_snapshot(path: &Path) -> Result<LayerSet, GeoError> {
    let bytes = std::fs::read(path)?;
    Ok(rmp_serde::from_slice(&bytes)?)
}

/// Persists a snapshot, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`GeoError`] if encoding or writing fails.
pub fn write_snapshot(path: &Path, layers: &LayerSet) -> Result<(), GeoError> {
    if let Some(parent) = path.parent() {
        sif_map_database::paths::ensure_dir(parent)?;
    }
    let bytes = rmp_serde::to_vec(layers)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Returns the layer set, deserializing the snapshot when it is present
/// and current, building and persisting it otherwise.
///
/// Invoked once per process lifetime; the returned set is read-only.
///
/// # Errors
///
/// Returns [`GeoError`] if a rebuild is needed and fails, or the fresh
/// snapshot cannot be persisted. A stale or corrupt snapshot is not an
/// error — it triggers the rebuild path.
pub async fn load_or_build(
    conn: &Connection,
    store: &dyn SifStore,
    path: &Path,
) -> Result<LayerSet, GeoError> {
    let stamp = boundary_stamp(conn)?;

    if path.exists() {
        match read_snapshot(path) {
            Ok(set) if set.stamp == stamp => {
                log::info!("loaded layer snapshot from {}", path.display());
                return Ok(set);
            }
            Ok(_) => log::info!("layer snapshot is stale, rebuilding"),
            Err(e) => log::warn!("failed to load layer snapshot: {e}, rebuilding"),
        }
    }

    let set = LayerSet::build(conn, store).await?;
    write_snapshot(path, &set)?;
    log::info!("persisted layer snapshot to {}", path.display());
    Ok(set)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use sif_map_analytics::QueryError;
    use sif_map_geography_models::{DateRange, SeriesPoint, SifTable};

    use super::*;

    /// Store stub that counts how often layer building touches it.
    #[derive(Default)]
    struct StubStore {
        bounds_calls: AtomicUsize,
    }

    #[async_trait]
    impl SifStore for StubStore {
        async fn date_bounds(&self, _table: &SifTable) -> Result<DateRange, QueryError> {
            self.bounds_calls.fetch_add(1, Ordering::SeqCst);
            Ok(DateRange::new(
                NaiveDate::from_ymd_opt(2018, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2019, 5, 1).unwrap(),
            ))
        }

        async fn region_averages(
            &self,
            _table: &SifTable,
            _region_wkts: &[String],
            _range: DateRange,
        ) -> Result<BTreeMap<usize, f64>, QueryError> {
            Ok(BTreeMap::new())
        }

        async fn daily_series(
            &self,
            _table: &SifTable,
            _polygon_wkt: &str,
        ) -> Result<Vec<SeriesPoint>, QueryError> {
            Ok(Vec::new())
        }
    }

    const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[[-100.0,40.0],[-99.0,40.0],[-99.0,41.0],[-100.0,41.0],[-100.0,40.0]]]}"#;

    fn seed_boundaries(conn: &Connection) {
        sif_map_database::boundaries_db::create_schema(conn).unwrap();
        conn.execute_batch(&format!(
            "INSERT INTO census_states (fips, name, abbr, boundary_geojson)
             VALUES ('08', 'Colorado', 'CO', '{SQUARE}'),
                    ('56', 'Wyoming', 'WY', '{SQUARE}');
             INSERT INTO census_counties (geoid, name, full_name, state_fips, boundary_geojson)
             VALUES ('08013', 'Boulder', 'Boulder County, CO', '08', '{SQUARE}'),
                    ('08031', 'Denver', 'Denver County, CO', '08', '{SQUARE}');"
        ))
        .unwrap();
    }

    fn snapshot_path(test: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sif_map_{test}_{}.bin", std::process::id()))
    }

    #[test]
    fn stamp_tracks_boundary_ids() {
        let conn = Connection::open_in_memory().unwrap();
        seed_boundaries(&conn);
        let before = boundary_stamp(&conn).unwrap();

        conn.execute_batch(
            "INSERT INTO census_counties (geoid, name, full_name, state_fips, boundary_geojson)
             VALUES ('08059', 'Jefferson', 'Jefferson County, CO', '08', NULL);",
        )
        .unwrap();

        let after = boundary_stamp(&conn).unwrap();
        assert_ne!(before, after);
    }

    #[tokio::test]
    async fn build_persist_load_round_trips_region_data() {
        let conn = Connection::open_in_memory().unwrap();
        seed_boundaries(&conn);
        let path = snapshot_path("round_trip");
        let _ = std::fs::remove_file(&path);

        let store = StubStore::default();
        let built = load_or_build(&conn, &store, &path).await.unwrap();
        assert!(path.exists());
        assert!(store.bounds_calls.load(Ordering::SeqCst) > 0);

        // A fresh "process": new store, same snapshot — no rebuild.
        let reload_store = StubStore::default();
        let loaded = load_or_build(&conn, &reload_store, &path).await.unwrap();
        assert_eq!(reload_store.bounds_calls.load(Ordering::SeqCst), 0);

        for kind in LayerKind::ALL {
            assert_eq!(
                built.get(kind).regions(),
                loaded.get(kind).regions(),
                "{kind} regions must round-trip by value"
            );
            assert_eq!(built.get(kind).date_range(), loaded.get(kind).date_range());
        }

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn stale_stamp_triggers_rebuild() {
        let conn = Connection::open_in_memory().unwrap();
        seed_boundaries(&conn);
        let path = snapshot_path("stale_stamp");
        let _ = std::fs::remove_file(&path);

        let store = StubStore::default();
        load_or_build(&conn, &store, &path).await.unwrap();

        conn.execute_batch(
            "INSERT INTO census_states (fips, name, abbr, boundary_geojson) \
             VALUES ('49', 'Utah', 'UT', NULL);",
        )
        .unwrap();

        let rebuild_store = StubStore::default();
        load_or_build(&conn, &rebuild_store, &path).await.unwrap();
        assert!(rebuild_store.bounds_calls.load(Ordering::SeqCst) > 0);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn corrupt_snapshot_falls_back_to_rebuild() {
        let conn = Connection::open_in_memory().unwrap();
        seed_boundaries(&conn);
        let path = snapshot_path("corrupt");
        std::fs::write(&path, b"not a snapshot").unwrap();

        let store = StubStore::default();
        let set = load_or_build(&conn, &store, &path).await.unwrap();
        assert!(store.bounds_calls.load(Ordering::SeqCst) > 0);
        assert_eq!(set.get(LayerKind::State).regions().len(), 2);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn world_grid_regions_are_deterministic() {
        // Two independent builds must be identical by value, the
        // invariant that makes snapshot reuse sound.
        let store = StubStore::default();
        let a = Layer::world_grid(&store).await.unwrap();
        let b = Layer::world_grid(&store).await.unwrap();
        assert_eq!(a.regions(), b.regions());
    }
}
