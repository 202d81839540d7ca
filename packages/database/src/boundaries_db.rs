//! Administrative boundary storage in `DuckDB`.
//!
//! Stores state and county boundaries with their `GeoJSON` geometry as
//! plain TEXT (no `PostGIS` spatial types). The boundaries `DuckDB`
//! lives at `data/shared/boundaries.duckdb`; the geography crate reads
//! it when building layers from scratch.

use std::path::Path;

use duckdb::Connection;

use crate::DbError;

/// Opens (or creates) the boundaries `DuckDB` and ensures schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    if let Some(parent) = path.parent() {
        crate::paths::ensure_dir(parent)?;
    }

    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    log::debug!("opened boundaries db at {}", path.display());
    Ok(conn)
}

/// Opens the boundaries DB at the default path.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open_default() -> Result<Connection, DbError> {
    open(&crate::paths::boundaries_db_path())
}

/// Creates the boundary tables if they do not exist.
///
/// # Errors
///
/// Returns [`DbError`] if schema creation fails.
pub fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS census_states (
            fips TEXT PRIMARY KEY,
            name TEXT,
            abbr TEXT,
            boundary_geojson TEXT
        );

        CREATE TABLE IF NOT EXISTS census_counties (
            geoid TEXT PRIMARY KEY,
            name TEXT,
            full_name TEXT,
            state_fips TEXT,
            boundary_geojson TEXT
        );",
    )?;
    Ok(())
}
