//! SQL text construction for the sounding-store queries.
//!
//! Statements embed polygon literals directly (geometry is not a bindable
//! binary parameter here) and bind timestamps as parameters. Every
//! geometry predicate pairs the `&&` bounding-box prefilter with the
//! exact `ST_CONTAINS` test so the store's spatial index is used before
//! the per-point containment check.

use sif_map_geography_models::SifTable;

/// Escapes a string for embedding in a single-quoted SQL literal.
fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Statement computing the mean value per region for a date range.
///
/// Regions are passed as a VALUES CTE of `(region_idx, geometry)` pairs;
/// the result has one row per region that matched at least one sounding,
/// keyed by `region_idx`. Time bounds bind as `$1`/`$2`.
#[must_use]
pub fn region_averages(table: &SifTable, region_wkts: &[String]) -> String {
    let values: Vec<String> = region_wkts
        .iter()
        .enumerate()
        .map(|(idx, wkt)| format!("({idx}, ST_GeomFromText({}))", quote_literal(wkt)))
        .collect();

    format!(
        "WITH regions (region_idx, shape) AS (VALUES {values})
         SELECT r.region_idx AS region_idx, AVG(f.{value}) AS avg_value
         FROM {table} f
         JOIN regions r
           ON r.shape && f.{point} AND ST_CONTAINS(r.shape, f.{point})
         WHERE f.{time} BETWEEN $1 AND $2
         GROUP BY r.region_idx",
        values = values.join(", "),
        table = table.table,
        value = table.value_column,
        time = table.time_column,
        point = table.point_column,
    )
}

/// Statement computing the full-history daily mean series inside one
/// polygon, ordered ascending by day.
#[must_use]
pub fn daily_series(table: &SifTable, polygon_wkt: &str) -> String {
    format!(
        "WITH area AS (SELECT ST_GeomFromText({polygon}) AS shape)
         SELECT date_trunc('day', f.{time})::date::text AS day,
                AVG(f.{value}) AS avg_value
         FROM {table} f
         WHERE (SELECT shape FROM area) && f.{point}
           AND ST_CONTAINS((SELECT shape FROM area), f.{point})
         GROUP BY date_trunc('day', f.{time})
         ORDER BY date_trunc('day', f.{time})",
        polygon = quote_literal(polygon_wkt),
        table = table.table,
        value = table.value_column,
        time = table.time_column,
        point = table.point_column,
    )
}

/// Statement reading the first and last sounding days in the fact table.
#[must_use]
pub fn date_bounds(table: &SifTable) -> String {
    format!(
        "SELECT MIN({time})::date::text AS min_day, MAX({time})::date::text AS max_day
         FROM {table}",
        time = table.time_column,
        table = table.table,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_averages_prefilters_before_containment() {
        let sql = region_averages(
            &SifTable::default(),
            &["POLYGON((0 0, 1 0, 1 1, 0 0))".to_string()],
        );
        let prefilter = sql.find("&&").unwrap();
        let exact = sql.find("ST_CONTAINS").unwrap();
        assert!(prefilter < exact);
        assert!(sql.contains("(0, ST_GeomFromText('POLYGON((0 0, 1 0, 1 1, 0 0))'))"));
        assert!(sql.contains("BETWEEN $1 AND $2"));
        assert!(sql.contains("GROUP BY r.region_idx"));
    }

    #[test]
    fn region_averages_enumerates_in_order() {
        let wkts: Vec<String> = (0..3)
            .map(|i| format!("POLYGON(({i} 0, {i} 1, 0 1, {i} 0))"))
            .collect();
        let sql = region_averages(&SifTable::default(), &wkts);
        assert!(sql.find("(0, ").unwrap() < sql.find("(1, ").unwrap());
        assert!(sql.find("(1, ").unwrap() < sql.find("(2, ").unwrap());
    }

    #[test]
    fn daily_series_groups_and_orders_by_day() {
        let sql = daily_series(&SifTable::default(), "POLYGON((0 0, 1 0, 1 1, 0 0))");
        assert!(sql.contains("GROUP BY date_trunc('day', f.time)"));
        assert!(sql.contains("ORDER BY date_trunc('day', f.time)"));
        assert!(sql.find("&&").unwrap() < sql.find("ST_CONTAINS").unwrap());
    }

    #[test]
    fn polygon_literal_is_escaped() {
        let sql = daily_series(&SifTable::default(), "POLYGON'--");
        assert!(sql.contains("ST_GeomFromText('POLYGON''--')"));
    }

    #[test]
    fn scope_columns_are_substituted() {
        let table = SifTable {
            table: "oco2_sif".to_string(),
            value_column: "sif_757nm".to_string(),
            time_column: "sounding_time".to_string(),
            point_column: "footprint".to_string(),
        };
        let sql = date_bounds(&table);
        assert!(sql.contains("MIN(sounding_time)"));
        assert!(sql.contains("FROM oco2_sif"));
    }
}
