//! Sounding-store access.
//!
//! [`SifStore`] is the capability the layers and the view controller
//! program against; [`PostgisSifStore`] is the production implementation
//! over a `switchy_database` handle.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use moosicbox_json_utils::database::ToValue as _;
use sif_map_geography_models::{DateRange, SeriesPoint, SifTable};
use switchy_database::{Database, DatabaseValue};

use crate::{QueryError, sql};

/// Aggregation capabilities of the SIF sounding store.
#[async_trait]
pub trait SifStore: Send + Sync {
    /// Returns the first and last sounding days present in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the query fails or the table is empty.
    async fn date_bounds(&self, table: &SifTable) -> Result<DateRange, QueryError>;

    /// Computes the mean value per region over `range`.
    ///
    /// `region_wkts` is the layer's full region list in enumeration
    /// order; the result maps region index to mean value and omits
    /// regions with no matching soundings.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the query fails.
    async fn region_averages(
        &self,
        table: &SifTable,
        region_wkts: &[String],
        range: DateRange,
    ) -> Result<BTreeMap<usize, f64>, QueryError>;

    /// Computes the full-history daily mean series inside `polygon_wkt`,
    /// ascending by day.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the query fails.
    async fn daily_series(
        &self,
        table: &SifTable,
        polygon_wkt: &str,
    ) -> Result<Vec<SeriesPoint>, QueryError>;
}

/// [`SifStore`] backed by a `PostGIS` database.
pub struct PostgisSifStore {
    db: Box<dyn Database>,
}

impl PostgisSifStore {
    /// Wraps an open database handle.
    #[must_use]
    pub fn new(db: Box<dyn Database>) -> Self {
        Self { db }
    }
}

fn parse_day(text: &str) -> Result<NaiveDate, QueryError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| QueryError::Decode {
        message: format!("invalid day '{text}': {e}"),
    })
}

#[async_trait]
impl SifStore for PostgisSifStore {
    async fn date_bounds(&self, table: &SifTable) -> Result<DateRange, QueryError> {
        let rows = self
            .db
            .query_raw_params(&sql::date_bounds(table), &[])
            .await?;

        let min_day: Option<String> = rows
            .first()
            .and_then(|r| r.to_value("min_day").unwrap_or(None));
        let max_day: Option<String> = rows
            .first()
            .and_then(|r| r.to_value("max_day").unwrap_or(None));

        match (min_day, max_day) {
            (Some(min), Some(max)) => Ok(DateRange::new(parse_day(&min)?, parse_day(&max)?)),
            _ => Err(QueryError::Decode {
                message: format!("fact table {} has no rows", table.table),
            }),
        }
    }

    async fn region_averages(
        &self,
        table: &SifTable,
        region_wkts: &[String],
        range: DateRange,
    ) -> Result<BTreeMap<usize, f64>, QueryError> {
        if region_wkts.is_empty() {
            return Ok(BTreeMap::new());
        }

        // Timestamps must bind as DateTime values: switchy_database sends
        // parameters in binary format and Postgres cannot decode raw
        // UTF-8 bytes as a binary timestamp.
        let rows = self
            .db
            .query_raw_params(
                &sql::region_averages(table, region_wkts),
                &[
                    DatabaseValue::DateTime(range.start_timestamp()),
                    DatabaseValue::DateTime(range.end_timestamp()),
                ],
            )
            .await?;

        let mut averages = BTreeMap::new();
        for row in &rows {
            let idx: i64 = row.to_value("region_idx").unwrap_or(-1);
            let avg: Option<f64> = row.to_value("avg_value").unwrap_or(None);
            if let (Ok(idx), Some(avg)) = (usize::try_from(idx), avg) {
                averages.insert(idx, avg);
            }
        }

        log::debug!(
            "aggregated {} of {} regions over {} to {}",
            averages.len(),
            region_wkts.len(),
            range.start(),
            range.end()
        );

        Ok(averages)
    }

    async fn daily_series(
        &self,
        table: &SifTable,
        polygon_wkt: &str,
    ) -> Result<Vec<SeriesPoint>, QueryError> {
        let rows = self
            .db
            .query_raw_params(&sql::daily_series(table, polygon_wkt), &[])
            .await?;

        let mut series = Vec::with_capacity(rows.len());
        for row in &rows {
            let day: String = row.to_value("day").unwrap_or_default();
            let value: Option<f64> = row.to_value("avg_value").unwrap_or(None);
            if let Some(value) = value {
                series.push(SeriesPoint {
                    day: parse_day(&day)?,
                    value,
                });
            }
        }

        Ok(series)
    }
}
