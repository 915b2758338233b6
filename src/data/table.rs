//! Sales Table Module
//! Read-only sales dataset and the aggregation queries the charts are built from.

use crate::data::columns::{MONTH, PRICE_EACH, PRODUCT_LINE, SALES, YEAR};
use crate::data::deriver::{DeriveError, Deriver};
use crate::data::encoding::TextEncoding;
use crate::data::loader::{DataLoader, LoaderError};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Cannot reconstruct a date from year {year} and month {month:?}")]
    DateReconstruction { year: i32, month: String },
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Derive(#[from] DeriveError),
}

/// Summed sales for one product line.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub product_line: String,
    pub sales: f64,
}

/// One (year, month) bucket of a product line's time series.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoint {
    pub date: NaiveDate,
    pub year: i32,
    pub month: String,
    pub sales: f64,
    pub avg_price: Option<f64>,
}

/// Rebuild the first day of the month from a year and a month abbreviation.
pub fn reconstruct_month(year: i32, month: &str) -> Result<NaiveDate, QueryError> {
    NaiveDate::parse_from_str(&format!("{year} {month} 1"), "%Y %b %d").map_err(|_| {
        QueryError::DateReconstruction {
            year,
            month: month.to_string(),
        }
    })
}

/// The derived sales dataset. Built once and never mutated; every query
/// returns fresh data.
#[derive(Debug, Clone)]
pub struct SalesTable {
    df: DataFrame,
}

impl SalesTable {
    /// Load, decode and derive a sales CSV in one step.
    pub fn load(path: &Path, encodings: &[TextEncoding]) -> Result<Self, TableError> {
        let loaded = DataLoader::load_csv(path, encodings)?;
        let table = Self::from_frame(&loaded.df)?;
        info!(
            "Sales table ready: {} rows, read as {}",
            table.row_count(),
            loaded.encoding
        );
        Ok(table)
    }

    /// Derive the sales columns from an already loaded DataFrame.
    pub fn from_frame(df: &DataFrame) -> Result<Self, DeriveError> {
        Ok(Self {
            df: Deriver::derive(df)?,
        })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// Sum of every non-null SALES value on rows that have a product line.
    pub fn grand_total(&self) -> Result<f64, QueryError> {
        let out = self
            .categorized()
            .select([col(SALES).sum()])
            .collect()?;
        Ok(out.column(SALES)?.f64()?.get(0).unwrap_or(0.0))
    }

    fn categorized(&self) -> LazyFrame {
        self.df
            .clone()
            .lazy()
            .filter(col(PRODUCT_LINE).is_not_null())
    }

    fn totals_by_product_line(&self) -> LazyFrame {
        self.categorized()
            .group_by_stable([col(PRODUCT_LINE)])
            .agg([col(SALES).sum()])
    }

    /// The `n` product lines with the largest summed sales, largest first.
    ///
    /// Equal totals keep the order in which their product lines first appear.
    pub fn top_n_by_category(&self, n: usize) -> Result<Vec<CategoryTotal>, QueryError> {
        let out = self
            .totals_by_product_line()
            .sort(
                [SALES],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_nulls_last(true)
                    .with_maintain_order(true),
            )
            .limit(IdxSize::try_from(n).unwrap_or(IdxSize::MAX))
            .collect()?;
        Self::category_totals(&out)
    }

    /// Summed sales for every product line, in first-appearance order.
    pub fn category_distribution(&self) -> Result<Vec<CategoryTotal>, QueryError> {
        let out = self.totals_by_product_line().collect()?;
        Self::category_totals(&out)
    }

    /// Monthly summed sales and average unit price for one product line,
    /// oldest month first.
    pub fn time_series(&self, product_line: &str) -> Result<Vec<MonthlyPoint>, QueryError> {
        let out = self
            .df
            .clone()
            .lazy()
            .filter(col(PRODUCT_LINE).eq(lit(product_line)))
            .group_by_stable([col(YEAR), col(MONTH)])
            .agg([col(SALES).sum(), col(PRICE_EACH).mean()])
            .collect()?;

        let years = out.column(YEAR)?.i32()?;
        let months = out.column(MONTH)?.str()?;
        let sales = out.column(SALES)?.f64()?;
        let prices = out.column(PRICE_EACH)?.f64()?;

        let mut points = Vec::with_capacity(out.height());
        for i in 0..out.height() {
            let (Some(year), Some(month)) = (years.get(i), months.get(i)) else {
                continue;
            };
            points.push(MonthlyPoint {
                date: reconstruct_month(year, month)?,
                year,
                month: month.to_string(),
                sales: sales.get(i).unwrap_or(0.0),
                avg_price: prices.get(i),
            });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    fn category_totals(df: &DataFrame) -> Result<Vec<CategoryTotal>, QueryError> {
        let products = df.column(PRODUCT_LINE)?.str()?;
        let sales = df.column(SALES)?.f64()?;

        Ok(products
            .into_iter()
            .zip(sales)
            .filter_map(|(product, total)| {
                Some(CategoryTotal {
                    product_line: product?.to_string(),
                    sales: total.unwrap_or(0.0),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::{ORDER_DATE, PRICE_EACH, QUANTITY_ORDERED};

    fn scenario() -> SalesTable {
        let df = df!(
            ORDER_DATE => ["2024-01-05", "2024-02-10", "2024-01-15"],
            PRODUCT_LINE => ["A", "A", "B"],
            QUANTITY_ORDERED => [2i64, 1, 5],
            PRICE_EACH => [10.0, 20.0, 4.0]
        )
        .unwrap();
        SalesTable::from_frame(&df).unwrap()
    }

    fn wide() -> SalesTable {
        let df = df!(
            ORDER_DATE => [
                "2003-11-05", "2003-02-10", "2004-01-15", "2003-11-20",
                "2003-02-01", "2004-03-03", "2003-07-07", "2004-01-30"
            ],
            PRODUCT_LINE => [
                "Classic Cars", "Motorcycles", "Classic Cars", "Ships",
                "Classic Cars", "Trains", "Ships", "Motorcycles"
            ],
            QUANTITY_ORDERED => [Some(10i64), Some(3), Some(4), Some(6), None, Some(1), Some(2), Some(0)],
            PRICE_EACH => [100.0, 50.0, 100.0, 25.0, 80.0, 75.0, 75.0, 60.0]
        )
        .unwrap();
        SalesTable::from_frame(&df).unwrap()
    }

    fn total(product_line: &str, sales: f64) -> CategoryTotal {
        CategoryTotal {
            product_line: product_line.to_string(),
            sales,
        }
    }

    #[test]
    fn test_reconstruct_month() {
        assert_eq!(
            reconstruct_month(2003, "Feb").unwrap(),
            NaiveDate::from_ymd_opt(2003, 2, 1).unwrap()
        );
        assert!(matches!(
            reconstruct_month(2003, "Smarch"),
            Err(QueryError::DateReconstruction { year: 2003, .. })
        ));
    }

    #[test]
    fn test_scenario_top_one() {
        let table = scenario();
        assert_eq!(table.top_n_by_category(1).unwrap(), vec![total("A", 40.0)]);
        assert_eq!(
            table.top_n_by_category(5).unwrap(),
            vec![total("A", 40.0), total("B", 20.0)]
        );
    }

    #[test]
    fn test_scenario_time_series() {
        let series = scenario().time_series("A").unwrap();
        let summary: Vec<(NaiveDate, f64)> = series.iter().map(|p| (p.date, p.sales)).collect();
        assert_eq!(
            summary,
            vec![
                (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 20.0),
                (NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 20.0),
            ]
        );
        assert_eq!(series[0].avg_price, Some(10.0));
        assert_eq!(series[1].avg_price, Some(20.0));
    }

    #[test]
    fn test_top_n_ties_keep_encounter_order() {
        let df = df!(
            ORDER_DATE => ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"],
            PRODUCT_LINE => ["Z", "Y", "X", "Z"],
            QUANTITY_ORDERED => [1i64, 2, 2, 1],
            PRICE_EACH => [5.0, 5.0, 5.0, 5.0]
        )
        .unwrap();
        let table = SalesTable::from_frame(&df).unwrap();
        let expected = vec![total("Z", 10.0), total("Y", 10.0), total("X", 10.0)];
        for _ in 0..3 {
            assert_eq!(table.top_n_by_category(3).unwrap(), expected);
        }
    }

    #[test]
    fn test_top_n_is_bounded_and_descending() {
        let table = wide();
        for n in 0..6 {
            let top = table.top_n_by_category(n).unwrap();
            assert!(top.len() <= n);
            assert!(top.windows(2).all(|w| w[0].sales >= w[1].sales));
        }
        let top = table.top_n_by_category(2).unwrap();
        assert_eq!(top, vec![total("Classic Cars", 1400.0), total("Ships", 300.0)]);
    }

    #[test]
    fn test_missing_quantity_is_excluded_not_zero() {
        let table = wide();
        let series = table.time_series("Classic Cars").unwrap();
        let feb = series.iter().find(|p| p.month == "Feb").unwrap();
        // The only February row has no quantity: its sales are excluded but its price still averages.
        assert_eq!(feb.sales, 0.0);
        assert_eq!(feb.avg_price, Some(80.0));
    }

    #[test]
    fn test_time_series_is_chronological() {
        let table = wide();
        for product in ["Classic Cars", "Motorcycles", "Ships", "Trains"] {
            let series = table.time_series(product).unwrap();
            assert!(!series.is_empty());
            assert!(series.windows(2).all(|w| w[0].date <= w[1].date));
        }
        let months: Vec<(i32, String)> = table
            .time_series("Classic Cars")
            .unwrap()
            .into_iter()
            .map(|p| (p.year, p.month))
            .collect();
        assert_eq!(
            months,
            vec![
                (2003, "Feb".to_string()),
                (2003, "Nov".to_string()),
                (2004, "Jan".to_string()),
            ]
        );
    }

    #[test]
    fn test_time_series_unknown_product_is_empty() {
        assert!(wide().time_series("Planes").unwrap().is_empty());
    }

    #[test]
    fn test_distribution_sums_to_grand_total() {
        let table = wide();
        let distribution = table.category_distribution().unwrap();
        let products: Vec<&str> = distribution.iter().map(|t| t.product_line.as_str()).collect();
        assert_eq!(products, vec!["Classic Cars", "Motorcycles", "Ships", "Trains"]);

        let summed: f64 = distribution.iter().map(|t| t.sales).sum();
        assert!((summed - table.grand_total().unwrap()).abs() < 1e-9);
        assert_eq!(table.grand_total().unwrap(), 1925.0);
    }

    #[test]
    fn test_blank_product_line_is_left_out_of_totals() {
        let df = df!(
            ORDER_DATE => ["2024-01-05", "2024-01-06"],
            PRODUCT_LINE => [Some("A"), None],
            QUANTITY_ORDERED => [2i64, 3],
            PRICE_EACH => [10.0, 10.0]
        )
        .unwrap();
        let table = SalesTable::from_frame(&df).unwrap();
        let summed: f64 = table
            .category_distribution()
            .unwrap()
            .iter()
            .map(|t| t.sales)
            .sum();
        assert_eq!(summed, 20.0);
        assert_eq!(table.grand_total().unwrap(), summed);
    }

    #[test]
    fn test_top_n_beyond_index_range_returns_everything() {
        let top = scenario()
            .top_n_by_category(u32::MAX as usize + 1)
            .unwrap();
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn test_queries_leave_table_untouched() {
        let table = wide();
        let before = table.dataframe().clone();
        table.top_n_by_category(2).unwrap();
        table.time_series("Ships").unwrap();
        table.category_distribution().unwrap();
        assert!(table.dataframe().equals_missing(&before));
    }
}
