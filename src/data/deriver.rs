//! Derived Column Module
//! Parses order dates and adds the MONTH, YEAR and SALES columns.

use crate::data::columns::{
    MONTH, ORDER_DATE, PRICE_EACH, PRODUCT_LINE, QUANTITY_ORDERED, SALES, YEAR,
};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use rayon::prelude::*;
use thiserror::Error;

/// Date-time layouts tried in order; the time part is discarded.
const DATETIME_FORMATS: [&str; 4] = [
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Date-only layouts tried after the date-time ones.
const DATE_FORMATS: [&str; 4] = ["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d", "%d %b %Y"];

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const REQUIRED_COLUMNS: [&str; 4] = [ORDER_DATE, PRODUCT_LINE, QUANTITY_ORDERED, PRICE_EACH];

#[derive(Error, Debug)]
pub enum DeriveError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
    #[error("Unparseable {column} value {value:?} at row {row}")]
    DateParse {
        column: &'static str,
        row: usize,
        value: Option<String>,
    },
}

/// One fully derived row of the sales table.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub order_date: NaiveDate,
    pub product_line: Option<String>,
    pub quantity_ordered: Option<i64>,
    pub price_each: Option<f64>,
    pub month: String,
    pub year: i32,
    pub sales: Option<f64>,
}

impl SalesRecord {
    fn new(
        order_date: NaiveDate,
        product_line: Option<String>,
        quantity_ordered: Option<i64>,
        price_each: Option<f64>,
    ) -> Self {
        Self {
            order_date,
            product_line,
            quantity_ordered,
            price_each,
            month: month_abbrev(order_date),
            year: order_date.year(),
            sales: compute_sales(quantity_ordered, price_each),
        }
    }
}

/// Three-letter month abbreviation, e.g. `Jan`.
pub fn month_abbrev(date: NaiveDate) -> String {
    date.format("%b").to_string()
}

/// Missing inputs give a missing total, never zero.
pub fn compute_sales(quantity: Option<i64>, price: Option<f64>) -> Option<f64> {
    Some(quantity? as f64 * price?)
}

/// Parse a localized order date string.
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

/// Days since 1970-01-01, the physical representation of a Polars `Date`.
pub fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub fn from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Adds derived columns to a freshly loaded sales DataFrame.
pub struct Deriver;

impl Deriver {
    /// Parse every row into a [`SalesRecord`]; a single bad date fails the whole load.
    pub fn records(df: &DataFrame) -> Result<Vec<SalesRecord>, DeriveError> {
        for name in REQUIRED_COLUMNS {
            if df.column(name).is_err() {
                return Err(DeriveError::MissingColumn(name.to_string()));
            }
        }

        let raw_dates = df.column(ORDER_DATE)?.cast(&DataType::String)?;
        let raw_dates: Vec<Option<&str>> = raw_dates.str()?.into_iter().collect();
        let products = df.column(PRODUCT_LINE)?.cast(&DataType::String)?;
        let products = products.str()?;
        let quantities = df.column(QUANTITY_ORDERED)?.cast(&DataType::Int64)?;
        let quantities = quantities.i64()?;
        let prices = df.column(PRICE_EACH)?.cast(&DataType::Float64)?;
        let prices = prices.f64()?;

        let dates = raw_dates
            .par_iter()
            .enumerate()
            .map(|(row, raw)| {
                raw.and_then(parse_order_date)
                    .ok_or_else(|| DeriveError::DateParse {
                        column: ORDER_DATE,
                        row,
                        value: raw.map(str::to_string),
                    })
            })
            .collect::<Result<Vec<NaiveDate>, DeriveError>>()?;

        let records = dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| {
                SalesRecord::new(
                    date,
                    products.get(i).map(str::to_string),
                    quantities.get(i),
                    prices.get(i),
                )
            })
            .collect();

        Ok(records)
    }

    /// Return a new DataFrame with typed ORDERDATE plus MONTH, YEAR and SALES.
    ///
    /// Any SALES column already present in the source is replaced.
    pub fn derive(df: &DataFrame) -> Result<DataFrame, DeriveError> {
        let records = Self::records(df)?;

        let dates: Vec<i32> = records.iter().map(|r| epoch_days(r.order_date)).collect();
        let months: Vec<&str> = records.iter().map(|r| r.month.as_str()).collect();
        let years: Vec<i32> = records.iter().map(|r| r.year).collect();
        let products: Vec<Option<&str>> = records
            .iter()
            .map(|r| r.product_line.as_deref())
            .collect();
        let quantities: Vec<Option<i64>> = records.iter().map(|r| r.quantity_ordered).collect();
        let prices: Vec<Option<f64>> = records.iter().map(|r| r.price_each).collect();
        let sales: Vec<Option<f64>> = records.iter().map(|r| r.sales).collect();

        let mut derived = df.clone();
        derived.with_column(Column::new(ORDER_DATE.into(), dates).cast(&DataType::Date)?)?;
        derived.with_column(Column::new(PRODUCT_LINE.into(), products))?;
        derived.with_column(Column::new(QUANTITY_ORDERED.into(), quantities))?;
        derived.with_column(Column::new(PRICE_EACH.into(), prices))?;
        derived.with_column(Column::new(MONTH.into(), months))?;
        derived.with_column(Column::new(YEAR.into(), years))?;
        derived.with_column(Column::new(SALES.into(), sales))?;

        Ok(derived)
    }
}
