//! Housing Dataset Module
//! Read-only housing table served by the chart API.

use crate::data::encoding::TextEncoding;
use crate::data::loader::{DataLoader, LoaderError};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const MEDIAN_HOUSE_VALUE: &str = "median_house_value";
pub const MEDIAN_INCOME: &str = "median_income";
pub const OCEAN_PROXIMITY: &str = "ocean_proximity";

#[derive(Error, Debug)]
pub enum HousingError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
}

/// (income, house value) points sharing one ocean proximity value.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityGroup {
    pub proximity: String,
    pub income: Vec<f64>,
    pub house_value: Vec<f64>,
}

/// Housing dataset, loaded once.
#[derive(Debug, Clone)]
pub struct HousingTable {
    df: DataFrame,
}

impl HousingTable {
    pub fn load(path: &Path, encodings: &[TextEncoding]) -> Result<Self, HousingError> {
        let loaded = DataLoader::load_csv(path, encodings)?;
        let table = Self::from_frame(loaded.df)?;
        info!(
            "Housing table ready: {} rows, read as {}",
            table.row_count(),
            loaded.encoding
        );
        Ok(table)
    }

    pub fn from_frame(df: DataFrame) -> Result<Self, HousingError> {
        for name in [MEDIAN_HOUSE_VALUE, MEDIAN_INCOME, OCEAN_PROXIMITY] {
            if df.column(name).is_err() {
                return Err(HousingError::MissingColumn(name.to_string()));
            }
        }
        Ok(Self { df })
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// Every non-null house value.
    pub fn house_values(&self) -> Result<Vec<f64>, HousingError> {
        let values = self.df.column(MEDIAN_HOUSE_VALUE)?.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().flatten().collect())
    }

    /// Income/value pairs split by ocean proximity, groups in first-appearance order.
    ///
    /// Rows missing any of the three fields are skipped.
    pub fn proximity_groups(&self) -> Result<Vec<ProximityGroup>, HousingError> {
        let income = self.df.column(MEDIAN_INCOME)?.cast(&DataType::Float64)?;
        let income = income.f64()?;
        let value = self.df.column(MEDIAN_HOUSE_VALUE)?.cast(&DataType::Float64)?;
        let value = value.f64()?;
        let proximity = self.df.column(OCEAN_PROXIMITY)?.cast(&DataType::String)?;
        let proximity = proximity.str()?;

        let mut groups: Vec<ProximityGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for i in 0..self.df.height() {
            if let (Some(x), Some(y), Some(p)) = (income.get(i), value.get(i), proximity.get(i)) {
                let idx = *index.entry(p.to_string()).or_insert_with(|| {
                    groups.push(ProximityGroup {
                        proximity: p.to_string(),
                        income: Vec::new(),
                        house_value: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[idx].income.push(x);
                groups[idx].house_value.push(y);
            }
        }

        Ok(groups)
    }
}
