//! Data module - CSV loading, derived columns and aggregation queries

pub mod encoding;
pub mod housing;
mod deriver;
mod loader;
mod table;

pub use deriver::{
    compute_sales, epoch_days, from_epoch_days, month_abbrev, parse_order_date, DeriveError,
    Deriver, SalesRecord,
};
pub use encoding::{TextEncoding, DEFAULT_ENCODINGS};
pub use housing::{HousingError, HousingTable, ProximityGroup};
pub use loader::{DataLoader, LoadedCsv, LoaderError};
pub use table::{
    reconstruct_month, CategoryTotal, MonthlyPoint, QueryError, SalesTable, TableError,
};

/// Column names of the sales dataset.
pub mod columns {
    pub const ORDER_DATE: &str = "ORDERDATE";
    pub const PRODUCT_LINE: &str = "PRODUCTLINE";
    pub const QUANTITY_ORDERED: &str = "QUANTITYORDERED";
    pub const PRICE_EACH: &str = "PRICEEACH";
    pub const MONTH: &str = "MONTH";
    pub const YEAR: &str = "YEAR";
    pub const SALES: &str = "SALES";
}
