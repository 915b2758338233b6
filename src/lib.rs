//! salesboard - Product Sales Dashboard & Housing Chart API
//!
//! Loads a sales CSV once, derives month/year/sales columns and builds
//! chart descriptions that are either drawn in a native window or served
//! as JSON.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod gui;
pub mod server;

pub use dashboard::{Dashboard, DashboardCharts, DashboardEvent};
pub use data::{HousingTable, SalesTable};
