//! Charts module - Chart descriptions and rendering

pub mod builder;
pub mod figure;
mod plotter;

pub use builder::{ChartBuilder, HistogramBins, PRICE_HISTOGRAM_BINS};
pub use figure::{AxisData, Figure, Trace};
pub use plotter::ChartPlotter;
