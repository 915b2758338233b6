//! Dashboard Module
//! Turns product-line selections into fully computed chart panels.

use crate::charts::{ChartBuilder, Figure};
use crate::data::{QueryError, SalesTable};
use tracing::debug;

/// Number of product lines offered in the dropdown by default.
pub const DEFAULT_TOP_N: usize = 5;

/// State changes the dashboard reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    ProductLineSelected(String),
}

/// Every panel of the dashboard for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardCharts {
    pub selected: String,
    pub distribution: Figure,
    pub top_products: Figure,
    pub monthly_sales: Figure,
    pub price_vs_sales: Figure,
}

impl DashboardCharts {
    /// Panels in display order, keyed by a stable id.
    pub fn panels(&self) -> [(&'static str, &Figure); 4] {
        [
            ("product-sales-distribution-chart", &self.distribution),
            ("top-products-chart", &self.top_products),
            ("price-vs-sales-chart", &self.price_vs_sales),
            ("monthly-sales-chart", &self.monthly_sales),
        ]
    }
}

/// The dashboard's read-only data context plus its dropdown options.
#[derive(Debug, Clone)]
pub struct Dashboard {
    table: SalesTable,
    top_n: usize,
    options: Vec<String>,
}

impl Dashboard {
    /// Offer the `top_n` best-selling product lines as dropdown options.
    pub fn new(table: SalesTable, top_n: usize) -> Result<Self, QueryError> {
        let options = table
            .top_n_by_category(top_n)?
            .into_iter()
            .map(|t| t.product_line)
            .collect();
        Ok(Self {
            table,
            top_n,
            options,
        })
    }

    pub fn table(&self) -> &SalesTable {
        &self.table
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// First option, the best-selling product line.
    pub fn default_selection(&self) -> Option<&str> {
        self.options.first().map(String::as_str)
    }

    /// Recompute every panel for the event's new state.
    pub fn handle(&self, event: &DashboardEvent) -> Result<DashboardCharts, QueryError> {
        match event {
            DashboardEvent::ProductLineSelected(product_line) => {
                debug!("Recomputing charts for {product_line}");
                let series = self.table.time_series(product_line)?;
                Ok(DashboardCharts {
                    selected: product_line.clone(),
                    distribution: ChartBuilder::sales_distribution_pie(
                        &self.table.category_distribution()?,
                    ),
                    top_products: ChartBuilder::top_products_bar(
                        &self.table.top_n_by_category(self.top_n)?,
                    ),
                    monthly_sales: ChartBuilder::monthly_sales_line(product_line, &series),
                    price_vs_sales: ChartBuilder::price_vs_sales(product_line, &series),
                })
            }
        }
    }

    /// Charts for the default selection, if the dataset has any product line.
    pub fn initial_charts(&self) -> Option<Result<DashboardCharts, QueryError>> {
        self.default_selection()
            .map(|p| self.handle(&DashboardEvent::ProductLineSelected(p.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::Trace;
    use crate::data::columns::{ORDER_DATE, PRICE_EACH, PRODUCT_LINE, QUANTITY_ORDERED};
    use polars::prelude::*;

    fn dashboard(top_n: usize) -> Dashboard {
        let df = df!(
            ORDER_DATE => ["2024-01-05", "2024-02-10", "2024-01-15", "2024-03-01"],
            PRODUCT_LINE => ["A", "A", "B", "C"],
            QUANTITY_ORDERED => [2i64, 1, 5, 1],
            PRICE_EACH => [10.0, 20.0, 4.0, 1.0]
        )
        .unwrap();
        Dashboard::new(SalesTable::from_frame(&df).unwrap(), top_n).unwrap()
    }

    #[test]
    fn test_options_are_top_product_lines() {
        let dashboard = dashboard(2);
        assert_eq!(dashboard.options(), ["A".to_string(), "B".to_string()]);
        assert_eq!(dashboard.default_selection(), Some("A"));
    }

    #[test]
    fn test_selection_recomputes_every_panel() {
        let dashboard = dashboard(DEFAULT_TOP_N);
        let charts = dashboard
            .handle(&DashboardEvent::ProductLineSelected("B".to_string()))
            .unwrap();
        assert_eq!(charts.selected, "B");
        assert_eq!(charts.monthly_sales.title(), "Monthly Sales for B");
        assert_eq!(charts.price_vs_sales.title(), "Price vs Sales for B");
        assert_eq!(charts.top_products.title(), "Top 3 Product Lines by Total Sales");

        let Trace::Pie(pie) = &charts.distribution.data[0] else {
            panic!("expected a pie trace");
        };
        assert_eq!(pie.values.iter().sum::<f64>(), 61.0);
    }

    #[test]
    fn test_handling_is_repeatable() {
        let dashboard = dashboard(DEFAULT_TOP_N);
        let event = DashboardEvent::ProductLineSelected("A".to_string());
        let first = dashboard.handle(&event).unwrap();
        dashboard
            .handle(&DashboardEvent::ProductLineSelected("C".to_string()))
            .unwrap();
        assert_eq!(dashboard.handle(&event).unwrap(), first);
        assert_eq!(dashboard.initial_charts().unwrap().unwrap(), first);
    }

    #[test]
    fn test_empty_dataset_has_no_selection() {
        let df = df!(
            ORDER_DATE => Vec::<&str>::new(),
            PRODUCT_LINE => Vec::<&str>::new(),
            QUANTITY_ORDERED => Vec::<i64>::new(),
            PRICE_EACH => Vec::<f64>::new()
        )
        .unwrap();
        let dashboard = Dashboard::new(SalesTable::from_frame(&df).unwrap(), 5).unwrap();
        assert!(dashboard.options().is_empty());
        assert!(dashboard.initial_charts().is_none());
    }
}
