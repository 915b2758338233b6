//! Chart Builder Module
//! Turns query results into chart descriptions.

use crate::charts::figure::{
    AxisData, AxisLayout, BarTrace, Figure, Margin, PieTrace, ScatterMode, ScatterTrace, Trace,
    SECONDARY_Y,
};
use crate::data::{CategoryTotal, MonthlyPoint, ProximityGroup};
use statrs::statistics::Statistics;

/// Bin count of the house value histogram.
pub const PRICE_HISTOGRAM_BINS: usize = 50;

const COMPACT_MARGIN: Margin = Margin {
    l: 0,
    r: 0,
    t: 30,
    b: 0,
};

/// Equal-width histogram bins.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBins {
    pub centers: Vec<f64>,
    pub counts: Vec<f64>,
    pub width: f64,
}

impl HistogramBins {
    /// Split `values` into `nbins` equal-width bins spanning their range.
    ///
    /// The maximum lands in the last bin. A constant sample gets a single
    /// unit-width bin.
    pub fn compute(values: &[f64], nbins: usize) -> Self {
        let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if values.is_empty() || nbins == 0 {
            return Self {
                centers: Vec::new(),
                counts: Vec::new(),
                width: 0.0,
            };
        }

        let min = Statistics::min(values.iter());
        let max = Statistics::max(values.iter());
        if max <= min {
            return Self {
                centers: vec![min],
                counts: vec![values.len() as f64],
                width: 1.0,
            };
        }

        let width = (max - min) / nbins as f64;
        let mut counts = vec![0.0; nbins];
        for v in &values {
            let idx = (((v - min) / width).floor() as usize).min(nbins - 1);
            counts[idx] += 1.0;
        }
        let centers = (0..nbins)
            .map(|i| min + width * (i as f64 + 0.5))
            .collect();

        Self {
            centers,
            counts,
            width,
        }
    }
}

/// Builds the dashboard and API figures.
pub struct ChartBuilder;

impl ChartBuilder {
    /// Bar chart of the top product lines.
    pub fn top_products_bar(totals: &[CategoryTotal]) -> Figure {
        let mut fig = Figure::new(format!(
            "Top {} Product Lines by Total Sales",
            totals.len()
        ))
        .with_axis_titles("PRODUCTLINE", "SALES")
        .with_trace(Trace::Bar(BarTrace {
            name: "SALES".to_string(),
            x: AxisData::Labels(totals.iter().map(|t| t.product_line.clone()).collect()),
            y: totals.iter().map(|t| t.sales).collect(),
            width: None,
        }));
        fig.layout.showlegend = false;
        fig.layout.margin = Some(COMPACT_MARGIN);
        fig
    }

    /// Line chart of monthly sales for one product line.
    pub fn monthly_sales_line(product_line: &str, series: &[MonthlyPoint]) -> Figure {
        let mut fig = Figure::new(format!("Monthly Sales for {product_line}"))
            .with_axis_titles("DATE", "SALES")
            .with_trace(Trace::Scatter(ScatterTrace {
                name: "Sales".to_string(),
                x: AxisData::Dates(series.iter().map(|p| p.date).collect()),
                y: series.iter().map(|p| p.sales).collect(),
                mode: ScatterMode::Lines,
                yaxis: None,
            }));
        fig.layout.showlegend = false;
        fig.layout.margin = Some(COMPACT_MARGIN);
        fig
    }

    /// Dual-axis chart: summed sales on the left axis, average unit price on the right.
    ///
    /// Months with no price average are left out of the price trace only.
    pub fn price_vs_sales(product_line: &str, series: &[MonthlyPoint]) -> Figure {
        let priced: Vec<&MonthlyPoint> = series.iter().filter(|p| p.avg_price.is_some()).collect();

        let mut fig = Figure::new(format!("Price vs Sales for {product_line}"))
            .with_axis_titles("DATE", "Sales")
            .with_trace(Trace::Scatter(ScatterTrace {
                name: "Sales".to_string(),
                x: AxisData::Dates(series.iter().map(|p| p.date).collect()),
                y: series.iter().map(|p| p.sales).collect(),
                mode: ScatterMode::Lines,
                yaxis: None,
            }))
            .with_trace(Trace::Scatter(ScatterTrace {
                name: "Avg Price".to_string(),
                x: AxisData::Dates(priced.iter().map(|p| p.date).collect()),
                y: priced.iter().filter_map(|p| p.avg_price).collect(),
                mode: ScatterMode::Lines,
                yaxis: Some(SECONDARY_Y.to_string()),
            }));
        fig.layout.yaxis2 = Some(AxisLayout::secondary("Avg Price"));
        fig.layout.showlegend = false;
        fig.layout.margin = Some(COMPACT_MARGIN);
        fig
    }

    /// Pie chart of every product line's share of sales.
    pub fn sales_distribution_pie(totals: &[CategoryTotal]) -> Figure {
        Figure::new("Sales Distribution for Product Lines").with_trace(Trace::Pie(PieTrace {
            labels: totals.iter().map(|t| t.product_line.clone()).collect(),
            values: totals.iter().map(|t| t.sales).collect(),
        }))
    }

    /// Histogram of house values, pre-binned into bars.
    pub fn price_histogram(values: &[f64], nbins: usize) -> Figure {
        let bins = HistogramBins::compute(values, nbins);
        let mut fig = Figure::new("Distribution of Housing Prices")
            .with_axis_titles("median_house_value", "count")
            .with_trace(Trace::Bar(BarTrace {
                name: "count".to_string(),
                x: AxisData::Numbers(bins.centers),
                y: bins.counts,
                width: Some(bins.width),
            }));
        fig.layout.bargap = Some(0.0);
        fig.layout.showlegend = false;
        fig
    }

    /// Income vs house value scatter, one marker trace per ocean proximity value.
    pub fn income_value_scatter(groups: &[ProximityGroup]) -> Figure {
        groups.iter().fold(
            Figure::new("Median Income vs. Median House Value")
                .with_axis_titles("median_income", "median_house_value"),
            |fig, group| {
                fig.with_trace(Trace::Scatter(ScatterTrace {
                    name: group.proximity.clone(),
                    x: AxisData::Numbers(group.income.clone()),
                    y: group.house_value.clone(),
                    mode: ScatterMode::Markers,
                    yaxis: None,
                }))
            },
        )
    }
}
