//! Chart Plotter Module
//! Renders chart descriptions interactively using egui_plot.

use crate::charts::figure::{
    AxisData, BarTrace, Figure, PieTrace, ScatterMode, ScatterTrace, Trace,
};
use crate::data::{epoch_days, from_epoch_days};
use chrono::NaiveDate;
use egui::{Color32, RichText, Stroke};
use egui_plot::{AxisHints, Bar, BarChart, HPlacement, Legend, Line, Plot, PlotPoints, Points};

/// Color palette for traces and pie slices
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

/// Segments used to approximate a full circle in pie charts
const PIE_SEGMENTS: usize = 96;

/// Linear map that puts a secondary series on the primary axis' scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    primary_min: f64,
    secondary_min: f64,
    ratio: f64,
}

impl AxisScale {
    /// Fit the secondary range onto the primary range.
    pub fn fit(primary: &[f64], secondary: &[f64]) -> Self {
        let (p_min, p_max) = value_range(primary);
        let (s_min, s_max) = value_range(secondary);
        let p_span = p_max - p_min;
        let s_span = s_max - s_min;
        let ratio = if p_span > 0.0 && s_span > 0.0 {
            p_span / s_span
        } else {
            1.0
        };
        Self {
            primary_min: p_min,
            secondary_min: s_min,
            ratio,
        }
    }

    pub fn to_primary(&self, secondary: f64) -> f64 {
        self.primary_min + (secondary - self.secondary_min) * self.ratio
    }

    pub fn to_secondary(&self, primary: f64) -> f64 {
        self.secondary_min + (primary - self.primary_min) / self.ratio
    }
}

fn value_range(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);
    if min.is_infinite() {
        (0.0, 1.0)
    } else {
        (min, max)
    }
}

/// Date on the plot's x axis, in days since 1970-01-01.
fn date_from_plot_x(x: f64) -> Option<NaiveDate> {
    from_epoch_days(x.round() as i32)
}

fn x_positions(x: &AxisData) -> Vec<f64> {
    match x {
        AxisData::Labels(labels) => (0..labels.len()).map(|i| i as f64).collect(),
        AxisData::Dates(dates) => dates.iter().map(|d| epoch_days(*d) as f64).collect(),
        AxisData::Numbers(values) => values.clone(),
    }
}

/// Compact number for axis labels, e.g. 1.2M, 35k.
pub fn compact_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 10_000.0 {
        format!("{:.0}k", value / 1_000.0)
    } else if abs >= 100.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Draws chart descriptions into egui.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn trace_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw any figure with the renderer that fits its traces.
    pub fn draw_figure(ui: &mut egui::Ui, id: &str, figure: &Figure, height: f32) {
        ui.label(RichText::new(figure.title()).size(14.0).strong());

        if let Some(Trace::Pie(pie)) = figure.data.iter().find(|t| matches!(t, Trace::Pie(_))) {
            Self::draw_pie_chart(ui, pie, height);
            return;
        }

        let has_secondary = figure.data.iter().any(|t| match t {
            Trace::Scatter(s) => s.on_secondary_axis(),
            _ => false,
        });
        if has_secondary {
            Self::draw_dual_axis_chart(ui, id, figure, height);
        } else {
            Self::draw_xy_chart(ui, id, figure, height);
        }
    }

    /// Bars and single-axis lines/markers.
    fn draw_xy_chart(ui: &mut egui::Ui, id: &str, figure: &Figure, height: f32) {
        let labels = figure.data.iter().find_map(|t| match t {
            Trace::Bar(BarTrace {
                x: AxisData::Labels(l),
                ..
            }) => Some(l.clone()),
            _ => None,
        });
        let is_dates = figure.data.iter().any(|t| match t {
            Trace::Scatter(s) => matches!(s.x, AxisData::Dates(_)),
            Trace::Bar(b) => matches!(b.x, AxisData::Dates(_)),
            Trace::Pie(_) => false,
        });

        let plot = Plot::new(id)
            .height(height)
            .allow_scroll(false)
            .x_axis_label(figure.layout.xaxis.title.text.clone())
            .y_axis_label(figure.layout.yaxis.title.text.clone())
            .y_axis_formatter(|mark, _range| compact_number(mark.value));
        let plot = if figure.layout.showlegend {
            plot.legend(Legend::default())
        } else {
            plot
        };
        let plot = match (labels, is_dates) {
            (Some(labels), _) => plot.x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            }),
            (None, true) => plot.x_axis_formatter(|mark, _range| {
                date_from_plot_x(mark.value)
                    .map(|d| d.format("%b %Y").to_string())
                    .unwrap_or_default()
            }),
            (None, false) => plot.x_axis_formatter(|mark, _range| compact_number(mark.value)),
        };

        plot.show(ui, |plot_ui| {
            for (i, trace) in figure.data.iter().enumerate() {
                let color = Self::trace_color(i);
                match trace {
                    Trace::Bar(bar) => {
                        let xs = x_positions(&bar.x);
                        let width = bar.width.unwrap_or(0.6);
                        let bars: Vec<Bar> = xs
                            .iter()
                            .zip(bar.y.iter())
                            .map(|(&x, &y)| Bar::new(x, y).width(width).fill(color))
                            .collect();
                        plot_ui.bar_chart(BarChart::new(bars).color(color).name(&bar.name));
                    }
                    Trace::Scatter(scatter) => {
                        Self::plot_scatter(plot_ui, scatter, color, |y| y);
                    }
                    Trace::Pie(_) => {}
                }
            }
        });
    }

    /// Lines on two independent y scales sharing the x axis.
    fn draw_dual_axis_chart(ui: &mut egui::Ui, id: &str, figure: &Figure, height: f32) {
        let scatters: Vec<&ScatterTrace> = figure
            .data
            .iter()
            .filter_map(|t| match t {
                Trace::Scatter(s) => Some(s),
                _ => None,
            })
            .collect();
        let primary: Vec<f64> = scatters
            .iter()
            .filter(|s| !s.on_secondary_axis())
            .flat_map(|s| s.y.iter().copied())
            .collect();
        let secondary: Vec<f64> = scatters
            .iter()
            .filter(|s| s.on_secondary_axis())
            .flat_map(|s| s.y.iter().copied())
            .collect();
        let scale = AxisScale::fit(&primary, &secondary);

        let right_title = figure
            .layout
            .yaxis2
            .as_ref()
            .map(|a| a.title.text.clone())
            .unwrap_or_default();

        let y_axes = vec![
            AxisHints::new_y()
                .label(figure.layout.yaxis.title.text.clone())
                .formatter(|mark, _range| compact_number(mark.value)),
            AxisHints::new_y()
                .label(right_title)
                .placement(HPlacement::Right)
                .formatter(move |mark, _range| compact_number(scale.to_secondary(mark.value))),
        ];

        Plot::new(id)
            .height(height)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_label(figure.layout.xaxis.title.text.clone())
            .custom_y_axes(y_axes)
            .x_axis_formatter(|mark, _range| {
                date_from_plot_x(mark.value)
                    .map(|d| d.format("%b %Y").to_string())
                    .unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for (i, scatter) in scatters.iter().enumerate() {
                    let color = Self::trace_color(i);
                    if scatter.on_secondary_axis() {
                        Self::plot_scatter(plot_ui, scatter, color, |y| scale.to_primary(y));
                    } else {
                        Self::plot_scatter(plot_ui, scatter, color, |y| y);
                    }
                }
            });
    }

    fn plot_scatter(
        plot_ui: &mut egui_plot::PlotUi,
        scatter: &ScatterTrace,
        color: Color32,
        map_y: impl Fn(f64) -> f64,
    ) {
        let points: Vec<[f64; 2]> = x_positions(&scatter.x)
            .into_iter()
            .zip(scatter.y.iter())
            .map(|(x, &y)| [x, map_y(y)])
            .collect();

        match scatter.mode {
            ScatterMode::Lines => {
                plot_ui.line(
                    Line::new(PlotPoints::from(points))
                        .color(color)
                        .width(2.0)
                        .name(&scatter.name),
                );
            }
            ScatterMode::Markers => {
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .radius(2.0)
                        .color(color.gamma_multiply(0.7))
                        .name(&scatter.name),
                );
            }
        }
    }

    /// Pie chart painted as triangle fans, with a legend of shares.
    fn draw_pie_chart(ui: &mut egui::Ui, pie: &PieTrace, height: f32) {
        let total: f64 = pie.values.iter().filter(|v| **v > 0.0).sum();
        if total <= 0.0 {
            ui.label(RichText::new("No Data").color(Color32::GRAY));
            return;
        }

        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(height, height), egui::Sense::hover());
            let center = rect.center();
            let radius = height * 0.45;
            let painter = ui.painter();

            let mut start = -std::f64::consts::FRAC_PI_2;
            for (i, &value) in pie.values.iter().enumerate() {
                if value <= 0.0 {
                    continue;
                }
                let sweep = value / total * std::f64::consts::TAU;
                let steps = ((sweep / std::f64::consts::TAU) * PIE_SEGMENTS as f64).ceil() as usize;
                let steps = steps.max(1);
                let color = Self::trace_color(i);

                for s in 0..steps {
                    let a0 = start + sweep * s as f64 / steps as f64;
                    let a1 = start + sweep * (s + 1) as f64 / steps as f64;
                    let p0 = center + egui::vec2(a0.cos() as f32, a0.sin() as f32) * radius;
                    let p1 = center + egui::vec2(a1.cos() as f32, a1.sin() as f32) * radius;
                    painter.add(egui::Shape::convex_polygon(
                        vec![center, p0, p1],
                        color,
                        Stroke::NONE,
                    ));
                }
                start += sweep;
            }

            ui.add_space(12.0);
            ui.vertical(|ui| {
                for (i, (label, &value)) in pie.labels.iter().zip(pie.values.iter()).enumerate() {
                    ui.horizontal(|ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                        ui.painter().rect_filled(rect, 3.0, Self::trace_color(i));
                        let share = if value > 0.0 { value / total * 100.0 } else { 0.0 };
                        ui.label(RichText::new(format!("{label}  {share:.1}%")).size(13.0));
                    });
                }
            });
        });
    }
}
