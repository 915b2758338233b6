//! Chart Description Module
//! Serializable figures (traces + layout) in plotly's JSON vocabulary.

use chrono::NaiveDate;
use serde::Serialize;

/// A complete chart description: what to draw and how to lay it out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout::new(title),
        }
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.data.push(trace);
        self
    }

    pub fn with_axis_titles(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.layout.xaxis = AxisLayout::titled(x);
        self.layout.yaxis = AxisLayout::titled(y);
        self
    }

    pub fn title(&self) -> &str {
        &self.layout.title.text
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// X-axis values: category labels, calendar dates or plain numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisData {
    Labels(Vec<String>),
    Dates(Vec<NaiveDate>),
    Numbers(Vec<f64>),
}

impl AxisData {
    pub fn len(&self) -> usize {
        match self {
            AxisData::Labels(v) => v.len(),
            AxisData::Dates(v) => v.len(),
            AxisData::Numbers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar(BarTrace),
    Scatter(ScatterTrace),
    Pie(PieTrace),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub name: String,
    pub x: AxisData,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScatterMode {
    Lines,
    Markers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub x: AxisData,
    pub y: Vec<f64>,
    pub mode: ScatterMode,
    /// `Some("y2")` plots against the secondary y axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

impl ScatterTrace {
    pub fn on_secondary_axis(&self) -> bool {
        self.yaxis.as_deref() == Some(SECONDARY_Y)
    }
}

pub const SECONDARY_Y: &str = "y2";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieTrace {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLayout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
}

impl AxisLayout {
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Title { text: text.into() },
            overlaying: None,
            side: None,
        }
    }

    /// A right-hand axis drawn over the primary y axis.
    pub fn secondary(text: impl Into<String>) -> Self {
        Self {
            overlaying: Some("y".to_string()),
            side: Some("right".to_string()),
            ..Self::titled(text)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: AxisLayout,
    pub yaxis: AxisLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis2: Option<AxisLayout>,
    pub showlegend: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bargap: Option<f64>,
}

impl Layout {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Title { text: title.into() },
            xaxis: AxisLayout::titled(""),
            yaxis: AxisLayout::titled(""),
            yaxis2: None,
            showlegend: true,
            margin: None,
            bargap: None,
        }
    }
}
