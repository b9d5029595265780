//! Chart rendering
//!
//! Composes the drift series, the derived stress series, optional seismic
//! markers and the ZFCM threshold line into a figure, then writes it into a
//! standalone HTML page. The page draws the figure as inline SVG and loads
//! nothing from the network.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::error::DashboardError;
use crate::stress::ZFCM_THRESHOLD;
use crate::types::{DashboardData, DashboardMode, EventMarker, Series};

mod svg;

pub const SYNTHETIC_TITLE: &str = "SUPT ψ-Fold Dashboard (Mini Baseline)";
pub const LIVE_TITLE: &str = "SUPT ψ-Fold Dashboard (Live Feeds)";
pub const ALERT_BANNER: &str = "ALERT: threshold breached";
pub const THRESHOLD_LABEL: &str = "ZFCM Threshold";

const DRIFT_COLOR: &str = "orange";
const STRESS_COLOR: &str = "red";
const EVENT_COLOR: &str = "purple";
const ALERT_COLOR: &str = "red";
const TITLE_COLOR: &str = "#2a3f5f";
const GRID_COLOR: &str = "#EBF0F8";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Legend clicks toggle the matching trace group
const LEGEND_SCRIPT: &str = r#"
document.querySelectorAll(".legend-item").forEach(function (item) {
  item.addEventListener("click", function () {
    var trace = document.getElementById(item.getAttribute("data-trace"));
    var hidden = trace.style.display === "none";
    trace.style.display = hidden ? "" : "none";
    item.style.opacity = hidden ? "1" : "0.4";
  });
});
"#;

/// Figure model: traces plus layout, serialized in plotly.js's JSON shape
/// for the page's embedded data block
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub name: String,
    pub mode: &'static str,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textposition: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub size: Vec<f64>,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl Title {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            font: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: Title,
    pub gridcolor: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<&'static str>,
}

/// Horizontal line spanning the plot width
#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub shape_type: &'static str,
    pub xref: &'static str,
    pub x0: f64,
    pub x1: f64,
    pub yref: &'static str,
    pub y0: f64,
    pub y1: f64,
    pub line: Line,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub text: String,
    pub xref: &'static str,
    pub x: f64,
    pub yref: &'static str,
    pub y: f64,
    pub xanchor: &'static str,
    pub yanchor: &'static str,
    pub showarrow: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub yaxis2: Axis,
    pub shapes: Vec<Shape>,
    pub annotations: Vec<Annotation>,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
}

/// Figure title for a run
pub fn compose_title(mode: DashboardMode, alert: bool, rendered_at: DateTime<Utc>) -> Title {
    let base = match mode {
        DashboardMode::Synthetic => SYNTHETIC_TITLE,
        DashboardMode::Live => LIVE_TITLE,
    };
    let updated = rendered_at.format("%Y-%m-%d %H:%M UTC");

    // Only live runs carry the breach banner
    let breached = mode == DashboardMode::Live && alert;
    let text = if breached {
        format!("{ALERT_BANNER} | {base}<br>Last update: {updated}")
    } else {
        format!("{base}<br>Last update: {updated}")
    };

    Title {
        text,
        font: Some(Font {
            color: if breached { ALERT_COLOR } else { TITLE_COLOR },
        }),
    }
}

/// Renderer for dashboard figures
pub struct ChartRenderer {
    div_id: String,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer {
    /// Create a renderer with a fresh plot div id
    pub fn new() -> Self {
        Self {
            div_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_div_id(div_id: impl Into<String>) -> Self {
        Self {
            div_id: div_id.into(),
        }
    }

    /// Build the figure for `data`, stamping the title with `rendered_at`
    pub fn compose(&self, data: &DashboardData, rendered_at: DateTime<Utc>) -> Figure {
        let mut traces = vec![drift_trace(&data.series), stress_trace(&data.series)];
        if data.mode == DashboardMode::Live {
            traces.push(event_trace(&data.events));
        }

        let layout = Layout {
            title: compose_title(data.mode, data.alert(), rendered_at),
            xaxis: axis("Date/Time (UTC)"),
            yaxis: axis("ΔΦ Drift"),
            yaxis2: Axis {
                overlaying: Some("y"),
                side: Some("right"),
                ..axis("Stress")
            },
            shapes: vec![Shape {
                shape_type: "line",
                xref: "paper",
                x0: 0.0,
                x1: 1.0,
                yref: "y2",
                y0: ZFCM_THRESHOLD,
                y1: ZFCM_THRESHOLD,
                line: Line {
                    color: "black",
                    dash: Some("dash"),
                },
            }],
            annotations: vec![Annotation {
                text: THRESHOLD_LABEL.to_string(),
                xref: "paper",
                x: 1.0,
                yref: "y2",
                y: ZFCM_THRESHOLD,
                xanchor: "right",
                yanchor: "bottom",
                showarrow: false,
            }],
            paper_bgcolor: "white",
            plot_bgcolor: "white",
        };

        Figure {
            data: traces,
            layout,
        }
    }

    /// Standalone HTML page for `figure`.
    ///
    /// The chart is inline SVG; the figure itself is embedded alongside as a
    /// JSON data block.
    pub fn render_html(&self, figure: &Figure) -> Result<String, DashboardError> {
        let figure_json = serde_json::to_string(figure)
            .map_err(|e| DashboardError::Encoding(e.to_string()))?
            .replace("</", "<\\/");

        let page_title = figure.layout.title.text.replace("<br>", " - ");
        let page_title = html_escape::encode_text(&page_title);
        let div_id = html_escape::encode_double_quoted_attribute(&self.div_id);
        let chart = svg::render_svg(figure, &self.div_id);
        let background = figure.layout.paper_bgcolor;

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{page_title}</title>
<style>
body {{ margin: 0; background: {background}; }}
.psifold-chart {{ max-width: 1200px; margin: 0 auto; }}
</style>
</head>
<body>
<div id="{div_id}" class="psifold-chart">
{chart}
</div>
<script type="application/json" id="{div_id}-figure">{figure_json}</script>
<script type="text/javascript">{LEGEND_SCRIPT}</script>
</body>
</html>
"#
        ))
    }

    /// Render `figure` and write it to `path`, creating parent directories
    pub fn write_html(&self, figure: &Figure, path: &Path) -> Result<(), DashboardError> {
        let html = self.render_html(figure)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, html)?;

        info!("Wrote dashboard to {}", path.display());
        Ok(())
    }
}

fn axis(title: &str) -> Axis {
    Axis {
        title: Title::plain(title),
        gridcolor: GRID_COLOR,
        overlaying: None,
        side: None,
    }
}

fn format_timestamps(timestamps: impl Iterator<Item = DateTime<Utc>>) -> Vec<String> {
    timestamps
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .collect()
}

fn drift_trace(series: &Series) -> Trace {
    Trace {
        trace_type: "scatter",
        name: "ΔΦ Drift".to_string(),
        mode: "lines+markers",
        x: format_timestamps(series.samples().iter().map(|s| s.timestamp())),
        y: series.drifts(),
        yaxis: None,
        line: Some(Line {
            color: DRIFT_COLOR,
            dash: None,
        }),
        marker: None,
        text: None,
        textposition: None,
    }
}

fn stress_trace(series: &Series) -> Trace {
    Trace {
        trace_type: "scatter",
        name: "Stress k(ΔΦ)".to_string(),
        mode: "lines+markers",
        x: format_timestamps(series.samples().iter().map(|s| s.timestamp())),
        y: series.stresses(),
        yaxis: Some("y2"),
        line: Some(Line {
            color: STRESS_COLOR,
            dash: None,
        }),
        marker: None,
        text: None,
        textposition: None,
    }
}

/// Seismic markers pinned to y = 0 on the drift axis
fn event_trace(events: &[EventMarker]) -> Trace {
    Trace {
        trace_type: "scatter",
        name: "Seismic events".to_string(),
        mode: "markers+text",
        x: format_timestamps(events.iter().map(|e| e.timestamp)),
        y: vec![0.0; events.len()],
        yaxis: None,
        line: None,
        marker: Some(Marker {
            size: events.iter().map(EventMarker::marker_size).collect(),
            color: EVENT_COLOR,
        }),
        text: Some(events.iter().map(EventMarker::label).collect()),
        textposition: Some("top center"),
    }
}
