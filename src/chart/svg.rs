//! SVG drawing for dashboard figures
//!
//! Lays a [`Figure`] out on a fixed canvas: drift on the left axis, stress on
//! the right, time along the bottom. Every point carries a `<title>`, which
//! browsers show on hover, and each trace sits in its own group so the legend
//! can toggle it.

use chrono::{DateTime, NaiveDateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};

use super::{Figure, Layout, Title, Trace, TIMESTAMP_FORMAT, TITLE_COLOR};

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 560.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 80.0;
const MARGIN_TOP: f64 = 100.0;
const MARGIN_BOTTOM: f64 = 60.0;

const TICK_COUNT: usize = 5;
const POINT_RADIUS: f64 = 3.0;
const LEGEND_SPACING: f64 = 170.0;

/// Half-span, in seconds, of a time axis holding a single instant
const MIN_TIME_SPAN: f64 = 1800.0;
/// Half-span of a value axis holding a single value
const MIN_VALUE_SPAN: f64 = 0.5;

const PRIMARY_AXIS: &str = "y";
const SECONDARY_AXIS: &str = "y2";

/// Linear map from a data range onto a pixel range
#[derive(Debug, Clone, Copy, PartialEq)]
struct Scale {
    lo: f64,
    hi: f64,
    from: f64,
    to: f64,
}

impl Scale {
    /// Range covering `values` with 10% headroom on each side
    fn fit(values: impl IntoIterator<Item = f64>, min_span: f64, from: f64, to: f64) -> Self {
        let (lo, hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        // No values at all
        let (lo, hi) = if lo > hi { (0.0, 0.0) } else { (lo, hi) };
        let pad = if hi > lo { (hi - lo) * 0.1 } else { min_span };

        Self {
            lo: lo - pad,
            hi: hi + pad,
            from,
            to,
        }
    }

    fn map(&self, value: f64) -> f64 {
        self.from + (value - self.lo) / (self.hi - self.lo) * (self.to - self.from)
    }

    fn ticks(&self) -> Vec<f64> {
        (0..TICK_COUNT)
            .map(|i| self.lo + (self.hi - self.lo) * i as f64 / (TICK_COUNT - 1) as f64)
            .collect()
    }
}

/// A trace point that could be placed on the time axis
#[derive(Debug, Clone, Copy)]
struct Point {
    /// Position in the trace's `x`/`y` arrays
    index: usize,
    seconds: f64,
    value: f64,
}

/// Scales for the plot area
struct Frame {
    x: Scale,
    y: Scale,
    y2: Scale,
}

impl Frame {
    fn fit(figure: &Figure, points: &[Vec<Point>]) -> Self {
        let left = MARGIN_LEFT;
        let right = WIDTH - MARGIN_RIGHT;
        let top = MARGIN_TOP;
        let bottom = HEIGHT - MARGIN_BOTTOM;

        let seconds = points.iter().flatten().map(|p| p.seconds);
        Self {
            x: Scale::fit(seconds, MIN_TIME_SPAN, left, right),
            y: Scale::fit(
                axis_values(figure, points, PRIMARY_AXIS),
                MIN_VALUE_SPAN,
                bottom,
                top,
            ),
            y2: Scale::fit(
                axis_values(figure, points, SECONDARY_AXIS),
                MIN_VALUE_SPAN,
                bottom,
                top,
            ),
        }
    }

    fn scale_for(&self, axis_ref: &str) -> &Scale {
        if axis_ref == SECONDARY_AXIS {
            &self.y2
        } else {
            &self.y
        }
    }

    /// Horizontal position of a fraction of the plot width
    fn paper_x(&self, fraction: f64) -> f64 {
        self.x.from + fraction * (self.x.to - self.x.from)
    }
}

/// Inline `<svg>` element for `figure`; `id` prefixes the trace group ids
pub(super) fn render_svg(figure: &Figure, id: &str) -> String {
    let points: Vec<Vec<Point>> = figure.data.iter().map(trace_points).collect();
    let frame = Frame::fit(figure, &points);

    let mut svg = format!(
        "<svg viewBox=\"0 0 {WIDTH} {HEIGHT}\" width=\"100%\" role=\"img\" \
         font-family=\"sans-serif\" font-size=\"12\">\n"
    );
    svg.push_str(&format!(
        "<rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"{}\"/>\n",
        figure.layout.paper_bgcolor
    ));

    push_title(&mut svg, &figure.layout.title);
    push_axes(&mut svg, &figure.layout, &frame);
    push_shapes(&mut svg, &figure.layout, &frame);
    for (i, (trace, points)) in figure.data.iter().zip(&points).enumerate() {
        push_trace(&mut svg, trace, points, &frame, &group_id(id, i));
    }
    push_annotations(&mut svg, &figure.layout, &frame);
    push_legend(&mut svg, &figure.data, id);

    svg.push_str("</svg>");
    svg
}

fn group_id(id: &str, trace_index: usize) -> String {
    format!("{id}-trace-{trace_index}")
}

fn trace_points(trace: &Trace) -> Vec<Point> {
    trace
        .x
        .iter()
        .zip(&trace.y)
        .enumerate()
        .filter_map(|(index, (x, &value))| {
            epoch_seconds(x).map(|seconds| Point {
                index,
                seconds,
                value,
            })
        })
        .collect()
}

/// Values plotted against `axis_ref`, including shapes drawn on it
fn axis_values(figure: &Figure, points: &[Vec<Point>], axis_ref: &str) -> Vec<f64> {
    let mut values: Vec<f64> = figure
        .data
        .iter()
        .zip(points)
        .filter(|(trace, _)| trace.yaxis.unwrap_or(PRIMARY_AXIS) == axis_ref)
        .flat_map(|(_, points)| points.iter().map(|p| p.value))
        .collect();

    values.extend(
        figure
            .layout
            .shapes
            .iter()
            .filter(|shape| shape.yref == axis_ref)
            .flat_map(|shape| [shape.y0, shape.y1]),
    );
    values
}

fn epoch_seconds(label: &str) -> Option<f64> {
    NaiveDateTime::parse_from_str(label, TIMESTAMP_FORMAT)
        .ok()
        .map(|t| t.and_utc().timestamp() as f64)
}

fn time_label(seconds: f64) -> String {
    DateTime::<Utc>::from_timestamp(seconds.round() as i64, 0)
        .map(|t| t.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn push_title(svg: &mut String, title: &Title) {
    let color = title.font.as_ref().map_or(TITLE_COLOR, |font| font.color);

    for (i, line) in title.text.split("<br>").enumerate() {
        let (y, size) = if i == 0 { (32.0, 18) } else { (32.0 + 22.0 * i as f64, 13) };
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{y:.1}\" text-anchor=\"middle\" font-size=\"{size}\" \
             fill=\"{color}\">{}</text>\n",
            WIDTH / 2.0,
            encode_text(line)
        ));
    }
}

fn push_axes(svg: &mut String, layout: &Layout, frame: &Frame) {
    let (left, right) = (frame.x.from, frame.x.to);
    let (bottom, top) = (frame.y.from, frame.y.to);

    for tick in frame.y.ticks() {
        let y = frame.y.map(tick);
        svg.push_str(&format!(
            "<line x1=\"{left:.1}\" y1=\"{y:.1}\" x2=\"{right:.1}\" y2=\"{y:.1}\" \
             stroke=\"{}\"/>\n",
            layout.yaxis.gridcolor
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{tick:.3}</text>\n",
            left - 8.0,
            y + 4.0
        ));
    }

    for tick in frame.y2.ticks() {
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"start\">{tick:.3}</text>\n",
            right + 8.0,
            frame.y2.map(tick) + 4.0
        ));
    }

    for tick in frame.x.ticks() {
        let x = frame.x.map(tick);
        svg.push_str(&format!(
            "<line x1=\"{x:.1}\" y1=\"{top:.1}\" x2=\"{x:.1}\" y2=\"{bottom:.1}\" \
             stroke=\"{}\"/>\n",
            layout.xaxis.gridcolor
        ));
        svg.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
            bottom + 18.0,
            time_label(tick)
        ));
    }

    svg.push_str(&format!(
        "<rect x=\"{left:.1}\" y=\"{top:.1}\" width=\"{:.1}\" height=\"{:.1}\" \
         fill=\"none\" stroke=\"#444\"/>\n",
        right - left,
        bottom - top
    ));

    let middle_y = (top + bottom) / 2.0;
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
        (left + right) / 2.0,
        HEIGHT - 12.0,
        encode_text(&layout.xaxis.title.text)
    ));
    svg.push_str(&format!(
        "<text transform=\"translate(20,{middle_y:.1}) rotate(-90)\" \
         text-anchor=\"middle\">{}</text>\n",
        encode_text(&layout.yaxis.title.text)
    ));
    svg.push_str(&format!(
        "<text transform=\"translate({:.1},{middle_y:.1}) rotate(90)\" \
         text-anchor=\"middle\">{}</text>\n",
        WIDTH - 20.0,
        encode_text(&layout.yaxis2.title.text)
    ));
}

fn push_shapes(svg: &mut String, layout: &Layout, frame: &Frame) {
    for shape in &layout.shapes {
        let (x0, x1) = if shape.xref == "paper" {
            (frame.paper_x(shape.x0), frame.paper_x(shape.x1))
        } else {
            (frame.x.map(shape.x0), frame.x.map(shape.x1))
        };
        let scale = frame.scale_for(shape.yref);
        let dash = match shape.line.dash {
            Some(_) => " stroke-dasharray=\"6 4\"",
            None => "",
        };

        svg.push_str(&format!(
            "<line x1=\"{x0:.1}\" y1=\"{:.1}\" x2=\"{x1:.1}\" y2=\"{:.1}\" stroke=\"{}\"{dash}/>\n",
            scale.map(shape.y0),
            scale.map(shape.y1),
            shape.line.color
        ));
    }
}

fn push_trace(svg: &mut String, trace: &Trace, points: &[Point], frame: &Frame, id: &str) {
    let scale = frame.scale_for(trace.yaxis.unwrap_or(PRIMARY_AXIS));
    let color = trace
        .line
        .as_ref()
        .map(|line| line.color)
        .or_else(|| trace.marker.as_ref().map(|marker| marker.color))
        .unwrap_or("black");

    svg.push_str(&format!("<g id=\"{}\">\n", encode_double_quoted_attribute(id)));

    if trace.mode.contains("lines") && !points.is_empty() {
        let path: Vec<String> = points
            .iter()
            .map(|p| format!("{:.1},{:.1}", frame.x.map(p.seconds), scale.map(p.value)))
            .collect();
        svg.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"/>\n",
            path.join(" ")
        ));
    }

    if trace.mode.contains("markers") {
        for point in points {
            let radius = trace
                .marker
                .as_ref()
                .and_then(|marker| marker.size.get(point.index))
                .map_or(POINT_RADIUS, |size| size / 2.0);
            let (cx, cy) = (frame.x.map(point.seconds), scale.map(point.value));
            let tooltip = format!("{} | {}: {:.4}", trace.name, trace.x[point.index], point.value);

            svg.push_str(&format!(
                "<circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{radius:.1}\" fill=\"{color}\">\
                 <title>{}</title></circle>\n",
                encode_text(&tooltip)
            ));

            if let Some(label) = trace.text.as_ref().and_then(|text| text.get(point.index)) {
                svg.push_str(&format!(
                    "<text x=\"{cx:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
                    cy - radius - 4.0,
                    encode_text(label)
                ));
            }
        }
    }

    svg.push_str("</g>\n");
}

fn push_annotations(svg: &mut String, layout: &Layout, frame: &Frame) {
    for annotation in &layout.annotations {
        let x = if annotation.xref == "paper" {
            frame.paper_x(annotation.x)
        } else {
            frame.x.map(annotation.x)
        };
        let y = frame.scale_for(annotation.yref).map(annotation.y);
        let anchor = match annotation.xanchor {
            "right" => "end",
            "left" => "start",
            _ => "middle",
        };
        let baseline = if annotation.yanchor == "bottom" { y - 4.0 } else { y + 12.0 };

        svg.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{baseline:.1}\" text-anchor=\"{anchor}\">{}</text>\n",
            encode_text(&annotation.text)
        ));
    }
}

fn push_legend(svg: &mut String, traces: &[Trace], id: &str) {
    let y = MARGIN_TOP - 16.0;

    for (i, trace) in traces.iter().enumerate() {
        let x = MARGIN_LEFT + i as f64 * LEGEND_SPACING;
        let color = trace
            .line
            .as_ref()
            .map(|line| line.color)
            .or_else(|| trace.marker.as_ref().map(|marker| marker.color))
            .unwrap_or("black");

        svg.push_str(&format!(
            "<g class=\"legend-item\" data-trace=\"{}\" style=\"cursor:pointer\">\
             <rect x=\"{x:.1}\" y=\"{:.1}\" width=\"14\" height=\"10\" fill=\"{color}\"/>\
             <text x=\"{:.1}\" y=\"{y:.1}\">{}</text></g>\n",
            encode_double_quoted_attribute(&group_id(id, i)),
            y - 9.0,
            x + 20.0,
            encode_text(&trace.name)
        ));
    }
}
