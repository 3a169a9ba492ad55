//! SVG rendering for figures

use anyhow::{Context as _, Result};
use serde::Serialize;
use tera::{Context, Tera};

use super::{Figure, MarkerSymbol};
use crate::model::{Bounds, Point};

// Plot margins in pixels: left, right, top, bottom
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 80.0;
const MARGIN_TOP: f64 = 100.0;
const MARGIN_BOTTOM: f64 = 80.0;

const TARGET_TICKS: usize = 6;

const SVG_TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="{{ width }}" height="{{ height }}" viewBox="0 0 {{ width }} {{ height }}">
  <rect width="{{ width }}" height="{{ height }}" fill="#ffffff"/>
  <rect x="{{ plot.left }}" y="{{ plot.top }}" width="{{ plot.width }}" height="{{ plot.height }}" fill="#E5ECF6"/>
  <g stroke="#ffffff" stroke-width="1">
{%- for t in x_ticks %}
    <line x1="{{ t.pos }}" y1="{{ plot.top }}" x2="{{ t.pos }}" y2="{{ plot.bottom }}"/>
{%- endfor %}
{%- for t in y_ticks %}
    <line x1="{{ plot.left }}" y1="{{ t.pos }}" x2="{{ plot.right }}" y2="{{ t.pos }}"/>
{%- endfor %}
  </g>
  <g font-family="Open Sans, Arial, sans-serif" font-size="12" fill="#2a3f5f">
{%- for t in x_ticks %}
    <text x="{{ t.pos }}" y="{{ plot.bottom + 18 }}" text-anchor="middle">{{ t.label }}</text>
{%- endfor %}
{%- for t in y_ticks %}
    <text x="{{ plot.left - 6 }}" y="{{ t.pos + 4 }}" text-anchor="end">{{ t.label }}</text>
{%- endfor %}
    <text x="{{ plot.center_x }}" y="{{ plot.bottom + 45 }}" text-anchor="middle" font-size="14">{{ x_title }}</text>
    <text x="{{ plot.left - 50 }}" y="{{ plot.center_y }}" text-anchor="middle" font-size="14" transform="rotate(-90 {{ plot.left - 50 }} {{ plot.center_y }})">{{ y_title }}</text>
  </g>
  <g class="points">
{%- for c in circles %}
    <circle cx="{{ c.cx }}" cy="{{ c.cy }}" r="{{ c.r }}" fill="{{ c.color }}"/>
{%- endfor %}
  </g>
  <g class="centroids">
{%- for m in crosses %}
    <polygon points="{{ m.points }}" fill="{{ m.color }}" stroke="{{ m.stroke }}" stroke-width="{{ m.stroke_width }}"/>
{%- endfor %}
  </g>
</svg>
"##;

#[derive(Serialize)]
struct PlotArea {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
    width: f64,
    height: f64,
    center_x: f64,
    center_y: f64,
}

#[derive(Serialize)]
struct Tick {
    pos: f64,
    label: String,
}

#[derive(Serialize)]
struct Circle {
    cx: f64,
    cy: f64,
    r: f64,
    color: String,
}

#[derive(Serialize)]
struct Cross {
    points: String,
    color: String,
    stroke: String,
    stroke_width: f64,
}

/// Maps data coordinates onto the plot area
struct Projection {
    area: Bounds,
    data: Bounds,
}

impl Projection {
    fn x(&self, x: f64) -> f64 {
        let t = (x - self.data.min_x) / (self.data.max_x - self.data.min_x);
        round2(self.area.min_x + t * (self.area.max_x - self.area.min_x))
    }

    // SVG y grows downwards
    fn y(&self, y: f64) -> f64 {
        let t = (y - self.data.min_y) / (self.data.max_y - self.data.min_y);
        round2(self.area.max_y - t * (self.area.max_y - self.area.min_y))
    }
}

impl Figure {
    /// Render the figure as a standalone SVG document
    pub fn to_svg(&self) -> Result<String> {
        let width = self.width as f64;
        let height = self.height as f64;

        let area = Bounds {
            min_x: MARGIN_LEFT,
            max_x: (width - MARGIN_RIGHT).max(MARGIN_LEFT + 1.0),
            min_y: MARGIN_TOP,
            max_y: (height - MARGIN_BOTTOM).max(MARGIN_TOP + 1.0),
        };
        let projection = Projection {
            area,
            data: padded_bounds(self.all_points()),
        };

        let plot = PlotArea {
            left: area.min_x,
            top: area.min_y,
            right: area.max_x,
            bottom: area.max_y,
            width: area.max_x - area.min_x,
            height: area.max_y - area.min_y,
            center_x: round2((area.min_x + area.max_x) / 2.0),
            center_y: round2((area.min_y + area.max_y) / 2.0),
        };

        let x_ticks: Vec<Tick> =
            nice_ticks(projection.data.min_x, projection.data.max_x, TARGET_TICKS)
                .into_iter()
                .map(|(value, label)| Tick {
                    pos: projection.x(value),
                    label,
                })
                .collect();
        let y_ticks: Vec<Tick> =
            nice_ticks(projection.data.min_y, projection.data.max_y, TARGET_TICKS)
                .into_iter()
                .map(|(value, label)| Tick {
                    pos: projection.y(value),
                    label,
                })
                .collect();

        let mut circles = Vec::new();
        let mut crosses = Vec::new();
        for trace in &self.traces {
            let marker = &trace.marker;
            for (i, p) in trace.points().enumerate() {
                let (cx, cy) = (projection.x(p.x), projection.y(p.y));
                let color = marker.color.at(i).to_string();
                match marker.symbol {
                    MarkerSymbol::Circle => circles.push(Circle {
                        cx,
                        cy,
                        r: marker.size / 2.0,
                        color,
                    }),
                    MarkerSymbol::X => crosses.push(Cross {
                        points: x_polygon(Point::new(cx, cy), marker.size / 2.0),
                        color,
                        stroke: marker
                            .line
                            .as_ref()
                            .map(|l| l.color.clone())
                            .unwrap_or_else(|| "none".to_string()),
                        stroke_width: marker.line.as_ref().map(|l| l.width).unwrap_or(0.0),
                    }),
                }
            }
        }

        let mut context = Context::new();
        context.insert("width", &self.width);
        context.insert("height", &self.height);
        context.insert("plot", &plot);
        context.insert("x_ticks", &x_ticks);
        context.insert("y_ticks", &y_ticks);
        context.insert("x_title", &self.x_title);
        context.insert("y_title", &self.y_title);
        context.insert("circles", &circles);
        context.insert("crosses", &crosses);

        Tera::one_off(SVG_TEMPLATE, &context, true).context("Failed to render SVG figure")
    }
}

/// Data bounds with 5% padding on each side; degenerate ranges widen by 1
fn padded_bounds(points: impl Iterator<Item = Point>) -> Bounds {
    let b = Bounds::enclosing(points).unwrap_or(Bounds {
        min_x: 0.0,
        max_x: 0.0,
        min_y: 0.0,
        max_y: 0.0,
    });
    let (min_x, max_x) = pad(b.min_x, b.max_x);
    let (min_y, max_y) = pad(b.min_y, b.max_y);
    Bounds {
        min_x,
        max_x,
        min_y,
        max_y,
    }
}

fn pad(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span <= 0.0 {
        (min - 1.0, max + 1.0)
    } else {
        (min - span * 0.05, max + span * 0.05)
    }
}

/// Evenly spaced "nice" tick values (steps of 1, 2 or 5 times a power of
/// ten) within `[min, max]`, with their labels
fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<(f64, String)> {
    let span = max - min;
    if !(span.is_finite() && span > 0.0) || target == 0 {
        return Vec::new();
    }

    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = match raw / magnitude {
        n if n < 1.5 => 1.0,
        n if n < 3.0 => 2.0,
        n if n < 7.0 => 5.0,
        _ => 10.0,
    } * magnitude;

    let decimals = (-step.log10().floor()).max(0.0) as usize;
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;

    (first..=last)
        .map(|k| {
            let value = k as f64 * step;
            // Avoid printing "-0"
            let value = if value == 0.0 { 0.0 } else { value };
            (value, format!("{:.*}", decimals, value))
        })
        .collect()
}

/// Outline of an `x` marker: a plus sign rotated by 45 degrees
fn x_polygon(center: Point, radius: f64) -> String {
    let arm = radius * 0.3;
    let outline = [
        (arm, radius),
        (arm, arm),
        (radius, arm),
        (radius, -arm),
        (arm, -arm),
        (arm, -radius),
        (-arm, -radius),
        (-arm, -arm),
        (-radius, -arm),
        (-radius, arm),
        (-arm, arm),
        (-arm, radius),
    ];

    let rotate = std::f64::consts::FRAC_1_SQRT_2;
    outline
        .iter()
        .map(|&(x, y)| {
            let rx = (x - y) * rotate;
            let ry = (x + y) * rotate;
            format!("{},{}", round2(center.x + rx), round2(center.y + ry))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{Marker, MarkerColor, MarkerLine, Trace};

    fn sample() -> Figure {
        Figure {
            width: 700,
            height: 700,
            show_legend: false,
            x_title: "x".into(),
            y_title: "<y>".into(),
            traces: vec![
                Trace::markers(
                    "0",
                    &[Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
                    Marker {
                        color: MarkerColor::Single("#636EFA".into()),
                        size: 6.0,
                        symbol: MarkerSymbol::Circle,
                        line: None,
                    },
                ),
                Trace::markers(
                    "centroids",
                    &[Point::new(5.0, 5.0)],
                    Marker {
                        color: MarkerColor::PerPoint(vec!["#EF553B".into()]),
                        size: 15.0,
                        symbol: MarkerSymbol::X,
                        line: Some(MarkerLine {
                            color: "Black".into(),
                            width: 1.0,
                        }),
                    },
                ),
            ],
        }
    }

    #[test]
    fn test_nice_ticks() {
        let ticks = nice_ticks(-0.5, 10.5, 6);
        let values: Vec<f64> = ticks.iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks[1].1, "2");

        let ticks = nice_ticks(0.0, 0.6, 6);
        assert_eq!(ticks[1].1, "0.1");

        assert!(nice_ticks(1.0, 1.0, 6).is_empty());
    }

    #[test]
    fn test_padded_bounds() {
        let bounds = padded_bounds(vec![Point::new(0.0, 3.0), Point::new(10.0, 3.0)].into_iter());
        assert_eq!(bounds.min_x, -0.5);
        assert_eq!(bounds.max_x, 10.5);
        assert_eq!(bounds.min_y, 2.0);
        assert_eq!(bounds.max_y, 4.0);
    }

    #[test]
    fn test_x_polygon_is_symmetric() {
        let polygon = x_polygon(Point::new(0.0, 0.0), 7.5);
        let coords: Vec<&str> = polygon.split(' ').collect();
        assert_eq!(coords.len(), 12);
    }

    #[test]
    fn test_render_svg() {
        let svg = sample().to_svg().unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"700\""));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<polygon").count(), 1);
        assert!(svg.contains("fill=\"#636EFA\""));
        assert!(svg.contains("stroke=\"Black\""));
        assert!(svg.contains("&lt;y&gt;"));
    }
}
