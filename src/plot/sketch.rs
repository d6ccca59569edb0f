//! ASCII sketch of a resolved layout.
//!
//! Fixed-size character grid, side view along the optical axis:
//! - source: `*` (cone beam only)
//! - beam outline: `.` (triangle for a cone beam, band for a parallel beam)
//! - straight grating: `|`, bent grating: `)` sampled along its arc
//! - detector: `#` (arc when curved)
//! - sample: `o` on the axis
//!
//! The sketch only reads the [`GeometryResult`]; it never re-derives physics.
//! Undefined distances (e.g. Source to G1 of a parallel interferometer) are
//! drawn with a nominal length so the order stays readable.

use nalgebra::{Point2, Rotation2, Vector2};

use crate::domain::{BeamGeometry, Component, GeometryResult};

/// Half-width of the beam at the detector, as a fraction of the axis length.
const BEAM_HALF_WIDTH: f64 = 0.15;
const ARC_SAMPLES: usize = 48;

/// Render the layout into a `width` x `height` grid plus a header and a label row.
pub fn render_sketch(result: &GeometryResult, width: usize, height: usize) -> String {
    let width = width.max(20);
    let height = height.max(7);

    let positions = axis_positions(result);
    let length = positions.last().map(|&(_, x)| x).filter(|&x| x > 0.0).unwrap_or(1.0);
    let half_width = BEAM_HALF_WIDTH * length;
    let cone = result.flags().beam_geometry == BeamGeometry::Cone;

    let view = View {
        x_min: -0.03 * length,
        x_max: 1.03 * length,
        y_min: -1.2 * half_width,
        y_max: 1.2 * half_width,
        width,
        height,
    };
    let mut grid = vec![vec![' '; width]; height];

    // Beam first, so components overwrite it.
    let beam_at = |x: f64| if cone { half_width * x / length } else { half_width };
    let start = if cone { 0.0 } else { view.x_min };
    for sign in [-1.0, 1.0] {
        let from = view.cell(Point2::new(start, sign * beam_at(start)));
        let to = view.cell(Point2::new(length, sign * beam_at(length)));
        draw_line(&mut grid, from, to, '.');
    }

    for &(component, x) in &positions {
        match component {
            Component::Source => {
                if cone {
                    let (col, row) = view.cell(Point2::new(0.0, 0.0));
                    grid[row][col] = '*';
                }
            }
            Component::Sample => {
                let (col, row) = view.cell(Point2::new(x, 0.0));
                grid[row][col] = 'o';
            }
            Component::Detector => {
                let radius = result.radius_detector();
                draw_element(&mut grid, &view, x, beam_at(x), radius, '#');
            }
            Component::G0 | Component::G1 | Component::G2 => {
                let radius = component
                    .grating()
                    .and_then(|g| result.grating(g))
                    .and_then(|spec| spec.radius);
                let ch = if radius.is_some() { ')' } else { '|' };
                draw_element(&mut grid, &view, x, beam_at(x), radius, ch);
            }
        }
    }

    let mut out = String::new();
    let header = format!(
        "Sketch: {} | axis={:.3} mm",
        result.chain().display_names().join(" -> "),
        length
    );
    out.push_str(&clip(&header, width));
    out.push('\n');
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out.push_str(label_row(&positions, &view).trim_end());
    out.push('\n');
    out
}

/// At most `width` characters, with `~` marking a cut.
fn clip(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        return line.to_string();
    }
    let mut out: String = line.chars().take(width - 1).collect();
    out.push('~');
    out
}

/// Axis coordinate (mm) of each component.
fn axis_positions(result: &GeometryResult) -> Vec<(Component, f64)> {
    let graph = result.distances();
    let order = graph.components();
    let known: Vec<f64> = graph
        .segments()
        .into_iter()
        .map(|(_, len)| len)
        .filter(|&len| len > 0.0)
        .collect();
    let nominal = if known.is_empty() {
        1.0
    } else {
        known.iter().sum::<f64>() / known.len() as f64
    };

    let mut x = 0.0;
    let mut out = Vec::with_capacity(order.len());
    for (i, &component) in order.iter().enumerate() {
        if i > 0 {
            x += graph.segment(order[i - 1], component).unwrap_or(nominal);
        }
        out.push((component, x));
    }
    out
}

/// Vertical bar at `x`, or an arc of `radius` bulging downstream.
fn draw_element(grid: &mut [Vec<char>], view: &View, x: f64, half_width: f64, radius: Option<f64>, ch: char) {
    match radius {
        Some(radius) if radius > 0.0 => {
            let half_angle = (half_width / radius).min(1.0).asin();
            let points = arc_points(x - radius, radius, half_angle, ARC_SAMPLES);
            for pair in points.windows(2) {
                draw_line(grid, view.cell(pair[0]), view.cell(pair[1]), ch);
            }
        }
        _ => {
            let top = view.cell(Point2::new(x, half_width));
            let bottom = view.cell(Point2::new(x, -half_width));
            draw_line(grid, top, bottom, ch);
        }
    }
}

/// Points of a circular arc centered on the axis at `center_x`, spanning
/// `±half_angle` around the downstream direction.
fn arc_points(center_x: f64, radius: f64, half_angle: f64, samples: usize) -> Vec<Point2<f64>> {
    let samples = samples.max(2);
    let center = Point2::new(center_x, 0.0);
    let spoke = Vector2::new(radius, 0.0);
    (0..samples)
        .map(|i| {
            let u = i as f64 / (samples as f64 - 1.0);
            let angle = -half_angle + 2.0 * half_angle * u;
            center + Rotation2::new(angle) * spoke
        })
        .collect()
}

fn label_row(positions: &[(Component, f64)], view: &View) -> String {
    let mut row = vec![' '; view.width];
    for &(component, x) in positions {
        let label = match component {
            Component::Source => "S",
            Component::Sample => "o",
            Component::Detector => "D",
            other => other.display_name(),
        };
        let (col, _) = view.cell(Point2::new(x, 0.0));
        let cells = col..col + label.len();
        if cells.end > row.len() || row[cells.clone()].iter().any(|&c| c != ' ') {
            continue;
        }
        for (cell, ch) in row[cells].iter_mut().zip(label.chars()) {
            *cell = ch;
        }
    }
    row.into_iter().collect()
}

struct View {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: usize,
    height: usize,
}

impl View {
    /// Grid cell `(column, row)` of a scene point; row 0 is the top.
    fn cell(&self, p: Point2<f64>) -> (usize, usize) {
        let u = ((p.x - self.x_min) / (self.x_max - self.x_min)).clamp(0.0, 1.0);
        let v = ((p.y - self.y_min) / (self.y_max - self.y_min)).clamp(0.0, 1.0);
        let col = (u * (self.width as f64 - 1.0)).round() as usize;
        let row = (self.height as f64 - 1.0 - v * (self.height as f64 - 1.0)).round() as usize;
        (col, row)
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
