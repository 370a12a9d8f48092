/// Scanline triangle fill
use crate::framebuffer::{Color, Framebuffer};

/// A pixel position in framebuffer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Round a subpixel position to the nearest pixel, halves away from zero
    pub fn rounded(x: f32, y: f32) -> Self {
        Self {
            x: x.round() as i32,
            y: y.round() as i32,
        }
    }
}

/// An edge ordered top to bottom.
///
/// Widened to `i64` so differences between saturated screen coordinates
/// cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge {
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
}

impl Edge {
    fn new(a: ScreenPoint, b: ScreenPoint) -> Self {
        let (a, b) = if a.y < b.y { (a, b) } else { (b, a) };
        Self {
            x1: a.x as i64,
            y1: a.y as i64,
            x2: b.x as i64,
            y2: b.y as i64,
        }
    }

    fn height(&self) -> i64 {
        self.y2 - self.y1
    }
}

/// A horizontal run `[x1, x2)` with `x1 <= x2`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    x1: i64,
    x2: i64,
}

impl Span {
    fn new(a: i64, b: i64) -> Self {
        if a < b {
            Self { x1: a, x2: b }
        } else {
            Self { x1: b, x2: a }
        }
    }
}

/// Fill a triangle with a solid colour.
///
/// The edge with the tallest vertical extent is paired with each of the two
/// others in turn; every row between them gets one span. Flat edges produce
/// nothing, and pixels outside the target are dropped by `set_pixel`.
pub fn fill_triangle<F: Framebuffer + ?Sized>(target: &mut F, points: [ScreenPoint; 3], color: Color) {
    let edges = [
        Edge::new(points[0], points[1]),
        Edge::new(points[1], points[2]),
        Edge::new(points[2], points[0]),
    ];

    // Ties keep the earliest edge
    let mut max_height = 0;
    let mut long_edge = 0;
    for (i, edge) in edges.iter().enumerate() {
        if edge.height() > max_height {
            max_height = edge.height();
            long_edge = i;
        }
    }

    let short_edge_1 = (long_edge + 1) % 3;
    let short_edge_2 = (long_edge + 2) % 3;

    draw_spans_between_edges(target, &edges[long_edge], &edges[short_edge_1], color);
    draw_spans_between_edges(target, &edges[long_edge], &edges[short_edge_2], color);
}

fn draw_spans_between_edges<F: Framebuffer + ?Sized>(target: &mut F, long: &Edge, short: &Edge, color: Color) {
    let long_ydiff = long.height() as f32;
    if long_ydiff == 0.0 {
        return;
    }

    let short_ydiff = short.height() as f32;
    if short_ydiff == 0.0 {
        return;
    }

    let long_xdiff = (long.x2 - long.x1) as f32;
    let short_xdiff = (short.x2 - short.x1) as f32;

    let mut factor_1 = (short.y1 - long.y1) as f32 / long_ydiff;
    let factor_step_1 = 1.0 / long_ydiff;
    let mut factor_2 = 0.0f32;
    let factor_step_2 = 1.0 / short_ydiff;

    // Only visit rows inside the target. Rows above it advance the factors
    // in one step; fully visible edges take no such step.
    let first = short.y1.max(0);
    let last = short.y2.min(target.height() as i64);
    if first >= last {
        return;
    }
    let skipped = first - short.y1;
    if skipped > 0 {
        factor_1 += factor_step_1 * skipped as f32;
        factor_2 += factor_step_2 * skipped as f32;
    }

    for y in first..last {
        // Truncation, not rounding
        let span = Span::new(
            long.x1 + (long_xdiff * factor_1) as i64,
            short.x1 + (short_xdiff * factor_2) as i64,
        );
        draw_span(target, span, y, color);
        factor_1 += factor_step_1;
        factor_2 += factor_step_2;
    }
}

fn draw_span<F: Framebuffer + ?Sized>(target: &mut F, span: Span, y: i64, color: Color) {
    if y < 0 || y >= target.height() as i64 {
        return;
    }

    let x1 = span.x1.max(0);
    let x2 = span.x2.min(target.width() as i64);
    for x in x1..x2 {
        target.set_pixel(x as i32, y as i32, color);
    }
}
