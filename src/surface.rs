//! Drawing seam between the simulations and the browser canvas.
//!
//! Effects describe what to paint through [`Surface`]; the `web` module
//! implements it on top of a canvas 2D context, and [`RecordingSurface`]
//! captures the calls for headless tests.

use crate::bolt::Segment;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Composite {
    #[default]
    SourceOver,
    /// Additive blend (`globalCompositeOperation = "lighter"`).
    Lighter,
}

impl Composite {
    pub fn as_css(self) -> &'static str {
        match self {
            Composite::SourceOver => "source-over",
            Composite::Lighter => "lighter",
        }
    }
}

/// Blurred halo drawn behind a stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct Glow {
    pub color: String,
    pub blur: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
    /// Global alpha applied on top of the color's own alpha.
    pub alpha: f64,
    /// Round caps and joins.
    pub round: bool,
    pub glow: Option<Glow>,
    pub composite: Composite,
}

impl StrokeStyle {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            alpha: 1.0,
            round: false,
            glow: None,
            composite: Composite::SourceOver,
        }
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn round(mut self) -> Self {
        self.round = true;
        self
    }

    pub fn glow(mut self, color: impl Into<String>, blur: f64) -> Self {
        self.glow = Some(Glow {
            color: color.into(),
            blur,
        });
        self
    }

    pub fn composite(mut self, composite: Composite) -> Self {
        self.composite = composite;
        self
    }
}

/// Every call is self-contained: implementations save and restore any
/// context state they touch.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);
    fn fill_rect(&mut self, color: &str, alpha: f64, x: f64, y: f64, w: f64, h: f64);
    /// One path made of disjoint segments, stroked once.
    fn stroke_segments(&mut self, style: &StrokeStyle, segments: &[Segment]);
    fn stroke_line(&mut self, style: &StrokeStyle, x1: f64, y1: f64, x2: f64, y2: f64);
    fn stroke_circle(&mut self, style: &StrokeStyle, x: f64, y: f64, radius: f64);
}

/// Backing-store size of a canvas in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferSize {
    pub width: u32,
    pub height: u32,
}

/// Sanitised device pixel ratio; non-finite or non-positive means 1.
pub fn effective_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 }
}

/// CSS extent of a measured box, floored to whole pixels with a minimum.
pub fn css_extent(measured: f64, min: f64) -> f64 {
    let floor = min.max(1.0).floor();
    if measured.is_finite() {
        measured.floor().max(floor)
    } else {
        floor
    }
}

/// Device pixels needed for `css` CSS pixels at `dpr`.
pub fn to_buffer_size(css: f64, dpr: f64) -> u32 {
    let px = (css.max(0.0) * effective_dpr(dpr)).floor();
    px.clamp(1.0, u32::MAX as f64) as u32
}

impl BufferSize {
    pub fn for_css(css_width: f64, css_height: f64, dpr: f64) -> Self {
        Self {
            width: to_buffer_size(css_width, dpr),
            height: to_buffer_size(css_height, dpr),
        }
    }
}

/// One recorded [`Surface`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear { width: f64, height: f64 },
    FillRect { color: String, alpha: f64, x: f64, y: f64, w: f64, h: f64 },
    Segments { style: StrokeStyle, count: usize },
    Line { style: StrokeStyle, from: (f64, f64), to: (f64, f64) },
    Circle { style: StrokeStyle, center: (f64, f64), radius: f64 },
}

/// Test double that records draw calls instead of painting.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn circles(&self) -> impl Iterator<Item = (&StrokeStyle, f64)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Circle { style, radius, .. } => Some((style, *radius)),
            _ => None,
        })
    }

    pub fn segment_passes(&self) -> impl Iterator<Item = (&StrokeStyle, usize)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Segments { style, count } => Some((style, *count)),
            _ => None,
        })
    }

    pub fn lines(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count()
    }

    pub fn fills(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::FillRect { color, alpha, .. } => Some((color.as_str(), *alpha)),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ops.push(DrawOp::Clear { width, height });
    }

    fn fill_rect(&mut self, color: &str, alpha: f64, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::FillRect {
            color: color.to_owned(),
            alpha,
            x,
            y,
            w,
            h,
        });
    }

    fn stroke_segments(&mut self, style: &StrokeStyle, segments: &[Segment]) {
        self.ops.push(DrawOp::Segments {
            style: style.clone(),
            count: segments.len(),
        });
    }

    fn stroke_line(&mut self, style: &StrokeStyle, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ops.push(DrawOp::Line {
            style: style.clone(),
            from: (x1, y1),
            to: (x2, y2),
        });
    }

    fn stroke_circle(&mut self, style: &StrokeStyle, x: f64, y: f64, radius: f64) {
        self.ops.push(DrawOp::Circle {
            style: style.clone(),
            center: (x, y),
            radius,
        });
    }
}
