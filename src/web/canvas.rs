use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::bolt::Segment;
use crate::error::StormError;
use crate::surface::{BufferSize, StrokeStyle, Surface};

/// [`Surface`] backed by a canvas 2D context.
pub(crate) struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub(crate) fn for_canvas(canvas: &HtmlCanvasElement, id: &str) -> Result<Self, StormError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| StormError::NoContext(id.to_owned()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| StormError::NoContext(id.to_owned()))?;
        Ok(Self { ctx })
    }

    /// Size the backing store, pin the CSS box and map drawing to CSS pixels.
    pub(crate) fn fit(&self, canvas: &HtmlCanvasElement, size: BufferSize, css: (f64, f64), dpr: f64) {
        canvas.set_width(size.width);
        canvas.set_height(size.height);
        let style = canvas.style();
        let _ = style.set_property("width", &format!("{}px", css.0));
        let _ = style.set_property("height", &format!("{}px", css.1));
        let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    }

    fn apply(&self, style: &StrokeStyle) {
        let ctx = &self.ctx;
        ctx.set_stroke_style_str(&style.color);
        ctx.set_line_width(style.width);
        ctx.set_global_alpha(style.alpha);
        if style.round {
            ctx.set_line_cap("round");
            ctx.set_line_join("round");
        }
        if let Some(glow) = &style.glow {
            ctx.set_shadow_color(&glow.color);
            ctx.set_shadow_blur(glow.blur);
        }
        let _ = ctx.set_global_composite_operation(style.composite.as_css());
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_rect(&mut self, color: &str, alpha: f64, x: f64, y: f64, w: f64, h: f64) {
        let ctx = &self.ctx;
        ctx.save();
        ctx.set_fill_style_str(color);
        ctx.set_global_alpha(alpha);
        ctx.fill_rect(x, y, w, h);
        ctx.restore();
    }

    fn stroke_segments(&mut self, style: &StrokeStyle, segments: &[Segment]) {
        let ctx = &self.ctx;
        ctx.save();
        self.apply(style);
        ctx.begin_path();
        for s in segments {
            ctx.move_to(s.x1, s.y1);
            ctx.line_to(s.x2, s.y2);
        }
        ctx.stroke();
        ctx.restore();
    }

    fn stroke_line(&mut self, style: &StrokeStyle, x1: f64, y1: f64, x2: f64, y2: f64) {
        let ctx = &self.ctx;
        ctx.save();
        self.apply(style);
        ctx.begin_path();
        ctx.move_to(x1, y1);
        ctx.line_to(x2, y2);
        ctx.stroke();
        ctx.restore();
    }

    fn stroke_circle(&mut self, style: &StrokeStyle, x: f64, y: f64, radius: f64) {
        let ctx = &self.ctx;
        ctx.save();
        self.apply(style);
        ctx.begin_path();
        if ctx.arc(x, y, radius.max(0.0), 0.0, TAU).is_ok() {
            ctx.stroke();
        }
        ctx.restore();
    }
}
