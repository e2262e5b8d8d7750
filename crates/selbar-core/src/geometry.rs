//! The position engine: viewport clamping and the anchor/drag-offset split.
//!
//! The widget tracks two coordinate values: a committed anchor position and a
//! transient offset accumulated during a drag gesture. They are composed only
//! at render time (`anchor + offset`), so a live drag never rewrites the
//! anchor and the clamp never fights the pointer mid-gesture.

use kurbo::{Point, Rect, Size, Vec2};

/// Lower bound of the window-width band used to size the triggered panel.
pub const WINDOW_WIDTH_MIN: f64 = 750.0;
/// Upper bound of the window-width band.
pub const WINDOW_WIDTH_MAX: f64 = 1500.0;
/// The triggered panel takes this fraction of the banded window width.
pub const PANEL_WIDTH_FRACTION: f64 = 0.4;

/// Clamp a candidate top-left position so a box of the given size lies fully
/// inside the viewport.
///
/// Each axis is adjusted independently. When the box is wider or taller than
/// the viewport on an axis, that axis pins to the viewport origin. Degenerate
/// input (non-finite position, zero-size box) also pins to the origin, so the
/// result is always finite.
///
/// Deterministic and idempotent: `clamp(clamp(p)) == clamp(p)`.
pub fn clamp_to_viewport(pos: Point, size: Size, viewport: Rect) -> Point {
    if !pos.x.is_finite() || !pos.y.is_finite() || size.width <= 0.0 || size.height <= 0.0 {
        return viewport.origin();
    }
    let max_x = viewport.x1 - size.width;
    let max_y = viewport.y1 - size.height;
    let x = if max_x < viewport.x0 {
        viewport.x0
    } else {
        pos.x.clamp(viewport.x0, max_x)
    };
    let y = if max_y < viewport.y0 {
        viewport.y0
    } else {
        pos.y.clamp(viewport.y0, max_y)
    };
    Point::new(x, y)
}

/// Band the host window width into the range the panel layout is designed for.
pub fn clamp_window_width(width: f64) -> f64 {
    width.clamp(WINDOW_WIDTH_MIN, WINDOW_WIDTH_MAX)
}

/// Width of the triggered panel for a given window width.
pub fn panel_width(window_width: f64) -> f64 {
    clamp_window_width(window_width) * PANEL_WIDTH_FRACTION
}

/// Accumulated pointer movement during one drag gesture, kept apart from the
/// committed anchor until the gesture ends.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    offset: Vec2,
    armed: bool,
}

impl DragState {
    /// Create an idle drag state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm offset accumulation. No-op if a gesture is already active.
    pub fn begin(&mut self) {
        if !self.armed {
            self.armed = true;
            self.offset = Vec2::ZERO;
        }
    }

    /// Add one drag-move tick to the offset. Ignored outside a gesture.
    /// Never triggers a re-clamp.
    pub fn accumulate(&mut self, delta: Vec2) {
        if self.armed {
            self.offset += delta;
        }
    }

    /// Fold the offset into the anchor and reset to idle. Returns the new
    /// anchor; the caller is responsible for the follow-up clamp pass.
    pub fn end(&mut self, anchor: Point) -> Point {
        let committed = anchor + self.offset;
        self.offset = Vec2::ZERO;
        self.armed = false;
        committed
    }

    /// Current accumulated offset. Zero when no drag is in flight.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// True when the offset is exactly zero. The shell re-clamps the anchor
    /// on every update while this holds, including the very first one; a
    /// non-zero offset suppresses the clamp until the gesture commits.
    pub fn offset_is_zero(&self) -> bool {
        self.offset.x == 0.0 && self.offset.y == 0.0
    }

    /// True while a gesture is active.
    pub fn is_dragging(&self) -> bool {
        self.armed
    }
}
