//! Normalized drag-rectangle state machine.
//!
//! Coordinates are fractions of the displayed frame in [0, 1], recorded in
//! whatever order the drag produced them. Conversion to absolute pixels
//! happens exactly once, when the gesture ends.

use crate::types::PixelBounds;

/// Offset applied to the second corner on `begin` so a click with no drag
/// still yields a box with non-zero area.
pub const CORNER_EPSILON: f64 = 0.01;

/// An in-progress or frozen selection rectangle.
///
/// States are `{idle, drawing}`: [`begin`](Self::begin) enters drawing,
/// [`end`](Self::end) leaves it, [`update`](Self::update) is a no-op while
/// idle. Every mutation re-clamps each coordinate independently to [0, 1],
/// so a drag that exits the frame still yields a valid box.
#[derive(Debug, Clone, Default)]
pub struct SelectionRect {
    drawing: bool,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl SelectionRect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag gesture is currently in progress.
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Start a new rectangle with both corners at `(x, y)`, the second one
    /// offset by [`CORNER_EPSILON`] in each axis.
    pub fn begin(&mut self, x: f64, y: f64) {
        self.x1 = x;
        self.y1 = y;
        self.x2 = x + CORNER_EPSILON;
        self.y2 = y + CORNER_EPSILON;
        self.clamp();
        self.drawing = true;
    }

    /// Move the second corner to `(x, y)`. No-op while idle.
    pub fn update(&mut self, x: f64, y: f64) {
        if !self.drawing {
            return;
        }
        self.x2 = x;
        self.y2 = y;
        self.clamp();
    }

    /// Abandon the current gesture without producing bounds.
    pub fn cancel(&mut self) {
        self.drawing = false;
    }

    /// Freeze the rectangle and convert it to pixel bounds against the
    /// frame's native `width` x `height`.
    ///
    /// The two corners may have been recorded in either order depending on
    /// drag direction, so the result is order-normalized before truncation.
    /// Returns `None` while idle.
    pub fn end(&mut self, width: u32, height: u32) -> Option<PixelBounds> {
        if !self.drawing {
            return None;
        }
        self.drawing = false;

        let (xl, xr) = ordered(self.x1, self.x2);
        let (yt, yb) = ordered(self.y1, self.y2);

        Some(PixelBounds {
            left: (xl * f64::from(width)) as u32,
            right: (xr * f64::from(width)) as u32,
            top: (yt * f64::from(height)) as u32,
            bottom: (yb * f64::from(height)) as u32,
        })
    }

    fn clamp(&mut self) {
        self.x1 = unit(self.x1);
        self.x2 = unit(self.x2);
        self.y1 = unit(self.y1);
        self.y2 = unit(self.y2);
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn unit(v: f64) -> f64 {
    v.max(0.0).min(1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
