//! Toolbar placement relative to the pointer or the selection.

use crate::config::Settings;
use crate::host::{Point, Rect};

/// Inputs of one positioning call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionRequest {
    /// Pointer position of the triggering mouse event.
    pub pointer: Option<Point>,
    /// Explicit left edge.
    pub x: Option<f64>,
    /// Explicit top.
    pub y: Option<f64>,
    /// Reuse the centre and top of the previously positioned toolbar.
    pub use_last: bool,
}

impl PositionRequest {
    pub fn at_pointer(pointer: Option<Point>) -> Self {
        Self {
            pointer,
            ..Default::default()
        }
    }

    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn last() -> Self {
        Self {
            use_last: true,
            ..Default::default()
        }
    }
}

/// Geometry of the most recently positioned toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LastPosition {
    pub width: f64,
    pub x: f64,
    pub y: f64,
}

/// Top-left corner for a toolbar of `width`.
///
/// The pointer wins over the selection rectangle as reference point; the
/// toolbar goes below the rectangle (or a fixed offset without one) and is
/// centred horizontally unless an explicit `x` gives its left edge. The
/// result keeps `settings.edge_margin` to both viewport edges whenever the
/// toolbar fits.
pub fn compute_position(
    request: &PositionRequest,
    selection: Option<Rect>,
    width: f64,
    viewport_width: f64,
    last: Option<LastPosition>,
    settings: &Settings,
) -> Point {
    let mut reference = Point::default();
    if let Some(pointer) = request.pointer {
        reference = pointer;
    } else if let Some(rect) = selection {
        reference = Point::new(rect.x, rect.y + settings.selection_gap);
    }

    reference.y += match selection {
        Some(rect) => rect.height,
        None => settings.fallback_offset,
    };

    if let Some(x) = request.x {
        reference.x = x;
    }
    if let Some(y) = request.y {
        reference.y = y;
    }

    let mut left = match request.x {
        Some(_) => reference.x,
        None => reference.x - width / 2.0,
    };
    let mut top = reference.y;

    if request.use_last
        && let Some(last) = last
    {
        left = last.x + last.width / 2.0 - width / 2.0;
        top = last.y;
    }

    let margin = settings.edge_margin;
    if left + width + margin > viewport_width {
        left = viewport_width - width - margin;
    }
    if left < margin {
        left = margin;
    }

    Point::new(left, top)
}
