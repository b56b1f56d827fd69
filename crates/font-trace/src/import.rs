//! Placing traced bitmaps in font space.

use std::path::Path;

use kurbo::{BezPath, Point};
use log::debug;

use crate::{
    bitmap::Bitmap,
    error::Result,
    trace::{Polygon, TraceOptions, trace},
};

/// Vertical frame a bitmap is imported into.
///
/// The image height spans the em (`ascent + descent`) with its top row on the
/// ascent line and its left column at x = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportFrame {
    pub ascent: f64,
    pub descent: f64,
}

impl ImportFrame {
    pub fn new(ascent: f64, descent: f64) -> Self {
        Self { ascent, descent }
    }

    pub fn em(&self) -> f64 {
        self.ascent + self.descent
    }

    /// Font units per pixel for an image `height` pixels tall.
    pub fn pixel_size(&self, height: u32) -> f64 {
        if height == 0 { 0.0 } else { self.em() / f64::from(height) }
    }

    fn to_font(&self, (x, y): (i64, i64), pixel_size: f64) -> Point {
        Point::new(x as f64 * pixel_size, self.ascent - y as f64 * pixel_size)
    }
}

/// Convert a traced polygon into a closed path in font units.
pub fn polygon_to_path(polygon: &Polygon, frame: &ImportFrame, pixel_size: f64) -> BezPath {
    let mut path = BezPath::new();
    let mut points = polygon.points.iter().map(|&p| frame.to_font(p, pixel_size));
    if let Some(first) = points.next() {
        path.move_to(first);
        for p in points {
            path.line_to(p);
        }
        path.close_path();
    }
    path
}

/// Trace a bitmap into font-space contours.
pub fn outlines(bitmap: &Bitmap, frame: &ImportFrame, options: &TraceOptions) -> Vec<BezPath> {
    let pixel_size = frame.pixel_size(bitmap.height());
    let polygons = trace(bitmap, options);
    debug!(
        "Traced {}x{} bitmap into {} contours ({pixel_size:.3} units/pixel)",
        bitmap.width(),
        bitmap.height(),
        polygons.len()
    );
    polygons.iter().map(|p| polygon_to_path(p, frame, pixel_size)).collect()
}

/// Load an image file and auto-trace it into font-space contours.
pub fn import_outlines(
    path: &Path,
    frame: &ImportFrame,
    options: &TraceOptions,
) -> Result<Vec<BezPath>> {
    let bitmap = Bitmap::open(path, options.threshold)?;
    Ok(outlines(&bitmap, frame, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    fn frame() -> ImportFrame {
        ImportFrame::new(800.0, 200.0)
    }

    #[test]
    fn test_pixel_size_spans_em() {
        assert_eq!(frame().pixel_size(20), 50.0);
        assert_eq!(frame().pixel_size(0), 0.0);
    }

    #[test]
    fn test_block_lands_in_font_space() {
        let bitmap = Bitmap::from_fn(20, 20, |x, y| (8..12).contains(&x) && (4..16).contains(&y));
        let contours = outlines(&bitmap, &frame(), &TraceOptions::DEFAULT);
        assert_eq!(contours.len(), 1);

        let bbox = contours[0].bounding_box();
        assert_eq!((bbox.x0, bbox.y0, bbox.x1, bbox.y1), (400.0, 0.0, 600.0, 600.0));
    }

    #[test]
    fn test_outer_contours_run_clockwise_in_font_space() {
        let bitmap = Bitmap::from_fn(3, 3, |x, y| !(x == 1 && y == 1));
        let contours = outlines(&bitmap, &frame(), &TraceOptions::DEFAULT);
        assert_eq!(contours.len(), 2);
        // y-up: clockwise loops have negative area
        assert!(contours[0].area() < 0.0);
        assert!(contours[1].area() > 0.0);
    }

    #[test]
    fn test_blank_bitmap_has_no_outlines() {
        let contours = outlines(&Bitmap::new(10, 10), &frame(), &TraceOptions::DEFAULT);
        assert!(contours.is_empty());
    }
}
