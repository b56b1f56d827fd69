//! Glyph geometry and horizontal metrics.

use kurbo::{Affine, BezPath, PathEl, Shape};

/// Axis-aligned bounds of a glyph's contours, in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Bounds reported for a glyph without contours.
    pub const EMPTY: Self = Self { min_x: 0.0, min_y: 0.0, max_x: 0.0, max_y: 0.0 };

    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    fn union(self, rect: kurbo::Rect) -> Self {
        Self {
            min_x: self.min_x.min(rect.x0),
            min_y: self.min_y.min(rect.y0),
            max_x: self.max_x.max(rect.x1),
            max_y: self.max_y.max(rect.y1),
        }
    }
}

impl From<kurbo::Rect> for BoundingBox {
    fn from(rect: kurbo::Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.x1, rect.y1)
    }
}

/// Explicit left/right side bearings stored on a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideBearings {
    pub left: i32,
    pub right: i32,
}

/// A single glyph keyed by its code point.
///
/// Contours are kept in font units with y pointing up. Side bearings are
/// stored explicitly once set and are dropped again by any transform, after
/// which they are derived from the bounding box.
#[derive(Debug, Clone)]
pub struct Glyph {
    codepoint: char,
    name: String,
    contours: Vec<BezPath>,
    advance_width: i32,
    side_bearings: Option<SideBearings>,
}

impl Glyph {
    pub fn new(codepoint: char, advance_width: i32) -> Self {
        Self {
            codepoint,
            name: glyph_name(codepoint),
            contours: Vec::new(),
            advance_width,
            side_bearings: None,
        }
    }

    pub fn codepoint(&self) -> char {
        self.codepoint
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contours(&self) -> &[BezPath] {
        &self.contours
    }

    /// Append a closed contour. Empty paths are ignored.
    pub fn add_contour(&mut self, contour: BezPath) {
        if !contour.elements().is_empty() {
            self.contours.push(contour);
            self.side_bearings = None;
        }
    }

    /// Replace all contours.
    pub fn set_contours(&mut self, contours: impl IntoIterator<Item = BezPath>) {
        self.contours.clear();
        for contour in contours {
            self.add_contour(contour);
        }
        self.side_bearings = None;
    }

    /// True when the glyph has no drawable geometry.
    pub fn is_empty(&self) -> bool {
        self.contours.iter().all(|c| c.elements().is_empty())
    }

    /// Bounds of all contours, or [`BoundingBox::EMPTY`] for an empty glyph.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut rects = self
            .contours
            .iter()
            .filter(|c| !c.elements().is_empty())
            .map(|c| c.bounding_box());
        match rects.next() {
            Some(first) => rects.fold(BoundingBox::from(first), BoundingBox::union),
            None => BoundingBox::EMPTY,
        }
    }

    pub fn advance_width(&self) -> i32 {
        self.advance_width
    }

    pub fn set_advance_width(&mut self, advance_width: i32) {
        self.advance_width = advance_width;
    }

    /// Apply an affine transform to every contour.
    ///
    /// The advance width is left untouched.
    pub fn transform(&mut self, affine: Affine) {
        for contour in &mut self.contours {
            contour.apply_affine(affine);
        }
        self.side_bearings = None;
    }

    pub fn scale(&mut self, factor: f64) {
        self.transform(Affine::scale(factor));
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.transform(Affine::translate((dx, dy)));
    }

    /// Snap every point to the integer design grid.
    pub fn round_to_grid(&mut self) {
        for contour in &mut self.contours {
            for el in contour.elements_mut() {
                *el = match *el {
                    PathEl::MoveTo(p) => PathEl::MoveTo(p.round()),
                    PathEl::LineTo(p) => PathEl::LineTo(p.round()),
                    PathEl::QuadTo(c, p) => PathEl::QuadTo(c.round(), p.round()),
                    PathEl::CurveTo(c1, c2, p) => PathEl::CurveTo(c1.round(), c2.round(), p.round()),
                    PathEl::ClosePath => PathEl::ClosePath,
                };
            }
        }
        self.side_bearings = None;
    }

    /// Store side bearings on the glyph.
    ///
    /// Contours are shifted so that the left edge of the bounding box sits at
    /// `left`, and the advance width becomes `left + width + right`.
    pub fn set_side_bearings(&mut self, bearings: SideBearings) {
        let bbox = self.bounding_box();
        if !self.is_empty() {
            let dx = f64::from(bearings.left) - bbox.min_x;
            if dx != 0.0 {
                self.translate(dx, 0.0);
            }
        }
        self.advance_width =
            (f64::from(bearings.left) + bbox.width() + f64::from(bearings.right)).round() as i32;
        self.side_bearings = Some(bearings);
    }

    /// Side bearings stored by the last [`Glyph::set_side_bearings`], if still valid.
    pub fn side_bearings(&self) -> Option<SideBearings> {
        self.side_bearings
    }

    pub fn left_side_bearing(&self) -> i32 {
        match self.side_bearings {
            Some(bearings) => bearings.left,
            None => self.bounding_box().min_x.round() as i32,
        }
    }

    pub fn right_side_bearing(&self) -> i32 {
        match self.side_bearings {
            Some(bearings) => bearings.right,
            None => self.advance_width - self.bounding_box().max_x.round() as i32,
        }
    }
}

/// Production glyph name for a character.
///
/// ASCII letters and digits keep their own name, everything else uses the
/// `uniXXXX` / `uXXXXX` forms.
pub fn glyph_name(ch: char) -> String {
    let cp = u32::from(ch);
    match ch {
        ' ' => "space".to_string(),
        c if c.is_ascii_alphanumeric() => c.to_string(),
        _ if cp <= 0xFFFF => format!("uni{cp:04X}"),
        _ => format!("u{cp:05X}"),
    }
}
