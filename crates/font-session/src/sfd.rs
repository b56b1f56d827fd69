//! FontForge SFD source writer.
//!
//! Writes a `SplineFontDB: 3.2` text file with one foreground layer per
//! glyph. Quadratic segments are raised to cubics, since SFD spline sets are
//! cubic unless the whole font is marked quadratic.

use std::fmt::{self, Write};

use chrono::Utc;
use kurbo::{BezPath, PathEl, Point};

use crate::{error::Result, font::Font, glyph::Glyph};

/// Number of encoding slots in a full Unicode SFD.
const UNICODE_FULL_SLOTS: u32 = 0x110000;

/// Point flag for a corner point.
const CORNER: u8 = 1;

/// Point flag for a smooth curve point.
const CURVE: u8 = 0;

/// Render the font as SFD text stamped with the current time.
pub fn to_sfd_string(font: &Font) -> Result<String> {
    let mut out = String::new();
    write_sfd(&mut out, font, Utc::now().timestamp())?;
    Ok(out)
}

/// Write the font as SFD text with the given creation time (Unix seconds).
pub fn write_sfd(out: &mut impl Write, font: &Font, timestamp: i64) -> fmt::Result {
    let info = font.info();
    let em = info.units_per_em();

    writeln!(out, "SplineFontDB: 3.2")?;
    writeln!(out, "FontName: {}", info.font_name)?;
    writeln!(out, "FullName: {}", info.full_name)?;
    writeln!(out, "FamilyName: {}", info.family_name)?;
    writeln!(out, "Weight: Regular")?;
    writeln!(out, "Copyright: ")?;
    writeln!(out, "Version: 001.000")?;
    writeln!(out, "ItalicAngle: 0")?;
    writeln!(out, "UnderlinePosition: {}", -(i32::from(em) / 10))?;
    writeln!(out, "UnderlineWidth: {}", i32::from(em) / 20)?;
    writeln!(out, "Ascent: {}", info.ascent)?;
    writeln!(out, "Descent: {}", info.descent)?;
    writeln!(out, "InvalidEm: 0")?;
    writeln!(out, "LayerCount: 2")?;
    writeln!(out, "Layer: 0 0 \"Back\" 1")?;
    writeln!(out, "Layer: 1 0 \"Fore\" 0")?;
    writeln!(out, "Encoding: UnicodeFull")?;
    writeln!(out, "CreationTime: {timestamp}")?;
    writeln!(out, "ModificationTime: {timestamp}")?;
    writeln!(out, "DisplaySize: -48")?;
    writeln!(out, "AntiAlias: 1")?;
    writeln!(out, "FitToEm: 0")?;
    writeln!(out, "BeginChars: {UNICODE_FULL_SLOTS} {}", font.glyph_count())?;

    for (gid, glyph) in font.glyphs().enumerate() {
        writeln!(out)?;
        write_glyph(out, glyph, gid)?;
    }

    writeln!(out, "EndChars")?;
    writeln!(out, "EndSplineFont")
}

fn write_glyph(out: &mut impl Write, glyph: &Glyph, gid: usize) -> fmt::Result {
    let cp = u32::from(glyph.codepoint());
    writeln!(out, "StartChar: {}", glyph.name())?;
    writeln!(out, "Encoding: {cp} {cp} {gid}")?;
    writeln!(out, "Width: {}", glyph.advance_width())?;
    writeln!(out, "VWidth: 0")?;
    writeln!(out, "Flags: W")?;
    writeln!(out, "LayerCount: 2")?;
    writeln!(out, "Fore")?;
    if !glyph.is_empty() {
        writeln!(out, "SplineSet")?;
        for contour in glyph.contours() {
            write_contour(out, contour)?;
        }
        writeln!(out, "EndSplineSet")?;
    }
    writeln!(out, "EndChar")
}

/// Contours are closed by ending on the start point.
fn write_contour(out: &mut impl Write, contour: &BezPath) -> fmt::Result {
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    for el in contour.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                writeln!(out, "{} {} m {CORNER}", p.x, p.y)?;
                start = p;
                current = p;
            }
            PathEl::LineTo(p) => {
                writeln!(out, " {} {} l {CORNER}", p.x, p.y)?;
                current = p;
            }
            PathEl::QuadTo(c, p) => {
                let c1 = current.lerp(c, 2.0 / 3.0);
                let c2 = p.lerp(c, 2.0 / 3.0);
                write_curve(out, c1, c2, p)?;
                current = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                write_curve(out, c1, c2, p)?;
                current = p;
            }
            PathEl::ClosePath => {
                if current != start {
                    writeln!(out, " {} {} l {CORNER}", start.x, start.y)?;
                }
                current = start;
            }
        }
    }
    Ok(())
}

fn write_curve(out: &mut impl Write, c1: Point, c2: Point, p: Point) -> fmt::Result {
    writeln!(out, " {} {} {} {} {} {} c {CURVE}", c1.x, c1.y, c2.x, c2.y, p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontInfo;
    use kurbo::{Rect, Shape};

    fn sfd(font: &Font) -> String {
        let mut out = String::new();
        write_sfd(&mut out, font, 1_700_000_000).unwrap();
        out
    }

    #[test]
    fn test_header_carries_metadata() {
        let font = Font::new(FontInfo::new("Hand-Regular", "Hand Regular", "Hand"));
        let text = sfd(&font);
        assert!(text.starts_with("SplineFontDB: 3.2\n"));
        assert!(text.contains("FontName: Hand-Regular\n"));
        assert!(text.contains("FullName: Hand Regular\n"));
        assert!(text.contains("FamilyName: Hand\n"));
        assert!(text.contains("Ascent: 800\nDescent: 200\n"));
        assert!(text.contains("CreationTime: 1700000000\n"));
        assert!(text.contains("BeginChars: 1114112 0\n"));
        assert!(text.ends_with("EndChars\nEndSplineFont\n"));
    }

    #[test]
    fn test_glyph_block() {
        let mut font = Font::new(FontInfo::new("T", "T", "T"));
        font.create_glyph('A').add_contour(Rect::new(0.0, 0.0, 100.0, 200.0).to_path(0.1));
        font.create_glyph('B');
        let text = sfd(&font);

        let expected = "StartChar: A\n\
                        Encoding: 65 65 0\n\
                        Width: 1000\n\
                        VWidth: 0\n\
                        Flags: W\n\
                        LayerCount: 2\n\
                        Fore\n\
                        SplineSet\n\
                        0 0 m 1\n \
                        100 0 l 1\n \
                        100 200 l 1\n \
                        0 200 l 1\n \
                        0 0 l 1\n\
                        EndSplineSet\n\
                        EndChar\n";
        assert!(text.contains(expected), "{text}");
        assert!(text.contains("StartChar: B\nEncoding: 66 66 1\n"));
        assert!(text.contains("BeginChars: 1114112 2\n"));
    }

    #[test]
    fn test_empty_glyph_has_no_spline_set() {
        let mut font = Font::new(FontInfo::new("T", "T", "T"));
        font.create_glyph('x');
        let text = sfd(&font);
        assert!(text.contains("Fore\nEndChar\n"));
        assert!(!text.contains("SplineSet"));
    }

    #[test]
    fn test_quadratic_segments_are_raised() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.quad_to((30.0, 60.0), (60.0, 0.0));
        path.close_path();
        let mut font = Font::new(FontInfo::new("T", "T", "T"));
        font.create_glyph('o').add_contour(path);
        let text = sfd(&font);
        let curve = text.lines().find(|l| l.ends_with(" c 0")).unwrap();
        let coords: Vec<f64> =
            curve.split_whitespace().take(6).map(|v| v.parse().unwrap()).collect();
        let expected = [20.0, 40.0, 40.0, 40.0, 60.0, 0.0];
        for (got, want) in coords.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{curve}");
        }
    }
}
