//! TrueType generation.
//!
//! Builds a complete static TrueType font from the session: glyph 0 is an
//! empty `.notdef`, the remaining glyphs follow creation order.

use chrono::Utc;
use font_types::{FWord, Fixed, GlyphId, LongDateTime, NameId, Tag, UfWord};
use kurbo::{BezPath, CubicBez, PathEl, Point};
use log::debug;
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        glyf::{GlyfLocaBuilder, Glyph as WriteGlyph, SimpleGlyph},
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::{Os2, SelectionFlags},
        post::Post,
    },
};

use crate::{
    error::{Error, Result},
    font::Font,
    glyph::Glyph,
};

/// Seconds between the OpenType epoch (1904-01-01) and the Unix epoch.
const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Maximum distance between a cubic segment and its quadratic approximation.
const CUBIC_TOLERANCE: f64 = 1.0;

const NOTDEF: &str = ".notdef";

/// Windows platform, Unicode BMP encoding, US English.
const PLATFORM_WINDOWS: u16 = 3;
const ENCODING_UNICODE_BMP: u16 = 1;
const LANGUAGE_EN_US: u16 = 0x409;

/// Baseline at y=0, left sidebearing point at x=0.
const HEAD_FLAGS: u16 = 0x0003;

/// Integer bounds of a compiled glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Bounds {
    x_min: i16,
    y_min: i16,
    x_max: i16,
    y_max: i16,
}

impl Bounds {
    fn union(self, other: Bounds) -> Bounds {
        Bounds {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

/// Outline and metrics of one compiled glyph.
struct CompiledGlyph {
    glyph: WriteGlyph,
    bbox: Option<Bounds>,
    metric: LongMetric,
    points: u16,
    contours: u16,
}

/// Running bounds over all compiled glyphs.
#[derive(Default)]
struct FontBounds {
    bbox: Option<Bounds>,
    advance_width_max: u16,
    min_left_side_bearing: i16,
    min_right_side_bearing: i16,
    x_max_extent: i16,
    max_points: u16,
    max_contours: u16,
    advance_sum: u64,
    advance_count: u64,
}

impl FontBounds {
    fn add(&mut self, glyph: &CompiledGlyph) {
        let advance = glyph.metric.advance;
        self.advance_width_max = self.advance_width_max.max(advance);
        if advance > 0 {
            self.advance_sum += u64::from(advance);
            self.advance_count += 1;
        }
        self.max_points = self.max_points.max(glyph.points);
        self.max_contours = self.max_contours.max(glyph.contours);

        let Some(bbox) = glyph.bbox else {
            return;
        };
        let lsb = bbox.x_min;
        let rsb = clamp_i16(i32::from(advance) - i32::from(bbox.x_max));
        let extent = clamp_i16(i32::from(lsb) + i32::from(bbox.x_max) - i32::from(bbox.x_min));
        self.bbox = Some(match self.bbox {
            None => {
                self.min_left_side_bearing = lsb;
                self.min_right_side_bearing = rsb;
                self.x_max_extent = extent;
                bbox
            }
            Some(acc) => {
                self.min_left_side_bearing = self.min_left_side_bearing.min(lsb);
                self.min_right_side_bearing = self.min_right_side_bearing.min(rsb);
                self.x_max_extent = self.x_max_extent.max(extent);
                acc.union(bbox)
            }
        });
    }

    fn x_avg_char_width(&self) -> i16 {
        if self.advance_count == 0 {
            return 0;
        }
        clamp_i16((self.advance_sum / self.advance_count) as i32)
    }
}

/// Compile the font to TrueType bytes.
pub fn compile(font: &Font) -> Result<Vec<u8>> {
    let num_glyphs = font.glyph_count() + 1;
    let num_glyphs = u16::try_from(num_glyphs).map_err(|_| Error::TooManyGlyphs(num_glyphs))?;
    let info = font.info();

    let notdef = CompiledGlyph {
        glyph: WriteGlyph::Empty,
        bbox: None,
        metric: LongMetric {
            advance: checked(NOTDEF, "advance width", font.default_advance())?,
            side_bearing: 0,
        },
        points: 0,
        contours: 0,
    };
    let mut compiled = vec![notdef];
    for glyph in font.glyphs() {
        compiled.push(compile_glyph(glyph)?);
    }

    let mut bounds = FontBounds::default();
    let mut glyf_builder = GlyfLocaBuilder::new();
    for glyph in &compiled {
        bounds.add(glyph);
        glyf_builder.add_glyph(&glyph.glyph)?;
    }
    let (glyf, loca, loca_format) = glyf_builder.build();
    let bbox = bounds.bbox.unwrap_or_default();

    let cmap = Cmap::from_mappings(
        font.glyphs().enumerate().map(|(i, g)| (g.codepoint(), GlyphId::new(i as u32 + 1))),
    )
    .map_err(|e| Error::CmapConflict(format!("{e:?}")))?;

    let now = LongDateTime::new(Utc::now().timestamp() + MAC_EPOCH_OFFSET);
    let head = Head {
        font_revision: Fixed::from_f64(1.0),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: Flags::from_bits_truncate(HEAD_FLAGS),
        units_per_em: info.units_per_em(),
        created: now,
        modified: now,
        x_min: bbox.x_min,
        y_min: bbox.y_min,
        x_max: bbox.x_max,
        y_max: bbox.y_max,
        mac_style: MacStyle::empty(),
        lowest_rec_ppem: 8,
        font_direction_hint: 2,
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
    };

    let ascent = info.ascent as i16;
    let descent = -(info.descent as i16);
    let hhea = Hhea {
        ascender: FWord::new(ascent),
        descender: FWord::new(descent),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(bounds.advance_width_max),
        min_left_side_bearing: FWord::new(bounds.min_left_side_bearing),
        min_right_side_bearing: FWord::new(bounds.min_right_side_bearing),
        x_max_extent: FWord::new(bounds.x_max_extent),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: num_glyphs,
    };

    let hmtx = Hmtx {
        h_metrics: compiled.iter().map(|g| g.metric.clone()).collect(),
        left_side_bearings: vec![],
    };

    let maxp = Maxp {
        num_glyphs,
        max_points: Some(bounds.max_points),
        max_contours: Some(bounds.max_contours),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };

    let (first_char, last_char) = char_index_range(font);
    let os2 = Os2 {
        x_avg_char_width: bounds.x_avg_char_width(),
        us_weight_class: 400,
        us_width_class: 5,
        fs_type: 0,
        y_subscript_x_size: scaled(info.units_per_em(), 0.65),
        y_subscript_y_size: scaled(info.units_per_em(), 0.6),
        y_subscript_x_offset: 0,
        y_subscript_y_offset: scaled(info.units_per_em(), 0.075),
        y_superscript_x_size: scaled(info.units_per_em(), 0.65),
        y_superscript_y_size: scaled(info.units_per_em(), 0.6),
        y_superscript_x_offset: 0,
        y_superscript_y_offset: scaled(info.units_per_em(), 0.35),
        y_strikeout_size: scaled(info.units_per_em(), 0.05),
        y_strikeout_position: scaled(info.units_per_em(), 0.25),
        s_family_class: 0,
        panose_10: [0; 10],
        ul_unicode_range_1: 0,
        ul_unicode_range_2: 0,
        ul_unicode_range_3: 0,
        ul_unicode_range_4: 0,
        ach_vend_id: Tag::new(b"PfEd"),
        fs_selection: SelectionFlags::REGULAR,
        us_first_char_index: first_char,
        us_last_char_index: last_char,
        s_typo_ascender: ascent,
        s_typo_descender: descent,
        s_typo_line_gap: 0,
        us_win_ascent: clamp_u16(i32::from(ascent).max(i32::from(bbox.y_max))),
        us_win_descent: clamp_u16(i32::from(-descent).max(-i32::from(bbox.y_min))),
        ul_code_page_range_1: Some(1),
        ul_code_page_range_2: Some(0),
        sx_height: None,
        s_cap_height: None,
        us_default_char: None,
        us_break_char: None,
        us_max_context: None,
        us_lower_optical_point_size: None,
        us_upper_optical_point_size: None,
    };

    let name = build_name(font);

    let mut post = Post::new_v2(
        std::iter::once(NOTDEF).chain(font.glyphs().map(|g| g.name())).collect::<Vec<_>>(),
    );
    post.underline_position = FWord::new(-scaled(info.units_per_em(), 0.1));
    post.underline_thickness = FWord::new(scaled(info.units_per_em(), 0.05));

    let mut builder = FontBuilder::new();
    builder.add_table(&head)?;
    builder.add_table(&hhea)?;
    builder.add_table(&maxp)?;
    builder.add_table(&os2)?;
    builder.add_table(&hmtx)?;
    builder.add_table(&cmap)?;
    builder.add_table(&loca)?;
    builder.add_table(&glyf)?;
    builder.add_table(&name)?;
    builder.add_table(&post)?;

    debug!("Compiled {num_glyphs} glyphs ({} units per em)", info.units_per_em());
    Ok(builder.build())
}

fn compile_glyph(glyph: &Glyph) -> Result<CompiledGlyph> {
    let advance = checked(glyph.name(), "advance width", glyph.advance_width())?;

    if glyph.is_empty() {
        let side_bearing = checked(glyph.name(), "left side bearing", glyph.left_side_bearing())?;
        return Ok(CompiledGlyph {
            glyph: WriteGlyph::Empty,
            bbox: None,
            metric: LongMetric { advance, side_bearing },
            points: 0,
            contours: 0,
        });
    }

    let mut path = BezPath::new();
    let mut points = 0usize;
    let mut contours = 0usize;
    for contour in glyph.contours() {
        let quadratic = to_quadratic(contour);
        for el in quadratic.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    check_points(glyph, &[p])?;
                    contours += 1;
                    points += 1;
                }
                PathEl::LineTo(p) => {
                    check_points(glyph, &[p])?;
                    points += 1;
                }
                PathEl::QuadTo(c, p) => {
                    check_points(glyph, &[c, p])?;
                    points += 2;
                }
                PathEl::CurveTo(c1, c2, p) => {
                    check_points(glyph, &[c1, c2, p])?;
                    points += 3;
                }
                PathEl::ClosePath => {}
            }
        }
        path.extend(quadratic.elements().iter().copied());
    }

    let simple = SimpleGlyph::from_bezpath(&path).map_err(|e| Error::Outline {
        glyph: glyph.name().to_string(),
        message: format!("{e:?}"),
    })?;
    let bbox = Bounds {
        x_min: simple.bbox.x_min,
        y_min: simple.bbox.y_min,
        x_max: simple.bbox.x_max,
        y_max: simple.bbox.y_max,
    };

    Ok(CompiledGlyph {
        glyph: WriteGlyph::Simple(simple),
        bbox: Some(bbox),
        metric: LongMetric { advance, side_bearing: bbox.x_min },
        points: checked(glyph.name(), "point count", points as i64)?,
        contours: checked(glyph.name(), "contour count", contours as i64)?,
    })
}

/// Convert cubic segments to quadratics and round every point to the grid.
fn to_quadratic(path: &BezPath) -> BezPath {
    let mut out = BezPath::new();
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                out.move_to(p.round());
                start = p;
                current = p;
            }
            PathEl::LineTo(p) => {
                out.line_to(p.round());
                current = p;
            }
            PathEl::QuadTo(c, p) => {
                out.quad_to(c.round(), p.round());
                current = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                for (_, _, quad) in CubicBez::new(current, c1, c2, p).to_quads(CUBIC_TOLERANCE) {
                    out.quad_to(quad.p1.round(), quad.p2.round());
                }
                current = p;
            }
            PathEl::ClosePath => {
                out.close_path();
                current = start;
            }
        }
    }
    out
}

fn build_name(font: &Font) -> Name {
    let info = font.info();
    let year = Utc::now().format("%Y");
    let postscript_name: String =
        info.font_name.chars().filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c)).collect();

    let entries = [
        (1, info.family_name.clone()),
        (2, "Regular".to_string()),
        (3, format!("glyphtrace : {} : {year}", info.full_name)),
        (4, info.full_name.clone()),
        (5, "Version 1.000".to_string()),
        (6, postscript_name),
    ];

    Name::new(
        entries
            .into_iter()
            .map(|(id, value)| {
                NameRecord::new(
                    PLATFORM_WINDOWS,
                    ENCODING_UNICODE_BMP,
                    LANGUAGE_EN_US,
                    NameId::new(id),
                    value.into(),
                )
            })
            .collect(),
    )
}

fn char_index_range(font: &Font) -> (u16, u16) {
    let codepoints = font.glyphs().map(|g| u32::from(g.codepoint()).min(0xFFFF) as u16);
    let (min, max) = codepoints.fold((u16::MAX, 0), |(lo, hi), cp| (lo.min(cp), hi.max(cp)));
    if min > max { (0, 0) } else { (min, max) }
}

fn scaled(units_per_em: u16, factor: f64) -> i16 {
    clamp_i16((f64::from(units_per_em) * factor).round() as i32)
}

fn check_points(glyph: &Glyph, points: &[Point]) -> Result<()> {
    for point in points {
        checked::<i16>(glyph.name(), "x coordinate", point.x as i64)?;
        checked::<i16>(glyph.name(), "y coordinate", point.y as i64)?;
    }
    Ok(())
}

/// Convert a glyph value to its TrueType field type, failing when it does not fit.
fn checked<T: TryFrom<i64>>(glyph: &str, what: &'static str, value: impl Into<i64>) -> Result<T> {
    let value: i64 = value.into();
    T::try_from(value).map_err(|_| Error::OutOfRange { glyph: glyph.to_string(), what, value })
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn clamp_u16(value: i32) -> u16 {
    value.clamp(0, i32::from(u16::MAX)) as u16
}
