use std::{fmt, str::FromStr};

use font_session::{BoundingBox, Glyph, SideBearings};
use log::debug;

use crate::error::{Error, Result};

/// Vertical anchor for placed glyphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Top of the outline on the ascent line.
    Top,
    /// Bottom of the outline on the baseline.
    #[default]
    Bottom,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Top => "top",
            Alignment::Bottom => "bottom",
        }
    }
}

impl FromStr for Alignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(Alignment::Top),
            "bottom" => Ok(Alignment::Bottom),
            other => Err(Error::InvalidAlignment(other.to_string())),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings applied uniformly to every glyph of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementConfig {
    pub scaling_factor: f64,
    pub alignment: Alignment,
    /// Extra vertical shift in font units, applied after alignment.
    pub vertical_offset: i32,
}

impl PlacementConfig {
    pub fn new(scaling_factor: f64, alignment: Alignment, vertical_offset: i32) -> Result<Self> {
        if !scaling_factor.is_finite() || scaling_factor <= 0.0 {
            return Err(Error::InvalidScale(scaling_factor));
        }
        Ok(Self { scaling_factor, alignment, vertical_offset })
    }
}

/// Offsets and bearings computed for one glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub center_x_offset: i32,
    pub y_offset: i32,
    pub side_bearings: SideBearings,
}

/// Placement arithmetic for a glyph whose scaled bounds are `bbox`.
///
/// The free horizontal space is split with the extra unit going right, so
/// `left + width + right == advance_width` always holds. Offsets that do not
/// fit in font coordinates are rejected.
pub fn compute_placement(
    bbox: BoundingBox,
    advance_width: i32,
    ascent: i32,
    config: &PlacementConfig,
) -> Result<Placement> {
    let min_x = grid_coordinate("bbox min x", bbox.min_x)?;
    let min_y = grid_coordinate("bbox min y", bbox.min_y)?;
    let max_y = grid_coordinate("bbox max y", bbox.max_y)?;
    let glyph_width = grid_coordinate("glyph width", bbox.width())?;

    let free = i64::from(advance_width) - glyph_width;
    let left = free.div_euclid(2);
    let right = free - left;

    let vertical_offset = i64::from(config.vertical_offset);
    let y_offset = match config.alignment {
        Alignment::Bottom => -min_y + vertical_offset,
        Alignment::Top => i64::from(ascent) - max_y + vertical_offset,
    };

    Ok(Placement {
        center_x_offset: narrow("horizontal offset", left - min_x)?,
        y_offset: narrow("vertical offset", y_offset)?,
        side_bearings: SideBearings {
            left: narrow("left side bearing", left)?,
            right: narrow("right side bearing", right)?,
        },
    })
}

/// Round a scaled coordinate, keeping it within the i32 range.
fn grid_coordinate(what: &'static str, value: f64) -> Result<i64> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
        return Err(Error::OutOfRange { what, value: value.to_string() });
    }
    Ok(rounded as i64)
}

fn narrow(what: &'static str, value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::OutOfRange { what, value: value.to_string() })
}

/// Scale, center and align `glyph`, then store its side bearings.
///
/// Outlines are snapped to the integer grid after scaling. The advance width
/// is not changed.
pub fn place_glyph(glyph: &mut Glyph, config: &PlacementConfig, ascent: i32) -> Result<Placement> {
    glyph.scale(config.scaling_factor);
    glyph.round_to_grid();

    let bbox = glyph.bounding_box();
    let placement = compute_placement(bbox, glyph.advance_width(), ascent, config)?;
    debug!(
        "{}: bbox ({}, {})-({}, {}), offset ({}, {})",
        glyph.name(),
        bbox.min_x,
        bbox.min_y,
        bbox.max_x,
        bbox.max_y,
        placement.center_x_offset,
        placement.y_offset
    );

    glyph.translate(f64::from(placement.center_x_offset), f64::from(placement.y_offset));
    glyph.set_side_bearings(placement.side_bearings);
    Ok(placement)
}
