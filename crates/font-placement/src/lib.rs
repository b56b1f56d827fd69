//! Glyph placement within the advance box.
//!
//! A traced glyph is scaled uniformly, centered horizontally in its advance
//! width and aligned vertically to the baseline or the ascent line. The
//! resulting side bearings are written back onto the glyph.

pub mod error;
mod placement;

pub use error::{Error, Result};
pub use placement::{Alignment, Placement, PlacementConfig, compute_placement, place_glyph};
