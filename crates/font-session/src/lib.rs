//! In-memory font session for glyphs traced from bitmaps.
//!
//! A [`Font`] owns its metadata and an ordered set of [`Glyph`]s. Once the
//! glyphs are in place the session can be saved as FontForge SFD source and
//! generated as a TrueType binary.

pub mod error;
mod font;
mod glyph;
pub mod sfd;
pub mod ttf;

pub use error::{Error, Result};
pub use font::{DEFAULT_ASCENT, DEFAULT_DESCENT, Font, FontInfo};
pub use glyph::{BoundingBox, Glyph, SideBearings, glyph_name};
