//! Auto-tracing of glyph bitmaps into font outlines.

mod bitmap;
pub mod error;
mod import;
pub mod trace;

pub use bitmap::Bitmap;
pub use error::{Error, Result};
pub use import::{ImportFrame, import_outlines, outlines, polygon_to_path};
pub use trace::{Dir, Polygon, TraceOptions, trace};
