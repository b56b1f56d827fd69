//! Glyphtrace core: config loading and the image-to-font build pipeline.

pub mod config;
pub mod importer;
pub mod io;
pub mod pipeline;

pub use config::{BuildConfig, ConfigError, DEFAULT_CONFIG_FILE, GlyphRequest, OutputPaths};
pub use importer::{ImportOutcome, import_glyph};
pub use pipeline::{BuildReport, CheckReport, GlyphStatus, build_font, check};

pub use font_placement::{Alignment, PlacementConfig};
pub use font_session::{Font, FontInfo};
pub use font_trace::{ImportFrame, TraceOptions};
