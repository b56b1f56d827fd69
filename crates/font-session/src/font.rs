//! The font session: metadata plus an ordered set of glyphs.

use std::{fs::write, path::Path};

use indexmap::IndexMap;
use log::info;

use crate::{
    error::{Error, Result},
    glyph::Glyph,
    sfd, ttf,
};

/// Default ascent for a new font, in font units.
pub const DEFAULT_ASCENT: u16 = 800;

/// Default descent for a new font, in font units.
pub const DEFAULT_DESCENT: u16 = 200;

/// Font-level metadata set once when the session is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontInfo {
    /// PostScript font name.
    pub font_name: String,
    pub full_name: String,
    pub family_name: String,
    pub ascent: u16,
    pub descent: u16,
}

impl FontInfo {
    pub fn new(
        font_name: impl Into<String>,
        full_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        Self {
            font_name: font_name.into(),
            full_name: full_name.into(),
            family_name: family_name.into(),
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
        }
    }

    pub fn with_metrics(mut self, ascent: u16, descent: u16) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self
    }

    /// Units per em, `ascent + descent`.
    pub fn units_per_em(&self) -> u16 {
        self.ascent.saturating_add(self.descent)
    }
}

/// A font under construction.
///
/// Glyphs are kept in creation order; that order is the glyph order of the
/// saved and generated files.
#[derive(Debug, Clone)]
pub struct Font {
    info: FontInfo,
    glyphs: IndexMap<char, Glyph>,
    default_advance: i32,
}

impl Font {
    /// Create an empty font. New glyphs are one em wide.
    pub fn new(info: FontInfo) -> Self {
        let default_advance = i32::from(info.units_per_em());
        Self { info, glyphs: IndexMap::new(), default_advance }
    }

    /// Override the advance width given to newly created glyphs.
    pub fn with_default_advance(mut self, advance_width: i32) -> Self {
        self.default_advance = advance_width;
        self
    }

    pub fn info(&self) -> &FontInfo {
        &self.info
    }

    pub fn ascent(&self) -> i32 {
        i32::from(self.info.ascent)
    }

    pub fn descent(&self) -> i32 {
        i32::from(self.info.descent)
    }

    pub fn default_advance(&self) -> i32 {
        self.default_advance
    }

    /// Get the glyph for `ch`, creating an empty one if needed.
    pub fn create_glyph(&mut self, ch: char) -> &mut Glyph {
        let advance = self.default_advance;
        self.glyphs.entry(ch).or_insert_with(|| Glyph::new(ch, advance))
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn glyph_mut(&mut self, ch: char) -> Option<&mut Glyph> {
        self.glyphs.get_mut(&ch)
    }

    /// Remove a glyph, keeping the order of the others.
    pub fn remove_glyph(&mut self, ch: char) -> Option<Glyph> {
        self.glyphs.shift_remove(&ch)
    }

    /// Glyphs in creation order.
    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.values()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Save the editable SFD source.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let source = sfd::to_sfd_string(self)?;
        write(path, source).map_err(|e| Error::WriteFile { path: path.to_path_buf(), source: e })?;
        info!("Saved {} glyphs to {}", self.glyph_count(), path.display());
        Ok(())
    }

    /// Generate a TrueType binary.
    pub fn generate(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = ttf::compile(self)?;
        write(path, &data).map_err(|e| Error::WriteFile { path: path.to_path_buf(), source: e })?;
        info!("Generated {} ({} bytes)", path.display(), data.len());
        Ok(())
    }

    /// End the session.
    pub fn close(self) {
        info!("Closed font '{}'", self.info.font_name);
    }
}
