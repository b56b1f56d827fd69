//! Importing one glyph image into the font session.

use anyhow::{Context, Result};
use font_session::Font;
use font_trace::{ImportFrame, TraceOptions, import_outlines};
use log::{info, warn};

use crate::config::GlyphRequest;

/// What happened to a requested glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The image traced into `contours` outlines.
    Traced { contours: usize },
    /// The image was imported but traced into nothing. The glyph still exists.
    EmptyTrace,
    /// No image file; no glyph was created.
    MissingImage,
}

impl ImportOutcome {
    /// Whether a glyph is now registered for the request.
    pub fn has_glyph(self) -> bool {
        !matches!(self, ImportOutcome::MissingImage)
    }
}

/// Trace the request's image and register the result under its character.
///
/// A missing image is not an error. An image that exists but cannot be
/// decoded is.
pub fn import_glyph(
    font: &mut Font,
    request: &GlyphRequest,
    frame: &ImportFrame,
    options: &TraceOptions,
) -> Result<ImportOutcome> {
    let ch = request.character;
    if !request.image.is_file() {
        warn!("Image for character '{ch}' not found at {}. Skipping this glyph.", request.image.display());
        return Ok(ImportOutcome::MissingImage);
    }

    let contours = import_outlines(&request.image, frame, options)
        .with_context(|| format!("Failed to import image for character '{ch}'"))?;

    let glyph = font.create_glyph(ch);
    glyph.set_contours(contours);

    if glyph.is_empty() {
        warn!("The image for character '{ch}' was imported, but the autotrace did not create contours.");
        Ok(ImportOutcome::EmptyTrace)
    } else {
        info!("The image for character '{ch}' was imported and autotraced successfully.");
        Ok(ImportOutcome::Traced { contours: glyph.contours().len() })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use font_session::FontInfo;
    use image::{GrayImage, Luma};

    use super::*;

    fn font() -> Font {
        Font::new(FontInfo::new("Test-Regular", "Test Regular", "Test"))
    }

    fn request(ch: char, image: &Path) -> GlyphRequest {
        GlyphRequest { character: ch, image: image.to_path_buf() }
    }

    fn frame() -> ImportFrame {
        ImportFrame::new(800.0, 200.0)
    }

    #[test]
    fn test_missing_image_registers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut font = font();
        let outcome =
            import_glyph(&mut font, &request('A', &dir.path().join("a.png")), &frame(), &TraceOptions::DEFAULT)
                .unwrap();
        assert_eq!(outcome, ImportOutcome::MissingImage);
        assert!(!outcome.has_glyph());
        assert_eq!(font.glyph_count(), 0);
    }

    #[test]
    fn test_traced_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("o.png");
        GrayImage::from_fn(5, 5, |x, y| {
            let ring = x == 0 || y == 0 || x == 4 || y == 4;
            Luma([if ring { 0 } else { 255 }])
        })
        .save(&path)
        .unwrap();

        let mut font = font();
        let outcome =
            import_glyph(&mut font, &request('O', &path), &frame(), &TraceOptions::DEFAULT).unwrap();

        assert_eq!(outcome, ImportOutcome::Traced { contours: 2 });
        assert_eq!(font.glyph('O').map(|g| g.contours().len()), Some(2));
    }

    #[test]
    fn test_blank_image_keeps_empty_glyph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        GrayImage::from_pixel(4, 4, Luma([255])).save(&path).unwrap();

        let mut font = font();
        let outcome =
            import_glyph(&mut font, &request(' ', &path), &frame(), &TraceOptions::DEFAULT).unwrap();

        assert_eq!(outcome, ImportOutcome::EmptyTrace);
        assert!(font.glyph(' ').is_some_and(|g| g.is_empty()));
    }

    #[test]
    fn test_undecodable_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"garbage").unwrap();

        let mut font = font();
        let result = import_glyph(&mut font, &request('B', &path), &frame(), &TraceOptions::DEFAULT);

        assert!(result.is_err());
        assert_eq!(font.glyph_count(), 0);
    }
}
