//! The build run: import, place, save, generate.

use std::{
    fmt,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use font_placement::place_glyph;
use font_session::Font;
use log::info;

use crate::{
    config::{BuildConfig, GlyphRequest},
    importer::{ImportOutcome, import_glyph},
    io::OutputFile,
};

/// Summary of a finished build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Characters that got a placed glyph, in config order.
    pub processed: Vec<char>,
    /// Processed characters whose image traced into nothing.
    pub empty: Vec<char>,
    /// Characters skipped for lack of an image.
    pub skipped: Vec<char>,
    pub sfd_path: PathBuf,
    pub ttf_path: PathBuf,
    pub elapsed: Duration,
}

/// Import, place and export every glyph named by `config`.
///
/// Missing images are logged and skipped. Placement and export failures
/// abort the run.
pub fn build_font(config: &BuildConfig) -> Result<BuildReport> {
    let start = Instant::now();
    info!(
        "Building '{}' from {} glyph images",
        config.font.full_name,
        config.glyphs.len()
    );

    let mut font = Font::new(config.font.clone()).with_default_advance(config.advance_width);
    let frame = config.import_frame();
    let ascent = font.ascent();

    let mut processed = Vec::new();
    let mut empty = Vec::new();
    let mut skipped = Vec::new();

    for request in &config.glyphs {
        let ch = request.character;
        match import_glyph(&mut font, request, &frame, &config.trace)? {
            ImportOutcome::MissingImage => {
                skipped.push(ch);
                continue;
            }
            ImportOutcome::EmptyTrace => empty.push(ch),
            ImportOutcome::Traced { .. } => {}
        }

        let glyph = font
            .glyph_mut(ch)
            .with_context(|| format!("Glyph for character '{ch}' was not registered"))?;
        place_glyph(glyph, &config.placement, ascent)
            .with_context(|| format!("Failed to place glyph '{ch}'"))?;
        info!("Glyph scaled by factor: {}", config.placement.scaling_factor);
        info!(
            "Glyph centered horizontally and aligned to the {} with a vertical offset of {}.",
            config.placement.alignment, config.placement.vertical_offset
        );
        info!("Processed character: {ch}");
        processed.push(ch);
    }

    let sfd = OutputFile::new(&config.paths.sfd_path);
    sfd.write_with("SFD", |path| font.save(path))?;
    info!("SFD file saved to {}", sfd.path().display());

    let ttf = OutputFile::new(&config.paths.ttf_path);
    ttf.write_with("TTF", |path| font.generate(path))?;
    info!("TTF file generated at {}", ttf.path().display());

    font.close();

    let elapsed = start.elapsed();
    info!(
        "Done in {:.2}s: {} processed, {} skipped",
        elapsed.as_secs_f64(),
        processed.len(),
        skipped.len()
    );

    Ok(BuildReport {
        processed,
        empty,
        skipped,
        sfd_path: config.paths.sfd_path.clone(),
        ttf_path: config.paths.ttf_path.clone(),
        elapsed,
    })
}

/// A glyph request and whether its image is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphStatus {
    pub request: GlyphRequest,
    pub found: bool,
}

/// Result of a dry run over the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub glyphs: Vec<GlyphStatus>,
    pub sfd_path: PathBuf,
    pub ttf_path: PathBuf,
}

impl CheckReport {
    pub fn missing(&self) -> impl Iterator<Item = &GlyphRequest> {
        self.glyphs.iter().filter(|s| !s.found).map(|s| &s.request)
    }

    pub fn found_count(&self) -> usize {
        self.glyphs.iter().filter(|s| s.found).count()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for status in &self.glyphs {
            let mark = if status.found { "ok" } else { "missing" };
            writeln!(
                f,
                "{:<8} U+{:04X} {:<8} {}",
                format!("'{}'", status.request.character),
                u32::from(status.request.character),
                mark,
                status.request.image.display()
            )?;
        }
        writeln!(f, "{}/{} images found", self.found_count(), self.glyphs.len())?;
        writeln!(f, "SFD: {}", self.sfd_path.display())?;
        write!(f, "TTF: {}", self.ttf_path.display())
    }
}

/// Report which glyph images exist without writing anything.
pub fn check(config: &BuildConfig) -> CheckReport {
    let glyphs = config
        .glyphs
        .iter()
        .map(|request| GlyphStatus { request: request.clone(), found: request.image.is_file() })
        .collect();
    CheckReport {
        glyphs,
        sfd_path: config.paths.sfd_path.clone(),
        ttf_path: config.paths.ttf_path.clone(),
    }
}
