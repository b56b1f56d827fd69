//! Build configuration read from an INI file.
//!
//! ```ini
//! [FONT_PROPERTIES]
//! fontname = Inked-Regular
//! fullname = Inked Regular
//! familyname = Inked
//! scaling_factor = 2.0
//! alignment = bottom
//! vertical_offset = 0
//!
//! [PATHS]
//! common_image_path = images
//! sfd_path = out/Inked.sfd
//! ttf_path = out/Inked.ttf
//!
//! [GLYPHS]
//! A = a.png
//! a = a_small.png
//! ```
//!
//! Keys are case-sensitive and `[GLYPHS]` keeps file order. A key may appear
//! only once per section. `;` and `#` start a comment only at the beginning
//! of a line, so values may contain them.

use std::{
    collections::HashSet,
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};

use configparser::ini::Ini;
use font_placement::{Alignment, PlacementConfig};
use font_session::{DEFAULT_ASCENT, DEFAULT_DESCENT, FontInfo};
use font_trace::{ImportFrame, TraceOptions};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.ini";

const FONT_PROPERTIES: &str = "FONT_PROPERTIES";
const PATHS: &str = "PATHS";
const GLYPHS: &str = "GLYPHS";
const TRACE: &str = "TRACE";

/// TrueType limits on units per em.
const MIN_UNITS_PER_EM: u16 = 16;
const MAX_UNITS_PER_EM: u16 = 16384;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Missing section [{0}]")]
    MissingSection(&'static str),

    #[error("Missing key '{key}' in [{section}]")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },

    #[error("Invalid value '{value}' for '{key}' in [{section}]: {reason}")]
    InvalidValue {
        section: &'static str,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Duplicate key '{key}' in [{section}]")]
    DuplicateKey { section: String, key: String },

    #[error("Invalid glyph key '{0}': expected a single character")]
    InvalidGlyphKey(String),

    #[error(transparent)]
    Placement(#[from] font_placement::Error),
}

type Result<T> = std::result::Result<T, ConfigError>;

/// One character to import and the image it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRequest {
    pub character: char,
    pub image: PathBuf,
}

/// Where images are read from and fonts are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub image_dir: PathBuf,
    pub sfd_path: PathBuf,
    pub ttf_path: PathBuf,
}

/// Everything a build run needs, validated up front.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub font: FontInfo,
    /// Advance width of every imported glyph.
    pub advance_width: i32,
    pub placement: PlacementConfig,
    pub trace: TraceOptions,
    pub paths: OutputPaths,
    /// Glyphs in file order.
    pub glyphs: Vec<GlyphRequest>,
}

impl BuildConfig {
    /// Load a config file. Relative paths inside it resolve against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_to_string(path)
            .map_err(|e| ConfigError::Read { path: path.to_path_buf(), source: e })?;
        Self::parse_in(&text, path.parent())
    }

    /// Parse config text. Relative paths are kept as written.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_in(text, None)
    }

    fn parse_in(text: &str, base_dir: Option<&Path>) -> Result<Self> {
        if let Some((section, key)) = find_duplicate_key(text) {
            return Err(ConfigError::DuplicateKey { section, key });
        }
        let mut defaults = Ini::new_cs().defaults();
        defaults.enable_inline_comments = false;
        let mut ini = Ini::new_from_defaults(defaults);
        ini.read(text.to_string()).map_err(ConfigError::Parse)?;
        let reader = Reader { ini: &ini };

        let font_name = reader.required(FONT_PROPERTIES, "fontname")?;
        let full_name = reader.required(FONT_PROPERTIES, "fullname")?;
        let family_name = reader.required(FONT_PROPERTIES, "familyname")?;
        let ascent = reader.parsed_or(FONT_PROPERTIES, "ascent", DEFAULT_ASCENT)?;
        let descent = reader.parsed_or(FONT_PROPERTIES, "descent", DEFAULT_DESCENT)?;
        let units_per_em = units_per_em(ascent, descent)?;
        let advance_width: u16 = reader.parsed_or(FONT_PROPERTIES, "advance_width", units_per_em)?;

        let scaling_factor: f64 = reader.parsed(FONT_PROPERTIES, "scaling_factor")?;
        let alignment = match reader.optional(FONT_PROPERTIES, "alignment") {
            Some(value) => value.parse::<Alignment>()?,
            None => Alignment::default(),
        };
        let vertical_offset = reader.parsed_or(FONT_PROPERTIES, "vertical_offset", 0)?;
        let placement = PlacementConfig::new(scaling_factor, alignment, vertical_offset)?;

        let trace = TraceOptions {
            threshold: reader.parsed_or(TRACE, "threshold", TraceOptions::DEFAULT.threshold)?,
            despeckle: reader.parsed_or(TRACE, "despeckle", TraceOptions::DEFAULT.despeckle)?,
        };

        let resolve = |value: String| resolve_path(base_dir, &value);
        let paths = OutputPaths {
            image_dir: resolve(reader.required(PATHS, "common_image_path")?),
            sfd_path: resolve(reader.required(PATHS, "sfd_path")?),
            ttf_path: resolve(reader.required(PATHS, "ttf_path")?),
        };

        let glyphs = reader.glyphs(&paths.image_dir)?;

        Ok(Self {
            font: FontInfo::new(font_name, full_name, family_name).with_metrics(ascent, descent),
            advance_width: i32::from(advance_width),
            placement,
            trace,
            paths,
            glyphs,
        })
    }

    /// Frame that maps image pixels onto this font's em.
    pub fn import_frame(&self) -> ImportFrame {
        ImportFrame::new(f64::from(self.font.ascent), f64::from(self.font.descent))
    }
}

struct Reader<'a> {
    ini: &'a Ini,
}

impl Reader<'_> {
    fn has_section(&self, section: &str) -> bool {
        self.ini.sections().iter().any(|s| s == section)
    }

    /// Value of `key`, or `None` when the key is absent. Empty values are kept.
    fn optional(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key)
    }

    fn present(&self, section: &'static str, key: &'static str) -> Result<String> {
        if !self.has_section(section) {
            return Err(ConfigError::MissingSection(section));
        }
        self.optional(section, key).ok_or(ConfigError::MissingKey { section, key })
    }

    /// A non-empty string value.
    fn required(&self, section: &'static str, key: &'static str) -> Result<String> {
        let value = self.present(section, key)?;
        if value.is_empty() {
            return Err(ConfigError::InvalidValue {
                section,
                key: key.to_string(),
                value,
                reason: "value is empty".to_string(),
            });
        }
        Ok(value)
    }

    fn parsed<T>(&self, section: &'static str, key: &'static str) -> Result<T>
    where
        T: FromStr,
        T::Err: ToString,
    {
        let value = self.present(section, key)?;
        parse_value(section, key, value)
    }

    fn parsed_or<T>(&self, section: &'static str, key: &'static str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: ToString,
    {
        match self.optional(section, key) {
            Some(value) => parse_value(section, key, value),
            None => Ok(default),
        }
    }

    fn glyphs(&self, image_dir: &Path) -> Result<Vec<GlyphRequest>> {
        let Some(entries) = self.ini.get_map_ref().get(GLYPHS) else {
            return Err(ConfigError::MissingSection(GLYPHS));
        };
        entries
            .iter()
            .map(|(key, value)| {
                let character = single_char(key)?;
                let file = value.as_deref().filter(|v| !v.is_empty()).ok_or_else(|| {
                    ConfigError::InvalidValue {
                        section: GLYPHS,
                        key: key.clone(),
                        value: String::new(),
                        reason: "missing image filename".to_string(),
                    }
                })?;
                Ok(GlyphRequest { character, image: image_dir.join(file) })
            })
            .collect()
    }
}

fn parse_value<T>(section: &'static str, key: &'static str, value: String) -> Result<T>
where
    T: FromStr,
    T::Err: ToString,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        section,
        key: key.to_string(),
        reason: e.to_string(),
        value,
    })
}

/// First key that appears twice in the same section, scanning lines the way
/// the INI reader does.
fn find_duplicate_key(text: &str) -> Option<(String, String)> {
    let mut section = "default";
    let mut seen = HashSet::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with([';', '#']) {
            continue;
        }
        if let Some(rest) = line.strip_prefix('[') {
            if let Some(end) = rest.rfind(']') {
                section = rest[..end].trim();
            }
            continue;
        }
        let key = match line.find(['=', ':']) {
            Some(idx) => line[..idx].trim(),
            None => line,
        };
        if !seen.insert((section, key)) {
            return Some((section.to_string(), key.to_string()));
        }
    }
    None
}

fn units_per_em(ascent: u16, descent: u16) -> Result<u16> {
    let em = ascent.checked_add(descent).unwrap_or(u16::MAX);
    if !(MIN_UNITS_PER_EM..=MAX_UNITS_PER_EM).contains(&em) {
        return Err(ConfigError::InvalidValue {
            section: FONT_PROPERTIES,
            key: "ascent + descent".to_string(),
            value: format!("{ascent} + {descent}"),
            reason: format!("units per em must be between {MIN_UNITS_PER_EM} and {MAX_UNITS_PER_EM}"),
        });
    }
    Ok(em)
}

fn single_char(key: &str) -> Result<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::InvalidGlyphKey(key.to_string())),
    }
}

fn resolve_path(base_dir: Option<&Path>, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "\
[FONT_PROPERTIES]
fontname = Inked-Regular
fullname = Inked Regular
familyname = Inked
scaling_factor = 2.0

[PATHS]
common_image_path = images
sfd_path = out/Inked.sfd
ttf_path = out/Inked.ttf

[GLYPHS]
b = b.png
A = a.png
a = a_small.png
";

    fn with_property(line: &str) -> String {
        MINIMAL.replacen("scaling_factor = 2.0\n", &format!("scaling_factor = 2.0\n{line}\n"), 1)
    }

    #[test]
    fn test_parse_minimal() {
        let config = BuildConfig::parse(MINIMAL).unwrap();
        assert_eq!(config.font.font_name, "Inked-Regular");
        assert_eq!(config.font.full_name, "Inked Regular");
        assert_eq!(config.font.family_name, "Inked");
        assert_eq!((config.font.ascent, config.font.descent), (800, 200));
        assert_eq!(config.advance_width, 1000);
        assert_eq!(config.placement, PlacementConfig::new(2.0, Alignment::Bottom, 0).unwrap());
        assert_eq!(config.trace, TraceOptions::DEFAULT);
        assert_eq!(config.paths.sfd_path, PathBuf::from("out/Inked.sfd"));
    }

    #[test]
    fn test_glyphs_keep_order_and_case() {
        let config = BuildConfig::parse(MINIMAL).unwrap();
        let chars: Vec<char> = config.glyphs.iter().map(|g| g.character).collect();
        assert_eq!(chars, ['b', 'A', 'a']);
        assert_eq!(config.glyphs[1].image, PathBuf::from("images/a.png"));
        assert_eq!(config.glyphs[2].image, PathBuf::from("images/a_small.png"));
    }

    #[test]
    fn test_optional_properties() {
        let text = with_property(
            "alignment = top\nvertical_offset = -15\nascent = 900\ndescent = 124\nadvance_width = 600",
        );
        let config = BuildConfig::parse(&text).unwrap();
        assert_eq!(config.placement.alignment, Alignment::Top);
        assert_eq!(config.placement.vertical_offset, -15);
        assert_eq!(config.font.units_per_em(), 1024);
        assert_eq!(config.advance_width, 600);
        assert_eq!(config.import_frame(), ImportFrame::new(900.0, 124.0));
    }

    #[test]
    fn test_trace_section() {
        let text = format!("{MINIMAL}\n[TRACE]\nthreshold = 200\ndespeckle = 4\n");
        let config = BuildConfig::parse(&text).unwrap();
        assert_eq!(config.trace, TraceOptions { threshold: 200, despeckle: 4 });
    }

    #[test]
    fn test_invalid_alignment() {
        let err = BuildConfig::parse(&with_property("alignment = middle")).unwrap_err();
        assert!(matches!(err, ConfigError::Placement(font_placement::Error::InvalidAlignment(_))));
    }

    #[test]
    fn test_invalid_scale() {
        let text = MINIMAL.replace("scaling_factor = 2.0", "scaling_factor = 0");
        let err = BuildConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Placement(font_placement::Error::InvalidScale(_))));

        let text = MINIMAL.replace("scaling_factor = 2.0", "scaling_factor = big");
        let err = BuildConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "scaling_factor"));
    }

    #[test]
    fn test_missing_key_and_section() {
        let text = MINIMAL.replace("fullname = Inked Regular\n", "");
        let err = BuildConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "fullname", .. }));

        let text = MINIMAL.replace("[PATHS]", "[OTHER]");
        let err = BuildConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("PATHS")));
    }

    #[test]
    fn test_section_names_are_case_sensitive() {
        let text = MINIMAL.replace("[GLYPHS]", "[glyphs]");
        let err = BuildConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("GLYPHS")));
    }

    #[test]
    fn test_multi_character_glyph_key() {
        let text = format!("{MINIMAL}AB = ab.png\n");
        let err = BuildConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGlyphKey(ref k) if k == "AB"));
    }

    #[test]
    fn test_unicode_glyph_key() {
        let text = format!("{MINIMAL}あ = a_hiragana.png\n");
        let config = BuildConfig::parse(&text).unwrap();
        assert_eq!(config.glyphs.last().map(|g| g.character), Some('あ'));
    }

    #[test]
    fn test_em_out_of_range() {
        let err = BuildConfig::parse(&with_property("ascent = 8\ndescent = 2")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_comment_characters_inside_values() {
        let text = MINIMAL
            .replace("fullname = Inked Regular", "fullname = Inked #1; Bold")
            .replace("A = a.png", "A = a#1.png\n; a full-line comment\n# another");
        let config = BuildConfig::parse(&text).unwrap();
        assert_eq!(config.font.full_name, "Inked #1; Bold");
        assert_eq!(config.glyphs[1].image, PathBuf::from("images/a#1.png"));
        assert_eq!(config.glyphs.len(), 3);
    }

    #[test]
    fn test_empty_value_is_not_a_default() {
        let err = BuildConfig::parse(&with_property("alignment =")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Placement(font_placement::Error::InvalidAlignment(ref s)) if s.is_empty()
        ));

        let err = BuildConfig::parse(&with_property("vertical_offset =")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "vertical_offset"));

        let text = MINIMAL.replace("fontname = Inked-Regular", "fontname =");
        let err = BuildConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "fontname"));
    }

    #[test]
    fn test_advance_width_range() {
        for value in ["-500", "65536"] {
            let err = BuildConfig::parse(&with_property(&format!("advance_width = {value}")))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "advance_width"));
        }
        let config = BuildConfig::parse(&with_property("advance_width = 65535")).unwrap();
        assert_eq!(config.advance_width, 65535);
    }

    #[test]
    fn test_duplicate_glyph_key() {
        let text = format!("{MINIMAL}A = other.png\n");
        let err = BuildConfig::parse(&text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateKey { ref section, ref key } if section == "GLYPHS" && key == "A"
        ));
    }

    #[test]
    fn test_duplicate_key_scan() {
        assert_eq!(find_duplicate_key("[A]\nx = 1\n[B]\nx = 2\n"), None);
        assert_eq!(find_duplicate_key("[A]\nx = 1\n; x = 2\n"), None);
        assert_eq!(
            find_duplicate_key("[A]\nx = 1\n[B]\n[A]\nx: 2\n"),
            Some(("A".to_string(), "x".to_string()))
        );
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/work/fonts");
        assert_eq!(resolve_path(Some(base), "out/a.ttf"), PathBuf::from("/work/fonts/out/a.ttf"));
        assert_eq!(resolve_path(Some(base), "/tmp/a.ttf"), PathBuf::from("/tmp/a.ttf"));
        assert_eq!(resolve_path(None, "out/a.ttf"), PathBuf::from("out/a.ttf"));
    }
}
