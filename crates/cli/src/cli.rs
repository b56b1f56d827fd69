//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use glyphtrace_core::{BuildConfig, DEFAULT_CONFIG_FILE, build_font, check};

#[derive(Parser)]
#[command(name = "glyphtrace")]
#[command(about = "Trace per-character glyph images into SFD and TTF fonts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// INI file describing the font, paths and glyph images
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

impl ConfigArgs {
    fn load(&self) -> Result<BuildConfig> {
        BuildConfig::load(&self.config)
            .with_context(|| format!("Failed to load config: {}", self.config.display()))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trace, place and export every glyph
    Build {
        #[command(flatten)]
        args: ConfigArgs,
    },
    /// List glyph images and whether they exist, without writing anything
    Check {
        #[command(flatten)]
        args: ConfigArgs,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Build { args } => {
                let report = build_font(&args.load()?)?;
                println!(
                    "✓ {} glyphs processed, {} skipped ({:.2}s)",
                    report.processed.len(),
                    report.skipped.len(),
                    report.elapsed.as_secs_f64()
                );
                if !report.empty.is_empty() {
                    let empty: String = report.empty.iter().collect();
                    println!("  Traced to nothing: {empty}");
                }
                println!("  SFD: {}", report.sfd_path.display());
                println!("  TTF: {}", report.ttf_path.display());
            }
            Commands::Check { args } => {
                println!("{}", check(&args.load()?));
            }
        }
        Ok(())
    }
}
