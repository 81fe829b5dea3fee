// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Inkpath: evaluate a recorded drawing against a glyph template

use anyhow::{Context, Result, bail};
use inkpath::{DifficultyProfile, DifficultyTier, Drawing, GlyphTemplate, PreparedGlyph, RowLayout};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

const USAGE: &str = "Usage: inkpath <template.json> <drawing.json> [beginner|intermediate|expert] \
                     [--profile file.toml] [--row-height N] [--left-handed]";

/// Row height used when none is given on the command line
const DEFAULT_ROW_HEIGHT: f64 = 100.0;

/// Parsed command line
#[derive(Debug)]
struct Options {
    template: PathBuf,
    drawing: PathBuf,
    tier: Option<DifficultyTier>,
    profile: Option<PathBuf>,
    row_height: f64,
    left_handed: bool,
}

fn main() -> Result<()> {
    // Controlled via RUST_LOG; logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("inkpath=info".parse().context("bad log directive")?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let template: GlyphTemplate = read_json(&options.template)?;
    let drawing: Drawing = read_json(&options.drawing)?;
    let profile = load_profile(&options)?;
    let layout = RowLayout::new(options.row_height).left_handed(options.left_handed);

    tracing::info!(
        "Evaluating '{}' ({} strokes of ink) at {} difficulty",
        template.id,
        drawing.strokes.len(),
        profile.tier.name()
    );
    let prepared = PreparedGlyph::prepare(&template, &layout, &profile)
        .with_context(|| format!("Cannot lay out template '{}'", template.id))?;
    let result = prepared.evaluate(&drawing);

    match result.failure {
        Some(failure) => tracing::info!("Failed: {}", failure.describe()),
        None if result.is_complete() => tracing::info!("Complete"),
        None => tracing::info!(
            "In progress: {}/{} checkpoints",
            result.completed_count(),
            result.total_checkpoint_count
        ),
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut positional = Vec::new();
    let mut profile = None;
    let mut row_height = DEFAULT_ROW_HEIGHT;
    let mut left_handed = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--profile" => {
                let path = iter.next().context("--profile needs a file")?;
                profile = Some(PathBuf::from(path));
            }
            "--row-height" => {
                let value = iter.next().context("--row-height needs a number")?;
                row_height = value
                    .parse()
                    .with_context(|| format!("Invalid row height: {value}"))?;
            }
            "--left-handed" => left_handed = true,
            "-h" | "--help" => bail!("{USAGE}"),
            other if other.starts_with("--") => bail!("Unknown option {other}\n{USAGE}"),
            other => positional.push(other),
        }
    }

    let (template, drawing, tier) = match positional.as_slice() {
        [template, drawing] => (template, drawing, None),
        [template, drawing, tier] => {
            let tier = DifficultyTier::from_name(tier)
                .with_context(|| format!("Unknown difficulty tier: {tier}"))?;
            (template, drawing, Some(tier))
        }
        _ => bail!("{USAGE}"),
    };

    Ok(Options {
        template: PathBuf::from(template),
        drawing: PathBuf::from(drawing),
        tier,
        profile,
        row_height,
        left_handed,
    })
}

/// The `--profile` file when given, else the preset for the tier argument
fn load_profile(options: &Options) -> Result<DifficultyProfile> {
    let Some(path) = &options.profile else {
        return Ok(DifficultyProfile::for_tier(options.tier.unwrap_or_default()));
    };
    if options.tier.is_some() {
        tracing::warn!("Ignoring tier argument; using {}", path.display());
    }
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    DifficultyProfile::from_toml_str(&source)
        .with_context(|| format!("Invalid profile {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
