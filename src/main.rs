// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Varpath command line: inspect, interpolate and draw packed paths

use anyhow::{Context, Result, bail};
use kurbo::Rect;
use std::path::{Path, PathBuf};
use varpath::EditorSettings;
use varpath::path::shapes::{draw_ellipse_in_rect, draw_rect};
use varpath::path::{PackedPath, PackedPathPen, RecordingPen};

const USAGE: &str = "\
Usage:
  varpath draw <path.json>
  varpath interpolate <a.json> <b.json> <t>
  varpath shape <rect|ellipse> <x0> <y0> <x1> <y1> [--settings <file.toml>]";

fn main() -> Result<()> {
    varpath::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        bail!("missing command\n{USAGE}");
    };
    match command.as_str() {
        "draw" => draw(rest),
        "interpolate" => interpolate(rest),
        "shape" => shape(rest),
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}

fn load_path(path: &Path) -> Result<PackedPath> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let packed: PackedPath = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse packed path {}", path.display()))?;
    tracing::info!(
        "Loaded {} ({} points, {} contours)",
        path.display(),
        packed.num_points(),
        packed.num_contours()
    );
    Ok(packed)
}

fn parse_number(arg: &str) -> Result<f64> {
    arg.parse()
        .with_context(|| format!("'{arg}' is not a number"))
}

/// Print the drawing commands of a packed path, one JSON object per line
fn draw(args: &[String]) -> Result<()> {
    let [file] = args else {
        bail!("draw takes one file\n{USAGE}");
    };
    let packed = load_path(Path::new(file))?;
    let mut pen = RecordingPen::new();
    packed.draw_to_path(&mut pen)?;
    for command in &pen.commands {
        println!("{}", serde_json::to_string(command)?);
    }
    Ok(())
}

/// Print the path at `t` between two compatible masters
fn interpolate(args: &[String]) -> Result<()> {
    let [a, b, t] = args else {
        bail!("interpolate takes two files and a factor\n{USAGE}");
    };
    let a = load_path(Path::new(a))?;
    let b = load_path(Path::new(b))?;
    let t = parse_number(t)?;
    let result = a
        .interpolate(&b, t)
        .context("Masters are not interpolation compatible")?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Print a rectangle or ellipse contour as a packed path
fn shape(args: &[String]) -> Result<()> {
    let (kind, rest) = args
        .split_first()
        .with_context(|| format!("shape needs a kind\n{USAGE}"))?;
    let mut coords = Vec::new();
    let mut settings_file: Option<PathBuf> = None;
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        if arg == "--settings" {
            let file = iter.next().context("--settings needs a file")?;
            settings_file = Some(PathBuf::from(file));
        } else {
            coords.push(parse_number(arg)?);
        }
    }
    let [x0, y0, x1, y1] = coords[..] else {
        bail!("shape takes four coordinates\n{USAGE}");
    };
    let settings = match settings_file {
        Some(file) => EditorSettings::load(&file)?,
        None => EditorSettings::default(),
    };

    let rect = Rect::new(x0, y0, x1, y1).abs();
    let mut pen = PackedPathPen::new();
    match kind.as_str() {
        "rect" => draw_rect(&mut pen, rect),
        "ellipse" => draw_ellipse_in_rect(&mut pen, rect, settings.ellipse_tension),
        other => bail!("unknown shape '{other}'\n{USAGE}"),
    }
    let packed = pen.finish()?;
    println!("{}", serde_json::to_string_pretty(&packed)?);
    Ok(())
}
