//! # CertCanvas CLI
//!
//! Command-line access to certificate templates stored as JSON documents.
//!
//! ## Commands
//!
//! - `new` - write an empty template
//! - `render` - export a template as SVG or as a JSON render tree
//! - `layers` - list layers, topmost first
//! - `embed-image` - add an image element or background from a local file
//! - `validate` - check a template document
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - [`run`] - Executes a command, writing results to any `io::Write`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use certcanvas_core::layers::LayersPanel;
use certcanvas_core::storage::{upload_background, upload_image};
use certcanvas_core::{DataUriUploader, EditorConfig, ElementPatch, SceneStore, TemplateDocument};
use certcanvas_renderer::{
    CanvasRenderer, JsonBackend, RenderBackend, RenderTree, RendererConfig, SvgBackend,
};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for certcanvas.
#[derive(Debug, Clone, Parser)]
#[command(name = "certcanvas")]
#[command(about = "Create, inspect and render certificate templates")]
#[command(version)]
pub struct CliArgs {
    /// Editor configuration file (JSON)
    #[arg(long, global = true, env = "CERTCANVAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(
        long,
        global = true,
        env = "CERTCANVAS_LOG_FORMAT",
        value_enum,
        default_value = "plain"
    )]
    pub log_format: LogFormat,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Plain,
    /// One JSON object per event.
    Json,
}

/// Render output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Standalone SVG document.
    Svg,
    /// Render tree as JSON.
    Json,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write an empty template
    New(NewArgs),
    /// Render a template
    Render(RenderArgs),
    /// List layers, topmost first
    Layers(LayersArgs),
    /// Embed a local image as a data URI
    EmbedImage(EmbedImageArgs),
    /// Check a template document
    Validate {
        /// Template file
        template: PathBuf,
    },
}

/// Arguments for `new`.
#[derive(Debug, Clone, Args)]
pub struct NewArgs {
    /// Destination file
    pub output: PathBuf,
    /// Canvas width (defaults to the configured width)
    #[arg(long)]
    pub width: Option<f64>,
    /// Canvas height (defaults to the configured height)
    #[arg(long)]
    pub height: Option<f64>,
    /// Background image URI
    #[arg(long)]
    pub background: Option<String>,
}

/// Arguments for `render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Template file
    pub template: PathBuf,
    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "svg")]
    pub format: OutputFormat,
    /// Zoom factor, clamped to the configured range
    #[arg(long)]
    pub zoom: Option<f64>,
    /// Draw the background grid
    #[arg(long)]
    pub grid: bool,
}

/// Arguments for `layers`.
#[derive(Debug, Clone, Args)]
pub struct LayersArgs {
    /// Template file
    pub template: PathBuf,
    /// Print rows as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `embed-image`.
#[derive(Debug, Clone, Args)]
pub struct EmbedImageArgs {
    /// Template file, updated in place unless --output is given
    pub template: PathBuf,
    /// Image file (png, jpg, gif, webp, svg, bmp)
    pub image: PathBuf,
    /// Write the result here instead
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Use the image as the background
    #[arg(long)]
    pub background: bool,
    /// Left edge of the new element
    #[arg(long)]
    pub x: Option<f64>,
    /// Top edge of the new element
    #[arg(long)]
    pub y: Option<f64>,
    /// Width of the new element
    #[arg(long)]
    pub width: Option<f64>,
    /// Height of the new element
    #[arg(long)]
    pub height: Option<f64>,
    /// Reject files larger than this many bytes
    #[arg(long, env = "CERTCANVAS_MAX_UPLOAD_BYTES")]
    pub max_bytes: Option<usize>,
}

/// Run a command, writing its output to `out`.
///
/// # Errors
///
/// Returns an error if configuration, template I/O, validation, upload or
/// rendering fails.
pub fn run(args: CliArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::New(new) => create_template(new, config, out),
        Command::Render(render) => render_template(render, config, out),
        Command::Layers(layers) => list_layers(&layers, config, out),
        Command::EmbedImage(embed) => embed_image(embed, config, out),
        Command::Validate { template } => {
            let store = read_template(&template, config)?;
            writeln!(
                out,
                "ok: {} elements, {}x{}",
                store.scene().element_count(),
                store.scene().canvas_width(),
                store.scene().canvas_height()
            )?;
            Ok(())
        }
    }
}

fn create_template(args: NewArgs, config: EditorConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let config = EditorConfig {
        canvas_width: args.width.unwrap_or(config.canvas_width),
        canvas_height: args.height.unwrap_or(config.canvas_height),
        ..config
    };
    config.validate().context("Invalid canvas size")?;

    let mut store = SceneStore::new(config);
    store.set_background(args.background);
    write_template(&args.output, &store)?;
    tracing::info!("Created template {}", args.output.display());
    writeln!(out, "{}", args.output.display())?;
    Ok(())
}

fn render_template(
    args: RenderArgs,
    config: EditorConfig,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut store = read_template(&args.template, config)?;
    if let Some(zoom) = args.zoom {
        store.set_zoom(zoom);
    }
    let renderer = CanvasRenderer::new(RendererConfig {
        show_grid: args.grid,
        ..RendererConfig::default()
    });
    let tree = renderer.render_store(&store);

    let rendered = match args.format {
        OutputFormat::Svg => render_with(SvgBackend::new(), &tree)?,
        OutputFormat::Json => render_with(JsonBackend::pretty(), &tree)?,
    };

    if let Some(path) = args.output {
        fs::write(&path, rendered).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Rendered {} to {}", args.template.display(), path.display());
    } else {
        writeln!(out, "{rendered}")?;
    }
    Ok(())
}

fn list_layers(args: &LayersArgs, config: EditorConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let mut store = read_template(&args.template, config)?;
    let rows = LayersPanel::new(&mut store).rows();
    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }

    for row in rows {
        let mut flags = String::new();
        if !row.visible {
            flags.push_str(" hidden");
        }
        if row.locked {
            flags.push_str(" locked");
        }
        let icon = format!("{:?}", row.icon);
        writeln!(
            out,
            "{:>4}  {icon:<8} {}{flags}  [{}]",
            row.z_index, row.label, row.id
        )?;
    }
    Ok(())
}

fn embed_image(
    args: EmbedImageArgs,
    config: EditorConfig,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut store = read_template(&args.template, config)?;
    let bytes = fs::read(&args.image)
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    let file_name = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let uploader = DataUriUploader {
        max_bytes: args.max_bytes,
    };

    if args.background {
        upload_background(&mut store, &uploader, &file_name, &bytes)?;
        writeln!(out, "background")?;
    } else {
        let id = upload_image(&mut store, &uploader, &file_name, &bytes)?;
        let patch = ElementPatch {
            x: args.x,
            y: args.y,
            width: args.width,
            height: args.height,
            ..ElementPatch::default()
        };
        if !patch.is_empty() {
            store.update_element(&id, &patch);
        }
        writeln!(out, "{id}")?;
    }

    let destination = args.output.unwrap_or(args.template);
    write_template(&destination, &store)?;
    tracing::info!("Embedded {} into {}", args.image.display(), destination.display());
    Ok(())
}

/// Load the editor configuration, or the defaults when no file is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(EditorConfig::default()),
    }
}

/// Read and validate a template file into a store.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid template.
pub fn read_template(path: &Path, config: EditorConfig) -> anyhow::Result<SceneStore> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    let document = TemplateDocument::from_json(&json)
        .with_context(|| format!("Failed to parse template {}", path.display()))?;
    SceneStore::from_document(document, config)
        .with_context(|| format!("Invalid template {}", path.display()))
}

/// Write a store's document as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_template(path: &Path, store: &SceneStore) -> anyhow::Result<()> {
    let json = store.document().to_json_pretty()?;
    fs::write(path, json).with_context(|| format!("Failed to write template {}", path.display()))
}

fn render_with(
    mut backend: impl RenderBackend,
    tree: &RenderTree,
) -> anyhow::Result<String> {
    backend
        .render(tree)
        .with_context(|| format!("{:?} render failed", backend.backend_type()))?;
    Ok(backend.output().to_string())
}
