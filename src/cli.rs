use crate::ast::{Ast, DEFAULT_MAX_NESTING, NodeId, parse_json, release_json};
use crate::config::load_config;
use crate::layout::layout_graph;
use crate::layout_dump::write_layout_dump;
use crate::panel::ViewMode;
use crate::render::write_output_svg;
use crate::tokens::{Token, parse_tokens};
use crate::{RenderOptions, render_ast, render_panel_page};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "astx", version, about = "Render a parsed AST as a tree outline or bubble graph")]
pub struct Args {
    /// AST JSON file or '-' for stdin. A `{"ast": .., "tokens": [..]}` bundle is accepted too.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Token list JSON file
    #[arg(short = 't', long = "tokens")]
    pub tokens: Option<PathBuf>,

    /// Output file (svg/png/html). Defaults to stdout for SVG and HTML.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Visualization to render
    #[arg(long = "view", value_enum, default_value = "tree")]
    pub view: ViewArg,

    /// Highlight the node with this id
    #[arg(short = 's', long = "select")]
    pub select: Option<String>,

    /// Config JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Write the bubble layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// PNG width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// PNG height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Increase log verbosity (-v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Html,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ViewArg {
    Tree,
    Bubble,
}

impl From<ViewArg> for ViewMode {
    fn from(value: ViewArg) -> Self {
        match value {
            ViewArg::Tree => ViewMode::Tree,
            ViewArg::Bubble => ViewMode::Bubble,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let raw = read_input(args.input.as_deref())?;
    let (ast_value, bundled_tokens) =
        split_bundle(parse_json(&raw, DEFAULT_MAX_NESTING).context("input is not a loadable AST")?);
    let ast = Arc::new(Ast::from_value(&ast_value)?);
    release_json(ast_value);
    log::info!("loaded AST with {} nodes", ast.len());

    let tokens = load_tokens(args.tokens.as_deref(), bundled_tokens)?;

    if let Some(path) = args.dump_layout.as_deref() {
        let layout = layout_graph(&ast, &config.layout)?;
        write_layout_dump(path, &layout)?;
        log::info!("wrote layout dump to {}", path.display());
    }

    let options = RenderOptions {
        config,
        view: args.view.into(),
        selected: args.select.as_deref().map(parse_node_id),
    };

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_ast(&ast, &options)?;
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Html => {
            let html = render_panel_page(&ast, &tokens, &options)?;
            write_output_svg(&html, args.output.as_deref())?;
        }
        OutputFormat::Png => write_png(&ast, &options, &args.output)?,
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(ast: &Ast, options: &RenderOptions, output: &Option<PathBuf>) -> Result<()> {
    let output = ensure_output(output, "png")?;
    let svg = render_ast(ast, options)?;
    crate::render::write_output_png(&svg, &output, &options.config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_ast: &Ast, _options: &RenderOptions, _output: &Option<PathBuf>) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn parse_node_id(raw: &str) -> NodeId {
    match raw.parse() {
        Ok(id) => id,
        Err(never) => match never {},
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Parser responses often carry the AST and its tokens side by side.
fn split_bundle(value: Value) -> (Value, Option<Value>) {
    match value {
        Value::Object(mut obj) if obj.contains_key("ast") => {
            let tokens = obj.remove("tokens");
            let ast = obj.remove("ast").unwrap_or(Value::Null);
            (ast, tokens)
        }
        other => (other, None),
    }
}

fn load_tokens(path: Option<&Path>, bundled: Option<Value>) -> Result<Vec<Token>> {
    if let Some(path) = path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(parse_tokens(&raw)?);
    }
    match bundled {
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(value) => Ok(parse_tokens(&value.to_string())?),
    }
}

#[cfg(feature = "png")]
fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
