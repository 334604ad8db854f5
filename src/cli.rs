use crate::config::{Config, load_config};
use crate::data::DataView;
use crate::graph_dump::write_graph_dump;
use crate::render::{render_svg, write_output_svg};
use crate::session::{Session, UpdateOutcome};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tgr", version, about = "Render role-tagged tabular data as a node-link diagram")]
pub struct Args {
    /// Input data view (.json) or '-' for stdin. A JSON array is replayed as a
    /// stream of host updates.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Milliseconds between replayed updates
    #[arg(long = "interval", default_value_t = 400)]
    pub interval_ms: u64,

    /// Measure labels with the built-in width table instead of system fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,

    /// Log projection decisions to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if args.fast_text {
        config.fast_text_metrics = true;
    }

    let input = read_input(args.input.as_deref())?;
    let snapshots = parse_snapshots(&input)?;
    if snapshots.is_empty() {
        return Err(anyhow::anyhow!("No data views found in input"));
    }

    let mut session = Session::with_config(config.clone());
    if let [single] = snapshots.as_slice() {
        session.rebuild(single)?;
    } else {
        replay(&mut session, &snapshots, Duration::from_millis(args.interval_ms));
    }

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(session.graph(), &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_graph_dump(std::fs::File::create(path)?, session.graph(), session.projection())?,
            None => write_graph_dump(io::stdout().lock(), session.graph(), session.projection())?,
        },
        OutputFormat::Png => write_png(&args, &session, &config)?,
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(args: &Args, session: &Session, config: &Config) -> Result<()> {
    let output = args
        .output
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    let svg = render_svg(session.graph(), &config.theme, &config.render);
    crate::render::write_output_png(&svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_args: &Args, _session: &Session, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the 'png' feature"))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "tabular_graph=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Feeds snapshots through the update gate as if the host delivered one
/// every `interval`, then lets the window close on the last one.
fn replay(session: &mut Session, snapshots: &[DataView], interval: Duration) {
    let start = Instant::now();
    let mut now = start;
    for (idx, view) in snapshots.iter().enumerate() {
        now = start + interval * idx as u32;
        log_outcome(idx, session.update(Some(view), now));
    }
    if let Some(last) = snapshots.last() {
        let settle = now + session.config().projection.debounce();
        log_outcome(snapshots.len(), session.update(Some(last), settle));
    }
}

fn log_outcome(idx: usize, outcome: UpdateOutcome) {
    match outcome {
        UpdateOutcome::Rebuilt(summary) => tracing::info!(
            "update {}: rebuilt {} nodes, {} edges",
            idx,
            summary.nodes,
            summary.edges
        ),
        UpdateOutcome::Failed(err) => tracing::warn!("update {}: failed: {}", idx, err),
        other => tracing::debug!("update {}: {:?}", idx, other),
    }
}

fn parse_snapshots(input: &str) -> Result<Vec<DataView>> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    let snapshots = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<serde_json::Result<Vec<DataView>>>()?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(snapshots)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
