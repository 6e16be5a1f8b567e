use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use samenmeten::config::AssociationMode;
use samenmeten::sink::{GeoJsonSink, JsonLinesSink, ListSink};
use samenmeten::{
    RecordSink, SamenMetenConfig, SensorThingsClient, TraversalOptions, TraversalPipeline,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// One line per datastream
    List,
    /// GeoJSON FeatureCollection of map markers
    Geojson,
    /// One JSON object per line
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "samenmeten", version)]
#[command(about = "Latest reading of every sensor datastream in the Samen Meten API")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL, e.g. https://api-samenmeten.rivm.nl/v1.0
    #[arg(long)]
    base_url: Option<String>,

    #[arg(short, long, value_enum, default_value = "list")]
    format: Format,

    /// Only the first Thing per Location and the first page of its Datastreams
    #[arg(long)]
    first_only: bool,

    /// Skip the per-datastream unit lookup
    #[arg(long)]
    no_units: bool,

    /// Datastreams measured at once per Thing
    #[arg(long)]
    concurrency: Option<u32>,

    /// Stop after this many Locations
    #[arg(short, long)]
    limit: Option<u32>,

    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<SamenMetenConfig> {
    let mut config = SamenMetenConfig::read_from_path(args.config.clone())?;

    if let Some(base_url) = &args.base_url {
        config.api.base_url = base_url.clone();
    }
    if args.first_only {
        config.traversal.association_mode = AssociationMode::FirstOnly;
    }
    if args.no_units {
        config.traversal.fetch_units = false;
    }
    if let Some(concurrency) = args.concurrency {
        config.traversal.concurrency = concurrency;
    }
    if args.limit.is_some() {
        config.traversal.max_locations = args.limit;
    }

    config.apply_defaults();
    config.validate()?;
    Ok(config)
}

fn sink_for(format: Format, out: io::Stdout) -> Box<dyn RecordSink> {
    let out = io::BufWriter::new(out);
    match format {
        Format::List => Box::new(ListSink::new(out)),
        Format::Geojson => Box::new(GeoJsonSink::new(out)),
        Format::Json => Box::new(JsonLinesSink::new(out)),
    }
}

async fn run(args: Args) -> Result<usize> {
    let config = load_config(&args)?;
    samenmeten::logging::init(&config.logging, args.verbose)?;

    tracing::debug!("Using API at {}", config.api.base_url);
    let client = SensorThingsClient::from_config(&config)?;
    let pipeline = TraversalPipeline::new(client, TraversalOptions::from(&config.traversal));

    let mut sink = sink_for(args.format, io::stdout());
    let summary = pipeline
        .run(sink.as_mut())
        .await
        .context("Writing records failed")?;

    Ok(summary.records)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(0) => {
            eprintln!("No sensors found.");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
