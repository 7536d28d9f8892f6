use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use wifitrack::{
    config::{self, Config},
    ingest, map,
    model::{TrackPoint, Trajectory},
    parser::LogParser,
    points,
    reduce::{self, ReducerKind},
};

#[derive(Debug, Parser)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write here instead of stdout.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// WiFi log CSVs (or directories of them) to track points.
    Parse {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Reduce a track-point CSV per account.
    Reduce {
        input: PathBuf,
        #[arg(long)]
        reducer: Option<ReducerKind>,
    },
    /// Parse and reduce in one go.
    Run {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        reducer: Option<ReducerKind>,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
    /// One line per account: first and last time, point count.
    Summary { input: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Geojson,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => config::load(path)?,
        None if Path::new("config.toml").exists() => config::load(Path::new("config.toml"))?,
        None => Config::default(),
    };
    let options = config.parse.options()?;
    let mut out = output(cli.output.as_deref())?;

    match cli.command {
        Command::Parse { inputs } => {
            let table = config.ap_table()?;
            let parser = LogParser::new(&table, options);
            let report = ingest::parse_inputs(&parser, &inputs)?;
            points::write_points(&mut out, &report.points)?;
        }

        Command::Reduce { input, reducer } => {
            let loaded = points::load(&input, options.offset)?;
            let reduced = reduce_points(loaded, reducer.unwrap_or(config.reducer), &config);
            points::write_points(&mut out, reduced.iter().flat_map(|t| &t.points))?;
        }

        Command::Run {
            inputs,
            reducer,
            format,
        } => {
            let table = config.ap_table()?;
            let parser = LogParser::new(&table, options);
            let report = ingest::parse_inputs(&parser, &inputs)?;
            let reduced = reduce_points(report.points, reducer.unwrap_or(config.reducer), &config);
            match format {
                Format::Csv => {
                    points::write_points(&mut out, reduced.iter().flat_map(|t| &t.points))?
                }
                Format::Geojson => map::write_geojson(&mut out, &reduced)?,
            }
        }

        Command::Summary { input } => {
            let loaded = points::load(&input, options.offset)?;
            for trajectory in reduce::group_by_account(loaded) {
                if let Some(s) = trajectory.summary() {
                    writeln!(
                        out,
                        "{}\t{}\t{}\t{}",
                        s.account_id,
                        s.start.to_rfc3339(),
                        s.end.to_rfc3339(),
                        s.total_points
                    )?;
                }
            }
        }
    };

    out.flush()?;
    Ok(())
}

fn reduce_points(points: Vec<TrackPoint>, kind: ReducerKind, config: &Config) -> Vec<Trajectory> {
    let reducer = kind.build(config.simplify);
    let trajectories = reduce::group_by_account(points);
    info!(
        accounts = trajectories.len(),
        reducer = reducer.name(),
        "reducing"
    );

    let mut output = Vec::with_capacity(trajectories.len());
    for (trajectory, stats) in reduce::reduce_all(&trajectories, reducer.as_ref()) {
        info!("{stats}");
        output.push(trajectory);
    }
    output
}

fn output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}
