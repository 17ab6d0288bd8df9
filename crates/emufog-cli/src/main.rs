//! Command-line front end for the emufog planning pipeline.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use emufog_core::{run, Graph};
use log::{error, info};

mod config_file;

/// Plans a fog-computing deployment from a router/AS topology and a placement config.
#[derive(Debug, Parser)]
#[command(name = "emufog", version, about)]
struct Args {
    /// Path to the YAML pipeline configuration.
    #[arg(short, long)]
    config: PathBuf,

    /// Topology format to parse `--file` as.
    #[arg(short = 't', long = "type", value_enum)]
    input_type: InputType,

    /// Where to write the generated deployment script.
    #[arg(short, long)]
    output: PathBuf,

    /// Topology input path: a BRITE file, or the shared base path of a CAIDA file set (the
    /// reader appends `.nodes.geo`/`.nodes.as`/`.links` itself — pass the common prefix, not
    /// each file individually).
    #[arg(short, long = "file")]
    file: PathBuf,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum InputType {
    Brite,
    Caida,
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_GRAPH_ERROR: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_INPUT_ERROR: u8 = 3;
const EXIT_PLACEMENT_FAILURE: u8 = 4;

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let config = match config_file::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let mut graph = match read_topology(&args) {
        Ok(g) => g,
        Err(code) => return ExitCode::from(code),
    };

    let report = match run(&mut graph, &config) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(EXIT_GRAPH_ERROR);
        }
    };

    let rows = emufog_export::build_rows(&graph, &report.placements);
    if let Err(e) = emufog_export::write(&args.output, &rows) {
        error!("{e}");
        return ExitCode::from(EXIT_GRAPH_ERROR);
    }

    if report.success {
        info!("placed {} fog node(s)", report.placements.len());
        ExitCode::from(EXIT_SUCCESS)
    } else {
        error!("fog placer exhausted its node budget before covering every starting node");
        ExitCode::from(EXIT_PLACEMENT_FAILURE)
    }
}

fn read_topology(args: &Args) -> Result<Graph, u8> {
    match args.input_type {
        InputType::Brite => {
            let path = &args.file;
            let (raw, stats) = emufog_readers::brite::read(path).map_err(|e| {
                error!("{e}");
                EXIT_INPUT_ERROR
            })?;
            emufog_readers::brite::log_stats(path, &stats);
            raw.into_graph().map_err(|e| {
                error!("{e}");
                EXIT_GRAPH_ERROR
            })
        }
        InputType::Caida => {
            let base = &args.file;
            let (raw, stats) = emufog_readers::caida::read(base, &emufog_readers::caida::FlatLatency).map_err(|e| {
                error!("{e}");
                EXIT_INPUT_ERROR
            })?;
            if stats.total_skipped() > 0 {
                log::warn!("{}: skipped {} record(s) while parsing", base.display(), stats.total_skipped());
            }
            raw.into_graph().map_err(|e| {
                error!("{e}");
                EXIT_GRAPH_ERROR
            })
        }
    }
}
