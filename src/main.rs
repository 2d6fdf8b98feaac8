use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dtp_trace::error::{Result, TraceError};
use dtp_trace::generator::generate_from_file;
use dtp_trace::models::{BctUnit, IdScheme, ResultRow};
use dtp_trace::output::{self, PlottersConfig};
use dtp_trace::parsers::{
    aggregate_events, client_log_path, parse_client_log, parse_trace, read_results,
    read_server_log, ReadOutcome,
};
use dtp_trace::processors::{
    bct_histogram, find_unsent_in_files, intime_series, join, qoe_score, summarize_by_class,
    total_time,
};
use dtp_trace::realtime::{IntimeView, LiveDashboard, PlaybackClock, ServerView, TunnelView};
use dtp_trace::utils::{parse_classes, AnalysisConfig, Logger};
use dtp_trace::{log, log_error, log_warn};

#[derive(Parser, Debug)]
#[command(name = "dtp-trace", version, about = "Analysis toolkit for deadline-aware transport runs")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON analysis config; flags below override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write log lines (timestamped) to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Priority classes to report, e.g. 1,2
    #[arg(long, global = true)]
    classes: Option<String>,

    /// Unit of the bct column: us or ms
    #[arg(long, global = true)]
    bct_unit: Option<BctUnit>,

    /// Formula used to decode result ids: stream or log
    #[arg(long, global = true)]
    id_scheme: Option<IdScheme>,

    /// In-time ratio shown for a class without blocks
    #[arg(long, global = true)]
    default_ratio: Option<f64>,

    /// Live refresh period / playback step in ms
    #[arg(long, global = true)]
    tick_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List trace blocks missing from a result file
    #[command(name = "find_unsend")]
    FindUnsend {
        #[arg(short, long)]
        result: PathBuf,
        #[arg(short, long)]
        trace: Option<PathBuf>,
    },
    /// Completion count and time span of a run
    #[command(name = "total_time")]
    TotalTime {
        #[arg(short, long)]
        result: PathBuf,
    },
    /// In-time ratio chart and per-class table
    Draw {
        #[arg(short, long)]
        result: PathBuf,
        #[arg(short, long)]
        trace: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "In-time ratio")]
        title: String,
    },
    /// BCT histogram per class
    Hist {
        #[arg(short, long)]
        result: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "Block completion time")]
        title: String,
    },
    /// Live in-time ratio of a running (or, with --playback, finished) experiment
    Live {
        #[arg(short, long)]
        result: PathBuf,
        #[arg(short, long)]
        trace: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "In-time ratio")]
        title: String,
        #[arg(long)]
        playback: bool,
    },
    /// Live block status breakdown from the transport log
    #[command(name = "live_server")]
    LiveServer {
        /// Raw transport log, or the `.csv` written by log2csv
        #[arg(short = 's', long)]
        server_log: PathBuf,
        #[arg(short, long)]
        trace: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "Block status")]
        title: String,
        #[arg(long)]
        playback: bool,
    },
    /// Live RTT / loss / FEC view of a tunnel log
    Tunnel {
        log: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "Tunnel")]
        title: String,
    },
    /// Normalize a transport log into block_id,start,complete,cancelled,cancelled_passed
    #[command(name = "log2csv")]
    LogToCsv {
        log: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert client.log (file or run directory) into blocks.csv and stats.csv
    #[command(name = "client_log")]
    ClientLog {
        log: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate trace files from JSON configs
    #[command(name = "gen_trace")]
    GenTrace {
        #[arg(required = true)]
        configs: Vec<PathBuf>,
    },
}

fn load_config(common: &CommonArgs) -> Result<AnalysisConfig> {
    let mut config = match &common.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(classes) = &common.classes {
        config.classes = parse_classes(classes).map_err(TraceError::Config)?;
    }
    if let Some(unit) = common.bct_unit {
        config.bct_unit = unit;
    }
    if let Some(scheme) = common.id_scheme {
        config.result_id_scheme = scheme;
    }
    if let Some(ratio) = common.default_ratio {
        config.default_ratio = ratio;
    }
    if let Some(tick) = common.tick_ms {
        config.tick_ms = tick;
    }
    config.validate().map_err(TraceError::Config)?;
    Ok(config)
}

fn require_trace(trace: Option<&Path>) -> Result<&Path> {
    trace.ok_or(TraceError::MissingArgument("trace file (-t/--trace)"))
}

/// `<dir>/<stem><suffix>.png` next to `path`.
fn sibling_png(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!("{stem}{suffix}.png"))
}

fn load_results(path: &Path, config: &AnalysisConfig) -> Vec<ResultRow> {
    let outcome = read_results(path, config.result_id_scheme);
    if !outcome.is_ready() {
        log_warn!("{}: {}", path.display(), outcome.describe());
    }
    outcome.into_table()
}

async fn run(command: Command, config: AnalysisConfig) -> Result<()> {
    let plot_config = PlottersConfig::from_analysis(&config);

    match command {
        Command::FindUnsend { result, trace } => {
            let unsent = find_unsent_in_files(&result, trace.as_deref(), config.result_id_scheme)?;
            output::print_unsent(&unsent);
        }
        Command::TotalTime { result } => {
            let rows = load_results(&result, &config);
            output::print_total_time(total_time(&rows).as_ref());
        }
        Command::Draw {
            result,
            trace,
            output: chart,
            title,
        } => {
            let trace = parse_trace(require_trace(trace.as_deref())?)?;
            let rows = load_results(&result, &config);
            let joined = join(&trace, &rows, config.bct_unit);
            let series = intime_series(&joined, &config.classes, config.default_ratio);

            let chart = chart.unwrap_or_else(|| sibling_png(&result, ""));
            output::save_intime_chart(&series, &title, &chart, &plot_config)?;
            log!("in-time chart saved to {}", chart.display());

            let summaries = summarize_by_class(&joined, &config.classes);
            output::print_class_summary(&summaries, &qoe_score(&joined), config.default_ratio);
        }
        Command::Hist {
            result,
            output: chart,
            title,
        } => {
            let rows = load_results(&result, &config);
            let hist = bct_histogram(&rows, config.bct_unit, config.hist_bucket_ms, &config.classes);
            output::print_histogram(&hist);

            let chart = chart.unwrap_or_else(|| sibling_png(&result, "_hist"));
            output::save_histogram_chart(&hist, &title, &chart, &plot_config)?;
            log!("histogram saved to {}", chart.display());
        }
        Command::Live {
            result,
            trace,
            output: chart,
            title,
            playback,
        } => {
            let trace = parse_trace(require_trace(trace.as_deref())?)?;
            let clock = PlaybackClock::new(config.tick_ms, playback);
            let view = IntimeView::new(title, trace, result, config, chart);
            LiveDashboard::new(view, clock).run().await?;
        }
        Command::LiveServer {
            server_log,
            trace,
            output: chart,
            title,
            playback,
        } => {
            let trace = parse_trace(require_trace(trace.as_deref())?)?;
            let clock = PlaybackClock::new(config.tick_ms, playback);
            let view = ServerView::new(title, trace, server_log, &config, chart);
            LiveDashboard::new(view, clock).run().await?;
        }
        Command::Tunnel {
            log: log_path,
            output: chart,
            title,
        } => {
            let view = TunnelView::new(title, log_path, &config, chart);
            LiveDashboard::new(view, PlaybackClock::live(config.tick_ms)).run().await?;
        }
        Command::LogToCsv { log: log_path, output: csv_path } => {
            let events = match read_server_log(&log_path) {
                ReadOutcome::Ready(events) => events,
                ReadOutcome::NotYetAvailable => {
                    return Err(TraceError::io(&log_path, io::Error::from(io::ErrorKind::NotFound)));
                }
                ReadOutcome::Malformed(reason) => {
                    return Err(TraceError::format(log_path.display().to_string(), 0, reason));
                }
            };
            let records = aggregate_events(&events);
            let csv_path = csv_path.unwrap_or_else(|| output::server_log_csv_path(&log_path));
            output::save_server_log_csv(&records, &csv_path)?;
            log!(
                "{} events, {} blocks written to {}",
                events.len(),
                records.len(),
                csv_path.display()
            );
        }
        Command::ClientLog { log: log_path, output: out_dir } => {
            let client = parse_client_log(&log_path)?;
            let out_dir = match out_dir {
                Some(dir) => dir,
                None => client_log_path(&log_path)
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default(),
            };
            if !out_dir.as_os_str().is_empty() {
                std::fs::create_dir_all(&out_dir).map_err(|e| TraceError::io(&out_dir, e))?;
            }
            output::save_client_blocks_csv(&client.blocks, &out_dir.join("blocks.csv"))?;
            output::save_client_stats_csv(&client.stats, &out_dir.join("stats.csv"))?;
            log!(
                "{} blocks converted, csv files written to {}",
                client.blocks.len(),
                out_dir.display()
            );
        }
        Command::GenTrace { configs } => {
            for config_path in &configs {
                generate_from_file(config_path)?;
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(path) = &cli.common.log_file {
        if let Err(e) = Logger::init(path) {
            eprintln!("cannot open log file {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    let result = match load_config(&cli.common) {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error!("{}", e);
            ExitCode::FAILURE
        }
    };
    let _ = Logger::flush();
    code
}
