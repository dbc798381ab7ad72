use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "revealplay", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scenario and write the per-frame trace as JSON.
    Simulate(SimulateArgs),
    /// Parse and validate a scenario without running it.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input scenario JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame rate numerator (frames per second).
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Output trace JSON path. Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input scenario JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_scenario_json(path: &Path) -> anyhow::Result<revealplay::Scenario> {
    let f = File::open(path).with_context(|| format!("open scenario '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scenario: revealplay::Scenario =
        serde_json::from_reader(r).with_context(|| "parse scenario JSON")?;
    Ok(scenario)
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let scenario = read_scenario_json(&args.in_path)?;
    let fps = revealplay::Fps::new(args.fps, 1)?;
    let trace = revealplay::simulate(&scenario, fps)?;

    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = File::create(out)
                .with_context(|| format!("create trace '{}'", out.display()))?;
            let mut w = BufWriter::new(f);
            serde_json::to_writer_pretty(&mut w, &trace)
                .with_context(|| format!("write trace '{}'", out.display()))?;
            w.flush()?;
            eprintln!(
                "wrote {} ({} frames, {} playback attempts)",
                out.display(),
                trace.frames.len(),
                trace.attempts.len()
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut w = BufWriter::new(stdout.lock());
            serde_json::to_writer_pretty(&mut w, &trace).with_context(|| "write trace")?;
            writeln!(w)?;
            w.flush()?;
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let scenario = read_scenario_json(&args.in_path)?;
    scenario
        .validate()
        .with_context(|| format!("invalid scenario '{}'", args.in_path.display()))?;
    eprintln!(
        "ok: {} events over {}ms",
        scenario.events.len(),
        scenario.duration_ms
    );
    Ok(())
}
