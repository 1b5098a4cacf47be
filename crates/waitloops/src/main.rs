use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use waitloops_core::{Constraint, Mode, Policy, PolicyOption};
use waitloops_logging::{LogEvent, LogFormat, Logger};

mod command;
mod config;
mod outcome;

use command::CommandProbe;
use config::WaitConfig;
use outcome::WaitOutcome;

#[derive(Parser, Debug)]
#[command(
    name = "waitloops",
    about = "Poll a command until it succeeds, or check that it keeps succeeding",
    version,
    author
)]
struct Cli {
    /// Success semantics (default: initial)
    #[arg(short, long, value_enum)]
    mode: Option<ModeChoice>,

    /// Give up after this long, e.g. 500ms, 3s, 1m (default: 3s)
    #[arg(short, long, value_parser = parse_duration, conflicts_with = "attempts")]
    timeout: Option<Duration>,

    /// Give up after this many attempts instead of a timeout
    #[arg(short = 'n', long)]
    attempts: Option<u32>,

    /// Pause between attempts (default: 250ms)
    #[arg(short, long, value_parser = parse_duration)]
    gap: Option<Duration>,

    /// Run the command line through a shell, e.g. "sh -c"
    #[arg(long)]
    shell: Option<String>,

    /// Working directory (default: current directory)
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// Config file (default: ./waitloops.toml, then the user config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormatChoice>,

    /// Also append JSON events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Show debug tracing
    #[arg(short, long)]
    verbose: bool,

    /// Output final result as JSON
    #[arg(long)]
    json_output: bool,

    /// Dry run: show the resolved settings without running the command
    #[arg(long)]
    dry_run: bool,

    /// Command to probe
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeChoice {
    Initial,
    Continual,
}

impl From<ModeChoice> for Mode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Initial => Mode::InitialSuccess,
            ModeChoice::Continual => Mode::ContinualSuccess,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".bright_red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let working_dir = match &cli.working_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let config = load_config(cli.config.as_deref(), &working_dir)?;

    // Flags override the config file; options apply left to right
    let mode: Mode = cli.mode.map(Mode::from).or(config.mode).unwrap_or_default();
    let mut options = config.policy_options();
    if let Some(timeout) = cli.timeout {
        options.push(PolicyOption::Timeout(timeout));
    }
    if let Some(attempts) = cli.attempts {
        options.push(PolicyOption::Attempts(attempts));
    }
    if let Some(gap) = cli.gap {
        options.push(PolicyOption::Gap(gap));
    }

    let log_format: LogFormat = cli
        .log_format
        .map(LogFormat::from)
        .or(config.log_format)
        .unwrap_or_default();
    waitloops_logging::init_tracing(if cli.verbose { "debug" } else { "warn" }, log_format);

    let shell = cli.shell.as_deref().or(config.command.shell.as_deref());
    let probe = match shell {
        Some(shell) => CommandProbe::with_shell(shell, &cli.command, working_dir.clone()),
        None => CommandProbe::new(&cli.command, working_dir.clone()),
    }
    .context("No command given")?;

    let builder = match mode {
        Mode::InitialSuccess => Constraint::initial_success(),
        Mode::ContinualSuccess => Constraint::continual_success(),
    };

    if cli.dry_run {
        let constraint = builder.options(options).build();
        print_dry_run(&probe, mode, constraint.policy(), &working_dir);
        return Ok(ExitCode::SUCCESS);
    }

    let logger = Arc::new(match &cli.log_file {
        Some(path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    });
    let attempts = Arc::new(AtomicU32::new(0));

    let command_line = probe.display();
    let mut constraint = builder
        .options(options)
        .error_fn(move || probe.check())
        .on_attempt({
            let logger = logger.clone();
            let attempts = attempts.clone();
            move |attempt| {
                attempts.store(attempt.number, Ordering::SeqCst);
                logger.log(&LogEvent::attempt(attempt));
            }
        })
        .build();

    logger.log(&LogEvent::WaitStarted {
        command: command_line,
        mode,
        budget: constraint.policy().budget().to_string(),
        gap_ms: constraint.policy().gap().as_millis() as u64,
    });

    let started = Instant::now();
    let result = constraint.run();
    let outcome = WaitOutcome::from_result(
        result,
        attempts.load(Ordering::SeqCst),
        started.elapsed(),
    );

    logger.log(&match &outcome {
        WaitOutcome::Success {
            attempts,
            total_duration_secs,
        } => LogEvent::WaitSucceeded {
            attempts: *attempts,
            duration_secs: *total_duration_secs,
        },
        WaitOutcome::Failed {
            attempts,
            error,
            total_duration_secs,
            ..
        } => LogEvent::WaitFailed {
            attempts: *attempts,
            error: error.clone(),
            duration_secs: *total_duration_secs,
        },
    });

    if cli.json_output {
        let json = serde_json::to_string_pretty(&outcome)?;
        println!("{}", json);
    } else {
        print_outcome(&outcome);
    }

    Ok(ExitCode::from(outcome.exit_code()))
}

/// Project config (or `--config`) layered over the user config
fn load_config(explicit: Option<&Path>, working_dir: &Path) -> Result<WaitConfig> {
    let local = match explicit {
        Some(path) => Some(WaitConfig::load_from(path)?),
        None => WaitConfig::load(working_dir)?,
    };
    let global = WaitConfig::load_global()?.unwrap_or_default();

    Ok(match local {
        Some(local) => local.or(global),
        None => global,
    })
}

fn print_dry_run(probe: &CommandProbe, mode: Mode, policy: &Policy, working_dir: &Path) {
    println!("=== Dry Run ===");
    println!("Command: {}", probe.display());
    println!("Working dir: {}", working_dir.display());
    println!("Mode: {}", mode);
    println!("Budget: {}", policy.budget());
    println!("Gap: {:?}", policy.gap());
}

fn print_outcome(outcome: &WaitOutcome) {
    match outcome {
        WaitOutcome::Success {
            attempts,
            total_duration_secs,
        } => {
            eprintln!();
            eprintln!("{}", "=== SUCCESS ===".bright_green().bold());
            eprintln!("Attempts: {}", attempts);
            eprintln!("Duration: {:.1}s", total_duration_secs);
        }
        WaitOutcome::Failed {
            attempts,
            error,
            total_duration_secs,
            ..
        } => {
            eprintln!();
            eprintln!("{}", "=== FAILED ===".bright_red().bold());
            eprintln!("Error after {} attempt(s): {}", attempts, error);
            eprintln!("Duration: {:.1}s", total_duration_secs);
        }
    }
}
