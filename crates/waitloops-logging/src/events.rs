use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use waitloops_core::{Attempt, AttemptStatus, Mode};

/// Structured log events for a wait
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    WaitStarted {
        command: String,
        mode: Mode,
        budget: String,
        gap_ms: u64,
    },
    AttemptObserved {
        attempt: u32,
        elapsed_ms: u64,
        #[serde(flatten)]
        status: AttemptStatus,
    },
    WaitSucceeded {
        attempts: u32,
        duration_secs: f64,
    },
    WaitFailed {
        attempts: u32,
        error: String,
        duration_secs: f64,
    },
}

impl LogEvent {
    pub fn attempt(attempt: &Attempt) -> Self {
        Self::AttemptObserved {
            attempt: attempt.number,
            elapsed_ms: attempt.elapsed.as_millis() as u64,
            status: attempt.status.clone(),
        }
    }

    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for wait events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn log(&self, event: &LogEvent) {
        // file output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        let line = match self.format {
            LogFormat::Json => serde_json::to_string(event).ok(),
            LogFormat::Pretty => Self::render_pretty(event),
            LogFormat::Compact => Some(Self::render_compact(
                event,
                &chrono::Utc::now().format("%H:%M:%S").to_string(),
            )),
        };

        if let Some(line) = line {
            let _ = writeln!(std::io::stderr(), "{}", line);
        }
    }

    fn render_pretty(event: &LogEvent) -> Option<String> {
        let line = match event {
            LogEvent::WaitStarted {
                command,
                mode,
                budget,
                gap_ms,
            } => format!(
                "{} {}\n  {} {}, {}, gap {}ms",
                "▶".bright_blue(),
                command.bold(),
                "Waiting:".dimmed(),
                mode,
                budget,
                gap_ms
            ),
            LogEvent::AttemptObserved {
                attempt,
                elapsed_ms,
                status,
            } => {
                let marker = match status {
                    AttemptStatus::Satisfied => "✓".bright_green(),
                    AttemptStatus::Unsatisfied => "·".bright_yellow(),
                    AttemptStatus::Failed(_) => "✗".bright_red(),
                };
                let detail = match status {
                    AttemptStatus::Failed(error) => format!(" {}", Self::first_line(error)),
                    _ => String::new(),
                };
                format!(
                    "    {} attempt {} ({:.1}s){}",
                    marker,
                    attempt,
                    *elapsed_ms as f64 / 1000.0,
                    detail.dimmed()
                )
            }
            // the final outcome is printed by the binary
            LogEvent::WaitSucceeded { .. } | LogEvent::WaitFailed { .. } => return None,
        };
        Some(line)
    }

    fn render_compact(event: &LogEvent, timestamp: &str) -> String {
        match event {
            LogEvent::WaitStarted { mode, budget, .. } => {
                format!("[{}] wait:start {} {}", timestamp, mode, budget)
            }
            LogEvent::AttemptObserved {
                attempt, status, ..
            } => match status {
                AttemptStatus::Satisfied => format!("[{}] attempt:{} ok", timestamp, attempt),
                AttemptStatus::Unsatisfied => {
                    format!("[{}] attempt:{} unsatisfied", timestamp, attempt)
                }
                AttemptStatus::Failed(error) => format!(
                    "[{}] attempt:{} failed {}",
                    timestamp,
                    attempt,
                    Self::first_line(error)
                ),
            },
            LogEvent::WaitSucceeded {
                attempts,
                duration_secs,
            } => format!(
                "[{}] wait:done:{} {:.1}s",
                timestamp, attempts, duration_secs
            ),
            LogEvent::WaitFailed {
                attempts,
                error,
                duration_secs,
            } => format!(
                "[{}] wait:fail:{} {:.1}s {}",
                timestamp,
                attempts,
                duration_secs,
                Self::first_line(error)
            ),
        }
    }

    fn first_line(s: &str) -> &str {
        s.lines().next().unwrap_or_default()
    }
}
