use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use thiserror::Error;
use tracing::debug;

/// Why a probed command did not succeed
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to spawn `{program}`: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", exit_message(.code, .stderr))]
    Exited { code: Option<i32>, stderr: String },
}

fn exit_message(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    };
    match stderr.lines().last() {
        Some(line) => format!("{}: {}", status, line),
        None => status,
    }
}

/// An external command used as a wait probe. Success is a zero exit status.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandProbe {
    /// Run `command` directly: the first word is the program.
    pub fn new(command: &[String], working_dir: PathBuf) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            working_dir,
        })
    }

    /// Run `command` joined into one line through `shell`, e.g. `"sh -c"`.
    pub fn with_shell(shell: &str, command: &[String], working_dir: PathBuf) -> Option<Self> {
        if command.is_empty() {
            return None;
        }
        let mut words: Vec<String> = shell.split_whitespace().map(str::to_string).collect();
        words.push(command.join(" "));
        Self::new(&words, working_dir)
    }

    /// The command line as it would be typed
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command once, discarding stdout.
    pub fn check(&self) -> Result<(), CommandError> {
        let start = Instant::now();

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| CommandError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        debug!(
            program = %self.program,
            exit_code = output.status.code().unwrap_or(-1),
            duration_ms = start.elapsed().as_millis() as u64,
            "Probe command completed"
        );

        if output.status.success() {
            Ok(())
        } else {
            Err(CommandError::Exited {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
