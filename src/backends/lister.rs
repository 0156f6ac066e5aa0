//! Package lister integration
//!
//! Runs the external listing command (`nix-env -qaP * --description` by
//! default) and captures its whole stdout as the new cache content.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::core::model::SearchError;

/// Default lister command line
pub const DEFAULT_LISTER: &str = "nix-env -qaP * --description";

/// Default lister timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Source of the raw package listing
pub trait PackageLister {
    /// Short human-readable name used in messages
    fn describe(&self) -> String;

    /// Produce the full listing text
    fn list(&self) -> Result<String, SearchError>;
}

/// A lister backed by a subprocess
#[derive(Debug, Clone)]
pub struct CommandLister {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandLister {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    /// Build from a whitespace-separated command line. No shell is involved,
    /// so `*` reaches the program verbatim.
    pub fn from_command_line(command_line: &str, timeout: Duration) -> Result<Self, SearchError> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or_else(|| SearchError::ListerExecution {
            command: command_line.to_string(),
            reason: "empty lister command".to_string(),
        })?;
        Ok(Self::new(program, parts, timeout))
    }

    fn execution_error(&self, reason: impl Into<String>) -> SearchError {
        SearchError::ListerExecution {
            command: self.describe(),
            reason: reason.into(),
        }
    }
}

impl PackageLister for CommandLister {
    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn list(&self) -> Result<String, SearchError> {
        debug!(
            command = %self.describe(),
            timeout_secs = self.timeout.as_secs(),
            "running lister"
        );
        let start = Instant::now();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    self.execution_error(format!("command `{}` not found", self.program))
                } else {
                    self.execution_error(format!("failed to start: {}", e))
                }
            })?;

        // Drain both pipes on their own threads so a large listing can't block the child.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        warn!(command = %self.describe(), "lister timed out, killing it");
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(SearchError::ListerTimeout {
                            command: self.describe(),
                            seconds: self.timeout.as_secs(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let reason = format!("failed to wait for process: {}", e);
                    return Err(self.execution_error(reason));
                }
            }
        };

        let stdout = collect(stdout).map_err(|e| self.execution_error(e))?;
        let stderr = collect(stderr).map_err(|e| self.execution_error(e))?;

        debug!(
            status = %status,
            bytes = stdout.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "lister finished"
        );

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            let stderr = stderr.trim();
            let reason = if stderr.is_empty() {
                format!("exited with {}", status)
            } else {
                format!("exited with {}: {}", status, stderr)
            };
            return Err(self.execution_error(reason));
        }

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

type Drain = thread::JoinHandle<std::io::Result<Vec<u8>>>;

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Drain {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<Drain>) -> Result<Vec<u8>, String> {
    match handle {
        None => Ok(Vec::new()),
        Some(handle) => handle
            .join()
            .map_err(|_| "output reader thread panicked".to_string())?
            .map_err(|e| format!("failed to read output: {}", e)),
    }
}
