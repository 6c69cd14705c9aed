//! External command execution.
//!
//! Every VCS operation is one synchronous process: the program is started
//! directly (no shell), its stdout and stderr are captured, and the caller
//! decides whether a non-zero exit is an error via
//! [`CommandOutput::require_success`].

use crate::error::{Result, SrcpinError};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a command with a timeout is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of an external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Rendered command line, for error messages.
    pub command: String,

    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandOutput {
    /// Turn a non-zero exit into [`SrcpinError::CommandFailed`] carrying stderr.
    pub fn require_success(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(SrcpinError::CommandFailed {
                command: self.command,
                code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }

    /// Standard output with surrounding whitespace removed.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Time budget; the process is killed once it is exceeded.
    pub timeout: Option<Duration>,
}

impl CommandOptions {
    /// Options running in the given directory.
    pub fn in_dir(cwd: &Path) -> Self {
        Self {
            cwd: Some(cwd.to_path_buf()),
            ..Default::default()
        }
    }

    /// Set the time budget.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add an environment variable.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }
}

/// Render a program and its arguments as a single command line.
pub fn command_line<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(AsRef::as_ref))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Execute a program with arguments and capture its output.
///
/// Returns `Ok` for any process that ran to completion, successful or not.
/// Failing to start the program or exceeding the timeout is an error.
pub fn execute<S: AsRef<str>>(
    program: &str,
    args: &[S],
    options: &CommandOptions,
) -> Result<CommandOutput> {
    let start = Instant::now();
    let rendered = command_line(program, args);

    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(AsRef::as_ref));

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::info!("Running '{}'", rendered);

    let mut child = cmd.spawn().map_err(|e| SrcpinError::CommandFailed {
        command: rendered.clone(),
        code: None,
        stderr: e.to_string(),
    })?;

    let stdout_handle = spawn_reader(child.stdout.take());
    let stderr_handle = spawn_reader(child.stderr.take());

    let status = match options.timeout {
        Some(timeout) => wait_with_timeout(&mut child, timeout, &rendered)?,
        None => child.wait()?,
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();
    let duration = start.elapsed();

    tracing::debug!(
        "'{}' exited with {:?} after {:?}",
        rendered,
        status.code(),
        duration
    );
    if !stderr.trim().is_empty() {
        tracing::debug!("stderr: {}", stderr.trim());
    }

    Ok(CommandOutput {
        command: rendered,
        exit_code: status.code(),
        stdout,
        stderr,
        duration,
        success: status.success(),
    })
}

/// Execute a program and fail unless it exits with code 0.
pub fn run<S: AsRef<str>>(
    program: &str,
    args: &[S],
    options: &CommandOptions,
) -> Result<CommandOutput> {
    execute(program, args, options)?.require_success()
}

fn spawn_reader<R: Read + Send + 'static>(stream: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    rendered: &str,
) -> Result<std::process::ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }

        if Instant::now() >= deadline {
            tracing::warn!("'{}' exceeded {:?}, killing it", rendered, timeout);
            let _ = child.kill();
            let _ = child.wait();
            return Err(SrcpinError::CommandTimeout {
                command: rendered.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }

        thread::sleep(POLL_INTERVAL);
    }
}
