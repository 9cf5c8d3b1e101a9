//! Fetching raw chapters from the external converter.
//!
//! [`Fetcher`] is the seam between the downloader and the outside world. The
//! production implementation, [`Converter`], runs a command-line program and
//! captures its standard output. [`RateLimited`] wraps any fetcher and spaces
//! calls out by a fixed cooldown.

use std::{
    io::{self, Read},
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, instrument, trace};

use crate::domain::{RunConfig, Section};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A source of raw chapter text.
pub trait Fetcher {
    /// Fetches the raw markdown for one chapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the chapter could not be retrieved or came back
    /// empty.
    fn fetch(&mut self, section: &Section, chapter: usize) -> Result<String, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &mut F {
    fn fetch(&mut self, section: &Section, chapter: usize) -> Result<String, FetchError> {
        (**self).fetch(section, chapter)
    }
}

/// Runs the external converter once per chapter.
///
/// The command line is
/// `<program> <leading args> <exclusion flags> -l -v <VERSION> <Book_Name>.<chapter>`.
#[derive(Debug, Clone)]
pub struct Converter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Converter {
    /// Builds the converter invocation from the run configuration.
    #[must_use]
    pub fn new(config: &RunConfig) -> Self {
        let converter = config.converter();
        let mut args = converter.tail.clone();
        args.extend(
            config
                .exclusions()
                .converter_flags()
                .into_iter()
                .map(str::to_string),
        );
        args.push("-l".to_string());
        args.push("-v".to_string());
        args.push(config.version().as_str().to_string());

        Self {
            program: converter.head.clone(),
            args,
            timeout: config.timeout(),
        }
    }

    /// The positional argument naming a chapter, e.g. `Song_of_Solomon.2`.
    #[must_use]
    pub fn reference(section: &Section, chapter: usize) -> String {
        format!("{}.{chapter}", section.name().replace(' ', "_"))
    }

    /// The full command for one chapter.
    #[must_use]
    pub fn command(&self, section: &Section, chapter: usize) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(Self::reference(section, chapter))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Fetcher for Converter {
    #[instrument(level = "debug", skip(self, section), fields(book = section.name()))]
    fn fetch(&mut self, section: &Section, chapter: usize) -> Result<String, FetchError> {
        let mut command = self.command(section, chapter);
        debug!(?command, "running converter");

        let mut child = command.spawn().map_err(|source| FetchError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        let deadline = Instant::now() + self.timeout;
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let Some(status) = wait_with_deadline(&mut child, deadline)? else {
            return Err(FetchError::Timeout(self.timeout));
        };
        // anything the converter spawned may still hold the pipes open
        let stdout = collect(&stdout, deadline).ok_or(FetchError::Timeout(self.timeout))??;
        let stderr = collect(&stderr, deadline).ok_or(FetchError::Timeout(self.timeout))??;
        trace!(%status, bytes = stdout.len(), "converter finished");

        if !status.success() {
            return Err(FetchError::Failed {
                status,
                stderr: stderr.trim().to_string(),
            });
        }
        if stdout.trim().is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(stdout)
    }
}

fn read_lossy<R: Read>(reader: Option<R>) -> io::Result<String> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf)?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Drains `reader` on a detached thread.
///
/// The thread is never joined, so a pipe held open past the deadline cannot
/// hold up the caller.
fn spawn_reader<R: Read + Send + 'static>(reader: Option<R>) -> Receiver<io::Result<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        // the receiver is gone if the call already timed out
        let _ = sender.send(read_lossy(reader));
    });
    receiver
}

/// Waits for a reader's output until `deadline`.
///
/// Returns `None` if the deadline passed first.
fn collect(receiver: &Receiver<io::Result<String>>, deadline: Instant) -> Option<io::Result<String>> {
    let timeout = deadline.saturating_duration_since(Instant::now());
    match receiver.recv_timeout(timeout) {
        Ok(output) => Some(output),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(Err(io::Error::other(
            "converter output reader panicked",
        ))),
    }
}

/// Waits for `child` to exit, killing it once `deadline` has passed.
///
/// Returns `None` if the child was killed.
fn wait_with_deadline(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            // the child may exit between `try_wait` and `kill`
            if let Err(e) = child.kill() {
                debug!(error = %e, "failed to kill converter");
            }
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Wraps a [`Fetcher`], enforcing a minimum gap between calls.
///
/// The gap is measured from when the previous call *returned* to when the next
/// one starts, whether or not the previous call succeeded.
#[derive(Debug)]
pub struct RateLimited<F> {
    inner: F,
    cooldown: Duration,
    last: Option<Instant>,
}

impl<F> RateLimited<F> {
    /// Wraps `inner` with the given cooldown.
    #[must_use]
    pub const fn new(inner: F, cooldown: Duration) -> Self {
        Self {
            inner,
            cooldown,
            last: None,
        }
    }

    /// How long a call made at `now` would have to wait.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.last.map_or(Duration::ZERO, |last| {
            (last + self.cooldown).saturating_duration_since(now)
        })
    }

    /// The wrapped fetcher.
    #[must_use]
    pub const fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: Fetcher> Fetcher for RateLimited<F> {
    fn fetch(&mut self, section: &Section, chapter: usize) -> Result<String, FetchError> {
        let wait = self.remaining(Instant::now());
        if !wait.is_zero() {
            trace!(?wait, "cooling down");
            thread::sleep(wait);
        }
        let result = self.inner.fetch(section, chapter);
        self.last = Some(Instant::now());
        result
    }
}

/// Errors that can occur while fetching a chapter.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The converter program could not be started.
    #[error("failed to run converter '{program}'")]
    Spawn {
        /// The program that was run.
        program: String,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Reading the converter's output or waiting for it failed.
    #[error("failed to collect converter output")]
    Io(#[from] io::Error),

    /// The converter exited unsuccessfully.
    #[error("converter exited with {status}: {stderr}")]
    Failed {
        /// The exit status.
        status: ExitStatus,
        /// Whatever the converter wrote to standard error.
        stderr: String,
    },

    /// The converter ran past its timeout and was killed.
    #[error("converter timed out after {0:?}")]
    Timeout(Duration),

    /// The converter succeeded but produced no output.
    #[error("converter produced no output")]
    Empty,
}
