use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{CancelToken, ModelTrainer, TrainedModel, TrainerError};
use crate::config::TrainerSettings;
use crate::densify::TrainingSet;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs an external program as the trainer.
///
/// The training set goes to the child's stdin as one JSON line of
/// `[x, y, z, label]` tuples, then stdin is closed. The child must print one
/// JSON object on stdout and exit successfully. Stderr is forwarded to the log.
///
/// On Unix the child leads its own process group, so a timeout or cancel also
/// kills processes it started, such as the interpreter behind a `sh -c` wrapper.
#[derive(Debug, Clone)]
pub struct ProcessTrainer {
    program: OsString,
    args: Vec<OsString>,
    timeout: Option<Duration>,
    poll_interval: Duration,
}

impl ProcessTrainer {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn from_settings(settings: &TrainerSettings) -> Self {
        Self::new(&settings.program)
            .args(&settings.args)
            .with_timeout(settings.timeout())
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Kill the child if it has not exited after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn program_display(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn spawn(&self) -> Result<Child, TrainerError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Lead a fresh group so a stop also reaches wrapper-spawned grandchildren.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut command, 0);
        command.spawn().map_err(|source| TrainerError::Spawn {
            program: self.program_display(),
            source,
        })
    }

    fn wait_for_exit(
        &self,
        child: &mut Child,
        cancel: &CancelToken,
    ) -> Result<ExitStatus, TrainerError> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if cancel.is_cancelled() {
                return Err(TrainerError::Cancelled);
            }
            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    return Err(TrainerError::TimedOut(timeout));
                }
            }
            thread::sleep(self.poll_interval);
        }
    }
}

impl ModelTrainer for ProcessTrainer {
    fn train(&self, set: &TrainingSet, cancel: &CancelToken) -> Result<TrainedModel, TrainerError> {
        if cancel.is_cancelled() {
            return Err(TrainerError::Cancelled);
        }
        let mut request = serde_json::to_vec(set).map_err(TrainerError::Serialize)?;
        request.push(b'\n');

        let mut child = self.spawn()?;
        tracing::info!(
            program = %self.program_display(),
            points = set.len(),
            "Started trainer"
        );
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || -> io::Result<()> {
                stdin.write_all(&request)?;
                stdin.flush()
            })
        });
        let stdout = child.stdout.take().map(read_stdout);
        let stderr = child.stderr.take().map(read_stderr);

        let status = match self.wait_for_exit(&mut child, cancel) {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!("Stopping trainer: {err}");
                stop(&mut child);
                return Err(err);
            }
        };

        if let Some(Err(err)) = writer.map(join_pipe) {
            if err.kind() != io::ErrorKind::BrokenPipe {
                return Err(TrainerError::Io(err));
            }
            tracing::debug!("Trainer closed stdin early");
        }
        let stderr = stderr.map(join_pipe).transpose()?.unwrap_or_default();
        let stdout = stdout.map(join_pipe).transpose()?.unwrap_or_default();

        if !status.success() {
            return Err(TrainerError::Exited {
                status,
                stderr: stderr.trim().to_string(),
            });
        }
        let text = String::from_utf8_lossy(&stdout);
        let model = TrainedModel::from_json(text.trim()).map_err(TrainerError::Malformed)?;
        tracing::info!(fields = model.as_map().len(), "Trainer returned a model");
        Ok(model)
    }
}

/// Kill the trainer and everything left in its process group, then reap it.
///
/// Pipe reader threads are not joined; they end once the last holder of the
/// pipes is gone.
fn stop(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(group) = libc::pid_t::try_from(child.id()) {
            // SAFETY: plain syscall on the group this child leads; no memory is shared.
            unsafe {
                libc::kill(-group, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn read_stdout(mut pipe: ChildStdout) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn read_stderr(mut pipe: ChildStderr) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        let text = String::from_utf8_lossy(&buffer).into_owned();
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            tracing::debug!(target: "huematch::trainer::stderr", "{line}");
        }
        Ok(text)
    })
}

fn join_pipe<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("trainer pipe thread panicked")))
}
