use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::LintError;

const POLL_INTERVAL: Duration = Duration::from_millis(25);
/// How long pipes may stay open after the deadline before the group is killed
const READER_GRACE: Duration = Duration::from_millis(250);

/// How an external tool is run
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOptions {
    /// Kill the process after this long. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Append stderr to the captured output instead of passing it through
    pub merge_stderr: bool,
}

/// Output captured from one invocation
#[derive(Debug, Default)]
pub struct Capture {
    /// stdout, followed by stderr when merged
    pub output: Vec<u8>,
    /// `None` when the process was killed and could not be reaped
    pub status: Option<ExitStatus>,
    pub timed_out: bool,
}

impl Capture {
    pub fn success(&self) -> bool {
        self.status.map_or(false, |s| s.success())
    }

    pub fn status_text(&self) -> String {
        match self.status {
            Some(s) => s.to_string(),
            None => "no exit status".to_string(),
        }
    }
}

/// Something that can execute a command line.
///
/// The pipeline only needs this seam; tests substitute canned output.
pub trait CommandRunner {
    fn run(&self, name: &str, argv: &[String]) -> Result<Capture, LintError>;
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    pub options: ExecOptions,
}

impl ProcessRunner {
    pub fn new(options: ExecOptions) -> Self {
        ProcessRunner { options }
    }
}

impl CommandRunner for ProcessRunner {
    /// A non-zero exit is a normal outcome for linters and is returned as
    /// a successful capture. Only spawn and wait failures are errors.
    fn run(&self, name: &str, argv: &[String]) -> Result<Capture, LintError> {
        let Some((program, args)) = argv.split_first() else {
            return Ok(Capture::default());
        };
        debug!("Running {}: {}", name, argv.join(" "));

        let stderr = if self.options.merge_stderr {
            Stdio::piped()
        } else {
            Stdio::inherit()
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(stderr);

        // A timeout has to reach the helpers the tool forks, not just the tool
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if self.options.timeout.is_some() {
                command.process_group(0);
            }
        }

        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| LintError::Launch {
            name: name.to_string(),
            source,
        })?;

        let readers: Vec<Reader> = [
            child.stdout.take().map(Reader::spawn),
            child.stderr.take().map(Reader::spawn),
        ]
        .into_iter()
        .flatten()
        .collect();

        let (status, mut timed_out) = match self.options.timeout {
            Some(limit) => wait_with_deadline(&mut child, started + limit),
            None => child.wait().map(|s| (Some(s), false)),
        }
        .map_err(|source| LintError::Wait {
            name: name.to_string(),
            source,
        })?;

        let drain_until = self
            .options
            .timeout
            .map(|limit| (started + limit).max(Instant::now()) + READER_GRACE);
        if !wait_for_readers(&readers, drain_until) {
            // a descendant still holds the pipes open past the deadline
            kill_tree(&mut child);
            timed_out = true;
            wait_for_readers(&readers, Some(Instant::now() + READER_GRACE));
        }

        let mut output = Vec::new();
        for reader in readers {
            output.extend(reader.take());
        }

        debug!("{} finished ({} bytes, timed out: {})", name, output.len(), timed_out);

        Ok(Capture {
            output,
            status,
            timed_out,
        })
    }
}

/// Drains one pipe on its own thread into a shared buffer, so whatever
/// arrived before a kill can still be collected.
struct Reader {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<()>,
}

impl Reader {
    fn spawn<R: Read + Send + 'static>(mut source: R) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let handle = thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match source.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => match sink.lock() {
                        Ok(mut out) => out.extend_from_slice(&chunk[..n]),
                        Err(_) => break,
                    },
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        });
        Reader { buf, handle }
    }

    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Bytes read so far. A reader still blocked on the pipe is detached.
    fn take(self) -> Vec<u8> {
        if self.handle.is_finished() {
            let _ = self.handle.join();
        }
        self.buf
            .lock()
            .map(|mut out| std::mem::take(&mut *out))
            .unwrap_or_default()
    }
}

/// Poll until every reader hit EOF. Returns false once `until` passes first.
fn wait_for_readers(readers: &[Reader], until: Option<Instant>) -> bool {
    loop {
        if readers.iter().all(Reader::is_finished) {
            return true;
        }
        if until.map_or(false, |t| Instant::now() >= t) {
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the child together with its process group on unix
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: plain syscall; the group was created at spawn
            unsafe {
                let _ = libc::kill(-pgid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
}

fn wait_with_deadline(
    child: &mut Child,
    deadline: Instant,
) -> io::Result<(Option<ExitStatus>, bool)> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((Some(status), false));
        }
        if Instant::now() >= deadline {
            kill_tree(child);
            return Ok((child.wait().ok(), true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
