//! Blender subprocess orchestrator.
//!
//! Each capture runs as one `blender --background` invocation that reads a
//! JSON request and writes a JSON report.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::{BlenderError, BlenderResult};
use crate::report::{CaptureReport, CaptureRequest};

const EMBEDDED_ENTRYPOINT_PY: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../blender/entrypoint.py"
));

/// Environment variable naming the Blender executable.
pub const BLENDER_PATH_ENV: &str = "BLENDER_PATH";

/// Environment variable overriding the Python entrypoint.
pub const ENTRYPOINT_ENV: &str = "SPRITEBAKE_BLENDER_ENTRYPOINT";

/// Configuration for the Blender orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Path to the Blender executable.
    pub blender_path: Option<PathBuf>,
    /// Path to the Python entrypoint script.
    pub entrypoint_path: PathBuf,
    /// Per-capture time limit. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Whether to capture Blender's stderr.
    pub capture_output: bool,
    /// When set, the running Blender process is killed.
    pub abort: Option<Arc<AtomicBool>>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            blender_path: None,
            entrypoint_path: PathBuf::from("blender/entrypoint.py"),
            timeout: None,
            capture_output: true,
            abort: None,
        }
    }
}

impl OrchestratorConfig {
    /// Creates a new config with the given entrypoint path.
    pub fn with_entrypoint(entrypoint_path: impl Into<PathBuf>) -> Self {
        Self {
            entrypoint_path: entrypoint_path.into(),
            ..Default::default()
        }
    }

    /// Sets the Blender executable path.
    pub fn blender_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.blender_path = Some(path.into());
        self
    }

    /// Sets the per-capture timeout.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Kills the running capture once `flag` is set.
    pub fn abort_on(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }
}

/// The Blender subprocess orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

struct ResolvedEntrypoint {
    path: PathBuf,
    _tempfile: Option<tempfile::NamedTempFile>,
}

impl Orchestrator {
    /// Creates a new orchestrator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new orchestrator with the given configuration.
    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Locates the Blender executable: explicit config, then `BLENDER_PATH`,
    /// then `PATH`, then common install locations.
    pub fn find_blender(&self) -> BlenderResult<PathBuf> {
        if let Some(ref path) = self.config.blender_path {
            if path.exists() {
                return Ok(path.clone());
            }
        }

        if let Ok(path) = std::env::var(BLENDER_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        let names: &[&str] = if cfg!(windows) {
            &["blender.exe", "blender"]
        } else {
            &["blender"]
        };
        for name in names {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        let common_paths: &[&str] = if cfg!(windows) {
            &[
                "C:\\Program Files\\Blender Foundation\\Blender 4.2\\blender.exe",
                "C:\\Program Files\\Blender Foundation\\Blender 4.1\\blender.exe",
                "C:\\Program Files\\Blender Foundation\\Blender 3.6\\blender.exe",
            ]
        } else if cfg!(target_os = "macos") {
            &["/Applications/Blender.app/Contents/MacOS/Blender"]
        } else {
            &["/usr/bin/blender", "/usr/local/bin/blender", "/snap/bin/blender"]
        };
        common_paths
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
            .ok_or(BlenderError::BlenderNotFound)
    }

    fn resolve_entrypoint(&self) -> BlenderResult<ResolvedEntrypoint> {
        if self.config.entrypoint_path.exists() {
            return Ok(ResolvedEntrypoint {
                path: self.config.entrypoint_path.clone(),
                _tempfile: None,
            });
        }

        if let Ok(path) = std::env::var(ENTRYPOINT_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(ResolvedEntrypoint {
                    path,
                    _tempfile: None,
                });
            }
            return Err(BlenderError::EntrypointNotFound { path });
        }

        let mut file = tempfile::Builder::new()
            .prefix("spritebake_entrypoint_")
            .suffix(".py")
            .tempfile()?;
        file.write_all(EMBEDDED_ENTRYPOINT_PY.as_bytes())?;
        file.flush()?;

        Ok(ResolvedEntrypoint {
            path: file.path().to_path_buf(),
            _tempfile: Some(file),
        })
    }

    /// Writes `request` into `work_dir`, runs Blender on it and returns the
    /// report. A report with `ok == false` is returned as-is.
    pub fn run_capture(
        &self,
        request: &CaptureRequest,
        work_dir: &Path,
    ) -> BlenderResult<CaptureReport> {
        let request_path = work_dir.join("request.json");
        let report_path = work_dir.join("report.json");

        let json = serde_json::to_string_pretty(request).map_err(BlenderError::SerializeFailed)?;
        std::fs::write(&request_path, json).map_err(BlenderError::WriteRequestFailed)?;

        self.run(&request_path, &report_path)
    }

    /// Runs Blender against an existing request file.
    pub fn run(&self, request_path: &Path, report_path: &Path) -> BlenderResult<CaptureReport> {
        let blender_path = self.find_blender()?;
        let entrypoint = self.resolve_entrypoint()?;

        let mut cmd = Command::new(&blender_path);
        cmd.args(blender_args(&entrypoint.path, request_path, report_path));
        if self.config.capture_output {
            cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        }
        detach_from_terminal_signals(&mut cmd);

        debug!(blender = %blender_path.display(), request = %request_path.display(), "spawning blender");
        let child = cmd.spawn().map_err(BlenderError::SpawnFailed)?;
        let (status, stderr) = wait_with_timeout(
            child,
            self.config.timeout,
            self.config.capture_output,
            self.config.abort.as_deref(),
        )?;
        trace!(%status, "blender exited");

        // The entrypoint exits non-zero on failure but still writes a report,
        // which carries the more useful message.
        if report_path.exists() {
            let content = std::fs::read_to_string(report_path).map_err(|e| {
                BlenderError::ReadReportFailed {
                    path: report_path.to_path_buf(),
                    source: e,
                }
            })?;
            return serde_json::from_str(&content).map_err(BlenderError::ParseReportFailed);
        }

        if !status.success() {
            return Err(BlenderError::process_failed(
                status.code().unwrap_or(-1),
                stderr,
            ));
        }

        Err(BlenderError::ReadReportFailed {
            path: report_path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "report not written"),
        })
    }
}

/// `--background --factory-startup --python <entry> -- --request <path> --report <path>`
fn blender_args(entrypoint: &Path, request_path: &Path, report_path: &Path) -> Vec<OsString> {
    vec![
        "--background".into(),
        "--factory-startup".into(),
        "--python".into(),
        entrypoint.as_os_str().to_owned(),
        "--".into(),
        "--request".into(),
        request_path.as_os_str().to_owned(),
        "--report".into(),
        report_path.as_os_str().to_owned(),
    ]
}

/// Puts Blender in its own process group so a terminal Ctrl-C reaches only
/// spritebake, which lets the running capture finish.
#[cfg(unix)]
fn detach_from_terminal_signals(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn detach_from_terminal_signals(_cmd: &mut Command) {}

/// Reads stderr to the end on its own thread so a chatty child never blocks
/// on a full pipe.
fn drain_stderr(child: &mut Child) -> Option<JoinHandle<String>> {
    let mut stderr = child.stderr.take()?;
    std::thread::Builder::new()
        .name("blender-stderr".into())
        .spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            buf
        })
        .ok()
}

fn wait_with_timeout(
    mut child: Child,
    timeout: Option<Duration>,
    capture_output: bool,
    abort: Option<&AtomicBool>,
) -> BlenderResult<(ExitStatus, String)> {
    let start = Instant::now();
    let reader = if capture_output {
        drain_stderr(&mut child)
    } else {
        None
    };
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                let aborted = abort.is_some_and(|flag| flag.load(Ordering::SeqCst));
                let timed_out = timeout.filter(|limit| start.elapsed() > *limit);
                if aborted || timed_out.is_some() {
                    let _ = child.kill();
                    let _ = child.wait();
                    // A surviving grandchild may hold the pipe open; leave the reader detached.
                    drop(reader);
                    return Err(match timed_out {
                        Some(limit) if !aborted => BlenderError::Timeout {
                            timeout_secs: limit.as_secs(),
                        },
                        _ => BlenderError::Aborted,
                    });
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return Err(BlenderError::SpawnFailed(e)),
        }
    };

    let stderr = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    Ok((status, stderr))
}
