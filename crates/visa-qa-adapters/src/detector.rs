//! Face detector adapters.
//!
//! Neither adapter detects faces itself. [`SidecarDetector`] reads a detection
//! stored next to the photo; [`CommandDetector`] delegates to an external
//! program. Both exchange detections as JSON in the normalized 600×600 space:
//!
//! ```json
//! {"box": {"x": 200, "y": 150, "width": 200, "height": 260},
//!  "landmarks": {"left_eye": [{"x": 250, "y": 240}],
//!                "right_eye": [{"x": 350, "y": 240}],
//!                "jaw_outline": [{"x": 200, "y": 300}, {"x": 300, "y": 420}]}}
//! ```
//!
//! `null` means no face was found.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, trace, warn};
use visa_qa_core::{Detection, FaceDetector, Upload};

/// Suffix appended to the photo's file stem to locate its sidecar.
pub const SIDECAR_SUFFIX: &str = ".landmarks.json";

/// How often a running detector command is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Reads `<stem>.landmarks.json` from the photo's directory.
#[derive(Debug, Clone, Default)]
pub struct SidecarDetector {
    dir: Option<PathBuf>,
}

impl SidecarDetector {
    /// Looks for sidecars next to each photo.
    #[must_use]
    pub const fn new() -> Self {
        Self { dir: None }
    }

    /// Looks for sidecars in `dir` instead.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Sidecar location for a photo.
    #[must_use]
    pub fn sidecar_path(&self, photo: &Path) -> PathBuf {
        let stem = photo
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = format!("{stem}{SIDECAR_SUFFIX}");
        match &self.dir {
            Some(dir) => dir.join(name),
            None => photo.with_file_name(name),
        }
    }
}

impl FaceDetector for SidecarDetector {
    fn name(&self) -> &'static str {
        "sidecar"
    }

    fn detect(&self, upload: &Upload) -> Result<Option<Detection>> {
        let Some(photo) = upload.source_path.as_deref() else {
            debug!("Upload has no path, no sidecar to read");
            return Ok(None);
        };
        let path = self.sidecar_path(photo);
        if !path.is_file() {
            debug!("No sidecar at {}", path.display());
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read sidecar: {}", path.display()))?;
        parse_detection(&text).with_context(|| format!("Invalid sidecar: {}", path.display()))
    }
}

/// Runs an external program with the photo path as its last argument.
///
/// The program prints a detection (or `null`) as JSON on stdout. Empty output
/// counts as no face; a non-zero exit status is an error. With a timeout set,
/// a program still running at the deadline is killed.
#[derive(Debug, Clone)]
pub struct CommandDetector {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandDetector {
    /// Creates a detector for `program` with fixed leading arguments.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Parses a whitespace-separated command line. No shell quoting is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the command line is empty.
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let Some(program) = parts.next() else {
            bail!("Detector command is empty");
        };
        Ok(Self::new(program, parts.collect()))
    }

    /// Kills the program if it runs longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Waits for the child, killing it once the deadline passes.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait()?);
        };
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                warn!(program = %self.program, ?timeout, "Killing detector");
                if let Err(e) = child.kill() {
                    debug!("Failed to kill detector: {e}");
                }
                // Reap the killed child
                let _ = child.wait();
                bail!("Detector {} timed out after {timeout:?}", self.program);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl FaceDetector for CommandDetector {
    fn name(&self) -> &'static str {
        "command"
    }

    fn detect(&self, upload: &Upload) -> Result<Option<Detection>> {
        let Some(photo) = upload.source_path.as_deref() else {
            bail!("Command detector needs a photo on disk");
        };
        trace!(program = %self.program, photo = %photo.display(), "Running detector");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(photo)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to run detector: {}", self.program))?;

        // Drain both pipes while waiting so a chatty child cannot block on a full pipe
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        let status = self.wait(&mut child)?;
        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            bail!(
                "Detector {} exited with {}: {}",
                self.program,
                status,
                stderr.trim()
            );
        }

        let stdout = String::from_utf8_lossy(&stdout);
        if stdout.trim().is_empty() {
            return Ok(None);
        }
        parse_detection(&stdout).context("Detector printed invalid JSON")
    }
}

fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| anyhow!("Detector output reader panicked"))?
            .context("Failed to read detector output"),
        None => Ok(Vec::new()),
    }
}

/// Parses a detection document; `null` is no face.
///
/// # Errors
///
/// Returns an error if the text is not a detection or `null`.
pub fn parse_detection(text: &str) -> Result<Option<Detection>> {
    let detection: Option<Detection> = serde_json::from_str(text)?;
    Ok(detection)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_path_next_to_photo() {
        let detector = SidecarDetector::new();
        assert_eq!(
            detector.sidecar_path(Path::new("/photos/a.jpg")),
            PathBuf::from("/photos/a.landmarks.json")
        );
    }

    #[test]
    fn test_sidecar_path_in_dir() {
        let detector = SidecarDetector::in_dir("/landmarks");
        assert_eq!(
            detector.sidecar_path(Path::new("/photos/passport.v2.jpeg")),
            PathBuf::from("/landmarks/passport.v2.landmarks.json")
        );
    }

    #[test]
    fn test_parse_detection() {
        let det = parse_detection(
            r#"{"box":{"x":1,"y":2,"width":3,"height":4},
                "landmarks":{"left_eye":[{"x":5,"y":6}]}}"#,
        )
        .unwrap()
        .unwrap();
        assert!((det.bbox.height - 4.0).abs() < f64::EPSILON);
        assert_eq!(det.landmarks.left_eye.len(), 1);
        assert!(det.landmarks.jaw_outline.is_empty());

        assert!(parse_detection("null").unwrap().is_none());
        assert!(parse_detection("{\"landmarks\":{}}").is_err());
    }

    #[test]
    fn test_command_line_parsing() {
        let detector = CommandDetector::from_command_line("  detect-face --json  ").unwrap();
        assert_eq!(detector.program, "detect-face");
        assert_eq!(detector.args, vec!["--json".to_string()]);
        assert!(CommandDetector::from_command_line("   ").is_err());
    }
}
