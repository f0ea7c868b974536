//! Ingest progress reporting.
//!
//! Reports what a folder sync is doing as it happens: which folders were
//! registered, which files were sent and which were already present.
//! Progress is emitted on **stderr** so stdout remains parseable for scripts.

use std::io::Write;
use std::path::Path;

/// A single progress event for a folder sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestEvent {
    /// A local directory now has a remote folder. `existing` is true when the
    /// service reported that the folder was already there.
    FolderRegistered { path: String, existing: bool },
    /// A file's bytes were sent and validated.
    FileUploaded { path: String, bytes: u64 },
    /// The service already holds a document with the file's signature.
    FileUnchanged { path: String },
    /// Stale documents were purged.
    Purged { cutoff: String },
}

impl IngestEvent {
    pub fn folder(path: &Path, existing: bool) -> Self {
        IngestEvent::FolderRegistered {
            path: path.display().to_string(),
            existing,
        }
    }

    pub fn uploaded(path: &Path, bytes: u64) -> Self {
        IngestEvent::FileUploaded {
            path: path.display().to_string(),
            bytes,
        }
    }

    pub fn unchanged(path: &Path) -> Self {
        IngestEvent::FileUnchanged {
            path: path.display().to_string(),
        }
    }
}

/// Reports ingest progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter {
    fn report(&self, event: IngestEvent);
}

/// Human-friendly progress on stderr: "ingest  uploaded  docs/a.txt (1,234 bytes)".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: IngestEvent) {
        let line = match &event {
            IngestEvent::FolderRegistered { path, existing } => {
                let state = if *existing { "exists" } else { "created" };
                format!("ingest  folder {}  {}\n", state, path)
            }
            IngestEvent::FileUploaded { path, bytes } => {
                format!("ingest  uploaded  {} ({} bytes)\n", path, format_number(*bytes))
            }
            IngestEvent::FileUnchanged { path } => format!("ingest  unchanged {}\n", path),
            IngestEvent::Purged { cutoff } => format!("ingest  purged before {}\n", cutoff),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: IngestEvent) {
        let obj = match &event {
            IngestEvent::FolderRegistered { path, existing } => serde_json::json!({
                "event": "folder",
                "path": path,
                "existing": existing
            }),
            IngestEvent::FileUploaded { path, bytes } => serde_json::json!({
                "event": "uploaded",
                "path": path,
                "bytes": bytes
            }),
            IngestEvent::FileUnchanged { path } => serde_json::json!({
                "event": "unchanged",
                "path": path
            }),
            IngestEvent::Purged { cutoff } => serde_json::json!({
                "event": "purged",
                "cutoff": cutoff
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: IngestEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
