use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSON-lines sink for workflow events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write failures are swallowed; a broken log never aborts a phase.
    pub fn record(&self, event: &str, fields: &[(&str, Value)]) {
        if let Some(path) = self.path.as_deref() {
            let _ = append_event(path, event, fields);
        }
    }
}

pub fn append_event(path: &Path, event: &str, fields: &[(&str, Value)]) -> std::io::Result<()> {
    let mut payload = Map::new();
    payload.insert(
        "timestamp".to_string(),
        Value::from(chrono::Utc::now().timestamp()),
    );
    payload.insert("event".to_string(), Value::String(event.to_string()));
    for (key, value) in fields {
        payload.insert((*key).to_string(), value.clone());
    }

    let line = serde_json::to_string(&payload)
        .map_err(|source| std::io::Error::other(source.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{line}")
}
