//! Message delivery collaborators.
//!
//! The screener never talks to a messaging service directly; it hands
//! rendered text to a [`Notifier`]. Two local notifiers ship:
//! - [`LogNotifier`] prints messages to stdout.
//! - [`OutboxNotifier`] appends one JSON object per message to a JSONL file,
//!   for an external relay (bot, mailer) to pick up.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Topic used for scan summaries; alerts use their symbol.
pub const SUMMARY_TOPIC: &str = "scan-summary";

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Could not reach or write to the transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport refused the message.
    #[error("message rejected: {0}")]
    Rejected(String),
}

pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver `message`. `topic` is the symbol for alerts.
    fn send(&self, topic: &str, message: &str) -> Result<(), DeliveryError>;
}

/// Prints every message to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "stdout"
    }

    fn send(&self, topic: &str, message: &str) -> Result<(), DeliveryError> {
        info!(topic, bytes = message.len(), "delivering message");
        println!("{message}\n");
        Ok(())
    }
}

/// One line of the outbox file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub sent_at: DateTime<Utc>,
    pub topic: String,
    pub message: String,
}

/// JSONL outbox file.
///
/// Each line is an independent JSON object, so a partial write corrupts at
/// most one message.
#[derive(Debug)]
pub struct OutboxNotifier {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl OutboxNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &OutboxMessage) -> io::Result<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{json}")?;
        file.flush()
    }

    /// Read all messages; malformed lines are skipped.
    pub fn read_all(&self) -> io::Result<Vec<OutboxMessage>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = io::BufReader::new(fs::File::open(&self.path)?);
        let mut messages = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(msg) = serde_json::from_str::<OutboxMessage>(&line) {
                messages.push(msg);
            }
        }
        Ok(messages)
    }
}

impl Notifier for OutboxNotifier {
    fn name(&self) -> &str {
        "outbox"
    }

    fn send(&self, topic: &str, message: &str) -> Result<(), DeliveryError> {
        let entry = OutboxMessage {
            sent_at: Utc::now(),
            topic: topic.to_string(),
            message: message.to_string(),
        };
        self.append(&entry).map_err(|e| {
            DeliveryError::Transport(format!("append to {}: {e}", self.path.display()))
        })?;
        info!(topic, path = %self.path.display(), "message queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn outbox_appends_one_line_per_message() {
        let tmp = TempDir::new().unwrap();
        let outbox = OutboxNotifier::new(tmp.path().join("out/messages.jsonl"));
        outbox.send("TCS", "first").unwrap();
        outbox.send(SUMMARY_TOPIC, "second\nline").unwrap();

        let messages = outbox.read_all().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].topic, "TCS");
        assert_eq!(messages[1].message, "second\nline");

        let raw = fs::read_to_string(outbox.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
    }

    #[test]
    fn outbox_skips_malformed_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("messages.jsonl");
        fs::write(&path, "garbage\n\n").unwrap();
        let outbox = OutboxNotifier::new(&path);
        outbox.send("INFY", "hello").unwrap();
        assert_eq!(outbox.read_all().unwrap().len(), 1);
    }

    #[test]
    fn unwritable_outbox_is_transport_error() {
        let tmp = TempDir::new().unwrap();
        // A directory where the file should be.
        let outbox = OutboxNotifier::new(tmp.path());
        let err = outbox.send("TCS", "x").unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }

    #[test]
    fn missing_outbox_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let outbox = OutboxNotifier::new(tmp.path().join("none.jsonl"));
        assert!(outbox.read_all().unwrap().is_empty());
    }
}
