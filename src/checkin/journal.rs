//! Append-only log of successful check-ins.
//!
//! One line per confirmed transaction:
//! `<RFC 3339 local time>  <address> | tx:<hash> | <message>`

use alloy::primitives::{Address, TxHash};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<FixedOffset>,
    pub wallet: Address,
    pub tx_hash: TxHash,
    pub message: String,
}

impl LogEntry {
    /// Entry stamped with the current local time.
    pub fn now(wallet: Address, tx_hash: TxHash, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().fixed_offset(),
            wallet,
            tx_hash,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {} | tx:{} | {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, false),
            self.wallet,
            self.tx_hash,
            self.message
        )
    }
}

/// File-backed journal. The file is opened, appended and closed per entry.
#[derive(Debug, Clone)]
pub struct CheckinJournal {
    path: PathBuf,
}

impl CheckinJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", entry).as_bytes()).await?;
        file.flush().await
    }
}
