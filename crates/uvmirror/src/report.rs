use std::fmt;

use crate::error::{DeleteError, TransferError};
use crate::transfer::TransferResult;

/// Outcome of one completed run.
#[derive(Debug)]
pub struct Report {
    pub source:           String,
    pub manifest_entries: usize,
    pub in_scope:         usize,
    pub inventory:        usize,
    pub missing:          usize,
    pub stale:            usize,
    /// One entry per missing artifact.
    pub transfers:        Vec<TransferResult>,
    /// Number of keys deleted, or why the batch delete failed.
    pub pruned:           Result<usize, DeleteError>,
}

impl Report {
    pub fn uploaded(&self) -> usize { self.transfers.iter().filter(|t| t.is_success()).count() }

    pub fn uploaded_bytes(&self) -> u64 {
        self.transfers
            .iter()
            .map(|t| match t {
                TransferResult::Success { bytes, .. } => *bytes,
                TransferResult::Failure { .. } => 0,
            })
            .sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &TransferError)> {
        self.transfers.iter().filter_map(|t| match t {
            TransferResult::Failure { key, error } => Some((key.as_str(), error)),
            TransferResult::Success { .. } => None,
        })
    }

    /// True when every transfer and the prune succeeded.
    pub fn is_clean(&self) -> bool { self.failed().next().is_none() && self.pruned.is_ok() }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[{}] manifest={} in_scope={} inventory={} missing={} stale={}",
            self.source, self.manifest_entries, self.in_scope, self.inventory, self.missing, self.stale
        )?;
        writeln!(
            f,
            "  uploaded {}/{} ({} bytes)",
            self.uploaded(),
            self.transfers.len(),
            self.uploaded_bytes()
        )?;
        for (key, error) in self.failed() {
            writeln!(f, "  failed {key}: {error}")?;
        }
        match &self.pruned {
            Ok(count) => writeln!(f, "  pruned {count}/{}", self.stale),
            Err(e) => writeln!(f, "  prune failed: {e}"),
        }
    }
}
