use std::collections::VecDeque;

use serde::{Serialize, Serializer};

use crate::types::{HistoryRef, ReadingHistoryEntry};
use crate::{Error, Result};

pub const DEFAULT_HISTORY_LEN: usize = 20;

/// Articles a reader has viewed, oldest first and most recent last.
///
/// Entries are unique by id: recording an article already present moves it
/// to the end. Once `max_len` is exceeded the oldest entry is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingHistory {
    entries: VecDeque<ReadingHistoryEntry>,
    max_len: usize,
}

impl ReadingHistory {
    pub fn new(max_len: usize) -> Result<Self> {
        if max_len == 0 {
            return Err(Error::Config(
                "reading history length must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            entries: VecDeque::with_capacity(max_len),
            max_len,
        })
    }

    /// Rebuilds a history from a persisted list, replaying it in order so the
    /// cap and de-duplication rules hold.
    pub fn from_entries<I>(entries: I, max_len: usize) -> Result<Self>
    where
        I: IntoIterator<Item = ReadingHistoryEntry>,
    {
        let mut history = Self::new(max_len)?;
        for entry in entries {
            history.record(entry);
        }
        Ok(history)
    }

    pub fn record(&mut self, entry: ReadingHistoryEntry) {
        if let Some(pos) = self.entries.iter().position(|e| e.id == entry.id) {
            self.entries.remove(pos);
        }
        self.entries.push_back(entry);
        while self.entries.len() > self.max_len {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &ReadingHistoryEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn as_refs(&self) -> Vec<HistoryRef> {
        self.entries.iter().map(ReadingHistoryEntry::to_history_ref).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Serialize for ReadingHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}
