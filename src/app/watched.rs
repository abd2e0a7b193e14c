// src/app/watched.rs
use thiserror::Error;
use tracing::warn;

use crate::app::types::WatchedEntry;
use crate::app::utils::average;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WatchedError {
    #[error("“{title}” is already in your watched list")]
    Duplicate { imdb_id: String, title: String },
}

/// Figures shown above the watched list. Always derived, never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime: f64,
}

/// The user's watched titles in insertion order, unique by IMDb id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WatchedList {
    entries: Vec<WatchedEntry>,
}

impl WatchedList {
    /// Later duplicates in stored data are dropped.
    pub fn from_entries(entries: Vec<WatchedEntry>) -> Self {
        let (list, dropped) = Self::dedupe(entries);
        for id in &dropped {
            warn!(imdb_id = %id, "dropping duplicate stored watched entry");
        }
        list
    }

    /// Keeps the first entry per id; returns the ids that were dropped.
    fn dedupe(entries: Vec<WatchedEntry>) -> (Self, Vec<String>) {
        let mut list = Self::default();
        let mut dropped = Vec::new();
        for e in entries {
            if let Err(WatchedError::Duplicate { imdb_id, .. }) = list.add(e) {
                dropped.push(imdb_id);
            }
        }
        (list, dropped)
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, imdb_id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|e| e.imdb_id == imdb_id)
    }

    pub fn add(&mut self, entry: WatchedEntry) -> Result<(), WatchedError> {
        if self.get(&entry.imdb_id).is_some() {
            return Err(WatchedError::Duplicate {
                imdb_id: entry.imdb_id,
                title: entry.title,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn remove(&mut self, imdb_id: &str) -> Option<WatchedEntry> {
        let idx = self.entries.iter().position(|e| e.imdb_id == imdb_id)?;
        Some(self.entries.remove(idx))
    }

    pub fn summary(&self) -> WatchedSummary {
        let imdb: Vec<f64> = self.entries.iter().map(|e| f64::from(e.imdb_rating)).collect();
        let user: Vec<f64> = self.entries.iter().map(|e| f64::from(e.user_rating)).collect();
        let runtime: Vec<f64> = self.entries.iter().map(|e| f64::from(e.runtime)).collect();
        WatchedSummary {
            count: self.entries.len(),
            avg_imdb_rating: average(&imdb),
            avg_user_rating: average(&user),
            avg_runtime: average(&runtime),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn entry(id: &str, runtime: u32, imdb: f32, user: u8) -> WatchedEntry {
        WatchedEntry {
            imdb_id: id.to_string(),
            title: format!("Film {id}"),
            year: "2010".to_string(),
            poster: "N/A".to_string(),
            runtime,
            imdb_rating: imdb,
            user_rating: user,
            count_rating_decisions: None,
        }
    }

    #[test]
    fn summary_averages() {
        let list = WatchedList::from_entries(vec![
            entry("tt1375666", 148, 8.8, 10),
            entry("tt0088763", 116, 8.5, 9),
        ]);
        let s = list.summary();
        assert_eq!(s.count, 2);
        assert_eq!(s.avg_user_rating, 9.5);
        assert_eq!(s.avg_runtime, 132.0);
        assert!((s.avg_imdb_rating - 8.65).abs() < 1e-4);
    }

    #[test]
    fn empty_summary_is_zero() {
        let s = WatchedList::default().summary();
        assert_eq!(s.count, 0);
        assert_eq!(s.avg_runtime, 0.0);
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut list = WatchedList::default();
        list.add(entry("tt1", 100, 7.0, 7)).unwrap();
        let err = list.add(entry("tt1", 100, 7.0, 3)).unwrap_err();
        assert!(matches!(err, WatchedError::Duplicate { ref imdb_id, .. } if imdb_id == "tt1"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("tt1").unwrap().user_rating, 7);
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let mut list = WatchedList::from_entries(vec![
            entry("a", 1, 1.0, 1),
            entry("b", 2, 2.0, 2),
            entry("c", 3, 3.0, 3),
        ]);
        let gone = list.remove("b").unwrap();
        assert_eq!(gone.imdb_id, "b");
        let ids: Vec<&str> = list.entries().iter().map(|e| e.imdb_id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert!(list.remove("b").is_none());
    }

    #[test]
    fn from_entries_drops_stored_duplicates() {
        let list = WatchedList::from_entries(vec![entry("a", 1, 1.0, 4), entry("a", 1, 1.0, 9)]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.entries()[0].user_rating, 4);
    }

    #[test]
    fn dedupe_reports_dropped_ids() {
        let (list, dropped) = WatchedList::dedupe(vec![
            entry("a", 1, 1.0, 4),
            entry("b", 1, 1.0, 5),
            entry("a", 1, 1.0, 9),
        ]);
        assert_eq!(list.len(), 2);
        assert_eq!(dropped, ["a"]);
    }
}
