use crate::date::Date;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub date: Date,
    pub event: String,
}

impl Entry {
    pub fn new(date: Date, event: impl Into<String>) -> Self {
        Self {
            date,
            event: event.into(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("No entries on or before {0}")]
    NoEntries(Date),
}

/// Events of a single date, unique and in insertion order.
#[derive(Debug, Default)]
struct Bucket {
    events: Vec<String>,
    seen: HashSet<String>,
}

impl Bucket {
    fn insert(&mut self, event: &str) -> bool {
        if self.seen.contains(event) {
            return false;
        }
        self.seen.insert(event.to_string());
        self.events.push(event.to_string());
        true
    }

    fn remove_if<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.events.len();
        let seen = &mut self.seen;
        self.events.retain(|event| {
            if pred(event) {
                seen.remove(event);
                false
            } else {
                true
            }
        });
        before - self.events.len()
    }

    fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// In-memory diary. Dates iterate ascending; a date never maps to an empty bucket.
#[derive(Debug, Default)]
pub struct Database {
    buckets: BTreeMap<Date, Bucket>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `event` under `date`. Re-adding an existing pair is a no-op.
    pub fn add(&mut self, date: Date, event: &str) {
        let added = self.buckets.entry(date).or_default().insert(event);
        if added {
            log::debug!("added {} {}", date, event);
        } else {
            log::trace!("duplicate ignored: {} {}", date, event);
        }
    }

    /// Returns every entry matching `pred`, by date then insertion order.
    pub fn find_if<F>(&self, pred: F) -> Vec<Entry>
    where
        F: Fn(&Date, &str) -> bool,
    {
        let pred = &pred;
        self.buckets
            .iter()
            .flat_map(move |(date, bucket)| {
                bucket
                    .events
                    .iter()
                    .filter(move |event| pred(date, event))
                    .map(move |event| Entry::new(*date, event.as_str()))
            })
            .collect()
    }

    /// Removes every entry matching `pred` and returns how many were removed.
    pub fn remove_if<F>(&mut self, pred: F) -> usize
    where
        F: Fn(&Date, &str) -> bool,
    {
        let mut removed = 0;
        self.buckets.retain(|date, bucket| {
            removed += bucket.remove_if(|event| pred(date, event));
            !bucket.is_empty()
        });
        log::debug!("removed {} entries", removed);
        removed
    }

    /// Latest entry on the greatest stored date not after `date`.
    ///
    /// Among events sharing that date the most recently added one is returned.
    pub fn last(&self, date: Date) -> Result<Entry, StoreError> {
        self.buckets
            .range(..=date)
            .next_back()
            .and_then(|(found, bucket)| {
                bucket
                    .events
                    .last()
                    .map(|event| Entry::new(*found, event.as_str()))
            })
            .ok_or(StoreError::NoEntries(date))
    }

    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (date, bucket) in &self.buckets {
            for event in &bucket.events {
                writeln!(out, "{} {}", date, event)?;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(|bucket| bucket.events.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
