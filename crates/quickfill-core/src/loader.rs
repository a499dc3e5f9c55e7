//! Bulk (re)loading of a collection.
//!
//! A load replaces everything stored for a kind: the collection is cleared
//! first, then records are applied one line at a time. There is no
//! transaction around the sequence. Readers see each record as soon as it is
//! applied, and a failed load leaves the records before the failure in place.

use crate::collection::{Collection, KeySpace};
use crate::config::LoadConfig;
use crate::error::{QuickfillError, Result};
use crate::normalize::prefixes_for_phrase;
use crate::store::OrderedStore;
use crate::types::{Item, Kind, LoadReport};
use std::io::BufRead;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Rebuilds collections from line-delimited JSON records.
pub struct Loader<'a> {
    store: &'a dyn OrderedStore,
    keys: &'a KeySpace,
    config: LoadConfig,
}

impl<'a> Loader<'a> {
    /// Create a loader over `store`.
    pub fn new(store: &'a dyn OrderedStore, keys: &'a KeySpace, config: LoadConfig) -> Self {
        Loader {
            store,
            keys,
            config,
        }
    }

    /// Replace the contents of `kind` with the records read from `reader`.
    ///
    /// Each non-blank line must hold one UTF-8 JSON record. The first line
    /// that fails to decode aborts the load with `QuickfillError::Decode`, which
    /// carries the line number and how many records were applied before it.
    /// Store failures abort the load as well.
    #[instrument(skip_all, fields(kind = %kind))]
    pub fn load<R: BufRead>(&self, kind: &Kind, mut reader: R) -> Result<LoadReport> {
        let start = Instant::now();
        let collection = Collection::new(self.store, self.keys, kind.clone());
        collection.clear()?;

        info!(store = self.store.name(), "Loading records");

        let mut report = LoadReport::default();
        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let raw = std::str::from_utf8(&buf).map_err(|e| {
                warn!(line = line_no, applied = report.records, error = %e, "Invalid record");
                QuickfillError::decode(line_no, report.records, e.to_string())
            })?;
            let raw = strip_line_ending(raw);
            if raw.trim().is_empty() {
                report.blank_lines += 1;
                continue;
            }

            let item = Item::from_json(raw, kind).map_err(|e| {
                warn!(line = line_no, applied = report.records, error = %e, "Invalid record");
                QuickfillError::decode(line_no, report.records, e.to_string())
            })?;

            report.prefixes += self.apply(&collection, &item, raw)?;
            report.records += 1;

            if self.config.progress_interval > 0
                && report.records % self.config.progress_interval == 0
            {
                debug!(records = report.records, "Loading progress");
            }
        }

        report.elapsed = start.elapsed();
        info!(
            records = report.records,
            prefixes = report.prefixes,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Load complete"
        );
        Ok(report)
    }

    /// Write one record. Returns the number of prefixes indexed.
    fn apply(&self, collection: &Collection<'_>, item: &Item, raw: &str) -> Result<u64> {
        collection.put_record(&item.id, raw)?;

        let prefixes = prefixes_for_phrase(&item.term);
        for prefix in &prefixes {
            collection.index_prefix(prefix, &item.id, item.rank)?;
        }
        Ok(prefixes.len() as u64)
    }
}

/// Drop a trailing `\n` or `\r\n`.
fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
