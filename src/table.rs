use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Mutex;

use csv::StringRecord;
use lazy_static::lazy_static;

use crate::error::Result;

lazy_static! {
    /// Fixed export schema. Positional: the exported CSV has no other field
    /// naming, so row construction must honor this order.
    pub static ref COLUMNS: StringRecord = StringRecord::from(vec![
        "id",
        "keyword",
        "tags",
        "type",
        "duration",
        "filesize",
        "samplerate",
        "bitdepth",
        "channels",
    ]);
}

/// One resolved sample, shaped to the export schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    fields: Vec<String>,
}

impl MetadataRow {
    /// Concatenates the base fields with the description values extracted
    /// from the detail page, padded or truncated to the column count so the
    /// positional schema holds even when a page's description block is
    /// shorter or longer than usual.
    pub fn new(id: &str, keyword: &str, tags: &[String], info: Vec<String>) -> Self {
        let mut fields = Vec::with_capacity(COLUMNS.len());
        fields.push(id.to_string());
        fields.push(keyword.to_string());
        fields.push(tags.join(","));
        fields.extend(info);
        fields.resize(COLUMNS.len(), String::new());
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Insert-only table of resolved samples, keyed by keyword then rank.
///
/// One entry per keyword is created up front, before any item is dispatched.
/// Ranks are assigned at discovery time by the search walker, so concurrent
/// resolvers never contend on the same `(keyword, rank)` slot; the lock only
/// guards the container itself. Failed resolutions leave their rank absent.
pub struct Accumulator {
    tables: Mutex<HashMap<String, BTreeMap<usize, MetadataRow>>>,
}

impl Accumulator {
    pub fn new<I>(keywords: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let tables = keywords
            .into_iter()
            .map(|k| (k, BTreeMap::new()))
            .collect();
        Self {
            tables: Mutex::new(tables),
        }
    }

    /// Records a resolved row. A keyword that was not declared at setup is
    /// a logged no-op.
    pub fn put(&self, keyword: &str, rank: usize, row: MetadataRow) {
        let mut tables = self.tables.lock().unwrap();
        match tables.get_mut(keyword) {
            Some(table) => {
                table.insert(rank, row);
            }
            None => log::warn!("dropping row for undeclared keyword {keyword:?}"),
        }
    }

    /// Number of rows collected so far for one keyword.
    pub fn len(&self, keyword: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(keyword)
            .map(|t| t.len())
            .unwrap_or(0)
    }

    /// Ranks currently present for one keyword, ascending.
    pub fn ranks(&self, keyword: &str) -> Vec<usize> {
        self.tables
            .lock()
            .unwrap()
            .get(keyword)
            .map(|t| t.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Writes `<out_root>/<keyword>/metadata.csv` for every keyword, rows
    /// ordered by ascending rank under the fixed header. Called exactly once
    /// per run, after the pipeline has drained.
    pub fn export(&self, out_root: &Path) -> Result<()> {
        let tables = self.tables.lock().unwrap();
        for (keyword, table) in tables.iter() {
            let path = out_root.join(keyword).join("metadata.csv");
            let mut wtr = csv::Writer::from_path(&path)?;
            wtr.write_record(&*COLUMNS)?;
            for row in table.values() {
                wtr.write_record(row.fields())?;
            }
            wtr.flush()?;
            log::info!(
                "exported {} rows for {keyword:?} to {}",
                table.len(),
                path.display()
            );
        }
        Ok(())
    }
}
