//! Single-table selection: `SELECT cols FROM t WHERE col = value`.
//!
//! Mapper: key is the WHERE column's value, value is the selected columns. Rows with an
//! empty (NULL) WHERE column emit nothing.
//! Reducer: emits the selected columns of every row only for the key equal to the
//! requested value.
//!
//! Works on CSV tables (run with CSV-SkipFirstLine; the header is read beforehand into a
//! `ColumnIndex`) and on StackExchange XML dumps, where columns are `<row>` attributes.

use crate::emit::{Collector, Emitter};
use crate::engine::{Mapper, Reducer};
use crate::error::JobError;
use crate::reader::open_buffered;
use crate::record::RawRecord;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Column name -> position, matched case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let positions = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (normalize_column(name.as_ref()), i))
            .collect();
        Self { positions }
    }

    /// Read the first row of a CSV file as the header.
    pub fn from_csv_header(path: &Path, delimiter: u8) -> Result<Self> {
        let rdr = open_buffered(path, 64 * 1024).with_context(|| format!("open {}", path.display()))?;
        let mut csv_rdr = csv::ReaderBuilder::new().has_headers(true).delimiter(delimiter).from_reader(rdr);
        let headers = csv_rdr.headers().with_context(|| format!("read header of {}", path.display()))?;
        Ok(Self::new(headers.iter()))
    }

    pub fn position(&self, column: &str) -> Result<usize, JobError> {
        self.positions
            .get(&normalize_column(column))
            .copied()
            .ok_or_else(|| JobError::configuration(format!("unknown column {column:?}")))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn normalize_column(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectQuery {
    pub columns: Vec<String>,
    pub where_column: String,
    pub equals: String,
}

impl Default for SelectQuery {
    /// Unanswered questions: `SELECT Title, Score, ViewCount, CommentCount FROM Posts WHERE AnswerCount = 0`.
    fn default() -> Self {
        Self {
            columns: ["Title", "Score", "ViewCount", "CommentCount"].map(String::from).to_vec(),
            where_column: "AnswerCount".to_string(),
            equals: "0".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
enum Columns {
    /// CSV: positions resolved against the header.
    Indexed { select: Vec<usize>, filter: usize },
    /// XML rows: columns are attribute names.
    Named,
}

#[derive(Clone, Debug)]
pub struct SqlSelect {
    query: SelectQuery,
    columns: Columns,
}

impl SqlSelect {
    /// Resolve the query's columns against a CSV header. Unknown columns fail here, before
    /// the job runs.
    pub fn for_csv(index: &ColumnIndex, query: SelectQuery) -> Result<Self, JobError> {
        let select = query.columns.iter().map(|c| index.position(c)).collect::<Result<Vec<_>, _>>()?;
        let filter = index.position(&query.where_column)?;
        Ok(Self { query, columns: Columns::Indexed { select, filter } })
    }

    /// Columns are looked up by attribute name on each `<row>`.
    pub fn for_xml_rows(query: SelectQuery) -> Self {
        Self { query, columns: Columns::Named }
    }

    pub fn query(&self) -> &SelectQuery {
        &self.query
    }

    fn project(&self, record: &RawRecord) -> Result<Option<(String, Vec<String>)>> {
        let (key, selected) = match (&self.columns, record) {
            (Columns::Indexed { select, filter }, RawRecord::CsvRow(_)) => {
                let key = record.field(*filter)?.trim().to_string();
                let selected = select.iter().map(|&i| record.field(i).map(str::to_string)).collect::<Result<Vec<_>, _>>()?;
                (key, selected)
            }
            (Columns::Named, RawRecord::Attributes(attrs)) => {
                // Attribute missing on a row is the same as an empty column.
                let key = attrs.get(&self.query.where_column).map(|s| s.trim().to_string()).unwrap_or_default();
                let selected = self.query.columns.iter().map(|c| attrs.get(c).cloned().unwrap_or_default()).collect();
                (key, selected)
            }
            (Columns::Indexed { .. }, other) => return Err(JobError::configuration(format!("expected a csv row, got a {}", other.kind())).into()),
            (Columns::Named, other) => return Err(JobError::configuration(format!("expected an attribute map, got a {}", other.kind())).into()),
        };
        if key.is_empty() {
            return Ok(None);
        }
        Ok(Some((key, selected)))
    }
}

impl Mapper<String, Vec<String>> for SqlSelect {
    fn map(&self, _source_id: &str, record: RawRecord, out: &mut Emitter<String, Vec<String>>) -> Result<()> {
        if let Some((key, selected)) = self.project(&record)? {
            out.emit_intermediate(key, selected);
        }
        Ok(())
    }
}

impl Reducer<String, Vec<String>, Vec<String>> for SqlSelect {
    fn reduce(&self, key: &String, values: Vec<Vec<String>>, out: &mut Collector<Vec<String>>) -> Result<()> {
        if *key == self.query.equals {
            for row in values {
                out.emit(row);
            }
        }
        Ok(())
    }
}
