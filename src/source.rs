//! Record source: turns an ordered list of sources plus a format tag into a lazy stream of
//! `(source_id, RawRecord)`, one source at a time and in file order within each source.

use crate::config::{InputFormat, JobOptions};
use crate::error::JobError;
use crate::reader::{open_buffered, LineReader};
use crate::record::{ImageRecord, RawRecord};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Tag of the XML elements whose attributes become records.
pub const ROW_TAG: &str = "row";

type Records = Box<dyn Iterator<Item = Result<RawRecord, JobError>>>;

/// Lazy record stream over all sources. Stops after the first error.
pub struct RecordSource {
    sources: std::vec::IntoIter<String>,
    format: InputFormat,
    read_buf: usize,
    delimiter: u8,
    current: Option<(String, Records)>,
    failed: bool,
}

impl RecordSource {
    pub fn new<I, S>(sources: I, format: InputFormat, opts: &JobOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sources: Vec<String> = sources.into_iter().map(Into::into).collect();
        Self {
            sources: sources.into_iter(),
            format,
            read_buf: opts.read_buffer_bytes,
            delimiter: opts.csv_delimiter,
            current: None,
            failed: false,
        }
    }

    /// Same as `new`, but with the format given as its textual tag. An unknown tag fails here,
    /// before any source is touched.
    pub fn from_tag<I, S>(sources: I, tag: &str, opts: &JobOptions) -> Result<Self, JobError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let format: InputFormat = tag.parse()?;
        Ok(Self::new(sources, format, opts))
    }

    pub fn format(&self) -> InputFormat {
        self.format
    }

    fn open_source(&self, source_id: &str) -> Result<Records, JobError> {
        let path = Path::new(source_id);
        let records: Records = match self.format {
            InputFormat::Text => Box::new(text_records(source_id, self.line_reader(path, source_id)?)),
            InputFormat::Json => Box::new(json_records(source_id, self.line_reader(path, source_id)?)),
            InputFormat::Csv => Box::new(self.csv_records(path, source_id, false)?),
            InputFormat::CsvSkipFirstLine => Box::new(self.csv_records(path, source_id, true)?),
            InputFormat::Image => Box::new(std::iter::once(read_image(path, source_id))),
            InputFormat::XmlRows => Box::new(read_xml_rows(path, source_id)?.into_iter().map(Ok::<_, JobError>)),
        };
        Ok(records)
    }

    fn line_reader(&self, path: &Path, source_id: &str) -> Result<LineReader, JobError> {
        LineReader::open(path, self.read_buf).map_err(|e| JobError::parse(source_id, None, e))
    }

    fn csv_records(
        &self,
        path: &Path,
        source_id: &str,
        skip_first: bool,
    ) -> Result<impl Iterator<Item = Result<RawRecord, JobError>>, JobError> {
        let rdr = open_buffered(path, self.read_buf).map_err(|e| JobError::parse(source_id, None, e))?;
        let csv_rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(rdr);
        let source_id = source_id.to_string();
        let rows = csv_rdr.into_records().map(move |row| match row {
            Ok(rec) => Ok(RawRecord::CsvRow(rec.iter().map(str::to_string).collect())),
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize);
                Err(JobError::parse(source_id.as_str(), line, e))
            }
        });
        Ok(rows.skip(usize::from(skip_first)))
    }
}

impl Iterator for RecordSource {
    type Item = Result<(String, RawRecord), JobError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some((source_id, records)) = self.current.as_mut() {
                match records.next() {
                    Some(Ok(rec)) => return Some(Ok((source_id.clone(), rec))),
                    Some(Err(e)) => {
                        self.failed = true;
                        self.current = None;
                        return Some(Err(e));
                    }
                    None => self.current = None,
                }
            }
            let source_id = self.sources.next()?;
            tracing::debug!(source = %source_id, format = %self.format, "opening source");
            match self.open_source(&source_id) {
                Ok(records) => self.current = Some((source_id, records)),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn text_records(source_id: &str, lines: LineReader) -> impl Iterator<Item = Result<RawRecord, JobError>> {
    let source_id = source_id.to_string();
    lines.map(move |line| match line {
        Ok((_, text)) => Ok(RawRecord::Line(text)),
        Err((n, e)) => Err(JobError::parse(source_id.as_str(), Some(n), e)),
    })
}

/// One JSON document per line; blank lines are skipped.
fn json_records(source_id: &str, lines: LineReader) -> impl Iterator<Item = Result<RawRecord, JobError>> {
    let source_id = source_id.to_string();
    lines.filter_map(move |line| match line {
        Ok((_, text)) if text.trim().is_empty() => None,
        Ok((n, text)) => Some(
            serde_json::from_str::<Value>(&text)
                .map(RawRecord::Json)
                .map_err(|e| JobError::parse(source_id.as_str(), Some(n), e)),
        ),
        Err((n, e)) => Some(Err(JobError::parse(source_id.as_str(), Some(n), e))),
    })
}

fn read_image(path: &Path, source_id: &str) -> Result<RawRecord, JobError> {
    let img = image::open(path).map_err(|e| JobError::parse(source_id, None, e))?;
    Ok(RawRecord::Image(ImageRecord::from_dynamic(source_id, img)))
}

/// Attribute maps of every `<row>` directly under the document root.
fn read_xml_rows(path: &Path, source_id: &str) -> Result<Vec<RawRecord>, JobError> {
    let text = fs::read_to_string(path).map_err(|e| JobError::parse(source_id, None, e))?;
    let doc = roxmltree::Document::parse(&text)
        .map_err(|e| JobError::parse(source_id, Some(e.pos().row as usize), e))?;
    let rows = doc
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == ROW_TAG)
        .map(|n| {
            let attrs: BTreeMap<String, String> =
                n.attributes().map(|a| (a.name().to_string(), a.value().to_string())).collect();
            RawRecord::Attributes(attrs)
        })
        .collect();
    Ok(rows)
}
