//! Serialization of a finished job's result items, one line per item.
//! JSON jobs get compact JSON documents; every other format gets the plain text form.

use crate::config::InputFormat;
use crate::error::JobError;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// How result items are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Text,
}

impl Encoding {
    /// JSON jobs render JSON; every other input format renders plain text.
    pub fn for_format(format: InputFormat) -> Self {
        match format {
            InputFormat::Json => Encoding::Json,
            _ => Encoding::Text,
        }
    }
}

/// Counters gathered while a job runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JobStats {
    pub sources: usize,
    pub records: u64,
    pub intermediate_keys: usize,
    pub intermediate_values: usize,
    pub reduce_calls: usize,
    pub results: usize,
}

/// Results of one completed execution.
#[derive(Clone, Debug)]
pub struct JobOutput<O> {
    pub(crate) items: Vec<O>,
    pub(crate) stats: JobStats,
}

impl<O> JobOutput<O> {
    pub fn items(&self) -> &[O] {
        &self.items
    }

    pub fn into_items(self) -> Vec<O> {
        self.items
    }

    pub fn stats(&self) -> JobStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<O: Serialize> JobOutput<O> {
    /// Render every item in the encoding `format` calls for.
    pub fn lines(&self, format: InputFormat) -> Result<Vec<String>, JobError> {
        self.lines_as(Encoding::for_format(format))
    }

    /// Render every item. Fails before producing anything if one item cannot be serialized.
    pub fn lines_as(&self, encoding: Encoding) -> Result<Vec<String>, JobError> {
        self.items
            .iter()
            .map(|item| match encoding {
                Encoding::Json => render_json(item),
                Encoding::Text => render_text(item),
            })
            .collect()
    }

    pub fn write_to<W: Write>(&self, w: &mut W, format: InputFormat) -> Result<(), JobError> {
        self.write_as(w, Encoding::for_format(format))
    }

    /// Write all lines to `w`. Nothing is written if rendering fails.
    pub fn write_as<W: Write>(&self, w: &mut W, encoding: Encoding) -> Result<(), JobError> {
        let lines = self.lines_as(encoding)?;
        for line in &lines {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
        }
        w.flush()?;
        Ok(())
    }
}

fn unserializable(e: serde_json::Error) -> JobError {
    JobError::configuration(format!("result item cannot be serialized: {e}"))
}

/// Compact JSON document. Struct fields keep their declaration order.
pub fn render_json<T: Serialize + ?Sized>(item: &T) -> Result<String, JobError> {
    serde_json::to_string(item).map_err(unserializable)
}

/// Plain text form: strings unquoted, sequences tab-separated, everything nested as
/// compact JSON. `("sat", 2)` renders as `sat\t2`.
pub fn render_text<T: Serialize + ?Sized>(item: &T) -> Result<String, JobError> {
    let text = match serde_json::to_value(item).map_err(unserializable)? {
        Value::Array(elems) => elems.iter().map(scalar_text).collect::<Vec<_>>().join("\t"),
        other => scalar_text(&other),
    };
    Ok(text)
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
