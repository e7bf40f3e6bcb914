//! Raw records handed to mappers. The shape depends on the job's input format; the engine
//! never looks inside.

use crate::error::JobError;
use image::DynamicImage;
use serde_json::Value;
use std::collections::BTreeMap;

/// One decoded input record.
#[derive(Clone, Debug, PartialEq)]
pub enum RawRecord {
    /// CSV / CSV-SkipFirstLine: the row's fields in column order.
    CsvRow(Vec<String>),
    /// TEXT: one line without its terminator.
    Line(String),
    /// JSON: one decoded document per input line.
    Json(Value),
    /// IMAGE: one record per image source.
    Image(ImageRecord),
    /// STRUCTURED-XML-ROWS: the attributes of one `<row>` element.
    Attributes(BTreeMap<String, String>),
}

impl RawRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            RawRecord::CsvRow(_) => "csv row",
            RawRecord::Line(_) => "text line",
            RawRecord::Json(_) => "json document",
            RawRecord::Image(_) => "image",
            RawRecord::Attributes(_) => "attribute map",
        }
    }

    fn mismatch(&self, wanted: &str) -> JobError {
        JobError::configuration(format!("expected a {wanted} record, got a {}", self.kind()))
    }

    pub fn as_fields(&self) -> Result<&[String], JobError> {
        match self {
            RawRecord::CsvRow(fields) => Ok(fields),
            other => Err(other.mismatch("csv row")),
        }
    }

    /// Field `idx` of a CSV row. Out-of-range indices are a configuration error: the job
    /// expects columns the input does not have.
    pub fn field(&self, idx: usize) -> Result<&str, JobError> {
        let fields = self.as_fields()?;
        fields.get(idx).map(String::as_str).ok_or_else(|| {
            JobError::configuration(format!("field {idx} requested but the row has {} fields", fields.len()))
        })
    }

    pub fn as_line(&self) -> Result<&str, JobError> {
        match self {
            RawRecord::Line(line) => Ok(line),
            other => Err(other.mismatch("text line")),
        }
    }

    pub fn as_json(&self) -> Result<&Value, JobError> {
        match self {
            RawRecord::Json(v) => Ok(v),
            other => Err(other.mismatch("json document")),
        }
    }

    pub fn as_image(&self) -> Result<&ImageRecord, JobError> {
        match self {
            RawRecord::Image(img) => Ok(img),
            other => Err(other.mismatch("image")),
        }
    }

    pub fn as_attributes(&self) -> Result<&BTreeMap<String, String>, JobError> {
        match self {
            RawRecord::Attributes(attrs) => Ok(attrs),
            other => Err(other.mismatch("attribute map")),
        }
    }

    /// Attribute `name` of an XML row.
    pub fn attr(&self, name: &str) -> Result<&str, JobError> {
        self.as_attributes()?
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| JobError::configuration(format!("row has no attribute {name:?}")))
    }
}

/// Decoded raster image: the source it came from plus its pixels as a flat, row-major
/// buffer at the image's native depth. Each pixel is `channels` samples of
/// `bytes_per_sample` bytes (native endian for 16-bit and float layouts).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRecord {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub bytes_per_sample: u8,
    pub samples: Vec<u8>,
}

impl ImageRecord {
    /// Keeps the decoded color layout as is; nothing is narrowed or converted.
    pub fn from_dynamic(source: impl Into<String>, img: DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        let color = img.color();
        let channels = color.channel_count();
        let bytes_per_sample = color.bytes_per_pixel() / channels.max(1);
        Self {
            source: source.into(),
            width,
            height,
            channels,
            bytes_per_sample,
            samples: img.into_bytes(),
        }
    }

    /// Bytes making up one pixel.
    pub fn pixel_width(&self) -> usize {
        (self.channels as usize * self.bytes_per_sample as usize).max(1)
    }

    /// Each pixel's channel tuple as raw bytes, in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.samples.chunks_exact(self.pixel_width())
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
