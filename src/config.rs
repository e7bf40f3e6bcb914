use crate::error::JobError;
use std::fmt;
use std::str::FromStr;

/// Input format tag: selects how each source is decoded into records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputFormat {
    Csv,
    CsvSkipFirstLine,
    Text,
    Json,
    Image,
    XmlRows,
}

impl InputFormat {
    pub const ALL: [InputFormat; 6] = [
        InputFormat::Csv,
        InputFormat::CsvSkipFirstLine,
        InputFormat::Text,
        InputFormat::Json,
        InputFormat::Image,
        InputFormat::XmlRows,
    ];

    /// Canonical tag as accepted by `FromStr`.
    pub fn tag(self) -> &'static str {
        match self {
            InputFormat::Csv => "CSV",
            InputFormat::CsvSkipFirstLine => "CSV-SkipFirstLine",
            InputFormat::Text => "TEXT",
            InputFormat::Json => "JSON",
            InputFormat::Image => "IMAGE",
            InputFormat::XmlRows => "STRUCTURED-XML-ROWS",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for InputFormat {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CSV" => Ok(InputFormat::Csv),
            "CSV-SkipFirstLine" => Ok(InputFormat::CsvSkipFirstLine),
            "TEXT" => Ok(InputFormat::Text),
            "JSON" => Ok(InputFormat::Json),
            "IMAGE" => Ok(InputFormat::Image),
            // SOXML: StackExchange dumps keep every record as attributes of <row>.
            "STRUCTURED-XML-ROWS" | "SOXML" => Ok(InputFormat::XmlRows),
            other => Err(JobError::Configuration(format!("unknown input format tag {other:?}"))),
        }
    }
}

/// Per-job options with builder chaining. Nothing here changes the map/reduce semantics;
/// only how sources are read and how the phases are scheduled.
#[derive(Clone, Debug)]
pub struct JobOptions {
    pub parallelism: Option<usize>,   // Some(N) to size the rayon pool, None for rayon's default
    pub progress: bool,               // show progress bars
    pub progress_label: Option<String>,
    pub read_buffer_bytes: usize,     // BufReader capacity
    pub csv_delimiter: u8,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            parallelism: None,
            progress: false,
            progress_label: None,
            read_buffer_bytes: 64 * 1024,
            csv_delimiter: b',',
        }
    }
}

impl JobOptions {
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = if threads == 0 { None } else { Some(threads) };
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_csv_delimiter(mut self, delimiter: u8) -> Self {
        self.csv_delimiter = delimiter;
        self
    }
}
