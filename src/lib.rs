mod config;
mod emit;
mod engine;
mod error;
mod output;
mod paths;
mod progress;
mod reader;
mod record;
mod source;
mod util;

pub mod jobs;

pub use crate::config::{InputFormat, JobOptions};
pub use crate::error::{JobError, Phase};
pub use crate::record::{ImageRecord, RawRecord};

// Engine: the job runner and the callback contract.
pub use crate::engine::{map_fn, reduce_fn, MapReduce, Mapper, Reducer};

// Emission primitives handed to mappers and reducers.
pub use crate::emit::{Collector, Emitter};

// Results and serialization.
pub use crate::output::{render_json, render_text, Encoding, JobOutput, JobStats};

// Record source, usable on its own to inspect what a mapper would receive.
pub use crate::source::{RecordSource, ROW_TAG};
pub use crate::paths::expand_sources;
pub use crate::reader::{LineError, LineReader};

// Tracing setup for binaries embedding the engine.
pub use crate::util::init_tracing_once;
