//! Word count over TEXT sources, skipping a caller-supplied list of common words.
//!
//! Mapper: one line in, `(word, 1)` out for every word not in the stop list.
//! Reducer: `(word, occurrences)`.

use crate::emit::{Collector, Emitter};
use crate::engine::{Mapper, Reducer};
use crate::record::RawRecord;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Words that must not be counted. Loaded once before the job and captured by the mapper.
#[derive(Clone, Debug, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { words: words.into_iter().map(Into::into).collect() }
    }

    /// Every whitespace-separated token of the file is a stop word.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("read common words {}", path.display()))?;
        Ok(Self::new(text.split_whitespace().map(str::to_string)))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn lowercased(&self) -> Self {
        Self { words: self.words.iter().map(|w| w.to_lowercase()).collect() }
    }
}

#[derive(Clone, Debug)]
pub struct WordCount {
    stop_words: StopWords,
    splitter: Option<Regex>,
}

impl WordCount {
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words, splitter: None }
    }

    /// Case-fold words and split on anything that is not a letter, digit or apostrophe,
    /// so `The`, `the` and `the,` count as one word. Stop words are folded the same way.
    pub fn normalized(mut self) -> Self {
        self.splitter = Some(Regex::new(r"[^\p{L}\p{N}']+").expect("static word pattern"));
        self.stop_words = self.stop_words.lowercased();
        self
    }

    fn words<'a>(&'a self, line: &'a str) -> Box<dyn Iterator<Item = String> + 'a> {
        match &self.splitter {
            Some(re) => Box::new(
                re.split(line)
                    .map(|w| w.trim_matches('\'').to_lowercase())
                    .filter(|w| !w.is_empty()),
            ),
            None => Box::new(line.split_whitespace().map(str::to_string)),
        }
    }
}

impl Mapper<String, u64> for WordCount {
    fn map(&self, _source_id: &str, record: RawRecord, out: &mut Emitter<String, u64>) -> Result<()> {
        let line = record.as_line()?;
        for word in self.words(line) {
            if !self.stop_words.contains(&word) {
                out.emit_intermediate(word, 1);
            }
        }
        Ok(())
    }
}

impl Reducer<String, u64, (String, u64)> for WordCount {
    fn reduce(&self, key: &String, values: Vec<u64>, out: &mut Collector<(String, u64)>) -> Result<()> {
        out.emit((key.clone(), values.iter().sum()));
        Ok(())
    }
}
