use crate::config::{InputFormat, JobOptions};
use crate::emit::{Collector, Emitter};
use crate::error::{JobError, Phase};
use crate::output::{JobOutput, JobStats};
use crate::paths::expand_sources;
use crate::progress::ProgressScope;
use crate::record::RawRecord;
use crate::source::RecordSource;
use crate::util::init_tracing_once;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;
use std::io;

/// Map callback: receives one record and emits zero or more intermediate pairs.
pub trait Mapper<K, V> {
    fn map(&self, source_id: &str, record: RawRecord, out: &mut Emitter<K, V>) -> anyhow::Result<()>;
}

impl<K, V, F> Mapper<K, V> for F
where
    F: Fn(&str, RawRecord, &mut Emitter<K, V>) -> anyhow::Result<()>,
{
    fn map(&self, source_id: &str, record: RawRecord, out: &mut Emitter<K, V>) -> anyhow::Result<()> {
        self(source_id, record, out)
    }
}

/// Reduce callback: receives one key with every value emitted for it, emits zero or more results.
pub trait Reducer<K, V, O> {
    fn reduce(&self, key: &K, values: Vec<V>, out: &mut Collector<O>) -> anyhow::Result<()>;
}

impl<K, V, O, F> Reducer<K, V, O> for F
where
    F: Fn(&K, Vec<V>, &mut Collector<O>) -> anyhow::Result<()>,
{
    fn reduce(&self, key: &K, values: Vec<V>, out: &mut Collector<O>) -> anyhow::Result<()> {
        self(key, values, out)
    }
}

/// Pins a closure to the `Mapper` signature so its argument types are inferred.
pub fn map_fn<K, V, F>(f: F) -> F
where
    F: Fn(&str, RawRecord, &mut Emitter<K, V>) -> anyhow::Result<()>,
{
    f
}

/// Pins a closure to the `Reducer` signature so its argument types are inferred.
pub fn reduce_fn<K, V, O, F>(f: F) -> F
where
    F: Fn(&K, Vec<V>, &mut Collector<O>) -> anyhow::Result<()>,
{
    f
}

/// The job runner. Holds only options; every run gets a fresh intermediate store and
/// result collector which are dropped when the run ends.
#[derive(Clone, Debug, Default)]
pub struct MapReduce {
    pub(crate) opts: JobOptions,
}

impl MapReduce {
    pub fn new() -> Self {
        Self { opts: JobOptions::default() }
    }

    pub fn with_options(opts: JobOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &JobOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn csv_delimiter(mut self, delimiter: u8) -> Self { self.opts = self.opts.with_csv_delimiter(delimiter); self }

    // -------- Sequential execution --------

    /// Run the job and print every result line to stdout.
    pub fn execute<K, V, O, M, R, I, S>(
        &self,
        sources: I,
        mapper: &M,
        reducer: &R,
        format: InputFormat,
    ) -> Result<(), JobError>
    where
        K: Hash + Eq + Clone + Debug,
        O: Serialize,
        M: Mapper<K, V>,
        R: Reducer<K, V, O>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let out = self.run(sources, mapper, reducer, format)?;
        out.write_to(&mut io::stdout().lock(), format)
    }

    /// `execute` with the format given as its tag (`"CSV"`, `"JSON"`, ...).
    /// An unknown tag fails before any source is opened.
    pub fn execute_tagged<K, V, O, M, R, I, S>(
        &self,
        sources: I,
        mapper: &M,
        reducer: &R,
        tag: &str,
    ) -> Result<(), JobError>
    where
        K: Hash + Eq + Clone + Debug,
        O: Serialize,
        M: Mapper<K, V>,
        R: Reducer<K, V, O>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let format: InputFormat = tag.parse()?;
        self.execute(sources, mapper, reducer, format)
    }

    /// Run the job and return its results instead of printing them.
    pub fn run<K, V, O, M, R, I, S>(
        &self,
        sources: I,
        mapper: &M,
        reducer: &R,
        format: InputFormat,
    ) -> Result<JobOutput<O>, JobError>
    where
        K: Hash + Eq + Clone + Debug,
        M: Mapper<K, V>,
        R: Reducer<K, V, O>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        init_tracing_once();
        let sources = self.plan_sources(sources, format)?;
        let (store, mut stats) = self.map_phase(&sources, mapper, format)?;
        let items = self.reduce_phase(store, reducer, &mut stats)?;
        Ok(JobOutput { items, stats })
    }

    /// `run` with the format given as its tag.
    pub fn run_tagged<K, V, O, M, R, I, S>(
        &self,
        sources: I,
        mapper: &M,
        reducer: &R,
        tag: &str,
    ) -> Result<JobOutput<O>, JobError>
    where
        K: Hash + Eq + Clone + Debug,
        M: Mapper<K, V>,
        R: Reducer<K, V, O>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let format: InputFormat = tag.parse()?;
        self.run(sources, mapper, reducer, format)
    }

    /// Map phase only: the grouped intermediate state a reduce phase would receive.
    pub fn intermediate<K, V, M, I, S>(&self, sources: I, mapper: &M, format: InputFormat) -> Result<Emitter<K, V>, JobError>
    where
        K: Hash + Eq + Clone + Debug,
        M: Mapper<K, V>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        init_tracing_once();
        let sources = self.plan_sources(sources, format)?;
        Ok(self.map_phase(&sources, mapper, format)?.0)
    }

    fn plan_sources<I, S>(&self, sources: I, format: InputFormat) -> Result<Vec<String>, JobError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sources = expand_sources(sources)?;
        if sources.is_empty() {
            tracing::warn!("No sources given; the job will produce no output.");
        } else {
            tracing::info!("Planned {} {} sources.", sources.len(), format);
        }
        Ok(sources)
    }

    fn map_phase<K, V, M>(&self, sources: &[String], mapper: &M, format: InputFormat) -> Result<(Emitter<K, V>, JobStats), JobError>
    where
        K: Hash + Eq + Clone + Debug,
        M: Mapper<K, V>,
    {
        let pb = ProgressScope::count(self.opts.progress, &self.label("Map"), sources.len() as u64);
        let mut store = Emitter::new();
        let mut records: u64 = 0;
        let mut last_source: Option<String> = None;

        for item in RecordSource::new(sources.iter().cloned(), format, &self.opts) {
            let (source_id, record) = item.inspect_err(|_| pb.abandon())?;
            if last_source.as_deref() != Some(source_id.as_str()) {
                if last_source.is_some() { pb.inc(1); }
                last_source = Some(source_id.clone());
            }
            records += 1;
            mapper.map(&source_id, record, &mut store).map_err(|e| {
                pb.abandon();
                JobError::from_callback(Phase::Map, format!("source {source_id}"), e)
            })?;
        }
        pb.set_position(sources.len() as u64);
        pb.finish("Map: done");

        let stats = JobStats {
            sources: sources.len(),
            records,
            intermediate_keys: store.len(),
            intermediate_values: store.value_count(),
            ..Default::default()
        };
        tracing::info!(
            records = stats.records,
            keys = stats.intermediate_keys,
            values = stats.intermediate_values,
            "map phase complete"
        );
        Ok((store, stats))
    }

    fn reduce_phase<K, V, O, R>(&self, store: Emitter<K, V>, reducer: &R, stats: &mut JobStats) -> Result<Vec<O>, JobError>
    where
        K: Hash + Eq + Clone + Debug,
        R: Reducer<K, V, O>,
    {
        let groups = store.into_groups();
        let pb = ProgressScope::count(self.opts.progress, &self.label("Reduce"), groups.len() as u64);
        let mut results = Collector::new();
        for (key, values) in groups {
            stats.reduce_calls += 1;
            reducer.reduce(&key, values, &mut results).map_err(|e| {
                pb.abandon();
                JobError::from_callback(Phase::Reduce, format!("key {key:?}"), e)
            })?;
            pb.inc(1);
        }
        pb.finish("Reduce: done");

        stats.results = results.len();
        tracing::info!(reduce_calls = stats.reduce_calls, results = stats.results, "reduce phase complete");
        Ok(results.into_items())
    }

    // -------- Parallel execution --------
    //
    // Sources are mapped concurrently, each into its own store; stores are merged in source
    // order once every mapper has finished. Keys are reduced concurrently, each into its own
    // collector; collectors are concatenated in key order. Output is identical to `run`.

    /// Parallel counterpart of `execute`.
    pub fn execute_parallel<K, V, O, M, R, I, S>(
        &self,
        sources: I,
        mapper: &M,
        reducer: &R,
        format: InputFormat,
    ) -> Result<(), JobError>
    where
        K: Hash + Eq + Clone + Debug + Send,
        V: Send,
        O: Serialize + Send,
        M: Mapper<K, V> + Sync,
        R: Reducer<K, V, O> + Sync,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let out = self.run_parallel(sources, mapper, reducer, format)?;
        out.write_to(&mut io::stdout().lock(), format)
    }

    /// Parallel counterpart of `run`.
    pub fn run_parallel<K, V, O, M, R, I, S>(
        &self,
        sources: I,
        mapper: &M,
        reducer: &R,
        format: InputFormat,
    ) -> Result<JobOutput<O>, JobError>
    where
        K: Hash + Eq + Clone + Debug + Send,
        V: Send,
        O: Send,
        M: Mapper<K, V> + Sync,
        R: Reducer<K, V, O> + Sync,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        init_tracing_once();
        let sources = self.plan_sources(sources, format)?;
        let (store, mut stats) = self.in_pool(|| self.map_phase_parallel(&sources, mapper, format))??;
        let items = self.in_pool(|| self.reduce_phase_parallel(store, reducer, &mut stats))??;
        Ok(JobOutput { items, stats })
    }

    fn in_pool<T, F>(&self, f: F) -> Result<T, JobError>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match self.opts.parallelism {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| JobError::configuration(format!("cannot build a {n}-thread pool: {e}")))?;
                Ok(pool.install(f))
            }
            None => Ok(f()),
        }
    }

    fn map_phase_parallel<K, V, M>(&self, sources: &[String], mapper: &M, format: InputFormat) -> Result<(Emitter<K, V>, JobStats), JobError>
    where
        K: Hash + Eq + Clone + Debug + Send,
        V: Send,
        M: Mapper<K, V> + Sync,
    {
        let pb = ProgressScope::count(self.opts.progress, &self.label("Map"), sources.len() as u64);

        let partials: Vec<Result<(Emitter<K, V>, u64), JobError>> = sources
            .par_iter()
            .map(|src| {
                let mut local = Emitter::new();
                let mut records: u64 = 0;
                for item in RecordSource::new([src.as_str()], format, &self.opts) {
                    let (source_id, record) = item?;
                    records += 1;
                    mapper
                        .map(&source_id, record, &mut local)
                        .map_err(|e| JobError::from_callback(Phase::Map, format!("source {source_id}"), e))?;
                }
                pb.inc(1);
                Ok((local, records))
            })
            .collect();

        // Barrier: every mapper has returned. Merge in source order; the first failing
        // source (in source order) decides the error.
        let mut store = Emitter::new();
        let mut records: u64 = 0;
        for part in partials {
            let (local, n) = part.inspect_err(|_| pb.abandon())?;
            records += n;
            store.merge(local);
        }
        pb.finish("Map: done");

        let stats = JobStats {
            sources: sources.len(),
            records,
            intermediate_keys: store.len(),
            intermediate_values: store.value_count(),
            ..Default::default()
        };
        tracing::info!(
            records = stats.records,
            keys = stats.intermediate_keys,
            values = stats.intermediate_values,
            "parallel map phase complete"
        );
        Ok((store, stats))
    }

    fn reduce_phase_parallel<K, V, O, R>(&self, store: Emitter<K, V>, reducer: &R, stats: &mut JobStats) -> Result<Vec<O>, JobError>
    where
        K: Hash + Eq + Clone + Debug + Send,
        V: Send,
        O: Send,
        R: Reducer<K, V, O> + Sync,
    {
        let groups = store.into_groups();
        let pb = ProgressScope::count(self.opts.progress, &self.label("Reduce"), groups.len() as u64);

        let parts: Vec<Result<Collector<O>, JobError>> = groups
            .into_par_iter()
            .map(|(key, values)| {
                let mut local = Collector::new();
                reducer
                    .reduce(&key, values, &mut local)
                    .map_err(|e| JobError::from_callback(Phase::Reduce, format!("key {key:?}"), e))?;
                pb.inc(1);
                Ok(local)
            })
            .collect();

        let mut results = Collector::new();
        for part in parts {
            stats.reduce_calls += 1;
            results.append(part.inspect_err(|_| pb.abandon())?);
        }
        pb.finish("Reduce: done");

        stats.results = results.len();
        tracing::info!(reduce_calls = stats.reduce_calls, results = stats.results, "parallel reduce phase complete");
        Ok(results.into_items())
    }

    fn label(&self, phase: &str) -> String {
        match &self.opts.progress_label {
            Some(l) => format!("{l}: {phase}"),
            None => phase.to_string(),
        }
    }
}
