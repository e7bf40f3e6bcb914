use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mapred::jobs::{
    load_image_list, ColumnIndex, DuplicateImages, MatrixMultiply, SelectQuery, SqlSelect, StopWords, WordCount,
};
use mapred::{init_tracing_once, Encoding, InputFormat, MapReduce, Mapper, Reducer};
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;
use std::io;
use std::path::PathBuf;

/// Run one of the MapReduce lab applications on local files.
#[derive(Parser, Debug)]
#[command(name = "mapred", version, about)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Map sources and reduce keys on N worker threads (0 = sequential)
    #[arg(long, global = true, default_value_t = 0)]
    parallel: usize,

    /// Show progress bars on stderr
    #[arg(long, global = true)]
    progress: bool,

    /// Print results as JSON lines whatever the input format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count words in text files, skipping common words
    WordCount {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// File of whitespace-separated words not to count
        #[arg(long)]
        common_words: Option<PathBuf>,
        /// Case-fold and strip punctuation before counting
        #[arg(long)]
        normalize: bool,
    },
    /// Multiply A (M x N) by B (N x P) given as `matrix,row,col,value` CSV cells
    MatrixMultiply {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// M: number of rows of A
        #[arg(long)]
        rows_a: usize,
        /// P: number of columns of B
        #[arg(long)]
        cols_b: usize,
    },
    /// Report groups of images with identical pixels
    DuplicateImages {
        /// File listing one image path per line
        image_list: PathBuf,
    },
    /// SELECT columns FROM a table WHERE one column equals a value
    SqlSelect {
        table: PathBuf,
        /// Columns to select
        #[arg(long, value_delimiter = ',', default_values_t = SelectQuery::default().columns)]
        select: Vec<String>,
        #[arg(long, default_value_t = SelectQuery::default().where_column)]
        where_column: String,
        #[arg(long, default_value_t = SelectQuery::default().equals)]
        equals: String,
        /// The table is a StackExchange XML dump instead of a CSV with a header row
        #[arg(long)]
        xml: bool,
    },
}

fn main() -> Result<()> {
    init_tracing_once();
    let cli = Cli::parse();

    match cli.command {
        Command::WordCount { inputs, common_words, normalize } => {
            let stop_words = match common_words {
                Some(path) => StopWords::load(&path)?,
                None => StopWords::default(),
            };
            tracing::info!("Loaded {} common words", stop_words.len());
            let mut job = WordCount::new(stop_words);
            if normalize {
                job = job.normalized();
            }
            run_job(&cli.run, &inputs, &job, InputFormat::Text)
        }
        Command::MatrixMultiply { inputs, rows_a, cols_b } => {
            let job = MatrixMultiply::new(rows_a, cols_b);
            run_job(&cli.run, &inputs, &job, InputFormat::Csv)
        }
        Command::DuplicateImages { image_list } => {
            let images: Vec<PathBuf> = load_image_list(&image_list)?.into_iter().map(PathBuf::from).collect();
            tracing::info!("Checking {} images", images.len());
            run_job(&cli.run, &images, &DuplicateImages, InputFormat::Image)
        }
        Command::SqlSelect { table, select, where_column, equals, xml } => {
            let query = SelectQuery { columns: select, where_column, equals };
            let tables = [table];
            if xml {
                let job = SqlSelect::for_xml_rows(query);
                run_job(&cli.run, &tables, &job, InputFormat::XmlRows)
            } else {
                let columns = ColumnIndex::from_csv_header(&tables[0], b',')?;
                let job = SqlSelect::for_csv(&columns, query)?;
                run_job(&cli.run, &tables, &job, InputFormat::CsvSkipFirstLine)
            }
        }
    }
}

fn run_job<K, V, O, J>(args: &RunArgs, inputs: &[PathBuf], job: &J, format: InputFormat) -> Result<()>
where
    K: Hash + Eq + Clone + Debug + Send,
    V: Send,
    O: Serialize + Send,
    J: Mapper<K, V> + Reducer<K, V, O> + Sync,
{
    let sources = inputs.iter().map(|p| p.to_string_lossy().into_owned());
    let mr = MapReduce::new().progress(args.progress).progress_label(format.tag()).parallelism(args.parallel);
    let out = if args.parallel > 0 {
        mr.run_parallel(sources, job, job, format)
    } else {
        mr.run(sources, job, job, format)
    }
    .with_context(|| format!("{format} job failed"))?;

    let encoding = if args.json { Encoding::Json } else { Encoding::for_format(format) };
    out.write_as(&mut io::stdout().lock(), encoding)?;
    Ok(())
}
