#[path = "common/mod.rs"]
mod common;

use common::{sorted, write_file};
use mapred::jobs::{StopWords, WordCount};
use mapred::{InputFormat, MapReduce};

/// Classic word count round trip:
/// - lines "the cat sat" / "the dog sat", stop words {the}
/// - the intermediate store holds cat, sat, dog with sat -> [1, 1]
/// - the reducer output set is {(cat,1), (dog,1), (sat,2)}
#[test]
fn word_count_groups_and_sums() {
    let tmp = tempfile::tempdir().unwrap();
    let src = write_file(tmp.path(), "lines.txt", "the cat sat\nthe dog sat\n");
    let job = WordCount::new(StopWords::new(["the"]));
    let mr = MapReduce::new();

    let store = mr.intermediate([&src], &job, InputFormat::Text).unwrap();
    let keys: Vec<&String> = store.keys().collect();
    assert_eq!(keys, ["cat", "sat", "dog"], "keys come out in first-emission order");
    assert_eq!(store.get("cat"), Some(&[1u64][..]));
    assert_eq!(store.get("dog"), Some(&[1u64][..]));
    assert_eq!(store.get("sat"), Some(&[1u64, 1][..]));
    assert!(store.get("the").is_none(), "stop words are never emitted");
    assert_eq!(store.value_count(), 4);

    let out = mr.run([&src], &job, &job, InputFormat::Text).unwrap();
    assert_eq!(
        sorted(out.items().to_vec()),
        vec![("cat".to_string(), 1), ("dog".to_string(), 1), ("sat".to_string(), 2)]
    );
    assert_eq!(out.stats().reduce_calls, 3);
    assert_eq!(out.stats().records, 2);
}

/// Text output renders each (word, count) pair as `word<TAB>count`, in reducer order.
#[test]
fn word_count_text_lines() {
    let tmp = tempfile::tempdir().unwrap();
    let src = write_file(tmp.path(), "lines.txt", "the cat sat\nthe dog sat\n");
    let job = WordCount::new(StopWords::new(["the"]));

    let out = MapReduce::new().run([&src], &job, &job, InputFormat::Text).unwrap();
    assert_eq!(out.lines(InputFormat::Text).unwrap(), ["cat\t1", "sat\t2", "dog\t1"]);
}

/// Counts accumulate across sources, and the stop-word file is whitespace separated.
#[test]
fn word_count_across_sources_with_stop_word_file() {
    let tmp = tempfile::tempdir().unwrap();
    let a = write_file(tmp.path(), "a.txt", "a rose is a rose\n");
    let b = write_file(tmp.path(), "b.txt", "is a rose\n\n");
    let stop = write_file(tmp.path(), "common.txt", "a\nis\n");

    let stop_words = StopWords::load(std::path::Path::new(&stop)).unwrap();
    assert_eq!(stop_words.len(), 2);
    let job = WordCount::new(stop_words);

    let out = MapReduce::new().run([&a, &b], &job, &job, InputFormat::Text).unwrap();
    assert_eq!(out.items(), [("rose".to_string(), 3)]);
    assert_eq!(out.stats().sources, 2);
    assert_eq!(out.stats().records, 3, "the blank line is still a record");
}

/// Normalized counting folds case and strips punctuation, for words and stop words alike.
#[test]
fn word_count_normalized() {
    let tmp = tempfile::tempdir().unwrap();
    let src = write_file(tmp.path(), "lines.txt", "The cat, the CAT!\nDon't stop.\n");
    let job = WordCount::new(StopWords::new(["THE"])).normalized();

    let out = MapReduce::new().run([&src], &job, &job, InputFormat::Text).unwrap();
    assert_eq!(
        sorted(out.into_items()),
        vec![("cat".to_string(), 2), ("don't".to_string(), 1), ("stop".to_string(), 1)]
    );
}

/// Running the same job twice over the same input serializes identically.
#[test]
fn word_count_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let src = write_file(tmp.path(), "lines.txt", "x y z\nz y x\nq\n");
    let job = WordCount::new(StopWords::default());
    let mr = MapReduce::new();

    let first = mr.run([&src], &job, &job, InputFormat::Text).unwrap().lines(InputFormat::Text).unwrap();
    let second = mr.run([&src], &job, &job, InputFormat::Text).unwrap().lines(InputFormat::Text).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, ["x\t2", "y\t2", "z\t2", "q\t1"]);
}

/// The parallel driver produces exactly the sequential output, order included.
#[test]
fn word_count_parallel_matches_sequential() {
    let tmp = tempfile::tempdir().unwrap();
    let sources: Vec<String> = (0..8)
        .map(|i| {
            let body: String = (0..50).map(|j| format!("w{} w{} shared\n", (i * j) % 7, j % 5)).collect();
            write_file(tmp.path(), &format!("part-{i}.txt"), &body)
        })
        .collect();
    let job = WordCount::new(StopWords::new(["w0"]));

    let seq = MapReduce::new().run(&sources, &job, &job, InputFormat::Text).unwrap();
    let par = MapReduce::new().parallelism(4).run_parallel(&sources, &job, &job, InputFormat::Text).unwrap();
    assert_eq!(seq.items(), par.items());
    assert_eq!(seq.stats(), par.stats());
}
