#[path = "common/mod.rs"]
mod common;

use common::{posts_csv, posts_xml, write_file};
use mapred::jobs::{ColumnIndex, SelectQuery, SqlSelect};
use mapred::{InputFormat, MapReduce};
use std::path::Path;

fn unanswered() -> Vec<Vec<String>> {
    vec![
        vec!["Open question".into(), "5".into(), "100".into(), "1".into()],
        vec!["Lists, sets and maps".into(), "3".into(), "42".into(), "2".into()],
    ]
}

/// The default query (`SELECT Title, Score, ViewCount, CommentCount WHERE AnswerCount = 0`)
/// over a CSV table: only unanswered posts come out; the header row and the row with an
/// empty AnswerCount never do.
#[test]
fn select_unanswered_posts_from_csv() {
    let tmp = tempfile::tempdir().unwrap();
    let table = write_file(tmp.path(), "Posts.csv", posts_csv());
    let columns = ColumnIndex::from_csv_header(Path::new(&table), b',').unwrap();
    assert_eq!(columns.len(), 6);
    let job = SqlSelect::for_csv(&columns, SelectQuery::default()).unwrap();

    let out = MapReduce::new().run([&table], &job, &job, InputFormat::CsvSkipFirstLine).unwrap();
    assert_eq!(out.items(), unanswered());
    // Keys are the AnswerCount values seen: "0" and "2" (the empty one emits nothing).
    assert_eq!(out.stats().intermediate_keys, 2);
    assert_eq!(
        out.lines(InputFormat::CsvSkipFirstLine).unwrap(),
        ["Open question\t5\t100\t1", "Lists, sets and maps\t3\t42\t2"]
    );
}

/// The same query over a StackExchange `Posts.xml` dump selects the same rows.
#[test]
fn select_unanswered_posts_from_xml_dump() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = write_file(tmp.path(), "Posts.xml", posts_xml());
    let job = SqlSelect::for_xml_rows(SelectQuery::default());

    let out = MapReduce::new().run([&dump], &job, &job, InputFormat::XmlRows).unwrap();
    assert_eq!(out.into_items(), unanswered());
}

/// Column names match case-insensitively and a byte-order mark on the header is ignored.
#[test]
fn custom_query_with_loose_column_names() {
    let tmp = tempfile::tempdir().unwrap();
    let table = write_file(tmp.path(), "Posts.csv", &format!("\u{feff}{}", posts_csv()));
    let columns = ColumnIndex::from_csv_header(Path::new(&table), b',').unwrap();
    let query = SelectQuery { columns: vec!["id".into(), "TITLE".into()], where_column: "answercount".into(), equals: "2".into() };
    let job = SqlSelect::for_csv(&columns, query).unwrap();
    assert_eq!(job.query().equals, "2");

    let out = MapReduce::new().run([&table], &job, &job, InputFormat::CsvSkipFirstLine).unwrap();
    assert_eq!(out.into_items(), vec![vec!["p2".to_string(), "Answered question".to_string()]]);
}

/// Unknown column names are configuration errors raised before the job runs.
#[test]
fn unknown_column_is_configuration_error() {
    let columns = ColumnIndex::new(["Id", "Title", "AnswerCount"]);

    let bad_select = SelectQuery { columns: vec!["Title".into(), "Votes".into()], ..SelectQuery::default() };
    let err = SqlSelect::for_csv(&columns, bad_select).unwrap_err();
    assert!(err.is_configuration(), "unexpected error: {err}");
    assert!(err.to_string().contains("Votes"));

    let bad_where = SelectQuery { columns: vec!["Title".into()], where_column: "Closed".into(), equals: "1".into() };
    assert!(SqlSelect::for_csv(&columns, bad_where).unwrap_err().is_configuration());
}

/// A value nobody has yields an empty result, not an error.
#[test]
fn no_matching_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let table = write_file(tmp.path(), "Posts.csv", posts_csv());
    let columns = ColumnIndex::from_csv_header(Path::new(&table), b',').unwrap();
    let query = SelectQuery { equals: "99".into(), ..SelectQuery::default() };
    let job = SqlSelect::for_csv(&columns, query).unwrap();

    let out = MapReduce::new().run([&table], &job, &job, InputFormat::CsvSkipFirstLine).unwrap();
    assert!(out.is_empty());
    assert_eq!(out.stats().reduce_calls, 2);
}
