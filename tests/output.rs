use mapred::{render_json, render_text, Encoding, InputFormat};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct Row {
    name: &'static str,
    tags: Vec<&'static str>,
}

/// Plain text form: bare strings, tab-joined sequences, nested containers as compact JSON.
#[test]
fn text_rendering_rules() {
    assert_eq!(render_text("plain words").unwrap(), "plain words");
    assert_eq!(render_text(&42).unwrap(), "42");
    assert_eq!(render_text(&None::<u8>).unwrap(), "null");
    assert_eq!(render_text(&("sat", 2)).unwrap(), "sat\t2");
    assert_eq!(render_text(&vec!["a", "b", "c"]).unwrap(), "a\tb\tc");
    assert_eq!(render_text(&("k", vec![1, 2], true)).unwrap(), "k\t[1,2]\ttrue");

    let mut map = BTreeMap::new();
    map.insert("b", 2);
    map.insert("a", 1);
    assert_eq!(render_text(&map).unwrap(), r#"{"a":1,"b":2}"#);
}

/// JSON form: one compact document, struct fields in declaration order.
#[test]
fn json_rendering_is_compact() {
    let row = Row { name: "x", tags: vec!["p", "q"] };
    assert_eq!(render_json(&row).unwrap(), r#"{"name":"x","tags":["p","q"]}"#);
    assert_eq!(render_json(&("sat", 2)).unwrap(), r#"["sat",2]"#);
    assert_eq!(render_json("quoted").unwrap(), r#""quoted""#);
}

/// Only JSON jobs serialize as JSON by default.
#[test]
fn encoding_follows_input_format() {
    for format in InputFormat::ALL {
        let expected = if format == InputFormat::Json { Encoding::Json } else { Encoding::Text };
        assert_eq!(Encoding::for_format(format), expected, "{format}");
    }
}
