#![allow(dead_code)]

use image::{ImageBuffer, Luma, Rgb};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Read a file back as lines (without terminators).
pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
}

/// Write `contents` to `dir/name` (creating parent dirs) and return the path as a source id.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

/// Write a compressed `.zst` file containing the provided lines.
pub fn write_zst_lines(dir: &Path, name: &str, lines: &[&str]) -> String {
    let path = dir.join(name);
    let f = File::create(&path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
    path.to_string_lossy().into_owned()
}

/// Write a small RGB PNG where pixel (x, y) gets `color(x, y)`.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, color: impl Fn(u32, u32) -> [u8; 3]) -> String {
    let path = dir.join(name);
    let img = ImageBuffer::from_fn(width, height, |x, y| Rgb(color(x, y)));
    img.save(&path).unwrap();
    path.to_string_lossy().into_owned()
}

/// Write a 16-bit grayscale PNG with every pixel set to `value`.
pub fn write_png16(dir: &Path, name: &str, width: u32, height: u32, value: u16) -> String {
    let path = dir.join(name);
    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(width, height, Luma([value]));
    img.save(&path).unwrap();
    path.to_string_lossy().into_owned()
}

/// A tiny "Posts" table in the StackExchange column layout:
/// - p1 unanswered (AnswerCount = 0)
/// - p2 answered twice
/// - p3 has no AnswerCount at all (NULL)
/// - p4 unanswered, title contains a quoted comma
pub fn posts_csv() -> &'static str {
    "Id,Title,Score,ViewCount,AnswerCount,CommentCount\n\
     p1,Open question,5,100,0,1\n\
     p2,Answered question,9,300,2,4\n\
     p3,Wiki page,1,10,,0\n\
     p4,\"Lists, sets and maps\",3,42,0,2\n"
}

/// Same rows as `posts_csv`, as a StackExchange `Posts.xml` dump.
pub fn posts_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="utf-8"?>
<posts>
  <row Id="p1" Title="Open question" Score="5" ViewCount="100" AnswerCount="0" CommentCount="1" />
  <row Id="p2" Title="Answered question" Score="9" ViewCount="300" AnswerCount="2" CommentCount="4" />
  <row Id="p3" Title="Wiki page" Score="1" ViewCount="10" CommentCount="0" />
  <row Id="p4" Title="Lists, sets and maps" Score="3" ViewCount="42" AnswerCount="0" CommentCount="2" />
</posts>
"#
}

pub fn sorted<T: Ord>(mut v: Vec<T>) -> Vec<T> {
    v.sort();
    v
}
