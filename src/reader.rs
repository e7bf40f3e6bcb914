use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use zstd::stream::read::Decoder;

/// Open `path` as a buffered byte stream. `.zst` files are decompressed on the fly.
pub fn open_buffered(path: &Path, buf_bytes: usize) -> io::Result<Box<dyn BufRead>> {
    let f = File::open(path)?;
    let cap = buf_bytes.max(8 * 1024);
    if is_zstd(path) {
        let mut decoder = Decoder::new(f)?;
        // Large-window frames fail with "Frame requires too much memory" otherwise.
        decoder.window_log_max(31)?;
        Ok(Box::new(BufReader::with_capacity(cap, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(cap, f)))
    }
}

fn is_zstd(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("zst")).unwrap_or(false)
}

/// Line reader yielding `(line_number, line)` with 1-based numbers.
/// Strips trailing `\r?\n`; empty lines come back as empty strings.
pub struct LineReader {
    rdr: Box<dyn BufRead>,
    line_no: usize,
}

impl LineReader {
    pub fn open(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        Ok(Self::new(open_buffered(path, buf_bytes)?))
    }

    pub fn new(rdr: Box<dyn BufRead>) -> Self {
        Self { rdr, line_no: 0 }
    }

    /// Read the next line into `buf`. Returns the number of bytes read (0 on EOF).
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        buf.clear();
        let n = self.rdr.read_line(buf)?;
        if n == 0 { return Ok(0); }
        self.line_no += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') { buf.pop(); }
        }
        Ok(n)
    }

    /// Number of the line most recently returned (0 before the first read).
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

/// A failed read, tagged with the number of the line it happened on.
pub type LineError = (usize, io::Error);

impl Iterator for LineReader {
    type Item = Result<(usize, String), LineError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = String::new();
        match self.read_line(&mut buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok((self.line_no, buf))),
            Err(e) => {
                // Count the failed line so errors point at it.
                self.line_no += 1;
                Some(Err((self.line_no, e)))
            }
        }
    }
}
