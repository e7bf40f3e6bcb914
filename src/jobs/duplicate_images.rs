//! Duplicate image detection: images with identical pixel content land on the same reducer.
//! The key is a SHA-256 fingerprint of the dimensions, sample layout and samples at native
//! depth; the value is the image's source. Only groups of two or more are reported.

use crate::emit::{Collector, Emitter};
use crate::engine::{Mapper, Reducer};
use crate::record::{ImageRecord, RawRecord};
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Read an image list: one path per line, blank lines ignored.
pub fn load_image_list(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("read image list {}", path.display()))?;
    Ok(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
}

/// Hex SHA-256 over everything that defines the decoded picture.
pub fn fingerprint(img: &ImageRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(img.width.to_le_bytes());
    hasher.update(img.height.to_le_bytes());
    hasher.update([img.channels, img.bytes_per_sample]);
    hasher.update(&img.samples);
    format!("{:x}", hasher.finalize())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DuplicateImages;

impl Mapper<String, String> for DuplicateImages {
    fn map(&self, _source_id: &str, record: RawRecord, out: &mut Emitter<String, String>) -> Result<()> {
        let img = record.as_image()?;
        out.emit_intermediate(fingerprint(img), img.source.clone());
        Ok(())
    }
}

impl Reducer<String, String, Vec<String>> for DuplicateImages {
    fn reduce(&self, _key: &String, values: Vec<String>, out: &mut Collector<Vec<String>>) -> Result<()> {
        if values.len() > 1 {
            out.emit(values);
        }
        Ok(())
    }
}
