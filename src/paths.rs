use crate::error::JobError;
use std::path::Path;
use walkdir::WalkDir;

/// Expand directory sources into the regular files beneath them (sorted by path, hidden
/// files skipped). Plain file sources pass through untouched, even if they do not exist:
/// opening them is the record source's job.
pub fn expand_sources<I, S>(sources: I) -> Result<Vec<String>, JobError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    for src in sources {
        let src = src.as_ref();
        let path = Path::new(src);
        if !path.is_dir() {
            out.push(src.to_string());
            continue;
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(path).min_depth(1).sort_by_file_name() {
            let ent = entry.map_err(|e| JobError::parse(src, None, e))?;
            let hidden = ent.file_name().to_str().map(|n| n.starts_with('.')).unwrap_or(false);
            if ent.file_type().is_file() && !hidden {
                files.push(ent.path().to_string_lossy().into_owned());
            }
        }
        if files.is_empty() {
            tracing::warn!("source directory {} contains no files", path.display());
        }
        out.extend(files);
    }
    Ok(out)
}
