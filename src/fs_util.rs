use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::PlayerError;

/// Regular files directly inside `dir` accepted by `filter`, sorted by name.
///
/// A missing directory yields an empty list. Non-UTF-8 names are skipped.
pub fn sorted_files<F>(dir: &Utf8Path, filter: F) -> Result<Vec<Utf8PathBuf>, PlayerError>
where
    F: Fn(&str) -> bool,
{
    let entries = match fs::read_dir(dir.as_std_path()) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(PlayerError::Filesystem(format!("read dir {dir}: {err}")));
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| PlayerError::Filesystem(err.to_string()))?;
        let is_file = entry
            .file_type()
            .map_err(|err| PlayerError::Filesystem(err.to_string()))?
            .is_file();
        if !is_file {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if filter(&name) {
            files.push(dir.join(name));
        }
    }
    files.sort();
    Ok(files)
}

/// Writes `content` next to `path` and moves it into place in one rename.
pub fn write_file_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), PlayerError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."));
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| PlayerError::Filesystem(err.to_string()))?;
    let mut temp = tempfile::Builder::new()
        .prefix(".bsr-player")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| PlayerError::Filesystem(err.to_string()))?;
    temp.write_all(content)
        .map_err(|err| PlayerError::Filesystem(err.to_string()))?;
    temp.persist(path.as_std_path())
        .map_err(|err| PlayerError::Filesystem(err.to_string()))?;
    Ok(())
}
