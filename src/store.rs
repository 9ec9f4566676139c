use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::Config;
use crate::domain::{BsrId, MP3_EXTENSION, mp3_file_name};
use crate::error::PlayerError;
use crate::fs_util::sorted_files;

/// On-disk layout: a flat cache of converted songs plus a scratch root with
/// one workspace per id being processed.
#[derive(Debug, Clone)]
pub struct MusicStore {
    cache_dir: Utf8PathBuf,
    scratch_root: Utf8PathBuf,
}

impl MusicStore {
    pub fn new(config: &Config) -> Self {
        Self {
            cache_dir: config.cache_dir.clone(),
            scratch_root: config.scratch_root.clone(),
        }
    }

    pub fn cache_dir(&self) -> &Utf8Path {
        &self.cache_dir
    }

    pub fn scratch_root(&self) -> &Utf8Path {
        &self.scratch_root
    }

    pub fn ensure_dirs(&self) -> Result<(), PlayerError> {
        for dir in [&self.scratch_root, &self.cache_dir] {
            fs::create_dir_all(dir.as_std_path())
                .map_err(|err| PlayerError::Filesystem(format!("create {dir}: {err}")))?;
        }
        Ok(())
    }

    /// First cached file (by name) that starts with the id and ends in `.mp3`.
    pub fn locate(&self, id: &BsrId) -> Result<Option<Utf8PathBuf>, PlayerError> {
        let suffix = format!(".{MP3_EXTENSION}");
        let matches = sorted_files(&self.cache_dir, |name| {
            name.starts_with(id.as_str()) && name.ends_with(&suffix)
        })?;
        Ok(matches.into_iter().next())
    }

    pub fn mp3_path(&self, id: &BsrId, name: &str) -> Utf8PathBuf {
        self.cache_dir.join(mp3_file_name(id, name))
    }

    pub fn workspace_dir(&self, id: &BsrId) -> Utf8PathBuf {
        self.scratch_root.join(id.as_str())
    }

    pub fn create_workspace(&self, id: &BsrId) -> Result<Workspace, PlayerError> {
        let path = self.workspace_dir(id);
        fs::create_dir_all(path.as_std_path())
            .map_err(|err| PlayerError::Filesystem(format!("create {path}: {err}")))?;
        Ok(Workspace {
            path,
            removed: false,
        })
    }
}

/// Scratch directory for one pipeline run.
///
/// Removed by [`Workspace::remove`] or, failing that, when dropped.
#[derive(Debug)]
pub struct Workspace {
    path: Utf8PathBuf,
    removed: bool,
}

impl Workspace {
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn remove(mut self) -> Result<(), PlayerError> {
        self.removed = true;
        remove_dir_if_exists(&self.path)
            .map_err(|err| PlayerError::Filesystem(format!("remove {}: {err}", self.path)))
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(err) = remove_dir_if_exists(&self.path) {
            tracing::warn!(path = %self.path, error = %err, "failed to remove workspace");
        }
    }
}

fn remove_dir_if_exists(path: &Utf8Path) -> io::Result<()> {
    match fs::remove_dir_all(path.as_std_path()) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
