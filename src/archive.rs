use std::fs::{self, File};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::app::{ProgressEvent, ProgressSink};
use crate::audio::Transcoder;
use crate::domain::{BsrId, EGG_EXTENSION, OGG_EXTENSION};
use crate::error::PlayerError;
use crate::fs_util::sorted_files;

pub struct ArchiveProcessor<'a, T: Transcoder> {
    transcoder: &'a T,
}

impl<'a, T: Transcoder> ArchiveProcessor<'a, T> {
    pub fn new(transcoder: &'a T) -> Self {
        Self { transcoder }
    }

    /// Extracts `archive` into `workspace` and converts the first `.egg`
    /// (by name) into `target`.
    ///
    /// `Ok(None)` means the bundle had no song; that is not an error.
    pub fn process(
        &self,
        archive: &Utf8Path,
        workspace: &Utf8Path,
        id: &BsrId,
        target: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<Option<Utf8PathBuf>, PlayerError> {
        let entries = self.unpack(archive, workspace)?;
        sink.event(ProgressEvent::detail(format!(
            "Extracted {entries} entries of {id} in {workspace}"
        )));

        let suffix = format!(".{EGG_EXTENSION}");
        let eggs = sorted_files(workspace, |name| name.ends_with(&suffix))?;
        let Some(egg) = eggs.into_iter().next() else {
            tracing::debug!(%workspace, "no song asset in archive");
            return Ok(None);
        };

        let ogg = workspace.join(format!("{}.{OGG_EXTENSION}", id.as_str()));
        fs::rename(egg.as_std_path(), ogg.as_std_path())
            .map_err(|err| PlayerError::Filesystem(format!("rename {egg}: {err}")))?;
        sink.event(ProgressEvent::detail(format!(
            "Renamed {} to {id}.{OGG_EXTENSION}",
            egg.file_name().unwrap_or(egg.as_str())
        )));

        self.transcoder.transcode(&ogg, target)?;
        sink.event(ProgressEvent::detail(format!(
            "Converted {id}.{OGG_EXTENSION} to {target}"
        )));
        Ok(Some(target.to_path_buf()))
    }

    /// Writes every file of `archive` below `workspace`, keeping the bundle's
    /// folder layout. Returns the number of files written.
    fn unpack(&self, archive: &Utf8Path, workspace: &Utf8Path) -> Result<usize, PlayerError> {
        let file = File::open(archive.as_std_path())
            .map_err(|err| PlayerError::Filesystem(format!("open {archive}: {err}")))?;
        let mut bundle = ZipArchive::new(file).map_err(archive_error)?;

        let mut written = 0;
        for index in 0..bundle.len() {
            let mut entry = bundle.by_index(index).map_err(archive_error)?;
            let Some(relative) = entry.enclosed_name() else {
                return Err(PlayerError::Archive(format!(
                    "entry {} points outside {workspace}",
                    entry.name()
                )));
            };
            let destination = workspace.as_std_path().join(relative);
            let directory = if entry.is_dir() {
                destination.as_path()
            } else {
                destination.parent().unwrap_or(workspace.as_std_path())
            };
            fs::create_dir_all(directory).map_err(|err| {
                PlayerError::Filesystem(format!("create {}: {err}", directory.display()))
            })?;
            if entry.is_dir() {
                continue;
            }

            let mut out = File::create(&destination).map_err(|err| {
                PlayerError::Filesystem(format!("create {}: {err}", destination.display()))
            })?;
            io::copy(&mut entry, &mut out).map_err(|err| {
                PlayerError::Archive(format!("inflate {}: {err}", entry.name()))
            })?;
            written += 1;
        }
        Ok(written)
    }
}

fn archive_error(err: ZipError) -> PlayerError {
    PlayerError::Archive(err.to_string())
}
