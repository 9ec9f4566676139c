use std::fs;
use std::io::Write;
use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::{Utf8Path, Utf8PathBuf};
use zip::write::SimpleFileOptions;

use bsr_player::app::{ProgressEvent, ProgressSink};
use bsr_player::archive::ArchiveProcessor;
use bsr_player::audio::Transcoder;
use bsr_player::domain::BsrId;
use bsr_player::error::PlayerError;

#[derive(Default)]
struct CopyTranscoder {
    calls: Mutex<usize>,
}

impl Transcoder for CopyTranscoder {
    fn transcode(&self, source: &Utf8Path, destination: &Utf8Path) -> Result<(), PlayerError> {
        *self.calls.lock().unwrap() += 1;
        fs::copy(source.as_std_path(), destination.as_std_path())
            .map_err(|err| PlayerError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

struct Quiet;

impl ProgressSink for Quiet {
    fn event(&self, _event: ProgressEvent) {}
}

struct Fixture {
    _temp: tempfile::TempDir,
    workspace: Utf8PathBuf,
    archive: Utf8PathBuf,
    target: Utf8PathBuf,
}

fn fixture(entries: &[(&str, &str)]) -> Fixture {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let workspace = root.join("temp").join("1234");
    fs::create_dir_all(workspace.as_std_path()).unwrap();
    let archive = workspace.join("1234.zip");

    let file = fs::File::create(archive.as_std_path()).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, content) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, SimpleFileOptions::default())
                .unwrap();
            continue;
        }
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();

    Fixture {
        _temp: temp,
        workspace,
        target: root.join("1234_Song.mp3"),
        archive,
    }
}

fn id() -> BsrId {
    "1234".parse().unwrap()
}

#[test]
fn renames_song_and_extracts_everything() {
    let fx = fixture(&[
        ("Info.dat", "{}"),
        ("cover.jpg", "jpeg"),
        ("song.egg", "ogg"),
    ]);
    let transcoder = CopyTranscoder::default();

    let result = ArchiveProcessor::new(&transcoder)
        .process(&fx.archive, &fx.workspace, &id(), &fx.target, &Quiet)
        .unwrap();

    assert_eq!(result, Some(fx.target.clone()));
    assert!(fx.workspace.join("Info.dat").exists());
    assert!(fx.workspace.join("cover.jpg").exists());
    assert!(fx.workspace.join("1234.ogg").exists());
    assert!(!fx.workspace.join("song.egg").exists());
    assert_eq!(fs::read(fx.target.as_std_path()).unwrap(), b"ogg");
}

#[test]
fn missing_song_is_not_an_error() {
    let fx = fixture(&[("notes.txt", "nothing to hear")]);
    let transcoder = CopyTranscoder::default();

    let result = ArchiveProcessor::new(&transcoder)
        .process(&fx.archive, &fx.workspace, &id(), &fx.target, &Quiet)
        .unwrap();

    assert_eq!(result, None);
    assert_eq!(*transcoder.calls.lock().unwrap(), 0);
    assert!(!fx.target.exists());
}

#[test]
fn only_top_level_songs_count() {
    let fx = fixture(&[("extras/", ""), ("extras/preview.egg", "ogg")]);
    let transcoder = CopyTranscoder::default();

    let result = ArchiveProcessor::new(&transcoder)
        .process(&fx.archive, &fx.workspace, &id(), &fx.target, &Quiet)
        .unwrap();

    assert_eq!(result, None);
    assert!(fx.workspace.join("extras").join("preview.egg").exists());
}

#[test]
fn extra_songs_are_ignored() {
    let fx = fixture(&[("z.egg", "last"), ("m.egg", "middle"), ("a.egg", "first")]);
    let transcoder = CopyTranscoder::default();

    ArchiveProcessor::new(&transcoder)
        .process(&fx.archive, &fx.workspace, &id(), &fx.target, &Quiet)
        .unwrap();

    assert_eq!(*transcoder.calls.lock().unwrap(), 1);
    assert_eq!(fs::read(fx.target.as_std_path()).unwrap(), b"first");
    assert!(fx.workspace.join("m.egg").exists());
    assert!(fx.workspace.join("z.egg").exists());
}

#[test]
fn unreadable_archive_is_an_error() {
    let fx = fixture(&[]);
    fs::write(fx.archive.as_std_path(), b"PK\x03\x04 truncated").unwrap();
    let transcoder = CopyTranscoder::default();

    let err = ArchiveProcessor::new(&transcoder)
        .process(&fx.archive, &fx.workspace, &id(), &fx.target, &Quiet)
        .unwrap_err();
    assert_matches!(err, PlayerError::Archive(_));
}

#[test]
fn entries_escaping_the_workspace_are_rejected() {
    let fx = fixture(&[("../escape.egg", "ogg")]);
    let transcoder = CopyTranscoder::default();

    let err = ArchiveProcessor::new(&transcoder)
        .process(&fx.archive, &fx.workspace, &id(), &fx.target, &Quiet)
        .unwrap_err();

    assert_matches!(err, PlayerError::Archive(_));
    assert!(!fx.workspace.parent().unwrap().join("escape.egg").exists());
    assert_eq!(*transcoder.calls.lock().unwrap(), 0);
}

#[test]
fn nested_folders_are_recreated() {
    let fx = fixture(&[("Info.dat", "{}"), ("lights/v3/Expert.dat", "[]"), ("song.egg", "ogg")]);
    let transcoder = CopyTranscoder::default();

    ArchiveProcessor::new(&transcoder)
        .process(&fx.archive, &fx.workspace, &id(), &fx.target, &Quiet)
        .unwrap();

    let nested = fx.workspace.join("lights").join("v3").join("Expert.dat");
    assert_eq!(fs::read(nested.as_std_path()).unwrap(), b"[]");
}
