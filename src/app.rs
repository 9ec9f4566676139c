use camino::Utf8PathBuf;

use crate::archive::ArchiveProcessor;
use crate::audio::Transcoder;
use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::domain::BsrId;
use crate::error::PlayerError;
use crate::fetch::AssetFetcher;
use crate::playback::Player;
use crate::store::MusicStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Step,
    Detail,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub kind: EventKind,
    pub message: String,
}

impl ProgressEvent {
    pub fn step(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Step,
            message: message.into(),
        }
    }

    pub fn detail(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Detail,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Failure,
            message: message.into(),
        }
    }
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Played(Utf8PathBuf),
    NotPlayed,
}

pub struct App<C: CatalogClient, F: AssetFetcher, T: Transcoder, P: Player> {
    config: Config,
    store: MusicStore,
    catalog: C,
    fetcher: F,
    transcoder: T,
    player: P,
}

impl<C: CatalogClient, F: AssetFetcher, T: Transcoder, P: Player> App<C, F, T, P> {
    pub fn new(config: &Config, catalog: C, fetcher: F, transcoder: T, player: P) -> Self {
        Self {
            config: config.clone(),
            store: MusicStore::new(config),
            catalog,
            fetcher,
            transcoder,
            player,
        }
    }

    pub fn store(&self) -> &MusicStore {
        &self.store
    }

    /// Resolves `id` to a playable file, preferring the cache.
    ///
    /// Lookup and download failures are reported through `sink` and yield
    /// `Ok(None)`, as does a bundle without a song. The scratch workspace is
    /// gone by the time this returns, whatever the outcome.
    pub fn get_music(
        &self,
        id: &BsrId,
        sink: &dyn ProgressSink,
    ) -> Result<Option<Utf8PathBuf>, PlayerError> {
        self.store.ensure_dirs()?;

        if let Some(path) = self.store.locate(id)? {
            sink.event(ProgressEvent::step(format!("Found already {id}: {path}")));
            return Ok(Some(path));
        }

        let record = match self.catalog.resolve(id) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(%id, error = %err, "map lookup failed");
                sink.event(ProgressEvent::failure(format!(
                    "Failed to download {id} from {}",
                    self.config.lookup_url(id)
                )));
                return Ok(None);
            }
        };
        sink.event(ProgressEvent::step(format!("Fetched {id}: {}", record.name)));

        let target = self.store.mp3_path(id, &record.name);
        let workspace = self.store.create_workspace(id)?;
        let archive = workspace.path().join(format!("{id}.zip"));

        let converted = match self
            .fetcher
            .fetch(&record.download_url, archive.as_std_path())
        {
            Ok(bytes) => {
                sink.event(ProgressEvent::detail(format!(
                    "Downloaded {id} to {archive} ({bytes} bytes)"
                )));
                ArchiveProcessor::new(&self.transcoder).process(
                    &archive,
                    workspace.path(),
                    id,
                    &target,
                    sink,
                )?
            }
            Err(err) => {
                tracing::warn!(%id, url = %record.download_url, error = %err, "download failed");
                sink.event(ProgressEvent::failure(format!(
                    "Failed to download {id} from {}",
                    record.download_url
                )));
                None
            }
        };

        let workspace_path = workspace.path().to_path_buf();
        workspace.remove()?;
        sink.event(ProgressEvent::detail(format!(
            "Removed directory and contents: {workspace_path}"
        )));

        Ok(converted)
    }

    /// Runs [`App::get_music`] and plays the result. Decode and audio output
    /// errors propagate.
    pub fn play(&self, id: &BsrId, sink: &dyn ProgressSink) -> Result<PlayOutcome, PlayerError> {
        sink.event(ProgressEvent::step(format!("Playing music with bsr_id: {id}")));

        let music_path = self.get_music(id, sink)?;
        sink.event(ProgressEvent::detail(format!(
            "music_path: {}",
            music_path.as_ref().map_or("None", |path| path.as_str())
        )));

        match music_path {
            Some(path) => {
                self.player.play(&path)?;
                Ok(PlayOutcome::Played(path))
            }
            None => {
                sink.event(ProgressEvent::failure("Failed to play music"));
                Ok(PlayOutcome::NotPlayed)
            }
        }
    }
}
