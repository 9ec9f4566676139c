use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PlayerError {
    #[error("invalid bsr id: {0:?}")]
    InvalidBsrId(String),

    #[error("BeatSaver request failed: {0}")]
    CatalogHttp(String),

    #[error("BeatSaver returned status {status}: {message}")]
    CatalogStatus { status: u16, message: String },

    #[error("unexpected BeatSaver response: {0}")]
    CatalogResponse(String),

    #[error("download failed: {0}")]
    DownloadHttp(String),

    #[error("download returned status {status}: {message}")]
    DownloadStatus { status: u16, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("failed to encode mp3: {0}")]
    Encode(String),

    #[error("audio output error: {0}")]
    Playback(String),
}
