use camino::Utf8Path;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStreamBuilder, Sink};

use crate::audio::decode_file;
use crate::error::PlayerError;

pub trait Player {
    /// Plays the file at `path` to completion.
    fn play(&self, path: &Utf8Path) -> Result<(), PlayerError>;
}

impl<T: Player + ?Sized> Player for &T {
    fn play(&self, path: &Utf8Path) -> Result<(), PlayerError> {
        (**self).play(path)
    }
}

/// Default output device through rodio.
#[derive(Debug, Clone, Copy, Default)]
pub struct RodioPlayer;

impl Player for RodioPlayer {
    fn play(&self, path: &Utf8Path) -> Result<(), PlayerError> {
        let audio = decode_file(path)?;

        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|err| PlayerError::Playback(err.to_string()))?;
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());

        tracing::debug!(
            %path,
            frames = audio.frames(),
            sample_rate = audio.sample_rate,
            "starting playback"
        );
        sink.append(SamplesBuffer::new(
            audio.channels,
            audio.sample_rate,
            audio.samples,
        ));
        sink.sleep_until_end();
        Ok(())
    }
}
