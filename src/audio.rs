use std::fs::File;
use std::io;

use camino::Utf8Path;
use mp3lame_encoder::{Builder, FlushNoGap, InterleavedPcm, MonoPcm, max_required_buffer_size};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::PlayerError;
use crate::fs_util::write_file_atomic;

// LAME needs at least this much room to flush its last frames.
const FLUSH_BUFFER_BYTES: usize = 7200;

/// Fully decoded track as interleaved `f32` samples in `-1.0..=1.0`.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }
}

/// Decodes the first audio track of `path`, picking the demuxer from the
/// file extension and content.
pub fn decode_file(path: &Utf8Path) -> Result<DecodedAudio, PlayerError> {
    let file = File::open(path.as_std_path())
        .map_err(|err| PlayerError::Decode(format!("open {path}: {err}")))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| PlayerError::Decode(format!("probe {path}: {err}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlayerError::Decode(format!("no audio track in {path}")))?;
    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|err| PlayerError::Decode(err.to_string()))?;

    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = 0u16;
    let mut samples = Vec::new();
    let mut buffer: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(err) => return Err(PlayerError::Decode(err.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if buffer.is_none() {
                    let spec = *decoded.spec();
                    sample_rate = spec.rate;
                    channels = spec.channels.count() as u16;
                    buffer = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                if let Some(buffer) = buffer.as_mut() {
                    buffer.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buffer.samples());
                }
            }
            Err(SymphoniaError::DecodeError(message)) => {
                tracing::warn!(%path, reason = message, "skipping undecodable packet");
            }
            Err(err) => return Err(PlayerError::Decode(err.to_string())),
        }
    }

    if samples.is_empty() || channels == 0 {
        return Err(PlayerError::Decode(format!("no audio frames in {path}")));
    }
    tracing::debug!(%path, sample_rate, channels, samples = samples.len(), "decoded");
    Ok(DecodedAudio {
        sample_rate,
        channels,
        samples,
    })
}

pub trait Transcoder {
    /// Converts the Ogg Vorbis file at `source` into an MP3 at `destination`.
    fn transcode(&self, source: &Utf8Path, destination: &Utf8Path) -> Result<(), PlayerError>;
}

impl<T: Transcoder + ?Sized> Transcoder for &T {
    fn transcode(&self, source: &Utf8Path, destination: &Utf8Path) -> Result<(), PlayerError> {
        (**self).transcode(source, destination)
    }
}

/// Ogg Vorbis → MP3 through symphonia and LAME with the encoder's default
/// bitrate and quality.
#[derive(Debug, Clone, Copy, Default)]
pub struct LameTranscoder;

impl Transcoder for LameTranscoder {
    fn transcode(&self, source: &Utf8Path, destination: &Utf8Path) -> Result<(), PlayerError> {
        let audio = decode_file(source)?;
        let mp3 = encode_mp3(&audio)?;
        write_file_atomic(destination, &mp3)
    }
}

pub fn encode_mp3(audio: &DecodedAudio) -> Result<Vec<u8>, PlayerError> {
    let channels = u8::try_from(audio.channels)
        .ok()
        .filter(|count| matches!(count, 1 | 2))
        .ok_or_else(|| {
            PlayerError::Encode(format!("unsupported channel count {}", audio.channels))
        })?;

    let mut builder = Builder::new()
        .ok_or_else(|| PlayerError::Encode("failed to allocate LAME encoder".to_string()))?;
    builder
        .set_num_channels(channels)
        .map_err(|err| PlayerError::Encode(format!("{err:?}")))?;
    builder
        .set_sample_rate(audio.sample_rate)
        .map_err(|err| PlayerError::Encode(format!("{err:?}")))?;
    let mut encoder = builder
        .build()
        .map_err(|err| PlayerError::Encode(format!("{err:?}")))?;

    let pcm = audio
        .samples
        .iter()
        .map(|sample| (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
        .collect::<Vec<_>>();

    let mut out = Vec::with_capacity(max_required_buffer_size(pcm.len()) + FLUSH_BUFFER_BYTES);
    let encoded = if channels == 1 {
        encoder.encode_to_vec(MonoPcm(&pcm), &mut out)
    } else {
        encoder.encode_to_vec(InterleavedPcm(&pcm), &mut out)
    };
    encoded.map_err(|err| PlayerError::Encode(format!("{err:?}")))?;

    out.reserve(FLUSH_BUFFER_BYTES);
    encoder
        .flush_to_vec::<FlushNoGap>(&mut out)
        .map_err(|err| PlayerError::Encode(format!("{err:?}")))?;
    Ok(out)
}
