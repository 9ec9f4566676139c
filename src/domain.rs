use std::fmt;
use std::str::FromStr;

use crate::error::PlayerError;

/// Extension of cached, playable files.
pub const MP3_EXTENSION: &str = "mp3";
/// Extension BeatSaber maps use for their Ogg Vorbis song.
pub const EGG_EXTENSION: &str = "egg";
pub const OGG_EXTENSION: &str = "ogg";

const NAME_PREFIX_CHARS: usize = 20;

/// BeatSaver map key ("bsr id").
///
/// Treated as opaque. Parsing only rejects values that would not survive being
/// used as a single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsrId(String);

impl BsrId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BsrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BsrId {
    type Err = PlayerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let is_valid = !value.is_empty()
            && value != "."
            && value != ".."
            && !value
                .chars()
                .any(|ch| ch == '/' || ch == '\\' || ch.is_whitespace());
        if !is_valid {
            return Err(PlayerError::InvalidBsrId(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }
}

/// The part of a BeatSaver map document this tool consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub name: String,
    pub download_url: String,
}

/// Cache file name for a map: `{id}_{name prefix}.mp3`.
///
/// Spaces and slashes in the display name become underscores before the name
/// is cut to its first 20 characters.
pub fn mp3_file_name(id: &BsrId, name: &str) -> String {
    let prefix = name
        .chars()
        .map(|ch| if ch == ' ' || ch == '/' { '_' } else { ch })
        .take(NAME_PREFIX_CHARS)
        .collect::<String>();
    format!("{}_{prefix}.{MP3_EXTENSION}", id.as_str())
}
