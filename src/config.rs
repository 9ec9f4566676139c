use camino::Utf8PathBuf;

use crate::domain::BsrId;

pub const DEFAULT_CACHE_DIR: &str = "./musics";
pub const DEFAULT_SCRATCH_ROOT: &str = "./temp";
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://api.beatsaver.com";

/// Locations every pipeline component is constructed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Durable store of converted `.mp3` files.
    pub cache_dir: Utf8PathBuf,
    /// Parent of the per-id scratch workspaces.
    pub scratch_root: Utf8PathBuf,
    pub catalog_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: Utf8PathBuf::from(DEFAULT_CACHE_DIR),
            scratch_root: Utf8PathBuf::from(DEFAULT_SCRATCH_ROOT),
            catalog_base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
        }
    }
}

impl Config {
    pub fn new_with_paths(cache_dir: Utf8PathBuf, scratch_root: Utf8PathBuf) -> Self {
        Self {
            cache_dir,
            scratch_root,
            ..Self::default()
        }
    }

    pub fn lookup_url(&self, id: &BsrId) -> String {
        format!(
            "{}/maps/id/{}",
            self.catalog_base_url.trim_end_matches('/'),
            id.as_str()
        )
    }
}
