pub mod app;
pub mod archive;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod fs_util;
pub mod output;
pub mod playback;
pub mod store;
