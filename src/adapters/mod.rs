// Adapters - External system implementations

pub mod headless_engine;
pub mod json_storage;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod walkdir_scan;

// Re-export adapters
pub use headless_engine::HeadlessEngine;
pub use json_storage::JsonClipStorage;
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::{AppConfig, TomlConfigAdapter};
pub use walkdir_scan::WalkdirScanner;
