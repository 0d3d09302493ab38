// Walkdir scan adapter - Recursive video discovery

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::model::*;
use crate::ports::*;

/// Scanner that walks base directories for files with known video extensions
pub struct WalkdirScanner {
    extensions: Vec<String>,
}

impl WalkdirScanner {
    /// Create a scanner for the given extensions (without dots, any case)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    fn absolute(base: &Path) -> Option<PathBuf> {
        match base.canonicalize() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(dir = %base.display(), error = %e, "Skipping unreadable video directory");
                None
            }
        }
    }
}

impl Default for WalkdirScanner {
    fn default() -> Self {
        Self::new(["mp4", "avi"])
    }
}

impl VideoScanPort for WalkdirScanner {
    fn scan(&self, base_dirs: &[PathBuf]) -> VideoIndex {
        let mut index = VideoIndex::new();

        for base in base_dirs {
            let Some(root) = Self::absolute(base) else {
                continue;
            };

            for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        debug!(error = %e, "Skipping unreadable entry during scan");
                        continue;
                    }
                };

                if !entry.file_type().is_file() || !self.is_video(entry.path()) {
                    continue;
                }

                let name = entry.file_name().to_string_lossy().to_string();
                if let Some(previous) = index.insert(name.clone(), entry.path().to_path_buf()) {
                    warn!(
                        video = %name,
                        replaced = %previous.display(),
                        path = %entry.path().display(),
                        "Duplicate video name, keeping the last one found"
                    );
                }
            }
        }

        debug!(videos = index.len(), "Video scan complete");
        index
    }

    fn is_video(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}
