// JSON clip storage adapter - One `{video_name}.json` document per video

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

const CLIP_FILE_EXTENSION: &str = ".json";

/// On-disk clip object
#[derive(Debug, Serialize, Deserialize)]
struct ClipRecord {
    positions: [f64; 2],
    #[serde(default, skip_serializing_if = "String::is_empty")]
    comment: String,
}

/// Accepted element shapes: the object form, or a bare `[start, end]` pair
/// written by early versions.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredClip {
    Record(ClipRecord),
    Legacy([f64; 2]),
}

impl StoredClip {
    fn into_clip(self) -> Result<Clip, DomainError> {
        let (positions, comment) = match self {
            StoredClip::Record(record) => (record.positions, record.comment),
            StoredClip::Legacy(positions) => (positions, String::new()),
        };
        let range = ClipRange::new(positions[0], positions[1])?;
        Ok(Clip::with_comment(range, comment))
    }
}

/// Parse a clip document into clips, in file order
pub fn parse_clip_document(content: &str) -> Result<Vec<Clip>, DomainError> {
    let stored: Vec<StoredClip> = serde_json::from_str(content)
        .map_err(|e| DomainError::MalformedClipFile(e.to_string()))?;

    stored
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            s.into_clip()
                .map_err(|e| DomainError::MalformedClipFile(format!("element {}: {}", i, e)))
        })
        .collect()
}

/// Render clips as a clip document
pub fn render_clip_document(clips: &[Clip], save_comments: bool) -> Result<String, DomainError> {
    let records: Vec<ClipRecord> = clips
        .iter()
        .map(|clip| ClipRecord {
            positions: [clip.start(), clip.end()],
            comment: if save_comments {
                clip.comment().to_string()
            } else {
                String::new()
            },
        })
        .collect();

    serde_json::to_string(&records).map_err(|e| DomainError::Persistence(e.to_string()))
}

/// Clip storage backed by a directory of JSON files
pub struct JsonClipStorage {
    dir: PathBuf,
    save_comments: bool,
}

impl JsonClipStorage {
    /// Create a storage adapter; the directory is created lazily on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            save_comments: true,
        }
    }

    /// Drop comments from written documents, producing positions-only files
    pub fn without_comments(mut self) -> Self {
        self.save_comments = false;
        self
    }

    /// Path of a video's clip file
    pub fn clip_file_path(&self, video_name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", video_name, CLIP_FILE_EXTENSION))
    }
}

impl ClipStoragePort for JsonClipStorage {
    fn list_video_names(&self) -> Result<Vec<String>, DomainError> {
        if !self.dir.is_dir() {
            debug!(dir = %self.dir.display(), "Clip storage directory does not exist yet");
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|e| {
            DomainError::NotFound(format!(
                "Cannot read clip directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut file_names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(CLIP_FILE_EXTENSION))
            .collect();
        file_names.sort();

        Ok(file_names
            .into_iter()
            .map(|name| name[..name.len() - CLIP_FILE_EXTENSION.len()].to_string())
            .collect())
    }

    fn read_clips(&self, video_name: &str) -> Result<Option<Vec<Clip>>, DomainError> {
        let path = self.clip_file_path(video_name);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            DomainError::MalformedClipFile(format!("{}: {}", path.display(), e))
        })?;
        let clips = parse_clip_document(&content).map_err(|e| match e {
            DomainError::MalformedClipFile(msg) => {
                DomainError::MalformedClipFile(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        debug!(video = %video_name, clips = clips.len(), "Read clip file");
        Ok(Some(clips))
    }

    fn write_clips(&self, video_name: &str, clips: &[Clip]) -> Result<(), DomainError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            DomainError::Persistence(format!(
                "Failed to create clip directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let document = render_clip_document(clips, self.save_comments)?;
        let path = self.clip_file_path(video_name);

        // Write beside the target and rename so a failed write never truncates it
        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| DomainError::Persistence(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(document.as_bytes())
            .map_err(|e| DomainError::Persistence(format!("Failed to write clips: {}", e)))?;
        temp.persist(&path).map_err(|e| {
            DomainError::Persistence(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        info!(video = %video_name, clips = clips.len(), path = %path.display(), "Saved clips");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}
