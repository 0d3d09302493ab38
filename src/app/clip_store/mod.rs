// Clip store - Ordered, persisted clip lists per video

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Outcome of loading every clip file in storage
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Videos whose clips were loaded
    pub loaded: Vec<String>,
    /// Clip files with no matching video in the index
    pub skipped: Vec<String>,
    /// Clip files that could not be read
    pub failed: Vec<(String, DomainError)>,
}

/// Outcome of persisting every known video
#[derive(Debug, Default)]
pub struct PersistReport {
    pub saved: Vec<String>,
    pub failed: Vec<(String, DomainError)>,
}

impl PersistReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns the video index and the clip lists of loaded videos.
///
/// Every clip list is kept sorted ascending by start after each mutation and
/// load, so callers can rely on list indices without re-sorting.
pub struct ClipStore {
    storage: Arc<dyn ClipStoragePort>,
    scanner: Arc<dyn VideoScanPort>,
    video_index: VideoIndex,
    entries: BTreeMap<String, VideoEntry>,
}

impl ClipStore {
    /// Create an empty store over injected ports
    pub fn new(storage: Arc<dyn ClipStoragePort>, scanner: Arc<dyn VideoScanPort>) -> Self {
        Self {
            storage,
            scanner,
            video_index: VideoIndex::new(),
            entries: BTreeMap::new(),
        }
    }

    /// Rebuild the video index from the base directories
    pub fn scan(&mut self, base_dirs: &[PathBuf]) -> &VideoIndex {
        self.video_index = self.scanner.scan(base_dirs);
        info!(
            videos = self.video_index.len(),
            dirs = base_dirs.len(),
            "Scanned video directories"
        );
        &self.video_index
    }

    /// Replace the video index directly
    pub fn set_video_index(&mut self, index: VideoIndex) {
        self.video_index = index;
    }

    pub fn video_index(&self) -> &VideoIndex {
        &self.video_index
    }

    /// Path of a discovered video
    pub fn video_path(&self, video_name: &str) -> Option<&Path> {
        self.video_index.get(video_name).map(PathBuf::as_path)
    }

    /// Load every clip file in storage, in file-name order.
    ///
    /// Files without a matching video are skipped silently; they reappear once
    /// the video is found again. A file that fails to parse is reported and
    /// does not affect the others.
    pub fn load_all(&mut self) -> Result<LoadReport, DomainError> {
        let mut report = LoadReport::default();
        self.entries.clear();

        for name in self.storage.list_video_names()? {
            let Some(path) = self.video_index.get(&name).cloned() else {
                debug!(video = %name, "No video for clip file, skipping");
                report.skipped.push(name);
                continue;
            };

            match self.storage.read_clips(&name) {
                Ok(clips) => {
                    let mut entry = VideoEntry::new(name.clone(), path);
                    entry.clips = clips.unwrap_or_default();
                    entry.sort_clips();
                    self.entries.insert(name.clone(), entry);
                    report.loaded.push(name);
                }
                Err(e) => {
                    warn!(video = %name, error = %e, "Failed to load clip file");
                    report.failed.push((name, e));
                }
            }
        }

        info!(
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Loaded clip files"
        );
        Ok(report)
    }

    /// Make sure a video's clips are in memory, reading its clip file on first use
    pub fn ensure_loaded(&mut self, video_name: &str) -> Result<&VideoEntry, DomainError> {
        if !self.entries.contains_key(video_name) {
            let path = self
                .video_path(video_name)
                .map(Path::to_path_buf)
                .ok_or_else(|| DomainError::NotFound(format!("Video {}", video_name)))?;

            let mut entry = VideoEntry::new(video_name, path);
            entry.clips = self.storage.read_clips(video_name)?.unwrap_or_default();
            entry.sort_clips();
            debug!(video = %video_name, clips = entry.clips.len(), "Loaded clips on demand");
            self.entries.insert(video_name.to_string(), entry);
        }

        self.entries
            .get(video_name)
            .ok_or_else(|| DomainError::NotFound(format!("Video {}", video_name)))
    }

    /// Clips of a video in start order; empty when the video is unknown
    pub fn get_clips(&self, video_name: &str) -> &[Clip] {
        self.entries
            .get(video_name)
            .map(|entry| entry.clips.as_slice())
            .unwrap_or(&[])
    }

    /// Clip at an index
    pub fn clip(&self, video_name: &str, index: usize) -> Result<&Clip, DomainError> {
        let clips = self.get_clips(video_name);
        clips.get(index).ok_or_else(|| DomainError::IndexOutOfRange {
            video: video_name.to_string(),
            index,
            len: clips.len(),
        })
    }

    /// Current index of a clip by identity
    pub fn index_of(&self, video_name: &str, id: ClipId) -> Option<usize> {
        self.entries.get(video_name)?.position_of(id)
    }

    /// Loaded videos in name order
    pub fn entries(&self) -> impl Iterator<Item = &VideoEntry> {
        self.entries.values()
    }

    /// Add a clip and return its index in the re-sorted list
    pub fn add(&mut self, video_name: &str, clip: Clip) -> Result<usize, DomainError> {
        self.ensure_loaded(video_name)?;
        let entry = self.entry_mut(video_name)?;

        let id = clip.id();
        entry.clips.push(clip);
        entry.sort_clips();

        let index = entry
            .position_of(id)
            .ok_or_else(|| DomainError::NotFound(format!("Clip {} after insert", id)))?;
        debug!(video = %video_name, index, clips = entry.clips.len(), "Added clip");
        Ok(index)
    }

    /// Remove the clip at an index.
    ///
    /// Indices held elsewhere for later clips of this video shift down by one.
    pub fn delete(&mut self, video_name: &str, index: usize) -> Result<Clip, DomainError> {
        self.ensure_loaded(video_name)?;
        let entry = self.entry_mut(video_name)?;
        if index >= entry.clips.len() {
            return Err(DomainError::IndexOutOfRange {
                video: video_name.to_string(),
                index,
                len: entry.clips.len(),
            });
        }

        let removed = entry.clips.remove(index);
        debug!(video = %video_name, index, clips = entry.clips.len(), "Deleted clip");
        Ok(removed)
    }

    /// Replace a clip's comment
    pub fn set_comment(
        &mut self,
        video_name: &str,
        index: usize,
        comment: &str,
    ) -> Result<(), DomainError> {
        self.ensure_loaded(video_name)?;
        let entry = self.entry_mut(video_name)?;
        let len = entry.clips.len();
        let clip = entry
            .clips
            .get_mut(index)
            .ok_or_else(|| DomainError::IndexOutOfRange {
                video: video_name.to_string(),
                index,
                len,
            })?;
        clip.set_comment(comment);
        Ok(())
    }

    /// Write a video's clip list to storage
    pub fn persist(&self, video_name: &str) -> Result<(), DomainError> {
        let entry = self
            .entries
            .get(video_name)
            .ok_or_else(|| DomainError::NotFound(format!("No clips loaded for {}", video_name)))?;
        self.storage.write_clips(video_name, &entry.clips)
    }

    /// Write every loaded video, continuing past failures
    pub fn persist_all(&self) -> PersistReport {
        let mut report = PersistReport::default();
        for name in self.entries.keys() {
            match self.persist(name) {
                Ok(()) => report.saved.push(name.clone()),
                Err(e) => {
                    warn!(video = %name, error = %e, "Failed to persist clips");
                    report.failed.push((name.clone(), e));
                }
            }
        }
        report
    }

    /// Storage directory
    pub fn storage_location(&self) -> &Path {
        self.storage.location()
    }

    fn entry_mut(&mut self, video_name: &str) -> Result<&mut VideoEntry, DomainError> {
        self.entries
            .get_mut(video_name)
            .ok_or_else(|| DomainError::NotFound(format!("Video {}", video_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{JsonClipStorage, WalkdirScanner};
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Storage that records writes in memory and can be told to fail
    #[derive(Default)]
    struct MemoryStorage {
        files: Mutex<BTreeMap<String, Vec<(f64, f64)>>>,
        fail_for: Option<String>,
    }

    impl ClipStoragePort for MemoryStorage {
        fn list_video_names(&self) -> Result<Vec<String>, DomainError> {
            Ok(self.files.lock().unwrap().keys().cloned().collect())
        }

        fn read_clips(&self, video_name: &str) -> Result<Option<Vec<Clip>>, DomainError> {
            Ok(self.files.lock().unwrap().get(video_name).map(|positions| {
                positions
                    .iter()
                    .map(|(s, e)| Clip::from_positions(*s, *e).unwrap())
                    .collect()
            }))
        }

        fn write_clips(&self, video_name: &str, clips: &[Clip]) -> Result<(), DomainError> {
            if self.fail_for.as_deref() == Some(video_name) {
                return Err(DomainError::Persistence("disk full".to_string()));
            }
            self.files.lock().unwrap().insert(
                video_name.to_string(),
                clips.iter().map(Clip::positions).collect(),
            );
            Ok(())
        }

        fn location(&self) -> &Path {
            Path::new("memory")
        }
    }

    fn index_of_names(names: &[&str]) -> VideoIndex {
        names
            .iter()
            .map(|n| (n.to_string(), PathBuf::from(format!("/videos/{}", n))))
            .collect()
    }

    fn memory_store(storage: Arc<MemoryStorage>, names: &[&str]) -> ClipStore {
        let mut store = ClipStore::new(storage, Arc::new(WalkdirScanner::default()));
        store.set_video_index(index_of_names(names));
        store
    }

    fn starts(store: &ClipStore, video: &str) -> Vec<f64> {
        store.get_clips(video).iter().map(Clip::start).collect()
    }

    #[test]
    fn test_get_clips_unknown_is_empty() {
        let store = memory_store(Arc::new(MemoryStorage::default()), &[]);
        assert!(store.get_clips("nothing.mp4").is_empty());
    }

    #[test]
    fn test_add_keeps_start_order() {
        let mut store = memory_store(Arc::new(MemoryStorage::default()), &["a.mp4"]);
        for (s, e) in [(30.0, 40.0), (10.0, 12.0), (20.0, 25.0), (5.0, 6.0)] {
            store.add("a.mp4", Clip::from_positions(s, e).unwrap()).unwrap();
            let current = starts(&store, "a.mp4");
            let mut sorted = current.clone();
            sorted.sort_by(f64::total_cmp);
            assert_eq!(current, sorted);
        }
    }

    #[test]
    fn test_add_returns_sorted_index() {
        let mut store = memory_store(Arc::new(MemoryStorage::default()), &["a.mp4"]);
        assert_eq!(store.add("a.mp4", Clip::from_positions(30.0, 40.0).unwrap()).unwrap(), 0);
        assert_eq!(store.add("a.mp4", Clip::from_positions(10.0, 20.0).unwrap()).unwrap(), 0);
        assert_eq!(store.add("a.mp4", Clip::from_positions(50.0, 60.0).unwrap()).unwrap(), 2);
    }

    #[test]
    fn test_add_duplicate_range_resolves_to_new_clip() {
        let mut store = memory_store(Arc::new(MemoryStorage::default()), &["a.mp4"]);
        store.add("a.mp4", Clip::from_positions(10.0, 20.0).unwrap()).unwrap();
        let clip = Clip::from_positions(10.0, 20.0).unwrap();
        let id = clip.id();
        let index = store.add("a.mp4", clip).unwrap();
        assert_eq!(store.get_clips("a.mp4")[index].id(), id);
        assert_eq!(index, 1);
    }

    #[test]
    fn test_add_unknown_video_fails() {
        let mut store = memory_store(Arc::new(MemoryStorage::default()), &[]);
        let err = store
            .add("ghost.mp4", Clip::from_positions(1.0, 2.0).unwrap())
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_delete_shifts_only_target_video() {
        let mut store = memory_store(Arc::new(MemoryStorage::default()), &["a.mp4", "b.mp4"]);
        for s in [1.0, 2.0, 3.0] {
            store.add("a.mp4", Clip::from_positions(s, s + 0.5).unwrap()).unwrap();
            store.add("b.mp4", Clip::from_positions(s, s + 0.5).unwrap()).unwrap();
        }

        let removed = store.delete("a.mp4", 1).unwrap();

        assert_eq!(removed.start(), 2.0);
        assert_eq!(starts(&store, "a.mp4"), vec![1.0, 3.0]);
        assert_eq!(starts(&store, "b.mp4"), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut store = memory_store(Arc::new(MemoryStorage::default()), &["a.mp4"]);
        store.add("a.mp4", Clip::from_positions(1.0, 2.0).unwrap()).unwrap();
        let err = store.delete("a.mp4", 1).unwrap_err();
        assert_eq!(
            err,
            DomainError::IndexOutOfRange {
                video: "a.mp4".to_string(),
                index: 1,
                len: 1
            }
        );
    }

    #[test]
    fn test_set_comment() {
        let mut store = memory_store(Arc::new(MemoryStorage::default()), &["a.mp4"]);
        store.add("a.mp4", Clip::from_positions(1.0, 2.0).unwrap()).unwrap();
        store.set_comment("a.mp4", 0, "greeting").unwrap();
        assert_eq!(store.get_clips("a.mp4")[0].comment(), "greeting");
        assert!(store.set_comment("a.mp4", 3, "x").is_err());
    }

    #[test]
    fn test_persist_all_continues_after_failure() {
        let storage = Arc::new(MemoryStorage {
            fail_for: Some("a.mp4".to_string()),
            ..Default::default()
        });
        let mut store = memory_store(Arc::clone(&storage), &["a.mp4", "b.mp4"]);
        store.add("a.mp4", Clip::from_positions(1.0, 2.0).unwrap()).unwrap();
        store.add("b.mp4", Clip::from_positions(1.0, 2.0).unwrap()).unwrap();

        let report = store.persist_all();

        assert!(!report.is_complete());
        assert_eq!(report.saved, vec!["b.mp4".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert!(storage.files.lock().unwrap().contains_key("b.mp4"));
        // Memory stays authoritative after a failed write
        assert_eq!(store.get_clips("a.mp4").len(), 1);
    }

    #[test]
    fn test_persist_unloaded_video_fails() {
        let store = memory_store(Arc::new(MemoryStorage::default()), &["a.mp4"]);
        assert!(matches!(store.persist("a.mp4"), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_load_all_sorts_and_skips_orphans() {
        let storage = Arc::new(MemoryStorage::default());
        storage
            .files
            .lock()
            .unwrap()
            .insert("a.mp4".to_string(), vec![(9.0, 10.0), (1.0, 2.0)]);
        storage
            .files
            .lock()
            .unwrap()
            .insert("gone.mp4".to_string(), vec![(1.0, 2.0)]);
        let mut store = memory_store(storage, &["a.mp4"]);

        let report = store.load_all().unwrap();

        assert_eq!(report.loaded, vec!["a.mp4".to_string()]);
        assert_eq!(report.skipped, vec!["gone.mp4".to_string()]);
        assert_eq!(starts(&store, "a.mp4"), vec![1.0, 9.0]);
        assert!(store.get_clips("gone.mp4").is_empty());
    }

    #[test]
    fn test_load_all_isolates_malformed_files() {
        let temp = TempDir::new().unwrap();
        let clip_dir = temp.path().join("clips");
        fs::create_dir(&clip_dir).unwrap();
        fs::write(clip_dir.join("a.mp4.json"), "{not json").unwrap();
        fs::write(clip_dir.join("b.mp4.json"), r#"[{"positions": [1.0, 2.0]}]"#).unwrap();

        let mut store = ClipStore::new(
            Arc::new(JsonClipStorage::new(&clip_dir)),
            Arc::new(WalkdirScanner::default()),
        );
        store.set_video_index(index_of_names(&["a.mp4", "b.mp4"]));

        let report = store.load_all().unwrap();

        assert_eq!(report.loaded, vec!["b.mp4".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].1, DomainError::MalformedClipFile(_)));
        assert_eq!(store.get_clips("b.mp4").len(), 1);
    }

    #[test]
    fn test_ensure_loaded_reads_on_demand() {
        let storage = Arc::new(MemoryStorage::default());
        storage
            .files
            .lock()
            .unwrap()
            .insert("a.mp4".to_string(), vec![(3.0, 4.0)]);
        let mut store = memory_store(storage, &["a.mp4", "new.mp4"]);

        assert_eq!(store.ensure_loaded("a.mp4").unwrap().clips.len(), 1);
        assert!(store.ensure_loaded("new.mp4").unwrap().clips.is_empty());
        assert!(store.ensure_loaded("ghost.mp4").is_err());
    }
}
