// CLASSIFICATION: COMMUNITY
// Filename: snapshot.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! File-backed heap snapshot output.

use std::io::{self, Write};
use std::path::Path;

use log::{debug, warn};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::runtime::context::{ContextGroup, ContextId};

/// Summary of a context group's heap at the time of the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeapSnapshotSummary {
    pub group: u64,
    pub reachability_barrier: u64,
    pub contexts: Vec<ContextId>,
}

impl HeapSnapshotSummary {
    pub fn capture(group: &ContextGroup) -> Self {
        Self {
            group: group.id(),
            reachability_barrier: group.heap().reachability_barrier(),
            contexts: group.members(),
        }
    }
}

/// Serializer that persists a snapshot to a path.
pub trait HeapSnapshotWriter: Send + Sync {
    fn write(&self, summary: &HeapSnapshotSummary, path: &Path) -> io::Result<()>;
}

/// Writes the snapshot to a uniquely named sibling and renames it into place.
///
/// The temporary file is deleted on any failure, so the destination either
/// holds a complete snapshot or is left untouched.
#[derive(Debug, Default)]
pub struct FileHeapSnapshotWriter;

impl FileHeapSnapshotWriter {
    fn persist(summary: &HeapSnapshotSummary, path: &Path) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, summary).map_err(io::Error::other)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl HeapSnapshotWriter for FileHeapSnapshotWriter {
    fn write(&self, summary: &HeapSnapshotSummary, path: &Path) -> io::Result<()> {
        let result = Self::persist(summary, path);
        match &result {
            Ok(()) => debug!("heap snapshot written to {}", path.display()),
            Err(e) => warn!("heap snapshot to {} failed: {}", path.display(), e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn summary() -> HeapSnapshotSummary {
        HeapSnapshotSummary {
            group: 3,
            reachability_barrier: 12,
            contexts: vec![ContextId(1), ContextId(4)],
        }
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn writes_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heap.json");
        FileHeapSnapshotWriter.write(&summary(), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["reachability_barrier"], 12);
        assert_eq!(value["contexts"], serde_json::json!([1, 4]));
        assert_eq!(entries(dir.path()), vec!["heap.json".to_string()]);
    }

    #[test]
    fn missing_directory_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("heap.json");
        assert!(FileHeapSnapshotWriter.write(&summary(), &path).is_err());
        assert!(!path.exists());
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn unrelated_sibling_is_not_touched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heap.json");
        let sibling = dir.path().join("heap.json.partial");
        fs::write(&sibling, b"keep me").unwrap();
        FileHeapSnapshotWriter.write(&summary(), &path).unwrap();
        assert_eq!(fs::read(&sibling).unwrap(), b"keep me");
        assert_eq!(
            entries(dir.path()),
            vec!["heap.json".to_string(), "heap.json.partial".to_string()]
        );
    }

    #[test]
    fn concurrent_writers_to_one_path_both_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let path = Arc::new(dir.path().join("heap.json"));
        let barrier = Arc::new(Barrier::new(4));
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let path = Arc::clone(&path);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    FileHeapSnapshotWriter.write(&summary(), &path)
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap().unwrap();
        }
        let text = fs::read_to_string(path.as_ref()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["group"], 3);
        assert_eq!(entries(dir.path()), vec!["heap.json".to_string()]);
    }

    #[test]
    fn capture_reads_group_state() {
        let group = ContextGroup::new(9);
        group.heap().collect_all_garbage();
        let s = HeapSnapshotSummary::capture(&group);
        assert_eq!(s.group, 9);
        assert_eq!(s.reachability_barrier, 1);
        assert!(s.contexts.is_empty());
    }
}
