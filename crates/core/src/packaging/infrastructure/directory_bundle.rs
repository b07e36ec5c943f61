use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::packaging::domain::archive_writer::{ArchiveWriter, DeliverySink};

/// Bundle writer that lays entries out as plain files in a directory.
///
/// `finalize` produces a JSON manifest listing the entries; delivered
/// alongside them, it marks the bundle complete.
pub struct DirectoryArchiveWriter {
    root: PathBuf,
    entries: Vec<ManifestEntry>,
}

#[derive(Serialize)]
struct ManifestEntry {
    name: String,
    bytes: usize,
}

#[derive(Serialize)]
struct Manifest<'a> {
    entries: &'a [ManifestEntry],
}

impl DirectoryArchiveWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }
}

impl ArchiveWriter for DirectoryArchiveWriter {
    fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.root.join(name), bytes)?;
        self.entries.push(ManifestEntry {
            name: name.to_owned(),
            bytes: bytes.len(),
        });
        Ok(())
    }

    fn finalize(&mut self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let manifest = Manifest {
            entries: &self.entries,
        };
        let json = serde_json::to_vec_pretty(&manifest)?;
        self.entries.clear();
        Ok(json)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

/// Delivery sink that writes the bundle summary into a directory.
pub struct FileDeliverySink {
    root: PathBuf,
}

impl FileDeliverySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DeliverySink for FileDeliverySink {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.root.join(filename), bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_land_as_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DirectoryArchiveWriter::new(dir.path());
        writer.add_entry("a.mp4", &[1, 2, 3]).unwrap();
        writer.add_entry("a.jpg", &[4]).unwrap();

        assert_eq!(fs::read(dir.path().join("a.mp4")).unwrap(), vec![1, 2, 3]);
        assert_eq!(fs::read(dir.path().join("a.jpg")).unwrap(), vec![4]);
    }

    #[test]
    fn test_manifest_lists_entries_with_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DirectoryArchiveWriter::new(dir.path());
        writer.add_entry("clip.webm", &[0; 10]).unwrap();
        let manifest = writer.finalize().unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&manifest).unwrap();
        assert_eq!(parsed["entries"][0]["name"], "clip.webm");
        assert_eq!(parsed["entries"][0]["bytes"], 10);
    }

    #[test]
    fn test_finalize_clears_buffered_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DirectoryArchiveWriter::new(dir.path());
        writer.add_entry("x", &[9]).unwrap();
        writer.finalize().unwrap();

        let manifest = writer.finalize().unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&manifest).unwrap();
        assert_eq!(parsed["entries"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_sink_writes_summary_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileDeliverySink::new(dir.path());
        sink.deliver("face-captures-t.json", b"{}").unwrap();
        assert_eq!(
            fs::read(dir.path().join("face-captures-t.json")).unwrap(),
            b"{}"
        );
    }

    #[test]
    fn test_sink_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("bundles");
        let mut sink = FileDeliverySink::new(&nested);
        sink.deliver("summary.json", b"ok").unwrap();
        assert!(nested.join("summary.json").exists());
    }
}
