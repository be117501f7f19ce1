// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation file persistence.
//!
//! All images share one JSON file mapping the image identifier to its
//! boxes. The store keeps the boxes of the active image in memory and
//! writes them back after every mutation. Saving re-reads the file and
//! replaces only the active image's entry, so sibling images are never
//! clobbered.

use crate::interaction::BoxStore;
use crate::models::{annotation::BBox, project::AnnotationSet};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Read the annotation map from disk.
pub fn import_json(path: &Path) -> Result<AnnotationSet> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(data)
}

/// Write JSON to disk, replacing the file atomically.
pub fn export_json<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Read the annotation map, treating a missing or corrupt file as empty.
fn read_or_empty(path: &Path) -> AnnotationSet {
    if !path.exists() {
        log::debug!("No annotation file at {}", path.display());
        return AnnotationSet::new();
    }
    match import_json(path) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Ignoring unreadable annotation file: {:#}", e);
            AnnotationSet::new()
        }
    }
}

/// Read the annotation map that a save merges into.
///
/// Only a file that is not JSON at all is replaced. A file that cannot be
/// read, or valid JSON that is not an annotation map, is an error so that
/// nothing is overwritten.
fn read_for_merge(path: &Path) -> Result<AnnotationSet> {
    if !path.exists() {
        return Ok(AnnotationSet::new());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match serde_json::from_str::<serde_json::Value>(&json) {
        Ok(value) => serde_json::from_value(value).with_context(|| {
            format!("{} does not hold an annotation map, not overwriting", path.display())
        }),
        Err(e) => {
            log::warn!("Replacing malformed annotation file {}: {}", path.display(), e);
            Ok(AnnotationSet::new())
        }
    }
}

/// Boxes of the active image plus the file they are persisted to.
#[derive(Debug)]
pub struct AnnotationStore {
    path: PathBuf,
    image_id: Option<String>,
    boxes: Vec<BBox>,
}

impl AnnotationStore {
    /// Create a store backed by the given annotation file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            image_id: None,
            boxes: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref()
    }

    /// Make `image_id` the active image and load its boxes.
    pub fn load_annotations(&mut self, image_id: &str) -> &[BBox] {
        let data = read_or_empty(&self.path);
        self.boxes = data.boxes_for(image_id).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable annotations for {}: {}", image_id, e);
            Vec::new()
        });
        self.image_id = Some(image_id.to_string());
        log::info!(
            "Loaded {} boxes for {} ({} images annotated)",
            self.boxes.len(),
            image_id,
            data.image_count()
        );
        &self.boxes
    }

    /// Drop the active image without touching the file.
    pub fn clear(&mut self) {
        self.image_id = None;
        self.boxes.clear();
    }

    /// Write the active image's boxes back to the annotation file.
    ///
    /// Does nothing when no image is active.
    pub fn save(&self) -> Result<()> {
        let Some(image_id) = self.image_id.as_deref() else {
            return Ok(());
        };
        let mut data = read_for_merge(&self.path)?;
        data.set_boxes(image_id, &self.boxes)?;
        export_json(&data, &self.path)?;
        log::debug!("Saved {} boxes for {}", self.boxes.len(), image_id);
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            log::error!("Failed to save annotations: {:#}", e);
        }
    }
}

impl BoxStore for AnnotationStore {
    fn boxes(&self) -> &[BBox] {
        &self.boxes
    }

    fn add_box(&mut self, bbox: BBox) -> usize {
        self.boxes.push(bbox);
        self.persist();
        self.boxes.len() - 1
    }

    fn delete_box(&mut self, index: usize) -> bool {
        if index >= self.boxes.len() {
            return false;
        }
        self.boxes.remove(index);
        self.persist();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let mut store = AnnotationStore::new(dir.path().join("annotations.json"));
        assert!(store.load_annotations("a.jpg").is_empty());
        assert_eq!(store.image_id(), Some("a.jpg"));
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut store = AnnotationStore::new(&path);
        assert!(store.load_annotations("a.jpg").is_empty());

        // A later save replaces the corrupt file with a valid one
        store.add_box(BBox::new(1, 1, 20, 20, "car"));
        let data = import_json(&path).unwrap();
        assert_eq!(data.boxes_for("a.jpg").unwrap().len(), 1);
    }

    #[test]
    fn test_save_load_roundtrip_preserves_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        let boxes = vec![
            BBox::new(50, 50, 90, 90, "truck"),
            BBox::new(0, 0, 10, 10, "person"),
            BBox::new(5, 5, 15, 15, "car"),
        ];

        let mut store = AnnotationStore::new(&path);
        store.load_annotations("/imgs/a.jpg");
        for bbox in &boxes {
            store.add_box(bbox.clone());
        }
        store.save().unwrap();

        let mut reloaded = AnnotationStore::new(&path);
        assert_eq!(reloaded.load_annotations("/imgs/a.jpg"), boxes.as_slice());
    }

    #[test]
    fn test_save_preserves_sibling_images() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");

        let mut store = AnnotationStore::new(&path);
        store.load_annotations("a.jpg");
        store.add_box(BBox::new(1, 2, 30, 40, "bus"));

        store.load_annotations("b.jpg");
        store.add_box(BBox::new(5, 5, 50, 50, "car"));
        store.delete_box(0);

        let data = import_json(&path).unwrap();
        assert_eq!(data.boxes_for("a.jpg").unwrap(), vec![BBox::new(1, 2, 30, 40, "bus")]);
        assert!(data.boxes_for("b.jpg").unwrap().is_empty());
        assert_eq!(data.image_count(), 2);
    }

    #[test]
    fn test_add_returns_new_index() {
        let dir = tempdir().unwrap();
        let mut store = AnnotationStore::new(dir.path().join("annotations.json"));
        store.load_annotations("a.jpg");
        assert_eq!(store.add_box(BBox::new(0, 0, 10, 10, "car")), 0);
        assert_eq!(store.add_box(BBox::new(0, 0, 20, 20, "car")), 1);
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        let mut store = AnnotationStore::new(&path);
        store.load_annotations("a.jpg");
        store.add_box(BBox::new(0, 0, 10, 10, "car"));
        store.add_box(BBox::new(0, 0, 20, 20, "bus"));

        assert!(!store.delete_box(2));
        assert_eq!(store.boxes().len(), 2);

        assert!(store.delete_box(0));
        assert_eq!(store.boxes(), &[BBox::new(0, 0, 20, 20, "bus")]);
        let data = import_json(&path).unwrap();
        assert_eq!(data.boxes_for("a.jpg").unwrap().len(), 1);
    }

    #[test]
    fn test_reads_legacy_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        std::fs::write(&path, r#"{"a.jpg": [[40, 40, 10, 10], [1, 2, 3, 4, "car"]]}"#).unwrap();

        let mut store = AnnotationStore::new(&path);
        let boxes = store.load_annotations("a.jpg");
        assert_eq!(boxes[0], BBox::new(10, 10, 40, 40, ""));
        assert_eq!(boxes[1], BBox::new(1, 2, 3, 4, "car"));
    }

    #[test]
    fn test_save_without_image_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        let store = AnnotationStore::new(&path);
        store.save().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_save_failure_does_not_panic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("annotations.json");
        let mut store = AnnotationStore::new(&path);
        store.load_annotations("a.jpg");

        assert!(store.save().is_err());
        // Mutation still applies in memory; the failed write is only logged
        assert_eq!(store.add_box(BBox::new(0, 0, 10, 10, "car")), 0);
        assert_eq!(store.boxes().len(), 1);
    }

    #[test]
    fn test_save_keeps_unreadable_sibling_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        std::fs::write(
            &path,
            r#"{"a.jpg": [[1, 2, 30, 40, "bus"]], "b.jpg": [[1, 2, 3, 4, null]]}"#,
        )
        .unwrap();

        let mut store = AnnotationStore::new(&path);
        assert!(store.load_annotations("c.jpg").is_empty());
        store.add_box(BBox::new(0, 0, 10, 10, "car"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["a.jpg"], serde_json::json!([[1, 2, 30, 40, "bus"]]));
        assert_eq!(written["b.jpg"], serde_json::json!([[1, 2, 3, 4, null]]));
        assert_eq!(written["c.jpg"], serde_json::json!([[0, 0, 10, 10, "car"]]));
    }

    #[test]
    fn test_load_ignores_unreadable_sibling_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        std::fs::write(
            &path,
            r#"{"a.jpg": [[1, 2, 30, 40, "bus"]], "b.jpg": [[1, 2, 3, 4, "x", 6]]}"#,
        )
        .unwrap();

        let mut store = AnnotationStore::new(&path);
        assert_eq!(store.load_annotations("a.jpg"), &[BBox::new(1, 2, 30, 40, "bus")]);
        assert!(store.load_annotations("b.jpg").is_empty());
    }

    #[test]
    fn test_save_refuses_to_overwrite_non_map_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        let contents = "[[1, 2, 3, 4, \"car\"]]";
        std::fs::write(&path, contents).unwrap();

        let mut store = AnnotationStore::new(&path);
        assert!(store.load_annotations("a.jpg").is_empty());
        store.add_box(BBox::new(0, 0, 10, 10, "car"));

        assert!(store.save().is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
    }
}
