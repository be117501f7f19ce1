// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotations for every image in the working set.
//!
//! The whole map is what gets written to the annotation file, keyed by the
//! image identifier (its full path). Entries are kept as raw JSON and only
//! decoded on demand, so an entry this tool cannot read is still written
//! back untouched.

use super::annotation::BBox;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mapping from image identifier to its boxes in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationSet {
    images: Map<String, Value>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the boxes recorded for an image, empty if the image has none.
    pub fn boxes_for(&self, image_id: &str) -> serde_json::Result<Vec<BBox>> {
        match self.images.get(image_id) {
            Some(entry) => Vec::<BBox>::deserialize(entry),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the entry for one image, leaving all other entries untouched.
    pub fn set_boxes(&mut self, image_id: &str, boxes: &[BBox]) -> serde_json::Result<()> {
        self.images
            .insert(image_id.to_string(), serde_json::to_value(boxes)?);
        Ok(())
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_boxes_keeps_siblings() {
        let mut set = AnnotationSet::new();
        set.set_boxes("a.jpg", &[BBox::new(0, 0, 10, 10, "car")]).unwrap();
        set.set_boxes("b.jpg", &[BBox::new(1, 1, 20, 20, "bus")]).unwrap();
        set.set_boxes("a.jpg", &[]).unwrap();

        assert!(set.boxes_for("a.jpg").unwrap().is_empty());
        assert_eq!(set.boxes_for("b.jpg").unwrap().len(), 1);
        assert_eq!(set.image_count(), 2);
        assert!(set.boxes_for("missing.jpg").unwrap().is_empty());
    }

    #[test]
    fn test_json_shape_is_object_of_arrays() {
        let mut set = AnnotationSet::new();
        set.set_boxes("/data/a.jpg", &[BBox::new(1, 2, 3, 4, "person")]).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"/data/a.jpg":[[1,2,3,4,"person"]]}"#);
    }

    #[test]
    fn test_unreadable_entry_is_isolated() {
        let raw = json!({
            "a.jpg": [[1, 2, 30, 40, "bus"]],
            "b.jpg": [[1, 2, 3, 4, null]],
        });
        let mut set: AnnotationSet = serde_json::from_value(raw).unwrap();

        assert_eq!(set.boxes_for("a.jpg").unwrap(), vec![BBox::new(1, 2, 30, 40, "bus")]);
        assert!(set.boxes_for("b.jpg").is_err());

        set.set_boxes("c.jpg", &[BBox::new(0, 0, 10, 10, "car")]).unwrap();
        let written = serde_json::to_value(&set).unwrap();
        assert_eq!(written["b.jpg"], json!([[1, 2, 3, 4, null]]));
        assert_eq!(written["a.jpg"], json!([[1, 2, 30, 40, "bus"]]));
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert!(serde_json::from_str::<AnnotationSet>("[[1, 2, 3, 4]]").is_err());
    }
}
