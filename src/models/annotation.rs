// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the bounding box record stored for every image and
//! the point type used for image-space and screen-space coordinates.

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 2D point. Whether it is in screen or image space depends on context.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box in image pixels with a class label.
///
/// Corners are always ordered (`x1 <= x2`, `y1 <= y2`); the fields are
/// private so every box goes through `new`. On disk a box is the array
/// `[x1, y1, x2, y2, label]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BBox {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    label: String,
}

impl BBox {
    /// Create a box from two arbitrary corners, ordering them.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32, label: impl Into<String>) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
            label: label.into(),
        }
    }

    /// Create a box from two image-space corners.
    ///
    /// Coordinates are truncated to whole pixels; negative values become 0.
    pub fn from_corners(a: Point, b: Point, label: impl Into<String>) -> Self {
        Self::new(to_pixel(a.x), to_pixel(a.y), to_pixel(b.x), to_pixel(b.y), label)
    }

    pub fn x1(&self) -> u32 {
        self.x1
    }

    pub fn y1(&self) -> u32 {
        self.y1
    }

    pub fn x2(&self) -> u32 {
        self.x2
    }

    pub fn y2(&self) -> u32 {
        self.y2
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Check whether an image-space point lies inside the box (edges included).
    pub fn contains(&self, point: Point) -> bool {
        self.x1 as f64 <= point.x
            && point.x <= self.x2 as f64
            && self.y1 as f64 <= point.y
            && point.y <= self.y2 as f64
    }
}

fn to_pixel(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        // `as` saturates at u32::MAX
        value.trunc() as u32
    }
}

impl Serialize for BBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(5)?;
        tuple.serialize_element(&self.x1)?;
        tuple.serialize_element(&self.y1)?;
        tuple.serialize_element(&self.x2)?;
        tuple.serialize_element(&self.y2)?;
        tuple.serialize_element(&self.label)?;
        tuple.end()
    }
}

/// Label as found on disk: older files store a class index instead of a name.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Name(String),
    Index(i64),
}

impl From<RawLabel> for String {
    fn from(raw: RawLabel) -> Self {
        match raw {
            RawLabel::Name(name) => name,
            RawLabel::Index(index) => index.to_string(),
        }
    }
}

struct BBoxVisitor;

impl<'de> Visitor<'de> for BBoxVisitor {
    type Value = BBox;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array [x1, y1, x2, y2] or [x1, y1, x2, y2, label]")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<BBox, A::Error> {
        let mut coords = [0.0f64; 4];
        for (i, coord) in coords.iter_mut().enumerate() {
            *coord = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        let label = seq
            .next_element::<RawLabel>()?
            .map(String::from)
            .unwrap_or_default();
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(6, &self));
        }

        Ok(BBox::from_corners(
            Point::new(coords[0], coords[1]),
            Point::new(coords[2], coords[3]),
            label,
        ))
    }
}

impl<'de> Deserialize<'de> for BBox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(BBoxVisitor)
    }
}
