// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings come from an optional YAML file. Every field has a default, so
//! an empty file or no file at all is valid.

use crate::interaction::MIN_BOX_SIZE;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "bbox-labeler.yaml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Class labels offered in the class selector.
    pub labels: Vec<String>,
    /// JSON file holding the annotations of every image.
    pub annotation_file: PathBuf,
    /// Drawn boxes with a side of at most this many screen pixels are dropped.
    pub min_box_size: f64,
    /// Image file extensions picked up by the directory scan.
    pub extensions: Vec<String>,
    pub window_size: [f32; 2],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            labels: ["person", "car", "bicycle", "motorcycle", "bus", "truck"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            annotation_file: PathBuf::from("annotations.json"),
            min_box_size: MIN_BOX_SIZE,
            extensions: ["jpg", "jpeg", "png", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            window_size: [1280.0, 720.0],
        }
    }
}

impl Config {
    /// Parse settings from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as a map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from `path`, or from the default file if no path is given.
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !explicit && !path.exists() {
            log::debug!("No settings file, using defaults");
            return Ok(Self::default());
        }

        let yaml = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?;
        let config = Self::from_yaml(&yaml)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            bail!("labels must not be empty");
        }
        if self.extensions.is_empty() {
            bail!("extensions must not be empty");
        }
        if self.min_box_size.is_nan() || self.min_box_size < 0.0 {
            bail!("min_box_size must be a non-negative number");
        }
        Ok(())
    }
}
