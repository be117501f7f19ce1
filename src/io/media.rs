// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file loading and directory scanning.
//!
//! This module decodes images into RGBA pixels suitable for an egui
//! texture and lists the images of a directory in navigation order.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// A decoded image ready for upload as a texture.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decode an image file into RGBA8 pixels.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let img = image::open(path).with_context(|| format!("Cannot decode {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// List the images directly inside `dir`, sorted case-insensitively by
/// file name. Subdirectories are not searched.
///
/// Returned paths are absolute and canonical, so they identify an image the
/// same way however the directory was spelled.
pub fn scan_directory(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Cannot resolve directory {}", dir.display()))?;
    let entries = std::fs::read_dir(&dir)
        .with_context(|| format!("Cannot read directory {}", dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, extensions) {
            images.push(path);
        }
    }

    images.sort_by_cached_key(|p| {
        let name = p
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        (name.to_lowercase(), name)
    });
    log::info!("Found {} images in {}", images.len(), dir.display());
    Ok(images)
}
