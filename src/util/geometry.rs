// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate transformations between screen
//! space (the letterboxed canvas) and image space (native image pixels).
//! The image is drawn as a pixmap scaled by a uniform factor and centered
//! in the canvas; the centering offset is floored to whole pixels.

use crate::models::annotation::Point;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Uniform scale that fits the image inside the canvas without cropping.
///
/// Images are only ever scaled down; an image that already fits keeps a
/// scale of 1.0.
pub fn compute_fit_scale(image: Size, canvas: Size) -> f64 {
    if image.width > canvas.width || image.height > canvas.height {
        let scale_w = canvas.width as f64 / image.width as f64;
        let scale_h = canvas.height as f64 / image.height as f64;
        scale_w.min(scale_h)
    } else {
        1.0
    }
}

/// Size of the rendered pixmap for an image at the given scale.
pub fn scaled_size(image: Size, scale: f64) -> Size {
    Size::new(
        (image.width as f64 * scale) as u32,
        (image.height as f64 * scale) as u32,
    )
}

/// Offset of the pixmap's top-left corner inside the canvas.
pub fn centering_offset(canvas: Size, pixmap: Size) -> (i64, i64) {
    (
        (canvas.width as i64 - pixmap.width as i64).div_euclid(2),
        (canvas.height as i64 - pixmap.height as i64).div_euclid(2),
    )
}

/// Map a screen point to image space. Not clamped, so points outside the
/// image stay detectable.
pub fn screen_to_image(screen: Point, canvas: Size, pixmap: Size, scale: f64) -> Point {
    let (off_x, off_y) = centering_offset(canvas, pixmap);
    Point::new(
        (screen.x - off_x as f64) / scale,
        (screen.y - off_y as f64) / scale,
    )
}

/// Map a screen point to image space, clamped to `[0, W] x [0, H]`.
pub fn screen_to_image_clamped(
    screen: Point,
    canvas: Size,
    pixmap: Size,
    image: Size,
    scale: f64,
) -> Point {
    let p = screen_to_image(screen, canvas, pixmap, scale);
    Point::new(
        p.x.clamp(0.0, image.width as f64),
        p.y.clamp(0.0, image.height as f64),
    )
}

/// Map an image point to screen space.
pub fn image_to_screen(image_point: Point, canvas: Size, pixmap: Size, scale: f64) -> Point {
    let (off_x, off_y) = centering_offset(canvas, pixmap);
    Point::new(
        image_point.x * scale + off_x as f64,
        image_point.y * scale + off_y as f64,
    )
}

/// Everything needed to map between screen and image space for one frame.
///
/// A viewport only exists while an image is loaded and the canvas has a
/// non-zero size, so the scale is always positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub canvas: Size,
    pub pixmap: Size,
    pub image: Size,
    pub scale: f64,
}

impl Viewport {
    /// Fit an image into a canvas. Returns `None` when either is empty.
    pub fn fit(image: Size, canvas: Size) -> Option<Self> {
        if image.is_empty() || canvas.is_empty() {
            return None;
        }
        let scale = compute_fit_scale(image, canvas);
        Some(Self {
            canvas,
            pixmap: scaled_size(image, scale),
            image,
            scale,
        })
    }

    pub fn offset(&self) -> (i64, i64) {
        centering_offset(self.canvas, self.pixmap)
    }

    pub fn screen_to_image(&self, screen: Point) -> Point {
        screen_to_image(screen, self.canvas, self.pixmap, self.scale)
    }

    pub fn screen_to_image_clamped(&self, screen: Point) -> Point {
        screen_to_image_clamped(screen, self.canvas, self.pixmap, self.image, self.scale)
    }

    pub fn image_to_screen(&self, image_point: Point) -> Point {
        image_to_screen(image_point, self.canvas, self.pixmap, self.scale)
    }
}
