// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer interaction on the canvas.
//!
//! A press either selects the box under the pointer or starts drawing a
//! new one. Moves and releases only matter while drawing; a release
//! commits the rectangle to the box store if it is large enough.

use crate::models::annotation::{BBox, Point};
use crate::util::geometry::Viewport;

/// Default side length (screen pixels) a drawn box must exceed to be kept.
pub const MIN_BOX_SIZE: f64 = 5.0;

/// Ordered box storage the interaction mutates.
pub trait BoxStore {
    /// Boxes of the active image in insertion order.
    fn boxes(&self) -> &[BBox];

    /// Append a box and return its index.
    fn add_box(&mut self, bbox: BBox) -> usize;

    /// Remove the box at `index`; returns false if the index is out of range.
    fn delete_box(&mut self, index: usize) -> bool;
}

/// Index of the first box (in insertion order) containing an image point.
pub fn hit_test(boxes: &[BBox], point: Point) -> Option<usize> {
    boxes.iter().position(|b| b.contains(point))
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Drawing a new box; both corners are in screen space.
    Drawing { start: Point, end: Point },
    BoxSelected(usize),
}

/// What an input changed, so the caller knows what to log and redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    None,
    Selected(usize),
    DrawStarted,
    PreviewMoved,
    Committed(usize),
    Discarded,
    Deleted(usize),
}

/// Interaction state machine driving a box store.
#[derive(Debug)]
pub struct Interaction<S> {
    store: S,
    state: InteractionState,
    min_box_size: f64,
}

impl<S: BoxStore> Interaction<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: InteractionState::Idle,
            min_box_size: MIN_BOX_SIZE,
        }
    }

    pub fn with_min_box_size(mut self, min_box_size: f64) -> Self {
        self.min_box_size = min_box_size;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn selected(&self) -> Option<usize> {
        match self.state {
            InteractionState::BoxSelected(index) => Some(index),
            _ => None,
        }
    }

    /// The rectangle being drawn, in screen space.
    pub fn preview(&self) -> Option<(Point, Point)> {
        match self.state {
            InteractionState::Drawing { start, end } => Some((start, end)),
            _ => None,
        }
    }

    /// Forget any selection or drawing in progress.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    pub fn press(&mut self, viewport: &Viewport, screen: Point) -> InteractionEvent {
        let image_point = viewport.screen_to_image(screen);
        log::debug!(
            "Press at screen ({:.1}, {:.1}) -> image ({:.1}, {:.1})",
            screen.x,
            screen.y,
            image_point.x,
            image_point.y
        );

        if let Some(index) = hit_test(self.store.boxes(), image_point) {
            self.state = InteractionState::BoxSelected(index);
            return InteractionEvent::Selected(index);
        }

        self.state = InteractionState::Drawing {
            start: screen,
            end: screen,
        };
        InteractionEvent::DrawStarted
    }

    pub fn drag(&mut self, screen: Point) -> InteractionEvent {
        match &mut self.state {
            InteractionState::Drawing { end, .. } => {
                *end = screen;
                InteractionEvent::PreviewMoved
            }
            _ => InteractionEvent::None,
        }
    }

    /// Finish drawing. The box is stored with `label` if both of its screen
    /// dimensions exceed the minimum size.
    pub fn release(&mut self, viewport: &Viewport, screen: Point, label: &str) -> InteractionEvent {
        let InteractionState::Drawing { start, .. } = self.state else {
            return InteractionEvent::None;
        };
        self.state = InteractionState::Idle;

        let end = screen;
        if (end.x - start.x).abs() <= self.min_box_size
            || (end.y - start.y).abs() <= self.min_box_size
        {
            log::debug!("Discarded undersized box");
            return InteractionEvent::Discarded;
        }

        let bbox = BBox::from_corners(
            viewport.screen_to_image_clamped(start),
            viewport.screen_to_image_clamped(end),
            label,
        );
        if bbox.width() == 0 || bbox.height() == 0 {
            log::debug!("Discarded box outside the image");
            return InteractionEvent::Discarded;
        }

        let index = self.store.add_box(bbox);
        InteractionEvent::Committed(index)
    }

    /// Delete the selected box. Without a selection this does nothing.
    pub fn delete_selected(&mut self) -> InteractionEvent {
        let InteractionState::BoxSelected(index) = self.state else {
            return InteractionEvent::None;
        };
        // Later indices shift down, so the selection cannot survive
        self.state = InteractionState::Idle;
        if self.store.delete_box(index) {
            InteractionEvent::Deleted(index)
        } else {
            InteractionEvent::None
        }
    }
}
