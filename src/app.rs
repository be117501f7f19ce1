// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module owns the image list, the loaded texture and the interaction
//! state machine (which in turn owns the annotation store). Each frame
//! builds a `ViewState` snapshot that is handed to the UI components, and
//! the actions they return are applied afterwards.

use crate::config::Config;
use crate::interaction::{BoxStore, Interaction, InteractionEvent};
use crate::io::{media, serialization::AnnotationStore};
use crate::ui::{canvas, toolbar};
use crate::util::geometry::{Size, Viewport};
use std::path::PathBuf;

/// Per-frame snapshot of the state the UI reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Index into the image list of the displayed image.
    pub current: Option<usize>,
    /// Screen/image mapping from the last painted frame.
    pub viewport: Option<Viewport>,
    pub selected: Option<usize>,
}

/// Step through `len` items from `current`, wrapping at both ends.
pub fn wrap_index(current: Option<usize>, forward: bool, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    })
}

/// The displayed image.
struct DisplayedImage {
    texture: egui::TextureHandle,
    size: Size,
}

/// Main application state.
pub struct LabelerApp {
    /// Images of the chosen directory in navigation order
    images: Vec<PathBuf>,

    /// Class labels offered in the class selector
    labels: Vec<String>,

    /// Index into `labels` of the class given to new boxes
    label_index: usize,

    /// Pointer interaction, owning the annotation store
    interaction: Interaction<AnnotationStore>,

    /// Currently displayed image, if any
    image: Option<DisplayedImage>,

    view: ViewState,

    /// Image to load on the next frame (needs the egui context)
    pending_open: Option<usize>,
}

impl LabelerApp {
    /// Create the application for a scanned image list.
    pub fn new(images: Vec<PathBuf>, config: &Config) -> Self {
        let store = AnnotationStore::new(config.annotation_file.clone());
        log::info!("Annotations are stored in {}", store.path().display());

        Self {
            pending_open: (!images.is_empty()).then_some(0),
            images,
            labels: config.labels.clone(),
            label_index: 0,
            interaction: Interaction::new(store).with_min_box_size(config.min_box_size),
            image: None,
            view: ViewState {
                current: None,
                viewport: None,
                selected: None,
            },
        }
    }

    fn current_label(&self) -> &str {
        self.labels
            .get(self.label_index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Load an image and its annotations. On failure the image is unset and
    /// the user is told.
    fn open_image(&mut self, index: usize, ctx: &egui::Context) {
        let Some(path) = self.images.get(index).cloned() else {
            return;
        };

        self.interaction.reset();
        self.view.current = Some(index);
        self.view.viewport = None;

        match media::load_image(&path) {
            Ok(loaded) => {
                let size = [loaded.width as usize, loaded.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
                let texture =
                    ctx.load_texture("current_image", color_image, egui::TextureOptions::LINEAR);
                self.image = Some(DisplayedImage {
                    texture,
                    size: Size::new(loaded.width, loaded.height),
                });

                let image_id = path.to_string_lossy();
                self.interaction.store_mut().load_annotations(&image_id);
                log::info!(
                    "Opened image {} ({}x{})",
                    path.display(),
                    loaded.width,
                    loaded.height
                );
            }
            Err(e) => {
                log::error!("Failed to load image: {:#}", e);
                self.image = None;
                self.interaction.store_mut().clear();
                rfd::MessageDialog::new()
                    .set_level(rfd::MessageLevel::Error)
                    .set_title("Cannot open image")
                    .set_description(format!("{:#}", e))
                    .set_buttons(rfd::MessageButtons::Ok)
                    .show();
            }
        }
    }

    fn navigate(&mut self, forward: bool) {
        if let Some(next) = wrap_index(self.view.current, forward, self.images.len()) {
            self.pending_open = Some(next);
        }
    }

    fn delete_selected(&mut self) {
        if let InteractionEvent::Deleted(index) = self.interaction.delete_selected() {
            log::info!(
                "Deleted box {}, {} remaining",
                index,
                self.interaction.store().boxes().len()
            );
        }
    }

    fn handle_canvas_action(&mut self, action: canvas::CanvasAction) {
        let Some(viewport) = self.view.viewport else {
            return;
        };

        let event = match action {
            canvas::CanvasAction::Press(point) => self.interaction.press(&viewport, point),
            canvas::CanvasAction::Move(point) => self.interaction.drag(point),
            canvas::CanvasAction::Release(point) => {
                let point = point.or_else(|| self.interaction.preview().map(|(_, end)| end));
                match point {
                    Some(point) => {
                        let label = self.current_label().to_string();
                        self.interaction.release(&viewport, point, &label)
                    }
                    None => InteractionEvent::None,
                }
            }
        };

        log::debug!("{:?} -> {:?}", event, self.interaction.state());
        match event {
            InteractionEvent::Selected(index) => log::info!("Selected box {}", index),
            InteractionEvent::Committed(index) => {
                let bbox = &self.interaction.store().boxes()[index];
                log::info!(
                    "Added box [{}, {}, {}, {}] '{}' to {}, total: {}",
                    bbox.x1(),
                    bbox.y1(),
                    bbox.x2(),
                    bbox.y2(),
                    bbox.label(),
                    self.interaction.store().image_id().unwrap_or_default(),
                    index + 1
                );
            }
            _ => {}
        }
    }
}

impl eframe::App for LabelerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(index) = self.pending_open.take() {
            self.open_image(index, ctx);
        }
        self.view.selected = self.interaction.selected();
        let view = self.view;

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    &self.images,
                    view.current,
                    &self.labels,
                    &mut self.label_index,
                    view.selected.is_some(),
                )
            })
            .inner;

        // Status line
        let image_size = self.image.as_ref().map(|img| img.size);
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            toolbar::status(
                ui,
                &toolbar::Status {
                    position: view.current.map(|i| (i, self.images.len())),
                    image_path: view.current.and_then(|i| self.images.get(i)).map(|p| p.as_path()),
                    image_size: image_size.map(|s| (s.width, s.height)),
                    box_count: self.interaction.store().boxes().len(),
                    selected: view.selected,
                },
            );
        });

        // Canvas
        let output = egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                canvas::show(
                    ui,
                    self.image.as_ref().map(|img| (&img.texture, img.size)),
                    self.interaction.store().boxes(),
                    view.selected,
                    self.interaction.preview(),
                )
            })
            .inner;

        self.view.viewport = output.viewport;
        if output.viewport.is_none() {
            self.interaction.reset();
        }
        if !output.actions.is_empty() {
            for action in output.actions {
                self.handle_canvas_action(action);
            }
            ctx.request_repaint();
        }

        match toolbar_action {
            toolbar::ToolbarAction::OpenImage(index) => self.pending_open = Some(index),
            toolbar::ToolbarAction::Previous => self.navigate(false),
            toolbar::ToolbarAction::Next => self.navigate(true),
            toolbar::ToolbarAction::DeleteSelected => self.delete_selected(),
            toolbar::ToolbarAction::None => {}
        }

        // Keyboard shortcuts, unless a widget is taking text input
        if !ctx.wants_keyboard_input() {
            let (delete, previous, next) = ctx.input(|i| {
                (
                    i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
                    i.key_pressed(egui::Key::ArrowLeft),
                    i.key_pressed(egui::Key::ArrowRight),
                )
            });
            if delete {
                self.delete_selected();
            }
            if previous {
                self.navigate(false);
            }
            if next {
                self.navigate(true);
            }
        }

        if self.pending_open.is_some() {
            ctx.request_repaint();
        }
    }
}
