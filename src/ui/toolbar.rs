// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and status line.
//!
//! This module provides the image selector, the class selector, image
//! navigation, and the delete action, plus the status line at the bottom.

use std::path::Path;

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    OpenImage(usize),
    Previous,
    Next,
    DeleteSelected,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Display the toolbar. `label` is the index into `labels` of the active class.
pub fn show(
    ui: &mut egui::Ui,
    images: &[std::path::PathBuf],
    current: Option<usize>,
    labels: &[String],
    label: &mut usize,
    has_selection: bool,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("◀").on_hover_text("Previous image (←)").clicked() {
            action = ToolbarAction::Previous;
        }

        let selected_text = current
            .and_then(|i| images.get(i))
            .map(|p| file_name(p))
            .unwrap_or_else(|| "Select image...".to_string());
        egui::ComboBox::from_id_source("image_selector")
            .width(240.0)
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                for (i, path) in images.iter().enumerate() {
                    if ui.selectable_label(current == Some(i), file_name(path)).clicked() {
                        action = ToolbarAction::OpenImage(i);
                    }
                }
            });

        if ui.button("▶").on_hover_text("Next image (→)").clicked() {
            action = ToolbarAction::Next;
        }

        ui.separator();

        ui.label("Class:");
        let class_text = labels.get(*label).cloned().unwrap_or_default();
        egui::ComboBox::from_id_source("class_selector")
            .selected_text(class_text)
            .show_ui(ui, |ui| {
                for (i, name) in labels.iter().enumerate() {
                    ui.selectable_value(label, i, name);
                }
            });

        ui.separator();

        if ui
            .add_enabled(has_selection, egui::Button::new("Delete Box"))
            .on_hover_text("Delete the selected box (Del)")
            .clicked()
        {
            action = ToolbarAction::DeleteSelected;
        }

        ui.separator();

        ui.label(
            egui::RichText::new("Drag to draw a box, click a box to select it")
                .italics()
                .weak(),
        );
    });

    action
}

/// Summary shown in the status line.
pub struct Status<'a> {
    pub position: Option<(usize, usize)>,
    pub image_path: Option<&'a Path>,
    pub image_size: Option<(u32, u32)>,
    pub box_count: usize,
    pub selected: Option<usize>,
}

/// Display the status line.
pub fn status(ui: &mut egui::Ui, status: &Status<'_>) {
    ui.horizontal(|ui| {
        match (status.position, status.image_path) {
            (Some((index, total)), Some(path)) => {
                ui.label(format!("{} / {}", index + 1, total));
                ui.separator();
                ui.label(file_name(path));
            }
            _ => {
                ui.label("No image loaded");
            }
        }
        if let Some((w, h)) = status.image_size {
            ui.separator();
            ui.label(format!("{}x{}", w, h));
        }
        ui.separator();
        ui.label(format!("Boxes: {}", status.box_count));
        if let Some(i) = status.selected {
            ui.separator();
            ui.label(format!("Selected: #{}", i + 1));
        }
    });
}
