// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and box annotation.
//!
//! This module composes the frame shown over the image (persisted boxes,
//! the selected box, the rectangle being drawn) and paints it with egui.
//! It also reports raw pointer events in canvas coordinates; interpreting
//! them is left to the interaction state machine.

use crate::models::annotation::{BBox, Point};
use crate::util::geometry::{Size, Viewport};

/// Visual role of a rectangle in the composed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxStyle {
    Normal,
    Selected,
    Preview,
}

impl BoxStyle {
    pub fn color(self) -> egui::Color32 {
        match self {
            BoxStyle::Normal => egui::Color32::GREEN,
            BoxStyle::Selected => egui::Color32::RED,
            BoxStyle::Preview => egui::Color32::LIGHT_BLUE,
        }
    }
}

/// A rectangle to draw, in canvas (screen) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRect {
    pub min: Point,
    pub max: Point,
    pub style: BoxStyle,
    pub label: Option<String>,
}

/// Everything drawn on top of the scaled image, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub rects: Vec<FrameRect>,
}

/// Compose the overlay for one frame.
///
/// Boxes are mapped to screen space in storage order, so later boxes end
/// up on top. The preview rectangle is already in screen space and is
/// drawn last.
pub fn compose(
    viewport: &Viewport,
    boxes: &[BBox],
    selected: Option<usize>,
    preview: Option<(Point, Point)>,
) -> Frame {
    let mut rects: Vec<FrameRect> = boxes
        .iter()
        .enumerate()
        .map(|(i, b)| FrameRect {
            min: viewport.image_to_screen(Point::new(b.x1() as f64, b.y1() as f64)),
            max: viewport.image_to_screen(Point::new(b.x2() as f64, b.y2() as f64)),
            style: if selected == Some(i) {
                BoxStyle::Selected
            } else {
                BoxStyle::Normal
            },
            label: (!b.label().is_empty()).then(|| b.label().to_string()),
        })
        .collect();

    if let Some((a, b)) = preview {
        rects.push(FrameRect {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
            style: BoxStyle::Preview,
            label: None,
        });
    }

    Frame { rects }
}

/// Pointer input on the canvas, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    Press(Point),
    Move(Point),
    /// Primary button released; the position is missing if the pointer left the window.
    Release(Option<Point>),
}

/// Result of showing the canvas for one frame.
pub struct CanvasOutput {
    /// Mapping in effect this frame, if an image is displayed.
    pub viewport: Option<Viewport>,
    pub actions: Vec<CanvasAction>,
}

/// Display the canvas and collect pointer input.
pub fn show(
    ui: &mut egui::Ui,
    image: Option<(&egui::TextureHandle, Size)>,
    boxes: &[BBox],
    selected: Option<usize>,
    preview: Option<(Point, Point)>,
) -> CanvasOutput {
    let mut output = CanvasOutput {
        viewport: None,
        actions: Vec::new(),
    };

    let (canvas_rect, response) =
        ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
    let painter = ui.painter_at(canvas_rect);
    painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));

    let Some((texture, image_size)) = image else {
        painter.text(
            canvas_rect.center(),
            egui::Align2::CENTER_CENTER,
            "No image loaded",
            egui::FontId::proportional(16.0),
            egui::Color32::from_gray(180),
        );
        return output;
    };

    let canvas_size = Size::new(canvas_rect.width() as u32, canvas_rect.height() as u32);
    let Some(viewport) = Viewport::fit(image_size, canvas_size) else {
        return output;
    };
    output.viewport = Some(viewport);

    let (off_x, off_y) = viewport.offset();
    let pixmap_rect = egui::Rect::from_min_size(
        canvas_rect.min + egui::vec2(off_x as f32, off_y as f32),
        egui::vec2(viewport.pixmap.width as f32, viewport.pixmap.height as f32),
    );
    painter.image(
        texture.id(),
        pixmap_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    let frame = compose(&viewport, boxes, selected, preview);
    paint_frame(&painter, &frame, canvas_rect.min);

    let to_canvas = |pos: egui::Pos2| {
        let local = pos - canvas_rect.min;
        Point::new(local.x as f64, local.y as f64)
    };
    ui.input(|i| {
        let pos = i.pointer.latest_pos();
        if i.pointer.primary_pressed() && response.hovered() {
            if let Some(pos) = i.pointer.interact_pos() {
                output.actions.push(CanvasAction::Press(to_canvas(pos)));
            }
        }
        if i.pointer.primary_down() && i.pointer.delta() != egui::Vec2::ZERO {
            if let Some(pos) = pos {
                output.actions.push(CanvasAction::Move(to_canvas(pos)));
            }
        }
        if i.pointer.primary_released() {
            output.actions.push(CanvasAction::Release(pos.map(to_canvas)));
        }
    });

    output
}

fn paint_frame(painter: &egui::Painter, frame: &Frame, origin: egui::Pos2) {
    for rect in &frame.rects {
        let color = rect.style.color();
        let min = origin + egui::vec2(rect.min.x as f32, rect.min.y as f32);
        let max = origin + egui::vec2(rect.max.x as f32, rect.max.y as f32);
        painter.rect_stroke(
            egui::Rect::from_min_max(min, max),
            0.0,
            egui::Stroke::new(2.0, color),
        );

        if let Some(label) = &rect.label {
            painter.text(
                min - egui::vec2(0.0, 5.0),
                egui::Align2::LEFT_BOTTOM,
                label,
                egui::FontId::proportional(14.0),
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        // 800x600 image in a 500x300 canvas: scale 0.5, offset (50, 0)
        Viewport::fit(Size::new(800, 600), Size::new(500, 300)).unwrap()
    }

    #[test]
    fn test_boxes_are_scaled() {
        let boxes = vec![BBox::new(200, 200, 600, 500, "person")];
        let frame = compose(&viewport(), &boxes, None, None);

        assert_eq!(frame.rects.len(), 1);
        assert_eq!(frame.rects[0].min, Point::new(150.0, 100.0));
        assert_eq!(frame.rects[0].max, Point::new(350.0, 250.0));
        assert_eq!(frame.rects[0].label.as_deref(), Some("person"));
    }

    #[test]
    fn test_selected_box_is_highlighted() {
        let boxes = vec![
            BBox::new(0, 0, 10, 10, "a"),
            BBox::new(5, 5, 15, 15, "b"),
            BBox::new(20, 20, 30, 30, ""),
        ];
        let frame = compose(&viewport(), &boxes, Some(1), None);
        let styles: Vec<BoxStyle> = frame.rects.iter().map(|r| r.style).collect();
        assert_eq!(styles, vec![BoxStyle::Normal, BoxStyle::Selected, BoxStyle::Normal]);
        assert_eq!(frame.rects[2].label, None);
    }

    #[test]
    fn test_stale_selection_highlights_nothing() {
        let boxes = vec![BBox::new(0, 0, 10, 10, "a")];
        let frame = compose(&viewport(), &boxes, Some(3), None);
        assert_eq!(frame.rects[0].style, BoxStyle::Normal);
    }

    #[test]
    fn test_preview_is_drawn_last_unscaled() {
        let boxes = vec![BBox::new(0, 0, 10, 10, "a")];
        let preview = Some((Point::new(250.0, 120.0), Point::new(150.0, 20.0)));
        let frame = compose(&viewport(), &boxes, None, preview);

        let last = frame.rects.last().unwrap();
        assert_eq!(last.style, BoxStyle::Preview);
        assert_eq!(last.min, Point::new(150.0, 20.0));
        assert_eq!(last.max, Point::new(250.0, 120.0));
        assert_eq!(last.label, None);
    }

    #[test]
    fn test_styles_have_distinct_colors() {
        let colors = [
            BoxStyle::Normal.color(),
            BoxStyle::Selected.color(),
            BoxStyle::Preview.color(),
        ];
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[0], colors[2]);
        assert_ne!(colors[1], colors[2]);
    }
}
