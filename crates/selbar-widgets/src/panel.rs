//! The triggered panel: frame and dragbar.

use egui::{
    Align2, Color32, CornerRadius, CursorIcon, Frame, Margin, Rect, Sense, Stroke, Ui, Vec2, pos2,
    vec2,
};

use crate::{sizing, theme::Palette};

/// Create the panel frame with shadow.
pub fn panel_frame(palette: &Palette) -> Frame {
    Frame::new()
        .fill(palette.panel_bg)
        .corner_radius(CornerRadius::same(sizing::PANEL_RADIUS))
        .stroke(Stroke::new(1.0, palette.border))
        .shadow(egui::epaint::Shadow {
            spread: 0,
            blur: 8,
            offset: [0, 2],
            color: Color32::from_black_alpha(15),
        })
        .inner_margin(Margin::same(8))
}

/// What happened on the dragbar this frame.
pub struct DragbarResponse {
    /// A drag gesture began.
    pub drag_started: bool,
    /// The pointer moved while dragging.
    pub dragged: bool,
    /// Pointer movement this frame, valid while `dragged`.
    pub drag_delta: Vec2,
    /// The drag gesture ended.
    pub drag_stopped: bool,
    /// The close glyph was clicked.
    pub close_clicked: bool,
}

/// Show the panel dragbar: a grab handle with a title and, when closeable, a
/// close glyph on the right.
pub fn dragbar(ui: &mut Ui, title: &str, palette: &Palette, closeable: bool) -> DragbarResponse {
    let size = vec2(ui.available_width(), sizing::DRAGBAR_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(size, Sense::drag());

    // The close glyph sits inside the drag rect; a click wins over the drag
    // because egui resolves the later interact on top.
    let close_rect = Rect::from_center_size(
        pos2(rect.right() - sizing::DRAGBAR_HEIGHT / 2.0, rect.center().y),
        vec2(sizing::DRAGBAR_HEIGHT, sizing::DRAGBAR_HEIGHT),
    );
    let close_response = if closeable {
        Some(ui.interact(close_rect, ui.id().with("close"), Sense::click()))
    } else {
        None
    };

    if ui.is_rect_visible(rect) {
        ui.painter().text(
            pos2(rect.left() + 4.0, rect.center().y),
            Align2::LEFT_CENTER,
            title,
            egui::FontId::proportional(12.0),
            palette.text_muted,
        );

        if let Some(close) = &close_response {
            if close.hovered() {
                ui.painter().rect_filled(
                    close_rect,
                    CornerRadius::same(sizing::CORNER_RADIUS),
                    palette.hover_bg,
                );
            }
            ui.painter().text(
                close_rect.center(),
                Align2::CENTER_CENTER,
                "✕",
                egui::FontId::proportional(12.0),
                palette.text_muted,
            );
        }
    }

    let close_clicked = close_response
        .as_ref()
        .is_some_and(|close| close.clicked());
    if let Some(close) = close_response {
        close.on_hover_cursor(CursorIcon::PointingHand);
    }
    response.clone().on_hover_cursor(CursorIcon::Grab);

    DragbarResponse {
        drag_started: response.drag_started(),
        dragged: response.dragged(),
        drag_delta: response.drag_delta(),
        drag_stopped: response.drag_stopped(),
        close_clicked,
    }
}
