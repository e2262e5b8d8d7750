//! The selecting-mode toolbar: a framed row of tool icon buttons.

use egui::{
    Align2, Color32, CornerRadius, CursorIcon, Frame, Margin, Sense, Stroke, Ui, vec2,
};

use crate::{sizing, theme::Palette};

/// A tool button showing a single glyph, with a tooltip label.
pub struct ToolButton<'a> {
    glyph: &'a str,
    tooltip: &'a str,
    palette: &'a Palette,
}

impl<'a> ToolButton<'a> {
    /// Create a new tool button.
    pub fn new(glyph: &'a str, tooltip: &'a str, palette: &'a Palette) -> Self {
        Self {
            glyph,
            tooltip,
            palette,
        }
    }

    /// Show the button and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let size = vec2(sizing::TOOL, sizing::TOOL);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        if ui.is_rect_visible(rect) {
            let bg_color = if response.hovered() {
                self.palette.hover_bg
            } else {
                Color32::TRANSPARENT
            };

            ui.painter()
                .rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), bg_color);

            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.glyph,
                egui::FontId::proportional(sizing::TOOL_ICON),
                self.palette.text,
            );
        }

        let clicked = response.clicked();
        response
            .on_hover_text(self.tooltip)
            .on_hover_cursor(CursorIcon::PointingHand);
        clicked
    }
}

/// Create the toolbar row frame.
pub fn toolbar_frame(palette: &Palette) -> Frame {
    Frame::new()
        .fill(palette.panel_bg)
        .corner_radius(CornerRadius::same(sizing::PANEL_RADIUS))
        .stroke(Stroke::new(1.0, palette.border))
        .shadow(egui::epaint::Shadow {
            spread: 0,
            blur: 6,
            offset: [0, 2],
            color: Color32::from_black_alpha(10),
        })
        .inner_margin(Margin::symmetric(6, 4))
}
