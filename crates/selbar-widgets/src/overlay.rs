//! The overlay glue: measures, updates, and renders a [`FloatingWidget`] as a
//! floating egui `Area` each frame.

use egui::{Context, Order, RichText, Ui};
use selbar_core::{FloatingWidget, FrameBounds, ToolRegistry, WidgetView};

use crate::panel::{dragbar, panel_frame};
use crate::theme;
use crate::toolbar::{ToolButton, toolbar_frame};
use crate::sizing;

/// Renders one floating widget. The id keys the egui `Area`, so two widgets
/// on screen need two overlays with distinct ids.
pub struct FloatingOverlay {
    id: egui::Id,
}

impl FloatingOverlay {
    /// Create an overlay with a unique id source.
    pub fn new(id_source: impl std::hash::Hash) -> Self {
        Self {
            id: egui::Id::new(id_source),
        }
    }

    /// Run one frame: advance the widget, then draw whichever view it picked.
    /// `content` fills the triggered panel body below the dragbar and receives
    /// the resolved prompt.
    pub fn show(
        &self,
        ctx: &Context,
        widget: &mut FloatingWidget,
        registry: &ToolRegistry,
        content: impl FnOnce(&mut Ui, &str),
    ) {
        let viewport = ctx.screen_rect();
        let measured = ctx.memory(|m| m.area_rect(self.id));
        let bounds = FrameBounds {
            // First frame has no measured rect yet; a unit box keeps the
            // anchor inside the viewport until one exists.
            widget: measured.map_or(kurbo::Size::new(1.0, 1.0), |r| to_kurbo_size(r.size())),
            viewport: to_kurbo_rect(viewport),
        };
        widget.update(bounds);

        // No waker drives the boxed futures; keep frames coming while one is
        // in flight.
        if widget.has_pending_activation() || widget.is_fetching_config() {
            ctx.request_repaint();
        }

        let dark_ui = ctx.style().visuals.dark_mode;
        match widget.view(registry, f64::from(viewport.width())) {
            WidgetView::Pending | WidgetView::Hidden => {}
            WidgetView::Toolbar {
                theme,
                tools,
                position,
            } => {
                let palette = theme::palette(theme, dark_ui);
                let mut clicked = None;
                egui::Area::new(self.id)
                    .order(Order::Foreground)
                    .fixed_pos(to_pos2(position))
                    .show(ctx, |ui| {
                        toolbar_frame(palette).show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(
                                    RichText::new("❖")
                                        .color(palette.accent)
                                        .size(sizing::TOOL_ICON),
                                );
                                for tool in &tools {
                                    if ToolButton::new(tool.icon(), tool.label(), palette).show(ui)
                                    {
                                        clicked = Some(tool.key().to_string());
                                    }
                                }
                            });
                        });
                    });
                if let Some(key) = clicked {
                    widget.activate(registry, &key);
                }
            }
            WidgetView::Panel {
                theme,
                prompt,
                position,
                width,
                closeable,
            } => {
                let prompt = prompt.to_owned();
                let palette = theme::palette(theme, dark_ui);
                egui::Area::new(self.id)
                    .order(Order::Foreground)
                    .fixed_pos(to_pos2(position))
                    .show(ctx, |ui| {
                        panel_frame(palette).show(ui, |ui| {
                            ui.set_width(width as f32);
                            let bar = dragbar(ui, "Selbar", palette, closeable);
                            if bar.drag_started {
                                widget.begin_drag();
                            }
                            if bar.dragged {
                                widget.drag_by(to_kurbo_vec2(bar.drag_delta));
                            }
                            if bar.drag_stopped {
                                widget.end_drag();
                            }
                            if bar.close_clicked {
                                widget.close();
                            }
                            content(ui, &prompt);
                        });
                    });
            }
        }
    }
}

fn to_pos2(p: kurbo::Point) -> egui::Pos2 {
    egui::pos2(p.x as f32, p.y as f32)
}

fn to_kurbo_size(s: egui::Vec2) -> kurbo::Size {
    kurbo::Size::new(f64::from(s.x), f64::from(s.y))
}

fn to_kurbo_vec2(v: egui::Vec2) -> kurbo::Vec2 {
    kurbo::Vec2::new(f64::from(v.x), f64::from(v.y))
}

fn to_kurbo_rect(r: egui::Rect) -> kurbo::Rect {
    kurbo::Rect::new(
        f64::from(r.left()),
        f64::from(r.top()),
        f64::from(r.right()),
        f64::from(r.bottom()),
    )
}
