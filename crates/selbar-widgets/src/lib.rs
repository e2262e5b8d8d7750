//! egui rendering for the floating selection toolbar.
//!
//! This crate draws what [`selbar_core`] decides:
//!
//! - **Toolbar**: the row of tool icon buttons shown while selecting
//! - **Panel**: the draggable triggered panel with its dragbar
//! - **Overlay**: the glue that measures, updates, and renders the widget
//!   as a floating egui `Area` each frame
//!
//! All components are theme-aware: a [`theme::Palette`] resolved from the
//! configured [`selbar_core::ThemeMode`] is threaded through every draw call.

pub mod overlay;
pub mod panel;
pub mod toolbar;

pub use overlay::FloatingOverlay;
pub use panel::{DragbarResponse, dragbar, panel_frame};
pub use toolbar::{ToolButton, toolbar_frame};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Tool button size in the toolbar row
    pub const TOOL: f32 = 28.0;
    /// Glyph size inside a tool button
    pub const TOOL_ICON: f32 = 16.0;
    /// Height of the panel dragbar
    pub const DRAGBAR_HEIGHT: f32 = 22.0;
    /// Standard corner radius
    pub const CORNER_RADIUS: u8 = 4;
    /// Panel corner radius
    pub const PANEL_RADIUS: u8 = 8;
}

/// Light and dark palettes resolved from the configured theme mode.
pub mod theme {
    use egui::Color32;
    use selbar_core::ThemeMode;

    /// Colors for one theme.
    pub struct Palette {
        /// Text color
        pub text: Color32,
        /// Muted text color (dragbar title, close glyph)
        pub text_muted: Color32,
        /// Border color
        pub border: Color32,
        /// Accent color (logo glyph)
        pub accent: Color32,
        /// Hover background
        pub hover_bg: Color32,
        /// Panel and toolbar background
        pub panel_bg: Color32,
    }

    pub const LIGHT: Palette = Palette {
        text: Color32::from_rgb(60, 60, 60),
        text_muted: Color32::from_rgb(120, 120, 120),
        border: Color32::from_rgb(220, 220, 220),
        accent: Color32::from_rgb(59, 130, 246),
        hover_bg: Color32::from_rgb(245, 245, 245),
        panel_bg: Color32::from_rgba_premultiplied(250, 250, 252, 250),
    };

    pub const DARK: Palette = Palette {
        text: Color32::from_rgb(220, 220, 220),
        text_muted: Color32::from_rgb(150, 150, 150),
        border: Color32::from_rgb(70, 70, 70),
        accent: Color32::from_rgb(96, 165, 250),
        hover_bg: Color32::from_rgb(55, 55, 58),
        panel_bg: Color32::from_rgba_premultiplied(38, 38, 42, 250),
    };

    /// Resolve the palette for a theme mode. `dark_ui` is the host UI's own
    /// dark-mode flag, consulted only in `Auto`.
    pub fn palette(mode: ThemeMode, dark_ui: bool) -> &'static Palette {
        match mode {
            ThemeMode::Light => &LIGHT,
            ThemeMode::Dark => &DARK,
            ThemeMode::Auto => {
                if dark_ui {
                    &DARK
                } else {
                    &LIGHT
                }
            }
        }
    }
}
