//! Selbar Core Library
//!
//! Platform-agnostic logic for a floating selection toolbar: the widget that
//! appears next to a text selection, offers a row of pluggable tools, and
//! becomes a persistent draggable panel once a tool is invoked.
//!
//! The crate is split along the widget's two state machines:
//! - [`geometry`] — the position engine: viewport clamping plus the
//!   anchor/drag-offset split.
//! - [`mode`] — the mode controller: toolbar vs. triggered panel.
//! - [`widget`] — the shell that owns both, merges config notifications, and
//!   picks the view to render each frame.
//!
//! Rendering, config persistence, concrete tools, and the host's selection
//! APIs stay outside; they plug in through [`config::ConfigStore`],
//! [`tools::ToolRegistry`], and [`selection::SelectionSource`].

pub mod config;
pub mod geometry;
pub mod mode;
pub mod selection;
pub mod tools;
pub mod widget;

pub use config::{
    ConfigError, ConfigPatch, ConfigResult, ConfigSnapshot, ConfigStore, ConfigWatch,
    MemoryConfigStore, ThemeMode,
};
pub use geometry::{DragState, clamp_to_viewport, clamp_window_width, panel_width};
pub use mode::{ActivateError, ModeController, PendingPrompt, WidgetMode};
pub use selection::{SelectionSource, SharedSelection};
pub use tools::{PromptError, PromptResult, ToolDescriptor, ToolRegistry};
pub use widget::{FloatingWidget, FrameBounds, WidgetEvent, WidgetParams, WidgetView};

use std::future::Future;
use std::pin::Pin;

/// Boxed future for async operations (compatible with single-threaded WASM
/// hosts, so no `Send` bound).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;
