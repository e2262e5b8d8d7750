//! The mode controller: tool row vs. triggered panel.
//!
//! The transition is strictly one-way. Once a tool's prompt resolves the
//! widget becomes a panel for the rest of its life; reopening the toolbar is
//! the host's job (destroy and recreate).

use crate::BoxFuture;
use crate::config::ConfigSnapshot;
use crate::tools::{PromptResult, ToolDescriptor, ToolRegistry};
use std::task::{Context, Poll, Waker};
use thiserror::Error;

/// Which of the two structurally distinct views the widget renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetMode {
    /// Row of tool icons next to the selection.
    #[default]
    Selecting,
    /// Persistent draggable panel showing the triggered tool's output.
    Triggered,
}

/// Errors from [`ModeController::activate`]. Both are reported to the host,
/// never panicked across the render boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivateError {
    #[error("unknown selection tool: {0}")]
    UnknownTool(String),
    #[error("tool activation after the panel already opened")]
    AlreadyTriggered,
}

/// An in-flight tool activation.
///
/// The generator future already holds the selection text captured when
/// `activate` was called; later selection updates never leak into it.
/// Dropping the value discards the eventual resolution, which is how
/// teardown cancels a pending activation.
pub struct PendingPrompt {
    key: String,
    future: BoxFuture<'static, PromptResult>,
}

impl std::fmt::Debug for PendingPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingPrompt")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl PendingPrompt {
    /// Key of the tool being activated.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Poll once with a no-op waker. Returns `None` until the generator
    /// resolves; the shell polls again on the next update turn.
    pub fn poll(&mut self) -> Option<PromptResult> {
        let mut cx = Context::from_waker(Waker::noop());
        match self.future.as_mut().poll(&mut cx) {
            Poll::Ready(result) => Some(result),
            Poll::Pending => None,
        }
    }
}

/// Decides the active mode and, while selecting, the tool list to render.
pub struct ModeController {
    mode: WidgetMode,
    selection_text: String,
    prompt: Option<String>,
}

impl ModeController {
    /// Initial state comes from the host's construction parameters; a widget
    /// restored into triggered mode carries its prompt along.
    pub fn new(
        selection_text: impl Into<String>,
        triggered: bool,
        initial_prompt: Option<String>,
    ) -> Self {
        Self {
            mode: if triggered {
                WidgetMode::Triggered
            } else {
                WidgetMode::Selecting
            },
            selection_text: selection_text.into(),
            prompt: initial_prompt,
        }
    }

    pub fn mode(&self) -> WidgetMode {
        self.mode
    }

    pub fn selection_text(&self) -> &str {
        &self.selection_text
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Replace the selection text. Ignored once triggered: the prompt has
    /// already captured the text it was generated from.
    pub fn set_selection_text(&mut self, text: impl Into<String>) {
        if self.mode == WidgetMode::Selecting {
            self.selection_text = text.into();
        }
    }

    /// Begin activating a tool, capturing the current selection text into the
    /// returned future (snapshot-on-call). Fails without any state change
    /// when the key is unknown or the panel is already open.
    pub fn activate(
        &self,
        registry: &ToolRegistry,
        key: &str,
    ) -> Result<PendingPrompt, ActivateError> {
        if self.mode == WidgetMode::Triggered {
            return Err(ActivateError::AlreadyTriggered);
        }
        let Some(tool) = registry.get(key) else {
            return Err(ActivateError::UnknownTool(key.to_string()));
        };
        Ok(PendingPrompt {
            key: key.to_string(),
            future: tool.gen_prompt(&self.selection_text),
        })
    }

    /// Commit a resolved prompt: set it and switch to the panel, atomically.
    /// Returns `false` (and changes nothing) if the transition already
    /// happened.
    pub fn commit_prompt(&mut self, prompt: String) -> bool {
        if self.mode == WidgetMode::Triggered {
            return false;
        }
        self.prompt = Some(prompt);
        self.mode = WidgetMode::Triggered;
        true
    }

    /// Tools to render while selecting: the registry's order filtered down to
    /// the configured active set. Config order is deliberately ignored so the
    /// row stays stable regardless of how the active list was saved.
    pub fn visible_tools<'r>(
        &self,
        registry: &'r ToolRegistry,
        config: &ConfigSnapshot,
    ) -> Vec<&'r ToolDescriptor> {
        registry
            .iter()
            .filter(|tool| {
                config
                    .active_selection_tools
                    .iter()
                    .any(|key| key == tool.key())
            })
            .collect()
    }
}
