//! The tool-registry collaborator: an ordered catalog of selection tools.
//!
//! Tools are supplied by the host. The widget only reads them: registry order
//! is the render order, and each descriptor's prompt generator is invoked
//! with the selection text captured at activation time.

use crate::BoxFuture;
use std::fmt;
use thiserror::Error;

/// Error surfaced by a tool's prompt generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("prompt generation failed: {0}")]
pub struct PromptError(pub String);

/// Result of prompt generation.
pub type PromptResult = Result<String, PromptError>;

type GenPrompt = Box<dyn Fn(&str) -> BoxFuture<'static, PromptResult>>;

/// One selection tool: icon, label, and an async prompt generator.
/// Immutable once registered.
pub struct ToolDescriptor {
    key: String,
    icon: String,
    label: String,
    gen_prompt: GenPrompt,
}

impl ToolDescriptor {
    /// Create a descriptor with an arbitrary async prompt generator.
    pub fn new(
        key: impl Into<String>,
        icon: impl Into<String>,
        label: impl Into<String>,
        gen_prompt: impl Fn(&str) -> BoxFuture<'static, PromptResult> + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            icon: icon.into(),
            label: label.into(),
            gen_prompt: Box::new(gen_prompt),
        }
    }

    /// Convenience constructor for tools whose prompt is a fixed instruction
    /// followed by the selection text.
    pub fn from_template(
        key: impl Into<String>,
        icon: impl Into<String>,
        label: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        let template = template.into();
        Self::new(key, icon, label, move |selection| {
            let prompt = format!("{template}\n{selection}");
            Box::pin(async move { Ok(prompt) })
        })
    }

    /// Opaque key the config's active-tool list refers to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Icon glyph or asset name for the toolbar button.
    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Human-readable tooltip label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Start prompt generation for the given selection text.
    pub fn gen_prompt(&self, selection: &str) -> BoxFuture<'static, PromptResult> {
        (self.gen_prompt)(selection)
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("key", &self.key)
            .field("icon", &self.icon)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Ordered mapping from tool key to descriptor.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool at the end of the order. Re-registering an existing
    /// key replaces the descriptor in place, keeping its position.
    pub fn register(&mut self, tool: ToolDescriptor) {
        if let Some(existing) = self.tools.iter_mut().find(|t| t.key == tool.key) {
            *existing = tool;
        } else {
            self.tools.push(tool);
        }
    }

    /// Look up a tool by key.
    pub fn get(&self, key: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.key == key)
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::task::{Context, Poll, Waker};

    fn poll_now<T>(mut future: BoxFuture<'static, T>) -> T {
        let mut cx = Context::from_waker(Waker::noop());
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(value) => value,
            Poll::Pending => panic!("future not immediately ready"),
        }
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolDescriptor::from_template("a", "A", "Tool A", "do a"));
        registry.register(ToolDescriptor::from_template("b", "B", "Tool B", "do b"));
        registry.register(ToolDescriptor::from_template("c", "C", "Tool C", "do c"));

        let keys: Vec<&str> = registry.iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reregister_keeps_position() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolDescriptor::from_template("a", "A", "Tool A", "do a"));
        registry.register(ToolDescriptor::from_template("b", "B", "Tool B", "do b"));
        registry.register(ToolDescriptor::from_template("a", "A2", "Tool A v2", "do a"));

        let keys: Vec<&str> = registry.iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(registry.get("a").unwrap().icon(), "A2");
    }

    #[test]
    fn test_template_prompt() {
        let tool = ToolDescriptor::from_template(
            "summarize",
            "S",
            "Summarize",
            "Summarize the following:",
        );
        let prompt = poll_now(tool.gen_prompt("some selected text")).unwrap();
        assert_eq!(prompt, "Summarize the following:\nsome selected text");
    }

    #[test]
    fn test_get_unknown_key() {
        let registry = ToolRegistry::new();
        assert!(registry.get("missing").is_none());
    }
}
