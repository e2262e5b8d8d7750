//! The widget shell: owns the anchor, the drag state, the mode controller,
//! and the config subscription, and picks which view to render each frame.
//!
//! Everything here runs in one event-loop turn per `update`. The only
//! suspension points are the initial config fetch and a pending tool
//! activation, both held as boxed futures and polled once per update with a
//! no-op waker.

use crate::BoxFuture;
use crate::config::{ConfigError, ConfigResult, ConfigSnapshot, ConfigStore, ConfigWatch, ThemeMode};
use crate::geometry::{DragState, clamp_to_viewport, panel_width};
use crate::mode::{ActivateError, ModeController, PendingPrompt, WidgetMode};
use crate::selection::SelectionSource;
use crate::tools::{PromptError, ToolDescriptor, ToolRegistry};
use kurbo::{Point, Rect, Size, Vec2};
use std::task::{Context, Poll, Waker};
use uuid::Uuid;

/// Construction parameters supplied by the host when a selection appears.
#[derive(Debug, Clone)]
pub struct WidgetParams {
    /// Conversation session this widget belongs to.
    pub session: Uuid,
    /// Selection text at creation time.
    pub selection_text: String,
    /// Where the host placed the widget, in page coordinates.
    pub initial_position: Point,
    /// Start directly in panel mode (e.g. restored state).
    pub triggered: bool,
    /// Whether the panel shows a close control.
    pub closeable: bool,
    /// Prompt carried along when `triggered` is set.
    pub initial_prompt: Option<String>,
}

impl WidgetParams {
    /// Fresh toolbar-mode parameters for a new selection.
    pub fn new(selection_text: impl Into<String>, initial_position: Point) -> Self {
        Self {
            session: Uuid::new_v4(),
            selection_text: selection_text.into(),
            initial_position,
            triggered: false,
            closeable: true,
            initial_prompt: None,
        }
    }
}

/// Per-update measurements from the host container. The shell never assumes
/// document-level singleton layout; the host measures and passes these in.
#[derive(Debug, Clone, Copy)]
pub struct FrameBounds {
    /// Current size of the widget's own bounding box.
    pub widget: Size,
    /// Visible viewport in page coordinates.
    pub viewport: Rect,
}

/// Host-visible notifications drained via [`FloatingWidget::take_events`].
#[derive(Debug)]
pub enum WidgetEvent {
    /// The initial config fetch failed; the widget stays pending.
    ConfigFetchFailed(ConfigError),
    /// `activate` was called with a key missing from the registry. A
    /// programming-error signal: the filtered tool row should make this
    /// impossible.
    UnknownTool(String),
    /// The tool's prompt generator rejected; the widget stays in the toolbar.
    PromptFailed { key: String, error: PromptError },
    /// The close control was used.
    Closed,
}

/// What to render this frame. One payload shape per state, so render code
/// for the inactive mode is unreachable.
#[derive(Debug)]
pub enum WidgetView<'w, 'r> {
    /// First config fetch has not resolved (or failed); render nothing.
    Pending,
    /// No active tools configured; render nothing rather than an empty shell.
    Hidden,
    /// Selecting mode: the row of tool icons.
    Toolbar {
        theme: ThemeMode,
        tools: Vec<&'r ToolDescriptor>,
        position: Point,
    },
    /// Triggered mode: the draggable content panel.
    Panel {
        theme: ThemeMode,
        prompt: &'w str,
        position: Point,
        width: f64,
        closeable: bool,
    },
}

enum ConfigState {
    Fetching(BoxFuture<'static, ConfigResult<ConfigSnapshot>>),
    Ready(ConfigSnapshot),
    Failed,
}

/// The floating widget shell.
pub struct FloatingWidget {
    session: Uuid,
    anchor: Point,
    drag: DragState,
    controller: ModeController,
    config: ConfigState,
    watch: ConfigWatch,
    pending: Option<PendingPrompt>,
    selection_source: Option<Box<dyn SelectionSource>>,
    closeable: bool,
    on_close: Option<Box<dyn FnMut()>>,
    events: Vec<WidgetEvent>,
    closed: bool,
}

impl FloatingWidget {
    /// Build a widget, subscribe to config changes, and start the initial
    /// full fetch. The widget renders nothing until the fetch resolves.
    pub fn new(params: WidgetParams, store: &dyn ConfigStore) -> Self {
        Self {
            session: params.session,
            anchor: params.initial_position,
            drag: DragState::new(),
            controller: ModeController::new(
                params.selection_text,
                params.triggered,
                params.initial_prompt,
            ),
            config: ConfigState::Fetching(store.fetch_all()),
            watch: store.subscribe(),
            pending: None,
            selection_source: None,
            closeable: params.closeable,
            on_close: None,
            events: Vec::new(),
            closed: false,
        }
    }

    /// Poll the given source for selection text every update while in
    /// toolbar mode. For hosts without native selection-change events.
    pub fn with_selection_source(mut self, source: Box<dyn SelectionSource>) -> Self {
        self.selection_source = Some(source);
        self
    }

    /// Callback fired once when the panel's close control is used.
    pub fn with_on_close(mut self, on_close: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(on_close));
        self
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn mode(&self) -> WidgetMode {
        self.controller.mode()
    }

    /// Last committed position.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Anchor plus the in-flight drag offset: the coordinate handed to the
    /// render layer in both modes.
    pub fn effective_position(&self) -> Point {
        self.anchor + self.drag.offset()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Merged configuration, once the initial fetch has resolved.
    pub fn config(&self) -> Option<&ConfigSnapshot> {
        match &self.config {
            ConfigState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn has_pending_activation(&self) -> bool {
        self.pending.is_some()
    }

    /// True while the initial config fetch is still in flight. A render loop
    /// without a real waker should keep scheduling frames while this holds.
    pub fn is_fetching_config(&self) -> bool {
        matches!(self.config, ConfigState::Fetching(_))
    }

    /// Advance one event-loop turn: resolve in-flight futures, merge config
    /// patches in arrival order, refresh the selection, and re-clamp the
    /// anchor when no drag offset is outstanding.
    pub fn update(&mut self, bounds: FrameBounds) {
        self.poll_config();

        while let Some(patch) = self.watch.try_next() {
            match &mut self.config {
                ConfigState::Ready(snapshot) => snapshot.apply(patch),
                // Patches from before the fetch resolved are superseded by
                // the full snapshot.
                _ => {}
            }
        }

        if self.controller.mode() == WidgetMode::Selecting {
            if let Some(source) = &self.selection_source {
                if let Some(text) = source.current_selection() {
                    self.controller.set_selection_text(text);
                }
            }
        }

        if let Some(pending) = &mut self.pending {
            if let Some(result) = pending.poll() {
                let key = pending.key().to_string();
                self.pending = None;
                match result {
                    Ok(prompt) => {
                        if !self.controller.commit_prompt(prompt) {
                            log::debug!("discarding prompt for {key}: panel already open");
                        }
                    }
                    Err(error) => {
                        log::warn!("prompt generation for {key} failed: {error}");
                        self.events.push(WidgetEvent::PromptFailed { key, error });
                    }
                }
            }
        }

        // Self-correction after scrolls, resizes, and content growth. Only
        // runs while the drag offset is exactly zero, so a live drag never
        // jitters; this includes the very first update, before any drag.
        if self.drag.offset_is_zero() {
            self.anchor = clamp_to_viewport(self.anchor, bounds.widget, bounds.viewport);
        }
    }

    fn poll_config(&mut self) {
        if let ConfigState::Fetching(future) = &mut self.config {
            let mut cx = Context::from_waker(Waker::noop());
            match future.as_mut().poll(&mut cx) {
                Poll::Ready(Ok(snapshot)) => self.config = ConfigState::Ready(snapshot),
                Poll::Ready(Err(error)) => {
                    log::warn!("initial config fetch failed: {error}");
                    self.events.push(WidgetEvent::ConfigFetchFailed(error));
                    self.config = ConfigState::Failed;
                }
                Poll::Pending => {}
            }
        }
    }

    /// Begin activating a tool from the toolbar. Unknown keys and repeat
    /// activations are reported, never panicked, since this runs inside the
    /// render pass.
    pub fn activate(&mut self, registry: &ToolRegistry, key: &str) {
        if self.pending.is_some() {
            log::debug!("ignoring activation of {key}: another activation is pending");
            return;
        }
        match self.controller.activate(registry, key) {
            Ok(pending) => self.pending = Some(pending),
            Err(ActivateError::UnknownTool(key)) => {
                log::warn!("activation of unknown tool {key}");
                self.events.push(WidgetEvent::UnknownTool(key));
            }
            Err(ActivateError::AlreadyTriggered) => {
                log::debug!("ignoring activation of {key}: panel already open");
            }
        }
    }

    /// Arm the drag offset. Forwarded from the render layer's gesture start.
    pub fn begin_drag(&mut self) {
        self.drag.begin();
    }

    /// One drag-move tick.
    pub fn drag_by(&mut self, delta: Vec2) {
        self.drag.accumulate(delta);
    }

    /// Commit the gesture into the anchor. The follow-up clamp pass runs on
    /// the next update.
    pub fn end_drag(&mut self) {
        self.anchor = self.drag.end(self.anchor);
    }

    /// Fire the host's close callback. Idempotent; the host is expected to
    /// drop the widget afterwards.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.events.push(WidgetEvent::Closed);
        if let Some(on_close) = &mut self.on_close {
            on_close();
        }
    }

    /// Drain host-visible notifications accumulated since the last call.
    pub fn take_events(&mut self) -> Vec<WidgetEvent> {
        std::mem::take(&mut self.events)
    }

    /// Decide what to render this frame. `viewport_width` sizes the panel;
    /// both views share the same effective position.
    pub fn view<'w, 'r>(
        &'w self,
        registry: &'r ToolRegistry,
        viewport_width: f64,
    ) -> WidgetView<'w, 'r> {
        let config = match &self.config {
            ConfigState::Ready(config) => config,
            _ => return WidgetView::Pending,
        };
        match self.controller.mode() {
            WidgetMode::Triggered => WidgetView::Panel {
                theme: config.theme_mode,
                prompt: self.controller.prompt().unwrap_or(""),
                position: self.effective_position(),
                width: panel_width(viewport_width),
                closeable: self.closeable,
            },
            WidgetMode::Selecting => {
                let tools = self.controller.visible_tools(registry, config);
                if tools.is_empty() {
                    WidgetView::Hidden
                } else {
                    WidgetView::Toolbar {
                        theme: config.theme_mode,
                        tools,
                        position: self.effective_position(),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigPatch, MemoryConfigStore};
    use crate::selection::SharedSelection;
    use crate::tools::ToolDescriptor;
    use std::cell::RefCell;
    use std::future::Future;
    use std::pin::Pin;
    use std::rc::Rc;
    use std::task::{Context as TaskContext, Poll as TaskPoll};

    const BOUNDS: FrameBounds = FrameBounds {
        widget: Size::new(100.0, 50.0),
        viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
    };

    fn store_with_tools(tools: &[&str]) -> MemoryConfigStore {
        MemoryConfigStore::new(ConfigSnapshot {
            theme_mode: ThemeMode::Light,
            active_selection_tools: tools.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn registry_abc() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(ToolDescriptor::from_template("a", "A", "Tool A", "do a:"));
        registry.register(ToolDescriptor::from_template("b", "B", "Tool B", "do b:"));
        registry.register(ToolDescriptor::from_template("c", "C", "Tool C", "do c:"));
        registry
    }

    fn widget_at(pos: Point, store: &MemoryConfigStore) -> FloatingWidget {
        FloatingWidget::new(WidgetParams::new("hello", pos), store)
    }

    /// Resolves only after a value is pushed into the slot.
    struct ManualFuture(Rc<RefCell<Option<crate::tools::PromptResult>>>);

    impl Future for ManualFuture {
        type Output = crate::tools::PromptResult;

        fn poll(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>) -> TaskPoll<Self::Output> {
            match self.0.borrow_mut().take() {
                Some(result) => TaskPoll::Ready(result),
                None => TaskPoll::Pending,
            }
        }
    }

    fn manual_tool(key: &str) -> (ToolDescriptor, Rc<RefCell<Option<crate::tools::PromptResult>>>) {
        let slot: Rc<RefCell<Option<crate::tools::PromptResult>>> = Rc::default();
        let shared = Rc::clone(&slot);
        let tool = ToolDescriptor::new(key, "M", "Manual", move |_| {
            Box::pin(ManualFuture(Rc::clone(&shared)))
        });
        (tool, slot)
    }

    #[test]
    fn test_pending_until_config_fetch_resolves() {
        let store = store_with_tools(&["a"]);
        let registry = registry_abc();
        let mut widget = widget_at(Point::new(10.0, 10.0), &store);

        assert!(matches!(widget.view(&registry, 800.0), WidgetView::Pending));

        widget.update(BOUNDS);
        assert!(matches!(
            widget.view(&registry, 800.0),
            WidgetView::Toolbar { .. }
        ));
    }

    #[test]
    fn test_config_fetch_failure_stays_pending() {
        struct FailingStore(MemoryConfigStore);
        impl ConfigStore for FailingStore {
            fn fetch_all(&self) -> BoxFuture<'static, ConfigResult<ConfigSnapshot>> {
                Box::pin(async { Err(ConfigError::Fetch("backend gone".into())) })
            }
            fn subscribe(&self) -> ConfigWatch {
                self.0.subscribe()
            }
        }

        let store = FailingStore(MemoryConfigStore::default());
        let registry = registry_abc();
        let mut widget = FloatingWidget::new(
            WidgetParams::new("hello", Point::new(10.0, 10.0)),
            &store,
        );

        widget.update(BOUNDS);
        widget.update(BOUNDS);

        assert!(matches!(widget.view(&registry, 800.0), WidgetView::Pending));
        let events = widget.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], WidgetEvent::ConfigFetchFailed(_)));
    }

    #[test]
    fn test_hidden_when_no_active_tools() {
        let store = store_with_tools(&[]);
        let registry = registry_abc();
        let mut widget = widget_at(Point::new(10.0, 10.0), &store);

        widget.update(BOUNDS);
        assert!(matches!(widget.view(&registry, 800.0), WidgetView::Hidden));
    }

    #[test]
    fn test_toolbar_lists_tools_in_registry_order() {
        let store = store_with_tools(&["c", "a"]);
        let registry = registry_abc();
        let mut widget = widget_at(Point::new(10.0, 10.0), &store);

        widget.update(BOUNDS);
        match widget.view(&registry, 800.0) {
            WidgetView::Toolbar { tools, .. } => {
                let keys: Vec<&str> = tools.iter().map(|t| t.key()).collect();
                assert_eq!(keys, vec!["a", "c"]);
            }
            other => panic!("expected toolbar, got {other:?}"),
        }
    }

    #[test]
    fn test_first_update_clamps_anchor() {
        let store = store_with_tools(&["a"]);
        let mut widget = widget_at(Point::new(900.0, 900.0), &store);

        widget.update(BOUNDS);
        assert_eq!(widget.anchor(), Point::new(700.0, 550.0));
    }

    #[test]
    fn test_no_jitter_while_dragging() {
        let store = store_with_tools(&["a"]);
        let mut widget = widget_at(Point::new(100.0, 100.0), &store);
        widget.update(BOUNDS);

        widget.begin_drag();
        widget.drag_by(Vec2::new(750.0, 0.0));
        // Effective position may hang off-screen mid-drag; the anchor must
        // not move no matter how many updates run.
        widget.update(BOUNDS);
        widget.update(BOUNDS);
        assert_eq!(widget.anchor(), Point::new(100.0, 100.0));
        assert_eq!(widget.effective_position(), Point::new(850.0, 100.0));

        widget.end_drag();
        assert_eq!(widget.anchor(), Point::new(850.0, 100.0));
        // The commit's follow-up clamp pass runs on the next update.
        widget.update(BOUNDS);
        assert_eq!(widget.anchor(), Point::new(700.0, 100.0));
    }

    #[test]
    fn test_config_patches_merge_in_order() {
        let store = store_with_tools(&["a"]);
        let mut widget = widget_at(Point::new(10.0, 10.0), &store);
        widget.update(BOUNDS);

        store.push(ConfigPatch {
            theme_mode: Some(ThemeMode::Dark),
            ..Default::default()
        });
        store.push(ConfigPatch {
            theme_mode: Some(ThemeMode::Light),
            active_selection_tools: Some(vec!["b".into()]),
        });
        widget.update(BOUNDS);

        let config = widget.config().unwrap();
        assert_eq!(config.theme_mode, ThemeMode::Light);
        assert_eq!(config.active_selection_tools, vec!["b"]);
    }

    #[test]
    fn test_activation_transitions_to_panel() {
        let store = store_with_tools(&["a"]);
        let registry = registry_abc();
        let mut widget = widget_at(Point::new(10.0, 10.0), &store);
        widget.update(BOUNDS);

        widget.activate(&registry, "a");
        assert!(widget.has_pending_activation());
        widget.update(BOUNDS);

        assert_eq!(widget.mode(), WidgetMode::Triggered);
        match widget.view(&registry, 1000.0) {
            WidgetView::Panel { prompt, width, .. } => {
                assert_eq!(prompt, "do a:\nhello");
                assert_eq!(width, 400.0);
            }
            other => panic!("expected panel, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tool_activation_is_reported_noop() {
        let store = store_with_tools(&["a"]);
        let registry = registry_abc();
        let mut widget = widget_at(Point::new(10.0, 10.0), &store);
        widget.update(BOUNDS);

        widget.activate(&registry, "zz");
        widget.update(BOUNDS);

        assert_eq!(widget.mode(), WidgetMode::Selecting);
        let events = widget.take_events();
        assert!(matches!(&events[..], [WidgetEvent::UnknownTool(key)] if key == "zz"));
    }

    #[test]
    fn test_prompt_failure_stays_selecting_and_can_retry() {
        let store = store_with_tools(&["bad", "a"]);
        let mut registry = registry_abc();
        registry.register(ToolDescriptor::new("bad", "!", "Broken", |_| {
            Box::pin(async { Err(crate::tools::PromptError("offline".into())) })
        }));
        let mut widget = widget_at(Point::new(10.0, 10.0), &store);
        widget.update(BOUNDS);

        widget.activate(&registry, "bad");
        widget.update(BOUNDS);
        assert_eq!(widget.mode(), WidgetMode::Selecting);
        let events = widget.take_events();
        assert!(matches!(&events[..], [WidgetEvent::PromptFailed { key, .. }] if key == "bad"));

        // Recovery: a later activation still works.
        widget.activate(&registry, "a");
        widget.update(BOUNDS);
        assert_eq!(widget.mode(), WidgetMode::Triggered);
    }

    #[test]
    fn test_selection_source_polled_only_while_selecting() {
        let store = store_with_tools(&["a"]);
        let registry = registry_abc();
        let selection = SharedSelection::new();
        let mut widget = widget_at(Point::new(10.0, 10.0), &store)
            .with_selection_source(Box::new(selection.clone()));
        widget.update(BOUNDS);

        selection.set("updated");
        widget.update(BOUNDS);

        widget.activate(&registry, "a");
        widget.update(BOUNDS);
        assert_eq!(widget.mode(), WidgetMode::Triggered);

        // Frozen after the transition.
        selection.set("too late");
        widget.update(BOUNDS);
        match widget.view(&registry, 800.0) {
            WidgetView::Panel { prompt, .. } => assert_eq!(prompt, "do a:\nupdated"),
            other => panic!("expected panel, got {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_on_call_through_shell() {
        let store = store_with_tools(&["manual"]);
        let (tool, slot) = manual_tool("manual");
        let mut registry = ToolRegistry::new();
        registry.register(tool);

        let selection = SharedSelection::new();
        selection.set("Y");
        let mut widget = widget_at(Point::new(10.0, 10.0), &store)
            .with_selection_source(Box::new(selection.clone()));
        widget.update(BOUNDS);

        widget.activate(&registry, "manual");
        // Selection changes while the generator is pending; the manual tool
        // ignores its input, so resolve with a marker proving which call ran.
        selection.set("X");
        widget.update(BOUNDS);
        assert!(widget.has_pending_activation());
        assert_eq!(widget.mode(), WidgetMode::Selecting);

        *slot.borrow_mut() = Some(Ok("resolved".into()));
        widget.update(BOUNDS);
        assert_eq!(widget.mode(), WidgetMode::Triggered);
        match widget.view(&registry, 800.0) {
            WidgetView::Panel { prompt, .. } => assert_eq!(prompt, "resolved"),
            other => panic!("expected panel, got {other:?}"),
        }
    }

    #[test]
    fn test_second_activation_while_pending_is_ignored() {
        let store = store_with_tools(&["manual", "a"]);
        let (tool, slot) = manual_tool("manual");
        let mut registry = registry_abc();
        registry.register(tool);

        let mut widget = widget_at(Point::new(10.0, 10.0), &store);
        widget.update(BOUNDS);

        widget.activate(&registry, "manual");
        widget.activate(&registry, "a");
        widget.update(BOUNDS);
        assert!(widget.has_pending_activation());

        *slot.borrow_mut() = Some(Ok("from manual".into()));
        widget.update(BOUNDS);
        match widget.view(&registry, 800.0) {
            WidgetView::Panel { prompt, .. } => assert_eq!(prompt, "from manual"),
            other => panic!("expected panel, got {other:?}"),
        }
    }

    #[test]
    fn test_teardown_discards_pending_resolution() {
        let store = store_with_tools(&["manual"]);
        let (tool, slot) = manual_tool("manual");
        let mut registry = ToolRegistry::new();
        registry.register(tool);

        let mut widget = widget_at(Point::new(10.0, 10.0), &store);
        widget.update(BOUNDS);
        widget.activate(&registry, "manual");
        widget.update(BOUNDS);

        // slot is held by: this test, the descriptor's closure, and the
        // in-flight future owned by the widget.
        assert_eq!(Rc::strong_count(&slot), 3);
        drop(widget);
        assert_eq!(Rc::strong_count(&slot), 2);

        // Resolving now goes nowhere; nothing is left to observe it.
        *slot.borrow_mut() = Some(Ok("orphaned".into()));
    }

    #[test]
    fn test_drop_unsubscribes_from_config_store() {
        let store = store_with_tools(&["a"]);
        let widget = widget_at(Point::new(10.0, 10.0), &store);
        assert_eq!(store.subscriber_count(), 1);
        drop(widget);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_close_fires_callback_once() {
        let store = store_with_tools(&["a"]);
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let mut widget = widget_at(Point::new(10.0, 10.0), &store)
            .with_on_close(move || *counter.borrow_mut() += 1);

        widget.close();
        widget.close();
        assert_eq!(*calls.borrow(), 1);
        let events = widget.take_events();
        assert!(matches!(&events[..], [WidgetEvent::Closed]));
    }

    #[test]
    fn test_constructed_triggered_renders_panel() {
        let store = store_with_tools(&[]);
        let registry = ToolRegistry::new();
        let mut params = WidgetParams::new("text", Point::new(10.0, 10.0));
        params.triggered = true;
        params.initial_prompt = Some("restored prompt".into());
        params.closeable = false;

        let mut widget = FloatingWidget::new(params, &store);
        widget.update(BOUNDS);
        match widget.view(&registry, 800.0) {
            WidgetView::Panel {
                prompt, closeable, ..
            } => {
                assert_eq!(prompt, "restored prompt");
                assert!(!closeable);
            }
            other => panic!("expected panel, got {other:?}"),
        }
    }
}
