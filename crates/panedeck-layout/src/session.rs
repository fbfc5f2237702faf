#![forbid(unsafe_code)]

//! The layout session: single owner of every piece of mutable layout state.
//!
//! # Design
//!
//! One [`LayoutSession`] holds the pane/split arena, the column set, the
//! panel registry, the pending and hidden lists, staged content, resizers,
//! gesture state and the signal bus. Nothing is process-global, so several
//! sessions (for example one per test) coexist freely. Operations are
//! methods spread across the component modules (`tree`, `columns`,
//! `collapse`, `registry`, `resizer`, `drag`, `touch`, `pending`,
//! `snapshot`), each in its own `impl` block.
//!
//! # Invariants
//!
//! 1. Every public mutating operation leaves the session settled: splits
//!    normalized, column widths recalculated, orientations derived.
//! 2. Each settle is followed by at most one [`LayoutChanged`] per reason;
//!    a reason already being dispatched is not re-entered.
//! 3. A panel's `pane` always names the pane whose strip lists it.
//!
//! # Failure Modes
//!
//! - **Use after dispose**: a disposed session behaves like an empty one;
//!   operations on stale ids are no-ops.

use std::collections::BTreeMap;

use panedeck_core::geometry::Size;
use rustc_hash::FxHashMap;

use crate::columns::ColumnSet;
use crate::drag::DragState;
use crate::host::{ContentHost, ElementRef, MemoryHost};
use crate::layout::{self, LayoutMap};
use crate::model::{ColumnLocation, GhostTab, HiddenTab, NodeId, Panel, PanelId, ViewSettings};
use crate::pending::Reconciler;
use crate::resizer::{IconModeMonitor, ResizeGesture, ResizerRegistry};
use crate::settings::LayoutConfig;
use crate::signal::{LayoutChangeReason, LayoutChanged, SignalBus, Subscription};
use crate::touch::TouchDragEmulator;
use crate::tree::LayoutTree;

/// Viewport used until the host reports one.
pub const DEFAULT_VIEWPORT: Size = Size::new(1280.0, 800.0);

/// Layout state for one workspace.
pub struct LayoutSession<H: ContentHost = MemoryHost> {
    pub(crate) host: H,
    pub(crate) config: LayoutConfig,
    pub(crate) tree: LayoutTree,
    pub(crate) columns: ColumnSet,
    pub(crate) panels: BTreeMap<PanelId, Panel>,
    pub(crate) next_panel: PanelId,
    /// Pending placements per column, in list order.
    pub(crate) ghosts: [Vec<GhostTab>; 3],
    pub(crate) hidden: Vec<HiddenTab>,
    /// Detached content keyed by source identifier.
    pub(crate) staging: FxHashMap<String, ElementRef>,
    pub(crate) signals: SignalBus,
    pub(crate) viewport: Size,
    pub(crate) resizers: ResizerRegistry,
    pub(crate) resize: Option<ResizeGesture>,
    pub(crate) icon_mode: IconModeMonitor,
    pub(crate) drag: Option<DragState>,
    pub(crate) touch: TouchDragEmulator,
    pub(crate) reconciler: Reconciler,
    pub(crate) initialized: bool,
}

impl<H: ContentHost> std::fmt::Debug for LayoutSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutSession")
            .field("nodes", &self.tree.len())
            .field("panels", &self.panels.len())
            .field("hidden", &self.hidden.len())
            .field("viewport", &self.viewport)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl<H: ContentHost> LayoutSession<H> {
    /// Build a session with the default layout: one empty pane per column,
    /// side columns hidden, and the configured default placements pending.
    #[must_use]
    pub fn new(host: H, config: LayoutConfig) -> Self {
        let reconciler = Reconciler::new(&config);
        let icon_mode = IconModeMonitor::new(config.icon_mode_interval());
        let mut session = Self {
            host,
            config,
            tree: LayoutTree::new(),
            columns: ColumnSet::default(),
            panels: BTreeMap::new(),
            next_panel: PanelId::MIN,
            ghosts: [Vec::new(), Vec::new(), Vec::new()],
            hidden: Vec::new(),
            staging: FxHashMap::default(),
            signals: SignalBus::new(),
            viewport: DEFAULT_VIEWPORT,
            resizers: ResizerRegistry::default(),
            resize: None,
            icon_mode,
            drag: None,
            touch: TouchDragEmulator::default(),
            reconciler,
            initialized: false,
        };
        session.build_default_layout();
        session.settle();
        session
    }

    /// Start the session: hydrate pending placements whose content already
    /// exists and attach resizers.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        // Mutations from before init are covered by the full scan.
        let _ = self.host.drain_mutations();
        let hydrated = self.hydrate_all();
        self.attach_resizers();
        tracing::debug!(target: "panedeck.pending", hydrated, "session initialized");
        self.notify(LayoutChangeReason::Structure);
    }

    /// Tear the session down: cancel gestures, detach resizers, drop every
    /// registry. The host is left untouched.
    pub fn dispose(&mut self) {
        self.cancel_drag();
        self.touch_cancel();
        self.resize = None;
        self.detach_resizers();
        self.reconciler.clear();
        self.panels.clear();
        self.ghosts = [Vec::new(), Vec::new(), Vec::new()];
        self.hidden.clear();
        self.staging.clear();
        self.tree = LayoutTree::new();
        self.tree_root_defaults();
        self.signals.reset();
        self.initialized = false;
        tracing::debug!(target: "panedeck.tree", "session disposed");
    }

    /// Consume the session and hand the host back.
    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    /// Return to the default layout. Live content is parked in staging so
    /// pending placements can pick it up again.
    pub fn reset_columns(&mut self) {
        self.cancel_drag();
        self.resize = None;
        self.park_all_panels();
        self.build_default_layout();
        tracing::debug!(target: "panedeck.columns", "columns reset");
        self.notify(LayoutChangeReason::Structure);
    }

    pub(crate) fn park_all_panels(&mut self) {
        let panels = std::mem::take(&mut self.panels);
        for panel in panels.into_values() {
            if let Some(content) = panel.content {
                self.staging.insert(panel.source_id, content);
            }
        }
    }

    fn build_default_layout(&mut self) {
        self.tree = LayoutTree::new();
        self.columns = ColumnSet::default();
        self.tree_root_defaults();
        self.ghosts = [Vec::new(), Vec::new(), Vec::new()];
        for ghost in &self.config.default_placements {
            if ghost.key().is_none() {
                continue;
            }
            let column = ghost.column.unwrap_or(ColumnLocation::Center);
            self.ghosts[column.index()].push(ghost.clone());
        }
        self.hidden.clear();
    }

    fn tree_root_defaults(&mut self) {
        for column in ColumnLocation::ALL {
            let pane = self.tree.insert_pane(column, ViewSettings::default());
            if let Some(data) = self.tree.pane_mut(pane) {
                data.icons_only = self.config.icons_only;
            }
            self.tree.set_root(column, Some(pane));
        }
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub const fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    #[must_use]
    pub const fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(&id)
    }

    /// Live panels in id order.
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.values()
    }

    /// Panels of `pane` in strip order.
    #[must_use]
    pub fn tabs_in(&self, pane: NodeId) -> Vec<&Panel> {
        self.tree
            .pane(pane)
            .map(|data| data.tabs.iter().filter_map(|id| self.panels.get(id)).collect())
            .unwrap_or_default()
    }

    /// Active panel of `pane`.
    #[must_use]
    pub fn active_in(&self, pane: NodeId) -> Option<PanelId> {
        self.tabs_in(pane)
            .into_iter()
            .find(|panel| panel.tab.active)
            .map(|panel| panel.id)
    }

    /// Pending placements of `column`, in list order.
    #[must_use]
    pub fn ghost_tabs(&self, column: ColumnLocation) -> &[GhostTab] {
        &self.ghosts[column.index()]
    }

    #[must_use]
    pub fn hidden_tabs(&self) -> &[HiddenTab] {
        &self.hidden
    }

    /// Content parked for `source_id`.
    #[must_use]
    pub fn staged(&self, source_id: &str) -> Option<ElementRef> {
        self.staging.get(source_id).copied()
    }

    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// Window resize entry point.
    pub fn set_viewport(&mut self, viewport: Size) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        tracing::debug!(
            target: "panedeck.columns",
            width = viewport.width,
            height = viewport.height,
            "viewport resized"
        );
        self.notify(LayoutChangeReason::ViewportResize);
    }

    /// Toggle icon-only tab strips everywhere.
    pub fn set_icons_only(&mut self, icons_only: bool) {
        if self.config.icons_only == icons_only {
            return;
        }
        self.config.icons_only = icons_only;
        for pane in self.tree.all_panes() {
            if let Some(data) = self.tree.pane_mut(pane) {
                data.icons_only = icons_only;
            }
        }
        self.notify(LayoutChangeReason::Structure);
    }

    /// Geometry of the current tree for the current viewport.
    #[must_use]
    pub fn solve_layout(&self) -> LayoutMap {
        layout::solve(&self.tree, &self.columns, self.viewport)
    }

    /// Register a layout-changed callback.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&mut self, callback: impl Fn(&LayoutChanged) + 'static) -> Subscription {
        self.signals.subscribe(callback)
    }

    /// Signals published since the last call.
    pub fn drain_signals(&mut self) -> Vec<LayoutChanged> {
        self.signals.drain()
    }

    pub fn signals_mut(&mut self) -> &mut SignalBus {
        &mut self.signals
    }

    /// Settle and broadcast one layout-changed signal.
    pub fn notify_layout_changed(&mut self, reason: LayoutChangeReason) {
        self.notify(reason);
    }

    pub(crate) fn notify(&mut self, reason: LayoutChangeReason) {
        if !self.signals.enter(reason) {
            return;
        }
        self.settle();
        self.signals.publish(reason);
        self.signals.exit(reason);
    }

    /// Bring sizes, collapse state and orientation in line with the tree.
    /// Idempotent.
    pub(crate) fn settle(&mut self) {
        self.ensure_center_root();
        self.refresh_collapsed_splits();
        self.normalize_splits();
        self.recalculate_column_sizes();
        let map = self.solve_layout();
        self.apply_all_orientations(&map);
        if self.resizers.is_attached() {
            self.refresh_resizers();
        }
    }

    pub(crate) fn allocate_panel_id(&mut self) -> PanelId {
        let id = self.next_panel;
        self.next_panel = id.next();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::LayoutChangeReason;

    #[test]
    fn default_session_has_three_roots_and_hidden_sides() {
        let session = LayoutSession::new(MemoryHost::new(), LayoutConfig::default());
        for column in ColumnLocation::ALL {
            assert!(session.tree().root(column).is_some());
        }
        assert!(!session.columns().get(ColumnLocation::Left).visible);
        assert!(session.columns().get(ColumnLocation::Center).visible);
        assert!(session.tree().validate().is_empty());
    }

    #[test]
    fn viewport_change_emits_once() {
        let mut session = LayoutSession::new(MemoryHost::new(), LayoutConfig::default());
        session.drain_signals();
        session.set_viewport(Size::new(1024.0, 768.0));
        session.set_viewport(Size::new(1024.0, 768.0));
        let signals = session.drain_signals();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].reason, LayoutChangeReason::ViewportResize);
    }

    #[test]
    fn default_placements_are_pending_per_column() {
        let config = LayoutConfig {
            default_placements: vec![
                GhostTab {
                    search_id: Some("terminal".into()),
                    column: Some(ColumnLocation::Left),
                    ..GhostTab::default()
                },
                GhostTab {
                    search_class: Some("editor".into()),
                    ..GhostTab::default()
                },
            ],
            ..LayoutConfig::default()
        };
        let session = LayoutSession::new(MemoryHost::new(), config);
        assert_eq!(session.ghost_tabs(ColumnLocation::Left).len(), 1);
        assert_eq!(session.ghost_tabs(ColumnLocation::Center).len(), 1);
        assert!(session.ghost_tabs(ColumnLocation::Right).is_empty());
    }
}
