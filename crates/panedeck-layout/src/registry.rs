#![forbid(unsafe_code)]

//! Tab/panel registry: create, move, clone, activate and destroy the pairs.
//!
//! # Design
//!
//! A tab and its panel are one [`Panel`] record keyed by [`PanelId`]; the
//! owning pane lists the id in its strip. Every operation here keeps three
//! things in step: the record's `pane`, the strip order, and the per-pane
//! "exactly one active" rule. Destroyed content is parked in staging by
//! source identifier so pending and hidden tabs can pick it up again.
//!
//! # Failure Modes
//!
//! - **Stale ids**: unknown panels or panes make the operation a no-op
//!   returning `false`/`None`, logged at `debug` under `panedeck.registry`.

use serde_json::Value;

use crate::host::{ContentHost, ElementRef};
use crate::model::{NodeId, Panel, PanelId, Tab};
use crate::session::LayoutSession;
use crate::signal::LayoutChangeReason;
use crate::tree::SplitOutcome;

/// Everything needed to open a tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabContent {
    pub source_id: String,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub element: Option<ElementRef>,
    pub is_default: bool,
    /// Overrides the mapping's pinned flag when set.
    pub pinned: Option<bool>,
    pub custom_content: Option<String>,
    pub custom_data: Option<Value>,
    pub active: bool,
    pub collapsed: bool,
}

impl TabContent {
    #[must_use]
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn element(mut self, element: ElementRef) -> Self {
        self.element = Some(element);
        self
    }

    #[must_use]
    pub fn is_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    #[must_use]
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }

    #[must_use]
    pub fn custom_content(mut self, html: impl Into<String>) -> Self {
        self.custom_content = Some(html.into());
        self
    }

    #[must_use]
    pub fn custom_data(mut self, data: Value) -> Self {
        self.custom_data = Some(data);
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }
}

impl<H: ContentHost> LayoutSession<H> {
    /// Open a tab for `content` in `pane` at `index` (appended when `None`).
    pub fn create_tab_from_content(
        &mut self,
        content: TabContent,
        pane: NodeId,
        index: Option<usize>,
    ) -> Option<PanelId> {
        let id = self.create_tab_quiet(content, pane, index)?;
        self.notify(LayoutChangeReason::Structure);
        Some(id)
    }

    /// Open a tab wrapping a host element. The source identifier is the
    /// element's DOM id or first class.
    pub fn create_tab_from_element(
        &mut self,
        element: ElementRef,
        pane: NodeId,
        index: Option<usize>,
    ) -> Option<PanelId> {
        let Some(key) = self.host.info(element).and_then(|info| info.search_key()) else {
            tracing::debug!(target: "panedeck.registry", element = element.raw(), "element has no identifier");
            return None;
        };
        let content = TabContent::new(key.to_string())
            .title(key.name())
            .element(element)
            .active(true);
        self.create_tab_from_content(content, pane, index)
    }

    pub(crate) fn create_tab_quiet(
        &mut self,
        content: TabContent,
        pane: NodeId,
        index: Option<usize>,
    ) -> Option<PanelId> {
        let Some(strip_len) = self.tree.pane(pane).map(|data| data.tabs.len()) else {
            tracing::debug!(target: "panedeck.registry", pane = %pane, "create target missing");
            return None;
        };
        let mapping = self.config.mapping(&content.source_id).cloned();
        let title = mapping
            .as_ref()
            .map(|m| m.title.clone())
            .or(content.title)
            .unwrap_or_else(|| content.source_id.clone());
        let icon = mapping.as_ref().and_then(|m| m.icon.clone()).or(content.icon);
        let pinned = content
            .pinned
            .unwrap_or_else(|| mapping.as_ref().is_some_and(|m| m.pinned));

        let id = self.allocate_panel_id();
        if let Some(element) = content.element {
            if self.staging.get(&content.source_id) == Some(&element) {
                self.staging.remove(&content.source_id);
            }
        }
        self.panels.insert(
            id,
            Panel {
                id,
                pane,
                tab: Tab {
                    title,
                    icon,
                    active: false,
                    collapsed: content.collapsed,
                    pinned,
                },
                source_id: content.source_id,
                content: content.element,
                is_default: content.is_default,
                custom_content: content.custom_content,
                custom_data: content.custom_data,
            },
        );
        if let Some(data) = self.tree.pane_mut(pane) {
            data.tabs.insert(index.unwrap_or(strip_len).min(strip_len), id);
        }
        if content.active || self.active_in(pane).is_none() {
            self.set_active_in_pane_quiet(pane, content.active.then_some(id));
        }
        self.collapse_if_all_tabs_collapsed(pane);
        tracing::debug!(target: "panedeck.registry", panel = %id, pane = %pane, "tab created");
        Some(id)
    }

    /// Move `panel` into `pane` at strip `index` (clamped). Returns whether
    /// the panel moved.
    pub fn move_into_pane_at_index(&mut self, panel: PanelId, pane: NodeId, index: usize) -> bool {
        let moved = self.move_into_pane_quiet(panel, pane, index);
        self.notify(LayoutChangeReason::Structure);
        moved
    }

    pub(crate) fn move_into_pane_quiet(&mut self, panel: PanelId, pane: NodeId, index: usize) -> bool {
        let Some(source) = self.panels.get(&panel).map(|p| p.pane) else {
            tracing::debug!(target: "panedeck.registry", panel = %panel, "move panel missing");
            return false;
        };
        if self.tree.pane(pane).is_none() {
            tracing::debug!(target: "panedeck.registry", pane = %pane, "move target missing");
            return false;
        }
        let mut index = index;
        if let Some(data) = self.tree.pane_mut(source) {
            if let Some(old) = data.tabs.iter().position(|id| *id == panel) {
                data.tabs.remove(old);
                if source == pane && old < index {
                    index -= 1;
                }
            }
        }
        if let Some(data) = self.tree.pane_mut(pane) {
            let index = index.min(data.tabs.len());
            data.tabs.insert(index, panel);
        }
        let was_active = self.panels.get_mut(&panel).is_some_and(|record| {
            record.pane = pane;
            record.tab.active
        });
        if was_active {
            self.set_active_in_pane_quiet(pane, Some(panel));
        } else {
            self.set_active_in_pane_quiet(pane, None);
        }
        self.collapse_if_all_tabs_collapsed(pane);
        if source != pane && self.tree.contains(source) {
            self.set_active_in_pane_quiet(source, None);
            self.collapse_if_all_tabs_collapsed(source);
            self.remove_if_empty_quiet(source);
        }
        self.reveal_column_of(pane);
        tracing::debug!(target: "panedeck.registry", panel = %panel, from = %source, to = %pane, index, "tab moved");
        true
    }

    /// Copy `panel` into `pane` under a new identity.
    pub fn clone_into_pane(&mut self, panel: PanelId, pane: NodeId, index: usize) -> Option<PanelId> {
        let id = self.clone_panel_quiet(panel, pane, Some(index))?;
        self.notify(LayoutChangeReason::Structure);
        Some(id)
    }

    /// Copy `panel` and split `target` so the copy gets its own pane.
    /// Returns the new split, or `None` when the copy landed in `target`
    /// without a split (depth ceiling).
    pub fn clone_into_split(
        &mut self,
        panel: PanelId,
        target: NodeId,
        vertical: bool,
        new_first: bool,
    ) -> Option<NodeId> {
        let copy = self.clone_panel_quiet(panel, target, None)?;
        let outcome = self.split_with_panel_quiet(target, copy, vertical, new_first);
        self.notify(LayoutChangeReason::Structure);
        match outcome {
            SplitOutcome::Split(split) => Some(split),
            SplitOutcome::Moved | SplitOutcome::Unchanged => None,
        }
    }

    pub(crate) fn clone_panel_quiet(
        &mut self,
        panel: PanelId,
        pane: NodeId,
        index: Option<usize>,
    ) -> Option<PanelId> {
        let Some(original) = self.panels.get(&panel).cloned() else {
            tracing::debug!(target: "panedeck.registry", panel = %panel, "clone panel missing");
            return None;
        };
        let element = original.content.and_then(|el| self.host.shallow_clone(el));
        let source_id = element
            .and_then(|el| self.host.info(el))
            .and_then(|info| info.search_key())
            .map_or_else(|| original.source_id.clone(), |key| key.to_string());
        let source_id = self.unused_source_id(source_id);
        let mut content = TabContent::new(source_id)
            .title(original.tab.title.clone())
            .pinned(false)
            .active(true);
        content.icon = original.tab.icon.clone();
        content.element = element;
        content.custom_content = original.custom_content.clone();
        content.custom_data = original.custom_data.clone();
        let id = self.create_tab_quiet(content, pane, index)?;
        tracing::debug!(target: "panedeck.registry", from = %panel, panel = %id, "tab cloned");
        Some(id)
    }

    /// `base`, or `base~N` with the first `N` that no live panel, hidden
    /// entry or staged element uses yet.
    fn unused_source_id(&self, base: String) -> String {
        let taken = |candidate: &str| {
            self.panel_by_source(candidate).is_some()
                || self.hidden.iter().any(|h| h.source_id == candidate)
                || self.staging.contains_key(candidate)
        };
        if !taken(&base) {
            return base;
        }
        let mut n = 2u64;
        loop {
            let candidate = format!("{base}~{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Make `panel` (or a fallback) the active tab of `pane`. Returns the
    /// panel that ended up active.
    pub fn set_active_in_pane(&mut self, pane: NodeId, panel: Option<PanelId>) -> Option<PanelId> {
        let active = self.set_active_in_pane_quiet(pane, panel);
        self.notify(LayoutChangeReason::TabSwitch);
        active
    }

    /// Fallback order without an explicit id: the current active tab if it
    /// is not collapsed, then the first non-collapsed tab, then the first
    /// tab.
    pub(crate) fn set_active_in_pane_quiet(
        &mut self,
        pane: NodeId,
        panel: Option<PanelId>,
    ) -> Option<PanelId> {
        let tabs = self.tree.pane(pane)?.tabs.clone();
        let present = |id: &PanelId| self.panels.contains_key(id);
        let explicit = panel.filter(|id| tabs.contains(id) && present(id));
        let chosen = explicit
            .or_else(|| {
                tabs.iter()
                    .copied()
                    .filter(present)
                    .find(|id| self.panels.get(id).is_some_and(|p| p.tab.active && !p.tab.collapsed))
            })
            .or_else(|| {
                tabs.iter()
                    .copied()
                    .filter(present)
                    .find(|id| self.panels.get(id).is_some_and(|p| !p.tab.collapsed))
            })
            .or_else(|| tabs.iter().copied().find(present));
        for id in &tabs {
            if let Some(record) = self.panels.get_mut(id) {
                record.tab.active = Some(*id) == chosen;
            }
        }
        chosen
    }

    /// Collapse `panel`'s tab and hand activity to a sibling.
    pub fn close_by_id(&mut self, panel: PanelId) -> bool {
        if !self.set_tab_collapsed_quiet(panel, true) {
            return false;
        }
        self.notify(LayoutChangeReason::TabSwitch);
        true
    }

    /// Bring `panel` to the foreground: expand it, activate it, and reveal
    /// its column.
    pub fn open_by_id(&mut self, panel: PanelId) -> bool {
        let Some(pane) = self.panels.get(&panel).map(|p| p.pane) else {
            tracing::debug!(target: "panedeck.registry", panel = %panel, "open panel missing");
            return false;
        };
        if let Some(record) = self.panels.get_mut(&panel) {
            record.tab.collapsed = false;
        }
        self.set_active_in_pane_quiet(pane, Some(panel));
        self.collapse_if_all_tabs_collapsed(pane);
        self.reveal_column_of(pane);
        tracing::debug!(target: "panedeck.registry", panel = %panel, "tab opened");
        self.notify(LayoutChangeReason::TabSwitch);
        true
    }

    /// Set a tab's collapsed flag and re-check its pane.
    pub fn set_tab_collapsed(&mut self, panel: PanelId, collapsed: bool) -> bool {
        if !self.set_tab_collapsed_quiet(panel, collapsed) {
            return false;
        }
        self.notify(LayoutChangeReason::Structure);
        true
    }

    fn set_tab_collapsed_quiet(&mut self, panel: PanelId, collapsed: bool) -> bool {
        let Some(record) = self.panels.get_mut(&panel) else {
            tracing::debug!(target: "panedeck.registry", panel = %panel, "collapse panel missing");
            return false;
        };
        if record.tab.collapsed == collapsed {
            return false;
        }
        record.tab.collapsed = collapsed;
        if collapsed {
            record.tab.active = false;
        }
        let pane = record.pane;
        self.set_active_in_pane_quiet(pane, (!collapsed).then_some(panel));
        self.collapse_if_all_tabs_collapsed(pane);
        true
    }

    /// Remove the tab/panel pair, parking its content in staging.
    pub fn destroy_by_id(&mut self, panel: PanelId) -> bool {
        if self.destroy_quiet(panel).is_none() {
            return false;
        }
        self.notify(LayoutChangeReason::Structure);
        true
    }

    pub(crate) fn destroy_quiet(&mut self, panel: PanelId) -> Option<Panel> {
        let Some(record) = self.panels.remove(&panel) else {
            tracing::debug!(target: "panedeck.registry", panel = %panel, "destroy panel missing");
            return None;
        };
        let pane = record.pane;
        if let Some(data) = self.tree.pane_mut(pane) {
            data.tabs.retain(|id| *id != panel);
        }
        if let Some(content) = record.content {
            self.staging.insert(record.source_id.clone(), content);
        }
        self.set_active_in_pane_quiet(pane, None);
        self.collapse_if_all_tabs_collapsed(pane);
        self.remove_if_empty_quiet(pane);
        tracing::debug!(target: "panedeck.registry", panel = %panel, source = %record.source_id, "tab destroyed");
        Some(record)
    }

    /// Mark a tab pinned (never hidden, never pending).
    pub fn set_pinned(&mut self, panel: PanelId, pinned: bool) -> bool {
        match self.panels.get_mut(&panel) {
            Some(record) => {
                record.tab.pinned = pinned;
                true
            }
            None => false,
        }
    }

    /// Live panel with this source identifier.
    #[must_use]
    pub fn panel_by_source(&self, source_id: &str) -> Option<PanelId> {
        self.panels
            .values()
            .find(|panel| panel.source_id == source_id)
            .map(|panel| panel.id)
    }

    /// Live panel whose content is `element` or contains it.
    #[must_use]
    pub fn panel_for_element(&self, element: ElementRef) -> Option<PanelId> {
        self.panels
            .values()
            .find(|panel| {
                panel
                    .content
                    .is_some_and(|content| self.host.is_within(element, content))
            })
            .map(|panel| panel.id)
    }

    /// Show the side column holding `pane` if it is hidden.
    pub(crate) fn reveal_column_of(&mut self, pane: NodeId) {
        if let Some(column) = self.tree.column_of(pane) {
            if !self.columns.get(column).visible {
                self.set_column_visible(column, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::model::ColumnLocation;
    use crate::settings::{LayoutConfig, PanelMapping};

    fn session() -> (LayoutSession, NodeId) {
        let config = LayoutConfig {
            panel_mappings: vec![PanelMapping {
                id: "#settings".into(),
                title: "Settings".into(),
                icon: Some("gear".into()),
                pinned: true,
            }],
            ..LayoutConfig::default()
        };
        let session = LayoutSession::new(MemoryHost::new(), config);
        let pane = session
            .tree()
            .root(ColumnLocation::Center)
            .expect("center root");
        (session, pane)
    }

    #[test]
    fn mapping_supplies_title_icon_and_pin() {
        let (mut session, pane) = session();
        let id = session
            .create_tab_from_content(TabContent::new("#settings").title("ignored"), pane, None)
            .expect("created");
        let tab = &session.panel(id).expect("panel").tab;
        assert_eq!(tab.title, "Settings");
        assert_eq!(tab.icon.as_deref(), Some("gear"));
        assert!(tab.pinned);
        assert!(tab.active);
    }

    #[test]
    fn moving_within_a_pane_reorders() {
        let (mut session, pane) = session();
        let a = session.create_tab_from_content(TabContent::new("#a"), pane, None).expect("a");
        let b = session.create_tab_from_content(TabContent::new("#b"), pane, None).expect("b");
        let c = session.create_tab_from_content(TabContent::new("#c"), pane, None).expect("c");
        assert!(session.move_into_pane_at_index(a, pane, 3));
        let order: Vec<PanelId> = session.tabs_in(pane).iter().map(|p| p.id).collect();
        assert_eq!(order, vec![b, c, a]);
    }

    #[test]
    fn active_fallback_skips_collapsed() {
        let (mut session, pane) = session();
        let a = session.create_tab_from_content(TabContent::new("#a"), pane, None).expect("a");
        let b = session.create_tab_from_content(TabContent::new("#b"), pane, None).expect("b");
        assert_eq!(session.active_in(pane), Some(a));
        assert!(session.close_by_id(a));
        assert_eq!(session.active_in(pane), Some(b));
        assert!(session.open_by_id(a));
        assert_eq!(session.active_in(pane), Some(a));
        assert!(!session.panel(b).expect("b").tab.active);
    }

    #[test]
    fn destroy_parks_content() {
        let (mut session, pane) = session();
        let el = session.host_mut().add_element(None, Some("log"), &[]);
        let id = session.create_tab_from_element(el, pane, None).expect("created");
        assert_eq!(session.panel(id).map(|p| p.source_id.as_str()), Some("#log"));
        assert!(session.destroy_by_id(id));
        assert_eq!(session.staged("#log"), Some(el));
        assert!(session.panel(id).is_none());
        assert!(!session.destroy_by_id(id));
    }
}
