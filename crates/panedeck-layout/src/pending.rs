#![forbid(unsafe_code)]

//! Pending (ghost) tab reconciliation: hydration and demotion.
//!
//! # Design
//!
//! A pending placement ([`GhostTab`]) records where a tab should live once
//! its content exists. The reconciler is level-triggered on top of the
//! host's mutation journal: added elements are batched through a
//! [`Debouncer`] and, once the burst is quiet (or has waited long enough),
//! every pending key is checked against the batch. Emptied panel content is
//! batched the same way and demotes the panel back to pending.
//!
//! A hydrated placement stays armed. Re-matching is harmless because the
//! matched element now sits inside a managed panel and is filtered out.
//!
//! # Invariants
//!
//! 1. An identifier appears in at most one pending list position.
//! 2. Elements in noisy regions never enter a batch; elements in staging
//!    regions, in staged content, or inside managed panels never hydrate.
//! 3. Each panel is demoted at most once per emptying.
//!
//! # Failure Modes
//!
//! - **Duplicate matches**: the first element in batch (or document) order
//!   wins.
//! - **Vanished target pane**: hydration falls back to the first pane of the
//!   placement's column, then of the center column.

use panedeck_core::timing::Debouncer;
use web_time::Instant;

use crate::host::{ContentHost, ElementRef, HostMutation};
use crate::model::{ColumnLocation, GhostTab, NodeId, PanelId, SearchKey};
use crate::registry::TabContent;
use crate::session::LayoutSession;
use crate::settings::LayoutConfig;
use crate::signal::LayoutChangeReason;

/// Batching and bookkeeping for hydration and demotion.
#[derive(Debug, Clone)]
pub struct Reconciler {
    additions: Debouncer<ElementRef>,
    emptied: Debouncer<ElementRef>,
    noisy_regions: Vec<String>,
    staging_regions: Vec<String>,
    hydrations: u64,
    demotions: u64,
}

impl Reconciler {
    #[must_use]
    pub fn new(config: &LayoutConfig) -> Self {
        let window = config.mutation_window();
        let max_wait = config.mutation_max_wait();
        Self {
            additions: Debouncer::new(window, max_wait),
            emptied: Debouncer::new(window, max_wait),
            noisy_regions: config.noisy_regions.clone(),
            staging_regions: config.staging_regions.clone(),
            hydrations: 0,
            demotions: 0,
        }
    }

    /// Drop queued batches.
    pub fn clear(&mut self) {
        self.additions.clear();
        self.emptied.clear();
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.additions.is_empty() && self.emptied.is_empty()
    }

    /// Earliest time a queued batch becomes due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.additions.deadline(), self.emptied.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    #[must_use]
    pub const fn hydrations(&self) -> u64 {
        self.hydrations
    }

    #[must_use]
    pub const fn demotions(&self) -> u64 {
        self.demotions
    }
}

/// What one reconciliation tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub hydrated: Vec<PanelId>,
    pub demoted: Vec<PanelId>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hydrated.is_empty() && self.demoted.is_empty()
    }
}

impl<H: ContentHost> LayoutSession<H> {
    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Pull the host's mutation journal into the batches.
    pub fn observe_mutations(&mut self, now: Instant) {
        for mutation in self.host.drain_mutations() {
            match mutation {
                HostMutation::Added(el) => {
                    let noisy = self
                        .host
                        .info(el)
                        .is_none_or(|info| info.in_any_region(&self.reconciler.noisy_regions));
                    if noisy {
                        tracing::trace!(target: "panedeck.pending", element = el.raw(), "noisy mutation ignored");
                        continue;
                    }
                    self.reconciler.additions.push(el, now);
                }
                HostMutation::Emptied(el) => {
                    if self.panels.values().any(|p| p.content == Some(el)) {
                        self.reconciler.emptied.push(el, now);
                    }
                }
            }
        }
    }

    /// Observe new mutations and run whichever batches are due.
    pub fn tick(&mut self, now: Instant) -> ReconcileReport {
        self.observe_mutations(now);
        let additions = self.reconciler.additions.poll(now).unwrap_or_default();
        let emptied = self.reconciler.emptied.poll(now).unwrap_or_default();
        self.reconcile(&additions, &emptied)
    }

    /// Run queued batches now, regardless of their deadlines.
    pub fn flush_reconciler(&mut self, now: Instant) -> ReconcileReport {
        self.observe_mutations(now);
        let additions = self.reconciler.additions.flush();
        let emptied = self.reconciler.emptied.flush();
        self.reconcile(&additions, &emptied)
    }

    fn reconcile(&mut self, additions: &[ElementRef], emptied: &[ElementRef]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if !additions.is_empty() {
            report.hydrated = self.hydrate_batch(additions);
        }
        for el in emptied {
            let panel = self
                .panels
                .values()
                .find(|p| p.content == Some(*el))
                .map(|p| p.id);
            if let Some(panel) = panel {
                if self.host.is_empty(*el) && self.demote_quiet(panel) {
                    report.demoted.push(panel);
                }
            }
        }
        if !report.hydrated.is_empty() {
            self.notify(LayoutChangeReason::Structure);
        }
        if !report.demoted.is_empty() {
            self.notify(LayoutChangeReason::Demotion);
        }
        report
    }

    /// Scan the whole host for every pending placement. Returns the number
    /// of tabs hydrated.
    pub fn hydrate_pending(&mut self) -> usize {
        let count = self.hydrate_all();
        if count > 0 {
            self.notify(LayoutChangeReason::Structure);
        }
        count
    }

    pub(crate) fn hydrate_all(&mut self) -> usize {
        let mut count = 0;
        for column in ColumnLocation::ALL {
            let mut index = 0;
            while index < self.ghosts[column.index()].len() {
                let ghost = self.ghosts[column.index()][index].clone();
                let found = ghost.key().and_then(|key| self.find_hydratable(&key));
                if let Some(el) = found {
                    if self.hydrate_ghost(&ghost, el, None).is_some() {
                        count += 1;
                    }
                }
                index += 1;
            }
        }
        count
    }

    fn hydrate_batch(&mut self, batch: &[ElementRef]) -> Vec<PanelId> {
        let mut hydrated = Vec::new();
        for column in ColumnLocation::ALL {
            let ghosts = self.ghosts[column.index()].clone();
            for ghost in ghosts {
                let Some(key) = ghost.key() else {
                    continue;
                };
                let found = batch.iter().find_map(|root| {
                    let candidate = self
                        .host
                        .info(*root)
                        .filter(|info| info.matches(&key))
                        .map(|_| *root)
                        .or_else(|| self.host.find_within(*root, &key))?;
                    self.is_hydratable(candidate).then_some(candidate)
                });
                if let Some(el) = found {
                    if let Some(panel) = self.hydrate_ghost(&ghost, el, None) {
                        hydrated.push(panel);
                    }
                }
            }
        }
        if !hydrated.is_empty() {
            tracing::debug!(target: "panedeck.pending", count = hydrated.len(), batch = batch.len(), "batch hydrated");
        }
        hydrated
    }

    /// First element for `key`, in document order, that may hydrate.
    #[must_use]
    pub fn find_hydratable(&self, key: &SearchKey) -> Option<ElementRef> {
        self.host
            .find_all(key)
            .into_iter()
            .find(|el| self.is_hydratable(*el))
    }

    fn is_hydratable(&self, el: ElementRef) -> bool {
        let Some(info) = self.host.info(el) else {
            return false;
        };
        if info.in_any_region(&self.reconciler.staging_regions) {
            return false;
        }
        if self.panel_for_element(el).is_some() {
            return false;
        }
        !self
            .staging
            .values()
            .any(|staged| self.host.is_within(el, *staged))
    }

    /// Turn `ghost` into a live tab around `element`. The placement record
    /// is left in place. With `target` the tab goes to that pane and index
    /// instead of the recorded one.
    pub(crate) fn hydrate_ghost(
        &mut self,
        ghost: &GhostTab,
        element: ElementRef,
        target: Option<(NodeId, usize)>,
    ) -> Option<PanelId> {
        let key = ghost.key()?;
        let identifier = key.to_string();
        if let Some(existing) = self.panel_by_source(&identifier) {
            tracing::debug!(target: "panedeck.pending", panel = %existing, source = %identifier, "replacing live panel");
            self.destroy_quiet(existing);
        }
        let column = ghost.column.unwrap_or(ColumnLocation::Center);
        let (pane, index) = match target {
            Some((pane, index)) => (pane, Some(index)),
            None => (self.resolve_ghost_pane(ghost, column)?, ghost.pane_index),
        };
        let mut content = TabContent::new(identifier.clone())
            .title(ghost.title.clone().unwrap_or_else(|| key.name().to_string()))
            .element(element)
            .active(true)
            .collapsed(ghost.collapsed);
        content.icon = ghost.icon.clone();
        let panel = self.create_tab_quiet(content, pane, index)?;
        // Whatever was staged under this identifier is superseded.
        self.staging.remove(&identifier);
        self.reveal_column_of(pane);
        self.reconciler.hydrations += 1;
        tracing::debug!(
            target: "panedeck.pending",
            panel = %panel,
            source = %identifier,
            pane = %pane,
            "pending tab hydrated"
        );
        Some(panel)
    }

    fn resolve_ghost_pane(&self, ghost: &GhostTab, column: ColumnLocation) -> Option<NodeId> {
        ghost
            .pane()
            .filter(|pane| self.tree.pane(*pane).is_some() && self.tree.column_of(*pane) == Some(column))
            .or_else(|| self.tree.first_pane(column))
            .or_else(|| self.tree.first_pane(ColumnLocation::Center))
    }

    /// Convert a live panel back into a pending placement at its current
    /// column, pane and index.
    pub fn demote_panel(&mut self, panel: PanelId) -> bool {
        if !self.demote_quiet(panel) {
            return false;
        }
        self.notify(LayoutChangeReason::Demotion);
        true
    }

    fn demote_quiet(&mut self, panel: PanelId) -> bool {
        let Some(record) = self.panels.get(&panel).cloned() else {
            tracing::debug!(target: "panedeck.pending", panel = %panel, "demotion panel missing");
            return false;
        };
        let Some(key) = SearchKey::parse(&record.source_id) else {
            tracing::debug!(target: "panedeck.pending", source = %record.source_id, "panel has no search key");
            return false;
        };
        let Some(column) = self.tree.column_of(record.pane) else {
            return false;
        };
        let index = self
            .tree
            .pane(record.pane)
            .and_then(|data| data.tabs.iter().position(|id| *id == panel));
        self.destroy_quiet(panel);
        // The host reclaimed this content; nothing to restore from.
        self.staging.remove(&record.source_id);

        let mut ghost = GhostTab::for_key(&key, column);
        ghost.pane_id = Some(record.pane.to_string());
        ghost.pane_index = index;
        ghost.title = Some(record.tab.title);
        ghost.icon = record.tab.icon;
        ghost.active = record.tab.active;
        ghost.collapsed = record.tab.collapsed;
        self.remove_ghosts_for(&record.source_id);
        self.ghosts[column.index()].push(ghost);
        self.reconciler.demotions += 1;
        tracing::debug!(target: "panedeck.pending", panel = %panel, source = %record.source_id, %column, "panel demoted");
        true
    }

    /// Remove every pending placement for `identifier`, across columns.
    pub(crate) fn remove_ghosts_for(&mut self, identifier: &str) -> usize {
        let mut removed = 0;
        for list in &mut self.ghosts {
            let before = list.len();
            list.retain(|ghost| ghost.identifier().as_deref() != Some(identifier));
            removed += before - list.len();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use web_time::Duration;

    fn session_with_ghost(column: ColumnLocation) -> LayoutSession {
        let config = LayoutConfig {
            default_placements: vec![GhostTab {
                search_id: Some("terminal".into()),
                column: Some(column),
                ..GhostTab::default()
            }],
            ..LayoutConfig::default()
        };
        let mut session = LayoutSession::new(MemoryHost::new(), config);
        session.init();
        session
    }

    #[test]
    fn added_element_hydrates_after_quiet_window() {
        let mut session = session_with_ghost(ColumnLocation::Center);
        let start = Instant::now();
        session.host_mut().add_element(None, Some("terminal"), &[]);
        let early = session.tick(start);
        assert!(early.is_empty());
        let report = session.tick(start + Duration::from_millis(150));
        assert_eq!(report.hydrated.len(), 1);
        assert_eq!(session.ghost_tabs(ColumnLocation::Center).len(), 1);
        assert_eq!(session.reconciler().hydrations(), 1);
    }

    #[test]
    fn noisy_and_staging_regions_are_ignored() {
        let mut session = session_with_ghost(ColumnLocation::Center);
        let start = Instant::now();
        let chat = session.host_mut().add_element(None, None, &["chat-log"]);
        session.host_mut().set_region(chat, "chat");
        let popup = session.host_mut().add_element(None, None, &[]);
        session.host_mut().set_region(popup, "popup");
        session.host_mut().add_element(Some(popup), Some("terminal"), &[]);
        let report = session.flush_reconciler(start);
        assert!(report.hydrated.is_empty());
        assert_eq!(session.panels().count(), 0);
    }

    #[test]
    fn hydrating_into_hidden_column_reveals_it() {
        let mut session = session_with_ghost(ColumnLocation::Left);
        assert!(!session.columns().get(ColumnLocation::Left).visible);
        session.host_mut().add_element(None, Some("terminal"), &[]);
        let report = session.flush_reconciler(Instant::now());
        assert_eq!(report.hydrated.len(), 1);
        assert!(session.columns().get(ColumnLocation::Left).visible);
    }

    #[test]
    fn demoting_twice_leaves_a_single_ghost() {
        let mut session = LayoutSession::new(MemoryHost::new(), LayoutConfig::default());
        session.init();
        let pane = session.tree().first_pane(ColumnLocation::Center).unwrap();
        let element = session.host_mut().add_element(None, Some("log"), &[]);
        let panel = session.create_tab_from_element(element, pane, None).unwrap();

        assert!(session.demote_panel(panel));
        assert!(!session.demote_panel(panel));
        assert_eq!(session.panels().count(), 0);
        let ghosts = session.ghost_tabs(ColumnLocation::Center);
        assert_eq!(ghosts.len(), 1);
        assert_eq!(ghosts[0].identifier().as_deref(), Some("#log"));
        assert_eq!(session.reconciler().demotions(), 1);
    }
}
