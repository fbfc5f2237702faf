#![forbid(unsafe_code)]

//! Drag-and-drop placement engine shared by pointer and touch gestures.
//!
//! # Design
//!
//! A gesture is `begin_drag` → any number of `hover` calls → `commit_drop` or
//! `cancel_drag`. Each hover recomputes a [`DragContext`] from the solved
//! layout and decides one [`DropIndicator`]:
//!
//! 1. Over a tab strip: insert at the midpoint-derived index.
//! 2. Over pane content outside the central dead zone, below the depth
//!    ceiling: split toward the nearest edge.
//! 3. Otherwise: append to the pane's strip.
//!
//! Pending and hidden lists are a separate target surface the host reports
//! through [`ListHover`]; dropping on them never splits.
//!
//! `commit_drop` commits the last indicator. Policy checks for pinned tabs run
//! before any mutation, so a refused drop leaves the session untouched.
//!
//! # Failure Modes
//!
//! - **Stale source**: a dragged panel that disappeared mid-gesture turns the
//!   drop into [`DropOutcome::Nothing`].
//! - **Pointer flicker**: `leave_region` only arms a grace timer; indicators
//!   are cleared by `poll_leave` once the grace period has passed and the
//!   pointer is over no pane and no list surface.

use std::fmt;
use std::str::FromStr;

use panedeck_core::event::Modifiers;
use panedeck_core::geometry::{Axis, Point, Rect};
use web_time::Instant;

use crate::error::{LayoutError, PolicyViolation};
use crate::host::ContentHost;
use crate::layout::LayoutMap;
use crate::model::{ColumnLocation, GhostTab, HiddenTab, NodeId, PanelId, SearchKey};
use crate::registry::TabContent;
use crate::session::LayoutSession;
use crate::signal::LayoutChangeReason;
use crate::tree::SplitOutcome;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    /// A live tab.
    Live(PanelId),
    /// An entry of the hidden list.
    Hidden { source_id: String },
    /// An entry of a column's pending list.
    Pending { column: ColumnLocation, index: usize },
}

/// A list drop surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Pending(ColumnLocation),
    Hidden,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(column) => write!(f, "pending:{column}"),
            Self::Hidden => f.write_str("hidden"),
        }
    }
}

impl FromStr for ListKind {
    type Err = ();

    /// Parse the host's data attribute: `hidden` or `pending:<column>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "hidden" {
            return Ok(Self::Hidden);
        }
        let column = s.strip_prefix("pending:").ok_or(())?;
        column.parse().map(Self::Pending)
    }
}

/// Pointer over a list surface, as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ListHover {
    pub kind: ListKind,
    /// Midpoints of the list's items along its axis, in order.
    pub item_midpoints: Vec<f64>,
    /// Pointer coordinate along the same axis.
    pub coordinate: f64,
}

impl ListHover {
    #[must_use]
    pub fn index(&self) -> usize {
        self.item_midpoints
            .iter()
            .take_while(|mid| **mid < self.coordinate)
            .count()
    }
}

/// One hover update.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInput {
    pub point: Point,
    pub modifiers: Modifiers,
    /// Set when the pointer is over a pending or hidden list.
    pub list: Option<ListHover>,
}

impl HoverInput {
    #[must_use]
    pub const fn at(point: Point) -> Self {
        Self {
            point,
            modifiers: Modifiers::NONE,
            list: None,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn over_list(mut self, list: ListHover) -> Self {
        self.list = Some(list);
        self
    }
}

/// Where a drop would land.
#[derive(Debug, Clone, PartialEq)]
pub enum DropIndicator {
    /// Insert into a strip; `line` is the marker rectangle.
    Insert {
        pane: NodeId,
        index: usize,
        line: Rect,
    },
    /// Split a pane; `preview` is the half-pane overlay.
    Split {
        pane: NodeId,
        vertical: bool,
        new_first: bool,
        preview: Rect,
    },
    /// Insert into a pending or hidden list.
    List { kind: ListKind, index: usize },
}

/// Per-update view of the gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragContext {
    pub dragged: DragSource,
    pub point: Point,
    pub pane_under_pointer: Option<NodeId>,
    pub over_strip: bool,
    pub wants_copy: bool,
}

/// Gesture state owned by the session.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    source: DragSource,
    context: Option<DragContext>,
    indicator: Option<DropIndicator>,
    leave_deadline: Option<Instant>,
}

/// Result of a committed drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved { panel: PanelId, pane: NodeId },
    Copied { panel: PanelId, pane: NodeId },
    Split { panel: PanelId, split: NodeId },
    Hidden { source_id: String, index: usize },
    Pending { column: ColumnLocation, index: usize },
    /// A hidden entry came back as a live tab.
    Restored { panel: PanelId },
    /// A pending entry hydrated straight into a pane.
    Hydrated { panel: PanelId },
    /// A pending entry stayed pending but now targets another place.
    Relocated { column: ColumnLocation, index: usize },
    Nothing,
}

impl<H: ContentHost> LayoutSession<H> {
    /// Start a gesture. Fails when one is already running or the source
    /// does not exist.
    pub fn begin_drag(&mut self, source: DragSource) -> bool {
        if self.drag.is_some() {
            tracing::debug!(target: "panedeck.drag", "drag already active");
            return false;
        }
        let exists = match &source {
            DragSource::Live(panel) => self.panels.contains_key(panel),
            DragSource::Hidden { source_id } => self.hidden.iter().any(|h| &h.source_id == source_id),
            DragSource::Pending { column, index } => *index < self.ghosts[column.index()].len(),
        };
        if !exists {
            tracing::debug!(target: "panedeck.drag", ?source, "drag source missing");
            return false;
        }
        tracing::debug!(target: "panedeck.drag", ?source, "drag started");
        self.drag = Some(DragState {
            source,
            context: None,
            indicator: None,
            leave_deadline: None,
        });
        true
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    #[must_use]
    pub fn drop_indicator(&self) -> Option<&DropIndicator> {
        self.drag.as_ref().and_then(|drag| drag.indicator.as_ref())
    }

    #[must_use]
    pub fn drag_context(&self) -> Option<&DragContext> {
        self.drag.as_ref().and_then(|drag| drag.context.as_ref())
    }

    /// Recompute the drop target for `input`.
    pub fn hover(&mut self, input: &HoverInput) -> Option<DropIndicator> {
        let source = self.drag.as_ref()?.source.clone();
        let map = self.solve_layout();
        let pane = map.pane_at(input.point);
        let over_strip = pane
            .and_then(|id| map.pane(id))
            .is_some_and(|geometry| geometry.strip_contains(input.point));
        let context = DragContext {
            dragged: source,
            point: input.point,
            pane_under_pointer: pane,
            over_strip,
            wants_copy: input.modifiers.wants_copy(),
        };
        let indicator = match &input.list {
            Some(list) => Some(DropIndicator::List {
                kind: list.kind,
                index: list.index(),
            }),
            None => pane.and_then(|pane| self.pane_indicator(&map, pane, input.point, over_strip)),
        };
        tracing::trace!(target: "panedeck.drag", ?indicator, "hover");
        let drag = self.drag.as_mut()?;
        drag.context = Some(context);
        drag.indicator.clone_from(&indicator);
        drag.leave_deadline = None;
        indicator
    }

    fn pane_indicator(
        &self,
        map: &LayoutMap,
        pane: NodeId,
        point: Point,
        over_strip: bool,
    ) -> Option<DropIndicator> {
        let geometry = map.pane(pane)?;
        if over_strip {
            let index = geometry.insertion_index(point);
            return Some(DropIndicator::Insert {
                pane,
                index,
                line: geometry.insertion_line(index),
            });
        }
        let can_split = !self.config.mobile_mode
            && self.tree.layer_count(pane) < self.config.max_layers(self.tree.column_of(pane)?);
        if can_split {
            if let Some((vertical, new_first)) = split_gesture(geometry.rect, point, self.config.edge_threshold) {
                let axis = if vertical { Axis::X } else { Axis::Y };
                let half = geometry.rect.extent(axis) / 2.0;
                let preview = geometry
                    .rect
                    .slice(axis, if new_first { 0.0 } else { half }, half);
                return Some(DropIndicator::Split {
                    pane,
                    vertical,
                    new_first,
                    preview,
                });
            }
        }
        let index = geometry.tabs.len();
        Some(DropIndicator::Insert {
            pane,
            index,
            line: geometry.insertion_line(index),
        })
    }

    /// The pointer left the droppable region at `now`; indicators survive
    /// for the grace period.
    pub fn leave_region(&mut self, now: Instant) {
        let grace = self.config.leave_grace();
        if let Some(drag) = self.drag.as_mut() {
            drag.leave_deadline = Some(now + grace);
        }
    }

    /// Clear indicators if the leave grace has passed and the pointer is
    /// over neither a pane nor a pending or hidden list (`list` is the
    /// host's hit test, as for [`HoverInput::over_list`]). Returns whether
    /// they were cleared.
    pub fn poll_leave(&mut self, now: Instant, pointer: Option<Point>, list: Option<&ListHover>) -> bool {
        let over_target = list.is_some()
            || pointer.is_some_and(|point| self.solve_layout().pane_at(point).is_some());
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let Some(deadline) = drag.leave_deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }
        drag.leave_deadline = None;
        if over_target {
            return false;
        }
        drag.indicator = None;
        drag.context = None;
        tracing::debug!(target: "panedeck.drag", "indicators cleared after leave");
        true
    }

    /// Abandon the gesture. Nothing is committed.
    pub fn cancel_drag(&mut self) -> bool {
        let cancelled = self.drag.take().is_some();
        if cancelled {
            tracing::debug!(target: "panedeck.drag", "drag cancelled");
        }
        cancelled
    }

    /// Commit the gesture at its last indicator.
    pub fn commit_drop(&mut self) -> Result<DropOutcome, LayoutError> {
        let Some(state) = self.drag.take() else {
            return Ok(DropOutcome::Nothing);
        };
        let Some(indicator) = state.indicator else {
            return Ok(DropOutcome::Nothing);
        };
        let wants_copy = state.context.as_ref().is_some_and(|c| c.wants_copy);
        let outcome = match indicator {
            DropIndicator::List { kind: ListKind::Hidden, index } => {
                self.drop_on_hidden(&state.source, index)?
            }
            DropIndicator::List {
                kind: ListKind::Pending(column),
                index,
            } => self.drop_on_pending(&state.source, column, index)?,
            DropIndicator::Insert { pane, index, .. } => {
                self.drop_on_pane(&state.source, pane, index, None, wants_copy)?
            }
            DropIndicator::Split {
                pane,
                vertical,
                new_first,
                ..
            } => self.drop_on_pane(
                &state.source,
                pane,
                usize::MAX,
                Some((vertical, new_first)),
                wants_copy,
            )?,
        };
        tracing::debug!(target: "panedeck.drag", ?outcome, "drop committed");
        if outcome != DropOutcome::Nothing {
            self.notify(LayoutChangeReason::Structure);
        }
        Ok(outcome)
    }

    fn drop_on_hidden(&mut self, source: &DragSource, index: usize) -> Result<DropOutcome, LayoutError> {
        match source {
            DragSource::Live(panel) => {
                let source_id = self.hide_tab_quiet(*panel, Some(index))?;
                let index = self.hidden_index(&source_id).unwrap_or(index);
                Ok(DropOutcome::Hidden { source_id, index })
            }
            DragSource::Hidden { source_id } => {
                let Some(from) = self.hidden_index(source_id) else {
                    return Ok(DropOutcome::Nothing);
                };
                let entry = self.hidden.remove(from);
                let to = if from < index { index - 1 } else { index }.min(self.hidden.len());
                self.hidden.insert(to, entry);
                Ok(DropOutcome::Hidden {
                    source_id: source_id.clone(),
                    index: to,
                })
            }
            // Only real or already hidden tabs go to the hidden list.
            DragSource::Pending { .. } => Ok(DropOutcome::Nothing),
        }
    }

    fn drop_on_pending(
        &mut self,
        source: &DragSource,
        column: ColumnLocation,
        index: usize,
    ) -> Result<DropOutcome, LayoutError> {
        match source {
            DragSource::Live(panel) => {
                let index = self.pend_tab_quiet(*panel, column, Some(index))?;
                Ok(DropOutcome::Pending { column, index })
            }
            DragSource::Hidden { source_id } => {
                let key = SearchKey::parse(source_id).ok_or(LayoutError::MissingIdentifier)?;
                let entry = self.hidden_index(source_id).map(|at| self.hidden.remove(at));
                let mut ghost = GhostTab::for_key(&key, column);
                if let Some(entry) = entry {
                    ghost.active = entry.active;
                    ghost.collapsed = entry.collapsed;
                }
                let index = self.insert_ghost(ghost, column, index);
                Ok(DropOutcome::Pending { column, index })
            }
            DragSource::Pending { column: from, index: at } => {
                let Some(mut ghost) = self.take_ghost(*from, *at) else {
                    return Ok(DropOutcome::Nothing);
                };
                let index = if *from == column && *at < index { index - 1 } else { index };
                if *from != column {
                    ghost.pane_id = None;
                    ghost.pane_index = None;
                }
                ghost.column = Some(column);
                let index = self.insert_ghost(ghost, column, index);
                Ok(DropOutcome::Pending { column, index })
            }
        }
    }

    fn drop_on_pane(
        &mut self,
        source: &DragSource,
        pane: NodeId,
        index: usize,
        split: Option<(bool, bool)>,
        wants_copy: bool,
    ) -> Result<DropOutcome, LayoutError> {
        let Some(column) = self.tree.column_of(pane).filter(|_| self.tree.pane(pane).is_some()) else {
            tracing::debug!(target: "panedeck.drag", pane = %pane, "drop target vanished");
            return Ok(DropOutcome::Nothing);
        };
        match source {
            DragSource::Live(panel) => {
                let Some(record) = self.panels.get(panel) else {
                    return Ok(DropOutcome::Nothing);
                };
                if record.tab.pinned && !self.column_allows_pinned(column) {
                    tracing::info!(target: "panedeck.drag", panel = %panel, %column, "pinned tab refused column");
                    return Err(PolicyViolation::PinnedToColumn {
                        panel: *panel,
                        column,
                    }
                    .into());
                }
                if wants_copy {
                    let Some(copy) = self.clone_panel_quiet(*panel, pane, Some(index)) else {
                        return Ok(DropOutcome::Nothing);
                    };
                    return Ok(self.place_materialized(copy, pane, split, DropOutcome::Copied { panel: copy, pane }));
                }
                match split {
                    Some(_) => Ok(self.place_materialized(*panel, pane, split, DropOutcome::Moved { panel: *panel, pane })),
                    None => {
                        if self.move_into_pane_quiet(*panel, pane, index) {
                            Ok(DropOutcome::Moved { panel: *panel, pane })
                        } else {
                            Ok(DropOutcome::Nothing)
                        }
                    }
                }
            }
            DragSource::Hidden { source_id } => {
                let Some(panel) = self.restore_hidden_quiet(source_id, pane, index) else {
                    return Ok(DropOutcome::Nothing);
                };
                Ok(self.place_materialized(panel, pane, split, DropOutcome::Restored { panel }))
            }
            DragSource::Pending { column: from, index: at } => {
                let Some(ghost) = self.ghosts[from.index()].get(*at).cloned() else {
                    return Ok(DropOutcome::Nothing);
                };
                let Some(identifier) = ghost.identifier() else {
                    return Ok(DropOutcome::Nothing);
                };
                let element = self
                    .staging
                    .get(&identifier)
                    .copied()
                    .or_else(|| ghost.key().and_then(|key| self.find_hydratable(&key)));
                match element {
                    Some(element) => {
                        let Some(panel) = self.hydrate_ghost(&ghost, element, Some((pane, index))) else {
                            return Ok(DropOutcome::Nothing);
                        };
                        self.remove_ghosts_for(&identifier);
                        Ok(self.place_materialized(panel, pane, split, DropOutcome::Hydrated { panel }))
                    }
                    None => {
                        let Some(mut ghost) = self.take_ghost(*from, *at) else {
                            return Ok(DropOutcome::Nothing);
                        };
                        ghost.column = Some(column);
                        ghost.pane_id = Some(pane.to_string());
                        ghost.pane_index = (index != usize::MAX).then_some(index);
                        let end = self.ghosts[column.index()].len();
                        let index = self.insert_ghost(ghost, column, end);
                        tracing::debug!(target: "panedeck.drag", %identifier, %column, "pending entry relocated");
                        Ok(DropOutcome::Relocated { column, index })
                    }
                }
            }
        }
    }

    /// Apply a split to a panel that already sits somewhere live.
    fn place_materialized(
        &mut self,
        panel: PanelId,
        pane: NodeId,
        split: Option<(bool, bool)>,
        placed: DropOutcome,
    ) -> DropOutcome {
        let Some((vertical, new_first)) = split else {
            return placed;
        };
        match self.split_with_panel_quiet(pane, panel, vertical, new_first) {
            SplitOutcome::Split(split) => DropOutcome::Split { panel, split },
            SplitOutcome::Moved => placed,
            SplitOutcome::Unchanged => {
                if self.panels.get(&panel).is_some_and(|p| p.pane == pane) {
                    placed
                } else if self.move_into_pane_quiet(panel, pane, usize::MAX) {
                    placed
                } else {
                    DropOutcome::Nothing
                }
            }
        }
    }

    fn column_allows_pinned(&self, column: ColumnLocation) -> bool {
        self.columns.get(column).visible && !self.config.pinned_forbidden_columns.contains(&column)
    }

    fn hidden_index(&self, source_id: &str) -> Option<usize> {
        self.hidden.iter().position(|h| h.source_id == source_id)
    }

    fn take_ghost(&mut self, column: ColumnLocation, index: usize) -> Option<GhostTab> {
        let list = &mut self.ghosts[column.index()];
        (index < list.len()).then(|| list.remove(index))
    }

    /// Insert `ghost` into `column`'s list at `index` (clamped), after
    /// removing any other placement for the same identifier.
    fn insert_ghost(&mut self, mut ghost: GhostTab, column: ColumnLocation, index: usize) -> usize {
        if let Some(identifier) = ghost.identifier() {
            self.remove_ghosts_for(&identifier);
        }
        ghost.column = Some(column);
        let list = &mut self.ghosts[column.index()];
        let index = index.min(list.len());
        list.insert(index, ghost);
        index
    }

    /// Park a live tab in the hidden list at `index` (appended when
    /// `None`). Pinned tabs refuse.
    pub fn hide_tab(&mut self, panel: PanelId, index: Option<usize>) -> Result<usize, LayoutError> {
        let source_id = self.hide_tab_quiet(panel, index)?;
        self.notify(LayoutChangeReason::Structure);
        Ok(self.hidden_index(&source_id).unwrap_or_default())
    }

    fn hide_tab_quiet(&mut self, panel: PanelId, index: Option<usize>) -> Result<String, LayoutError> {
        let Some(record) = self.panels.get(&panel) else {
            tracing::debug!(target: "panedeck.drag", panel = %panel, "hide panel missing");
            return Err(LayoutError::MissingIdentifier);
        };
        if record.tab.pinned {
            tracing::info!(target: "panedeck.drag", panel = %panel, "pinned tab refused hidden list");
            return Err(PolicyViolation::PinnedToHidden { panel }.into());
        }
        let source_id = record.source_id.clone();
        let entry = HiddenTab {
            source_id: source_id.clone(),
            active: record.tab.active,
            collapsed: record.tab.collapsed,
        };
        self.remove_ghosts_for(&source_id);
        self.destroy_quiet(panel);
        if let Some(at) = self.hidden_index(&source_id) {
            self.hidden.remove(at);
        }
        let at = index.unwrap_or(self.hidden.len()).min(self.hidden.len());
        self.hidden.insert(at, entry);
        tracing::debug!(target: "panedeck.drag", source = %source_id, index = at, "tab hidden");
        Ok(source_id)
    }

    /// Turn a live tab into a pending placement in `column`'s list. Pinned
    /// tabs refuse, and the tab needs a DOM-id or class identifier.
    pub fn pend_tab(
        &mut self,
        panel: PanelId,
        column: ColumnLocation,
        index: Option<usize>,
    ) -> Result<usize, LayoutError> {
        let index = self.pend_tab_quiet(panel, column, index)?;
        self.notify(LayoutChangeReason::Structure);
        Ok(index)
    }

    fn pend_tab_quiet(
        &mut self,
        panel: PanelId,
        column: ColumnLocation,
        index: Option<usize>,
    ) -> Result<usize, LayoutError> {
        let Some(record) = self.panels.get(&panel).cloned() else {
            tracing::debug!(target: "panedeck.drag", panel = %panel, "pend panel missing");
            return Err(LayoutError::MissingIdentifier);
        };
        if record.tab.pinned {
            tracing::info!(target: "panedeck.drag", panel = %panel, "pinned tab refused pending list");
            return Err(PolicyViolation::PinnedToPending { panel }.into());
        }
        let key = SearchKey::parse(&record.source_id).ok_or(LayoutError::MissingIdentifier)?;
        let mut ghost = GhostTab::for_key(&key, column);
        if self.tree.column_of(record.pane) == Some(column) {
            ghost.pane_id = Some(record.pane.to_string());
            ghost.pane_index = self
                .tree
                .pane(record.pane)
                .and_then(|data| data.tabs.iter().position(|id| *id == panel));
        }
        ghost.title = Some(record.tab.title.clone());
        ghost.icon = record.tab.icon.clone();
        ghost.active = record.tab.active;
        ghost.collapsed = record.tab.collapsed;

        self.destroy_quiet(panel);
        self.hidden.retain(|h| h.source_id != record.source_id);
        let end = self.ghosts[column.index()].len();
        let at = self.insert_ghost(ghost, column, index.unwrap_or(end));
        tracing::debug!(target: "panedeck.drag", source = %record.source_id, %column, index = at, "tab pended");
        Ok(at)
    }

    /// Bring a hidden tab back into `pane` at `index`.
    pub fn restore_hidden(&mut self, source_id: &str, pane: NodeId, index: usize) -> Option<PanelId> {
        let panel = self.restore_hidden_quiet(source_id, pane, index)?;
        self.notify(LayoutChangeReason::Structure);
        Some(panel)
    }

    fn restore_hidden_quiet(&mut self, source_id: &str, pane: NodeId, index: usize) -> Option<PanelId> {
        let at = self.hidden_index(source_id)?;
        self.tree.pane(pane)?;
        let entry = self.hidden[at].clone();
        let element = self.staging.get(source_id).copied().or_else(|| {
            SearchKey::parse(source_id).and_then(|key| self.find_hydratable(&key))
        });
        let mut content = TabContent::new(source_id)
            .active(entry.active)
            .collapsed(entry.collapsed);
        if let Some(key) = SearchKey::parse(source_id) {
            content = content.title(key.name());
        }
        content.element = element;
        let panel = self.create_tab_quiet(content, pane, Some(index))?;
        self.hidden.remove(at);
        self.reveal_column_of(pane);
        tracing::debug!(target: "panedeck.drag", source = %source_id, panel = %panel, "hidden tab restored");
        Some(panel)
    }
}

/// Split direction for a pointer over pane content, or `None` inside the
/// dead zone. Returns `(vertical, new_first)`.
#[must_use]
pub fn split_gesture(rect: Rect, point: Point, threshold: f64) -> Option<(bool, bool)> {
    let (rx, ry) = rect.relative(point);
    let dx = rx.min(1.0 - rx);
    let dy = ry.min(1.0 - ry);
    let near_x = dx < threshold;
    let near_y = dy < threshold;
    if !near_x && !near_y {
        return None;
    }
    let vertical = near_x && (!near_y || dx <= dy);
    let new_first = if vertical { rx < 0.5 } else { ry < 0.5 };
    Some((vertical, new_first))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_kind_parses_data_attributes() {
        assert_eq!("hidden".parse(), Ok(ListKind::Hidden));
        assert_eq!(
            "pending:right".parse(),
            Ok(ListKind::Pending(ColumnLocation::Right))
        );
        assert!("pending:middle".parse::<ListKind>().is_err());
        assert_eq!(ListKind::Pending(ColumnLocation::Left).to_string(), "pending:left");
    }

    #[test]
    fn list_index_uses_midpoints() {
        let hover = ListHover {
            kind: ListKind::Hidden,
            item_midpoints: vec![10.0, 30.0, 50.0],
            coordinate: 31.0,
        };
        assert_eq!(hover.index(), 2);
    }

    #[test]
    fn split_gesture_picks_nearest_edge() {
        let rect = Rect::new(0.0, 0.0, 1000.0, 500.0);
        assert_eq!(split_gesture(rect, Point::new(500.0, 250.0), 0.2), None);
        assert_eq!(split_gesture(rect, Point::new(950.0, 250.0), 0.2), Some((true, false)));
        assert_eq!(split_gesture(rect, Point::new(20.0, 250.0), 0.2), Some((true, true)));
        assert_eq!(split_gesture(rect, Point::new(500.0, 30.0), 0.2), Some((false, true)));
        assert_eq!(split_gesture(rect, Point::new(500.0, 480.0), 0.2), Some((false, false)));
        // Corner: the closer edge wins.
        assert_eq!(split_gesture(rect, Point::new(990.0, 60.0), 0.2), Some((true, false)));
    }
}
