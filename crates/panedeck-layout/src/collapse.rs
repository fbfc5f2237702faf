#![forbid(unsafe_code)]

//! Pane and split collapse state, orientation, and view settings.
//!
//! # Design
//!
//! Each pane and split is either expanded or collapsed. A collapsed node sits
//! in its parent split at a fixed pixel footprint and remembers its last
//! proportional share in `last_flex`. A split is container-collapsed exactly
//! when all of its children are collapsed; that state propagates upward.
//!
//! Leaving the collapsed state always re-derives orientation and share from
//! the current tree instead of trusting cached values.

use panedeck_core::geometry::{Axis, Rect};

use crate::host::ContentHost;
use crate::layout::{LayoutMap, flexible_extent};
use crate::model::{
    NodeId, NodeKind, OrientationSetting, SplitOrientation, StripOrientation, ViewSettings,
};
use crate::session::LayoutSession;
use crate::signal::LayoutChangeReason;
use crate::sizing::{FlexBasis, SAME_SIZE_EPSILON, distribute, px_to_percent};

/// Shares at or above this fill their parent.
const FILLS_PARENT_PERCENT: f64 = 99.9;

impl<H: ContentHost> LayoutSession<H> {
    /// Collapse or expand `pane`. Returns whether the state changed.
    pub fn set_collapsed_view(&mut self, pane: NodeId, collapsed: bool) -> bool {
        let changed = self.set_collapsed_view_quiet(pane, collapsed);
        if changed {
            self.notify(LayoutChangeReason::Structure);
        }
        changed
    }

    pub(crate) fn set_collapsed_view_quiet(&mut self, pane: NodeId, collapsed: bool) -> bool {
        let Some(node) = self.tree.node(pane) else {
            tracing::debug!(target: "panedeck.tree", pane = %pane, "collapse target missing");
            return false;
        };
        let Some(data) = node.as_pane() else {
            return false;
        };
        if node.collapsed == collapsed {
            return false;
        }
        let minimal = data.view.minimal_panel_size;
        let parent = node.parent;
        let map = self.solve_layout();

        match parent {
            Some(split) => {
                let flexible = self.split_flexible_extent(split, &map);
                let axis = self.split_axis(split);
                if collapsed {
                    self.collapse_in_split(pane, split, axis, minimal, flexible, &map);
                } else {
                    self.expand_in_split(pane, split, minimal, flexible);
                }
            }
            None => {
                if let Some(node) = self.tree.node_mut(pane) {
                    node.collapsed = collapsed;
                }
            }
        }

        tracing::debug!(target: "panedeck.tree", pane = %pane, collapsed, "pane collapse toggled");
        let map = self.solve_layout();
        self.apply_orientation_with(pane, &map);
        if let Some(split) = parent {
            self.update_split_collapsed_state(split);
        }
        true
    }

    fn collapse_in_split(
        &mut self,
        pane: NodeId,
        split: NodeId,
        axis: Axis,
        minimal: f64,
        flexible: f64,
        map: &LayoutMap,
    ) {
        let current_px = map.node(pane).map_or(0.0, |rect| rect.extent(axis));
        let Some(node) = self.tree.node_mut(pane) else {
            return;
        };
        let remembered = match node.flex {
            FlexBasis::Percent(value) if value < FILLS_PARENT_PERCENT && current_px >= minimal => {
                value
            }
            _ => px_to_percent(minimal, flexible).min(100.0),
        };
        node.last_flex = Some(FlexBasis::Percent(remembered));
        node.flex = FlexBasis::Pixels(crate::COLLAPSED_PANE_PX);
        node.collapsed = true;
        self.tree.normalize_split(split, None);
    }

    fn expand_in_split(&mut self, pane: NodeId, split: NodeId, minimal: f64, flexible: f64) {
        let restore = self
            .tree
            .node(pane)
            .and_then(|n| n.last_flex)
            .and_then(FlexBasis::as_percent)
            .filter(|value| *value >= SAME_SIZE_EPSILON);
        let pct = match restore {
            Some(value) => value,
            None => self.reclaim_from_siblings(pane, split, px_to_percent(minimal, flexible)),
        };
        if let Some(node) = self.tree.node_mut(pane) {
            node.collapsed = false;
            node.last_flex = None;
            node.flex = FlexBasis::Percent(pct.min(100.0));
        }
        self.tree.normalize_split(split, Some(pane));
    }

    /// Take `wanted` percent from siblings in proportion to their spare
    /// share above their own minimum. Returns what was obtained (or
    /// `wanted` when siblings hold no percentages at all).
    fn reclaim_from_siblings(&mut self, pane: NodeId, split: NodeId, wanted: f64) -> f64 {
        let Some(children) = self.tree.split(split).map(|s| s.children.clone()) else {
            return wanted;
        };
        let map = self.solve_layout();
        let flexible = self.split_flexible_extent(split, &map);
        let axis = self.split_axis(split);
        let donors: Vec<(NodeId, f64, f64)> = children
            .iter()
            .filter(|c| **c != pane)
            .filter_map(|c| {
                let share = self.tree.node(*c)?.flex.as_percent()?;
                let min = px_to_percent(self.tree.min_extent(*c, axis), flexible);
                Some((*c, share, min))
            })
            .collect();
        if donors.is_empty() {
            return wanted;
        }
        let mut spare: Vec<f64> = donors.iter().map(|(_, share, min)| (share - min).max(0.0)).collect();
        let total_spare: f64 = spare.iter().sum();
        let taken = wanted.min(total_spare);
        distribute(&mut spare, -taken);
        for ((id, _, min), left) in donors.iter().zip(spare) {
            if let Some(node) = self.tree.node_mut(*id) {
                node.flex = FlexBasis::Percent(min + left);
            }
        }
        tracing::debug!(target: "panedeck.tree", pane = %pane, wanted, taken, "share reclaimed");
        if taken > 0.0 { taken } else { wanted }
    }

    /// Re-derive whether `split` is container-collapsed, then walk upward.
    pub fn update_split_collapsed_state(&mut self, split: NodeId) {
        let mut cursor = Some(split);
        while let Some(current) = cursor {
            self.update_one_split(current);
            cursor = self.tree.parent(current);
        }
    }

    /// Re-derive container-collapse for every split, children first.
    pub(crate) fn refresh_collapsed_splits(&mut self) {
        for split in self.tree.splits_bottom_up() {
            self.update_one_split(split);
        }
    }

    fn update_one_split(&mut self, split: NodeId) {
        let Some(node) = self.tree.node(split) else {
            return;
        };
        let Some(data) = node.as_split() else {
            return;
        };
        let all_collapsed =
            !data.children.is_empty() && data.children.iter().all(|c| self.tree.is_collapsed(*c));
        if all_collapsed == node.collapsed {
            return;
        }
        let parent = node.parent;
        let natural = data.natural_orientation;
        let map = self.solve_layout();

        if all_collapsed {
            let bounds = parent
                .and_then(|p| map.node(p))
                .or_else(|| map.column(node.column))
                .or_else(|| map.node(split));
            let forced = bounds.map_or(SplitOrientation::Vertical, footprint_orientation);
            if let Some(data) = self.tree.split_mut(split) {
                data.orientation = forced;
            }
            let parent_axis = parent.map(|p| self.split_axis(p));
            let extent = parent_axis.map(|axis| self.tree.collapsed_extent(split, axis));
            if let Some(node) = self.tree.node_mut(split) {
                node.collapsed = true;
                if let Some(extent) = extent {
                    if let FlexBasis::Percent(value) = node.flex {
                        node.last_flex = Some(FlexBasis::Percent(value));
                    }
                    node.flex = FlexBasis::Pixels(extent);
                }
            }
            if let Some(parent) = parent {
                self.tree.normalize_split(parent, None);
            }
            tracing::debug!(target: "panedeck.tree", %split, orientation = ?forced, "split collapsed");
        } else {
            if let Some(data) = self.tree.split_mut(split) {
                data.orientation = natural;
            }
            let fallback = parent
                .map(|p| {
                    let flexible = self.split_flexible_extent(p, &map);
                    let axis = self.split_axis(p);
                    px_to_percent(self.tree.min_extent(split, axis), flexible)
                })
                .unwrap_or(100.0);
            if let Some(node) = self.tree.node_mut(split) {
                node.collapsed = false;
                if parent.is_some() {
                    let restore = node
                        .last_flex
                        .take()
                        .and_then(FlexBasis::as_percent)
                        .filter(|value| *value >= SAME_SIZE_EPSILON)
                        .unwrap_or(fallback);
                    node.flex = FlexBasis::Percent(restore.min(100.0));
                }
            }
            if let Some(parent) = parent {
                self.tree.normalize_split(parent, Some(split));
            }
            tracing::debug!(target: "panedeck.tree", %split, "split expanded");
        }
    }

    /// Collapse the pane when every non-pinned tab is collapsed, expand it
    /// when one is not. Idempotent. Returns whether the pane changed.
    pub fn check_and_collapse_if_all_tabs_collapsed(&mut self, pane: NodeId) -> bool {
        let changed = self.collapse_if_all_tabs_collapsed(pane);
        if changed {
            self.notify(LayoutChangeReason::Structure);
        }
        changed
    }

    pub(crate) fn collapse_if_all_tabs_collapsed(&mut self, pane: NodeId) -> bool {
        let Some(data) = self.tree.pane(pane) else {
            return false;
        };
        let considered: Vec<bool> = data
            .tabs
            .iter()
            .filter_map(|id| self.panels.get(id))
            .filter(|panel| !panel.tab.pinned)
            .map(|panel| panel.tab.collapsed)
            .collect();
        if considered.is_empty() {
            return false;
        }
        let target = considered.iter().all(|collapsed| *collapsed);
        if self.tree.is_collapsed(pane) == target {
            return false;
        }
        self.set_collapsed_view_quiet(pane, target)
    }

    /// Derive the strip orientation of `pane` from its settings and the
    /// current geometry.
    pub fn apply_orientation(&mut self, pane: NodeId) -> Option<StripOrientation> {
        let map = self.solve_layout();
        self.apply_orientation_with(pane, &map)
    }

    pub(crate) fn apply_orientation_with(
        &mut self,
        pane: NodeId,
        map: &LayoutMap,
    ) -> Option<StripOrientation> {
        let node = self.tree.node(pane)?;
        let data = node.as_pane()?;
        let derived = if node.collapsed {
            match data.view.collapsed_orientation {
                OrientationSetting::Horizontal => Some(StripOrientation::Horizontal),
                OrientationSetting::Vertical => Some(StripOrientation::Vertical),
                OrientationSetting::Auto => Some(self.collapsed_strip_from_ancestors(pane)),
            }
        } else {
            match data.view.default_orientation {
                OrientationSetting::Horizontal => Some(StripOrientation::Horizontal),
                OrientationSetting::Vertical => Some(StripOrientation::Vertical),
                OrientationSetting::Auto => map.node(pane).map(|rect| {
                    if rect.is_wide() {
                        StripOrientation::Horizontal
                    } else {
                        StripOrientation::Vertical
                    }
                }),
            }
        };
        let data = self.tree.pane_mut(pane)?;
        data.orientation_deferred = false;
        if let Some(orientation) = derived {
            data.strip = orientation;
        }
        Some(data.strip)
    }

    fn collapsed_strip_from_ancestors(&self, pane: NodeId) -> StripOrientation {
        let ancestors = self.tree.ancestors(pane);
        let expanded = ancestors
            .iter()
            .find(|id| !self.tree.is_collapsed(**id))
            .or_else(|| ancestors.first())
            .and_then(|id| self.tree.split(*id))
            .map(|split| split.orientation);
        // A collapsed column root shrinks to a thin vertical strip.
        expanded.map_or(StripOrientation::Vertical, StripOrientation::from_split)
    }

    /// Re-derive orientation for every pane.
    pub(crate) fn apply_all_orientations(&mut self, map: &LayoutMap) {
        for pane in self.tree.all_panes() {
            self.apply_orientation_with(pane, map);
        }
    }

    /// Keep the fixed footprint of collapsed nodes in sync with their
    /// content, then renormalize every split. Runs bottom-up.
    pub(crate) fn normalize_splits(&mut self) {
        for split in self.tree.splits_bottom_up() {
            let Some(children) = self.tree.split(split).map(|s| s.children.clone()) else {
                continue;
            };
            let axis = self.split_axis(split);
            for child in children {
                let extent = self.tree.collapsed_extent(child, axis);
                let Some(node) = self.tree.node_mut(child) else {
                    continue;
                };
                if !node.collapsed {
                    continue;
                }
                let fixed = if matches!(node.kind, NodeKind::Pane(_)) {
                    crate::COLLAPSED_PANE_PX
                } else {
                    extent
                };
                if let FlexBasis::Percent(value) = node.flex {
                    node.last_flex.get_or_insert(FlexBasis::Percent(value));
                }
                node.flex = FlexBasis::Pixels(fixed);
            }
            self.tree.normalize_split(split, None);
        }
    }

    /// View settings of `pane`.
    #[must_use]
    pub fn pane_view_settings(&self, pane: NodeId) -> Option<&ViewSettings> {
        self.tree.pane(pane).map(|data| &data.view)
    }

    /// Replace the view settings of `pane`. Non-positive minimum sizes are
    /// rejected.
    pub fn set_pane_view_settings(&mut self, pane: NodeId, view: ViewSettings) -> bool {
        if view.minimal_panel_size <= 0.0 {
            return false;
        }
        let Some(data) = self.tree.pane_mut(pane) else {
            tracing::debug!(target: "panedeck.tree", pane = %pane, "view settings target missing");
            return false;
        };
        if data.view == view {
            return false;
        }
        data.view = view;
        self.notify(LayoutChangeReason::Structure);
        true
    }

    /// Axis of `split` (children laid out along it).
    pub(crate) fn split_axis(&self, split: NodeId) -> Axis {
        self.tree
            .split(split)
            .map_or(Axis::X, |data| data.orientation.axis())
    }

    /// Space shared by the percentage children of `split`.
    pub(crate) fn split_flexible_extent(&self, split: NodeId, map: &LayoutMap) -> f64 {
        let Some(data) = self.tree.split(split) else {
            return 0.0;
        };
        let Some(rect) = map.node(split) else {
            return 0.0;
        };
        let bases: Vec<FlexBasis> = data
            .children
            .iter()
            .filter_map(|c| self.tree.node(*c).map(|n| n.flex))
            .collect();
        flexible_extent(rect.extent(data.orientation.axis()), &bases)
    }
}

/// Orientation that minimizes a collapsed split's footprint inside `bounds`:
/// stacked in wide space, side by side in tall space.
fn footprint_orientation(bounds: Rect) -> SplitOrientation {
    if bounds.is_wide() {
        SplitOrientation::Horizontal
    } else {
        SplitOrientation::Vertical
    }
}
