#![forbid(unsafe_code)]

//! Pane/split arena and the structural operations built on it.
//!
//! # Design
//!
//! [`LayoutTree`] owns every [`Node`] in a `BTreeMap` keyed by [`NodeId`],
//! plus one optional root per column. Splits own their children by id; the
//! child's `parent` is a lookup-only back-reference. Node ids are allocated
//! monotonically and never reused within a session.
//!
//! Operations that also touch panels, columns or signals (splitting with a
//! panel, empty-pane cleanup) live on [`LayoutSession`] below; the arena
//! itself only keeps parent/child links consistent.
//!
//! # Invariants
//!
//! 1. Every child listed by a split has that split as `parent`.
//! 2. A column root has `parent == None` and `column` equal to its column.
//! 3. After cleanup no split has fewer than two children.
//! 4. The center column always has a root.
//!
//! # Failure Modes
//!
//! - **Stale ids**: lookups on removed ids return `None`; structural
//!   operations on them are no-ops that log at `debug`.

use std::collections::BTreeMap;

use panedeck_core::geometry::Axis;

use crate::host::ContentHost;
use crate::model::{
    ColumnLocation, Node, NodeId, NodeKind, PaneData, PanelId, SplitData, SplitOrientation,
    StripOrientation, ViewSettings, ViewSettingsOverrides,
};
use crate::session::LayoutSession;
use crate::signal::LayoutChangeReason;
use crate::sizing::{FlexBasis, normalize_shares};
use crate::{COLLAPSED_PANE_PX, RESIZER_PX};

/// Result of a split request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOutcome {
    /// A new split was created.
    Split(NodeId),
    /// The depth ceiling turned the split into a plain move.
    Moved,
    Unchanged,
}

/// Arena of pane and split nodes for the three columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTree {
    nodes: BTreeMap<NodeId, Node>,
    roots: [Option<NodeId>; 3],
    next_id: NodeId,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            roots: [None; 3],
            next_id: NodeId::MIN,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    #[must_use]
    pub fn pane(&self, id: NodeId) -> Option<&PaneData> {
        self.nodes.get(&id).and_then(Node::as_pane)
    }

    pub fn pane_mut(&mut self, id: NodeId) -> Option<&mut PaneData> {
        self.nodes.get_mut(&id).and_then(Node::as_pane_mut)
    }

    #[must_use]
    pub fn split(&self, id: NodeId) -> Option<&SplitData> {
        self.nodes.get(&id).and_then(Node::as_split)
    }

    pub fn split_mut(&mut self, id: NodeId) -> Option<&mut SplitData> {
        self.nodes.get_mut(&id).and_then(Node::as_split_mut)
    }

    /// Every node, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    #[must_use]
    pub const fn root(&self, column: ColumnLocation) -> Option<NodeId> {
        self.roots[column.index()]
    }

    pub(crate) fn set_root(&mut self, column: ColumnLocation, root: Option<NodeId>) {
        self.roots[column.index()] = root;
        if let Some(node) = root.and_then(|id| self.nodes.get_mut(&id)) {
            node.parent = None;
            node.column = column;
        }
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    #[must_use]
    pub fn column_of(&self, id: NodeId) -> Option<ColumnLocation> {
        self.nodes.get(&id).map(|node| node.column)
    }

    #[must_use]
    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|node| node.collapsed)
    }

    fn allocate(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    /// Insert a detached pane record.
    pub(crate) fn insert_pane(&mut self, column: ColumnLocation, view: ViewSettings) -> NodeId {
        let id = self.allocate();
        self.nodes.insert(
            id,
            Node {
                id,
                parent: None,
                column,
                flex: FlexBasis::FULL,
                last_flex: None,
                collapsed: false,
                kind: NodeKind::Pane(PaneData {
                    view,
                    tabs: Vec::new(),
                    strip: StripOrientation::Horizontal,
                    icons_only: false,
                    orientation_deferred: true,
                }),
            },
        );
        id
    }

    /// Insert a split over `children`, re-parenting them.
    pub(crate) fn insert_split(
        &mut self,
        column: ColumnLocation,
        orientation: SplitOrientation,
        children: Vec<NodeId>,
    ) -> NodeId {
        let id = self.allocate();
        for child in &children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(id);
                node.column = column;
            }
        }
        self.nodes.insert(
            id,
            Node {
                id,
                parent: None,
                column,
                flex: FlexBasis::FULL,
                last_flex: None,
                collapsed: false,
                kind: NodeKind::Split(SplitData {
                    orientation,
                    natural_orientation: orientation,
                    children,
                }),
            },
        );
        id
    }

    /// Drop a node record without touching links.
    pub(crate) fn discard(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(&id)
    }

    /// Put `new` where `old` sits (in its parent split or as column root).
    /// `new` inherits `old`'s flex basis.
    pub(crate) fn replace_child(&mut self, old: NodeId, new: NodeId) -> bool {
        let Some(old_node) = self.nodes.get(&old) else {
            return false;
        };
        let parent = old_node.parent;
        let column = old_node.column;
        let (flex, last_flex) = (old_node.flex, old_node.last_flex);
        match parent {
            Some(parent_id) => {
                let Some(split) = self.split_mut(parent_id) else {
                    return false;
                };
                let Some(slot) = split.children.iter_mut().find(|child| **child == old) else {
                    return false;
                };
                *slot = new;
            }
            None => {
                if self.roots[column.index()] != Some(old) {
                    return false;
                }
                self.roots[column.index()] = Some(new);
            }
        }
        if let Some(node) = self.nodes.get_mut(&old) {
            node.parent = None;
        }
        if let Some(node) = self.nodes.get_mut(&new) {
            node.parent = parent;
            node.column = column;
            node.flex = flex;
            node.last_flex = last_flex;
        }
        true
    }

    /// Unlink `child` from its parent split. Returns the split and the
    /// child's former index.
    pub(crate) fn detach_from_parent(&mut self, child: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(child)?;
        let split = self.split_mut(parent)?;
        let index = split.children.iter().position(|c| *c == child)?;
        split.children.remove(index);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
        Some((parent, index))
    }

    /// Number of layers a pane sits in: 1 for a column root, plus one per
    /// enclosing split.
    #[must_use]
    pub fn layer_count(&self, id: NodeId) -> usize {
        1 + self.ancestors(id).len()
    }

    /// Ancestor splits from nearest to the column root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            if out.contains(&current) {
                break;
            }
            out.push(current);
            cursor = self.parent(current);
        }
        out
    }

    /// Pre-order walk below (and including) `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            if let Some(split) = node.as_split() {
                stack.extend(split.children.iter().rev().copied());
            }
        }
        out
    }

    /// Panes of `column` in traversal order.
    #[must_use]
    pub fn panes_in(&self, column: ColumnLocation) -> Vec<NodeId> {
        self.root(column)
            .map(|root| {
                self.descendants(root)
                    .into_iter()
                    .filter(|id| self.nodes.get(id).is_some_and(Node::is_pane))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First pane reached by walking into `column`.
    #[must_use]
    pub fn first_pane(&self, column: ColumnLocation) -> Option<NodeId> {
        self.panes_in(column).into_iter().next()
    }

    /// Every pane in column order.
    #[must_use]
    pub fn all_panes(&self) -> Vec<NodeId> {
        ColumnLocation::ALL
            .iter()
            .flat_map(|column| self.panes_in(*column))
            .collect()
    }

    /// Splits in post-order (children before parents) across all columns.
    #[must_use]
    pub fn splits_bottom_up(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for column in ColumnLocation::ALL {
            if let Some(root) = self.root(column) {
                let mut order = self.descendants(root);
                order.reverse();
                out.extend(
                    order
                        .into_iter()
                        .filter(|id| self.split(*id).is_some()),
                );
            }
        }
        out
    }

    /// Pane holding `panel` in its strip.
    #[must_use]
    pub fn pane_of(&self, panel: PanelId) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.as_pane().is_some_and(|pane| pane.tabs.contains(&panel)))
            .map(|node| node.id)
    }

    /// Smallest usable extent of `id` along `axis`.
    #[must_use]
    pub fn min_extent(&self, id: NodeId, axis: Axis) -> f64 {
        let Some(node) = self.nodes.get(&id) else {
            return 0.0;
        };
        match &node.kind {
            NodeKind::Pane(pane) => {
                if node.collapsed {
                    COLLAPSED_PANE_PX
                } else {
                    pane.view.minimal_panel_size
                }
            }
            NodeKind::Split(split) => {
                self.combine(split, axis, |child| self.min_extent(child, axis))
            }
        }
    }

    /// Footprint of collapsed content along `axis`: a fixed strip per pane,
    /// summed with gaps along a split's own axis and maxed across it.
    #[must_use]
    pub fn collapsed_extent(&self, id: NodeId, axis: Axis) -> f64 {
        let Some(node) = self.nodes.get(&id) else {
            return 0.0;
        };
        match &node.kind {
            NodeKind::Pane(_) => COLLAPSED_PANE_PX,
            NodeKind::Split(split) => {
                self.combine(split, axis, |child| self.collapsed_extent(child, axis))
            }
        }
    }

    fn combine(&self, split: &SplitData, axis: Axis, measure: impl Fn(NodeId) -> f64) -> f64 {
        if split.children.is_empty() {
            return 0.0;
        }
        if split.orientation.axis() == axis {
            let gaps = RESIZER_PX * (split.children.len() - 1) as f64;
            split.children.iter().map(|c| measure(*c)).sum::<f64>() + gaps
        } else {
            split
                .children
                .iter()
                .map(|c| measure(*c))
                .fold(0.0, f64::max)
        }
    }

    /// Rescale the percentage children of `split` to sum to 100, keeping
    /// `protected` at its current share.
    pub(crate) fn normalize_split(&mut self, split: NodeId, protected: Option<NodeId>) {
        let Some(children) = self.split(split).map(|s| s.children.clone()) else {
            return;
        };
        let mut shares: Vec<Option<f64>> = children
            .iter()
            .map(|c| self.nodes.get(c).and_then(|n| n.flex.as_percent()))
            .collect();
        let protected_index = protected.and_then(|p| children.iter().position(|c| *c == p));
        normalize_shares(&mut shares, protected_index);
        for (child, share) in children.iter().zip(shares) {
            if let (Some(node), Some(value)) = (self.nodes.get_mut(child), share) {
                node.flex = FlexBasis::Percent(value);
            }
        }
    }

    /// Check parent/child consistency; returns a description of each
    /// problem found.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for column in ColumnLocation::ALL {
            if let Some(root) = self.root(column) {
                match self.nodes.get(&root) {
                    None => problems.push(format!("{column} root {root} missing")),
                    Some(node) if node.parent.is_some() => {
                        problems.push(format!("{column} root {root} has a parent"));
                    }
                    Some(_) => {}
                }
            }
        }
        for node in self.nodes.values() {
            if let Some(split) = node.as_split() {
                if split.children.len() < 2 {
                    problems.push(format!(
                        "split {} has {} children",
                        node.id,
                        split.children.len()
                    ));
                }
                for child in &split.children {
                    match self.nodes.get(child) {
                        None => problems.push(format!("split {} lists missing {child}", node.id)),
                        Some(c) if c.parent != Some(node.id) => {
                            problems.push(format!("{child} parent mismatch under {}", node.id));
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        if self.root(ColumnLocation::Center).is_none() {
            problems.push("center column has no root".to_string());
        }
        problems
    }
}

impl<H: ContentHost> LayoutSession<H> {
    /// Create a detached pane whose view settings are the defaults merged
    /// with `overrides`. With `defer_orientation` the strip orientation is
    /// derived on the next settle instead of immediately.
    pub fn create_pane(
        &mut self,
        column: ColumnLocation,
        overrides: &ViewSettingsOverrides,
        defer_orientation: bool,
    ) -> NodeId {
        let view = ViewSettings::default().merged(overrides);
        let id = self.tree.insert_pane(column, view);
        if let Some(pane) = self.tree.pane_mut(id) {
            pane.icons_only = self.config.icons_only;
        }
        if !defer_orientation {
            let map = self.solve_layout();
            self.apply_orientation_with(id, &map);
        }
        tracing::debug!(target: "panedeck.tree", pane = %id, %column, "pane created");
        id
    }

    /// Number of layers `pane` sits in.
    #[must_use]
    pub fn layer_count(&self, pane: NodeId) -> usize {
        self.tree.layer_count(pane)
    }

    /// Split `target` so that `moving` gets a pane of its own.
    ///
    /// At the column's depth ceiling this degrades to a plain move into
    /// `target`. Returns the new split, or `None` when no split was made.
    pub fn split_with_panel(
        &mut self,
        target: NodeId,
        moving: PanelId,
        vertical: bool,
        new_first: bool,
    ) -> Option<NodeId> {
        let outcome = self.split_with_panel_quiet(target, moving, vertical, new_first);
        if outcome != SplitOutcome::Unchanged {
            self.notify(LayoutChangeReason::Structure);
        }
        match outcome {
            SplitOutcome::Split(split) => Some(split),
            SplitOutcome::Moved | SplitOutcome::Unchanged => None,
        }
    }

    pub(crate) fn split_with_panel_quiet(
        &mut self,
        target: NodeId,
        moving: PanelId,
        vertical: bool,
        new_first: bool,
    ) -> SplitOutcome {
        let Some(target_node) = self.tree.node(target) else {
            tracing::debug!(target: "panedeck.tree", pane = %target, "split target missing");
            return SplitOutcome::Unchanged;
        };
        let Some(target_pane) = target_node.as_pane() else {
            return SplitOutcome::Unchanged;
        };
        let Some(source_pane) = self.panels.get(&moving).map(|p| p.pane) else {
            tracing::debug!(target: "panedeck.tree", panel = %moving, "split panel missing");
            return SplitOutcome::Unchanged;
        };
        let column = target_node.column;
        let max_layers = self.config.max_layers(column);
        if self.tree.layer_count(target) >= max_layers {
            tracing::debug!(
                target: "panedeck.tree",
                pane = %target,
                max_layers,
                "depth ceiling reached, moving instead of splitting"
            );
            let end = target_pane.tabs.len();
            return if self.move_into_pane_quiet(moving, target, end) {
                SplitOutcome::Moved
            } else {
                SplitOutcome::Unchanged
            };
        }
        if source_pane == target && target_pane.tabs.len() <= 1 {
            tracing::debug!(target: "panedeck.tree", pane = %target, "nothing to split away from");
            return SplitOutcome::Unchanged;
        }

        let view = target_pane.view.clone();
        let remaining: Vec<PanelId> = target_pane
            .tabs
            .iter()
            .copied()
            .filter(|id| *id != moving)
            .collect();
        let target_collapsed = target_node.collapsed;

        let keep = self.tree.insert_pane(column, view.clone());
        let fresh = self.tree.insert_pane(column, view);
        for pane in [keep, fresh] {
            if let Some(data) = self.tree.pane_mut(pane) {
                data.icons_only = self.config.icons_only;
            }
        }
        let orientation = SplitOrientation::from_vertical(vertical);
        let children = if new_first {
            vec![fresh, keep]
        } else {
            vec![keep, fresh]
        };
        let split = self.tree.insert_split(column, orientation, children);
        for child in [keep, fresh] {
            if let Some(node) = self.tree.node_mut(child) {
                node.flex = FlexBasis::Percent(50.0);
            }
        }
        self.tree.replace_child(target, split);

        // Existing tabs stay together on the non-moving side.
        if let Some(data) = self.tree.pane_mut(keep) {
            data.tabs = remaining.clone();
        }
        for id in &remaining {
            if let Some(panel) = self.panels.get_mut(id) {
                panel.pane = keep;
            }
        }
        if let Some(data) = self.tree.pane_mut(target) {
            data.tabs.clear();
        }
        self.tree.discard(target);

        if source_pane != target {
            if let Some(data) = self.tree.pane_mut(source_pane) {
                data.tabs.retain(|id| *id != moving);
            }
        }
        if let Some(data) = self.tree.pane_mut(fresh) {
            data.tabs.insert(0, moving);
        }
        if let Some(panel) = self.panels.get_mut(&moving) {
            panel.pane = fresh;
            panel.tab.collapsed = false;
        }

        self.set_active_in_pane_quiet(keep, None);
        self.set_active_in_pane_quiet(fresh, Some(moving));
        if target_collapsed {
            self.collapse_if_all_tabs_collapsed(keep);
        }
        if source_pane != target && self.tree.contains(source_pane) {
            self.set_active_in_pane_quiet(source_pane, None);
            self.remove_if_empty_quiet(source_pane);
        }
        self.update_split_collapsed_state(split);

        tracing::debug!(
            target: "panedeck.tree",
            %split,
            pane = %fresh,
            panel = %moving,
            vertical,
            new_first,
            "pane split"
        );
        SplitOutcome::Split(split)
    }

    /// Remove `pane` if it holds no tabs, simplifying the tree above it.
    /// Returns whether anything was removed or hidden.
    pub fn remove_if_empty(&mut self, pane: NodeId) -> bool {
        let removed = self.remove_if_empty_quiet(pane);
        if removed {
            self.notify(LayoutChangeReason::Structure);
        }
        removed
    }

    pub(crate) fn remove_if_empty_quiet(&mut self, pane: NodeId) -> bool {
        let Some(data) = self.tree.pane(pane) else {
            return false;
        };
        if !data.tabs.is_empty() {
            return false;
        }
        let Some(column) = self.tree.column_of(pane) else {
            return false;
        };

        let Some((split, _)) = self.tree.detach_from_parent(pane) else {
            // Column root: the pane stays so the column can be reopened.
            if column.is_side() && self.columns.get(column).visible {
                tracing::debug!(target: "panedeck.tree", pane = %pane, %column, "empty side column hidden");
                self.set_column_visible(column, false);
                return true;
            }
            return false;
        };
        self.tree.discard(pane);
        tracing::debug!(target: "panedeck.tree", pane = %pane, %split, "empty pane removed");
        self.simplify_split(split);
        true
    }

    /// Collapse `split` away once it has fewer than two children.
    fn simplify_split(&mut self, split: NodeId) {
        let Some(children) = self.tree.split(split).map(|s| s.children.clone()) else {
            return;
        };
        match children.as_slice() {
            [] => {
                let column = self.tree.column_of(split);
                match self.tree.detach_from_parent(split) {
                    Some((parent, _)) => {
                        self.tree.discard(split);
                        self.simplify_split(parent);
                    }
                    None => {
                        self.tree.discard(split);
                        if let Some(column) = column {
                            let fresh = self.tree.insert_pane(column, ViewSettings::default());
                            self.tree.set_root(column, Some(fresh));
                            if column.is_side() {
                                self.set_column_visible(column, false);
                            }
                        }
                    }
                }
            }
            [only] => {
                let only = *only;
                self.tree.replace_child(split, only);
                self.tree.discard(split);
                if let Some(node) = self.tree.node_mut(only) {
                    if node.parent.is_none() {
                        node.flex = FlexBasis::FULL;
                        node.last_flex = None;
                    }
                }
                if let Some(parent) = self.tree.parent(only) {
                    self.tree.normalize_split(parent, None);
                    self.update_split_collapsed_state(parent);
                }
                tracing::debug!(target: "panedeck.tree", %split, child = %only, "split lifted");
            }
            _ => {
                self.tree.normalize_split(split, None);
                self.update_split_collapsed_state(split);
            }
        }
    }

    /// Make sure the center column has a root pane.
    pub(crate) fn ensure_center_root(&mut self) {
        if self.tree.root(ColumnLocation::Center).is_none() {
            let pane = self.tree.insert_pane(ColumnLocation::Center, ViewSettings::default());
            self.tree.set_root(ColumnLocation::Center, Some(pane));
            tracing::debug!(target: "panedeck.tree", pane = %pane, "center pane recreated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pane(tree: &mut LayoutTree) -> NodeId {
        tree.insert_pane(ColumnLocation::Center, ViewSettings::default())
    }

    #[test]
    fn replace_child_swaps_root_and_inherits_flex() {
        let mut tree = LayoutTree::new();
        let a = pane(&mut tree);
        tree.set_root(ColumnLocation::Center, Some(a));
        let b = pane(&mut tree);
        let c = pane(&mut tree);
        let split = tree.insert_split(ColumnLocation::Center, SplitOrientation::Vertical, vec![b, c]);
        assert!(tree.replace_child(a, split));
        assert_eq!(tree.root(ColumnLocation::Center), Some(split));
        assert_eq!(tree.layer_count(b), 2);
        assert_eq!(tree.parent(c), Some(split));
        assert!(tree.validate().is_empty(), "{:?}", tree.validate());
    }

    #[test]
    fn extents_follow_split_axis() {
        let mut tree = LayoutTree::new();
        let a = pane(&mut tree);
        let b = pane(&mut tree);
        let split = tree.insert_split(ColumnLocation::Center, SplitOrientation::Vertical, vec![a, b]);
        tree.set_root(ColumnLocation::Center, Some(split));
        let min = ViewSettings::default().minimal_panel_size;
        assert_eq!(tree.min_extent(split, Axis::X), 2.0 * min + RESIZER_PX);
        assert_eq!(tree.min_extent(split, Axis::Y), min);
        assert_eq!(
            tree.collapsed_extent(split, Axis::X),
            2.0 * COLLAPSED_PANE_PX + RESIZER_PX
        );
        assert_eq!(tree.collapsed_extent(split, Axis::Y), COLLAPSED_PANE_PX);
    }

    #[test]
    fn normalize_split_protects_child() {
        let mut tree = LayoutTree::new();
        let a = pane(&mut tree);
        let b = pane(&mut tree);
        let split = tree.insert_split(ColumnLocation::Center, SplitOrientation::Vertical, vec![a, b]);
        if let Some(node) = tree.node_mut(a) {
            node.flex = FlexBasis::Percent(40.0);
        }
        tree.normalize_split(split, Some(a));
        assert_eq!(tree.node(a).map(|n| n.flex), Some(FlexBasis::Percent(40.0)));
        let b_share = tree.node(b).and_then(|n| n.flex.as_percent()).unwrap_or_default();
        assert!((b_share - 60.0).abs() < 1e-9);
    }

    #[test]
    fn validate_reports_short_split() {
        let mut tree = LayoutTree::new();
        let a = pane(&mut tree);
        let split = tree.insert_split(ColumnLocation::Center, SplitOrientation::Vertical, vec![a]);
        tree.set_root(ColumnLocation::Center, Some(split));
        let problems = tree.validate();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("1 children"));
    }
}
