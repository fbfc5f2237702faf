#![forbid(unsafe_code)]

//! Resizer controller: pointer drags between two adjacent siblings.
//!
//! # Design
//!
//! A resizer sits between two neighbours: two children of a split, or two
//! visible columns. [`ResizeStrategy`] hides which of the two it is; the
//! gesture itself is the same. On `begin` both neighbours' pixel sizes and
//! minimums are snapshotted together with the shared flexible extent, and
//! every `update` is computed against that snapshot rather than live
//! geometry, so the math cannot feed back into itself.
//!
//! Intermediate frames publish nothing. `end_resize` publishes exactly one
//! [`LayoutChangeReason::ManualResize`].
//!
//! # Invariants
//!
//! 1. Neither neighbour is pushed below its minimum extent.
//! 2. The pair's combined share is unchanged by a gesture; other siblings are
//!    never touched.
//! 3. A resizer next to a collapsed (fixed) neighbour is disabled.

use std::collections::BTreeMap;

use panedeck_core::geometry::{Axis, Point, Rect};
use panedeck_core::timing::Throttle;
use web_time::{Duration, Instant};

use crate::RESIZER_PX;
use crate::columns::ColumnSet;
use crate::error::{LayoutError, ResizeRejection};
use crate::host::ContentHost;
use crate::layout::{LayoutMap, flexible_extent};
use crate::model::{ColumnLocation, NodeId};
use crate::session::LayoutSession;
use crate::signal::LayoutChangeReason;
use crate::sizing::{FlexBasis, px_to_percent};
use crate::tree::LayoutTree;

/// Identifies one resizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResizerKey {
    /// Between `children[index]` and `children[index + 1]` of `split`.
    Split { split: NodeId, index: usize },
    /// Between two adjacent visible columns.
    Column {
        first: ColumnLocation,
        second: ColumnLocation,
    },
}

/// Attached resizer state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizerInfo {
    pub enabled: bool,
    /// Gap rectangle the handle occupies.
    pub rect: Rect,
}

/// Resizers attached to the current tree.
#[derive(Debug, Clone, Default)]
pub struct ResizerRegistry {
    attached: bool,
    entries: BTreeMap<ResizerKey, ResizerInfo>,
}

impl ResizerRegistry {
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub fn get(&self, key: ResizerKey) -> Option<ResizerInfo> {
        self.entries.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResizerKey, ResizerInfo)> + '_ {
        self.entries.iter().map(|(key, info)| (*key, *info))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sizes captured when a gesture starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairSnapshot {
    pub axis: Axis,
    pub first_px: f64,
    pub second_px: f64,
    pub first_min: f64,
    pub second_min: f64,
    /// Flexible extent the percentages are relative to.
    pub total: f64,
    pub first_pct: f64,
    pub second_pct: f64,
}

impl PairSnapshot {
    /// New percentages for a pointer travel of `delta` pixels, clamped so
    /// both sides keep their minimum.
    #[must_use]
    pub fn shares_for(&self, delta: f64) -> (f64, f64) {
        let lo = self.first_min - self.first_px;
        let hi = self.second_px - self.second_min;
        let delta = if lo > hi { 0.0 } else { delta.clamp(lo, hi) };
        let first = self.first_px + delta;
        let second = self.second_px - delta;
        let combined = self.first_pct + self.second_pct;
        let first_pct = px_to_percent(first, self.total);
        let second_pct = px_to_percent(second, self.total);
        // Pin the pair's combined share against rounding.
        let drift = combined - (first_pct + second_pct);
        (first_pct, second_pct + drift)
    }
}

/// Reads and writes the two neighbours of one resizer kind.
pub trait ResizeStrategy {
    /// Current sizes, or `None` when the pair cannot be resized.
    fn snapshot(&self, tree: &LayoutTree, columns: &ColumnSet, map: &LayoutMap) -> Option<PairSnapshot>;

    /// Store new percentages for the pair.
    fn apply(&self, tree: &mut LayoutTree, columns: &mut ColumnSet, first: f64, second: f64);
}

/// Two children of one split.
#[derive(Debug, Clone, Copy)]
pub struct PaneStrategy {
    pub split: NodeId,
    pub index: usize,
}

impl PaneStrategy {
    fn pair(&self, tree: &LayoutTree) -> Option<(NodeId, NodeId)> {
        let split = tree.split(self.split)?;
        Some((
            *split.children.get(self.index)?,
            *split.children.get(self.index + 1)?,
        ))
    }
}

impl ResizeStrategy for PaneStrategy {
    fn snapshot(&self, tree: &LayoutTree, _columns: &ColumnSet, map: &LayoutMap) -> Option<PairSnapshot> {
        let (first, second) = self.pair(tree)?;
        let data = tree.split(self.split)?;
        let axis = data.orientation.axis();
        let first_pct = tree.node(first)?.flex.as_percent()?;
        let second_pct = tree.node(second)?.flex.as_percent()?;
        let bases: Vec<FlexBasis> = data
            .children
            .iter()
            .filter_map(|c| tree.node(*c).map(|n| n.flex))
            .collect();
        let total = flexible_extent(map.node(self.split)?.extent(axis), &bases);
        Some(PairSnapshot {
            axis,
            first_px: map.node(first)?.extent(axis),
            second_px: map.node(second)?.extent(axis),
            first_min: tree.min_extent(first, axis),
            second_min: tree.min_extent(second, axis),
            total,
            first_pct,
            second_pct,
        })
    }

    fn apply(&self, tree: &mut LayoutTree, _columns: &mut ColumnSet, first: f64, second: f64) {
        let Some((a, b)) = self.pair(tree) else {
            return;
        };
        for (id, share) in [(a, first), (b, second)] {
            if let Some(node) = tree.node_mut(id) {
                node.flex = FlexBasis::Percent(share);
            }
        }
    }
}

/// Two adjacent visible columns.
#[derive(Debug, Clone, Copy)]
pub struct ColumnStrategy {
    pub first: ColumnLocation,
    pub second: ColumnLocation,
}

impl ResizeStrategy for ColumnStrategy {
    fn snapshot(&self, tree: &LayoutTree, columns: &ColumnSet, map: &LayoutMap) -> Option<PairSnapshot> {
        let first_pct = columns.get(self.first).flex.as_percent()?;
        let second_pct = columns.get(self.second).flex.as_percent()?;
        let min = |column: ColumnLocation| {
            tree.root(column)
                .map_or(0.0, |root| tree.min_extent(root, Axis::X))
        };
        Some(PairSnapshot {
            axis: Axis::X,
            first_px: map.column(self.first)?.width,
            second_px: map.column(self.second)?.width,
            first_min: min(self.first),
            second_min: min(self.second),
            total: map.flexible_width(),
            first_pct,
            second_pct,
        })
    }

    fn apply(&self, _tree: &mut LayoutTree, columns: &mut ColumnSet, first: f64, second: f64) {
        columns.get_mut(self.first).flex = FlexBasis::Percent(first);
        columns.get_mut(self.second).flex = FlexBasis::Percent(second);
    }
}

fn strategy_for(key: ResizerKey) -> Box<dyn ResizeStrategy> {
    match key {
        ResizerKey::Split { split, index } => Box::new(PaneStrategy { split, index }),
        ResizerKey::Column { first, second } => Box::new(ColumnStrategy { first, second }),
    }
}

/// An in-progress resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeGesture {
    pub key: ResizerKey,
    pub origin: Point,
    pub snapshot: PairSnapshot,
}

/// Throttled icon-only strip measurement run alongside resizes.
#[derive(Debug, Clone, Copy)]
pub struct IconModeMonitor {
    throttle: Throttle,
    checks: u64,
}

impl IconModeMonitor {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            throttle: Throttle::new(interval),
            checks: 0,
        }
    }

    /// Measurements performed so far.
    #[must_use]
    pub const fn checks(&self) -> u64 {
        self.checks
    }

    /// Flag panes whose tabs do not fit their strip. Returns how many panes
    /// changed.
    fn measure(&mut self, tree: &mut LayoutTree, map: &LayoutMap, forced: bool) -> usize {
        self.checks += 1;
        let mut toggled = 0;
        for (pane, geometry) in map.panes() {
            let axis = geometry.orientation.axis();
            let needed = geometry.tabs.len() as f64 * crate::TAB_EXTENT_PX;
            let cramped = forced || needed > geometry.strip.extent(axis);
            if let Some(data) = tree.pane_mut(pane) {
                if data.icons_only != cramped {
                    data.icons_only = cramped;
                    toggled += 1;
                }
            }
        }
        toggled
    }
}

impl<H: ContentHost> LayoutSession<H> {
    /// Enumerate resizers for every adjacent pair and keep them in sync with
    /// future layout changes.
    pub fn attach_resizers(&mut self) {
        self.resizers.attached = true;
        self.refresh_resizers();
    }

    /// Drop every resizer. A gesture in progress is abandoned.
    pub fn detach_resizers(&mut self) {
        self.resizers.attached = false;
        self.resizers.entries.clear();
        self.resize = None;
    }

    #[must_use]
    pub const fn resizers(&self) -> &ResizerRegistry {
        &self.resizers
    }

    pub(crate) fn refresh_resizers(&mut self) {
        let map = self.solve_layout();
        let mut entries = BTreeMap::new();
        for split in self.tree.splits_bottom_up() {
            let Some(data) = self.tree.split(split) else {
                continue;
            };
            let axis = data.orientation.axis();
            for (index, pair) in data.children.windows(2).enumerate() {
                let enabled = pair.iter().all(|c| {
                    self.tree
                        .node(*c)
                        .is_some_and(|n| !n.collapsed && !n.flex.is_fixed())
                });
                let rect = gap_after(map.node(pair[0]), axis);
                entries.insert(ResizerKey::Split { split, index }, ResizerInfo { enabled, rect });
            }
        }
        let visible: Vec<ColumnLocation> = ColumnLocation::ALL
            .into_iter()
            .filter(|c| self.columns.get(*c).visible)
            .collect();
        for pair in visible.windows(2) {
            let (first, second) = (pair[0], pair[1]);
            let enabled = self.columns.get(first).is_active() && self.columns.get(second).is_active();
            let rect = gap_after(map.column(first), Axis::X);
            entries.insert(ResizerKey::Column { first, second }, ResizerInfo { enabled, rect });
        }
        self.resizers.entries = entries;
    }

    /// Resizer whose handle contains `point`.
    #[must_use]
    pub fn resizer_at(&self, point: Point) -> Option<ResizerKey> {
        self.resizers
            .iter()
            .find(|(_, info)| info.rect.contains(point))
            .map(|(key, _)| key)
    }

    /// Start a resize gesture at `pointer`.
    pub fn begin_resize(&mut self, key: ResizerKey, pointer: Point) -> Result<(), LayoutError> {
        if self.resize.is_some() {
            return Err(ResizeRejection::AlreadyActive.into());
        }
        let info = self.resizers.get(key).ok_or(ResizeRejection::Unknown)?;
        if !info.enabled {
            tracing::debug!(target: "panedeck.resize", ?key, "disabled resizer refused");
            return Err(ResizeRejection::Disabled.into());
        }
        let map = self.solve_layout();
        let snapshot = strategy_for(key)
            .snapshot(&self.tree, &self.columns, &map)
            .ok_or(ResizeRejection::Disabled)?;
        self.resize = Some(ResizeGesture {
            key,
            origin: pointer,
            snapshot,
        });
        self.icon_mode.throttle.reset();
        tracing::debug!(target: "panedeck.resize", ?key, total = snapshot.total, "resize started");
        Ok(())
    }

    /// Apply the pointer position. Returns the pair's new percentages, or
    /// `None` without an active gesture.
    pub fn update_resize(&mut self, pointer: Point, now: Instant) -> Option<(f64, f64)> {
        let gesture = self.resize?;
        let axis = gesture.snapshot.axis;
        let delta = pointer.along(axis) - gesture.origin.along(axis);
        let (first, second) = gesture.snapshot.shares_for(delta);
        strategy_for(gesture.key).apply(&mut self.tree, &mut self.columns, first, second);
        if self.icon_mode.throttle.ready(now) {
            let map = self.solve_layout();
            let forced = self.config.icons_only;
            self.icon_mode.measure(&mut self.tree, &map, forced);
        }
        tracing::trace!(target: "panedeck.resize", first, second, "resize frame");
        Some((first, second))
    }

    /// Finish the gesture and publish one manual-resize signal.
    pub fn end_resize(&mut self) -> bool {
        let Some(gesture) = self.resize.take() else {
            return false;
        };
        let map = self.solve_layout();
        let forced = self.config.icons_only;
        let toggled = self.icon_mode.measure(&mut self.tree, &map, forced);
        tracing::debug!(target: "panedeck.resize", key = ?gesture.key, toggled, "resize finished");
        self.notify(LayoutChangeReason::ManualResize);
        true
    }

    /// Abandon the gesture and restore the starting shares.
    pub fn cancel_resize(&mut self) -> bool {
        let Some(gesture) = self.resize.take() else {
            return false;
        };
        strategy_for(gesture.key).apply(
            &mut self.tree,
            &mut self.columns,
            gesture.snapshot.first_pct,
            gesture.snapshot.second_pct,
        );
        tracing::debug!(target: "panedeck.resize", key = ?gesture.key, "resize cancelled");
        true
    }

    #[must_use]
    pub const fn is_resizing(&self) -> bool {
        self.resize.is_some()
    }
}

fn gap_after(rect: Option<Rect>, axis: Axis) -> Rect {
    rect.map_or_else(Rect::default, |rect| rect.slice(axis, rect.extent(axis), RESIZER_PX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> PairSnapshot {
        PairSnapshot {
            axis: Axis::X,
            first_px: 400.0,
            second_px: 600.0,
            first_min: 200.0,
            second_min: 200.0,
            total: 1000.0,
            first_pct: 40.0,
            second_pct: 60.0,
        }
    }

    #[test]
    fn shares_follow_pointer() {
        let (a, b) = snapshot().shares_for(100.0);
        assert!((a - 50.0).abs() < 1e-9);
        assert!((b - 50.0).abs() < 1e-9);
    }

    #[test]
    fn shares_clamp_to_minimums() {
        let (a, b) = snapshot().shares_for(-1000.0);
        assert!((a - 20.0).abs() < 1e-9);
        assert!((b - 80.0).abs() < 1e-9);
        let (a, b) = snapshot().shares_for(1000.0);
        assert!((a - 80.0).abs() < 1e-9);
        assert!((b - 20.0).abs() < 1e-9);
    }

    #[test]
    fn shares_freeze_without_room() {
        let cramped = PairSnapshot {
            first_min: 600.0,
            second_min: 600.0,
            ..snapshot()
        };
        let (a, b) = cramped.shares_for(50.0);
        assert!((a - 40.0).abs() < 1e-9);
        assert!((b - 60.0).abs() < 1e-9);
    }
}
