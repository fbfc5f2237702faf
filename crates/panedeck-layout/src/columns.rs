#![forbid(unsafe_code)]

//! Column layout manager.
//!
//! # Design
//!
//! The three columns share the viewport width. Visible columns carry a
//! percentage basis, except a collapsed side column, which is pinned to the
//! pixel footprint of its collapsed content. The center column never takes
//! a fixed width so it can always absorb the remaining space.
//!
//! [`LayoutSession::recalculate_column_sizes`] runs after every structural
//! change:
//!
//! 1. detect side columns whose content just became (or stopped being) fully
//!    collapsed;
//! 2. on collapse, remember the proportional width and switch to the fixed
//!    collapsed footprint (stacked content keeps a proportional width);
//! 3. on expand, restore the remembered width, or a fair share floored at
//!    the column minimum when the remembered width is the bare minimum;
//! 4. give or take the difference from preferred partner columns (center
//!    for a side column, both sides for the center), proportionally;
//! 5. push any residual error above [`PERCENT_EPSILON`] into the center
//!    column, or the last active column.
//!
//! # Invariants
//!
//! 1. Visible percentage columns sum to 100 within [`PERCENT_EPSILON`].
//! 2. Recalculation without a structural change is a no-op.

use panedeck_core::geometry::Axis;

use crate::host::ContentHost;
use crate::layout::LayoutMap;
use crate::model::{ColumnLocation, NodeKind, OrientationSetting, SplitOrientation};
use crate::session::LayoutSession;
use crate::signal::LayoutChangeReason;
use crate::sizing::{FlexBasis, PERCENT_EPSILON, distribute, px_to_percent, same_size};
use crate::tree::LayoutTree;

/// State of one top-level column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub location: ColumnLocation,
    pub visible: bool,
    pub flex: FlexBasis,
    /// Proportional width to restore after collapse or hide.
    pub last_flex: Option<FlexBasis>,
    pub collapsed: bool,
}

impl Column {
    #[must_use]
    pub const fn new(location: ColumnLocation, visible: bool, flex: FlexBasis) -> Self {
        Self {
            location,
            visible,
            flex,
            last_flex: None,
            collapsed: false,
        }
    }

    /// Visible and sized proportionally.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.visible && !self.flex.is_fixed()
    }
}

/// The three columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSet {
    columns: [Column; 3],
}

impl Default for ColumnSet {
    fn default() -> Self {
        Self {
            columns: [
                Column {
                    last_flex: Some(FlexBasis::Percent(20.0)),
                    ..Column::new(ColumnLocation::Left, false, FlexBasis::Percent(20.0))
                },
                Column::new(ColumnLocation::Center, true, FlexBasis::FULL),
                Column {
                    last_flex: Some(FlexBasis::Percent(20.0)),
                    ..Column::new(ColumnLocation::Right, false, FlexBasis::Percent(20.0))
                },
            ],
        }
    }
}

impl ColumnSet {
    #[must_use]
    pub const fn get(&self, column: ColumnLocation) -> &Column {
        &self.columns[column.index()]
    }

    pub fn get_mut(&mut self, column: ColumnLocation) -> &mut Column {
        &mut self.columns[column.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Locations of active (visible, proportional) columns.
    #[must_use]
    pub fn active(&self) -> Vec<ColumnLocation> {
        self.columns
            .iter()
            .filter(|c| c.is_active())
            .map(|c| c.location)
            .collect()
    }

    /// Sum of active percentages.
    #[must_use]
    pub fn active_sum(&self) -> f64 {
        self.columns
            .iter()
            .filter(|c| c.is_active())
            .filter_map(|c| c.flex.as_percent())
            .sum()
    }

    fn percent(&self, column: ColumnLocation) -> f64 {
        self.get(column).flex.as_percent().unwrap_or(0.0)
    }

    /// Preferred donors/receivers for a change in `changed`.
    fn partners(&self, changed: ColumnLocation) -> Vec<ColumnLocation> {
        let preferred: Vec<ColumnLocation> = match changed {
            ColumnLocation::Center => vec![ColumnLocation::Left, ColumnLocation::Right],
            _ => vec![ColumnLocation::Center],
        };
        let active: Vec<ColumnLocation> = preferred
            .into_iter()
            .filter(|c| self.get(*c).is_active())
            .collect();
        if !active.is_empty() {
            return active;
        }
        self.active().into_iter().filter(|c| *c != changed).collect()
    }

    /// Give the other active columns `100 - share(changed)` in total,
    /// preferring partner columns.
    pub(crate) fn redistribute(&mut self, changed: ColumnLocation) {
        let own = if self.get(changed).is_active() {
            self.percent(changed)
        } else {
            0.0
        };
        let others: Vec<ColumnLocation> =
            self.active().into_iter().filter(|c| *c != changed).collect();
        if others.is_empty() {
            if self.get(changed).is_active() {
                self.get_mut(changed).flex = FlexBasis::FULL;
            }
            return;
        }
        let others_sum: f64 = others.iter().map(|c| self.percent(*c)).sum();
        let delta = (100.0 - own) - others_sum;
        if delta.abs() <= PERCENT_EPSILON {
            return;
        }

        let partners = self.partners(changed);
        let leftover = self.spread(&partners, delta);
        if leftover.abs() > PERCENT_EPSILON {
            let rest: Vec<ColumnLocation> = others
                .iter()
                .copied()
                .filter(|c| !partners.contains(c))
                .collect();
            let still = self.spread(&rest, leftover);
            if still.abs() > PERCENT_EPSILON {
                // Partners are exhausted; the changed column gives way.
                let value = (self.percent(changed) + still).max(0.0);
                self.get_mut(changed).flex = FlexBasis::Percent(value);
            }
        }
    }

    fn spread(&mut self, targets: &[ColumnLocation], amount: f64) -> f64 {
        if targets.is_empty() {
            return amount;
        }
        let mut shares: Vec<f64> = targets.iter().map(|c| self.percent(*c)).collect();
        let left = distribute(&mut shares, amount);
        for (column, share) in targets.iter().zip(shares) {
            self.get_mut(*column).flex = FlexBasis::Percent(share);
        }
        left
    }

    /// Absorb residual drift into center (or the last active column).
    pub(crate) fn absorb_error(&mut self) {
        let active = self.active();
        let Some(sink) = active
            .iter()
            .copied()
            .find(|c| *c == ColumnLocation::Center)
            .or_else(|| active.last().copied())
        else {
            return;
        };
        let error = 100.0 - self.active_sum();
        if error.abs() > PERCENT_EPSILON {
            let value = (self.percent(sink) + error).max(0.0);
            self.get_mut(sink).flex = FlexBasis::Percent(value);
        }
    }
}

/// Whether a column root's content prefers stacking when collapsed.
fn prefers_stacking(tree: &LayoutTree, column: ColumnLocation) -> bool {
    let Some(root) = tree.root(column).and_then(|id| tree.node(id)) else {
        return false;
    };
    match &root.kind {
        NodeKind::Pane(pane) => pane.view.collapsed_orientation == OrientationSetting::Horizontal,
        NodeKind::Split(split) => split.natural_orientation == SplitOrientation::Horizontal,
    }
}

impl<H: ContentHost> LayoutSession<H> {
    /// Re-derive column widths from their content's collapsed state and
    /// renormalize. Returns whether any width changed.
    pub fn recalculate_column_sizes(&mut self) -> bool {
        let before = self.columns;
        let map = self.solve_layout();
        let mut changed: Option<ColumnLocation> = None;

        for column in [ColumnLocation::Left, ColumnLocation::Right] {
            let state = *self.columns.get(column);
            if !state.visible {
                continue;
            }
            let Some(root) = self.tree.root(column) else {
                continue;
            };
            let fully_collapsed = self.tree.is_collapsed(root);
            if fully_collapsed && !state.collapsed {
                self.collapse_column(column, &map);
                changed = Some(column);
            } else if !fully_collapsed && state.collapsed {
                self.expand_column(column, &map);
                changed = Some(column);
            } else if fully_collapsed && state.flex.is_fixed() {
                let width = self.tree.collapsed_extent(root, Axis::X);
                self.columns.get_mut(column).flex = FlexBasis::Pixels(width);
            }
        }

        if let Some(column) = changed {
            self.columns.redistribute(column);
        }
        self.columns.absorb_error();

        let differs = before != self.columns;
        if differs {
            tracing::debug!(
                target: "panedeck.columns",
                left = %self.columns.get(ColumnLocation::Left).flex,
                center = %self.columns.get(ColumnLocation::Center).flex,
                right = %self.columns.get(ColumnLocation::Right).flex,
                "column sizes recalculated"
            );
        }
        differs
    }

    fn collapse_column(&mut self, column: ColumnLocation, map: &LayoutMap) {
        let state = *self.columns.get(column);
        let remembered = match state.flex {
            FlexBasis::Percent(value) => value,
            FlexBasis::Pixels(_) => map
                .column(column)
                .map_or(0.0, |rect| px_to_percent(rect.width, map.flexible_width())),
        };
        let width = self
            .tree
            .root(column)
            .map_or(0.0, |root| self.tree.collapsed_extent(root, Axis::X));
        let stacking = prefers_stacking(&self.tree, column);
        let entry = self.columns.get_mut(column);
        entry.last_flex = Some(FlexBasis::Percent(remembered));
        entry.collapsed = true;
        if !stacking {
            entry.flex = FlexBasis::Pixels(width);
        }
        tracing::debug!(target: "panedeck.columns", %column, remembered, stacking, "column collapsed");
    }

    fn expand_column(&mut self, column: ColumnLocation, map: &LayoutMap) {
        let min_px = self
            .tree
            .root(column)
            .map_or(0.0, |root| self.tree.min_extent(root, Axis::X));
        let min_pct = px_to_percent(min_px, map.flexible_width()).min(100.0);
        let remembered = self
            .columns
            .get(column)
            .last_flex
            .and_then(FlexBasis::as_percent);
        let pct = match remembered {
            Some(value) if !same_size(value, min_pct) && !FlexBasis::Percent(value).is_degenerate() => {
                value
            }
            _ => self.fair_share(column).max(min_pct),
        };
        let entry = self.columns.get_mut(column);
        entry.collapsed = false;
        entry.last_flex = None;
        entry.flex = FlexBasis::Percent(pct);
        tracing::debug!(target: "panedeck.columns", %column, pct, "column expanded");
    }

    /// `100%` minus the even shares of the other active columns.
    fn fair_share(&self, column: ColumnLocation) -> f64 {
        let mut count = self
            .columns
            .active()
            .into_iter()
            .filter(|c| *c != column)
            .count();
        count += 1;
        let each = 100.0 / count as f64;
        100.0 - each * (count - 1) as f64
    }

    /// Show or hide a side column and renormalize. The center column is
    /// always shown.
    pub fn apply_column_visibility(&mut self, column: ColumnLocation, visible: bool) -> bool {
        let changed = self.set_column_visible(column, visible);
        if changed {
            self.notify(LayoutChangeReason::Structure);
        }
        changed
    }

    pub(crate) fn set_column_visible(&mut self, column: ColumnLocation, visible: bool) -> bool {
        if !column.is_side() || self.columns.get(column).visible == visible {
            return false;
        }
        if visible {
            let restore = self
                .columns
                .get(column)
                .last_flex
                .and_then(FlexBasis::as_percent)
                .filter(|value| *value > PERCENT_EPSILON);
            let pct = restore.unwrap_or_else(|| self.fair_share(column));
            let entry = self.columns.get_mut(column);
            entry.visible = true;
            entry.collapsed = false;
            entry.last_flex = None;
            entry.flex = FlexBasis::Percent(pct);
            self.columns.redistribute(column);
        } else {
            let entry = self.columns.get_mut(column);
            let keep = if entry.collapsed {
                entry.last_flex
            } else {
                Some(entry.flex).filter(|f| !f.is_fixed())
            };
            entry.visible = false;
            entry.collapsed = false;
            entry.last_flex = keep;
            if let Some(basis) = keep {
                entry.flex = basis;
            }
            self.columns.redistribute(column);
        }
        self.columns.absorb_error();
        tracing::debug!(target: "panedeck.columns", %column, visible, "column visibility applied");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(left: f64, center: f64, right: f64) -> ColumnSet {
        let mut columns = ColumnSet::default();
        for (column, value) in ColumnLocation::ALL.into_iter().zip([left, center, right]) {
            let entry = columns.get_mut(column);
            entry.visible = true;
            entry.last_flex = None;
            entry.flex = FlexBasis::Percent(value);
        }
        columns
    }

    #[test]
    fn side_change_is_absorbed_by_center() {
        let mut columns = set(30.0, 60.0, 20.0);
        columns.redistribute(ColumnLocation::Left);
        assert_eq!(columns.get(ColumnLocation::Left).flex, FlexBasis::Percent(30.0));
        assert_eq!(columns.get(ColumnLocation::Right).flex, FlexBasis::Percent(20.0));
        assert!((columns.percent(ColumnLocation::Center) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn center_change_is_shared_by_sides_proportionally() {
        let mut columns = set(10.0, 70.0, 30.0);
        columns.redistribute(ColumnLocation::Center);
        assert!((columns.percent(ColumnLocation::Left) - 7.5).abs() < 1e-9);
        assert!((columns.percent(ColumnLocation::Right) - 22.5).abs() < 1e-9);
    }

    #[test]
    fn fixed_column_frees_its_share() {
        let mut columns = set(20.0, 60.0, 20.0);
        columns.get_mut(ColumnLocation::Left).flex = FlexBasis::Pixels(36.0);
        columns.redistribute(ColumnLocation::Left);
        assert!((columns.percent(ColumnLocation::Center) - 80.0).abs() < 1e-9);
        assert!((columns.active_sum() - 100.0).abs() <= PERCENT_EPSILON);
    }

    #[test]
    fn absorb_error_prefers_center_and_is_idempotent() {
        let mut columns = set(20.0, 60.0, 20.5);
        columns.absorb_error();
        assert!((columns.percent(ColumnLocation::Center) - 59.5).abs() < 1e-9);
        let once = columns;
        columns.absorb_error();
        assert_eq!(once, columns);
    }
}
