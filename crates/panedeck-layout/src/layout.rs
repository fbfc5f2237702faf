#![forbid(unsafe_code)]

//! Geometry solver: columns, splits and panes resolved to page rectangles.
//!
//! Each row/column of siblings is laid out the same way: fixed-pixel bases
//! are placed first, resizer gaps ([`RESIZER_PX`]) are taken out, and
//! percentage bases share what remains. A pane's rectangle is further split
//! into its tab strip, one rectangle per tab, and the content area.

use std::collections::BTreeMap;

use panedeck_core::geometry::{Axis, Point, Rect, Size};

use crate::columns::ColumnSet;
use crate::model::{ColumnLocation, ContentFlow, NodeId, NodeKind, PanelId, StripOrientation};
use crate::sizing::FlexBasis;
use crate::tree::LayoutTree;
use crate::{ICON_TAB_EXTENT_PX, RESIZER_PX, TAB_EXTENT_PX, TAB_STRIP_PX};

/// Resolved geometry of one pane.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneGeometry {
    pub rect: Rect,
    pub strip: Rect,
    pub content: Rect,
    pub orientation: StripOrientation,
    /// Tab rectangles in strip order.
    pub tabs: Vec<(PanelId, Rect)>,
}

impl PaneGeometry {
    /// Strip insertion index for a pointer: the number of tabs whose
    /// midpoint lies before the pointer along the strip axis.
    #[must_use]
    pub fn insertion_index(&self, point: Point) -> usize {
        let axis = self.orientation.axis();
        let coordinate = point.along(axis);
        self.tabs
            .iter()
            .take_while(|(_, rect)| rect.midpoint(axis) < coordinate)
            .count()
    }

    /// Thin marker rectangle at strip slot `index`.
    #[must_use]
    pub fn insertion_line(&self, index: usize) -> Rect {
        let axis = self.orientation.axis();
        let offset = match self.tabs.get(index) {
            Some((_, rect)) => rect.start(axis),
            None => self
                .tabs
                .last()
                .map_or(self.strip.start(axis), |(_, rect)| rect.start(axis) + rect.extent(axis)),
        };
        self.strip.slice(axis, offset - self.strip.start(axis) - 1.0, 2.0)
    }

    /// Whether `point` is over the strip.
    #[must_use]
    pub fn strip_contains(&self, point: Point) -> bool {
        self.strip.contains(point)
    }
}

/// Solved geometry for a whole session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutMap {
    pub viewport: Rect,
    columns: [Option<Rect>; 3],
    nodes: BTreeMap<NodeId, Rect>,
    panes: BTreeMap<NodeId, PaneGeometry>,
    flexible_width: f64,
}

impl LayoutMap {
    #[must_use]
    pub const fn column(&self, column: ColumnLocation) -> Option<Rect> {
        self.columns[column.index()]
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Rect> {
        self.nodes.get(&id).copied()
    }

    #[must_use]
    pub fn pane(&self, id: NodeId) -> Option<&PaneGeometry> {
        self.panes.get(&id)
    }

    pub fn panes(&self) -> impl Iterator<Item = (NodeId, &PaneGeometry)> {
        self.panes.iter().map(|(id, geometry)| (*id, geometry))
    }

    /// Width shared by percentage-sized columns.
    #[must_use]
    pub const fn flexible_width(&self) -> f64 {
        self.flexible_width
    }

    #[must_use]
    pub fn column_at(&self, point: Point) -> Option<ColumnLocation> {
        ColumnLocation::ALL
            .into_iter()
            .find(|column| self.column(*column).is_some_and(|rect| rect.contains(point)))
    }

    /// Pane whose rectangle contains `point`.
    #[must_use]
    pub fn pane_at(&self, point: Point) -> Option<NodeId> {
        self.panes
            .iter()
            .find(|(_, geometry)| geometry.rect.contains(point))
            .map(|(id, _)| *id)
    }
}

/// Lay `bases` out along `axis` inside `rect`.
#[must_use]
pub fn lay_out_line(rect: Rect, axis: Axis, bases: &[FlexBasis]) -> Vec<Rect> {
    if bases.is_empty() {
        return Vec::new();
    }
    let flexible = flexible_extent(rect.extent(axis), bases);
    let mut offset = 0.0;
    let mut out = Vec::with_capacity(bases.len());
    for (index, basis) in bases.iter().enumerate() {
        if index > 0 {
            offset += RESIZER_PX;
        }
        let length = basis.resolve(flexible).max(0.0);
        out.push(rect.slice(axis, offset, length));
        offset += length;
    }
    out
}

/// Space shared by the percentage bases of a line of `extent` pixels.
#[must_use]
pub fn flexible_extent(extent: f64, bases: &[FlexBasis]) -> f64 {
    let gaps = RESIZER_PX * bases.len().saturating_sub(1) as f64;
    let fixed: f64 = bases.iter().filter_map(|b| b.as_pixels()).sum();
    (extent - gaps - fixed).max(0.0)
}

/// Resolve every visible column and node for `viewport`.
#[must_use]
pub fn solve(tree: &LayoutTree, columns: &ColumnSet, viewport: Size) -> LayoutMap {
    let viewport_rect = Rect::from_size(viewport);
    let visible: Vec<ColumnLocation> = ColumnLocation::ALL
        .into_iter()
        .filter(|column| columns.get(*column).visible)
        .collect();
    let bases: Vec<FlexBasis> = visible.iter().map(|c| columns.get(*c).flex).collect();
    let rects = lay_out_line(viewport_rect, Axis::X, &bases);

    let mut map = LayoutMap {
        viewport: viewport_rect,
        flexible_width: flexible_extent(viewport.width, &bases),
        ..LayoutMap::default()
    };
    for (column, rect) in visible.into_iter().zip(rects) {
        map.columns[column.index()] = Some(rect);
        if let Some(root) = tree.root(column) {
            solve_node(tree, root, rect, &mut map);
        }
    }
    map
}

fn solve_node(tree: &LayoutTree, id: NodeId, rect: Rect, map: &mut LayoutMap) {
    let Some(node) = tree.node(id) else {
        return;
    };
    map.nodes.insert(id, rect);
    match &node.kind {
        NodeKind::Split(split) => {
            let axis = split.orientation.axis();
            let bases: Vec<FlexBasis> = split
                .children
                .iter()
                .map(|c| tree.node(*c).map_or(FlexBasis::Percent(0.0), |n| n.flex))
                .collect();
            let rects = lay_out_line(rect, axis, &bases);
            for (child, child_rect) in split.children.iter().zip(rects) {
                solve_node(tree, *child, child_rect, map);
            }
        }
        NodeKind::Pane(pane) => {
            let orientation = pane.strip;
            let axis = orientation.axis();
            let (strip, content) = if node.collapsed {
                (rect, rect.slice(axis.cross(), 0.0, 0.0))
            } else {
                strip_and_content(rect, orientation, pane.view.content_flow)
            };
            let tab_extent = if pane.icons_only {
                ICON_TAB_EXTENT_PX
            } else {
                TAB_EXTENT_PX
            };
            let tabs = pane
                .tabs
                .iter()
                .enumerate()
                .map(|(index, panel)| {
                    (*panel, strip.slice(axis, index as f64 * tab_extent, tab_extent))
                })
                .collect();
            map.panes.insert(
                id,
                PaneGeometry {
                    rect,
                    strip,
                    content,
                    orientation,
                    tabs,
                },
            );
        }
    }
}

fn strip_and_content(rect: Rect, orientation: StripOrientation, flow: ContentFlow) -> (Rect, Rect) {
    // A horizontal strip is a band across the top; a vertical one runs down the side.
    let band_axis = orientation.axis().cross();
    let extent = rect.extent(band_axis);
    let thickness = TAB_STRIP_PX.min(extent);
    let rest = extent - thickness;
    match flow {
        ContentFlow::Default => (
            rect.slice(band_axis, 0.0, thickness),
            rect.slice(band_axis, thickness, rest),
        ),
        ContentFlow::Reversed => (
            rect.slice(band_axis, rest, thickness),
            rect.slice(band_axis, 0.0, rest),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_bases_come_first() {
        let rect = Rect::new(0.0, 0.0, 1000.0, 500.0);
        let bases = [
            FlexBasis::Pixels(36.0),
            FlexBasis::Percent(25.0),
            FlexBasis::Percent(75.0),
        ];
        let rects = lay_out_line(rect, Axis::X, &bases);
        let flexible = 1000.0 - 36.0 - 2.0 * RESIZER_PX;
        assert_eq!(rects[0], Rect::new(0.0, 0.0, 36.0, 500.0));
        assert!((rects[1].width - flexible * 0.25).abs() < 1e-9);
        assert!((rects[2].right() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn strip_bands_follow_flow() {
        let rect = Rect::new(0.0, 0.0, 400.0, 300.0);
        let (strip, content) =
            strip_and_content(rect, StripOrientation::Horizontal, ContentFlow::Default);
        assert_eq!(strip, Rect::new(0.0, 0.0, 400.0, TAB_STRIP_PX));
        assert_eq!(content.y, TAB_STRIP_PX);
        let (strip, _) = strip_and_content(rect, StripOrientation::Vertical, ContentFlow::Reversed);
        assert_eq!(strip, Rect::new(400.0 - TAB_STRIP_PX, 0.0, TAB_STRIP_PX, 300.0));
    }

    #[test]
    fn insertion_index_uses_midpoints() {
        let strip = Rect::new(0.0, 0.0, 400.0, TAB_STRIP_PX);
        let a = PanelId::MIN;
        let b = a.next();
        let geometry = PaneGeometry {
            rect: Rect::new(0.0, 0.0, 400.0, 300.0),
            strip,
            content: Rect::new(0.0, TAB_STRIP_PX, 400.0, 300.0 - TAB_STRIP_PX),
            orientation: StripOrientation::Horizontal,
            tabs: vec![
                (a, strip.slice(Axis::X, 0.0, TAB_EXTENT_PX)),
                (b, strip.slice(Axis::X, TAB_EXTENT_PX, TAB_EXTENT_PX)),
            ],
        };
        assert_eq!(geometry.insertion_index(Point::new(10.0, 5.0)), 0);
        assert_eq!(geometry.insertion_index(Point::new(TAB_EXTENT_PX * 0.75, 5.0)), 1);
        assert_eq!(geometry.insertion_index(Point::new(390.0, 5.0)), 2);
        assert_eq!(geometry.insertion_line(2).x, 2.0 * TAB_EXTENT_PX - 1.0);
    }
}
