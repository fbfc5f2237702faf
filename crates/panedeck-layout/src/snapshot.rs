#![forbid(unsafe_code)]

//! Snapshot codec: the persisted shape of a whole layout.
//!
//! # Design
//!
//! [`Snapshot`] mirrors the interchange format field for field (camelCase
//! JSON, `type`-tagged nodes, flex bases as `"40%"` / `"36px"` strings).
//! [`LayoutSession::generate_snapshot`] reads the settled session and the
//! solved geometry; [`LayoutSession::apply_snapshot`] validates first and
//! then rebuilds the tree, columns, pending and hidden lists in one go.
//!
//! Node ids are not stable across sessions. Panes carry their id in the
//! snapshot so that ghost `paneId`s can be remapped; a ghost whose pane no
//! longer exists falls back to the first pane of its column.
//!
//! # Failure Modes
//!
//! - **Malformed or empty snapshot**: nothing of it is applied; the session
//!   falls back to the default layout and the outcome carries the reason.
//! - **Missing content**: tabs whose element is neither staged nor present
//!   in the host are restored without content, as before.

use std::fmt;

use panedeck_core::geometry::Axis;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::columns::ColumnSet;
use crate::host::ContentHost;
use crate::layout::LayoutMap;
use crate::model::{
    ColumnLocation, GhostTab, HiddenTab, NodeId, Panel, SearchKey, SplitOrientation, Tab,
    ViewSettings,
};
use crate::session::LayoutSession;
use crate::settings::{ACTIVE_LAYOUT_KEY, SettingsStore};
use crate::signal::LayoutChangeReason;
use crate::sizing::FlexBasis;
use crate::tree::LayoutTree;

/// Format version written by [`LayoutSession::generate_snapshot`].
pub const SNAPSHOT_VERSION: u32 = 2;

/// Oldest version still accepted.
pub const MIN_SNAPSHOT_VERSION: u32 = 2;

/// A persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub show_left: bool,
    #[serde(default)]
    pub show_right: bool,
    #[serde(default)]
    pub column_sizes: ColumnSizes,
    #[serde(default)]
    pub columns: Option<SnapshotColumns>,
    #[serde(default)]
    pub hidden_tabs: Vec<HiddenTab>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnSizes {
    pub left: FlexBasis,
    pub center: FlexBasis,
    pub right: FlexBasis,
    pub left_collapsed: bool,
    pub right_collapsed: bool,
    pub left_last_flex: Option<FlexBasis>,
    pub right_last_flex: Option<FlexBasis>,
}

impl Default for ColumnSizes {
    fn default() -> Self {
        let columns = ColumnSet::default();
        Self::from_columns(&columns)
    }
}

impl ColumnSizes {
    fn from_columns(columns: &ColumnSet) -> Self {
        let left = columns.get(ColumnLocation::Left);
        let right = columns.get(ColumnLocation::Right);
        Self {
            left: left.flex,
            center: columns.get(ColumnLocation::Center).flex,
            right: right.flex,
            left_collapsed: left.collapsed,
            right_collapsed: right.collapsed,
            left_last_flex: left.last_flex,
            right_last_flex: right.last_flex,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotColumns {
    pub left: ColumnSnapshot,
    pub center: ColumnSnapshot,
    pub right: ColumnSnapshot,
}

impl SnapshotColumns {
    #[must_use]
    pub const fn get(&self, column: ColumnLocation) -> &ColumnSnapshot {
        match column {
            ColumnLocation::Left => &self.left,
            ColumnLocation::Center => &self.center,
            ColumnLocation::Right => &self.right,
        }
    }

    fn get_mut(&mut self, column: ColumnLocation) -> &mut ColumnSnapshot {
        match column {
            ColumnLocation::Left => &mut self.left,
            ColumnLocation::Center => &mut self.center,
            ColumnLocation::Right => &mut self.right,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnSnapshot {
    pub flex: FlexBasis,
    pub content: Option<NodeSnapshot>,
    pub ghost_tabs: Vec<GhostTab>,
}

/// A pane or split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeSnapshot {
    Pane(PaneSnapshot),
    Split(SplitSnapshot),
}

impl NodeSnapshot {
    /// Whether this subtree holds at least one tab.
    #[must_use]
    pub fn has_tabs(&self) -> bool {
        match self {
            Self::Pane(pane) => !pane.tabs.is_empty(),
            Self::Split(split) => split.children.iter().any(Self::has_tabs),
        }
    }

    /// Number of tabs in this subtree.
    #[must_use]
    pub fn tab_count(&self) -> usize {
        match self {
            Self::Pane(pane) => pane.tabs.len(),
            Self::Split(split) => split.children.iter().map(Self::tab_count).sum(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaneSnapshot {
    /// Pane id at generation time; referenced by ghost `paneId`s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub flex: FlexBasis,
    pub last_flex: Option<FlexBasis>,
    pub min_width: f64,
    pub min_height: f64,
    pub actual_width: f64,
    pub actual_height: f64,
    pub view_settings: ViewSettings,
    pub tabs: Vec<TabData>,
    pub is_collapsed: bool,
    pub column_location: Option<ColumnLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitSnapshot {
    #[serde(default)]
    pub flex: FlexBasis,
    #[serde(default)]
    pub last_flex: Option<FlexBasis>,
    pub orientation: SplitOrientation,
    #[serde(default)]
    pub natural_orientation: Option<SplitOrientation>,
    #[serde(default)]
    pub children: Vec<NodeSnapshot>,
    #[serde(default)]
    pub split_ratios: Vec<f64>,
    #[serde(default)]
    pub actual_width: f64,
    #[serde(default)]
    pub actual_height: f64,
    #[serde(default)]
    pub is_collapsed: bool,
    #[serde(default)]
    pub column_location: Option<ColumnLocation>,
}

/// One tab with its panel metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabData {
    pub panel_id: String,
    pub source_id: String,
    pub title: String,
    pub icon: Option<String>,
    pub collapsed: bool,
    pub active: bool,
    pub order: usize,
    pub is_default: bool,
    pub custom_content: Option<String>,
    pub custom_data: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pinned: bool,
}

/// Why a snapshot was not applied.
#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    UnsupportedVersion { found: u32 },
    MissingColumns,
    NoTabs,
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "snapshot is not valid JSON: {err}"),
            Self::UnsupportedVersion { found } => write!(
                f,
                "snapshot version {found} unsupported (accepted {MIN_SNAPSHOT_VERSION}..={SNAPSHOT_VERSION})"
            ),
            Self::MissingColumns => f.write_str("snapshot has no columns"),
            Self::NoTabs => f.write_str("snapshot holds no tabs"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// What `apply_snapshot` did.
#[derive(Debug)]
pub enum SnapshotOutcome {
    /// The snapshot was applied; `tabs` tabs were restored.
    Applied { tabs: usize },
    /// The snapshot was rejected and the default layout installed instead.
    FellBack(SnapshotError),
}

impl SnapshotOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Check that `snapshot` can be applied without leaving an empty workspace.
pub fn validate(snapshot: &Snapshot) -> Result<(), SnapshotError> {
    if !(MIN_SNAPSHOT_VERSION..=SNAPSHOT_VERSION).contains(&snapshot.version) {
        return Err(SnapshotError::UnsupportedVersion {
            found: snapshot.version,
        });
    }
    let columns = snapshot.columns.as_ref().ok_or(SnapshotError::MissingColumns)?;
    let has_tabs = ColumnLocation::ALL.iter().any(|column| {
        columns
            .get(*column)
            .content
            .as_ref()
            .is_some_and(NodeSnapshot::has_tabs)
    });
    if has_tabs { Ok(()) } else { Err(SnapshotError::NoTabs) }
}

impl<H: ContentHost> LayoutSession<H> {
    /// Capture the current layout.
    #[must_use]
    pub fn generate_snapshot(&self) -> Snapshot {
        let map = self.solve_layout();
        let mut columns = SnapshotColumns::default();
        for column in ColumnLocation::ALL {
            let slot = columns.get_mut(column);
            slot.flex = self.columns.get(column).flex;
            slot.content = self
                .tree
                .root(column)
                .and_then(|root| self.node_snapshot(root, &map));
            slot.ghost_tabs = self.ghosts[column.index()].clone();
        }
        Snapshot {
            version: SNAPSHOT_VERSION,
            show_left: self.columns.get(ColumnLocation::Left).visible,
            show_right: self.columns.get(ColumnLocation::Right).visible,
            column_sizes: ColumnSizes::from_columns(&self.columns),
            columns: Some(columns),
            hidden_tabs: self.hidden.clone(),
        }
    }

    fn node_snapshot(&self, id: NodeId, map: &LayoutMap) -> Option<NodeSnapshot> {
        let node = self.tree.node(id)?;
        let actual = map.node(id).unwrap_or_default();
        if let Some(pane) = node.as_pane() {
            let tabs = pane
                .tabs
                .iter()
                .filter_map(|panel| self.panels.get(panel))
                .enumerate()
                .map(|(order, panel)| TabData {
                    panel_id: panel.id.to_string(),
                    source_id: panel.source_id.clone(),
                    title: panel.tab.title.clone(),
                    icon: panel.tab.icon.clone(),
                    collapsed: panel.tab.collapsed,
                    active: panel.tab.active,
                    order,
                    is_default: panel.is_default,
                    custom_content: panel.custom_content.clone(),
                    custom_data: panel.custom_data.clone(),
                    pinned: panel.tab.pinned,
                })
                .collect();
            return Some(NodeSnapshot::Pane(PaneSnapshot {
                id: Some(id.to_string()),
                flex: node.flex,
                last_flex: node.last_flex,
                min_width: self.tree.min_extent(id, Axis::X),
                min_height: self.tree.min_extent(id, Axis::Y),
                actual_width: actual.width,
                actual_height: actual.height,
                view_settings: pane.view.clone(),
                tabs,
                is_collapsed: node.collapsed,
                column_location: Some(node.column),
            }));
        }
        let split = node.as_split()?;
        let children = split
            .children
            .iter()
            .filter_map(|child| self.node_snapshot(*child, map))
            .collect();
        let split_ratios = split
            .children
            .iter()
            .filter_map(|child| self.tree.node(*child))
            .map(|child| child.flex.as_percent().or(child.last_flex.and_then(FlexBasis::as_percent)).unwrap_or(0.0))
            .collect();
        Some(NodeSnapshot::Split(SplitSnapshot {
            flex: node.flex,
            last_flex: node.last_flex,
            orientation: split.orientation,
            natural_orientation: Some(split.natural_orientation),
            children,
            split_ratios,
            actual_width: actual.width,
            actual_height: actual.height,
            is_collapsed: node.collapsed,
            column_location: Some(node.column),
        }))
    }

    /// Replace the whole layout with `snapshot`. An invalid snapshot is not
    /// applied at all; the default layout is installed instead.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> SnapshotOutcome {
        if let Err(err) = validate(snapshot) {
            return self.fall_back(err);
        }
        self.cancel_drag();
        self.touch_cancel();
        self.resize = None;
        self.park_all_panels();

        self.tree = LayoutTree::new();
        self.columns = ColumnSet::default();
        let sizes = &snapshot.column_sizes;
        for (column, visible, flex, collapsed, last_flex) in [
            (
                ColumnLocation::Left,
                snapshot.show_left,
                sizes.left,
                sizes.left_collapsed,
                sizes.left_last_flex,
            ),
            (ColumnLocation::Center, true, sizes.center, false, None),
            (
                ColumnLocation::Right,
                snapshot.show_right,
                sizes.right,
                sizes.right_collapsed,
                sizes.right_last_flex,
            ),
        ] {
            let slot = self.columns.get_mut(column);
            slot.visible = visible;
            slot.flex = flex;
            slot.collapsed = collapsed;
            slot.last_flex = last_flex.or(slot.last_flex);
        }

        let mut pane_ids = FxHashMap::default();
        let mut tabs = 0;
        let columns = snapshot.columns.clone().unwrap_or_default();
        for column in ColumnLocation::ALL {
            let root = match &columns.get(column).content {
                Some(content) => self.restore_node(content, column, &mut pane_ids, &mut tabs),
                None => self.tree.insert_pane(column, ViewSettings::default()),
            };
            if let Some(node) = self.tree.node_mut(root) {
                node.parent = None;
            }
            self.tree.set_root(column, Some(root));
        }

        self.ghosts = [Vec::new(), Vec::new(), Vec::new()];
        for column in ColumnLocation::ALL {
            for ghost in &columns.get(column).ghost_tabs {
                let Some(identifier) = ghost.identifier() else {
                    continue;
                };
                self.remove_ghosts_for(&identifier);
                let mut ghost = ghost.clone();
                ghost.column = Some(column);
                ghost.pane_id = ghost
                    .pane_id
                    .as_ref()
                    .and_then(|old| pane_ids.get(old))
                    .map(ToString::to_string);
                self.ghosts[column.index()].push(ghost);
            }
        }

        self.hidden.clear();
        for entry in &snapshot.hidden_tabs {
            if !self.hidden.iter().any(|h| h.source_id == entry.source_id) {
                self.hidden.push(entry.clone());
            }
        }

        if self.initialized {
            self.hydrate_all();
        }
        tracing::debug!(target: "panedeck.snapshot", tabs, version = snapshot.version, "snapshot applied");
        self.notify(LayoutChangeReason::SnapshotApplied);
        SnapshotOutcome::Applied { tabs }
    }

    /// Parse and apply a JSON snapshot.
    pub fn apply_snapshot_json(&mut self, json: &str) -> SnapshotOutcome {
        match serde_json::from_str::<Snapshot>(json) {
            Ok(snapshot) => self.apply_snapshot(&snapshot),
            Err(err) => self.fall_back(err.into()),
        }
    }

    /// Apply the layout persisted under the active-layout key, if any.
    pub fn apply_stored_layout(&mut self, store: &dyn SettingsStore) -> Option<SnapshotOutcome> {
        let value = store.get(ACTIVE_LAYOUT_KEY).filter(|value| !value.is_null())?;
        Some(match serde_json::from_value::<Snapshot>(value) {
            Ok(snapshot) => self.apply_snapshot(&snapshot),
            Err(err) => self.fall_back(err.into()),
        })
    }

    fn fall_back(&mut self, err: SnapshotError) -> SnapshotOutcome {
        tracing::warn!(target: "panedeck.snapshot", error = %err, "snapshot rejected, using default layout");
        self.reset_columns();
        SnapshotOutcome::FellBack(err)
    }

    fn restore_node(
        &mut self,
        snapshot: &NodeSnapshot,
        column: ColumnLocation,
        pane_ids: &mut FxHashMap<String, NodeId>,
        tabs: &mut usize,
    ) -> NodeId {
        match snapshot {
            NodeSnapshot::Pane(pane) => {
                let id = self.tree.insert_pane(column, pane.view_settings.clone());
                if let Some(node) = self.tree.node_mut(id) {
                    node.flex = pane.flex;
                    node.last_flex = pane.last_flex;
                    node.collapsed = pane.is_collapsed;
                }
                if let Some(data) = self.tree.pane_mut(id) {
                    data.icons_only = self.config.icons_only;
                }
                if let Some(old) = &pane.id {
                    pane_ids.insert(old.clone(), id);
                }
                let mut ordered: Vec<&TabData> = pane.tabs.iter().collect();
                ordered.sort_by_key(|tab| tab.order);
                for tab in ordered {
                    self.restore_tab(id, tab);
                    *tabs += 1;
                }
                self.ensure_single_active(id);
                id
            }
            NodeSnapshot::Split(split) => {
                let children: Vec<NodeId> = split
                    .children
                    .iter()
                    .map(|child| self.restore_node(child, column, pane_ids, tabs))
                    .collect();
                match children.as_slice() {
                    [] => self.tree.insert_pane(column, ViewSettings::default()),
                    [only] => {
                        if let Some(node) = self.tree.node_mut(*only) {
                            node.flex = split.flex;
                            node.last_flex = split.last_flex;
                        }
                        *only
                    }
                    _ => {
                        self.apply_split_ratios(&children, &split.split_ratios);
                        let id = self.tree.insert_split(column, split.orientation, children);
                        if let Some(node) = self.tree.node_mut(id) {
                            node.flex = split.flex;
                            node.last_flex = split.last_flex;
                            node.collapsed = split.is_collapsed;
                        }
                        if let Some(data) = self.tree.split_mut(id) {
                            data.natural_orientation =
                                split.natural_orientation.unwrap_or(split.orientation);
                        }
                        id
                    }
                }
            }
        }
    }

    /// Fill in child bases that are missing from the snapshot (defaulted to
    /// 100% or degenerate) from the split's recorded ratios.
    fn apply_split_ratios(&mut self, children: &[NodeId], ratios: &[f64]) {
        if ratios.len() != children.len() {
            return;
        }
        for (child, ratio) in children.iter().zip(ratios) {
            if *ratio <= 0.0 || !ratio.is_finite() {
                continue;
            }
            let Some(node) = self.tree.node_mut(*child) else {
                continue;
            };
            let recorded = FlexBasis::Percent(*ratio);
            if node.collapsed {
                if node.last_flex.is_none() {
                    node.last_flex = Some(recorded);
                }
            } else if node.flex == FlexBasis::FULL || node.flex.is_degenerate() {
                node.flex = recorded;
            }
        }
    }

    fn restore_tab(&mut self, pane: NodeId, tab: &TabData) {
        let element = match self.staging.remove(&tab.source_id) {
            Some(element) => Some(element),
            None => SearchKey::parse(&tab.source_id).and_then(|key| self.find_hydratable(&key)),
        };
        let pinned = tab.pinned
            || self
                .config
                .mapping(&tab.source_id)
                .is_some_and(|mapping| mapping.pinned);
        let id = self.allocate_panel_id();
        self.panels.insert(
            id,
            Panel {
                id,
                pane,
                tab: Tab {
                    title: tab.title.clone(),
                    icon: tab.icon.clone(),
                    active: tab.active,
                    collapsed: tab.collapsed,
                    pinned,
                },
                source_id: tab.source_id.clone(),
                content: element,
                is_default: tab.is_default,
                custom_content: tab.custom_content.clone(),
                custom_data: tab.custom_data.clone(),
            },
        );
        if let Some(data) = self.tree.pane_mut(pane) {
            data.tabs.push(id);
        }
    }

    /// Keep the first tab flagged active, or pick one if none is.
    fn ensure_single_active(&mut self, pane: NodeId) {
        let Some(tabs) = self.tree.pane(pane).map(|data| data.tabs.clone()) else {
            return;
        };
        let mut seen = false;
        for id in &tabs {
            if let Some(panel) = self.panels.get_mut(id) {
                if panel.tab.active && seen {
                    panel.tab.active = false;
                }
                seen |= panel.tab.active;
            }
        }
        if !seen && !tabs.is_empty() {
            self.set_active_in_pane_quiet(pane, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::registry::TabContent;
    use crate::settings::LayoutConfig;

    fn session() -> LayoutSession {
        LayoutSession::new(MemoryHost::new(), LayoutConfig::default())
    }

    #[test]
    fn flex_bases_serialize_as_strings() {
        let mut session = session();
        let pane = session.tree().first_pane(ColumnLocation::Center).unwrap();
        session
            .create_tab_from_content(TabContent::new("#a"), pane, None)
            .unwrap();
        let json = serde_json::to_value(session.generate_snapshot()).unwrap();
        assert_eq!(json["columnSizes"]["center"], "100%");
        assert_eq!(json["columns"]["center"]["content"]["type"], "pane");
        assert_eq!(json["columns"]["center"]["content"]["tabs"][0]["sourceId"], "#a");
    }

    #[test]
    fn validation_rejects_empty_and_old() {
        let mut snapshot = session().generate_snapshot();
        assert!(matches!(validate(&snapshot), Err(SnapshotError::NoTabs)));
        snapshot.version = 1;
        assert!(matches!(
            validate(&snapshot),
            Err(SnapshotError::UnsupportedVersion { found: 1 })
        ));
        snapshot.version = SNAPSHOT_VERSION;
        snapshot.columns = None;
        assert!(matches!(validate(&snapshot), Err(SnapshotError::MissingColumns)));
    }

    #[test]
    fn malformed_json_falls_back_to_default() {
        let mut session = session();
        let pane = session.tree().first_pane(ColumnLocation::Center).unwrap();
        session
            .create_tab_from_content(TabContent::new("#a"), pane, None)
            .unwrap();
        let outcome = session.apply_snapshot_json("{\"version\": 2, \"columns\": ");
        assert!(matches!(outcome, SnapshotOutcome::FellBack(SnapshotError::Json(_))));
        assert_eq!(session.panels().count(), 0);
        assert!(session.tree().validate().is_empty());
    }

    #[test]
    fn hidden_tabs_accept_bare_strings() {
        let json = r##"{
            "version": 2,
            "columns": {"center": {"flex": "100%", "content": {"type": "pane", "tabs": [
                {"sourceId": "#a", "title": "A", "active": true}
            ]}}},
            "hiddenTabs": ["#x", {"sourceId": "#y", "collapsed": true}, "#x"]
        }"##;
        let mut session = session();
        assert!(session.apply_snapshot_json(json).is_applied());
        let hidden: Vec<&str> = session
            .hidden_tabs()
            .iter()
            .map(|h| h.source_id.as_str())
            .collect();
        assert_eq!(hidden, vec!["#x", "#y"]);
        assert!(session.hidden_tabs()[1].collapsed);
    }

    #[test]
    fn ghost_pane_ids_are_remapped() {
        let mut session = session();
        let pane = session.tree().first_pane(ColumnLocation::Center).unwrap();
        session
            .create_tab_from_content(TabContent::new("#a"), pane, None)
            .unwrap();
        let mut snapshot = session.generate_snapshot();
        let columns = snapshot.columns.as_mut().unwrap();
        let mut ghost = GhostTab::for_key(&SearchKey::DomId("later".into()), ColumnLocation::Center);
        ghost.pane_id = Some(pane.to_string());
        columns.center.ghost_tabs.push(ghost);
        let mut orphan = GhostTab::for_key(&SearchKey::DomId("orphan".into()), ColumnLocation::Center);
        orphan.pane_id = Some("node-999".into());
        columns.center.ghost_tabs.push(orphan);

        let mut fresh = LayoutSession::new(MemoryHost::new(), LayoutConfig::default());
        assert!(fresh.apply_snapshot(&snapshot).is_applied());
        let new_pane = fresh.tree().first_pane(ColumnLocation::Center).unwrap();
        let ghosts = fresh.ghost_tabs(ColumnLocation::Center);
        assert_eq!(ghosts[0].pane(), Some(new_pane));
        assert_eq!(ghosts[1].pane_id, None);
    }

    #[test]
    fn split_ratios_fill_missing_child_bases() {
        let json = r##"{
            "version": 2,
            "columns": {"center": {"flex": "100%", "content": {
                "type": "split",
                "orientation": "vertical",
                "splitRatios": [30.0, 70.0],
                "children": [
                    {"type": "pane", "tabs": [{"sourceId": "#a", "active": true}]},
                    {"type": "pane", "tabs": [{"sourceId": "#b", "active": true}]}
                ]
            }}}
        }"##;
        let mut session = session();
        assert!(session.apply_snapshot_json(json).is_applied());
        let root = session.tree().root(ColumnLocation::Center).unwrap();
        let children = session.tree().split(root).unwrap().children.clone();
        let shares: Vec<f64> = children
            .iter()
            .map(|c| session.tree().node(*c).unwrap().flex.as_percent().unwrap())
            .collect();
        assert!((shares[0] - 30.0).abs() < 0.01, "{shares:?}");
        assert!((shares[1] - 70.0).abs() < 0.01, "{shares:?}");
    }

    #[test]
    fn explicit_child_bases_win_over_split_ratios() {
        let mut session = session();
        let pane = session.tree().first_pane(ColumnLocation::Center).unwrap();
        session
            .create_tab_from_content(TabContent::new("#a").active(true), pane, None)
            .unwrap();
        let b = session
            .create_tab_from_content(TabContent::new("#b"), pane, None)
            .unwrap();
        session.split_with_panel(pane, b, true, false).unwrap();
        let mut snapshot = session.generate_snapshot();
        let Some(NodeSnapshot::Split(split)) = snapshot
            .columns
            .as_mut()
            .and_then(|columns| columns.center.content.as_mut())
        else {
            panic!("center should be a split");
        };
        split.split_ratios = vec![10.0, 90.0];

        let mut fresh = LayoutSession::new(MemoryHost::new(), LayoutConfig::default());
        assert!(fresh.apply_snapshot(&snapshot).is_applied());
        let root = fresh.tree().root(ColumnLocation::Center).unwrap();
        let first = fresh.tree().split(root).unwrap().children[0];
        let share = fresh.tree().node(first).unwrap().flex.as_percent().unwrap();
        assert!((share - 50.0).abs() < 0.01);
    }
}
