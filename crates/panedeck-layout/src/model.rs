#![forbid(unsafe_code)]

//! Layout data model: node/panel identifiers, pane and split records, tabs,
//! panels, and the ghost/hidden placeholders.
//!
//! # Design
//!
//! The pane/split tree is stored as a flat arena of [`Node`] records keyed by
//! [`NodeId`]. Ownership flows downward through `SplitData::children`; the
//! `parent` field is a lookup-only back-reference. Tabs are not separate
//! records: each [`Panel`] carries its [`Tab`] half, and a pane lists the
//! panels it shows in display order.

use std::fmt;
use std::str::FromStr;

use panedeck_core::geometry::Axis;
use serde::{Deserialize, Serialize};

use crate::host::ElementRef;
use crate::sizing::FlexBasis;

/// Default minimum pane extent in pixels.
pub const DEFAULT_MINIMAL_PANEL_SIZE: f64 = 200.0;

/// Stable identifier for pane and split nodes. `0` is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub const MIN: Self = Self(1);

    /// Create a node id, rejecting 0.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("node-").unwrap_or(s);
        raw.parse::<u64>().ok().and_then(Self::new).ok_or(())
    }
}

/// Identifier shared by one tab and its panel. `0` is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(u64);

impl PanelId {
    pub const MIN: Self = Self(1);

    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel-{}", self.0)
    }
}

/// One of the three top-level columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnLocation {
    Left,
    Center,
    Right,
}

impl ColumnLocation {
    /// Columns in visual order.
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }

    #[must_use]
    pub const fn is_side(self) -> bool {
        !matches!(self, Self::Center)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for ColumnLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnLocation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(()),
        }
    }
}

/// Arrangement of a split's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitOrientation {
    /// Side by side.
    Vertical,
    /// Stacked.
    Horizontal,
}

impl SplitOrientation {
    /// Axis along which children are laid out.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Vertical => Axis::X,
            Self::Horizontal => Axis::Y,
        }
    }

    #[must_use]
    pub const fn from_vertical(vertical: bool) -> Self {
        if vertical { Self::Vertical } else { Self::Horizontal }
    }
}

/// Orientation preference in view settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationSetting {
    #[default]
    Auto,
    Horizontal,
    Vertical,
}

/// Placement of the tab strip relative to the content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFlow {
    /// Strip at the top (horizontal) or left (vertical).
    #[default]
    Default,
    /// Strip at the bottom (horizontal) or right (vertical).
    Reversed,
}

/// Effective layout of a pane's tab strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripOrientation {
    /// Tabs run left to right across the pane.
    #[default]
    Horizontal,
    /// Tabs run top to bottom down the pane.
    Vertical,
}

impl StripOrientation {
    /// Axis along which tabs are laid out.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Horizontal => Axis::X,
            Self::Vertical => Axis::Y,
        }
    }

    #[must_use]
    pub const fn from_split(orientation: SplitOrientation) -> Self {
        match orientation {
            SplitOrientation::Vertical => Self::Vertical,
            SplitOrientation::Horizontal => Self::Horizontal,
        }
    }
}

/// Per-pane view settings, persisted as a small JSON blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewSettings {
    pub minimal_panel_size: f64,
    pub default_orientation: OrientationSetting,
    pub collapsed_orientation: OrientationSetting,
    pub content_flow: ContentFlow,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            minimal_panel_size: DEFAULT_MINIMAL_PANEL_SIZE,
            default_orientation: OrientationSetting::Auto,
            collapsed_orientation: OrientationSetting::Auto,
            content_flow: ContentFlow::Default,
        }
    }
}

impl ViewSettings {
    /// Parse a persisted blob, filling absent keys from defaults. Malformed
    /// blobs and non-positive minimum sizes yield the defaults.
    #[must_use]
    pub fn from_json(blob: &str) -> Self {
        match serde_json::from_str::<Self>(blob) {
            Ok(settings) if settings.minimal_panel_size > 0.0 => settings,
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Apply non-`None` overrides on top of these settings.
    #[must_use]
    pub fn merged(&self, overrides: &ViewSettingsOverrides) -> Self {
        Self {
            minimal_panel_size: overrides
                .minimal_panel_size
                .filter(|size| *size > 0.0)
                .unwrap_or(self.minimal_panel_size),
            default_orientation: overrides
                .default_orientation
                .unwrap_or(self.default_orientation),
            collapsed_orientation: overrides
                .collapsed_orientation
                .unwrap_or(self.collapsed_orientation),
            content_flow: overrides.content_flow.unwrap_or(self.content_flow),
        }
    }
}

/// Partial view settings used when creating panes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewSettingsOverrides {
    pub minimal_panel_size: Option<f64>,
    pub default_orientation: Option<OrientationSetting>,
    pub collapsed_orientation: Option<OrientationSetting>,
    pub content_flow: Option<ContentFlow>,
}

/// Leaf payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneData {
    pub view: ViewSettings,
    /// Panels in strip display order.
    pub tabs: Vec<PanelId>,
    pub strip: StripOrientation,
    pub icons_only: bool,
    /// Orientation has not been derived yet (batch construction).
    pub orientation_deferred: bool,
}

/// Internal payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitData {
    /// Effective orientation (forced while container-collapsed).
    pub orientation: SplitOrientation,
    /// Author/user intent, restored when the split expands again.
    pub natural_orientation: SplitOrientation,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Pane(PaneData),
    Split(SplitData),
}

/// One record in the layout arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Lookup-only back-reference; `None` for a column root.
    pub parent: Option<NodeId>,
    pub column: ColumnLocation,
    pub flex: FlexBasis,
    /// Last expanded basis, kept while collapsed.
    pub last_flex: Option<FlexBasis>,
    pub collapsed: bool,
    pub kind: NodeKind,
}

impl Node {
    #[must_use]
    pub const fn is_pane(&self) -> bool {
        matches!(self.kind, NodeKind::Pane(_))
    }

    #[must_use]
    pub const fn as_pane(&self) -> Option<&PaneData> {
        match &self.kind {
            NodeKind::Pane(pane) => Some(pane),
            NodeKind::Split(_) => None,
        }
    }

    pub fn as_pane_mut(&mut self) -> Option<&mut PaneData> {
        match &mut self.kind {
            NodeKind::Pane(pane) => Some(pane),
            NodeKind::Split(_) => None,
        }
    }

    #[must_use]
    pub const fn as_split(&self) -> Option<&SplitData> {
        match &self.kind {
            NodeKind::Split(split) => Some(split),
            NodeKind::Pane(_) => None,
        }
    }

    pub fn as_split_mut(&mut self) -> Option<&mut SplitData> {
        match &mut self.kind {
            NodeKind::Split(split) => Some(split),
            NodeKind::Pane(_) => None,
        }
    }
}

/// Presentation half of an open document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tab {
    pub title: String,
    pub icon: Option<String>,
    pub active: bool,
    pub collapsed: bool,
    /// Pinned tabs never leave the live columns.
    pub pinned: bool,
}

/// Content half of an open document, carrying its tab.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub id: PanelId,
    /// Owning pane.
    pub pane: NodeId,
    pub tab: Tab,
    /// Stable identifier for persistence and ghost matching, usually a
    /// rendered search key such as `#terminal`.
    pub source_id: String,
    pub content: Option<ElementRef>,
    pub is_default: bool,
    pub custom_content: Option<String>,
    pub custom_data: Option<serde_json::Value>,
}

/// How a pending placement finds its element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SearchKey {
    DomId(String),
    Class(String),
}

impl SearchKey {
    /// Parse `#id` or `.class`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(id) = raw.strip_prefix('#').filter(|id| !id.is_empty()) {
            Some(Self::DomId(id.to_string()))
        } else {
            raw.strip_prefix('.')
                .filter(|class| !class.is_empty())
                .map(|class| Self::Class(class.to_string()))
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::DomId(name) | Self::Class(name) => name,
        }
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomId(id) => write!(f, "#{id}"),
            Self::Class(class) => write!(f, ".{class}"),
        }
    }
}

/// A recorded placement for content that is not attached yet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostTab {
    #[serde(default)]
    pub search_id: Option<String>,
    #[serde(default)]
    pub search_class: Option<String>,
    #[serde(default)]
    pub pane_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnLocation>,
    /// Strip index to hydrate at.
    #[serde(skip)]
    pub pane_index: Option<usize>,
    #[serde(skip)]
    pub title: Option<String>,
    #[serde(skip)]
    pub icon: Option<String>,
    #[serde(skip)]
    pub active: bool,
    #[serde(skip)]
    pub collapsed: bool,
}

impl GhostTab {
    /// Ghost for a search key in a column.
    #[must_use]
    pub fn for_key(key: &SearchKey, column: ColumnLocation) -> Self {
        let mut ghost = Self {
            column: Some(column),
            ..Self::default()
        };
        match key {
            SearchKey::DomId(id) => ghost.search_id = Some(id.clone()),
            SearchKey::Class(class) => ghost.search_class = Some(class.clone()),
        }
        ghost
    }

    /// DOM id first, then class; `None` when neither is usable.
    #[must_use]
    pub fn key(&self) -> Option<SearchKey> {
        if let Some(id) = self.search_id.as_deref().filter(|id| !id.is_empty()) {
            return Some(SearchKey::DomId(id.to_string()));
        }
        self.search_class
            .as_deref()
            .filter(|class| !class.is_empty())
            .map(|class| SearchKey::Class(class.to_string()))
    }

    /// Rendered stable identifier.
    #[must_use]
    pub fn identifier(&self) -> Option<String> {
        self.key().map(|key| key.to_string())
    }

    #[must_use]
    pub fn pane(&self) -> Option<NodeId> {
        self.pane_id.as_deref().and_then(|raw| raw.parse().ok())
    }
}

/// A tab parked outside every column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HiddenTabRepr", rename_all = "camelCase")]
pub struct HiddenTab {
    pub source_id: String,
    pub active: bool,
    pub collapsed: bool,
}

impl HiddenTab {
    #[must_use]
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            active: false,
            collapsed: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HiddenTabRepr {
    Bare(String),
    #[serde(rename_all = "camelCase")]
    Full {
        source_id: String,
        #[serde(default)]
        active: bool,
        #[serde(default)]
        collapsed: bool,
    },
}

impl From<HiddenTabRepr> for HiddenTab {
    fn from(value: HiddenTabRepr) -> Self {
        match value {
            HiddenTabRepr::Bare(source_id) => Self::new(source_id),
            HiddenTabRepr::Full {
                source_id,
                active,
                collapsed,
            } => Self {
                source_id,
                active,
                collapsed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_reject_zero_and_format() {
        assert!(NodeId::new(0).is_none());
        let node = NodeId::new(7).expect("non-zero");
        assert_eq!(node.to_string(), "node-7");
        assert_eq!("node-7".parse::<NodeId>(), Ok(node));
        assert_eq!("7".parse::<NodeId>(), Ok(node));
        assert!("node-0".parse::<NodeId>().is_err());
        assert_eq!(PanelId::MIN.next().to_string(), "panel-2");
    }

    #[test]
    fn search_key_round_trips_through_text() {
        let key = SearchKey::parse("#terminal").expect("id key");
        assert_eq!(key, SearchKey::DomId("terminal".into()));
        assert_eq!(key.to_string(), "#terminal");
        assert_eq!(
            SearchKey::parse(".chat-log"),
            Some(SearchKey::Class("chat-log".into()))
        );
        assert_eq!(SearchKey::parse("settings"), None);
        assert_eq!(SearchKey::parse("#"), None);
    }

    #[test]
    fn ghost_prefers_dom_id() {
        let ghost = GhostTab {
            search_id: Some("a".into()),
            search_class: Some("b".into()),
            ..GhostTab::default()
        };
        assert_eq!(ghost.identifier().as_deref(), Some("#a"));
        let class_only = GhostTab {
            search_id: Some(String::new()),
            search_class: Some("b".into()),
            ..GhostTab::default()
        };
        assert_eq!(class_only.identifier().as_deref(), Some(".b"));
        assert_eq!(GhostTab::default().key(), None);
    }

    #[test]
    fn hidden_tab_accepts_both_shapes() {
        let parsed: Vec<HiddenTab> =
            serde_json::from_str(r##"["#a", {"sourceId": "#b", "active": true}]"##)
                .expect("hidden list");
        assert_eq!(parsed[0], HiddenTab::new("#a"));
        assert!(parsed[1].active);
        assert!(!parsed[1].collapsed);
        let json = serde_json::to_string(&parsed[1]).expect("serialize");
        assert_eq!(json, r##"{"sourceId":"#b","active":true,"collapsed":false}"##);
    }

    #[test]
    fn view_settings_blob_merges_defaults() {
        let settings = ViewSettings::from_json(r#"{"contentFlow":"reversed"}"#);
        assert_eq!(settings.content_flow, ContentFlow::Reversed);
        assert_eq!(settings.minimal_panel_size, DEFAULT_MINIMAL_PANEL_SIZE);
        assert_eq!(ViewSettings::from_json("{not json"), ViewSettings::default());
        assert_eq!(
            ViewSettings::from_json(r#"{"minimalPanelSize":0}"#),
            ViewSettings::default()
        );
        let merged = settings.merged(&ViewSettingsOverrides {
            minimal_panel_size: Some(120.0),
            ..ViewSettingsOverrides::default()
        });
        assert_eq!(merged.minimal_panel_size, 120.0);
        assert_eq!(merged.content_flow, ContentFlow::Reversed);
    }
}
