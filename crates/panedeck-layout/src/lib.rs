#![forbid(unsafe_code)]

//! PaneDeck layout engine.
//!
//! # Role in PaneDeck
//! `panedeck-layout` organizes host content ("panels") into three columns of
//! recursively splittable panes with tab strips. It owns the pane/split tree,
//! proportional sizing, collapse cascades, drag-and-drop placement (pointer
//! and touch), pending placements for content that does not exist yet, the
//! hidden list, and the persisted snapshot shape.
//!
//! # Primary responsibilities
//! - **Tree**: create, split, simplify and validate panes and splits
//!   ([`tree`], [`collapse`]).
//! - **Sizing**: column widths and split shares that always sum to 100%
//!   ([`sizing`], [`columns`], [`layout`], [`resizer`]).
//! - **Placement**: tab registry, drag engine and touch emulation
//!   ([`registry`], [`drag`], [`touch`]).
//! - **Reconciliation**: hydrate and demote pending tabs from host mutations
//!   ([`pending`]).
//! - **Persistence**: snapshot codec, settings seam and autosave
//!   ([`snapshot`], [`settings`]).
//!
//! Everything hangs off one [`LayoutSession`]; the host is reached only
//! through [`ContentHost`].

pub mod collapse;
pub mod columns;
pub mod drag;
pub mod error;
pub mod host;
pub mod layout;
pub mod model;
pub mod pending;
pub mod registry;
pub mod resizer;
pub mod session;
pub mod settings;
pub mod signal;
pub mod sizing;
pub mod snapshot;
pub mod touch;
pub mod tree;

pub use columns::{Column, ColumnSet};
pub use drag::{
    DragContext, DragSource, DropIndicator, DropOutcome, HoverInput, ListHover, ListKind,
};
pub use error::{LayoutError, PolicyViolation, ResizeRejection};
pub use host::{ContentHost, ElementInfo, ElementRef, HostMutation, MemoryHost};
pub use layout::{LayoutMap, PaneGeometry};
pub use model::{
    ColumnLocation, ContentFlow, GhostTab, HiddenTab, NodeId, OrientationSetting, Panel, PanelId,
    SearchKey, SplitOrientation, StripOrientation, ViewSettings, ViewSettingsOverrides,
};
pub use pending::ReconcileReport;
pub use registry::TabContent;
pub use resizer::{ResizerInfo, ResizerKey};
pub use session::LayoutSession;
pub use settings::{Autosave, ConfigError, LayoutConfig, MemorySettings, PanelMapping, SettingsStore};
pub use signal::{LayoutChangeReason, LayoutChanged, Subscription};
pub use sizing::FlexBasis;
pub use snapshot::{Snapshot, SnapshotError, SnapshotOutcome};
pub use touch::FloatingGhost;
pub use tree::{LayoutTree, SplitOutcome};

/// Extent of a collapsed pane along its parent's axis.
pub const COLLAPSED_PANE_PX: f64 = 36.0;

/// Width of the gap a resizer occupies between two siblings.
pub const RESIZER_PX: f64 = 4.0;

/// Thickness of a tab strip.
pub const TAB_STRIP_PX: f64 = 32.0;

/// Extent of one labelled tab along its strip.
pub const TAB_EXTENT_PX: f64 = 120.0;

/// Extent of one icon-only tab along its strip.
pub const ICON_TAB_EXTENT_PX: f64 = 36.0;

/// Default maximum split depth per column.
pub const DEFAULT_MAX_LAYERS: usize = 3;
