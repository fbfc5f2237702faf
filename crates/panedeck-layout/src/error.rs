#![forbid(unsafe_code)]

//! Error taxonomy for layout operations.
//!
//! Only two classes surface as `Err`: policy violations (a pinned tab asked
//! to go somewhere it may not) and rejected resize gestures. Stale references
//! to tabs, panes or panels are treated as benign races and surface as
//! `false`/`None` from the operation instead.

use std::fmt;

use crate::model::{ColumnLocation, PanelId};

/// Why a pinned tab refused a placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    /// Pinned tabs never enter the hidden list.
    PinnedToHidden { panel: PanelId },
    /// Pinned tabs never become pending.
    PinnedToPending { panel: PanelId },
    /// Pinned tabs may not land in hidden or explicitly forbidden columns.
    PinnedToColumn {
        panel: PanelId,
        column: ColumnLocation,
    },
}

impl PolicyViolation {
    /// Text suitable for a blocking user acknowledgement.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::PinnedToHidden { .. } => "This tab is pinned and cannot be hidden.".to_string(),
            Self::PinnedToPending { .. } => {
                "This tab is pinned and cannot be moved to a pending list.".to_string()
            }
            Self::PinnedToColumn { column, .. } => {
                format!("This tab is pinned and cannot be moved to the {column} column.")
            }
        }
    }
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinnedToHidden { panel } => write!(f, "pinned {panel} refused hidden list"),
            Self::PinnedToPending { panel } => write!(f, "pinned {panel} refused pending list"),
            Self::PinnedToColumn { panel, column } => {
                write!(f, "pinned {panel} refused {column} column")
            }
        }
    }
}

/// Why a resize gesture could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeRejection {
    /// The resizer sits next to a collapsed sibling.
    Disabled,
    /// No resizer is attached under that key.
    Unknown,
    /// Another resize gesture is in progress.
    AlreadyActive,
}

impl fmt::Display for ResizeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "resizer is disabled"),
            Self::Unknown => write!(f, "resizer is not attached"),
            Self::AlreadyActive => write!(f, "a resize gesture is already active"),
        }
    }
}

/// Errors returned by layout operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    Policy(PolicyViolation),
    ResizeRejected(ResizeRejection),
    /// A pending placement needs a DOM-id or class search key.
    MissingIdentifier,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Policy(violation) => write!(f, "policy violation: {violation}"),
            Self::ResizeRejected(reason) => write!(f, "resize rejected: {reason}"),
            Self::MissingIdentifier => write!(f, "tab has no stable search identifier"),
        }
    }
}

impl std::error::Error for LayoutError {}

impl From<PolicyViolation> for LayoutError {
    fn from(value: PolicyViolation) -> Self {
        Self::Policy(value)
    }
}

impl From<ResizeRejection> for LayoutError {
    fn from(value: ResizeRejection) -> Self {
        Self::ResizeRejected(value)
    }
}
