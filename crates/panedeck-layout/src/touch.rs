#![forbid(unsafe_code)]

//! Touch emulation of tab dragging.
//!
//! A touch that starts on a tab's drag handle opens a synthetic drag through
//! the same engine as pointer drags. Moves feed [`HoverInput`]s at the
//! finger position; lifting the finger commits at the last indicator.
//!
//! # Invariants
//!
//! 1. At most one touch drag is active; a second `touch_start` (any finger)
//!    is refused until the first ends or is cancelled.
//! 2. Only events from the finger that started the gesture are honored.
//! 3. The floating ghost exists exactly while the gesture is active.

use panedeck_core::event::TouchEvent;
use panedeck_core::geometry::{Point, Size};

use crate::drag::{DragSource, DropIndicator, DropOutcome, HoverInput, ListHover};
use crate::error::LayoutError;
use crate::host::ContentHost;
use crate::model::PanelId;
use crate::session::LayoutSession;

/// Visual copy of the dragged tab that follows the finger.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingGhost {
    /// Top-left corner, centered under the finger.
    pub position: Point,
    pub size: Size,
    pub title: String,
}

impl FloatingGhost {
    fn centered_at(&mut self, point: Point) {
        self.position = Point::new(
            point.x - self.size.width / 2.0,
            point.y - self.size.height / 2.0,
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TouchGesture {
    touch_id: u32,
    ghost: FloatingGhost,
}

/// Touch gesture state owned by the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchDragEmulator {
    active: Option<TouchGesture>,
}

impl TouchDragEmulator {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl<H: ContentHost> LayoutSession<H> {
    /// Begin a touch drag of `panel`. `on_handle` tells whether the touch
    /// landed on the tab's drag handle; touches elsewhere never start one.
    pub fn touch_start(&mut self, event: TouchEvent, on_handle: bool, panel: PanelId) -> bool {
        if !on_handle {
            return false;
        }
        if self.touch.active.is_some() || self.drag.is_some() {
            tracing::debug!(target: "panedeck.touch", touch = event.touch_id, "touch drag already active");
            return false;
        }
        let map = self.solve_layout();
        let Some(record) = self.panels.get(&panel) else {
            tracing::debug!(target: "panedeck.touch", panel = %panel, "touch panel missing");
            return false;
        };
        let size = map
            .pane(record.pane)
            .and_then(|geometry| geometry.tabs.iter().find(|(id, _)| *id == panel))
            .map_or(Size::new(crate::TAB_EXTENT_PX, crate::TAB_STRIP_PX), |(_, rect)| {
                rect.size()
            });
        let mut ghost = FloatingGhost {
            position: event.position,
            size,
            title: record.tab.title.clone(),
        };
        ghost.centered_at(event.position);
        if !self.begin_drag(DragSource::Live(panel)) {
            return false;
        }
        tracing::debug!(target: "panedeck.touch", touch = event.touch_id, panel = %panel, "touch drag started");
        self.touch.active = Some(TouchGesture {
            touch_id: event.touch_id,
            ghost,
        });
        true
    }

    /// Follow the finger. `list` is set when the host's hit test found a
    /// pending or hidden list under the finger.
    pub fn touch_move(&mut self, event: TouchEvent, list: Option<ListHover>) -> Option<DropIndicator> {
        let gesture = self.touch.active.as_mut()?;
        if gesture.touch_id != event.touch_id {
            return None;
        }
        gesture.ghost.centered_at(event.position);
        let mut input = HoverInput::at(event.position);
        input.list = list;
        self.hover(&input)
    }

    /// Lift the finger: commit at the last indicator and tear down the
    /// ghost. `None` when no matching touch drag was active.
    pub fn touch_end(&mut self, event: TouchEvent) -> Option<Result<DropOutcome, LayoutError>> {
        if self.touch.active.as_ref()?.touch_id != event.touch_id {
            return None;
        }
        self.touch.active = None;
        let outcome = self.commit_drop();
        tracing::debug!(target: "panedeck.touch", touch = event.touch_id, ok = outcome.is_ok(), "touch drag ended");
        Some(outcome)
    }

    /// Abort the touch drag without committing anything.
    pub fn touch_cancel(&mut self) -> bool {
        if self.touch.active.take().is_none() {
            return false;
        }
        self.cancel_drag();
        tracing::debug!(target: "panedeck.touch", "touch drag cancelled");
        true
    }

    #[must_use]
    pub fn floating_ghost(&self) -> Option<&FloatingGhost> {
        self.touch.active.as_ref().map(|gesture| &gesture.ghost)
    }
}

#[cfg(test)]
mod tests {
    use panedeck_core::event::TouchPhase;

    use super::*;
    use crate::host::MemoryHost;
    use crate::model::ColumnLocation;
    use crate::registry::TabContent;
    use crate::settings::LayoutConfig;

    fn session_with_two_tabs() -> (LayoutSession, PanelId, PanelId) {
        let mut session = LayoutSession::new(MemoryHost::new(), LayoutConfig::default());
        let pane = session.tree().first_pane(ColumnLocation::Center).unwrap();
        let a = session
            .create_tab_from_content(TabContent::new("#a").active(true), pane, None)
            .unwrap();
        let b = session
            .create_tab_from_content(TabContent::new("#b"), pane, None)
            .unwrap();
        (session, a, b)
    }

    #[test]
    fn start_requires_handle_and_guards_reentry() {
        let (mut session, a, b) = session_with_two_tabs();
        let start = TouchEvent::new(TouchPhase::Start, 1, Point::new(10.0, 10.0));
        assert!(!session.touch_start(start, false, a));
        assert!(session.touch_start(start, true, a));
        assert!(session.floating_ghost().is_some());
        let second = TouchEvent::new(TouchPhase::Start, 2, Point::new(50.0, 10.0));
        assert!(!session.touch_start(second, true, b));
        assert!(session.touch_cancel());
        assert!(session.floating_ghost().is_none());
        assert!(!session.is_dragging());
    }

    #[test]
    fn foreign_finger_is_ignored() {
        let (mut session, a, _) = session_with_two_tabs();
        let start = TouchEvent::new(TouchPhase::Start, 7, Point::new(10.0, 10.0));
        assert!(session.touch_start(start, true, a));
        let other = TouchEvent::new(TouchPhase::Move, 8, Point::new(600.0, 400.0));
        assert!(session.touch_move(other, None).is_none());
        let end = TouchEvent::new(TouchPhase::End, 8, Point::new(600.0, 400.0));
        assert!(session.touch_end(end).is_none());
        assert!(session.floating_ghost().is_some());
    }

    #[test]
    fn ghost_follows_finger() {
        let (mut session, a, _) = session_with_two_tabs();
        let start = TouchEvent::new(TouchPhase::Start, 1, Point::new(10.0, 10.0));
        assert!(session.touch_start(start, true, a));
        let moved = TouchEvent::new(TouchPhase::Move, 1, Point::new(640.0, 400.0));
        session.touch_move(moved, None);
        let ghost = session.floating_ghost().unwrap();
        assert!((ghost.position.x + ghost.size.width / 2.0 - 640.0).abs() < 1e-9);
        assert_eq!(ghost.title, "#a");
    }
}
