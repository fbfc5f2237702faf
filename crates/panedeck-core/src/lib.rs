#![forbid(unsafe_code)]

//! Core: geometry, normalized input, and timing primitives.
//!
//! # Role in PaneDeck
//! `panedeck-core` is the host-agnostic base layer. It carries no knowledge of
//! panes or tabs; it only defines the measurement and input vocabulary that
//! `panedeck-layout` and host adapters share.
//!
//! # Primary responsibilities
//! - **Geometry**: floating-point `Rect`/`Point`/`Size` in page pixels.
//! - **Input**: modifier snapshots and touch events.
//! - **Timing**: `Debouncer` and `Throttle` driven by an explicit clock.

pub mod event;
pub mod geometry;
pub mod timing;

pub use event::{Modifiers, TouchEvent, TouchPhase};
pub use geometry::{Axis, Point, Rect, Size};
pub use timing::{Debouncer, Throttle};
pub use web_time::{Duration, Instant};
