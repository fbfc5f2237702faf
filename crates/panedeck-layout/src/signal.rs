#![forbid(unsafe_code)]

//! Typed `layout-changed` signal.
//!
//! # Design
//!
//! Every externally visible structural change ends with one
//! [`LayoutChanged`] carrying a [`LayoutChangeReason`]. The bus keeps an
//! outbox for hosts that poll (`drain`) and notifies `Rc` callbacks that are
//! registered weakly and kept alive by a [`Subscription`] guard.
//!
//! # Invariants
//!
//! 1. Sequence numbers increase by exactly 1 per published signal.
//! 2. A reason that is currently being dispatched cannot be entered again;
//!    the nested emission is dropped. This bounds handler cascades.
//! 3. Dead subscribers are pruned lazily on publish.
//!
//! # Failure Modes
//!
//! - **Leaked guard**: keeping a [`Subscription`] forever keeps its callback
//!   running on every signal.

use std::fmt;
use std::rc::{Rc, Weak};

/// Why the layout changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutChangeReason {
    ManualResize,
    TabSwitch,
    SnapshotApplied,
    Demotion,
    ViewportResize,
    Structure,
    Unspecified,
}

impl LayoutChangeReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManualResize => "manual-resize",
            Self::TabSwitch => "tab-switch",
            Self::SnapshotApplied => "snapshot-applied",
            Self::Demotion => "demotion",
            Self::ViewportResize => "viewport-resize",
            Self::Structure => "structure",
            Self::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for LayoutChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One published signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutChanged {
    pub sequence: u64,
    pub reason: LayoutChangeReason,
}

type CallbackRc = Rc<dyn Fn(&LayoutChanged)>;
type CallbackWeak = Weak<dyn Fn(&LayoutChanged)>;

/// Keeps a subscriber alive. Dropping it unsubscribes.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Layout signal dispatcher.
#[derive(Default)]
pub struct SignalBus {
    sequence: u64,
    outbox: Vec<LayoutChanged>,
    subscribers: Vec<CallbackWeak>,
    in_flight: Vec<LayoutChangeReason>,
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBus")
            .field("sequence", &self.sequence)
            .field("outbox", &self.outbox.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl SignalBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every future signal.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&mut self, callback: impl Fn(&LayoutChanged) + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.subscribers.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Mark `reason` as dispatching. Returns `false` when it already is.
    pub fn enter(&mut self, reason: LayoutChangeReason) -> bool {
        if self.in_flight.contains(&reason) {
            tracing::trace!(target: "panedeck.signal", %reason, "nested emission dropped");
            return false;
        }
        self.in_flight.push(reason);
        true
    }

    /// End the dispatch started by [`enter`](Self::enter).
    pub fn exit(&mut self, reason: LayoutChangeReason) {
        if let Some(pos) = self.in_flight.iter().rposition(|r| *r == reason) {
            self.in_flight.remove(pos);
        }
    }

    #[must_use]
    pub fn is_dispatching(&self, reason: LayoutChangeReason) -> bool {
        self.in_flight.contains(&reason)
    }

    /// Publish one signal to the outbox and live subscribers.
    pub fn publish(&mut self, reason: LayoutChangeReason) -> LayoutChanged {
        self.sequence += 1;
        let signal = LayoutChanged {
            sequence: self.sequence,
            reason,
        };
        self.outbox.push(signal);
        self.subscribers.retain(|weak| weak.strong_count() > 0);
        let live: Vec<CallbackRc> = self.subscribers.iter().filter_map(Weak::upgrade).collect();
        tracing::debug!(
            target: "panedeck.signal",
            sequence = signal.sequence,
            %reason,
            subscribers = live.len(),
            "layout changed"
        );
        for callback in live {
            callback(&signal);
        }
        signal
    }

    /// Take every signal published since the last drain.
    pub fn drain(&mut self) -> Vec<LayoutChanged> {
        std::mem::take(&mut self.outbox)
    }

    /// Sequence number of the last published signal (0 if none).
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Drop queued signals and in-flight markers; subscribers stay.
    pub fn reset(&mut self) {
        self.outbox.clear();
        self.in_flight.clear();
    }
}
