// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition tracing for the fallback engine.
//!
//! The engine reports each step of an attempt to a [`TraceSink`]. All methods
//! default to no-ops, so a sink implements only the events it cares about.
//! [`Tracer`] wraps an optional boxed sink; with no sink installed each call
//! is a single `Option` branch.
//!
//! This is independent of `tracing` logging: logs are for humans, sinks are
//! for code that needs the exact transition sequence (tests, recorders).

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::host::AdaptivePath;
use crate::resolve::Tier;
use crate::resource::Generation;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Why a fresh attempt started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptCause {
    /// First attempt after startup.
    Startup,
    /// The viewer picked a different server.
    Selection,
    /// The viewer picked the server that was already active.
    Reload,
}

/// Emitted when a fresh attempt starts for a server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttemptEvent {
    /// Index of the server in the channel's list.
    pub server_index: usize,
    /// Server URL.
    pub url: String,
    /// Tier the resolver chose to start at.
    pub starting_tier: Tier,
    /// What triggered the attempt.
    pub cause: AttemptCause,
}

/// Emitted after a tier's resources became resident.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TierEnterEvent {
    /// Tier entered.
    pub tier: Tier,
    /// Acquisition token.
    pub generation: Generation,
    /// URL the tier targets.
    pub url: String,
    /// How the `<video>` surface is driven (native tier only).
    pub path: Option<AdaptivePath>,
}

/// Emitted after a resident resource was handed back to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ReleaseEvent {
    /// Tier released.
    pub tier: Tier,
    /// Token of the released resource.
    pub generation: Generation,
}

/// Emitted when a tier failed and the engine moves down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DemoteEvent {
    /// Tier that failed.
    pub from: Tier,
    /// Tier about to be acquired.
    pub to: Tier,
}

/// Emitted when the native tier falls back to transport controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DegradeEvent {
    /// Token of the degraded surface.
    pub generation: Generation,
}

/// Emitted when a callback arrives for a resource that is no longer active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StaleSignalEvent {
    /// Token the callback carried.
    pub generation: Generation,
    /// Token of the active resource, if any.
    pub active: Option<Generation>,
}

/// Emitted when a host could not acquire a tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AcquireFailedEvent {
    /// Tier that failed to acquire.
    pub tier: Tier,
    /// Host error, rendered.
    pub reason: String,
}

// ---------------------------------------------------------------------------
// TraceSink
// ---------------------------------------------------------------------------

/// Receiver for engine transition events.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// A fresh attempt started.
    fn on_attempt(&mut self, e: &AttemptEvent) {
        let _ = e;
    }

    /// A tier became resident.
    fn on_tier_enter(&mut self, e: &TierEnterEvent) {
        let _ = e;
    }

    /// A resource was released.
    fn on_release(&mut self, e: &ReleaseEvent) {
        let _ = e;
    }

    /// The engine is moving to a lower tier.
    fn on_demote(&mut self, e: &DemoteEvent) {
        let _ = e;
    }

    /// The native tier fell back to transport controls.
    fn on_degrade(&mut self, e: &DegradeEvent) {
        let _ = e;
    }

    /// A stale callback was dropped.
    fn on_stale_signal(&mut self, e: &StaleSignalEvent) {
        let _ = e;
    }

    /// A host acquisition failed.
    fn on_acquire_failed(&mut self, e: &AcquireFailedEvent) {
        let _ = e;
    }
}

/// A sink that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Shared sinks let the caller keep a handle for inspection.
impl<T: TraceSink + ?Sized> TraceSink for Rc<RefCell<T>> {
    fn on_attempt(&mut self, e: &AttemptEvent) {
        self.borrow_mut().on_attempt(e);
    }

    fn on_tier_enter(&mut self, e: &TierEnterEvent) {
        self.borrow_mut().on_tier_enter(e);
    }

    fn on_release(&mut self, e: &ReleaseEvent) {
        self.borrow_mut().on_release(e);
    }

    fn on_demote(&mut self, e: &DemoteEvent) {
        self.borrow_mut().on_demote(e);
    }

    fn on_degrade(&mut self, e: &DegradeEvent) {
        self.borrow_mut().on_degrade(e);
    }

    fn on_stale_signal(&mut self, e: &StaleSignalEvent) {
        self.borrow_mut().on_stale_signal(e);
    }

    fn on_acquire_failed(&mut self, e: &AcquireFailedEvent) {
        self.borrow_mut().on_acquire_failed(e);
    }
}

// ---------------------------------------------------------------------------
// Tracer
// ---------------------------------------------------------------------------

/// Optional sink owned by the engine.
#[derive(Default)]
pub struct Tracer {
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("active", &self.sink.is_some())
            .finish()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to `sink`.
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that drops every event.
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    /// Returns `true` if a sink is installed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.sink.is_some()
    }

    /// Dispatches [`TraceSink::on_attempt`].
    pub fn attempt(&mut self, e: &AttemptEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.on_attempt(e);
        }
    }

    /// Dispatches [`TraceSink::on_tier_enter`].
    pub fn tier_enter(&mut self, e: &TierEnterEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.on_tier_enter(e);
        }
    }

    /// Dispatches [`TraceSink::on_release`].
    pub fn release(&mut self, e: &ReleaseEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.on_release(e);
        }
    }

    /// Dispatches [`TraceSink::on_demote`].
    pub fn demote(&mut self, e: &DemoteEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.on_demote(e);
        }
    }

    /// Dispatches [`TraceSink::on_degrade`].
    pub fn degrade(&mut self, e: &DegradeEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.on_degrade(e);
        }
    }

    /// Dispatches [`TraceSink::on_stale_signal`].
    pub fn stale_signal(&mut self, e: &StaleSignalEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.on_stale_signal(e);
        }
    }

    /// Dispatches [`TraceSink::on_acquire_failed`].
    pub fn acquire_failed(&mut self, e: &AcquireFailedEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.on_acquire_failed(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_release(&ReleaseEvent {
            tier: Tier::Rich,
            generation: Generation::ZERO,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.demote(&DemoteEvent {
            from: Tier::Rich,
            to: Tier::OpaqueFrame,
        });
    }

    #[test]
    fn tracer_dispatches_through_shared_sink() {
        #[derive(Default)]
        struct CountingSink {
            demotions: u32,
        }

        impl TraceSink for CountingSink {
            fn on_demote(&mut self, _e: &DemoteEvent) {
                self.demotions += 1;
            }
        }

        let shared = Rc::new(RefCell::new(CountingSink::default()));
        let mut tracer = Tracer::new(Box::new(Rc::clone(&shared)));
        tracer.demote(&DemoteEvent {
            from: Tier::Rich,
            to: Tier::NativeAdaptive,
        });
        tracer.release(&ReleaseEvent {
            tier: Tier::Rich,
            generation: Generation::ZERO,
        });

        assert_eq!(shared.borrow().demotions, 1);
    }
}
