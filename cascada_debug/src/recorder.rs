// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-order event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event as a
//! [`RecordedEvent`]. Recordings serialize to a JSON array with one object
//! per event, tagged by `kind`.

use std::io;

use serde::Serialize;

use cascada_core::resolve::Tier;
use cascada_core::resource::Generation;
use cascada_core::trace::{
    AcquireFailedEvent, AttemptEvent, DegradeEvent, DemoteEvent, ReleaseEvent, StaleSignalEvent,
    TierEnterEvent, TraceSink,
};

/// One recorded engine event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordedEvent {
    /// An [`AttemptEvent`].
    Attempt(AttemptEvent),
    /// A [`TierEnterEvent`].
    TierEnter(TierEnterEvent),
    /// A [`ReleaseEvent`].
    Release(ReleaseEvent),
    /// A [`DemoteEvent`].
    Demote(DemoteEvent),
    /// A [`DegradeEvent`].
    Degrade(DegradeEvent),
    /// A [`StaleSignalEvent`].
    StaleSignal(StaleSignalEvent),
    /// An [`AcquireFailedEvent`].
    AcquireFailed(AcquireFailedEvent),
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events in the order they were reported.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Tiers that became resident, in order.
    #[must_use]
    pub fn tiers_entered(&self) -> Vec<Tier> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::TierEnter(e) => Some(e.tier),
                _ => None,
            })
            .collect()
    }

    /// `(from, to)` pairs of every demotion, in order.
    #[must_use]
    pub fn demotions(&self) -> Vec<(Tier, Tier)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::Demote(e) => Some((e.from, e.to)),
                _ => None,
            })
            .collect()
    }

    /// Generations of every dropped callback.
    #[must_use]
    pub fn stale_generations(&self) -> Vec<Generation> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::StaleSignal(e) => Some(e.generation),
                _ => None,
            })
            .collect()
    }

    /// Serializes the recording as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events)
    }

    /// Writes the recording as pretty-printed JSON.
    pub fn write_json(&self, writer: &mut dyn io::Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &self.events)?;
        writeln!(writer)
    }
}

impl TraceSink for RecorderSink {
    fn on_attempt(&mut self, e: &AttemptEvent) {
        self.events.push(RecordedEvent::Attempt(e.clone()));
    }

    fn on_tier_enter(&mut self, e: &TierEnterEvent) {
        self.events.push(RecordedEvent::TierEnter(e.clone()));
    }

    fn on_release(&mut self, e: &ReleaseEvent) {
        self.events.push(RecordedEvent::Release(*e));
    }

    fn on_demote(&mut self, e: &DemoteEvent) {
        self.events.push(RecordedEvent::Demote(*e));
    }

    fn on_degrade(&mut self, e: &DegradeEvent) {
        self.events.push(RecordedEvent::Degrade(*e));
    }

    fn on_stale_signal(&mut self, e: &StaleSignalEvent) {
        self.events.push(RecordedEvent::StaleSignal(*e));
    }

    fn on_acquire_failed(&mut self, e: &AcquireFailedEvent) {
        self.events.push(RecordedEvent::AcquireFailed(e.clone()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use cascada_core::host::AdaptivePath;
    use cascada_core::trace::AttemptCause;

    fn demote_rich_to_native(rec: &mut RecorderSink) {
        rec.on_demote(&DemoteEvent {
            from: Tier::Rich,
            to: Tier::NativeAdaptive,
        });
        rec.on_tier_enter(&TierEnterEvent {
            tier: Tier::NativeAdaptive,
            generation: Generation::from_raw(2),
            url: "http://x/stream.m3u8".into(),
            path: Some(AdaptivePath::Polyfill),
        });
    }

    #[test]
    fn keeps_order_and_filters_by_kind() {
        let mut rec = RecorderSink::new();
        rec.on_tier_enter(&TierEnterEvent {
            tier: Tier::Rich,
            generation: Generation::from_raw(1),
            url: "http://x/stream.m3u8".into(),
            path: None,
        });
        demote_rich_to_native(&mut rec);

        assert_eq!(rec.events().len(), 3);
        assert_eq!(rec.tiers_entered(), [Tier::Rich, Tier::NativeAdaptive]);
        assert_eq!(rec.demotions(), [(Tier::Rich, Tier::NativeAdaptive)]);
        assert!(rec.stale_generations().is_empty());
    }

    #[test]
    fn json_is_tagged_by_kind() {
        let mut rec = RecorderSink::new();
        rec.on_attempt(&AttemptEvent {
            server_index: 1,
            url: "http://y/embed".into(),
            starting_tier: Tier::OpaqueFrame,
            cause: AttemptCause::Selection,
        });
        rec.on_stale_signal(&StaleSignalEvent {
            generation: Generation::from_raw(3),
            active: None,
        });

        let value: serde_json::Value = serde_json::from_str(&rec.to_json().unwrap()).unwrap();
        assert_eq!(value[0]["kind"], "attempt");
        assert_eq!(value[0]["starting_tier"], "OPAQUE_FRAME");
        assert_eq!(value[0]["cause"], "selection");
        assert_eq!(value[1]["kind"], "stale_signal");
        assert_eq!(value[1]["generation"], 3);
        assert!(value[1]["active"].is_null());
    }

    #[test]
    fn write_json_ends_with_newline() {
        let mut rec = RecorderSink::new();
        demote_rich_to_native(&mut rec);
        let mut out = Vec::new();
        rec.write_json(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("]\n"));
        assert!(text.contains("\"polyfill\""));
    }

    #[test]
    fn clear_forgets_events() {
        let mut rec = RecorderSink::new();
        demote_rich_to_native(&mut rec);
        rec.clear();
        assert!(rec.events().is_empty());
    }
}
