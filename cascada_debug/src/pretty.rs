// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use cascada_core::host::AdaptivePath;
use cascada_core::trace::{
    AcquireFailedEvent, AttemptCause, AttemptEvent, DegradeEvent, DemoteEvent, ReleaseEvent,
    StaleSignalEvent, TierEnterEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn cause_name(cause: AttemptCause) -> &'static str {
    match cause {
        AttemptCause::Startup => "startup",
        AttemptCause::Selection => "selection",
        AttemptCause::Reload => "reload",
    }
}

fn path_name(path: AdaptivePath) -> &'static str {
    match path {
        AdaptivePath::Direct => "direct",
        AdaptivePath::Polyfill => "polyfill",
        AdaptivePath::ControlsOnly => "controls",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_attempt(&mut self, e: &AttemptEvent) {
        let _ = writeln!(
            self.writer,
            "[attempt] server={} start={} cause={} url={}",
            e.server_index,
            e.starting_tier.as_str(),
            cause_name(e.cause),
            e.url,
        );
    }

    fn on_tier_enter(&mut self, e: &TierEnterEvent) {
        let path = e.path.map(path_name).unwrap_or("-");
        let _ = writeln!(
            self.writer,
            "[enter] {} gen={} path={path} url={}",
            e.tier.as_str(),
            e.generation.get(),
            e.url,
        );
    }

    fn on_release(&mut self, e: &ReleaseEvent) {
        let _ = writeln!(
            self.writer,
            "[release] {} gen={}",
            e.tier.as_str(),
            e.generation.get(),
        );
    }

    fn on_demote(&mut self, e: &DemoteEvent) {
        let _ = writeln!(
            self.writer,
            "[demote] {} -> {}",
            e.from.as_str(),
            e.to.as_str(),
        );
    }

    fn on_degrade(&mut self, e: &DegradeEvent) {
        let _ = writeln!(self.writer, "[degrade] gen={} controls", e.generation.get());
    }

    fn on_stale_signal(&mut self, e: &StaleSignalEvent) {
        let active = e
            .active
            .map_or_else(|| "none".to_owned(), |g| g.get().to_string());
        let _ = writeln!(
            self.writer,
            "[stale] gen={} active={active}",
            e.generation.get(),
        );
    }

    fn on_acquire_failed(&mut self, e: &AcquireFailedEvent) {
        let _ = writeln!(
            self.writer,
            "[acquire-failed] {} reason={}",
            e.tier.as_str(),
            e.reason,
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
