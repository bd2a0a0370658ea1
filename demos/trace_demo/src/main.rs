// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted playback session that exercises the tracing pipeline.
//!
//! Drives a [`Controller`] over [`MockHost`] through a session on the
//! `movies` channel, printing each transition with a
//! [`PrettyPrintSink`](cascada_debug::pretty::PrettyPrintSink) while a
//! [`RecorderSink`](cascada_debug::recorder::RecorderSink) keeps them, then
//! exports the recording as JSON.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write as _};
use std::rc::Rc;

use cascada_core::config::PlayerConfig;
use cascada_core::engine::{PlaybackEvent, Signal, SignalOutcome};
use cascada_core::query::PageQuery;
use cascada_core::resource::Generation;
use cascada_core::selection::{Controller, Startup};
use cascada_core::trace::{
    AcquireFailedEvent, AttemptEvent, DegradeEvent, DemoteEvent, ReleaseEvent, StaleSignalEvent,
    TierEnterEvent, TraceSink,
};
use cascada_debug::pretty::PrettyPrintSink;
use cascada_debug::recorder::RecorderSink;
use cascada_harness::{MockCapabilities, MockHost, mixed_catalog};

/// Forwards every event to each sink in order.
struct Fanout(Vec<Box<dyn TraceSink>>);

impl TraceSink for Fanout {
    fn on_attempt(&mut self, e: &AttemptEvent) {
        self.0.iter_mut().for_each(|sink| sink.on_attempt(e));
    }

    fn on_tier_enter(&mut self, e: &TierEnterEvent) {
        self.0.iter_mut().for_each(|sink| sink.on_tier_enter(e));
    }

    fn on_release(&mut self, e: &ReleaseEvent) {
        self.0.iter_mut().for_each(|sink| sink.on_release(e));
    }

    fn on_demote(&mut self, e: &DemoteEvent) {
        self.0.iter_mut().for_each(|sink| sink.on_demote(e));
    }

    fn on_degrade(&mut self, e: &DegradeEvent) {
        self.0.iter_mut().for_each(|sink| sink.on_degrade(e));
    }

    fn on_stale_signal(&mut self, e: &StaleSignalEvent) {
        self.0.iter_mut().for_each(|sink| sink.on_stale_signal(e));
    }

    fn on_acquire_failed(&mut self, e: &AcquireFailedEvent) {
        self.0.iter_mut().for_each(|sink| sink.on_acquire_failed(e));
    }
}

fn send(controller: &mut Controller<MockHost>, event: PlaybackEvent) -> SignalOutcome {
    let Some(generation) = controller.engine().current_generation() else {
        return SignalOutcome::Ignored;
    };
    controller.signal(Signal::new(generation, event))
}

fn rich_fatal() -> PlaybackEvent {
    PlaybackEvent::RichFatal {
        detail: "Error loading media: File could not be played".into(),
    }
}

fn main() -> io::Result<()> {
    // -- sinks -------------------------------------------------------------
    let pretty = PrettyPrintSink::with_writer(io::stdout());
    let recorder = Rc::new(RefCell::new(RecorderSink::new()));

    // -- controller --------------------------------------------------------
    let Startup::Ready(selection) =
        Startup::from_catalog(&mixed_catalog(), &PageQuery::parse("?id=movies"))
    else {
        return Err(io::Error::other("movies channel has no servers"));
    };
    let mut controller = Controller::new(
        selection,
        MockHost::new(MockCapabilities::default()),
        PlayerConfig::default(),
    );
    controller.set_trace_sink(Box::new(Fanout(vec![
        Box::new(pretty),
        Box::new(Rc::clone(&recorder)),
    ])));

    // -- session -----------------------------------------------------------
    // 1. HD (.m3u8): rich player fails, polyfill takes over, then fails too.
    controller.start();
    send(&mut controller, PlaybackEvent::RichPlaying);
    send(&mut controller, rich_fatal());
    send(&mut controller, PlaybackEvent::CanPlay);
    send(&mut controller, PlaybackEvent::AdaptiveFatal);

    // 2. A late error from the first rich player is dropped.
    controller.signal(Signal::new(Generation::from_raw(1), rich_fatal()));

    // 3. The unnamed DASH server fails over to its frame.
    controller.select_server(1);
    send(&mut controller, rich_fatal());

    // 4. The web server goes straight to the frame; tapping it again reloads.
    controller.select_server(2);
    controller.select_server(2);

    controller.teardown();

    // -- export ------------------------------------------------------------
    let path = "cascada_trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    recorder.borrow().write_json(&mut writer)?;
    writer.flush()?;

    let recorder = recorder.borrow();
    println!(
        "Wrote {path} ({} events, {} demotions, max resident {})",
        recorder.events().len(),
        recorder.demotions().len(),
        controller.host().max_resident(),
    );
    Ok(())
}
