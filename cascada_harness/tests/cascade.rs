// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tier demotion driven end to end through the controller.

use std::cell::RefCell;
use std::rc::Rc;

use cascada_core::catalog::Catalog;
use cascada_core::config::PlayerConfig;
use cascada_core::engine::{EngineState, PlaybackEvent, Signal, SignalOutcome};
use cascada_core::host::AdaptivePath;
use cascada_core::query::PageQuery;
use cascada_core::resolve::Tier;
use cascada_core::resource::Generation;
use cascada_core::selection::{Controller, Startup};
use cascada_debug::recorder::{RecordedEvent, RecorderSink};
use cascada_harness::{HostCall, MockCapabilities, MockHost, mixed_catalog, news_catalog};

fn controller(
    catalog: &Catalog,
    query: &str,
    capabilities: MockCapabilities,
) -> (Controller<MockHost>, Rc<RefCell<RecorderSink>>) {
    let Startup::Ready(selection) = Startup::from_catalog(catalog, &PageQuery::parse(query))
    else {
        panic!("expected a playable channel for {query}");
    };
    let recorder = Rc::new(RefCell::new(RecorderSink::new()));
    let mut controller = Controller::new(
        selection,
        MockHost::new(capabilities),
        PlayerConfig::default(),
    );
    controller.set_trace_sink(Box::new(Rc::clone(&recorder)));
    (controller, recorder)
}

fn current(controller: &Controller<MockHost>) -> Generation {
    controller.engine().current_generation().unwrap()
}

fn rich_fatal(controller: &mut Controller<MockHost>) -> SignalOutcome {
    let generation = current(controller);
    controller.signal(Signal::new(
        generation,
        PlaybackEvent::RichFatal {
            detail: "Error loading media: File could not be played".into(),
        },
    ))
}

#[test]
fn segmented_source_starts_rich_then_falls_back_to_polyfill() {
    let (mut controller, recorder) =
        controller(&news_catalog(), "?id=news", MockCapabilities::default());
    controller.start();

    assert_eq!(controller.state(), EngineState::Rich);
    assert_eq!(
        controller.host().calls(),
        [HostCall::AcquireRich {
            generation: Generation::from_raw(1),
            title: "news".into(),
            files: vec!["http://x/stream.m3u8".into()],
            clear_key: false,
        }]
    );

    assert_eq!(rich_fatal(&mut controller), SignalOutcome::Applied);

    assert_eq!(
        controller.state(),
        EngineState::NativeAdaptive { degraded: false }
    );
    assert_eq!(
        controller.host().calls()[1..],
        [
            HostCall::ReleaseRich(Generation::from_raw(1)),
            HostCall::AcquireVideo(Generation::from_raw(2)),
            HostCall::AttachPolyfill {
                url: "http://x/stream.m3u8".into(),
                low_latency: true,
                enable_worker: true,
            },
        ]
    );
    assert_eq!(
        controller.host().resident(),
        Some((Tier::NativeAdaptive, Generation::from_raw(2)))
    );
    assert_eq!(controller.host().max_resident(), 1);

    let recorder = recorder.borrow();
    assert_eq!(recorder.tiers_entered(), [Tier::Rich, Tier::NativeAdaptive]);
    assert_eq!(recorder.demotions(), [(Tier::Rich, Tier::NativeAdaptive)]);
}

#[test]
fn canplay_on_polyfill_path_starts_playback() {
    let (mut controller, _) = controller(&news_catalog(), "", MockCapabilities::default());
    controller.start();
    rich_fatal(&mut controller);

    let generation = current(&controller);
    let outcome = controller.signal(Signal::new(generation, PlaybackEvent::CanPlay));

    assert_eq!(outcome, SignalOutcome::Applied);
    assert_eq!(controller.host().calls().last(), Some(&HostCall::Play));
}

#[test]
fn native_hls_plays_directly() {
    let capabilities = MockCapabilities {
        native_segmented: true,
        ..MockCapabilities::default()
    };
    let (mut controller, recorder) = controller(&news_catalog(), "", capabilities);
    controller.start();
    rich_fatal(&mut controller);

    assert_eq!(
        controller.host().calls().last(),
        Some(&HostCall::LoadDirect("http://x/stream.m3u8".into()))
    );
    assert_eq!(
        controller.host().count_calls(|c| matches!(c, HostCall::AttachPolyfill { .. })),
        0
    );

    let recorder = recorder.borrow();
    let Some(RecordedEvent::TierEnter(enter)) = recorder.events().last() else {
        panic!("expected the native tier to be entered last");
    };
    assert_eq!(enter.path, Some(AdaptivePath::Direct));
}

#[test]
fn adaptive_fatal_exposes_controls_once() {
    let (mut controller, recorder) = controller(&news_catalog(), "", MockCapabilities::default());
    controller.start();
    rich_fatal(&mut controller);

    let generation = current(&controller);
    let fatal = Signal::new(generation, PlaybackEvent::AdaptiveFatal);
    assert_eq!(controller.signal(fatal.clone()), SignalOutcome::Applied);
    assert_eq!(controller.signal(fatal), SignalOutcome::Ignored);

    assert_eq!(
        controller.state(),
        EngineState::NativeAdaptive { degraded: true }
    );
    assert!(controller.host().controls_visible());
    assert_eq!(
        controller.host().count_calls(|c| *c == HostCall::ShowControls),
        1
    );
    // The surface stays; there is no tier below it for a segmented source.
    assert_eq!(controller.host().resident_count(), 1);
    assert!(
        recorder
            .borrow()
            .events()
            .iter()
            .any(|e| matches!(e, RecordedEvent::Degrade(_)))
    );
}

#[test]
fn without_polyfill_or_native_support_controls_are_shown() {
    let capabilities = MockCapabilities {
        polyfill: false,
        ..MockCapabilities::default()
    };
    let (mut controller, _) = controller(&news_catalog(), "", capabilities);
    controller.start();
    rich_fatal(&mut controller);

    assert_eq!(
        controller.state(),
        EngineState::NativeAdaptive { degraded: true }
    );
    assert_eq!(
        controller.host().calls().last(),
        Some(&HostCall::ShowControls)
    );
}

#[test]
fn polyfill_setup_failure_degrades_to_controls() {
    let capabilities = MockCapabilities {
        polyfill_throws: true,
        ..MockCapabilities::default()
    };
    let (mut controller, recorder) = controller(&news_catalog(), "", capabilities);
    controller.start();
    rich_fatal(&mut controller);

    assert_eq!(
        controller.state(),
        EngineState::NativeAdaptive { degraded: true }
    );
    assert!(controller.host().controls_visible());
    assert!(recorder.borrow().events().iter().any(|e| matches!(
        e,
        RecordedEvent::AcquireFailed(failed) if failed.tier == Tier::NativeAdaptive
    )));
}

#[test]
fn missing_rich_player_demotes_like_a_fatal_error() {
    let capabilities = MockCapabilities {
        rich_player: false,
        native_segmented: true,
        ..MockCapabilities::default()
    };
    let (mut controller, recorder) = controller(&news_catalog(), "", capabilities);
    controller.start();

    assert_eq!(
        controller.state(),
        EngineState::NativeAdaptive { degraded: false }
    );
    assert_eq!(
        controller.host().calls(),
        [
            HostCall::AcquireVideo(Generation::from_raw(2)),
            HostCall::LoadDirect("http://x/stream.m3u8".into()),
        ]
    );

    let recorder = recorder.borrow();
    assert!(matches!(
        recorder.events()[1],
        RecordedEvent::AcquireFailed(ref failed) if failed.tier == Tier::Rich
    ));
    assert_eq!(recorder.demotions(), [(Tier::Rich, Tier::NativeAdaptive)]);
}

#[test]
fn manifest_source_falls_back_to_frame_on_server_url() {
    let (mut controller, recorder) =
        controller(&mixed_catalog(), "?id=sports", MockCapabilities::default());
    controller.start();

    assert_eq!(
        controller.host().calls(),
        [HostCall::AcquireRich {
            generation: Generation::from_raw(1),
            title: "sports".into(),
            files: vec!["http://s/live.mpd".into()],
            clear_key: true,
        }]
    );

    rich_fatal(&mut controller);

    assert_eq!(controller.state(), EngineState::OpaqueFrame);
    assert_eq!(
        controller.host().calls()[1..],
        [
            HostCall::ReleaseRich(Generation::from_raw(1)),
            HostCall::AcquireFrame {
                generation: Generation::from_raw(2),
                url: "http://s/live.mpd".into(),
            },
        ]
    );
    assert_eq!(
        recorder.borrow().demotions(),
        [(Tier::Rich, Tier::OpaqueFrame)]
    );
}

#[test]
fn missing_rich_player_sends_manifest_to_frame() {
    let capabilities = MockCapabilities {
        rich_player: false,
        ..MockCapabilities::default()
    };
    let (mut controller, _) = controller(&mixed_catalog(), "?id=movies&s=2", capabilities);
    controller.start();

    assert_eq!(controller.state(), EngineState::OpaqueFrame);
    assert_eq!(
        controller.host().resident(),
        Some((Tier::OpaqueFrame, Generation::from_raw(2)))
    );
}

#[test]
fn video_failure_falls_through_to_frame() {
    let capabilities = MockCapabilities {
        video_fails: true,
        ..MockCapabilities::default()
    };
    let (mut controller, recorder) = controller(&news_catalog(), "", capabilities);
    controller.start();
    rich_fatal(&mut controller);

    assert_eq!(controller.state(), EngineState::OpaqueFrame);
    assert_eq!(
        controller.host().calls().last(),
        Some(&HostCall::AcquireFrame {
            generation: Generation::from_raw(3),
            url: "http://x/stream.m3u8".into(),
        })
    );
    assert_eq!(
        recorder.borrow().demotions(),
        [
            (Tier::Rich, Tier::NativeAdaptive),
            (Tier::NativeAdaptive, Tier::OpaqueFrame)
        ]
    );
}

#[test]
fn frame_failure_leaves_the_container_empty() {
    let capabilities = MockCapabilities {
        frame_fails: true,
        ..MockCapabilities::default()
    };
    let (mut controller, _) = controller(&news_catalog(), "?s=2", capabilities);
    controller.start();

    assert_eq!(controller.state(), EngineState::OpaqueFrame);
    assert_eq!(controller.host().resident_count(), 0);
    assert_eq!(controller.engine().current_generation(), None);
}

#[test]
fn playing_selects_preferred_audio_track_best_effort() {
    let capabilities = MockCapabilities {
        audio_tracks: false,
        ..MockCapabilities::default()
    };
    let (mut controller, _) = controller(&news_catalog(), "", capabilities);
    controller.start();

    let generation = current(&controller);
    let outcome = controller.signal(Signal::new(generation, PlaybackEvent::RichPlaying));

    assert_eq!(outcome, SignalOutcome::Applied);
    assert_eq!(controller.state(), EngineState::Rich);
    assert_eq!(
        controller.host().calls().last(),
        Some(&HostCall::SelectAudioTrack(1))
    );
}

#[test]
fn opaque_frame_has_nothing_to_signal() {
    let (mut controller, _) = controller(&news_catalog(), "?s=2", MockCapabilities::default());
    controller.start();

    let generation = current(&controller);
    for event in [
        PlaybackEvent::RichFatal {
            detail: "late".into(),
        },
        PlaybackEvent::CanPlay,
        PlaybackEvent::AdaptiveFatal,
    ] {
        assert_eq!(
            controller.signal(Signal::new(generation, event)),
            SignalOutcome::Ignored
        );
    }
    assert_eq!(controller.state(), EngineState::OpaqueFrame);
    assert_eq!(controller.host().resident_count(), 1);
}

#[test]
fn teardown_releases_everything() {
    let (mut controller, recorder) = controller(&news_catalog(), "", MockCapabilities::default());
    controller.start();
    rich_fatal(&mut controller);
    controller.teardown();

    assert_eq!(controller.state(), EngineState::Idle);
    assert_eq!(controller.host().resident_count(), 0);
    assert!(matches!(
        recorder.borrow().events().last(),
        Some(RecordedEvent::Release(release)) if release.tier == Tier::NativeAdaptive
    ));
}
