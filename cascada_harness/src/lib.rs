// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory playback host and catalog fixtures.
//!
//! [`MockHost`] implements [`PlaybackHost`] without a browser. It keeps a
//! model of the playback container, counts how many tier resources were ever
//! resident at once, records every call, and can be told which libraries are
//! "loaded" and which acquisitions should fail.

use cascada_core::catalog::Catalog;
use cascada_core::host::{FrameSetup, HostError, PlaybackHost, PolyfillSetup, RichSetup};
use cascada_core::resolve::Tier;
use cascada_core::resource::Generation;

/// Which libraries and platform features the mock pretends to have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockCapabilities {
    /// The rich player library is loaded.
    pub rich_player: bool,
    /// `<video>` plays segmented streams natively.
    pub native_segmented: bool,
    /// The adaptive-bitrate polyfill is loaded and supported.
    pub polyfill: bool,
    /// The polyfill throws during setup.
    pub polyfill_throws: bool,
    /// Creating the `<video>` surface fails.
    pub video_fails: bool,
    /// Creating the frame fails.
    pub frame_fails: bool,
    /// The rich player supports audio track selection.
    pub audio_tracks: bool,
}

impl Default for MockCapabilities {
    /// A desktop-like browser: rich player and polyfill loaded, no native HLS.
    fn default() -> Self {
        Self {
            rich_player: true,
            native_segmented: false,
            polyfill: true,
            polyfill_throws: false,
            video_fails: false,
            frame_fails: false,
            audio_tracks: true,
        }
    }
}

/// A recorded host call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCall {
    /// Rich player configured.
    AcquireRich {
        /// Token handed to the host.
        generation: Generation,
        /// Playlist title.
        title: String,
        /// Source URLs.
        files: Vec<String>,
        /// Whether the first source carried a clear key.
        clear_key: bool,
    },
    /// Audio track selection requested.
    SelectAudioTrack(u32),
    /// Rich player removed.
    ReleaseRich(Generation),
    /// `<video>` surface created.
    AcquireVideo(Generation),
    /// Source assigned directly.
    LoadDirect(String),
    /// Polyfill attached.
    AttachPolyfill {
        /// Stream URL.
        url: String,
        /// Low-latency flag.
        low_latency: bool,
        /// Worker flag.
        enable_worker: bool,
    },
    /// Playback requested.
    Play,
    /// Transport controls exposed.
    ShowControls,
    /// `<video>` surface removed.
    ReleaseVideo(Generation),
    /// Frame created.
    AcquireFrame {
        /// Token handed to the host.
        generation: Generation,
        /// Frame URL.
        url: String,
    },
    /// Frame removed.
    ReleaseFrame(Generation),
}

/// Handle to a mock resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockHandle {
    /// Generation the engine assigned.
    pub generation: Generation,
}

/// Test double for the playback container.
#[derive(Clone, Debug, Default)]
pub struct MockHost {
    /// Pretended capabilities; may be changed between attempts.
    pub capabilities: MockCapabilities,
    calls: Vec<HostCall>,
    container: Vec<(Tier, Generation)>,
    max_resident: usize,
    controls_visible: bool,
}

impl MockHost {
    /// Creates a host with the given capabilities.
    #[must_use]
    pub fn new(capabilities: MockCapabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Forgets recorded calls (the container model is kept).
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of tier resources currently in the container.
    #[must_use]
    pub fn resident_count(&self) -> usize {
        self.container.len()
    }

    /// Largest number of resources ever resident at once.
    #[must_use]
    pub fn max_resident(&self) -> usize {
        self.max_resident
    }

    /// Tier and generation of the resident resource, if exactly one.
    #[must_use]
    pub fn resident(&self) -> Option<(Tier, Generation)> {
        match self.container.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Whether the resident `<video>` shows transport controls.
    #[must_use]
    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    /// Number of recorded calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    fn insert(&mut self, tier: Tier, generation: Generation) -> MockHandle {
        self.container.push((tier, generation));
        self.max_resident = self.max_resident.max(self.container.len());
        MockHandle { generation }
    }

    fn remove(&mut self, generation: Generation) {
        self.container.retain(|(_, resident)| *resident != generation);
    }
}

impl PlaybackHost for MockHost {
    type Rich = MockHandle;
    type Video = MockHandle;
    type Frame = MockHandle;

    fn acquire_rich(
        &mut self,
        setup: &RichSetup<'_>,
        generation: Generation,
    ) -> Result<MockHandle, HostError> {
        if !self.capabilities.rich_player {
            return Err(HostError::Unavailable("rich player"));
        }
        self.calls.push(HostCall::AcquireRich {
            generation,
            title: setup.title.to_owned(),
            files: setup.sources.iter().map(|s| s.file.clone()).collect(),
            clear_key: setup
                .sources
                .first()
                .is_some_and(|s| s.clear_key.is_some()),
        });
        Ok(self.insert(Tier::Rich, generation))
    }

    fn select_audio_track(&mut self, _rich: &MockHandle, track: u32) -> Result<(), HostError> {
        self.calls.push(HostCall::SelectAudioTrack(track));
        if self.capabilities.audio_tracks {
            Ok(())
        } else {
            Err(HostError::Setup("setCurrentAudioTrack is not a function".to_owned()))
        }
    }

    fn release_rich(&mut self, rich: MockHandle) {
        self.calls.push(HostCall::ReleaseRich(rich.generation));
        self.remove(rich.generation);
    }

    fn supports_native_segmented(&self) -> bool {
        self.capabilities.native_segmented
    }

    fn polyfill_available(&self) -> bool {
        self.capabilities.polyfill
    }

    fn acquire_video(&mut self, generation: Generation) -> Result<MockHandle, HostError> {
        if self.capabilities.video_fails {
            return Err(HostError::Dom("createElement(video) failed".to_owned()));
        }
        self.calls.push(HostCall::AcquireVideo(generation));
        self.controls_visible = false;
        Ok(self.insert(Tier::NativeAdaptive, generation))
    }

    fn load_direct(&mut self, _video: &mut MockHandle, url: &str) {
        self.calls.push(HostCall::LoadDirect(url.to_owned()));
    }

    fn attach_polyfill(
        &mut self,
        _video: &mut MockHandle,
        setup: &PolyfillSetup<'_>,
        _generation: Generation,
    ) -> Result<(), HostError> {
        if self.capabilities.polyfill_throws {
            return Err(HostError::Setup("Hls constructor threw".to_owned()));
        }
        self.calls.push(HostCall::AttachPolyfill {
            url: setup.url.to_owned(),
            low_latency: setup.low_latency,
            enable_worker: setup.enable_worker,
        });
        Ok(())
    }

    fn play(&mut self, _video: &MockHandle) {
        self.calls.push(HostCall::Play);
    }

    fn show_controls(&mut self, _video: &MockHandle) {
        self.calls.push(HostCall::ShowControls);
        self.controls_visible = true;
    }

    fn release_video(&mut self, video: MockHandle) {
        self.calls.push(HostCall::ReleaseVideo(video.generation));
        self.controls_visible = false;
        self.remove(video.generation);
    }

    fn acquire_frame(
        &mut self,
        setup: &FrameSetup<'_>,
        generation: Generation,
    ) -> Result<MockHandle, HostError> {
        if self.capabilities.frame_fails {
            return Err(HostError::Dom("createElement(iframe) failed".to_owned()));
        }
        self.calls.push(HostCall::AcquireFrame {
            generation,
            url: setup.url.to_owned(),
        });
        Ok(self.insert(Tier::OpaqueFrame, generation))
    }

    fn release_frame(&mut self, frame: MockHandle) {
        self.calls.push(HostCall::ReleaseFrame(frame.generation));
        self.remove(frame.generation);
    }
}

/// The two-server `news` catalog: `A` is an HLS stream, `B` an embed page.
#[must_use]
pub fn news_catalog() -> Catalog {
    Catalog::from_value(serde_json::json!({
        "news": {
            "servidores": [
                { "nombre": "A", "url": "http://x/stream.m3u8" },
                { "nombre": "B", "url": "http://y/embed" }
            ]
        }
    }))
    .unwrap_or_default()
}

/// A catalog exercising every entry shape, in this key order: `news`
/// (list), `sports` (legacy DASH with keys), `movies` (three servers, one
/// unnamed), `dead` (no servers).
#[must_use]
pub fn mixed_catalog() -> Catalog {
    Catalog::from_value(serde_json::json!({
        "news": {
            "servidores": [
                { "nombre": "A", "url": "http://x/stream.m3u8" },
                { "nombre": "B", "url": "http://y/embed" }
            ]
        },
        "sports": { "url": "http://s/live.mpd", "k1": "kid", "k2": "key" },
        "movies": {
            "servidores": [
                { "nombre": "HD", "url": "http://m/hd.m3u8" },
                { "url": "http://m/sd.mpd" },
                { "nombre": "Web", "url": "http://m/watch" }
            ]
        },
        "dead": { "servidores": [] }
    }))
    .unwrap_or_default()
}
