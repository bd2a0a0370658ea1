// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! The engine decides; a *host* acts. A host owns the single playback
//! container and knows how to build and tear down each tier's resources:
//!
//! - **Rich**: configure the rich player with a source list and wire its
//!   `error` and `play` notifications back as [`Signal`]s.
//! - **Native adaptive**: create a muted, inline `<video>` surface, then
//!   either load the URL directly or attach the adaptive-bitrate polyfill,
//!   wiring its `canplay` and fatal-error notifications back as [`Signal`]s.
//! - **Opaque frame**: build a sandboxed frame; it has no error signal.
//!
//! Every acquisition receives the [`Generation`] the engine assigned to it.
//! Callbacks registered during acquisition must report that generation, so
//! the engine can drop notifications from resources it already released.
//!
//! Release methods consume the handle and must leave the container empty
//! before returning.
//!
//! [`Signal`]: crate::engine::Signal

use crate::resolve::MediaSource;
use crate::resource::Generation;

/// Errors a host reports when a tier cannot be acquired.
///
/// The engine never surfaces these; they only steer the fallback.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The library backing the tier is not loaded.
    #[error("{0} is not available")]
    Unavailable(&'static str),
    /// The library threw while being configured.
    #[error("setup failed: {0}")]
    Setup(String),
    /// Building or attaching an element failed.
    #[error("DOM operation failed: {0}")]
    Dom(String),
}

/// Rich-player configuration for one attempt.
#[derive(Clone, Copy, Debug)]
pub struct RichSetup<'a> {
    /// Playlist item title (the channel key).
    pub title: &'a str,
    /// Sources, in preference order.
    pub sources: &'a [MediaSource],
    /// Live-edge sync window, in seconds.
    pub live_sync_duration: u32,
    /// Fit mode.
    pub stretching: &'a str,
}

/// Adaptive-bitrate polyfill configuration for one attempt.
#[derive(Clone, Copy, Debug)]
pub struct PolyfillSetup<'a> {
    /// Segmented stream index to load.
    pub url: &'a str,
    /// Transmux in a worker.
    pub enable_worker: bool,
    /// Low-latency live mode.
    pub low_latency: bool,
}

/// Opaque-frame configuration for one attempt.
#[derive(Clone, Copy, Debug)]
pub struct FrameSetup<'a> {
    /// The server's raw URL.
    pub url: &'a str,
    /// Capability list for the frame's `allow` attribute.
    pub allow: &'a str,
}

/// How the native tier drives its `<video>` surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptivePath {
    /// The platform plays segmented streams natively; assign `src` and play.
    Direct,
    /// Attach the adaptive-bitrate polyfill and play on `canplay`.
    Polyfill,
    /// Neither is possible; show native transport controls.
    ControlsOnly,
}

/// Builds and releases playback resources inside the single playback
/// container.
///
/// Implemented by the web backend against the DOM and by test doubles.
pub trait PlaybackHost {
    /// Live rich-player instance.
    type Rich;
    /// Live native `<video>` surface, with its polyfill instance if any.
    type Video;
    /// Live opaque frame.
    type Frame;

    /// Configures the rich player. Its fatal `error` and `play` notifications
    /// must be reported with `generation`.
    fn acquire_rich(
        &mut self,
        setup: &RichSetup<'_>,
        generation: Generation,
    ) -> Result<Self::Rich, HostError>;

    /// Selects an embedded audio track; failures are ignored by the caller.
    fn select_audio_track(&mut self, rich: &Self::Rich, track: u32) -> Result<(), HostError>;

    /// Tears the rich player down and clears the container.
    fn release_rich(&mut self, rich: Self::Rich);

    /// Whether the platform plays segmented streams without a polyfill.
    fn supports_native_segmented(&self) -> bool;

    /// Whether the adaptive-bitrate polyfill is loaded and supported.
    fn polyfill_available(&self) -> bool;

    /// Creates a muted, autoplaying, inline `<video>` surface in the
    /// container.
    fn acquire_video(&mut self, generation: Generation) -> Result<Self::Video, HostError>;

    /// Assigns `url` as the surface's source and requests playback.
    fn load_direct(&mut self, video: &mut Self::Video, url: &str);

    /// Attaches the polyfill and starts loading. `canplay` and fatal
    /// polyfill errors must be reported with `generation`.
    fn attach_polyfill(
        &mut self,
        video: &mut Self::Video,
        setup: &PolyfillSetup<'_>,
        generation: Generation,
    ) -> Result<(), HostError>;

    /// Requests playback; failures are ignored.
    fn play(&mut self, video: &Self::Video);

    /// Exposes native transport controls as the last resort.
    fn show_controls(&mut self, video: &Self::Video);

    /// Destroys the polyfill instance, removes the surface, and clears the
    /// container.
    fn release_video(&mut self, video: Self::Video);

    /// Builds the sandboxed frame in the container.
    fn acquire_frame(
        &mut self,
        setup: &FrameSetup<'_>,
        generation: Generation,
    ) -> Result<Self::Frame, HostError>;

    /// Removes the frame and clears the container.
    fn release_frame(&mut self, frame: Self::Frame);
}
