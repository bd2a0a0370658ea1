// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cascading playback fallback engine.
//!
//! [`FallbackEngine`] owns the single [`ActivePlayback`] and moves it through
//! the tiers:
//!
//! ```text
//!   IDLE ──attempt──► RICH ──fatal, .m3u8──► NATIVE_ADAPTIVE ──fatal──► (controls)
//!     │                 │
//!     │                 └──fatal, other────► OPAQUE_FRAME
//!     └──attempt, not direct media─────────► OPAQUE_FRAME
//! ```
//!
//! Every transition releases the resident resource before acquiring the next
//! one, so at most one tier is resident at any instant. Each acquisition gets
//! a new [`Generation`]; [`Signal`]s that carry any other generation are
//! dropped.
//!
//! Nothing here returns an error. Host failures during acquisition count as a
//! fatal error of that tier.

use core::mem;

use tracing::{debug, info, warn};

use crate::catalog::ServerDescriptor;
use crate::config::PlayerConfig;
use crate::host::{AdaptivePath, FrameSetup, HostError, PlaybackHost, PolyfillSetup, RichSetup};
use crate::resolve::{DeliveryPlan, MediaSource, Tier, is_segmented_index, resolve};
use crate::resource::{ActivePlayback, Generation};
use crate::trace::{
    AcquireFailedEvent, AttemptCause, AttemptEvent, DegradeEvent, DemoteEvent, ReleaseEvent,
    StaleSignalEvent, TierEnterEvent, TraceSink, Tracer,
};

/// Engine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No attempt yet, or torn down.
    Idle,
    /// The rich player is resident.
    Rich,
    /// A native `<video>` surface is resident.
    NativeAdaptive {
        /// Transport controls were exposed as the last resort.
        degraded: bool,
    },
    /// The opaque frame tier was entered; it never demotes further.
    OpaqueFrame,
}

impl EngineState {
    /// The tier this state belongs to.
    #[must_use]
    pub const fn tier(self) -> Option<Tier> {
        match self {
            Self::Idle => None,
            Self::Rich => Some(Tier::Rich),
            Self::NativeAdaptive { .. } => Some(Tier::NativeAdaptive),
            Self::OpaqueFrame => Some(Tier::OpaqueFrame),
        }
    }
}

/// A notification from a tier's library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The rich player reported a fatal playback error.
    RichFatal {
        /// Library-provided description, for logs.
        detail: String,
    },
    /// The rich player started playing.
    RichPlaying,
    /// The `<video>` surface can start playing.
    CanPlay,
    /// The adaptive-bitrate polyfill reported a fatal error.
    AdaptiveFatal,
}

/// A [`PlaybackEvent`] tagged with the generation of the resource it came
/// from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signal {
    /// Generation captured when the callback was registered.
    pub generation: Generation,
    /// What happened.
    pub event: PlaybackEvent,
}

impl Signal {
    /// Creates a signal.
    #[must_use]
    pub const fn new(generation: Generation, event: PlaybackEvent) -> Self {
        Self { generation, event }
    }
}

/// What [`FallbackEngine::handle`] did with a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalOutcome {
    /// The signal changed state or triggered a host call.
    Applied,
    /// The signal came from a released resource and was dropped.
    Stale,
    /// The signal is current but has no meaning in the current state.
    Ignored,
}

/// Owns the active playback resource and drives tier demotion.
///
/// The host is passed into each call rather than owned, so the caller decides
/// where the host lives (see [`Controller`](crate::selection::Controller)).
pub struct FallbackEngine<H: PlaybackHost> {
    active: ActivePlayback<H>,
    state: EngineState,
    issued: Generation,
    server_url: String,
    title: String,
    config: PlayerConfig,
    tracer: Tracer,
}

impl<H: PlaybackHost> core::fmt::Debug for FallbackEngine<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FallbackEngine")
            .field("active", &self.active)
            .field("state", &self.state)
            .field("issued", &self.issued)
            .field("server_url", &self.server_url)
            .field("title", &self.title)
            .field("config", &self.config)
            .field("tracer", &self.tracer)
            .finish()
    }
}

impl<H: PlaybackHost> FallbackEngine<H> {
    /// Creates an idle engine.
    #[must_use]
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            active: ActivePlayback::None,
            state: EngineState::Idle,
            issued: Generation::ZERO,
            server_url: String::new(),
            title: String::new(),
            config,
            tracer: Tracer::none(),
        }
    }

    /// Installs a transition sink, replacing any previous one.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The resident resource.
    #[must_use]
    pub fn active(&self) -> &ActivePlayback<H> {
        &self.active
    }

    /// Generation of the resident resource; signals must match it.
    #[must_use]
    pub fn current_generation(&self) -> Option<Generation> {
        self.active.generation()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Starts a fresh attempt for `server`, always from the top of the
    /// cascade.
    ///
    /// Whatever is resident is released first, regardless of which tier the
    /// previous attempt settled on.
    pub fn attempt(
        &mut self,
        host: &mut H,
        server: &ServerDescriptor,
        title: &str,
        server_index: usize,
        cause: AttemptCause,
    ) {
        self.release(host);

        let plan = resolve(server);
        server.url().clone_into(&mut self.server_url);
        title.clone_into(&mut self.title);

        info!(
            server = server.name(),
            url = server.url(),
            tier = plan.tier().as_str(),
            ?cause,
            "starting playback attempt"
        );
        self.tracer.attempt(&AttemptEvent {
            server_index,
            url: self.server_url.clone(),
            starting_tier: plan.tier(),
            cause,
        });

        match plan {
            DeliveryPlan::Rich(sources) => self.enter_rich(host, &sources),
            DeliveryPlan::OpaqueFrame(url) => self.enter_frame(host, &url),
        }
    }

    /// Releases whatever is resident and returns to [`EngineState::Idle`].
    pub fn release(&mut self, host: &mut H) {
        let active = mem::take(&mut self.active);
        if let Some((tier, generation)) = active.release(host) {
            debug!(tier = tier.as_str(), ?generation, "released playback resource");
            self.tracer.release(&ReleaseEvent { tier, generation });
        }
        self.state = EngineState::Idle;
    }

    /// Applies a library notification.
    ///
    /// Signals whose generation does not match the resident resource are
    /// dropped without touching the host.
    pub fn handle(&mut self, host: &mut H, signal: Signal) -> SignalOutcome {
        let active = self.active.generation();
        if active != Some(signal.generation) {
            debug!(
                generation = ?signal.generation,
                ?active,
                event = ?signal.event,
                "dropping signal from released resource"
            );
            self.tracer.stale_signal(&StaleSignalEvent {
                generation: signal.generation,
                active,
            });
            return SignalOutcome::Stale;
        }

        match signal.event {
            PlaybackEvent::RichFatal { detail } => {
                let ActivePlayback::Rich { file, .. } = &self.active else {
                    return SignalOutcome::Ignored;
                };
                let file = file.clone();
                warn!(%detail, %file, "rich player reported a fatal error");
                self.release(host);
                self.demote_from_rich(host, &file);
                SignalOutcome::Applied
            }
            PlaybackEvent::RichPlaying => {
                let ActivePlayback::Rich { handle, .. } = &self.active else {
                    return SignalOutcome::Ignored;
                };
                let track = self.config.preferred_audio_track;
                if let Err(err) = host.select_audio_track(handle, track) {
                    debug!(%err, track, "audio track selection not supported");
                }
                SignalOutcome::Applied
            }
            PlaybackEvent::CanPlay => {
                let ActivePlayback::Video { handle, .. } = &self.active else {
                    return SignalOutcome::Ignored;
                };
                host.play(handle);
                SignalOutcome::Applied
            }
            PlaybackEvent::AdaptiveFatal => {
                let ActivePlayback::Video {
                    handle, generation, ..
                } = &self.active
                else {
                    return SignalOutcome::Ignored;
                };
                if self.state == (EngineState::NativeAdaptive { degraded: true }) {
                    return SignalOutcome::Ignored;
                }
                let generation = *generation;
                warn!(?generation, "adaptive engine failed; exposing native controls");
                host.show_controls(handle);
                self.state = EngineState::NativeAdaptive { degraded: true };
                self.tracer.degrade(&DegradeEvent { generation });
                SignalOutcome::Applied
            }
        }
    }

    /// Chooses how the native tier drives its surface on this host.
    #[must_use]
    pub fn adaptive_path(host: &H) -> AdaptivePath {
        if host.supports_native_segmented() {
            AdaptivePath::Direct
        } else if host.polyfill_available() {
            AdaptivePath::Polyfill
        } else {
            AdaptivePath::ControlsOnly
        }
    }

    fn next_generation(&mut self) -> Generation {
        self.issued = self.issued.next();
        self.issued
    }

    fn acquire_failed(&mut self, tier: Tier, err: &HostError) {
        warn!(tier = tier.as_str(), %err, "could not acquire playback tier");
        self.tracer.acquire_failed(&AcquireFailedEvent {
            tier,
            reason: err.to_string(),
        });
    }

    fn demote(&mut self, from: Tier, to: Tier) {
        info!(from = from.as_str(), to = to.as_str(), "demoting playback tier");
        self.tracer.demote(&DemoteEvent { from, to });
    }

    fn entered(&mut self, tier: Tier, generation: Generation, url: &str, path: Option<AdaptivePath>) {
        info!(tier = tier.as_str(), ?generation, url, ?path, "playback tier resident");
        self.tracer.tier_enter(&TierEnterEvent {
            tier,
            generation,
            url: url.to_owned(),
            path,
        });
    }

    fn enter_rich(&mut self, host: &mut H, sources: &[MediaSource]) {
        let generation = self.next_generation();
        let file = sources
            .first()
            .map(|source| source.file.clone())
            .unwrap_or_default();

        let setup = RichSetup {
            title: &self.title,
            sources,
            live_sync_duration: self.config.live_sync_duration,
            stretching: &self.config.stretching,
        };
        match host.acquire_rich(&setup, generation) {
            Ok(handle) => {
                self.entered(Tier::Rich, generation, &file, None);
                self.active = ActivePlayback::Rich {
                    handle,
                    generation,
                    file,
                };
                self.state = EngineState::Rich;
            }
            Err(err) => {
                self.acquire_failed(Tier::Rich, &err);
                self.demote_from_rich(host, &file);
            }
        }
    }

    /// A failed segmented source retries natively; anything else goes
    /// straight to the opaque frame on the server's own URL.
    fn demote_from_rich(&mut self, host: &mut H, file: &str) {
        if is_segmented_index(file) {
            self.demote(Tier::Rich, Tier::NativeAdaptive);
            self.enter_native(host, file);
        } else {
            self.demote(Tier::Rich, Tier::OpaqueFrame);
            let url = self.server_url.clone();
            self.enter_frame(host, &url);
        }
    }

    fn enter_native(&mut self, host: &mut H, url: &str) {
        let generation = self.next_generation();
        let mut handle = match host.acquire_video(generation) {
            Ok(handle) => handle,
            Err(err) => {
                // Without a surface there is nothing to show controls on.
                self.acquire_failed(Tier::NativeAdaptive, &err);
                self.demote(Tier::NativeAdaptive, Tier::OpaqueFrame);
                let server_url = self.server_url.clone();
                self.enter_frame(host, &server_url);
                return;
            }
        };

        let path = Self::adaptive_path(host);
        let degraded = match path {
            AdaptivePath::Direct => {
                host.load_direct(&mut handle, url);
                false
            }
            AdaptivePath::Polyfill => {
                let setup = PolyfillSetup {
                    url,
                    enable_worker: self.config.enable_worker,
                    low_latency: self.config.low_latency,
                };
                match host.attach_polyfill(&mut handle, &setup, generation) {
                    Ok(()) => false,
                    Err(err) => {
                        self.acquire_failed(Tier::NativeAdaptive, &err);
                        host.show_controls(&handle);
                        true
                    }
                }
            }
            AdaptivePath::ControlsOnly => {
                host.show_controls(&handle);
                true
            }
        };

        self.entered(Tier::NativeAdaptive, generation, url, Some(path));
        if degraded {
            self.tracer.degrade(&DegradeEvent { generation });
        }
        self.active = ActivePlayback::Video {
            handle,
            generation,
            url: url.to_owned(),
        };
        self.state = EngineState::NativeAdaptive { degraded };
    }

    fn enter_frame(&mut self, host: &mut H, url: &str) {
        let generation = self.next_generation();
        let setup = FrameSetup {
            url,
            allow: &self.config.frame_allow,
        };
        match host.acquire_frame(&setup, generation) {
            Ok(handle) => {
                self.entered(Tier::OpaqueFrame, generation, url, None);
                self.active = ActivePlayback::Frame {
                    handle,
                    generation,
                    url: url.to_owned(),
                };
            }
            Err(err) => self.acquire_failed(Tier::OpaqueFrame, &err),
        }
        self.state = EngineState::OpaqueFrame;
    }
}
