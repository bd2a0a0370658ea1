// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM playback host.

use std::rc::Rc;

use cascada_core::host::{FrameSetup, HostError, PlaybackHost, PolyfillSetup, RichSetup};
use cascada_core::resource::Generation;
use tracing::debug;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, HtmlElement};

use crate::adaptive::{self, VideoSurface};
use crate::frame::Frame;
use crate::mailbox::SignalMailbox;
use crate::rich::RichPlayer;

/// Builds every tier inside one playback container element.
///
/// Library callbacks are posted to the [`SignalMailbox`] passed at
/// construction; the owner drains it into the controller.
pub struct DomHost {
    document: Document,
    container: HtmlElement,
    mailbox: Rc<SignalMailbox>,
    ignore_rejection: Closure<dyn FnMut(JsValue)>,
}

impl core::fmt::Debug for DomHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomHost")
            .field("container", &self.container.id())
            .field("mailbox", &self.mailbox)
            .finish_non_exhaustive()
    }
}

impl DomHost {
    /// Creates a host that manages the children of `container`.
    #[must_use]
    pub fn new(document: Document, container: HtmlElement, mailbox: Rc<SignalMailbox>) -> Self {
        Self {
            document,
            container,
            mailbox,
            ignore_rejection: Closure::wrap(Box::new(|_reason: JsValue| {})
                as Box<dyn FnMut(JsValue)>),
        }
    }

    /// Returns the playback container.
    #[must_use]
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// Returns the mailbox callbacks post to.
    #[must_use]
    pub fn mailbox(&self) -> &Rc<SignalMailbox> {
        &self.mailbox
    }

    /// Removes anything a library left behind in the container.
    fn clear_container(&self) {
        self.container.set_inner_html("");
    }
}

impl PlaybackHost for DomHost {
    type Rich = RichPlayer;
    type Video = VideoSurface;
    type Frame = Frame;

    fn acquire_rich(
        &mut self,
        setup: &RichSetup<'_>,
        generation: Generation,
    ) -> Result<RichPlayer, HostError> {
        RichPlayer::create(
            &self.document,
            &self.container,
            setup,
            generation,
            &self.mailbox,
        )
    }

    fn select_audio_track(&mut self, rich: &RichPlayer, track: u32) -> Result<(), HostError> {
        rich.select_audio_track(track)
    }

    fn release_rich(&mut self, rich: RichPlayer) {
        rich.release();
        self.clear_container();
    }

    fn supports_native_segmented(&self) -> bool {
        let native = adaptive::native_segmented_supported(&self.document);
        debug!(native, "probed native segmented playback");
        native
    }

    fn polyfill_available(&self) -> bool {
        adaptive::polyfill_supported()
    }

    fn acquire_video(&mut self, generation: Generation) -> Result<VideoSurface, HostError> {
        VideoSurface::create(&self.document, &self.container, generation, &self.mailbox)
    }

    fn load_direct(&mut self, video: &mut VideoSurface, url: &str) {
        video.load_direct(url, &self.ignore_rejection);
    }

    fn attach_polyfill(
        &mut self,
        video: &mut VideoSurface,
        setup: &PolyfillSetup<'_>,
        generation: Generation,
    ) -> Result<(), HostError> {
        video.attach_polyfill(setup, generation, &self.mailbox)
    }

    fn play(&mut self, video: &VideoSurface) {
        video.play(&self.ignore_rejection);
    }

    fn show_controls(&mut self, video: &VideoSurface) {
        video.show_controls();
    }

    fn release_video(&mut self, video: VideoSurface) {
        video.release();
        self.clear_container();
    }

    fn acquire_frame(
        &mut self,
        setup: &FrameSetup<'_>,
        _generation: Generation,
    ) -> Result<Frame, HostError> {
        Frame::create(&self.document, &self.container, setup)
    }

    fn release_frame(&mut self, frame: Frame) {
        frame.release();
        self.clear_container();
    }
}
