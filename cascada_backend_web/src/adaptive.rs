// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! NATIVE_ADAPTIVE tier: a `<video>` surface, fed either directly (native
//! HLS) or through the hls.js polyfill.

use std::rc::Rc;

use cascada_core::engine::{PlaybackEvent, Signal};
use cascada_core::host::{HostError, PolyfillSetup};
use cascada_core::resource::Generation;
use js_sys::{Array, Function, Promise, Reflect};
use serde_json::{Value, json};
use tracing::debug;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Event, HtmlElement, HtmlVideoElement};

use crate::js;
use crate::mailbox::SignalMailbox;

/// MIME type probed with `canPlayType` to detect native HLS.
pub const SEGMENTED_MIME: &str = "application/vnd.apple.mpegurl";

/// Global the polyfill library installs.
pub(crate) const POLYFILL_GLOBAL: &str = "Hls";

/// Media event that starts playback on the polyfill path.
const CANPLAY_EVENT: &str = "canplay";

/// Value of `Hls.Events.ERROR` in every released hls.js version.
const POLYFILL_ERROR_EVENT: &str = "hlsError";

/// Builds the polyfill constructor options.
#[must_use]
pub fn polyfill_config(setup: &PolyfillSetup<'_>) -> Value {
    json!({
        "enableWorker": setup.enable_worker,
        "lowLatencyMode": setup.low_latency,
    })
}

/// Whether `<video>` plays segmented streams natively.
pub(crate) fn native_segmented_supported(document: &Document) -> bool {
    js::create::<HtmlVideoElement>(document, "video")
        .is_ok_and(|probe| !probe.can_play_type(SEGMENTED_MIME).is_empty())
}

/// Whether `Hls` is loaded and `Hls.isSupported()` returns true.
pub(crate) fn polyfill_supported() -> bool {
    js::global(POLYFILL_GLOBAL)
        .is_some_and(|ctor| js::call(&ctor, "isSupported", &[]).is_ok_and(|v| v.is_truthy()))
}

fn error_event_name(ctor: &JsValue) -> JsValue {
    Reflect::get(ctor, &JsValue::from_str("Events"))
        .and_then(|events| Reflect::get(&events, &JsValue::from_str("ERROR")))
        .ok()
        .filter(JsValue::is_string)
        .unwrap_or_else(|| JsValue::from_str(POLYFILL_ERROR_EVENT))
}

/// A live polyfill instance and its error listener.
struct Polyfill {
    instance: JsValue,
    _on_error: Closure<dyn FnMut(JsValue, JsValue)>,
}

impl Polyfill {
    fn attach(
        video: &HtmlVideoElement,
        setup: &PolyfillSetup<'_>,
        generation: Generation,
        mailbox: &Rc<SignalMailbox>,
    ) -> Result<Self, HostError> {
        let ctor = js::global(POLYFILL_GLOBAL).ok_or(HostError::Unavailable(POLYFILL_GLOBAL))?;
        let ctor_fn: Function = ctor
            .clone()
            .dyn_into()
            .map_err(|_| HostError::Setup(format!("{POLYFILL_GLOBAL} is not a constructor")))?;
        let options = js::to_js(&polyfill_config(setup))?;
        let instance: JsValue = Reflect::construct(&ctor_fn, &Array::of1(&options))
            .map_err(|err| js::setup_error("new Hls", &err))?;

        let on_error = {
            let mailbox = Rc::clone(mailbox);
            Closure::wrap(Box::new(move |_event: JsValue, data: JsValue| {
                let fatal = Reflect::get(&data, &JsValue::from_str("fatal"))
                    .is_ok_and(|fatal| fatal.is_truthy());
                if fatal {
                    mailbox.post(Signal::new(generation, PlaybackEvent::AdaptiveFatal));
                }
            }) as Box<dyn FnMut(JsValue, JsValue)>)
        };

        let media = JsValue::from(video.clone());
        let wired = js::call(&instance, "on", &[&error_event_name(&ctor), on_error.as_ref()])
            .and_then(|_| js::call(&instance, "loadSource", &[&JsValue::from_str(setup.url)]))
            .and_then(|_| js::call(&instance, "attachMedia", &[&media]));
        let polyfill = Self {
            instance,
            _on_error: on_error,
        };
        match wired {
            Ok(_) => Ok(polyfill),
            Err(err) => {
                polyfill.destroy();
                Err(err)
            }
        }
    }

    fn destroy(self) {
        if let Err(err) = js::call(&self.instance, "destroy", &[]) {
            debug!(%err, "polyfill destroy failed");
        }
    }
}

/// A live `<video>` surface.
pub struct VideoSurface {
    element: HtmlVideoElement,
    polyfill: Option<Polyfill>,
    on_canplay: Closure<dyn FnMut(Event)>,
}

impl core::fmt::Debug for VideoSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VideoSurface")
            .field("element", &"HtmlVideoElement")
            .field("polyfill", &self.polyfill.is_some())
            .finish_non_exhaustive()
    }
}

impl VideoSurface {
    /// Creates a muted, autoplaying, inline surface inside `container`.
    pub(crate) fn create(
        document: &Document,
        container: &HtmlElement,
        generation: Generation,
        mailbox: &Rc<SignalMailbox>,
    ) -> Result<Self, HostError> {
        let element: HtmlVideoElement = js::create(document, "video")?;
        let _ = element.set_attribute("playsinline", "true");
        element.set_muted(true);
        element.set_autoplay(true);
        element.set_controls(false);
        element.set_preload("auto");
        element.set_cross_origin(Some("anonymous"));
        js::fill(&element);
        let _ = element.style().set_property("object-fit", "contain");

        let on_canplay = {
            let mailbox = Rc::clone(mailbox);
            Closure::wrap(Box::new(move |_event: Event| {
                mailbox.post(Signal::new(generation, PlaybackEvent::CanPlay));
            }) as Box<dyn FnMut(Event)>)
        };
        element
            .add_event_listener_with_callback(CANPLAY_EVENT, on_canplay.as_ref().unchecked_ref())
            .map_err(|err| js::dom_error("canplay listener", &err))?;
        container
            .append_child(&element)
            .map_err(|err| js::dom_error("append video", &err))?;

        Ok(Self {
            element,
            polyfill: None,
            on_canplay,
        })
    }

    pub(crate) fn load_direct(&self, url: &str, ignore: &Closure<dyn FnMut(JsValue)>) {
        self.element.set_src(url);
        self.play(ignore);
    }

    pub(crate) fn attach_polyfill(
        &mut self,
        setup: &PolyfillSetup<'_>,
        generation: Generation,
        mailbox: &Rc<SignalMailbox>,
    ) -> Result<(), HostError> {
        if let Some(previous) = self.polyfill.take() {
            previous.destroy();
        }
        self.polyfill = Some(Polyfill::attach(&self.element, setup, generation, mailbox)?);
        Ok(())
    }

    /// Calls `play()`, routing a rejected promise to `ignore`.
    pub(crate) fn play(&self, ignore: &Closure<dyn FnMut(JsValue)>) {
        match self.element.play() {
            Ok(promise) => {
                let _: Promise = promise.catch(ignore);
            }
            Err(err) => debug!(err = %js::describe(&err), "play() threw"),
        }
    }

    pub(crate) fn show_controls(&self) {
        self.element.set_controls(true);
    }

    /// Unregisters `canplay`, destroys the polyfill, stops loading, and
    /// removes the element.
    ///
    /// The listener is removed before its closure is freed with `self`.
    pub(crate) fn release(self) {
        let _ = self.element.remove_event_listener_with_callback(
            CANPLAY_EVENT,
            self.on_canplay.as_ref().unchecked_ref(),
        );
        if let Some(polyfill) = self.polyfill {
            polyfill.destroy();
        }
        let _ = self.element.pause();
        let _ = self.element.remove_attribute("src");
        self.element.load();
        self.element.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyfill_options_follow_setup() {
        let setup = PolyfillSetup {
            url: "http://x/stream.m3u8",
            enable_worker: true,
            low_latency: false,
        };
        assert_eq!(
            polyfill_config(&setup),
            json!({ "enableWorker": true, "lowLatencyMode": false })
        );
    }
}
