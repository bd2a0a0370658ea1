// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! RICH tier: the JW Player embedding contract.
//!
//! The player is created with `jwplayer(id).setup(config)` on a mount element
//! inside the playback container. Its first `error` event and every `play`
//! event are posted to the [`SignalMailbox`] tagged with the generation the
//! player was created for.

use std::rc::Rc;

use cascada_core::engine::{PlaybackEvent, Signal};
use cascada_core::host::{HostError, RichSetup};
use cascada_core::resolve::MediaSource;
use cascada_core::resource::Generation;
use serde_json::{Value, json};
use tracing::debug;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, HtmlElement};

use crate::js;
use crate::mailbox::SignalMailbox;

/// Global the rich player library installs.
pub(crate) const RICH_PLAYER_GLOBAL: &str = "jwplayer";

/// Id of the element the rich player mounts on.
const MOUNT_ID: &str = "cascada-rich-player";

/// Builds the rich player's `setup` object.
///
/// Keyed DASH sources carry a `drm.clearkey` block; everything else is a
/// bare `file` entry.
#[must_use]
pub fn rich_config(setup: &RichSetup<'_>) -> Value {
    let sources: Vec<Value> = setup.sources.iter().map(source_entry).collect();
    json!({
        "playlist": [{
            "title": setup.title,
            "description": "live",
            "sources": sources,
        }],
        "width": "100%",
        "height": "100%",
        "autostart": true,
        "mute": true,
        "playsinline": true,
        "primary": "html5",
        "androidhls": true,
        "displaytitle": false,
        "stretching": setup.stretching,
        "preload": "auto",
        "liveSyncDuration": setup.live_sync_duration,
    })
}

fn source_entry(source: &MediaSource) -> Value {
    match &source.clear_key {
        Some(clear_key) => json!({
            "file": source.file,
            "drm": { "clearkey": clear_key },
        }),
        None => json!({ "file": source.file }),
    }
}

type EventClosure = Closure<dyn FnMut(JsValue)>;

/// A live rich player instance.
pub struct RichPlayer {
    api: JsValue,
    mount: HtmlElement,
    _on_error: EventClosure,
    _on_play: EventClosure,
}

impl core::fmt::Debug for RichPlayer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RichPlayer")
            .field("mount", &MOUNT_ID)
            .finish_non_exhaustive()
    }
}

impl RichPlayer {
    /// Mounts and configures a player inside `container`.
    ///
    /// On failure nothing is left in the container.
    pub(crate) fn create(
        document: &Document,
        container: &HtmlElement,
        setup: &RichSetup<'_>,
        generation: Generation,
        mailbox: &Rc<SignalMailbox>,
    ) -> Result<Self, HostError> {
        let factory = js::global(RICH_PLAYER_GLOBAL)
            .ok_or(HostError::Unavailable(RICH_PLAYER_GLOBAL))?;
        let config = js::to_js(&rich_config(setup))?;

        let mount: HtmlElement = js::create(document, "div")?;
        mount.set_id(MOUNT_ID);
        js::fill(&mount);
        container
            .append_child(&mount)
            .map_err(|err| js::dom_error("append rich mount", &err))?;

        match Self::configure(&factory, &config, mount.clone(), generation, mailbox) {
            Ok(player) => Ok(player),
            Err(err) => {
                mount.remove();
                Err(err)
            }
        }
    }

    fn configure(
        factory: &JsValue,
        config: &JsValue,
        mount: HtmlElement,
        generation: Generation,
        mailbox: &Rc<SignalMailbox>,
    ) -> Result<Self, HostError> {
        let factory = js_sys::Function::from(factory.clone());
        let api = factory
            .call1(&JsValue::NULL, &JsValue::from_str(MOUNT_ID))
            .map_err(|err| js::setup_error(RICH_PLAYER_GLOBAL, &err))?;
        js::call(&api, "setup", &[config])?;

        let on_error = {
            let mailbox = Rc::clone(mailbox);
            Closure::wrap(Box::new(move |err: JsValue| {
                mailbox.post(Signal::new(
                    generation,
                    PlaybackEvent::RichFatal {
                        detail: js::describe(&err),
                    },
                ));
            }) as Box<dyn FnMut(JsValue)>)
        };
        js::call(&api, "once", &[&JsValue::from_str("error"), on_error.as_ref()])?;

        let on_play = {
            let mailbox = Rc::clone(mailbox);
            Closure::wrap(Box::new(move |_event: JsValue| {
                mailbox.post(Signal::new(generation, PlaybackEvent::RichPlaying));
            }) as Box<dyn FnMut(JsValue)>)
        };
        // Older player builds lack `on`; audio track selection is optional.
        if let Err(err) = js::call(&api, "on", &[&JsValue::from_str("play"), on_play.as_ref()]) {
            debug!(%err, "rich player has no play event");
        }

        Ok(Self {
            api,
            mount,
            _on_error: on_error,
            _on_play: on_play,
        })
    }

    /// Best-effort `setCurrentAudioTrack(track)`.
    pub(crate) fn select_audio_track(&self, track: u32) -> Result<(), HostError> {
        js::call(&self.api, "setCurrentAudioTrack", &[&JsValue::from(track)]).map(drop)
    }

    /// Removes the player and its mount element.
    pub(crate) fn release(self) {
        if let Err(err) = js::call(&self.api, "remove", &[]) {
            debug!(%err, "rich player remove failed");
        }
        self.mount.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascada_core::catalog::ServerDescriptor;
    use cascada_core::resolve::{DeliveryPlan, resolve};

    fn sources(server: &ServerDescriptor) -> Vec<MediaSource> {
        match resolve(server) {
            DeliveryPlan::Rich(sources) => sources,
            DeliveryPlan::OpaqueFrame(url) => panic!("{url} is not direct media"),
        }
    }

    fn setup<'a>(sources: &'a [MediaSource]) -> RichSetup<'a> {
        RichSetup {
            title: "news",
            sources,
            live_sync_duration: 3,
            stretching: "uniform",
        }
    }

    #[test]
    fn config_carries_playlist_and_live_settings() {
        let sources = sources(&ServerDescriptor::new("A", "http://x/stream.m3u8"));
        let config = rich_config(&setup(&sources));

        assert_eq!(config["playlist"][0]["title"], "news");
        assert_eq!(config["playlist"][0]["description"], "live");
        assert_eq!(
            config["playlist"][0]["sources"],
            json!([{ "file": "http://x/stream.m3u8" }])
        );
        assert_eq!(config["liveSyncDuration"], 3);
        assert_eq!(config["stretching"], "uniform");
        assert_eq!(config["autostart"], true);
        assert_eq!(config["mute"], true);
    }

    #[test]
    fn keyed_manifest_gets_clearkey_block() {
        let server = ServerDescriptor::new("D", "http://z/live.mpd")
            .with_keys(Some("kid".into()), Some("key".into()));
        let sources = sources(&server);
        let config = rich_config(&setup(&sources));

        assert_eq!(
            config["playlist"][0]["sources"][0],
            json!({
                "file": "http://z/live.mpd",
                "drm": { "clearkey": { "keyId": "kid", "key": "key" } },
            })
        );
    }
}
