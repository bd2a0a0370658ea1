// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-channel live player page.
//!
//! Waits for the `ConfiguracionCanales` catalog, resolves the channel from
//! `?id=` and the initial server from `?s=`, then plays it with the
//! `RICH → NATIVE_ADAPTIVE → OPAQUE_FRAME` fallback. The server sheet lets the
//! viewer switch servers; the channel never changes.
//!
//! Build with: `wasm-pack build --target web demos/web_player`
//! Then serve `demos/web_player/` and open `index.html?id=<channel>`.

#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use cascada_backend_web::{CatalogPoll, DomHost, Shell, SignalMailbox, logging, read_config};
use cascada_core::catalog::Catalog;
use cascada_core::config::PlayerConfig;
use cascada_core::query::PageQuery;
use cascada_core::selection::{Controller, Startup};
use cascada_core::wait::CatalogWait;
use tracing::{info, warn};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event};

/// The running controller, once the catalog resolved to something playable.
type Slot = Rc<RefCell<Option<Controller<DomHost>>>>;

/// Delivers queued library signals. If the controller is busy (a callback
/// fired synchronously inside one of its calls) this does nothing; the busy
/// caller drains afterwards.
fn drain(slot: &RefCell<Option<Controller<DomHost>>>, mailbox: &SignalMailbox) {
    let Ok(mut slot) = slot.try_borrow_mut() else {
        return;
    };
    let Some(controller) = slot.as_mut() else {
        return;
    };
    mailbox.drain_into(|signal| {
        controller.signal(signal);
    });
}

fn page_query() -> PageQuery {
    web_sys::window()
        .and_then(|window| window.location().href().ok())
        .map(|href| PageQuery::from_href(&href))
        .unwrap_or_default()
}

fn start_page(
    document: Document,
    shell: &Rc<Shell>,
    mailbox: &Rc<SignalMailbox>,
    slot: &Slot,
    config: PlayerConfig,
    catalog: Catalog,
) -> Result<(), JsValue> {
    let startup = Startup::from_catalog(&catalog, &page_query());
    if let Some(title) = startup.title() {
        shell.set_title(&title);
    }
    let selection = match startup {
        Startup::NoChannels | Startup::NoServers { .. } => {
            shell.show_empty_state();
            return Ok(());
        }
        Startup::Ready(selection) => selection,
    };

    // The server buttons live as long as the page, and they keep the player
    // alive with them.
    let on_select: Rc<dyn Fn(usize)> = {
        let slot = Rc::clone(slot);
        let mailbox = Rc::clone(mailbox);
        let shell = Rc::clone(shell);
        Rc::new(move |index| {
            let active = slot
                .borrow_mut()
                .as_mut()
                .and_then(|controller| controller.select_server(index));
            if let Some(active) = active {
                shell.mark_active(active);
            }
            drain(&slot, &mailbox);
        })
    };
    shell.render_servers(selection.labels(), selection.active_index(), on_select)?;

    let host = DomHost::new(document, shell.player().clone(), Rc::clone(mailbox));
    let mut controller = Controller::new(selection, host, config);
    controller.start();
    info!(state = ?controller.state(), "player started");
    *slot.borrow_mut() = Some(controller);
    drain(slot, mailbox);
    Ok(())
}

fn bind_teardown(slot: &Slot) -> Result<(), JsValue> {
    let Some(window) = web_sys::window() else {
        return Ok(());
    };
    let slot: Weak<_> = Rc::downgrade(slot);
    let closure = Closure::wrap(Box::new(move |_event: Event| {
        if let Some(slot) = slot.upgrade()
            && let Ok(mut slot) = slot.try_borrow_mut()
            && let Some(controller) = slot.as_mut()
        {
            controller.teardown();
        }
    }) as Box<dyn FnMut(Event)>);
    window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Entry point for the player page.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let config = read_config();
    logging::init(config.max_log_level());

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let shell = Rc::new(Shell::from_document(document.clone())?);
    shell.bind_sheet_controls()?;
    shell.bind_fullscreen()?;
    shell.bind_gestures(config.swipe_threshold)?;

    let mailbox = Rc::new(SignalMailbox::new());
    let slot: Slot = Rc::new(RefCell::new(None));
    {
        let slot = Rc::downgrade(&slot);
        let weak_mailbox = Rc::downgrade(&mailbox);
        mailbox.set_waker(move || {
            if let (Some(slot), Some(mailbox)) = (slot.upgrade(), weak_mailbox.upgrade()) {
                drain(&slot, &mailbox);
            }
        });
    }
    bind_teardown(&slot)?;

    let wait = CatalogWait::from(&config);
    let poll = CatalogPoll::start(wait, move |catalog| {
        let Some(catalog) = catalog else {
            shell.show_empty_state();
            return;
        };
        if let Err(err) = start_page(document, &shell, &mailbox, &slot, config, catalog) {
            warn!(?err, "player page failed to start");
            shell.show_empty_state();
        }
    });
    // Polling must outlive this function; the page never cancels it.
    core::mem::forget(poll);
    Ok(())
}
