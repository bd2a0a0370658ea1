// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page globals: the server catalog, configuration overrides, and the
//! bounded wait for a catalog script that loads after the page.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use cascada_core::catalog::Catalog;
use cascada_core::config::PlayerConfig;
use cascada_core::wait::{CatalogWait, WaitStep};
use js_sys::JSON;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::js;

/// Global holding the channel catalog.
pub const CATALOG_GLOBAL: &str = "ConfiguracionCanales";

/// Optional global holding a [`PlayerConfig`] override object.
pub const CONFIG_GLOBAL: &str = "CascadaConfig";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, delay_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

fn global_json(name: &str) -> Option<String> {
    let value = js::global(name)?;
    JSON::stringify(&value).ok()?.as_string()
}

/// Reads the catalog global. A missing or malformed catalog reads as empty.
#[must_use]
pub fn read_catalog() -> Catalog {
    let Some(text) = global_json(CATALOG_GLOBAL) else {
        return Catalog::default();
    };
    Catalog::from_json(&text).unwrap_or_else(|err| {
        warn!(%err, global = CATALOG_GLOBAL, "ignoring malformed catalog");
        Catalog::default()
    })
}

/// Reads the configuration override global, falling back to defaults.
#[must_use]
pub fn read_config() -> PlayerConfig {
    let Some(text) = global_json(CONFIG_GLOBAL) else {
        return PlayerConfig::default();
    };
    PlayerConfig::from_json(&text).unwrap_or_else(|err| {
        warn!(%err, global = CONFIG_GLOBAL, "ignoring malformed player config");
        PlayerConfig::default()
    })
}

type DoneCallback = Box<dyn FnOnce(Option<Catalog>)>;

struct PollInner {
    wait: CatalogWait,
    started: f64,
    timer: Cell<Option<i32>>,
    closure: RefCell<Option<Closure<dyn FnMut()>>>,
    done: RefCell<Option<DoneCallback>>,
}

/// Polls for [`CATALOG_GLOBAL`] until it appears or the wait expires.
///
/// The first poll runs inside [`start`](Self::start). `on_done` receives the
/// catalog, or `None` when the deadline passed, and is called at most once.
/// Dropping the handle or calling [`cancel`](Self::cancel) stops polling
/// without calling `on_done`.
pub struct CatalogPoll {
    inner: Rc<PollInner>,
}

impl core::fmt::Debug for CatalogPoll {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CatalogPoll")
            .field("wait", &self.inner.wait)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl CatalogPoll {
    /// Starts polling.
    pub fn start(wait: CatalogWait, on_done: impl FnOnce(Option<Catalog>) + 'static) -> Self {
        let inner = Rc::new(PollInner {
            wait,
            started: performance_now(),
            timer: Cell::new(None),
            closure: RefCell::new(None),
            done: RefCell::new(Some(Box::new(on_done))),
        });

        let weak: Weak<PollInner> = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.timer.set(None);
                poll(&inner);
            }
        }) as Box<dyn FnMut()>);
        *inner.closure.borrow_mut() = Some(closure);

        poll(&inner);
        Self { inner }
    }

    /// Returns `true` while `on_done` has not run and polling was not
    /// cancelled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.done.borrow().is_some()
    }

    /// Stops polling; `on_done` is never called.
    pub fn cancel(&self) {
        if let Some(id) = self.inner.timer.take() {
            clear_timeout(id);
        }
        self.inner.done.borrow_mut().take();
    }
}

impl Drop for CatalogPoll {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn poll(inner: &Rc<PollInner>) {
    let elapsed = performance_now() - inner.started;
    let available = js::global(CATALOG_GLOBAL).is_some();
    match inner.wait.step(elapsed, available) {
        WaitStep::Ready => finish(inner, Some(read_catalog())),
        WaitStep::GiveUp => {
            warn!(waited_ms = elapsed, "catalog did not arrive");
            finish(inner, None);
        }
        WaitStep::RetryIn(delay_ms) => {
            debug!(elapsed_ms = elapsed, delay_ms, "catalog not loaded yet");
            if let Some(closure) = inner.closure.borrow().as_ref() {
                let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
                inner
                    .timer
                    .set(Some(set_timeout(closure.as_ref().unchecked_ref(), delay)));
            }
        }
    }
}

fn finish(inner: &PollInner, catalog: Option<Catalog>) {
    let done = inner.done.borrow_mut().take();
    if let Some(done) = done {
        done(catalog);
    }
}
