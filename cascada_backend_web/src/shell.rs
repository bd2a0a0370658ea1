// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The page around the player.
//!
//! [`Shell`] owns the title, the server sheet and its toggle, the fullscreen
//! button, the empty-state placeholder, and the touch gestures on the app
//! root. It never talks to the engine: server buttons call the `on_select`
//! hook the owner passes to [`render_servers`](Shell::render_servers).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cascada_core::gesture::{SheetState, SwipeAction, SwipeTracker, TouchPoint};
use tracing::debug;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{
    AddEventListenerOptions, Document, Event, EventTarget, HtmlElement, OrientationLockType,
    TouchEvent,
};

/// Element ids the page must provide.
pub mod ids {
    /// App root; receives touch gestures and goes fullscreen.
    pub const APP: &str = "app";
    /// Playback container.
    pub const PLAYER: &str = "player";
    /// Channel title.
    pub const TITLE: &str = "title";
    /// Server selection sheet.
    pub const SHEET: &str = "sheet";
    /// Backdrop behind the open sheet.
    pub const SHEET_BACKDROP: &str = "sheet-backdrop";
    /// Grid the server buttons are rendered into.
    pub const SERVERS_GRID: &str = "servers-grid";
    /// Opens the sheet.
    pub const BTN_SERVERS: &str = "btn-servers";
    /// Closes the sheet.
    pub const BTN_CLOSE_SHEET: &str = "btn-close-sheet";
    /// Toggles fullscreen.
    pub const BTN_FULLSCREEN: &str = "btn-fullscreen";
    /// Placeholder shown when there is nothing to play.
    pub const EMPTY_STATE: &str = "empty-state";
}

const SHEET_OPEN_CLASS: &str = "open";
const SERVER_BUTTON_CLASS: &str = "server-btn";
const ACTIVE_CLASS: &str = "active";

/// Handles to the page elements plus sheet and gesture state.
pub struct Shell {
    document: Document,
    app: HtmlElement,
    player: HtmlElement,
    title: HtmlElement,
    sheet: HtmlElement,
    backdrop: HtmlElement,
    servers_grid: HtmlElement,
    btn_servers: HtmlElement,
    btn_close_sheet: HtmlElement,
    btn_fullscreen: HtmlElement,
    empty_state: HtmlElement,
    sheet_state: Cell<SheetState>,
    ignore_rejection: Closure<dyn FnMut(JsValue)>,
}

impl core::fmt::Debug for Shell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Shell")
            .field("sheet_state", &self.sheet_state.get())
            .finish_non_exhaustive()
    }
}

fn element(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<HtmlElement>()
        .map_err(JsValue::from)
}

fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn listen_passive(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    closure.forget();
    Ok(())
}

fn first_changed_touch(event: &Event) -> Option<TouchPoint> {
    let touch = event.dyn_ref::<TouchEvent>()?.changed_touches().get(0)?;
    Some(TouchPoint::new(
        f64::from(touch.screen_x()),
        f64::from(touch.screen_y()),
    ))
}

impl Shell {
    /// Looks up every element listed in [`ids`].
    pub fn from_document(document: Document) -> Result<Self, JsValue> {
        Ok(Self {
            app: element(&document, ids::APP)?,
            player: element(&document, ids::PLAYER)?,
            title: element(&document, ids::TITLE)?,
            sheet: element(&document, ids::SHEET)?,
            backdrop: element(&document, ids::SHEET_BACKDROP)?,
            servers_grid: element(&document, ids::SERVERS_GRID)?,
            btn_servers: element(&document, ids::BTN_SERVERS)?,
            btn_close_sheet: element(&document, ids::BTN_CLOSE_SHEET)?,
            btn_fullscreen: element(&document, ids::BTN_FULLSCREEN)?,
            empty_state: element(&document, ids::EMPTY_STATE)?,
            document,
            sheet_state: Cell::new(SheetState::default()),
            ignore_rejection: Closure::wrap(Box::new(|_reason: JsValue| {})
                as Box<dyn FnMut(JsValue)>),
        })
    }

    /// The document the shell lives in.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The playback container.
    #[must_use]
    pub fn player(&self) -> &HtmlElement {
        &self.player
    }

    /// Sets the channel title text.
    pub fn set_title(&self, text: &str) {
        self.title.set_text_content(Some(text));
    }

    /// Shows the "nothing to play" placeholder.
    pub fn show_empty_state(&self) {
        self.empty_state.set_hidden(false);
    }

    /// Current sheet state.
    #[must_use]
    pub fn sheet_state(&self) -> SheetState {
        self.sheet_state.get()
    }

    /// Opens or closes the server sheet.
    pub fn set_sheet_open(&self, open: bool) {
        self.update_sheet(|state| state.set_open(open));
    }

    /// Applies a classified swipe to the sheet.
    pub fn apply_swipe(&self, action: SwipeAction) {
        self.update_sheet(|state| state.apply(action));
    }

    fn update_sheet(&self, change: impl FnOnce(&mut SheetState) -> bool) {
        let mut state = self.sheet_state.get();
        if !change(&mut state) {
            return;
        }
        self.sheet_state.set(state);

        let open = state.is_open();
        let classes = self.sheet.class_list();
        let _ = if open {
            classes.add_1(SHEET_OPEN_CLASS)
        } else {
            classes.remove_1(SHEET_OPEN_CLASS)
        };
        self.backdrop.set_hidden(!open);
        let _ = self
            .btn_servers
            .set_attribute("aria-expanded", state.aria_expanded());
    }

    /// Replaces the server buttons. Clicking one closes the sheet and calls
    /// `on_select` with its index.
    pub fn render_servers<'a>(
        self: &Rc<Self>,
        labels: impl IntoIterator<Item = &'a str>,
        active: usize,
        on_select: Rc<dyn Fn(usize)>,
    ) -> Result<(), JsValue> {
        self.servers_grid.set_inner_html("");
        for (index, label) in labels.into_iter().enumerate() {
            let button = self.document.create_element("button")?;
            button.set_class_name(SERVER_BUTTON_CLASS);
            if index == active {
                button.class_list().add_1(ACTIVE_CLASS)?;
            }
            button.set_attribute("type", "button")?;
            button.set_attribute("role", "listitem")?;
            button.set_text_content(Some(label));

            let shell = Rc::downgrade(self);
            let on_select = Rc::clone(&on_select);
            listen(&button, "click", move |_event| {
                on_select(index);
                if let Some(shell) = shell.upgrade() {
                    shell.set_sheet_open(false);
                }
            })?;
            self.servers_grid.append_child(&button)?;
        }
        Ok(())
    }

    /// Highlights the button at `active`.
    pub fn mark_active(&self, active: usize) {
        let buttons = self.servers_grid.children();
        for index in 0..buttons.length() {
            if let Some(button) = buttons.item(index) {
                let is_active = usize::try_from(index).is_ok_and(|index| index == active);
                let _ = button
                    .class_list()
                    .toggle_with_force(ACTIVE_CLASS, is_active);
            }
        }
    }

    /// Wires the sheet toggle, close button, and backdrop.
    pub fn bind_sheet_controls(self: &Rc<Self>) -> Result<(), JsValue> {
        for (target, open) in [
            (&self.btn_servers, true),
            (&self.btn_close_sheet, false),
            (&self.backdrop, false),
        ] {
            let shell = Rc::downgrade(self);
            listen(target, "click", move |_event| {
                if let Some(shell) = shell.upgrade() {
                    shell.set_sheet_open(open);
                }
            })?;
        }
        Ok(())
    }

    /// Wires the fullscreen button. Entering fullscreen also tries to lock
    /// landscape orientation; every failure is ignored.
    pub fn bind_fullscreen(self: &Rc<Self>) -> Result<(), JsValue> {
        let shell = Rc::downgrade(self);
        listen(&self.btn_fullscreen, "click", move |_event| {
            if let Some(shell) = shell.upgrade() {
                shell.toggle_fullscreen();
            }
        })?;

        let shell = Rc::downgrade(self);
        listen(&self.document, "fullscreenchange", move |_event| {
            if let Some(shell) = shell.upgrade()
                && shell.document.fullscreen_element().is_some()
            {
                shell.lock_landscape();
            }
        })
    }

    /// Enters fullscreen on the app root, or leaves it.
    pub fn toggle_fullscreen(&self) {
        if self.document.fullscreen_element().is_none() {
            if let Err(err) = self.app.request_fullscreen() {
                debug!(?err, "fullscreen request rejected");
            }
        } else {
            self.document.exit_fullscreen();
        }
    }

    fn lock_landscape(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(screen) = window.screen() else {
            return;
        };
        match screen.orientation().lock(OrientationLockType::Landscape) {
            Ok(promise) => {
                let _ = promise.catch(&self.ignore_rejection);
            }
            Err(err) => debug!(?err, "orientation lock unsupported"),
        }
    }

    /// Wires vertical swipes on the app root to the sheet. Horizontal and
    /// short swipes do nothing.
    pub fn bind_gestures(self: &Rc<Self>, threshold: f64) -> Result<(), JsValue> {
        let tracker = Rc::new(RefCell::new(SwipeTracker::new(threshold)));

        let start = Rc::clone(&tracker);
        listen_passive(&self.app, "touchstart", move |event| {
            if let Some(point) = first_changed_touch(&event) {
                start.borrow_mut().touch_start(point);
            }
        })?;

        let shell = Rc::downgrade(self);
        listen_passive(&self.app, "touchend", move |event| {
            let Some(point) = first_changed_touch(&event) else {
                return;
            };
            let action = tracker.borrow_mut().touch_end(point);
            if let (Some(action), Some(shell)) = (action, shell.upgrade()) {
                shell.apply_swipe(action);
            }
        })
    }
}
