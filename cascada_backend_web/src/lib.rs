// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for cascada.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomHost`]: the [`PlaybackHost`] that builds each tier inside the
//!   playback container (JW Player, `<video>` with native HLS or hls.js,
//!   `<iframe>`).
//! - [`SignalMailbox`]: hands library callbacks back to the controller
//!   without re-entering it.
//! - [`Shell`]: the page around the player (title, server sheet,
//!   fullscreen, swipe gestures, empty state).
//! - [`CatalogPoll`]: bounded wait for the `ConfiguracionCanales` global.
//! - [`logging::init`]: routes `tracing` output to the browser console.
//!
//! Everything compiles natively so the pure helpers can be unit tested, but
//! the DOM-facing parts only work inside a browser.

mod adaptive;
mod frame;
mod globals;
mod host;
mod js;
mod mailbox;
mod rich;
mod shell;

pub mod logging;

pub use adaptive::{SEGMENTED_MIME, VideoSurface, polyfill_config};
pub use cascada_core::host::PlaybackHost;
pub use frame::Frame;
pub use globals::{CATALOG_GLOBAL, CONFIG_GLOBAL, CatalogPoll, read_catalog, read_config};
pub use host::DomHost;
pub use mailbox::SignalMailbox;
pub use rich::{RichPlayer, rich_config};
pub use shell::{Shell, ids};
