// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Server catalog, delivery-tier resolution and cascading playback fallback
//! for a single-channel live-stream viewer.
//!
//! `cascada_core` holds every decision the viewer makes; the platform crates
//! only perform side effects on its behalf. Nothing here touches the DOM or a
//! player library directly.
//!
//! # Architecture
//!
//! ```text
//!   Catalog + PageQuery
//!       │
//!       ▼
//!   Startup::from_catalog() ──► ChannelSelection ──► Controller::select_server()
//!                                                         │
//!                 ┌───────────────────────────────────────┘
//!                 ▼
//!   resolve(ServerDescriptor) ──► DeliveryPlan ──► FallbackEngine::attempt()
//!                                                       │
//!                 ┌─────────────────────────────────────┘
//!                 ▼
//!   PlaybackHost (acquire / release) ◄── Signal { generation, event }
//! ```
//!
//! **[`catalog`]**: Channel catalog and the server-list normalizer.
//!
//! **[`query`]**: `id` / `s` page parameters and the initial server index.
//!
//! **[`resolve`]**: Pure URL-shape classification into a [`DeliveryPlan`].
//!
//! **[`host`]**: The [`PlaybackHost`] trait that platform backends implement
//! to acquire and release the resources of each tier.
//!
//! **[`resource`]**: The active playback resource as a closed sum type with
//! [`Generation`] tokens used to reject stale callbacks.
//!
//! **[`engine`]**: The [`FallbackEngine`] state machine:
//! `RICH → NATIVE_ADAPTIVE → OPAQUE_FRAME`.
//!
//! **[`selection`]**: Channel selection, startup outcome, and the
//! [`Controller`] the presentation shell talks to.
//!
//! **[`wait`]**, **[`gesture`]**, **[`config`]**: Bounded catalog polling,
//! swipe classification, and player configuration.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait for observing engine
//! transitions.
//!
//! [`DeliveryPlan`]: resolve::DeliveryPlan
//! [`PlaybackHost`]: host::PlaybackHost
//! [`Generation`]: resource::Generation
//! [`FallbackEngine`]: engine::FallbackEngine
//! [`Controller`]: selection::Controller

pub mod catalog;
pub mod config;
pub mod engine;
pub mod gesture;
pub mod host;
pub mod query;
pub mod resolve;
pub mod resource;
pub mod selection;
pub mod trace;
pub mod wait;
