// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for cascada transition
//! traces.
//!
//! This crate provides [`TraceSink`](cascada_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: keeps every event in order, with
//!   [`recorder::RecorderSink::to_json`] for export.

pub mod pretty;
pub mod recorder;
