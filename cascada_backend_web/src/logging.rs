// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routes `tracing` output to the browser console.
//!
//! Each formatted event becomes one console call at the matching level, so
//! the browser's level filter keeps working.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;
use web_sys::console;

/// [`MakeWriter`] that hands out one [`ConsoleWriter`] per event.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one formatted event and emits it to the console on drop.
#[derive(Debug)]
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let Some(line) = console_line(&text) else {
            return;
        };
        let line = JsValue::from_str(line);
        match self.level {
            Level::ERROR => console::error_1(&line),
            Level::WARN => console::warn_1(&line),
            Level::INFO => console::info_1(&line),
            Level::DEBUG => console::debug_1(&line),
            Level::TRACE => console::log_1(&line),
        }
    }
}

/// Strips the trailing newline the formatter appends. Empty events are
/// dropped.
fn console_line(text: &str) -> Option<&str> {
    let line = text.trim_end_matches(['\n', '\r']);
    (!line.is_empty()).then_some(line)
}

/// Installs a global subscriber writing to the console.
///
/// Calling it again is harmless; only the first call installs a subscriber.
pub fn init(max_level: Level) {
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(max_level)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .try_init();
    if installed.is_err() {
        tracing::debug!("console logging already initialized");
    }
}
