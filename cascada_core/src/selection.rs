// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Channel selection and the controller the presentation shell talks to.
//!
//! The channel is fixed for the lifetime of the page. The only thing the
//! viewer can change is which of the channel's servers is active, and every
//! change (including tapping the server that is already active) restarts the
//! fallback cascade from the top.

use tracing::{debug, info};

use crate::catalog::{Catalog, ServerDescriptor};
use crate::config::PlayerConfig;
use crate::engine::{EngineState, FallbackEngine, Signal, SignalOutcome};
use crate::host::PlaybackHost;
use crate::query::PageQuery;
use crate::trace::{AttemptCause, TraceSink};

/// The viewed channel, its servers, and which one is active.
///
/// The active index is always in bounds unless the list is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelSelection {
    channel: String,
    servers: Vec<ServerDescriptor>,
    active: usize,
}

impl ChannelSelection {
    /// Creates a selection, clamping `initial` into bounds.
    #[must_use]
    pub fn new(channel: impl Into<String>, servers: Vec<ServerDescriptor>, initial: usize) -> Self {
        let active = initial.min(servers.len().saturating_sub(1));
        Self {
            channel: channel.into(),
            servers,
            active,
        }
    }

    /// Channel key.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Page title for the channel.
    #[must_use]
    pub fn title(&self) -> String {
        format!("Canal: {}", self.channel)
    }

    /// Servers in catalog order.
    #[must_use]
    pub fn servers(&self) -> &[ServerDescriptor] {
        &self.servers
    }

    /// Server button labels, in catalog order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.servers.iter().map(ServerDescriptor::name)
    }

    /// Returns `true` if there is nothing to play.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Index of the active server.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// The active server, if the list is not empty.
    #[must_use]
    pub fn active_server(&self) -> Option<&ServerDescriptor> {
        self.servers.get(self.active)
    }

    /// Makes `index` (clamped) the active server and returns it. `None` for an
    /// empty list.
    pub fn select(&mut self, index: usize) -> Option<usize> {
        if self.servers.is_empty() {
            return None;
        }
        self.active = index.min(self.servers.len() - 1);
        Some(self.active)
    }
}

/// Outcome of reading the catalog at page load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Startup {
    /// The catalog has no channels; show the placeholder, touch nothing else.
    NoChannels,
    /// The channel resolved but has no playable server.
    NoServers {
        /// Resolved channel key.
        channel: String,
    },
    /// Ready to play.
    Ready(ChannelSelection),
}

impl Startup {
    /// Resolves the channel and initial server from the catalog and the page
    /// query.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog, query: &PageQuery) -> Self {
        let Some(channel) = catalog.resolve_channel(query.channel()) else {
            info!("catalog has no channels");
            return Self::NoChannels;
        };
        let servers = catalog.servers(channel);
        if servers.is_empty() {
            info!(channel, "channel has no playable servers");
            return Self::NoServers {
                channel: channel.to_owned(),
            };
        }
        let initial = query.server_index(servers.len());
        debug!(channel, servers = servers.len(), initial, "channel resolved");
        Self::Ready(ChannelSelection::new(channel, servers, initial))
    }

    /// Page title, when a channel resolved.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        match self {
            Self::NoChannels => None,
            Self::NoServers { channel } => Some(format!("Canal: {channel}")),
            Self::Ready(selection) => Some(selection.title()),
        }
    }
}

/// Ties the selection, the engine, and the host together.
///
/// All calls are synchronous: by the time one returns, the previous resource
/// has been released and the new one acquired, so rapid repeated selections
/// never overlap.
pub struct Controller<H: PlaybackHost> {
    selection: ChannelSelection,
    engine: FallbackEngine<H>,
    host: H,
}

impl<H: PlaybackHost> core::fmt::Debug for Controller<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("selection", &self.selection)
            .field("engine", &self.engine)
            .field("host", &"PlaybackHost")
            .finish()
    }
}

impl<H: PlaybackHost> Controller<H> {
    /// Creates an idle controller. Call [`start`](Self::start) to play.
    #[must_use]
    pub fn new(selection: ChannelSelection, host: H, config: PlayerConfig) -> Self {
        Self {
            selection,
            engine: FallbackEngine::new(config),
            host,
        }
    }

    /// Installs a transition sink on the engine.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.engine.set_trace_sink(sink);
    }

    /// Starts playback of the initially selected server.
    pub fn start(&mut self) {
        let index = self.selection.active_index();
        self.attempt(index, AttemptCause::Startup);
    }

    /// Makes server `index` (clamped) active and restarts the cascade from
    /// the rich tier. Re-selecting the active server reloads it.
    ///
    /// Returns the index that became active, or `None` for an empty list.
    pub fn select_server(&mut self, index: usize) -> Option<usize> {
        let previous = self.selection.active_index();
        let index = self.selection.select(index)?;
        let cause = if index == previous {
            AttemptCause::Reload
        } else {
            AttemptCause::Selection
        };
        self.attempt(index, cause);
        Some(index)
    }

    /// Routes a library notification to the engine.
    pub fn signal(&mut self, signal: Signal) -> SignalOutcome {
        self.engine.handle(&mut self.host, signal)
    }

    /// Releases the active resource (page teardown).
    pub fn teardown(&mut self) {
        self.engine.release(&mut self.host);
    }

    /// Engine state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    /// The channel selection.
    #[must_use]
    pub fn selection(&self) -> &ChannelSelection {
        &self.selection
    }

    /// The engine.
    #[must_use]
    pub fn engine(&self) -> &FallbackEngine<H> {
        &self.engine
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably (for test doubles and platform wiring).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn attempt(&mut self, index: usize, cause: AttemptCause) {
        let Some(server) = self.selection.servers.get(index) else {
            return;
        };
        let title = self.selection.channel.as_str();
        self.engine
            .attempt(&mut self.host, server, title, index, cause);
    }
}
