// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Player configuration.
//!
//! Every field has a default, so a page may override any subset with a JSON
//! object. Unknown fields are ignored.

use serde::Deserialize;
use tracing::Level;

/// Error returned by [`PlayerConfig::from_json`].
#[derive(Debug, thiserror::Error)]
#[error("invalid player configuration: {0}")]
pub struct ConfigError(#[from] serde_json::Error);

/// Tunables for the playback tiers and the presentation shell.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerConfig {
    /// Live-edge sync window of the rich player, in seconds.
    pub live_sync_duration: u32,
    /// Audio track selected when the rich player starts playing.
    pub preferred_audio_track: u32,
    /// Rich-player fit mode.
    pub stretching: String,
    /// How long to wait for the catalog global, in milliseconds.
    pub catalog_wait_ms: u32,
    /// Catalog poll interval, in milliseconds.
    pub catalog_poll_ms: u32,
    /// Minimum touch delta (CSS px) for a swipe to count.
    pub swipe_threshold: f64,
    /// `allow` attribute of the opaque frame.
    pub frame_allow: String,
    /// Ask the adaptive-bitrate polyfill for low-latency mode.
    pub low_latency: bool,
    /// Let the adaptive-bitrate polyfill transmux in a worker.
    pub enable_worker: bool,
    /// Most verbose log level (`error` .. `trace`); see
    /// [`max_log_level`](Self::max_log_level).
    pub log_level: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            live_sync_duration: 3,
            preferred_audio_track: 1,
            stretching: "uniform".to_owned(),
            catalog_wait_ms: 3000,
            catalog_poll_ms: 150,
            swipe_threshold: 30.0,
            frame_allow:
                "autoplay; fullscreen; picture-in-picture; clipboard-write; encrypted-media"
                    .to_owned(),
            low_latency: true,
            enable_worker: true,
            log_level: "info".to_owned(),
        }
    }
}

impl PlayerConfig {
    /// Parses an override object on top of the defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses [`log_level`](Self::log_level), falling back to `INFO`.
    #[must_use]
    pub fn max_log_level(&self) -> Level {
        self.log_level.trim().parse().unwrap_or(Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(PlayerConfig::from_json("{}").unwrap(), PlayerConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            PlayerConfig::from_json(r#"{ "liveSyncDuration": 6, "unknown": true }"#).unwrap();
        assert_eq!(config.live_sync_duration, 6);
        assert_eq!(config.catalog_wait_ms, 3000);
        assert!(config.low_latency);
    }

    #[test]
    fn log_level_defaults_to_info() {
        assert_eq!(PlayerConfig::default().max_log_level(), Level::INFO);
    }

    #[test]
    fn log_level_override_is_parsed() {
        let config = PlayerConfig::from_json(r#"{ "logLevel": "debug" }"#).unwrap();
        assert_eq!(config.max_log_level(), Level::DEBUG);
        let config = PlayerConfig::from_json(r#"{ "logLevel": "WARN" }"#).unwrap();
        assert_eq!(config.max_log_level(), Level::WARN);
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let config = PlayerConfig::from_json(r#"{ "logLevel": "chatty" }"#).unwrap();
        assert_eq!(config.max_log_level(), Level::INFO);
    }

    #[test]
    fn wrong_types_are_errors() {
        assert!(PlayerConfig::from_json(r#"{ "catalogPollMs": "soon" }"#).is_err());
    }
}
