// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delivery-tier resolution.
//!
//! Classification looks only at the shape of the URL; there is no network
//! probe. [`resolve`] is pure and is re-run on every playback attempt, so a
//! newly selected server always starts again from [`Tier::Rich`].

use serde::Serialize;

use crate::catalog::ServerDescriptor;

/// Substring identifying a segmented stream index (HLS playlist).
pub const SEGMENTED_INDEX_MARKER: &str = ".m3u8";

/// Substring identifying a manifest description (DASH MPD).
pub const MANIFEST_DESCRIPTION_MARKER: &str = ".mpd";

/// One playback delivery strategy, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Rich embedded player.
    Rich,
    /// Native `<video>`, optionally driven by an adaptive-bitrate polyfill.
    NativeAdaptive,
    /// Sandboxed embedded frame; the tier of last resort.
    OpaqueFrame,
}

impl Tier {
    /// Short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rich => "RICH",
            Self::NativeAdaptive => "NATIVE_ADAPTIVE",
            Self::OpaqueFrame => "OPAQUE_FRAME",
        }
    }
}

/// The adaptive-media manifest family of a direct media URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFamily {
    /// Segmented stream index (`.m3u8`).
    SegmentedIndex,
    /// Manifest description (`.mpd`).
    ManifestDescription,
}

impl MediaFamily {
    /// Detects the family from URL content. The segmented marker wins when
    /// both are present.
    #[must_use]
    pub fn detect(url: &str) -> Option<Self> {
        if is_segmented_index(url) {
            Some(Self::SegmentedIndex)
        } else if url.contains(MANIFEST_DESCRIPTION_MARKER) {
            Some(Self::ManifestDescription)
        } else {
            None
        }
    }
}

/// Returns `true` if `url` carries the segmented-stream-index marker.
#[must_use]
pub fn is_segmented_index(url: &str) -> bool {
    url.contains(SEGMENTED_INDEX_MARKER)
}

/// Clear-key content decryption descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearKey {
    /// Key id (`k1`).
    pub key_id: String,
    /// Key (`k2`).
    pub key: String,
}

/// A source handed to the rich player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaSource {
    /// Media URL.
    pub file: String,
    /// Manifest family of `file`.
    pub family: MediaFamily,
    /// Decryption descriptor, when one applies.
    pub clear_key: Option<ClearKey>,
}

/// The outcome of resolution for one server descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryPlan {
    /// Direct media: start with the rich player on these sources.
    Rich(Vec<MediaSource>),
    /// Not directly playable: embed this URL in an opaque frame.
    OpaqueFrame(String),
}

impl DeliveryPlan {
    /// The tier this plan starts at.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        match self {
            Self::Rich(_) => Tier::Rich,
            Self::OpaqueFrame(_) => Tier::OpaqueFrame,
        }
    }
}

/// Resolves the starting delivery plan for `server`.
///
/// Content keys are honoured only for manifest descriptions. A segmented index
/// with both keys configured still resolves without a decryption descriptor;
/// this matches deployed catalogs and is kept deliberately asymmetric until the
/// intended key policy for HLS sources is confirmed.
#[must_use]
pub fn resolve(server: &ServerDescriptor) -> DeliveryPlan {
    let url = server.url();
    match MediaFamily::detect(url) {
        Some(MediaFamily::SegmentedIndex) => DeliveryPlan::Rich(vec![MediaSource {
            file: url.to_owned(),
            family: MediaFamily::SegmentedIndex,
            clear_key: None,
        }]),
        Some(MediaFamily::ManifestDescription) => DeliveryPlan::Rich(vec![MediaSource {
            file: url.to_owned(),
            family: MediaFamily::ManifestDescription,
            clear_key: server.content_key().map(|(key_id, key)| ClearKey {
                key_id: key_id.to_owned(),
                key: key.to_owned(),
            }),
        }]),
        None => DeliveryPlan::OpaqueFrame(url.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(url: &str) -> ServerDescriptor {
        ServerDescriptor::new("A", url).with_keys(Some("kid".into()), Some("key".into()))
    }

    #[test]
    fn segmented_index_resolves_rich_without_keys() {
        let plan = resolve(&keyed("http://x/stream.m3u8?token=1"));
        assert_eq!(plan.tier(), Tier::Rich);
        let DeliveryPlan::Rich(sources) = plan else {
            panic!("expected rich plan");
        };
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].family, MediaFamily::SegmentedIndex);
        assert_eq!(sources[0].clear_key, None);
    }

    #[test]
    fn manifest_description_carries_clear_key() {
        let DeliveryPlan::Rich(sources) = resolve(&keyed("http://x/live.mpd")) else {
            panic!("expected rich plan");
        };
        assert_eq!(
            sources[0].clear_key,
            Some(ClearKey {
                key_id: "kid".into(),
                key: "key".into()
            })
        );
    }

    #[test]
    fn manifest_description_without_keys_is_plain() {
        let DeliveryPlan::Rich(sources) = resolve(&ServerDescriptor::new("A", "http://x/live.mpd"))
        else {
            panic!("expected rich plan");
        };
        assert_eq!(sources[0].clear_key, None);
    }

    #[test]
    fn other_urls_are_opaque() {
        assert_eq!(
            resolve(&ServerDescriptor::new("B", "http://y/embed")),
            DeliveryPlan::OpaqueFrame("http://y/embed".into())
        );
        assert_eq!(
            resolve(&ServerDescriptor::new("C", "")),
            DeliveryPlan::OpaqueFrame(String::new())
        );
    }

    #[test]
    fn segmented_marker_wins_over_manifest_marker() {
        assert_eq!(
            MediaFamily::detect("http://x/a.mpd/b.m3u8"),
            Some(MediaFamily::SegmentedIndex)
        );
    }

    #[test]
    fn clear_key_serializes_in_player_shape() {
        let key = ClearKey {
            key_id: "a".into(),
            key: "b".into(),
        };
        assert_eq!(
            serde_json::to_value(&key).unwrap(),
            serde_json::json!({ "keyId": "a", "key": "b" })
        );
    }
}
