// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The active playback resource and its generation token.

use core::fmt;

use serde::Serialize;

use crate::host::PlaybackHost;
use crate::resolve::Tier;

/// Monotonic token identifying one acquisition.
///
/// Every resource the engine acquires gets a fresh generation. Callbacks
/// carry the generation they were registered with; a mismatch with the
/// active resource means the callback outlived its resource.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// The generation before any acquisition.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw value (for hosts that round-trip it through foreign code).
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the following generation.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Exactly one tier's live resources, or none.
///
/// Transitions go through [`release`](Self::release), which hands the
/// handle back to the host before anything new is acquired.
pub enum ActivePlayback<H: PlaybackHost> {
    /// Nothing is resident.
    None,
    /// The rich player is resident.
    Rich {
        /// Host handle.
        handle: H::Rich,
        /// Acquisition token.
        generation: Generation,
        /// URL of the first source; decides where a fatal error demotes to.
        file: String,
    },
    /// A native `<video>` surface is resident.
    Video {
        /// Host handle.
        handle: H::Video,
        /// Acquisition token.
        generation: Generation,
        /// Segmented stream index being played.
        url: String,
    },
    /// An opaque frame is resident.
    Frame {
        /// Host handle.
        handle: H::Frame,
        /// Acquisition token.
        generation: Generation,
        /// Embedded URL.
        url: String,
    },
}

impl<H: PlaybackHost> ActivePlayback<H> {
    /// The tier of the resident resource.
    #[must_use]
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::None => None,
            Self::Rich { .. } => Some(Tier::Rich),
            Self::Video { .. } => Some(Tier::NativeAdaptive),
            Self::Frame { .. } => Some(Tier::OpaqueFrame),
        }
    }

    /// The acquisition token of the resident resource.
    #[must_use]
    pub fn generation(&self) -> Option<Generation> {
        match self {
            Self::None => None,
            Self::Rich { generation, .. }
            | Self::Video { generation, .. }
            | Self::Frame { generation, .. } => Some(*generation),
        }
    }

    /// Returns `true` if nothing is resident.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Hands the resource back to `host`. Returns the tier and generation
    /// that were released, if any.
    pub fn release(self, host: &mut H) -> Option<(Tier, Generation)> {
        match self {
            Self::None => None,
            Self::Rich {
                handle, generation, ..
            } => {
                host.release_rich(handle);
                Some((Tier::Rich, generation))
            }
            Self::Video {
                handle, generation, ..
            } => {
                host.release_video(handle);
                Some((Tier::NativeAdaptive, generation))
            }
            Self::Frame {
                handle, generation, ..
            } => {
                host.release_frame(handle);
                Some((Tier::OpaqueFrame, generation))
            }
        }
    }
}

impl<H: PlaybackHost> Default for ActivePlayback<H> {
    fn default() -> Self {
        Self::None
    }
}

impl<H: PlaybackHost> fmt::Debug for ActivePlayback<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Rich {
                generation, file, ..
            } => f
                .debug_struct("Rich")
                .field("generation", generation)
                .field("file", file)
                .finish_non_exhaustive(),
            Self::Video {
                generation, url, ..
            } => f
                .debug_struct("Video")
                .field("generation", generation)
                .field("url", url)
                .finish_non_exhaustive(),
            Self::Frame {
                generation, url, ..
            } => f
                .debug_struct("Frame")
                .field("generation", generation)
                .field("url", url)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_are_monotonic() {
        let first = Generation::ZERO.next();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.get(), 2);
        assert_eq!(Generation::from_raw(2), second);
    }

    #[test]
    fn generation_debug_is_compact() {
        assert_eq!(format!("{:?}", Generation::from_raw(7)), "gen7");
    }
}
