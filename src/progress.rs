// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use std::sync::Arc;

/// Events emitted during feed generation for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Work on a configured feed entry begins
    EntryStarted {
        shortname: String,
        source_ref: String,
    },

    /// The entry's reference was resolved to a platform id
    ReferenceResolved {
        shortname: String,
        /// Display form of the platform id
        platform_id: String,
        /// Whether the reference named an episode rather than a podcast
        from_episode: bool,
    },

    /// Podcast level metadata is being fetched
    FetchingPodcast { platform_id: String },

    /// The listing reported more episodes than one page holds.
    /// Only the first page ends up in the feed.
    ListingTruncated {
        platform_id: String,
        total: u64,
        returned: usize,
    },

    /// Details for a single episode are being fetched
    FetchingEpisode {
        episode_id: String,
        /// Index of this episode in the listing
        index: usize,
        /// Number of episodes in the listing page
        total: usize,
    },

    /// A feed file has been written
    FeedWritten {
        shortname: String,
        path: PathBuf,
        item_count: usize,
    },

    /// Generating a feed failed; the run continues with the next entry
    EntryFailed { shortname: String, error: String },

    /// All configured entries were processed
    RunCompleted {
        generated_count: usize,
        failed_count: usize,
    },
}

/// Trait for reporting progress events during feed generation.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
