pub mod config;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod http;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod resolve;

#[cfg(test)]
mod testutil;

// Re-export main types for convenience
pub use config::{Config, Endpoints, FeedEntry, PathPrefix};
pub use error::{
    AssembleError, ConfigError, EntryError, FetchError, NormalizeError, OutputError, ResolveError,
};
pub use feed::{FeedOptions, assemble, write_feed};
pub use fetch::{FetchedPodcast, MetadataFetcher, RawEpisode};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use normalize::{EpisodeRecord, PodcastRecord, normalize, normalize_podcast};
pub use pipeline::{GenerateResult, generate_feed, generate_feeds};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use resolve::{PlatformId, ReferenceKind, ResolvedReference, Resolver};
