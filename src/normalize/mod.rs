mod episode;
pub mod fields;

pub use episode::{
    Audio, EpisodeRecord, Explicit, Guid, PodcastRecord, absolute_link, episode_guid,
    format_duration, normalize, normalize_podcast, parse_duration, parse_timestamp,
};
