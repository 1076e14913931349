mod legacy;
mod podcast;

pub use legacy::{LegacyEpisode, parse_legacy_xml};
pub use podcast::{EnclosureHead, FetchedPodcast, MetadataFetcher, RawEpisode};
