// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use rss::extension::atom::{AtomExtension, Link};
use rss::extension::itunes::{ITunesChannelExtensionBuilder, ITunesItemExtensionBuilder};
use rss::{Channel, ChannelBuilder, EnclosureBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder};

use crate::config::DEFAULT_LANGUAGE;
use crate::error::AssembleError;
use crate::normalize::{EpisodeRecord, Explicit, PodcastRecord};

/// Value of the channel's `generator` element
pub const GENERATOR: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

const ITUNES_NAMESPACE: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";
const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Channel-level settings that do not come from the platform
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub language: String,
    pub generator: String,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            generator: GENERATOR.to_string(),
        }
    }
}

/// Build and serialize the RSS document for a podcast, stamped with the current time
pub fn assemble(
    podcast: &PodcastRecord,
    self_url: &str,
    options: &FeedOptions,
) -> Result<Vec<u8>, AssembleError> {
    assemble_at(podcast, self_url, options, Utc::now().fixed_offset())
}

/// Build and serialize the RSS document with an explicit `lastBuildDate`
pub fn assemble_at(
    podcast: &PodcastRecord,
    self_url: &str,
    options: &FeedOptions,
    build_time: DateTime<FixedOffset>,
) -> Result<Vec<u8>, AssembleError> {
    let channel = build_channel(podcast, self_url, options, build_time)?;
    Ok(channel.write_to(Vec::new())?)
}

/// Build the RSS channel for a podcast.
///
/// Items keep the order of `podcast.episodes`. A podcast without episodes is
/// an error rather than an empty channel.
pub fn build_channel(
    podcast: &PodcastRecord,
    self_url: &str,
    options: &FeedOptions,
    build_time: DateTime<FixedOffset>,
) -> Result<Channel, AssembleError> {
    let first = podcast
        .episodes
        .first()
        .ok_or_else(|| AssembleError::EmptyPodcast {
            title: podcast.title.clone(),
        })?;

    let link = podcast
        .link
        .clone()
        .or_else(|| first.link.clone())
        .unwrap_or_else(|| self_url.to_string());

    let image = podcast.image_url.as_ref().map(|url| {
        ImageBuilder::default()
            .url(url.clone())
            .title(podcast.title.clone())
            .link(link.clone())
            .build()
    });

    let explicit = if podcast.episodes.iter().any(|e| e.explicit == Explicit::Yes) {
        Explicit::Yes
    } else {
        Explicit::No
    };
    let itunes = ITunesChannelExtensionBuilder::default()
        .image(podcast.image_url.clone())
        .explicit(Some(explicit.as_str().to_string()))
        .build();

    let namespaces = BTreeMap::from([
        ("itunes".to_string(), ITUNES_NAMESPACE.to_string()),
        ("content".to_string(), CONTENT_NAMESPACE.to_string()),
        ("atom".to_string(), ATOM_NAMESPACE.to_string()),
    ]);

    Ok(ChannelBuilder::default()
        .namespaces(namespaces)
        .title(podcast.title.clone())
        .description(podcast.description.clone())
        .link(link)
        .image(image)
        .language(Some(options.language.clone()))
        .generator(Some(options.generator.clone()))
        .last_build_date(Some(build_time.to_rfc2822()))
        .atom_ext(Some(self_link(self_url)))
        .itunes_ext(Some(itunes))
        .items(podcast.episodes.iter().map(build_item).collect::<Vec<_>>())
        .build())
}

fn self_link(self_url: &str) -> AtomExtension {
    let mut link = Link::default();
    link.set_href(self_url);
    link.set_rel("self");
    link.set_mime_type(Some("application/rss+xml".to_string()));

    let mut atom = AtomExtension::default();
    atom.set_links(vec![link]);
    atom
}

/// One `<item>`: text elements plus the attribute-only `<enclosure>`
fn build_item(episode: &EpisodeRecord) -> Item {
    let guid = GuidBuilder::default()
        .value(episode.guid.value.clone())
        .permalink(episode.guid.is_permalink)
        .build();

    let enclosure = EnclosureBuilder::default()
        .url(episode.audio.url.clone())
        .length(episode.audio.length_bytes.clone())
        .mime_type(episode.audio.mime_type.clone())
        .build();

    let itunes = ITunesItemExtensionBuilder::default()
        .duration(Some(episode.duration()))
        .explicit(Some(episode.explicit.as_str().to_string()))
        .image(episode.image_url.clone())
        .build();

    ItemBuilder::default()
        .title(Some(episode.title.clone()))
        .pub_date(Some(episode.pub_date()))
        .guid(Some(guid))
        .link(episode.link.clone())
        .description(Some(episode.description.clone()))
        .content(Some(episode.description.clone()))
        .enclosure(Some(enclosure))
        .itunes_ext(Some(itunes))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{Audio, Guid};

    fn make_episode(n: u32) -> EpisodeRecord {
        EpisodeRecord {
            title: format!("Jakso {n}"),
            published_at: DateTime::parse_from_rfc3339("2022-09-20T22:32:58+00:00").unwrap(),
            guid: Guid {
                value: format!("https://www.supla.test/podcast/zlatan/jakso-{n}"),
                is_permalink: true,
            },
            link: Some(format!("https://www.supla.test/podcast/zlatan/jakso-{n}")),
            description: format!("Kuvaus {n}"),
            audio: Audio {
                url: format!("https://cdn.test/{n}.mp3"),
                length_bytes: "1234567".to_string(),
                mime_type: "audio/mpeg".to_string(),
            },
            duration_seconds: 125,
            explicit: Explicit::No,
            image_url: None,
        }
    }

    fn make_podcast(episodes: Vec<EpisodeRecord>) -> PodcastRecord {
        PodcastRecord {
            title: "Zlatan".to_string(),
            description: "Viikoittain".to_string(),
            link: Some("https://www.supla.test/podcast/zlatan".to_string()),
            image_url: Some("https://img.test/cover.jpg".to_string()),
            episodes,
        }
    }

    fn build_time() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-15T12:00:00+00:00").unwrap()
    }

    fn render(podcast: &PodcastRecord) -> String {
        let bytes = assemble_at(
            podcast,
            "https://feeds.test/zlatan.rss",
            &FeedOptions::default(),
            build_time(),
        )
        .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn empty_podcast_is_an_error() {
        let result = assemble(
            &make_podcast(vec![]),
            "https://feeds.test/zlatan.rss",
            &FeedOptions::default(),
        );

        assert!(matches!(result, Err(AssembleError::EmptyPodcast { .. })));
    }

    #[test]
    fn document_has_declaration_and_exactly_three_namespaces() {
        let xml = render(&make_podcast(vec![make_episode(1)]));

        assert!(xml.starts_with("<?xml"));
        let channel = Channel::read_from(xml.as_bytes()).unwrap();
        let prefixes: Vec<_> = channel.namespaces().keys().map(String::as_str).collect();
        assert_eq!(prefixes, vec!["atom", "content", "itunes"]);
        assert_eq!(xml.matches("xmlns:").count(), 3);
    }

    #[test]
    fn items_match_episodes_in_order() {
        let episodes = vec![make_episode(3), make_episode(1), make_episode(2)];
        let xml = render(&make_podcast(episodes));

        assert_eq!(xml.matches("<item>").count(), 3);
        let channel = Channel::read_from(xml.as_bytes()).unwrap();
        let titles: Vec<_> = channel.items().iter().filter_map(|i| i.title()).collect();
        assert_eq!(titles, vec!["Jakso 3", "Jakso 1", "Jakso 2"]);
    }

    #[test]
    fn channel_elements_are_filled() {
        let xml = render(&make_podcast(vec![make_episode(1)]));
        let channel = Channel::read_from(xml.as_bytes()).unwrap();

        assert_eq!(channel.title(), "Zlatan");
        assert_eq!(channel.description(), "Viikoittain");
        assert_eq!(channel.link(), "https://www.supla.test/podcast/zlatan");
        assert_eq!(channel.language(), Some("fi-FI"));
        assert_eq!(channel.generator(), Some(GENERATOR));
        assert_eq!(channel.last_build_date(), Some("Mon, 15 Jan 2024 12:00:00 +0000"));

        let image = channel.image().unwrap();
        assert_eq!(image.url(), "https://img.test/cover.jpg");
        assert_eq!(image.title(), "Zlatan");
        assert_eq!(image.link(), "https://www.supla.test/podcast/zlatan");

        let links = channel.atom_ext().unwrap().links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href(), "https://feeds.test/zlatan.rss");
        assert_eq!(links[0].rel(), "self");
    }

    #[test]
    fn item_elements_are_filled() {
        let mut episode = make_episode(1);
        episode.image_url = Some("https://img.test/1.jpg".to_string());
        let xml = render(&make_podcast(vec![episode]));
        let channel = Channel::read_from(xml.as_bytes()).unwrap();
        let item = &channel.items()[0];

        assert_eq!(item.pub_date(), Some("Tue, 20 Sep 2022 22:32:58 +0000"));
        assert_eq!(
            item.guid().map(|g| g.value()),
            Some("https://www.supla.test/podcast/zlatan/jakso-1")
        );
        assert!(item.guid().unwrap().is_permalink());
        assert_eq!(item.description(), Some("Kuvaus 1"));
        assert_eq!(item.content(), Some("Kuvaus 1"));

        let enclosure = item.enclosure().unwrap();
        assert_eq!(enclosure.url(), "https://cdn.test/1.mp3");
        assert_eq!(enclosure.length(), "1234567");
        assert_eq!(enclosure.mime_type(), "audio/mpeg");

        let itunes = item.itunes_ext().unwrap();
        assert_eq!(itunes.duration(), Some("0:02:05"));
        assert_eq!(itunes.explicit(), Some("no"));
        assert_eq!(itunes.image(), Some("https://img.test/1.jpg"));
    }

    #[test]
    fn enclosure_is_attribute_only() {
        let xml = render(&make_podcast(vec![make_episode(1)]));
        assert!(xml.contains("<enclosure "));
        assert!(!xml.contains("</enclosure>"));
    }

    #[test]
    fn item_without_link_omits_it() {
        let mut episode = make_episode(1);
        episode.link = None;
        episode.guid = Guid {
            value: "supla:episode:1".to_string(),
            is_permalink: false,
        };
        let mut podcast = make_podcast(vec![episode]);
        podcast.link = None;

        let xml = render(&podcast);
        let channel = Channel::read_from(xml.as_bytes()).unwrap();
        let item = &channel.items()[0];

        assert!(item.link().is_none());
        assert!(!item.guid().unwrap().is_permalink());
        // Without any page link the channel points at the feed itself
        assert_eq!(channel.link(), "https://feeds.test/zlatan.rss");
    }

    #[test]
    fn channel_link_falls_back_to_first_episode() {
        let mut podcast = make_podcast(vec![make_episode(2), make_episode(1)]);
        podcast.link = None;

        let xml = render(&podcast);
        let channel = Channel::read_from(xml.as_bytes()).unwrap();

        assert_eq!(channel.link(), "https://www.supla.test/podcast/zlatan/jakso-2");
    }

    #[test]
    fn channel_is_explicit_when_any_episode_is() {
        let mut explicit = make_episode(2);
        explicit.explicit = Explicit::Yes;
        let xml = render(&make_podcast(vec![make_episode(1), explicit]));
        let channel = Channel::read_from(xml.as_bytes()).unwrap();

        assert_eq!(channel.itunes_ext().unwrap().explicit(), Some("yes"));
    }
}
