// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::Bytes;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName};
use serde_json::Value;

use crate::config::Endpoints;
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::normalize::fields::{self, FieldAliases};
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::resolve::PlatformId;

use super::legacy::parse_legacy_xml;

/// Enclosure details taken from a HEAD request on the audio file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnclosureHead {
    pub content_length: Option<String>,
    pub content_type: Option<String>,
}

impl EnclosureHead {
    fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            content_length: header(CONTENT_LENGTH),
            content_type: header(CONTENT_TYPE),
        }
    }
}

/// An episode as delivered by the platform, before normalization
#[derive(Debug, Clone)]
pub struct RawEpisode {
    pub id: String,
    /// Permalink from the listing, if it had one
    pub permalink: Option<String>,
    /// Payload of the episode detail endpoint
    pub detail: Value,
    pub enclosure_head: Option<EnclosureHead>,
}

/// Podcast metadata plus its first page of raw episodes
#[derive(Debug, Clone)]
pub struct FetchedPodcast {
    pub id: PlatformId,
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub image_url: Option<String>,
    /// Number of episodes the listing reported, which may exceed `episodes.len()`
    pub total_hits: u64,
    /// Reverse chronological, as listed
    pub episodes: Vec<RawEpisode>,
}

struct EpisodeSummary {
    id: String,
    permalink: Option<String>,
}

struct Listing {
    total: u64,
    summaries: Vec<EpisodeSummary>,
}

/// Performs the platform's chain of metadata requests for one podcast.
///
/// Requests are issued one after another; the first failure aborts the fetch.
pub struct MetadataFetcher<'a, C: HttpClient> {
    client: &'a C,
    endpoints: &'a Endpoints,
    reporter: SharedProgressReporter,
}

impl<'a, C: HttpClient> MetadataFetcher<'a, C> {
    pub fn new(client: &'a C, endpoints: &'a Endpoints, reporter: SharedProgressReporter) -> Self {
        Self {
            client,
            endpoints,
            reporter,
        }
    }

    /// Fetch podcast metadata, the first `limit` episodes and their details
    pub async fn fetch_podcast(
        &self,
        id: PlatformId,
        limit: u32,
    ) -> Result<FetchedPodcast, FetchError> {
        let id_str = id.to_string();
        self.reporter.report(ProgressEvent::FetchingPodcast {
            platform_id: id_str.clone(),
        });

        let url = Endpoints::url_for(&self.endpoints.podcast_detail, &id_str);
        let detail = self
            .get_json(&id_str, &url, &self.endpoints.app_param_pairs())
            .await?;

        let title = required_text(&detail, fields::podcast::TITLE, &id_str, &url)?;
        let title = html_escape::decode_html_entities(&title).into_owned();
        let description = fields::podcast::DESCRIPTION
            .find_text(&detail)
            .map(|d| html_escape::decode_html_entities(&d).into_owned())
            .unwrap_or_else(|| title.clone());

        let (total_hits, episodes) = self.fetch_episodes(id, limit).await?;

        Ok(FetchedPodcast {
            id,
            title,
            description,
            link: fields::podcast::LINK.find_text(&detail),
            image_url: fields::podcast::IMAGE.find_text(&detail),
            total_hits,
            episodes,
        })
    }

    /// Fetch the podcast an episode belongs to.
    ///
    /// The legacy player XML names the parent series; the series then goes
    /// through the listing and detail steps like any other podcast.
    pub async fn fetch_podcast_from_episode(
        &self,
        episode_id: PlatformId,
        limit: u32,
    ) -> Result<FetchedPodcast, FetchError> {
        let id_str = episode_id.to_string();
        let url = &self.endpoints.legacy_episode_xml;
        let referer = Endpoints::url_for(&self.endpoints.episode_page, &id_str);

        let body = self
            .get(&id_str, url, &[("Referer", referer.as_str())], &[("id", id_str.as_str())])
            .await?;

        let legacy = parse_legacy_xml(&body).map_err(|e| FetchError::Xml {
            id: id_str.clone(),
            endpoint: url.clone(),
            reason: e.to_string(),
        })?;

        let series_id = legacy.series_id.ok_or_else(|| FetchError::MissingField {
            id: id_str.clone(),
            endpoint: url.clone(),
            field: "series_id",
        })?;
        let series_id = PlatformId::parse(&series_id).ok_or_else(|| FetchError::Xml {
            id: id_str.clone(),
            endpoint: url.clone(),
            reason: format!("invalid series id '{series_id}'"),
        })?;
        let title = legacy.series_name.ok_or_else(|| FetchError::MissingField {
            id: id_str.clone(),
            endpoint: url.clone(),
            field: "series_name",
        })?;

        self.reporter.report(ProgressEvent::FetchingPodcast {
            platform_id: series_id.to_string(),
        });

        let (total_hits, episodes) = self.fetch_episodes(series_id, limit).await?;

        Ok(FetchedPodcast {
            id: series_id,
            description: legacy.series_description.unwrap_or_else(|| title.clone()),
            title,
            link: None,
            image_url: None,
            total_hits,
            episodes,
        })
    }

    async fn fetch_episodes(
        &self,
        podcast_id: PlatformId,
        limit: u32,
    ) -> Result<(u64, Vec<RawEpisode>), FetchError> {
        let listing = self.fetch_listing(podcast_id, limit).await?;
        let total = listing.summaries.len();

        // One page only; anything beyond it is reported, not fetched
        if listing.total > total as u64 {
            self.reporter.report(ProgressEvent::ListingTruncated {
                platform_id: podcast_id.to_string(),
                total: listing.total,
                returned: total,
            });
        }

        let mut episodes = Vec::with_capacity(total);
        for (index, summary) in listing.summaries.into_iter().enumerate() {
            self.reporter.report(ProgressEvent::FetchingEpisode {
                episode_id: summary.id.clone(),
                index,
                total,
            });
            episodes.push(self.fetch_episode(summary).await?);
        }

        Ok((listing.total, episodes))
    }

    async fn fetch_listing(
        &self,
        podcast_id: PlatformId,
        limit: u32,
    ) -> Result<Listing, FetchError> {
        let id_str = podcast_id.to_string();
        let limit_str = limit.to_string();
        let url = &self.endpoints.episode_listing;

        let mut params = self.endpoints.app_param_pairs();
        params.push((self.endpoints.listing_podcast_param.as_str(), id_str.as_str()));
        params.push((self.endpoints.listing_limit_param.as_str(), limit_str.as_str()));

        let payload = self.get_json(&id_str, url, &params).await?;

        let items = fields::listing::ITEMS
            .find_array(&payload)
            .ok_or_else(|| FetchError::MissingField {
                id: id_str.clone(),
                endpoint: url.clone(),
                field: fields::listing::ITEMS.name,
            })?;

        let summaries = items
            .iter()
            .map(|item| {
                let id = required_text(item, fields::listing::EPISODE_ID, &id_str, url)?;
                Ok(EpisodeSummary {
                    id,
                    permalink: fields::listing::PERMALINK.find_text(item),
                })
            })
            .take(limit as usize)
            .collect::<Result<Vec<_>, FetchError>>()?;

        let total = fields::listing::TOTAL
            .find(&payload)
            .and_then(Value::as_u64)
            .unwrap_or(summaries.len() as u64);

        Ok(Listing { total, summaries })
    }

    async fn fetch_episode(&self, summary: EpisodeSummary) -> Result<RawEpisode, FetchError> {
        let url = Endpoints::url_for(&self.endpoints.episode_detail, &summary.id);
        let detail = self
            .get_json(&summary.id, &url, &self.endpoints.app_param_pairs())
            .await?;

        let needs_head = fields::episode::LENGTH.find_text(&detail).is_none()
            || fields::episode::MIME_TYPE.find_text(&detail).is_none();

        let enclosure_head = match fields::episode::AUDIO_URL.find_text(&detail) {
            Some(audio_url) if needs_head => {
                let response = self.client.fetch_head(&audio_url).await.map_err(|e| {
                    FetchError::Transport {
                        id: summary.id.clone(),
                        endpoint: audio_url.clone(),
                        source: e,
                    }
                })?;

                if !response.is_success() {
                    return Err(FetchError::Status {
                        id: summary.id,
                        endpoint: audio_url,
                        status: response.status,
                    });
                }

                Some(EnclosureHead::from_headers(&response.headers))
            }
            _ => None,
        };

        let permalink = summary
            .permalink
            .or_else(|| fields::episode::PERMALINK.find_text(&detail));

        Ok(RawEpisode {
            id: summary.id,
            permalink,
            detail,
            enclosure_head,
        })
    }

    async fn get_json(
        &self,
        id: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, FetchError> {
        let body = self.get(id, url, &[], params).await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Json {
            id: id.to_string(),
            endpoint: url.to_string(),
            source: e,
        })
    }

    async fn get(
        &self,
        id: &str,
        url: &str,
        headers: &[(&str, &str)],
        params: &[(&str, &str)],
    ) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .fetch(url, headers, params)
            .await
            .map_err(|e| FetchError::Transport {
                id: id.to_string(),
                endpoint: url.to_string(),
                source: e,
            })?;

        if !response.is_success() {
            return Err(FetchError::Status {
                id: id.to_string(),
                endpoint: url.to_string(),
                status: response.status,
            });
        }

        Ok(response.body)
    }
}

fn required_text(
    payload: &Value,
    aliases: FieldAliases,
    id: &str,
    endpoint: &str,
) -> Result<String, FetchError> {
    aliases
        .find_text(payload)
        .ok_or_else(|| FetchError::MissingField {
            id: id.to_string(),
            endpoint: endpoint.to_string(),
            field: aliases.name,
        })
}
