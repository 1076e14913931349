// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value;
use url::Url;

use crate::error::NormalizeError;
use crate::fetch::{FetchedPodcast, RawEpisode};
use crate::resolve::is_url;

use super::fields::{self, FieldAliases, value_as_text};

/// Value of `itunes:explicit`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Explicit {
    Yes,
    #[default]
    No,
}

impl Explicit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Explicit::Yes => "yes",
            Explicit::No => "no",
        }
    }
}

/// Stable identifier of an episode for podcast clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guid {
    pub value: String,
    /// Whether `value` is the episode's page URL
    pub is_permalink: bool,
}

/// The downloadable media file of an episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audio {
    pub url: String,
    /// Size in bytes, as a decimal string
    pub length_bytes: String,
    pub mime_type: String,
}

/// An episode in the shape the feed is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRecord {
    pub title: String,
    /// Whole seconds only
    pub published_at: DateTime<FixedOffset>,
    pub guid: Guid,
    pub link: Option<String>,
    pub description: String,
    pub audio: Audio,
    pub duration_seconds: u64,
    pub explicit: Explicit,
    pub image_url: Option<String>,
}

impl EpisodeRecord {
    /// Publication time formatted for `pubDate`
    pub fn pub_date(&self) -> String {
        self.published_at.to_rfc2822()
    }

    /// Duration formatted for `itunes:duration`
    pub fn duration(&self) -> String {
        format_duration(self.duration_seconds)
    }
}

/// A podcast with normalized episodes, ready for feed assembly
#[derive(Debug, Clone)]
pub struct PodcastRecord {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub image_url: Option<String>,
    /// Reverse chronological, as listed by the platform
    pub episodes: Vec<EpisodeRecord>,
}

/// Normalize every episode of a fetched podcast, keeping listing order
pub fn normalize_podcast(
    fetched: FetchedPodcast,
    permalink_prefix: &str,
) -> Result<PodcastRecord, NormalizeError> {
    let episodes = fetched
        .episodes
        .iter()
        .map(|raw| normalize(raw, permalink_prefix))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PodcastRecord {
        title: fetched.title,
        description: fetched.description,
        link: fetched
            .link
            .map(|link| absolute_link(&link, permalink_prefix)),
        image_url: fetched.image_url,
        episodes,
    })
}

/// Map a raw episode payload to an episode record.
///
/// Every field is looked up through its alias table; enclosure size and type
/// fall back to the HEAD response when the payload has neither.
pub fn normalize(
    raw: &RawEpisode,
    permalink_prefix: &str,
) -> Result<EpisodeRecord, NormalizeError> {
    let detail = &raw.detail;
    let head = raw.enclosure_head.as_ref();

    let title = required(raw, fields::episode::TITLE)?;
    let description = fields::episode::DESCRIPTION
        .find_text(detail)
        .unwrap_or_default();

    let published_value = fields::episode::PUBLISHED
        .find(detail)
        .ok_or_else(|| missing(raw, fields::episode::PUBLISHED))?;
    let published_at = parse_published(published_value)
        .ok_or_else(|| invalid(raw, fields::episode::PUBLISHED, published_value))?;

    let duration_value = fields::episode::DURATION
        .find(detail)
        .ok_or_else(|| missing(raw, fields::episode::DURATION))?;
    let duration_seconds = parse_duration(duration_value)
        .ok_or_else(|| invalid(raw, fields::episode::DURATION, duration_value))?;

    let url = required(raw, fields::episode::AUDIO_URL)?;

    let length_bytes = match fields::episode::LENGTH.find(detail) {
        Some(value) => {
            parse_length(value).ok_or_else(|| invalid(raw, fields::episode::LENGTH, value))?
        }
        None => head
            .and_then(|h| h.content_length.as_deref())
            .and_then(|length| parse_length(&Value::String(length.to_string())))
            .ok_or_else(|| missing(raw, fields::episode::LENGTH))?,
    };

    let mime_type = fields::episode::MIME_TYPE
        .find_text(detail)
        .or_else(|| head.and_then(|h| h.content_type.clone()))
        .map(|mime| strip_mime_parameters(&mime))
        .filter(|mime| !mime.is_empty())
        .ok_or_else(|| missing(raw, fields::episode::MIME_TYPE))?;

    let explicit = match fields::episode::EXPLICIT.find(detail) {
        Some(value) => {
            parse_explicit(value).ok_or_else(|| invalid(raw, fields::episode::EXPLICIT, value))?
        }
        None => Explicit::No,
    };

    let link = raw
        .permalink
        .as_deref()
        .map(|permalink| absolute_link(permalink, permalink_prefix));

    Ok(EpisodeRecord {
        title: decode_entities(&title),
        published_at,
        guid: episode_guid(&raw.id, link.as_deref()),
        link,
        description: decode_entities(&description),
        audio: Audio {
            url,
            length_bytes,
            mime_type,
        },
        duration_seconds,
        explicit,
        image_url: fields::episode::IMAGE.find_text(detail),
    })
}

/// Format seconds like `H:MM:SS`, hours unpadded and unbounded
pub fn format_duration(seconds: u64) -> String {
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Parse a platform timestamp, dropping fractional seconds.
///
/// Timestamps without an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    let value = value.trim();

    let parsed = DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(value, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
                .map(|naive| naive.and_utc().fixed_offset())
        })?;

    Some(parsed.with_nanosecond(0).unwrap_or(parsed))
}

/// Timestamps arrive as strings or as Unix time (seconds or milliseconds)
fn parse_published(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            let seconds = if raw > 100_000_000_000 { raw / 1000 } else { raw };
            DateTime::from_timestamp(seconds, 0).map(|dt| dt.fixed_offset())
        }
        _ => None,
    }
}

/// Duration in whole seconds from a number, numeric string or `[H:]MM:SS`
pub fn parse_duration(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64)),
        Value::String(s) => {
            let s = s.trim();
            if s.contains(':') {
                return s.split(':').try_fold(0u64, |total, part| {
                    let part = part.trim().parse::<u64>().ok()?;
                    total.checked_mul(60)?.checked_add(part)
                });
            }
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
        }
        _ => None,
    }
}

/// Byte length as a decimal string, whether it came as a number or as text
fn parse_length(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())).then(|| s.to_string())
        }
        _ => None,
    }
}

fn parse_explicit(value: &Value) -> Option<Explicit> {
    match value {
        Value::Bool(true) => Some(Explicit::Yes),
        Value::Bool(false) => Some(Explicit::No),
        Value::Number(n) => match n.as_u64()? {
            0 => Some(Explicit::No),
            1 => Some(Explicit::Yes),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "explicit" | "1" => Some(Explicit::Yes),
            "no" | "false" | "clean" | "0" => Some(Explicit::No),
            _ => None,
        },
        _ => None,
    }
}

/// Episode GUID: the episode page when known, else a name derived from the id
pub fn episode_guid(episode_id: &str, link: Option<&str>) -> Guid {
    match link {
        Some(link) => Guid {
            value: link.to_string(),
            is_permalink: true,
        },
        None => Guid {
            value: format!("supla:episode:{episode_id}"),
            is_permalink: false,
        },
    }
}

/// Make a permalink absolute by joining relative paths onto the site URL
pub fn absolute_link(permalink: &str, prefix: &str) -> String {
    let permalink = permalink.trim();
    if is_url(permalink) {
        return permalink.to_string();
    }

    Url::parse(prefix)
        .and_then(|base| base.join(permalink))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| {
            format!(
                "{}/{}",
                prefix.trim_end_matches('/'),
                permalink.trim_start_matches('/')
            )
        })
}

fn strip_mime_parameters(mime: &str) -> String {
    mime.split(';').next().unwrap_or_default().trim().to_string()
}

fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

fn required(raw: &RawEpisode, aliases: FieldAliases) -> Result<String, NormalizeError> {
    aliases
        .find_text(&raw.detail)
        .ok_or_else(|| missing(raw, aliases))
}

fn missing(raw: &RawEpisode, aliases: FieldAliases) -> NormalizeError {
    NormalizeError::MissingField {
        episode_id: raw.id.clone(),
        field: aliases.name,
    }
}

fn invalid(raw: &RawEpisode, aliases: FieldAliases, value: &Value) -> NormalizeError {
    NormalizeError::InvalidField {
        episode_id: raw.id.clone(),
        field: aliases.name,
        value: value_as_text(value).unwrap_or_else(|| value.to_string()),
    }
}
