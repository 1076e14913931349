// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::resolve::ReferenceKind;

/// Default number of most recent episodes requested per podcast
pub const DEFAULT_LIMIT_RECENT: u32 = 200;

/// Feed language; the platform only publishes Finnish content
pub const DEFAULT_LANGUAGE: &str = "fi-FI";

/// One configured feed: output name and the reference it is generated from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub shortname: String,
    pub source_ref: String,
}

/// A known path segment that precedes an id in platform URLs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathPrefix {
    pub segment: String,
    #[serde(default)]
    pub kind: ReferenceKind,
}

impl PathPrefix {
    pub fn new(segment: &str, kind: ReferenceKind) -> Self {
        Self {
            segment: segment.to_string(),
            kind,
        }
    }
}

/// Upstream endpoints and the static parameters every API call carries.
///
/// URL templates use `{id}` as the placeholder for the platform id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub podcast_detail: String,
    pub episode_listing: String,
    pub episode_detail: String,
    pub legacy_episode_xml: String,
    /// Canonical episode page, also sent as `Referer` to the legacy endpoint
    pub episode_page: String,
    /// Prefix joined onto relative episode permalinks
    pub site_url: String,
    pub listing_podcast_param: String,
    pub listing_limit_param: String,
    pub app_params: BTreeMap<String, String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        let api = "https://prod-component-api.nm-services.nelonenmedia.fi/api";
        Self {
            podcast_detail: format!("{api}/podcasts/{{id}}"),
            episode_listing: format!("{api}/episodes"),
            episode_detail: format!("{api}/episodes/{{id}}"),
            legacy_episode_xml: "http://gatling.nelonenmedia.fi/media-xml-cache".to_string(),
            episode_page: "https://www.supla.fi/supla/{id}".to_string(),
            site_url: "https://www.supla.fi".to_string(),
            listing_podcast_param: "podcast_id".to_string(),
            listing_limit_param: "limit".to_string(),
            app_params: BTreeMap::from([
                ("app".to_string(), "supla".to_string()),
                ("client".to_string(), "web".to_string()),
            ]),
        }
    }
}

impl Endpoints {
    /// Substitute an id into one of the URL templates
    pub fn url_for(template: &str, id: &str) -> String {
        template.replace("{id}", id)
    }

    /// Static app parameters as borrowed pairs, ready for the HTTP client
    pub fn app_param_pairs(&self) -> Vec<(&str, &str)> {
        self.app_params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Run configuration, read from a JSON document
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Feed entries in the order they appear in the document
    #[serde(deserialize_with = "deserialize_entries")]
    pub podcasts: Vec<FeedEntry>,
    /// Public base URL the generated files are served from
    pub own_url: String,
    /// Directory the feed files are written to
    pub target_dir: PathBuf,
    #[serde(default = "default_limit_recent")]
    pub limit_recent: u32,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default = "default_path_prefixes")]
    pub path_prefixes: Vec<PathPrefix>,
    #[serde(default = "default_deep_link_selectors")]
    pub deep_link_selectors: Vec<String>,
}

fn default_limit_recent() -> u32 {
    DEFAULT_LIMIT_RECENT
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Path segments the platform has used in front of ids, newest first
pub fn default_path_prefixes() -> Vec<PathPrefix> {
    vec![
        PathPrefix::new("podcast", ReferenceKind::Podcast),
        PathPrefix::new("ohjelmat", ReferenceKind::Podcast),
        PathPrefix::new("supla", ReferenceKind::Episode),
    ]
}

/// `<meta>` tags known to carry the app deep link on podcast pages
pub fn default_deep_link_selectors() -> Vec<String> {
    vec![
        r#"meta[property="al:android:url"]"#.to_string(),
        r#"meta[property="al:ios:url"]"#.to_string(),
        r#"meta[name="apple-itunes-app"]"#.to_string(),
    ]
}

impl Config {
    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// File name (without directory) used for an entry's feed
    pub fn feed_filename(shortname: &str) -> String {
        format!("{}.rss", sanitize_filename::sanitize(shortname))
    }

    /// Where the feed for `shortname` is written
    pub fn target_path(&self, shortname: &str) -> PathBuf {
        self.target_dir.join(Self::feed_filename(shortname))
    }

    /// Public URL of the feed for `shortname`, used as the atom self link
    pub fn self_url(&self, shortname: &str) -> String {
        format!(
            "{}/{}",
            self.own_url.trim_end_matches('/'),
            Self::feed_filename(shortname)
        )
    }
}

/// Podcast references may be written as JSON strings or bare numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum SourceRef {
    Text(String),
    Number(u64),
}

fn deserialize_entries<'de, D>(deserializer: D) -> Result<Vec<FeedEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<FeedEntry>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of feed names to podcast references")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::new();
            while let Some((shortname, source_ref)) = map.next_entry::<String, SourceRef>()? {
                if shortname.trim().is_empty() {
                    return Err(de::Error::custom("feed name must not be empty"));
                }
                let source_ref = match source_ref {
                    SourceRef::Text(text) => text,
                    SourceRef::Number(number) => number.to_string(),
                };
                entries.push(FeedEntry {
                    shortname,
                    source_ref,
                });
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}
