// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::{Config, PathPrefix};
use crate::error::{ConfigError, ResolveError};
use crate::http::HttpClient;

use super::scrape::{extract_deep_link, trailing_segment};

/// The platform's own identifier for a podcast or an episode.
///
/// Older API generations use integers, newer ones UUIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformId {
    Numeric(u64),
    Uuid(Uuid),
}

impl PlatformId {
    /// Parse a bare integer or a UUID literal
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if value.bytes().all(|b| b.is_ascii_digit()) {
            return value.parse().ok().map(PlatformId::Numeric);
        }

        Uuid::parse_str(value).ok().map(PlatformId::Uuid)
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformId::Numeric(id) => write!(f, "{id}"),
            PlatformId::Uuid(id) => write!(f, "{}", id.hyphenated()),
        }
    }
}

/// What a reference points at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    #[default]
    Podcast,
    /// A single episode; its series is looked up through the legacy endpoint
    Episode,
}

/// A resolved reference: the id and what kind of object it names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedReference {
    pub id: PlatformId,
    pub kind: ReferenceKind,
}

impl ResolvedReference {
    fn podcast(id: PlatformId) -> Self {
        Self {
            id,
            kind: ReferenceKind::Podcast,
        }
    }
}

/// Determine if a reference is a full web URL
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Turns operator supplied references into platform ids.
///
/// Accepted forms: bare integer, UUID, `[scheme://][www.]host/<segment>/<id>`
/// for any configured segment, and as a last resort any web page whose
/// `<meta>` tags carry the app deep link.
#[derive(Debug, Clone)]
pub struct Resolver {
    pattern: Regex,
    prefixes: Vec<PathPrefix>,
    deep_link_selectors: Vec<String>,
}

impl Resolver {
    pub fn new(
        prefixes: &[PathPrefix],
        deep_link_selectors: &[String],
    ) -> Result<Self, ConfigError> {
        // An empty alternation would accept any first path segment
        if prefixes.is_empty() || prefixes.iter().any(|p| p.segment.trim().is_empty()) {
            return Err(ConfigError::NoPathPrefixes);
        }

        let alternatives = prefixes
            .iter()
            .map(|p| regex::escape(&p.segment))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(
            r"^(?:(?:[A-Za-z][A-Za-z0-9+.-]*://)?(?:www\.)?[^/\s]+)?/?({alternatives})/([^/?#\s]+)"
        ))?;

        Ok(Self {
            pattern,
            prefixes: prefixes.to_vec(),
            deep_link_selectors: deep_link_selectors.to_vec(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(&config.path_prefixes, &config.deep_link_selectors)
    }

    /// Resolve a reference to its platform id
    pub async fn resolve<C: HttpClient>(
        &self,
        client: &C,
        reference: &str,
    ) -> Result<PlatformId, ResolveError> {
        self.resolve_reference(client, reference)
            .await
            .map(|resolved| resolved.id)
    }

    /// Resolve a reference to its platform id and kind.
    ///
    /// Only page URLs without an id in their path cause a network request.
    pub async fn resolve_reference<C: HttpClient>(
        &self,
        client: &C,
        reference: &str,
    ) -> Result<ResolvedReference, ResolveError> {
        let reference = reference.trim();

        if let Some(resolved) = self.resolve_offline(reference) {
            return Ok(resolved);
        }

        if is_url(reference) {
            return self.resolve_from_page(client, reference).await;
        }

        Err(ResolveError::InvalidReference {
            reference: reference.to_string(),
        })
    }

    /// Everything that can be resolved without touching the network
    pub fn resolve_offline(&self, reference: &str) -> Option<ResolvedReference> {
        let reference = reference.trim();

        if let Some(id) = PlatformId::parse(reference) {
            return Some(ResolvedReference::podcast(id));
        }

        let captures = self.pattern.captures(reference)?;
        let id = PlatformId::parse(captures.get(2)?.as_str())?;
        let kind = self.kind_for(captures.get(1)?.as_str());

        Some(ResolvedReference { id, kind })
    }

    async fn resolve_from_page<C: HttpClient>(
        &self,
        client: &C,
        url: &str,
    ) -> Result<ResolvedReference, ResolveError> {
        let response = client
            .fetch(url, &[], &[])
            .await
            .map_err(|e| ResolveError::PageFetch {
                url: url.to_string(),
                source: e,
            })?;

        if !response.is_success() {
            return Err(ResolveError::PageStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        let html = String::from_utf8_lossy(&response.body);

        extract_deep_link(&html, &self.deep_link_selectors)
            .and_then(|link| {
                // Deep links may use a known path layout themselves
                self.resolve_offline(&link).or_else(|| {
                    trailing_segment(&link)
                        .and_then(PlatformId::parse)
                        .map(ResolvedReference::podcast)
                })
            })
            .ok_or_else(|| ResolveError::InvalidReference {
                reference: url.to_string(),
            })
    }

    fn kind_for(&self, segment: &str) -> ReferenceKind {
        self.prefixes
            .iter()
            .find(|p| p.segment == segment)
            .map(|p| p.kind)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_deep_link_selectors, default_path_prefixes};
    use crate::http::mock::MockHttpClient;

    const UUID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

    fn resolver() -> Resolver {
        Resolver::new(&default_path_prefixes(), &default_deep_link_selectors()).unwrap()
    }

    #[test]
    fn parses_bare_integer() {
        assert_eq!(PlatformId::parse("12345"), Some(PlatformId::Numeric(12345)));
        assert_eq!(PlatformId::parse(" 12345 "), Some(PlatformId::Numeric(12345)));
    }

    #[test]
    fn parses_uuid() {
        let id = PlatformId::parse(UUID).unwrap();
        assert_eq!(id, PlatformId::Uuid(Uuid::parse_str(UUID).unwrap()));
        assert_eq!(id.to_string(), UUID);
    }

    #[test]
    fn rejects_signed_and_garbage_ids() {
        assert_eq!(PlatformId::parse("+5"), None);
        assert_eq!(PlatformId::parse("-5"), None);
        assert_eq!(PlatformId::parse("zlatan-podcast"), None);
        assert_eq!(PlatformId::parse(""), None);
    }

    #[tokio::test]
    async fn bare_id_resolves_without_network() {
        let client = MockHttpClient::new();

        let id = resolver().resolve(&client, "12345").await.unwrap();

        assert_eq!(id, PlatformId::Numeric(12345));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn url_with_known_segment_resolves_to_id() {
        let client = MockHttpClient::new();

        let id = resolver()
            .resolve(&client, "https://example/supla/12345")
            .await
            .unwrap();

        assert_eq!(id, PlatformId::Numeric(12345));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn all_forms_resolve_to_same_id() {
        let client = MockHttpClient::new();
        let resolver = resolver();
        let forms = [
            "12345",
            "supla/12345",
            "/supla/12345",
            "supla.fi/supla/12345",
            "www.supla.fi/supla/12345",
            "https://www.supla.fi/supla/12345",
            "http://supla.fi/supla/12345?autoplay=1",
            "https://www.supla.fi/podcast/12345",
        ];

        for form in forms {
            assert_eq!(
                resolver.resolve(&client, form).await.unwrap(),
                PlatformId::Numeric(12345),
                "form {form}"
            );
        }
    }

    #[tokio::test]
    async fn uuid_forms_resolve_to_same_id() {
        let client = MockHttpClient::new();
        let resolver = resolver();
        let expected = PlatformId::parse(UUID).unwrap();

        for form in [
            UUID.to_string(),
            format!("/podcast/{UUID}"),
            format!("https://www.supla.fi/podcast/{UUID}"),
        ] {
            assert_eq!(resolver.resolve(&client, &form).await.unwrap(), expected);
        }
    }

    #[test]
    fn kind_follows_path_prefix() {
        let resolver = resolver();

        let episode = resolver.resolve_offline("https://www.supla.fi/supla/987").unwrap();
        assert_eq!(episode.kind, ReferenceKind::Episode);

        let podcast = resolver.resolve_offline("https://www.supla.fi/ohjelmat/987").unwrap();
        assert_eq!(podcast.kind, ReferenceKind::Podcast);

        let bare = resolver.resolve_offline("987").unwrap();
        assert_eq!(bare.kind, ReferenceKind::Podcast);
    }

    #[test]
    fn prefixes_are_configurable() {
        let resolver = Resolver::new(
            &[PathPrefix::new("sarjat", ReferenceKind::Podcast)],
            &default_deep_link_selectors(),
        )
        .unwrap();

        assert_eq!(
            resolver.resolve_offline("https://www.supla.fi/sarjat/42").map(|r| r.id),
            Some(PlatformId::Numeric(42))
        );
        assert!(resolver.resolve_offline("https://www.supla.fi/supla/42").is_none());
    }

    #[test]
    fn empty_prefix_list_is_rejected() {
        assert!(matches!(
            Resolver::new(&[], &default_deep_link_selectors()),
            Err(ConfigError::NoPathPrefixes)
        ));
        assert!(matches!(
            Resolver::new(
                &[PathPrefix::new("", ReferenceKind::Podcast)],
                &default_deep_link_selectors()
            ),
            Err(ConfigError::NoPathPrefixes)
        ));
    }

    #[test]
    fn segment_must_follow_host() {
        assert!(resolver()
            .resolve_offline("https://www.supla.fi/uutiset/supla/42")
            .is_none());
    }

    #[tokio::test]
    async fn page_url_falls_back_to_deep_link() {
        let page = "https://www.supla.fi/podcast/zlatan-podcast";
        let client = MockHttpClient::new().with_response(
            page,
            200,
            r#"<html><head><meta property="al:android:url" content="supla://podcast/3184427"></head></html>"#,
        );

        let resolved = resolver().resolve_reference(&client, page).await.unwrap();

        assert_eq!(resolved.id, PlatformId::Numeric(3184427));
        assert_eq!(resolved.kind, ReferenceKind::Podcast);
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn page_without_deep_link_is_invalid() {
        let page = "https://www.supla.fi/podcast/unknown";
        let client = MockHttpClient::new().with_response(page, 200, "<html></html>");

        let result = resolver().resolve(&client, page).await;

        assert!(matches!(result, Err(ResolveError::InvalidReference { .. })));
    }

    #[tokio::test]
    async fn page_http_error_is_reported() {
        let client = MockHttpClient::new();

        let result = resolver()
            .resolve(&client, "https://www.supla.fi/podcast/gone")
            .await;

        match result {
            Err(ResolveError::PageStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("Expected PageStatus error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_url_garbage_is_invalid() {
        let client = MockHttpClient::new();

        let result = resolver().resolve(&client, "not a podcast").await;

        assert!(matches!(result, Err(ResolveError::InvalidReference { .. })));
        assert!(client.requests().is_empty());
    }

    #[test]
    fn is_url_detects_http() {
        assert!(is_url("http://example.com/podcast/1"));
        assert!(is_url("https://example.com/podcast/1"));
        assert!(!is_url("/podcast/1"));
        assert!(!is_url("www.supla.fi/podcast/1"));
    }
}
