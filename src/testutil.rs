// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared fixtures for tests that talk to a mocked platform.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::config::Endpoints;
use crate::http::mock::MockHttpClient;

pub const SITE_URL: &str = "https://www.supla.test";

pub fn test_endpoints() -> Endpoints {
    Endpoints {
        podcast_detail: "https://api.test/podcasts/{id}".to_string(),
        episode_listing: "https://api.test/episodes".to_string(),
        episode_detail: "https://api.test/episodes/{id}".to_string(),
        legacy_episode_xml: "https://legacy.test/media-xml-cache".to_string(),
        episode_page: format!("{SITE_URL}/supla/{{id}}"),
        site_url: SITE_URL.to_string(),
        listing_podcast_param: "podcast_id".to_string(),
        listing_limit_param: "limit".to_string(),
        app_params: BTreeMap::new(),
    }
}

pub fn podcast_url(id: u64) -> String {
    format!("https://api.test/podcasts/{id}")
}

pub fn listing_url(podcast_id: u64, limit: u32) -> String {
    format!("https://api.test/episodes?podcast_id={podcast_id}&limit={limit}")
}

pub fn episode_url(id: u64) -> String {
    format!("https://api.test/episodes/{id}")
}

pub fn podcast_detail(title: &str) -> Value {
    json!({
        "title": title,
        "description": format!("{title} joka viikko"),
        "url": format!("{SITE_URL}/podcast/zlatan"),
        "image": { "url": "https://img.test/cover.jpg" }
    })
}

pub fn listing(total: u64, episode_ids: &[u64]) -> Value {
    let hits: Vec<Value> = episode_ids
        .iter()
        .map(|id| json!({ "id": id, "permalink": format!("/podcast/zlatan/jakso-{id}") }))
        .collect();
    json!({ "hits": { "total": total, "hits": hits } })
}

pub fn episode_detail(id: u64) -> Value {
    json!({
        "id": id,
        "title": format!("Jakso {id}"),
        "description": format!("Jakson {id} kuvaus"),
        "last_modified": "2022-09-20T22:32:58.932060Z",
        "duration": 125,
        "audio": {
            "url": format!("https://cdn.test/{id}.mp3"),
            "size": 1000 + id,
            "content_type": "audio/mpeg"
        },
        "explicit": false
    })
}

/// A mocked platform serving one podcast with the given episodes
pub fn podcast_client(
    podcast_id: u64,
    episode_ids: &[u64],
    total: u64,
    limit: u32,
) -> MockHttpClient {
    let mut client = MockHttpClient::new()
        .with_response(
            &podcast_url(podcast_id),
            200,
            podcast_detail("Zlatan").to_string(),
        )
        .with_response(
            &listing_url(podcast_id, limit),
            200,
            listing(total, episode_ids).to_string(),
        );

    for id in episode_ids {
        client = client.with_response(&episode_url(*id), 200, episode_detail(*id).to_string());
    }

    client
}
