// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field alias tables for upstream JSON payloads.
//!
//! The platform renames and moves fields between API revisions. Every target
//! field lists the JSON pointers it has been seen under, newest first; a new
//! payload shape is supported by extending a table.

use serde_json::Value;

/// Ordered candidate locations of one logical field
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    /// Name used in error messages
    pub name: &'static str,
    pub pointers: &'static [&'static str],
}

impl FieldAliases {
    /// First candidate that is present and not null or blank
    pub fn find<'a>(&self, payload: &'a Value) -> Option<&'a Value> {
        self.pointers
            .iter()
            .filter_map(|pointer| payload.pointer(pointer))
            .find(|value| !is_blank(value))
    }

    /// First candidate that can be read as text (strings, numbers and booleans)
    pub fn find_text(&self, payload: &Value) -> Option<String> {
        self.pointers
            .iter()
            .filter_map(|pointer| payload.pointer(pointer))
            .find_map(value_as_text)
    }

    /// First candidate that is an array
    pub fn find_array<'a>(&self, payload: &'a Value) -> Option<&'a Vec<Value>> {
        self.pointers
            .iter()
            .filter_map(|pointer| payload.pointer(pointer))
            .find_map(Value::as_array)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Scalar JSON value as trimmed text; blank strings count as absent
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub mod podcast {
    use super::FieldAliases;

    pub const TITLE: FieldAliases = FieldAliases {
        name: "title",
        pointers: &["/title", "/name", "/series/title"],
    };

    pub const DESCRIPTION: FieldAliases = FieldAliases {
        name: "description",
        pointers: &["/description", "/summary", "/teaser", "/series/description"],
    };

    pub const IMAGE: FieldAliases = FieldAliases {
        name: "image",
        pointers: &[
            "/image/url",
            "/cover_image/url",
            "/cover_image",
            "/image",
            "/thumbnail",
        ],
    };

    pub const LINK: FieldAliases = FieldAliases {
        name: "link",
        pointers: &["/url", "/permalink", "/link", "/canonical_url"],
    };
}

pub mod listing {
    use super::FieldAliases;

    pub const TOTAL: FieldAliases = FieldAliases {
        name: "total",
        pointers: &[
            "/total",
            "/total_hits",
            "/hits/total/value",
            "/hits/total",
            "/meta/total",
        ],
    };

    pub const ITEMS: FieldAliases = FieldAliases {
        name: "episodes",
        pointers: &["/items", "/results", "/hits/hits", "/episodes"],
    };

    pub const EPISODE_ID: FieldAliases = FieldAliases {
        name: "episode id",
        pointers: &["/id", "/uuid", "/_id", "/_source/id"],
    };

    pub const PERMALINK: FieldAliases = FieldAliases {
        name: "permalink",
        pointers: &["/permalink", "/link", "/_source/permalink", "/url"],
    };
}

pub mod episode {
    use super::FieldAliases;

    pub const TITLE: FieldAliases = FieldAliases {
        name: "title",
        pointers: &["/title", "/name", "/program_name", "/_source/title"],
    };

    pub const DESCRIPTION: FieldAliases = FieldAliases {
        name: "description",
        pointers: &["/description", "/summary", "/teaser", "/lead"],
    };

    pub const PUBLISHED: FieldAliases = FieldAliases {
        name: "last_modified",
        pointers: &[
            "/last_modified",
            "/published_at",
            "/publication_date",
            "/date_start",
            "/created_at",
        ],
    };

    pub const AUDIO_URL: FieldAliases = FieldAliases {
        name: "audio url",
        pointers: &[
            "/audio/url",
            "/media/url",
            "/audio_url",
            "/mp3_url",
            "/enclosure/url",
        ],
    };

    pub const LENGTH: FieldAliases = FieldAliases {
        name: "audio length",
        pointers: &[
            "/audio/size",
            "/audio/length",
            "/media/size",
            "/file_size",
            "/size",
            "/enclosure/length",
        ],
    };

    pub const MIME_TYPE: FieldAliases = FieldAliases {
        name: "audio type",
        pointers: &[
            "/audio/content_type",
            "/audio/mime_type",
            "/media/content_type",
            "/mime_type",
            "/content_type",
            "/enclosure/type",
        ],
    };

    pub const DURATION: FieldAliases = FieldAliases {
        name: "duration",
        pointers: &[
            "/duration",
            "/audio/duration",
            "/media/duration",
            "/length_seconds",
        ],
    };

    pub const EXPLICIT: FieldAliases = FieldAliases {
        name: "explicit",
        pointers: &["/explicit", "/is_explicit", "/audio/explicit"],
    };

    pub const IMAGE: FieldAliases = FieldAliases {
        name: "image",
        pointers: &[
            "/image/url",
            "/cover_art/url",
            "/cover_art",
            "/image",
            "/thumbnail",
            "/images/0/url",
        ],
    };

    pub const PERMALINK: FieldAliases = FieldAliases {
        name: "permalink",
        pointers: &["/permalink", "/link", "/web_url", "/canonical_url"],
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_present_alias_wins() {
        let payload = json!({ "name": "old", "title": "new" });
        assert_eq!(podcast::TITLE.find_text(&payload).as_deref(), Some("new"));
    }

    #[test]
    fn nested_aliases_are_followed() {
        let payload = json!({ "audio": { "url": "https://cdn.example.com/a.mp3" } });
        assert_eq!(
            episode::AUDIO_URL.find_text(&payload).as_deref(),
            Some("https://cdn.example.com/a.mp3")
        );
    }

    #[test]
    fn blank_and_null_values_fall_through() {
        let payload = json!({ "title": "  ", "name": null, "program_name": "Jakso 1" });
        assert_eq!(episode::TITLE.find_text(&payload).as_deref(), Some("Jakso 1"));
        assert_eq!(episode::TITLE.find(&payload), Some(&json!("Jakso 1")));
    }

    #[test]
    fn object_values_are_not_text() {
        let payload = json!({ "image": { "width": 300 }, "thumbnail": "https://img/1.jpg" });
        assert_eq!(
            episode::IMAGE.find_text(&payload).as_deref(),
            Some("https://img/1.jpg")
        );
    }

    #[test]
    fn numbers_are_read_as_text() {
        let payload = json!({ "audio": { "size": 1234567 } });
        assert_eq!(
            episode::LENGTH.find_text(&payload).as_deref(),
            Some("1234567")
        );
    }

    #[test]
    fn find_array_skips_non_arrays() {
        let payload = json!({ "items": "nope", "hits": { "hits": [{ "_id": "1" }] } });
        let items = listing::ITEMS.find_array(&payload).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn missing_everywhere_is_none() {
        let payload = json!({ "unrelated": 1 });
        assert!(episode::DURATION.find(&payload).is_none());
        assert!(episode::DURATION.find_text(&payload).is_none());
    }
}
