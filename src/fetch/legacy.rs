// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Variable names the legacy player payload has used for the parent series
const SERIES_ID_VARIABLES: &[&str] = &["series_id", "seriesId", "series_uuid"];
const SERIES_NAME_VARIABLES: &[&str] = &["series_name", "seriesName", "series"];
const SERIES_DESCRIPTION_VARIABLES: &[&str] = &["series_description", "seriesDescription"];

/// The parent series named by the legacy per-episode XML
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyEpisode {
    pub series_id: Option<String>,
    pub series_name: Option<String>,
    pub series_description: Option<String>,
}

/// Parse the legacy player XML payload.
///
/// Series information lives in `Clip/PassthroughVariables/variable` elements
/// (`name`/`value` attributes).
pub fn parse_legacy_xml(data: &[u8]) -> Result<LegacyEpisode, quick_xml::Error> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut variables = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"variable" => {
                if let (Some(name), Some(value)) =
                    (get_attribute(e, "name"), get_attribute(e, "value"))
                {
                    variables.insert(name, value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(LegacyEpisode {
        series_id: first_variable(&variables, SERIES_ID_VARIABLES),
        series_name: first_variable(&variables, SERIES_NAME_VARIABLES),
        series_description: first_variable(&variables, SERIES_DESCRIPTION_VARIABLES),
    })
}

fn first_variable(variables: &HashMap<String, String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| variables.get(*name))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(String::from)
}

fn get_attribute(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            let raw = String::from_utf8_lossy(&attr.value);
            return Some(html_escape::decode_html_entities(&raw).into_owned());
        }
    }
    None
}
