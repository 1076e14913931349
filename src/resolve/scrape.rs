// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use scraper::{Html, Selector};

/// Find the app deep link on a podcast page.
///
/// This is the only place that knows which `<meta>` tags the platform puts
/// the link in. Selectors are tried in order; the first tag with usable
/// `content` wins.
pub fn extract_deep_link(html: &str, selectors: &[String]) -> Option<String> {
    let document = Html::parse_document(html);

    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|selector| {
            document
                .select(&selector)
                .find_map(|element| deep_link_from_content(element.value().attr("content")?))
        })
}

/// `apple-itunes-app` packs the link as `app-id=..., app-argument=<link>`
fn deep_link_from_content(content: &str) -> Option<String> {
    let link = content
        .split(',')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("app-argument="))
        .unwrap_or(content)
        .trim();

    (!link.is_empty()).then(|| link.to_string())
}

/// Last non-empty path segment of a link, query and fragment ignored
pub fn trailing_segment(link: &str) -> Option<&str> {
    link.split(['?', '#'])
        .next()?
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}
