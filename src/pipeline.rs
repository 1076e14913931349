// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use crate::config::{Config, FeedEntry};
use crate::error::{ConfigError, EntryError};
use crate::feed::{FeedOptions, GENERATOR, assemble, write_feed};
use crate::fetch::MetadataFetcher;
use crate::http::HttpClient;
use crate::normalize::normalize_podcast;
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::resolve::{ReferenceKind, Resolver};

/// Result of a generation run
#[derive(Debug)]
pub struct GenerateResult {
    /// Feed files written, by shortname
    pub generated: Vec<(String, PathBuf)>,
    /// Entries that failed, with the error that stopped them
    pub failed: Vec<(String, EntryError)>,
}

impl GenerateResult {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Regenerate the feed of every configured entry.
///
/// Entries are processed one at a time in configuration order. A failing
/// entry is reported and recorded, then the run moves on to the next one.
/// When `only` is non-empty, entries with other shortnames are skipped.
pub async fn generate_feeds<C: HttpClient>(
    client: &C,
    config: &Config,
    only: &[String],
    reporter: SharedProgressReporter,
) -> Result<GenerateResult, ConfigError> {
    let resolver = Resolver::from_config(config)?;

    let mut generated = Vec::new();
    let mut failed = Vec::new();

    let entries = config
        .podcasts
        .iter()
        .filter(|entry| only.is_empty() || only.contains(&entry.shortname));

    for entry in entries {
        match generate_feed(client, config, &resolver, entry, &reporter).await {
            Ok(path) => generated.push((entry.shortname.clone(), path)),
            Err(e) => {
                reporter.report(ProgressEvent::EntryFailed {
                    shortname: entry.shortname.clone(),
                    error: e.to_string(),
                });
                failed.push((entry.shortname.clone(), e));
            }
        }
    }

    reporter.report(ProgressEvent::RunCompleted {
        generated_count: generated.len(),
        failed_count: failed.len(),
    });

    Ok(GenerateResult { generated, failed })
}

/// Resolve, fetch, normalize, assemble and write the feed for one entry
pub async fn generate_feed<C: HttpClient>(
    client: &C,
    config: &Config,
    resolver: &Resolver,
    entry: &FeedEntry,
    reporter: &SharedProgressReporter,
) -> Result<PathBuf, EntryError> {
    reporter.report(ProgressEvent::EntryStarted {
        shortname: entry.shortname.clone(),
        source_ref: entry.source_ref.clone(),
    });

    let resolved = resolver
        .resolve_reference(client, &entry.source_ref)
        .await?;

    reporter.report(ProgressEvent::ReferenceResolved {
        shortname: entry.shortname.clone(),
        platform_id: resolved.id.to_string(),
        from_episode: resolved.kind == ReferenceKind::Episode,
    });

    let fetcher = MetadataFetcher::new(client, &config.endpoints, reporter.clone());
    let fetched = match resolved.kind {
        ReferenceKind::Podcast => {
            fetcher
                .fetch_podcast(resolved.id, config.limit_recent)
                .await?
        }
        ReferenceKind::Episode => {
            fetcher
                .fetch_podcast_from_episode(resolved.id, config.limit_recent)
                .await?
        }
    };

    let podcast = normalize_podcast(fetched, &config.endpoints.site_url)?;

    let options = FeedOptions {
        language: config.language.clone(),
        generator: GENERATOR.to_string(),
    };
    let document = assemble(&podcast, &config.self_url(&entry.shortname), &options)?;

    let path = config.target_path(&entry.shortname);
    write_feed(&path, &document).await?;

    reporter.report(ProgressEvent::FeedWritten {
        shortname: entry.shortname.clone(),
        path: path.clone(),
        item_count: podcast.episodes.len(),
    });

    Ok(path)
}
