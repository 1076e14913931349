// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when turning a user supplied reference into a platform id
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid podcast reference '{reference}'")]
    InvalidReference { reference: String },

    #[error("Failed to fetch page {url}: {source}")]
    PageFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for page {url}")]
    PageStatus { url: String, status: u16 },
}

/// Errors that can occur while retrieving podcast and episode metadata
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request for {id} to {endpoint} failed: {source}")]
    Transport {
        id: String,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {id} from {endpoint}")]
    Status {
        id: String,
        endpoint: String,
        status: u16,
    },

    #[error("Failed to parse JSON for {id} from {endpoint}: {source}")]
    Json {
        id: String,
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse XML for {id} from {endpoint}: {reason}")]
    Xml {
        id: String,
        endpoint: String,
        reason: String,
    },

    #[error("Response for {id} from {endpoint} has no '{field}'")]
    MissingField {
        id: String,
        endpoint: String,
        field: &'static str,
    },
}

/// Errors that can occur when mapping an upstream episode payload to an episode record
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Episode {episode_id} has no '{field}'")]
    MissingField {
        episode_id: String,
        field: &'static str,
    },

    #[error("Episode {episode_id} has an invalid '{field}': {value}")]
    InvalidField {
        episode_id: String,
        field: &'static str,
        value: String,
    },
}

/// Errors that can occur when building the RSS document
#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("Podcast '{title}' has no episodes")]
    EmptyPodcast { title: String },

    #[error("Failed to serialize RSS document: {0}")]
    Serialize(#[from] rss::Error),
}

/// Errors that can occur when writing a feed file
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write feed file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move feed file into place at {path}: {source}")]
    RenameFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid path prefix configuration: {0}")]
    InvalidPathPrefix(#[from] regex::Error),

    #[error("At least one non-empty path prefix must be configured")]
    NoPathPrefixes,
}

/// Everything that can abort the generation of a single feed
#[derive(Error, Debug)]
pub enum EntryError {
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Malformed episode: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Assemble error: {0}")]
    Assemble(#[from] AssembleError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}
