// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use crate::error::OutputError;

/// Sibling path the document is written to before it is moved into place
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write a feed document so readers never see a half-written file.
///
/// The bytes go to `<path>.partial` first, which is then renamed over `path`.
/// The parent directory is created if needed.
pub async fn write_feed(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| OutputError::WriteFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    let partial = partial_path(path);
    tokio::fs::write(&partial, bytes)
        .await
        .map_err(|e| OutputError::WriteFailed {
            path: partial.clone(),
            source: e,
        })?;

    tokio::fs::rename(&partial, path)
        .await
        .map_err(|e| OutputError::RenameFailed {
            path: path.to_path_buf(),
            source: e,
        })
}
