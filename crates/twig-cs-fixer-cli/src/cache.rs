//! On-disk cache of files known to be clean.
//!
//! Each file is fingerprinted with the SHA-256 of its content. The whole cache
//! is dropped when the signature (tool version and ruleset) changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use twig_cs_fixer_core::{Cache, Ruleset};

/// Default cache file name, relative to the project root.
pub const DEFAULT_CACHE_FILE: &str = ".twig-cs-fixer.cache";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheData {
    signature: String,
    files: BTreeMap<PathBuf, String>,
}

/// JSON-backed [`Cache`].
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    data: CacheData,
}

/// Signature of a run: what must not change for cached results to hold.
#[must_use]
pub fn signature(ruleset: &Ruleset) -> String {
    format!("{}|{}", env!("CARGO_PKG_VERSION"), ruleset.signature())
}

fn fingerprint(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

impl FileCache {
    /// Loads the cache at `path`.
    ///
    /// A missing or unreadable file, or one written under another signature,
    /// yields an empty cache.
    #[must_use]
    pub fn load(path: &Path, signature: &str) -> Self {
        let data = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str::<CacheData>(&content).ok())
            .filter(|data| data.signature == signature);

        let data = data.unwrap_or_else(|| {
            tracing::debug!("Starting with an empty cache at {}", path.display());
            CacheData {
                signature: signature.to_string(),
                files: BTreeMap::new(),
            }
        });

        Self {
            path: path.to_path_buf(),
            data,
        }
    }

    /// Writes the cache back to disk.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&self.data)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write cache: {}", self.path.display()))
    }

    /// Number of files recorded as clean.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.data.files.len()
    }
}

impl Cache for FileCache {
    fn needs_processing(&self, path: &Path, content: &str) -> bool {
        self.data.files.get(path) != Some(&fingerprint(content))
    }

    fn mark_processed(&mut self, path: &Path, content: &str) {
        self.data
            .files
            .insert(path.to_path_buf(), fingerprint(content));
    }
}
