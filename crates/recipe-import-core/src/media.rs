//! Media collaborator abstraction.
//!
//! The engine never touches the filesystem. It asks a [`MediaStore`] whether a
//! relative media path exists and, for paths that do, for a content
//! fingerprint and MIME type. The application provides an on-disk store; an
//! in-memory store is provided here for tests.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Read-only view of the media tree, addressed by `<owner id>/<file>` paths.
pub trait MediaStore {
    /// Whether a file exists at `path` (relative to the media root).
    fn exists(&self, path: &str) -> bool;

    /// Hex content fingerprint of an existing file.
    fn fingerprint(&self, path: &str) -> Result<String>;

    /// MIME type, if one can be determined.
    fn mime_type(&self, path: &str) -> Option<String>;
}

/// Build the relative path of a media file owned by `owner`.
///
/// A name without an extension gets `.{default_extension}`.
pub fn media_path(owner: &str, name: &str, default_extension: &str) -> String {
    if name.contains('.') {
        format!("{owner}/{name}")
    } else {
        format!("{owner}/{name}.{default_extension}")
    }
}

/// Resolve a media reference to a verified path, or `None` when the name is
/// empty or the file is missing.
pub fn resolve_media(
    store: &dyn MediaStore,
    owner: &str,
    name: &str,
    default_extension: &str,
) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let path = media_path(owner, name, default_extension);
    if store.exists(&path) {
        Some(path)
    } else {
        tracing::debug!(path = %path, "media file not found");
        None
    }
}

/// In-memory [`MediaStore`] for tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMedia {
    files: HashMap<String, Vec<u8>>,
}

impl InMemoryMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.insert(path.to_string(), content.to_vec());
        self
    }
}

impl MediaStore for InMemoryMedia {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn fingerprint(&self, path: &str) -> Result<String> {
        let content = self
            .files
            .get(path)
            .ok_or_else(|| anyhow!("no such media file: {path}"))?;
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        content.hash(&mut hasher);
        Ok(format!("{:016x}", hasher.finish()))
    }

    fn mime_type(&self, path: &str) -> Option<String> {
        let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some("image/jpeg".to_string()),
            "png" => Some("image/png".to_string()),
            _ => None,
        }
    }
}
