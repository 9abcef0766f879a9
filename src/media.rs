//! On-disk media collaborator.
//!
//! The media root is walked once and every file passing the include/exclude
//! globs is indexed by its `/`-separated path relative to the root. Existence
//! checks are exact lookups in that index; fingerprints are SHA-256 digests
//! of the file content.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use recipe_import_core::media::MediaStore;

use crate::config::MediaConfig;

pub struct DiskMedia {
    root: PathBuf,
    files: HashSet<String>,
}

impl DiskMedia {
    pub fn open(root: &Path, config: &MediaConfig) -> Result<Self> {
        if !root.is_dir() {
            bail!("Media root does not exist: {}", root.display());
        }

        let include_set = build_globset(&config.include_globs)?;
        let exclude_set = build_globset(&config.exclude_globs)?;

        let mut files = HashSet::new();
        let walker = WalkDir::new(root).follow_links(config.follow_symlinks);
        for entry in walker {
            let entry =
                entry.with_context(|| format!("Failed to walk media root: {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            let rel_str = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
                continue;
            }
            files.insert(rel_str);
        }

        tracing::info!(root = %root.display(), files = files.len(), "media root indexed");
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl MediaStore for DiskMedia {
    fn exists(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    fn fingerprint(&self, path: &str) -> Result<String> {
        let full = self.root.join(path);
        let content = std::fs::read(&full)
            .with_context(|| format!("Failed to read media file: {}", full.display()))?;
        let mut hasher = Sha256::new();
        hasher.update(&content);
        Ok(hex::encode(hasher.finalize()))
    }

    fn mime_type(&self, path: &str) -> Option<String> {
        mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(
            Glob::new(pattern).with_context(|| format!("Invalid media glob: '{}'", pattern))?,
        );
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn media_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("soup")).unwrap();
        fs::write(tmp.path().join("soup/bowl.jpg"), b"bowl").unwrap();
        fs::write(tmp.path().join("soup/notes.txt"), b"notes").unwrap();
        tmp
    }

    #[test]
    fn test_index_and_lookup() {
        let tmp = media_tree();
        let media = DiskMedia::open(tmp.path(), &MediaConfig::default()).unwrap();
        assert_eq!(media.len(), 2);
        assert!(media.exists("soup/bowl.jpg"));
        assert!(!media.exists("soup/Bowl.jpg"));
        assert!(!media.exists("soup/missing.jpg"));
    }

    #[test]
    fn test_exclude_globs() {
        let tmp = media_tree();
        let config = MediaConfig {
            exclude_globs: vec!["**/*.txt".to_string()],
            ..MediaConfig::default()
        };
        let media = DiskMedia::open(tmp.path(), &config).unwrap();
        assert!(media.exists("soup/bowl.jpg"));
        assert!(!media.exists("soup/notes.txt"));
    }

    #[test]
    fn test_fingerprint_is_sha256_hex() {
        let tmp = media_tree();
        let media = DiskMedia::open(tmp.path(), &MediaConfig::default()).unwrap();
        let hash = media.fingerprint("soup/bowl.jpg").unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, media.fingerprint("soup/bowl.jpg").unwrap());
        assert_ne!(hash, media.fingerprint("soup/notes.txt").unwrap());
    }

    #[test]
    fn test_mime_guessed_from_extension() {
        let tmp = media_tree();
        let media = DiskMedia::open(tmp.path(), &MediaConfig::default()).unwrap();
        assert_eq!(media.mime_type("soup/bowl.jpg").as_deref(), Some("image/jpeg"));
        assert_eq!(media.mime_type("soup/a.png").as_deref(), Some("image/png"));
        assert_eq!(media.mime_type("soup/noext"), None);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        assert!(DiskMedia::open(&tmp.path().join("nope"), &MediaConfig::default()).is_err());
    }
}
