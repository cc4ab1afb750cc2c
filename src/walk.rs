//! Directory walking: the boundary between the filesystem and the tree builder.
//!
//! The builder consumes any `IntoIterator` of [`FileEntry`] results — one
//! entry per regular file, order not guaranteed, consumed exactly once. Tests
//! hand it plain `Vec`s of in-memory entries; production uses [`DirWalker`],
//! which walks a content root with `walkdir` and fills each entry's metadata:
//!
//! - `file_extension`: the path suffix, verbatim as it appears on disk;
//! - `name`: the file stem;
//! - anything found in an optional TOML sidecar `<stem>.meta.toml` next to
//!   the file (sidecar keys win over the derived ones).
//!
//! Sidecars are how content declares `published`, `content_type`, or a
//! layout without front-matter in the source file itself. The sidecar files,
//! and anything hidden (a leading-dot component anywhere in the relative
//! path), never become entries.
//!
//! A [`FileEntry`] does not hold file contents — [`FileEntry::read`] defers
//! the actual read until a parser is invoked on it.

use crate::meta::{KEY_FILE_EXTENSION, KEY_NAME, Meta};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid sidecar metadata in {path}: {source}")]
    Sidecar {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

/// One file yielded by a walk: where it sits relative to the content root,
/// its metadata, and a handle to its bytes.
pub struct FileEntry {
    pub relative_path: String,
    pub meta: Meta,
    source: FileSource,
}

enum FileSource {
    Disk(PathBuf),
    Memory(Vec<u8>),
}

impl FileEntry {
    pub fn from_disk(relative_path: impl Into<String>, meta: Meta, path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            meta,
            source: FileSource::Disk(path.into()),
        }
    }

    /// An entry backed by in-memory bytes; the walker tests and any caller
    /// that already has content loaded use this.
    pub fn in_memory(relative_path: impl Into<String>, meta: Meta, bytes: Vec<u8>) -> Self {
        Self {
            relative_path: relative_path.into(),
            meta,
            source: FileSource::Memory(bytes),
        }
    }

    /// Read the file's bytes. Deferred until a parser actually needs them.
    pub fn read(&self) -> Result<Vec<u8>, WalkError> {
        match &self.source {
            FileSource::Disk(path) => std::fs::read(path).map_err(|source| WalkError::Io {
                path: path.clone(),
                source,
            }),
            FileSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Recursive walker over a content root directory.
pub struct DirWalker {
    root: PathBuf,
}

impl DirWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl IntoIterator for DirWalker {
    type Item = Result<FileEntry, WalkError>;
    type IntoIter = DirWalkerIter;

    fn into_iter(self) -> DirWalkerIter {
        DirWalkerIter {
            inner: WalkDir::new(&self.root).into_iter(),
            root: self.root,
        }
    }
}

pub struct DirWalkerIter {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl Iterator for DirWalkerIter {
    type Item = Result<FileEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err.into())),
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if is_hidden(relative) || is_sidecar(entry.path()) {
                continue;
            }
            return Some(read_entry(entry.path(), relative));
        }
    }
}

fn is_hidden(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}

fn is_sidecar(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".meta.toml")
}

fn read_entry(path: &Path, relative: &Path) -> Result<FileEntry, WalkError> {
    let relative_path = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    let mut meta = Meta::empty();
    if let Some(ext) = path.extension() {
        meta.insert(KEY_FILE_EXTENSION, ext.to_string_lossy().as_ref());
    }
    if let Some(stem) = path.file_stem() {
        meta.insert(KEY_NAME, stem.to_string_lossy().as_ref());
    }

    let sidecar = path.with_extension("meta.toml");
    if sidecar.is_file() {
        let text = std::fs::read_to_string(&sidecar).map_err(|source| WalkError::Io {
            path: sidecar.clone(),
            source,
        })?;
        let value: toml::Value = text.parse().map_err(|source| WalkError::Sidecar {
            path: sidecar.clone(),
            source,
        })?;
        meta.merge(Meta::from_toml(value));
    }

    Ok(FileEntry::from_disk(relative_path, meta, path))
}
