//! The content tree: one immutable Name → node mapping per source scan.
//!
//! [`ContentTree::build`] drains a walker, dispatches every file through the
//! context's parser registry, and stores the resulting artifacts under names
//! derived from relative paths: separators become token boundaries, the final
//! extension is stripped, and a bracketed numeric suffix (`photo[2].png`)
//! becomes a token index.
//!
//! Guarantees:
//!
//! - Every file the walker yields produces exactly one node — unclaimed
//!   extensions land in the raw-bytes fallback, never on the floor.
//! - A parser failure aborts the whole build (`BuildError::Parse` names the
//!   file). There is no partial tree; the caller re-runs after fixing the
//!   source.
//! - Two files mapping to the same name resolve last-writer-wins in walk
//!   order, with a warning naming the collision. With parallel parsing this
//!   stays deterministic because insertion replays the walk order.
//!
//! Per-file parsing fans out over rayon; the walk itself and the final
//! insertion are sequential.

use crate::context::SiteContext;
use crate::meta::{KEY_FILE_EXTENSION, Meta};
use crate::name::{Name, NameError, NameToken};
use crate::parser::{Artifact, ParseError};
use crate::walk::{FileEntry, WalkError};
use log::warn;
use rayon::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("cannot derive a name from {path:?}: {source}")]
    Name {
        path: String,
        #[source]
        source: NameError,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Walk(#[from] WalkError),
}

/// An artifact plus its metadata, stored at one position in the tree.
#[derive(Debug)]
pub struct ContentNode {
    pub name: Name,
    pub artifact: Artifact,
    pub meta: Meta,
}

/// Ordered mapping of [`Name`] to [`ContentNode`], built once per scan and
/// read-only afterwards. Resolution queries live in [`crate::resolve`].
#[derive(Debug, Default)]
pub struct ContentTree {
    nodes: BTreeMap<Name, ContentNode>,
}

impl ContentTree {
    /// Build a tree by draining `walker` and parsing every file it yields.
    pub fn build<I>(ctx: &SiteContext, walker: I) -> Result<ContentTree, BuildError>
    where
        I: IntoIterator<Item = Result<FileEntry, WalkError>>,
    {
        let entries: Vec<FileEntry> = walker.into_iter().collect::<Result<_, _>>()?;

        // Parallel parse; collect preserves walk order for the insert below.
        let parsed: Vec<(String, ContentNode)> = entries
            .into_par_iter()
            .map(|entry| {
                let node = parse_entry(ctx, &entry)?;
                Ok((entry.relative_path, node))
            })
            .collect::<Result<_, BuildError>>()?;

        let mut nodes = BTreeMap::new();
        for (path, node) in parsed {
            if nodes.contains_key(&node.name) {
                warn!(
                    "content name {:?} produced by multiple files; {path:?} wins",
                    node.name.to_string()
                );
            }
            nodes.insert(node.name.clone(), node);
        }
        Ok(ContentTree { nodes })
    }

    /// Direct lookup, no index fallback and no publish filtering. The
    /// published resolution entry points are in [`crate::resolve`].
    pub fn get(&self, name: &Name) -> Option<&ContentNode> {
        self.nodes.get(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &ContentNode)> {
        self.nodes.iter()
    }
}

fn parse_entry(ctx: &SiteContext, entry: &FileEntry) -> Result<ContentNode, BuildError> {
    let extension = entry
        .meta
        .get_str(KEY_FILE_EXTENSION)
        .map(str::to_string)
        .unwrap_or_else(|| path_extension(&entry.relative_path));

    let parser = ctx.parsers().select(&extension);
    let bytes = entry.read()?;
    let artifact = parser
        .parse(ctx, &bytes, &entry.meta)
        .map_err(|source| BuildError::Parse {
            path: entry.relative_path.clone(),
            source,
        })?;
    let name = node_name(&entry.relative_path).map_err(|source| BuildError::Name {
        path: entry.relative_path.clone(),
        source,
    })?;

    Ok(ContentNode {
        name,
        artifact,
        meta: entry.meta.clone(),
    })
}

/// Extension of a relative path's final segment; empty when there is none.
fn path_extension(relative_path: &str) -> String {
    let last = relative_path.rsplit('/').next().unwrap_or(relative_path);
    match last.rfind('.') {
        Some(pos) if pos > 0 => last[pos + 1..].to_string(),
        _ => String::new(),
    }
}

/// Derive the tree position from a relative path: one token per segment,
/// extension stripped from the last, `[n]` suffixes parsed as indices.
fn node_name(relative_path: &str) -> Result<Name, NameError> {
    let mut tokens = Vec::new();
    let segments: Vec<&str> = relative_path.split('/').collect();
    for (i, segment) in segments.iter().enumerate() {
        let segment = if i == segments.len() - 1 {
            match segment.rfind('.') {
                Some(pos) if pos > 0 => &segment[..pos],
                _ => segment,
            }
        } else {
            segment
        };
        tokens.push(NameToken::parse(segment)?);
    }
    Ok(Name::from_tokens(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::KEY_PUBLISHED;

    fn entry(path: &str, bytes: &[u8]) -> Result<FileEntry, WalkError> {
        Ok(FileEntry::in_memory(path, Meta::empty(), bytes.to_vec()))
    }

    fn entry_with_meta(path: &str, bytes: &[u8], meta: Meta) -> Result<FileEntry, WalkError> {
        Ok(FileEntry::in_memory(path, meta, bytes.to_vec()))
    }

    #[test]
    fn every_walked_file_becomes_a_node() {
        let ctx = SiteContext::default();
        let tree = ContentTree::build(
            &ctx,
            vec![
                entry("index.md", b"# Home"),
                entry("blog/post1.md", b"# Post"),
                entry("mystery.xyz", b"\x00\x01\x02"),
            ],
        )
        .unwrap();

        assert_eq!(tree.len(), 3);
        let mystery = tree.get(&Name::parse("mystery").unwrap()).unwrap();
        assert_eq!(mystery.artifact, Artifact::Bytes(vec![0x00, 0x01, 0x02]));
    }

    #[test]
    fn names_strip_extension_and_keep_hierarchy() {
        let ctx = SiteContext::default();
        let tree = ContentTree::build(&ctx, vec![entry("blog/post1.md", b"hi")]).unwrap();
        let node = tree.get(&Name::parse("blog/post1").unwrap()).unwrap();
        assert!(node.artifact.as_html().is_some());
    }

    #[test]
    fn bracketed_suffix_becomes_token_index() {
        let ctx = SiteContext::default();
        let tree = ContentTree::build(&ctx, vec![entry("photo[2].png", &[0x89])]).unwrap();
        let name = Name::parse("photo[2]").unwrap();
        assert!(tree.get(&name).is_some());
        assert_eq!(name.web_path(), "photo[2]");
    }

    #[test]
    fn meta_extension_overrides_path_suffix() {
        let ctx = SiteContext::default();
        let mut meta = Meta::empty();
        meta.insert(KEY_FILE_EXTENSION, "md");
        // Path says .txt; metadata says markdown.
        let tree =
            ContentTree::build(&ctx, vec![entry_with_meta("note.txt", b"# Note", meta)]).unwrap();
        let node = tree.get(&Name::parse("note").unwrap()).unwrap();
        assert!(node.artifact.as_html().unwrap().contains("<h1>Note</h1>"));
    }

    #[test]
    fn parser_failure_aborts_the_build() {
        let ctx = SiteContext::default();
        let result = ContentTree::build(
            &ctx,
            vec![entry("good.md", b"fine"), entry("bad.json", b"{broken")],
        );
        match result {
            Err(BuildError::Parse { path, .. }) => assert_eq!(path, "bad.json"),
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn walker_errors_propagate() {
        let ctx = SiteContext::default();
        let result = ContentTree::build(
            &ctx,
            vec![Err(WalkError::Io {
                path: "gone.md".into(),
                source: std::io::Error::other("unreadable"),
            })],
        );
        assert!(matches!(result, Err(BuildError::Walk(_))));
    }

    #[test]
    fn name_collision_is_last_writer_wins() {
        let ctx = SiteContext::default();
        let tree = ContentTree::build(
            &ctx,
            vec![entry("page.md", b"from markdown"), entry("page.html", b"<p>from html</p>")],
        )
        .unwrap();

        assert_eq!(tree.len(), 1);
        let node = tree.get(&Name::parse("page").unwrap()).unwrap();
        assert_eq!(node.artifact.as_html(), Some("<p>from html</p>"));
    }

    #[test]
    fn malformed_segment_is_fatal() {
        let ctx = SiteContext::default();
        let result = ContentTree::build(&ctx, vec![entry("draft[final].md", b"x")]);
        assert!(matches!(result, Err(BuildError::Name { .. })));
    }

    #[test]
    fn node_keeps_its_metadata() {
        let ctx = SiteContext::default();
        let mut meta = Meta::empty();
        meta.insert(KEY_PUBLISHED, "false");
        let tree =
            ContentTree::build(&ctx, vec![entry_with_meta("draft.md", b"x", meta)]).unwrap();
        let node = tree.get(&Name::parse("draft").unwrap()).unwrap();
        assert!(!node.meta.published());
    }

    #[test]
    fn extensionless_file_uses_fallback() {
        let ctx = SiteContext::default();
        let tree = ContentTree::build(&ctx, vec![entry("LICENSE", b"MIT")]).unwrap();
        let node = tree.get(&Name::parse("LICENSE").unwrap()).unwrap();
        assert_eq!(node.artifact, Artifact::Bytes(b"MIT".to_vec()));
    }
}
