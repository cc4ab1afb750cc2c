//! # loam
//!
//! A content-resolution and parser-dispatch core for static site generators.
//! Your filesystem is the data source: a directory of heterogeneous files
//! (markup, structured data, images) becomes an in-memory tree of typed
//! artifacts, addressable by hierarchical name and queryable for rendering.
//!
//! loam deliberately stops short of rendering. It answers three questions —
//! *which parser handles this file*, *what lives at this name*, and *what is
//! this name's URL path* — and leaves templating, theming, and output to the
//! site generator built on top.
//!
//! # Pipeline
//!
//! ```text
//! content/  →  walk  →  parse (per file, priority dispatch)  →  ContentTree
//!                                                                   │
//!                                resolve / find_by_content_type  ←──┘
//! ```
//!
//! A [`context::SiteContext`] assembles the plugin set once per build and
//! lazily gathers three registries from it: parsers (extension-claimed,
//! priority-ranked, with a raw-bytes fallback so no file is ever dropped),
//! layouts, and text processors (exact-name lookup, fail-fast). The tree is
//! built once per scan and is immutable afterwards; resolution queries are
//! read-only and never fail — absence is `None`, not an error.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`name`] | Hierarchical names: indexed tokens, parsing, concatenation, web paths |
//! | [`meta`] | Metadata records and the publish-flag rule |
//! | [`parser`] | `Parser` trait, `Artifact` type, priority-ranked registry |
//! | [`parsers`] | Built-in parsers: html, markdown, json, toml, images, raw fallback |
//! | [`walk`] | Directory walker boundary: `FileEntry`, sidecar metadata, `DirWalker` |
//! | [`tree`] | `ContentTree` builder — one node per walked file |
//! | [`resolve`] | Name resolution with index fallback, predicate and content-type queries |
//! | [`context`] | Plugin host, lazy registries, layout/text-processor lookup |
//!
//! # Example
//!
//! ```no_run
//! use loam::context::SiteContext;
//! use loam::name::Name;
//! use loam::tree::ContentTree;
//! use loam::walk::DirWalker;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = SiteContext::default();
//! let tree = ContentTree::build(&ctx, DirWalker::new("content"))?;
//!
//! // Direct page, or fall back to blog/index — unpublished pages are absent.
//! if let Some(post) = tree.resolve(&Name::parse("blog/post1")?) {
//!     println!("{} -> {}", post.name.web_path(), post.artifact.kind());
//! }
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod meta;
pub mod name;
pub mod parser;
pub mod parsers;
pub mod resolve;
pub mod tree;
pub mod walk;

pub use context::{ConfigError, Layout, Plugin, SiteContext, TextProcessor};
pub use meta::Meta;
pub use name::{Name, NameError, NameToken};
pub use parser::{Artifact, ParseError, Parser, ParserRegistry};
pub use resolve::INDEX_PAGE_TOKEN;
pub use tree::{BuildError, ContentNode, ContentTree};
pub use walk::{DirWalker, FileEntry, WalkError};
