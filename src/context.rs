//! The site context: plugin assembly and the lazily-built lookup registries.
//!
//! A [`SiteContext`] owns the plugin set for one build and hands out three
//! registries gathered from it: parsers (priority-ranked, see
//! [`crate::parser`]), layouts, and text processors (exact-name lookup, no
//! fallback). Each registry is built on first access and memoized for the
//! life of the context — `OnceLock` gives the initialize-once guarantee, so
//! concurrent readers are safe without further locking.
//!
//! The context is threaded explicitly through every operation that needs it
//! (parsers receive `&SiteContext`, layouts receive it at render time). There
//! is no ambient global; a second site in the same process is just a second
//! context.
//!
//! Layout and text-processor references come from metadata: either the
//! metadata's own scalar value (`layout = "article"`) or its `name` child
//! (`[layout] name = "article"`). A reference that names nothing, parses to
//! no valid [`Name`], or misses the registry is a configuration error raised
//! at the point of use — unlike content resolution, these lookups fail fast.

use crate::meta::{KEY_NAME, Meta};
use crate::name::{Name, NameError};
use crate::parser::{Parser, ParserRegistry};
use crate::parsers::{
    HtmlParser, ImageParser, JsonParser, MarkdownParser, RawParser, TomlParser,
};
use crate::tree::ContentNode;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("layout name not defined in {meta}")]
    MissingLayoutName { meta: String },
    #[error("layout {name:?} not found")]
    UnknownLayout { name: String },
    #[error("text processor name not defined in {meta}")]
    MissingProcessorName { meta: String },
    #[error("text processor {name:?} not found")]
    UnknownProcessor { name: String },
    #[error(transparent)]
    Name(#[from] NameError),
}

/// Errors a layout may raise belong to the layout implementation; the engine
/// only transports them.
pub type RenderError = Box<dyn std::error::Error + Send + Sync>;

/// A pluggable page layout, resolved by name from a node's metadata.
pub trait Layout: Send + Sync {
    fn render(&self, ctx: &SiteContext, node: &ContentNode) -> Result<String, RenderError>;
}

impl std::fmt::Debug for dyn Layout + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Layout")
    }
}

/// A pluggable text transform applied to fragment text before rendering.
pub trait TextProcessor: Send + Sync {
    fn process(&self, text: &str) -> String;
}

impl std::fmt::Debug for dyn TextProcessor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn TextProcessor")
    }
}

/// One plugin's contribution to the context, enumerated per capability.
/// All methods default to empty so plugins implement only what they provide.
pub trait Plugin: Send + Sync {
    fn parsers(&self) -> Vec<(Name, Arc<dyn Parser>)> {
        Vec::new()
    }

    fn layouts(&self) -> Vec<(Name, Arc<dyn Layout>)> {
        Vec::new()
    }

    fn text_processors(&self) -> Vec<(Name, Arc<dyn TextProcessor>)> {
        Vec::new()
    }
}

/// The built-in plugin: default parsers for common source formats plus the
/// `basic` text processor. Always registered first, so site plugins win
/// priority ties only by exceeding [`crate::parser::DEFAULT_PRIORITY`].
pub struct BuiltinPlugin;

impl Plugin for BuiltinPlugin {
    fn parsers(&self) -> Vec<(Name, Arc<dyn Parser>)> {
        fn entry(name: &str, parser: impl Parser + 'static) -> (Name, Arc<dyn Parser>) {
            (Name::from(crate::name::NameToken::new(name)), Arc::new(parser))
        }
        vec![
            entry("html", HtmlParser),
            entry("markdown", MarkdownParser),
            entry("json", JsonParser),
            entry("toml", TomlParser),
            entry("png", ImageParser::png()),
            entry("jpg", ImageParser::jpeg()),
            entry("gif", ImageParser::gif()),
        ]
    }

    fn text_processors(&self) -> Vec<(Name, Arc<dyn TextProcessor>)> {
        vec![(
            Name::from(crate::name::NameToken::new("basic")),
            Arc::new(BasicTextProcessor),
        )]
    }
}

/// Line-level cleanup: normalizes `\r\n` to `\n` and strips trailing
/// whitespace from each line.
pub struct BasicTextProcessor;

impl TextProcessor for BasicTextProcessor {
    fn process(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line.trim_end());
        }
        out
    }
}

/// Plugin host for one site build.
pub struct SiteContext {
    plugins: Vec<Box<dyn Plugin>>,
    parsers: OnceLock<ParserRegistry>,
    layouts: OnceLock<BTreeMap<Name, Arc<dyn Layout>>>,
    text_processors: OnceLock<BTreeMap<Name, Arc<dyn TextProcessor>>>,
}

impl SiteContext {
    /// Assemble a context from site plugins. [`BuiltinPlugin`] is always
    /// present, registered ahead of everything passed in.
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        let mut all: Vec<Box<dyn Plugin>> = vec![Box::new(BuiltinPlugin)];
        all.extend(plugins);
        Self {
            plugins: all,
            parsers: OnceLock::new(),
            layouts: OnceLock::new(),
            text_processors: OnceLock::new(),
        }
    }

    /// The parser registry, gathered from all plugins on first access.
    pub fn parsers(&self) -> &ParserRegistry {
        self.parsers.get_or_init(|| {
            let mut registry = ParserRegistry::new(Arc::new(RawParser));
            for plugin in &self.plugins {
                for (name, parser) in plugin.parsers() {
                    registry.register(name, parser);
                }
            }
            registry
        })
    }

    fn layouts(&self) -> &BTreeMap<Name, Arc<dyn Layout>> {
        self.layouts.get_or_init(|| {
            self.plugins
                .iter()
                .flat_map(|plugin| plugin.layouts())
                .collect()
        })
    }

    fn text_processors(&self) -> &BTreeMap<Name, Arc<dyn TextProcessor>> {
        self.text_processors.get_or_init(|| {
            self.plugins
                .iter()
                .flat_map(|plugin| plugin.text_processors())
                .collect()
        })
    }

    /// Resolve a layout from its metadata reference. Fails fast on a missing
    /// or unknown name.
    pub fn layout(&self, meta: &Meta) -> Result<&dyn Layout, ConfigError> {
        let raw = declared_name(meta).ok_or_else(|| ConfigError::MissingLayoutName {
            meta: format!("{meta:?}"),
        })?;
        let name = Name::parse(raw)?;
        self.layouts()
            .get(&name)
            .map(|layout| &**layout)
            .ok_or_else(|| ConfigError::UnknownLayout {
                name: raw.to_string(),
            })
    }

    /// Resolve a text processor from its metadata reference. Same fail-fast
    /// contract as [`SiteContext::layout`].
    pub fn text_processor(&self, meta: &Meta) -> Result<&dyn TextProcessor, ConfigError> {
        let raw = declared_name(meta).ok_or_else(|| ConfigError::MissingProcessorName {
            meta: format!("{meta:?}"),
        })?;
        let name = Name::parse(raw)?;
        self.text_processors()
            .get(&name)
            .map(|processor| &**processor)
            .ok_or_else(|| ConfigError::UnknownProcessor {
                name: raw.to_string(),
            })
    }
}

impl Default for SiteContext {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// The name a metadata blob declares: its scalar value, else its `name` child.
fn declared_name(meta: &Meta) -> Option<&str> {
    meta.string().or_else(|| meta.get_str(KEY_NAME))
}
