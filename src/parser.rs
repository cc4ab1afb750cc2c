//! Parser dispatch: extension-claimed, priority-ranked, total.
//!
//! Every file the walker yields must become exactly one artifact, so parser
//! selection can never fail. Parsers claim one or more file extensions and
//! carry a priority; [`ParserRegistry::select`] picks the highest-priority
//! claimant for an extension, and when nothing claims it the raw-bytes
//! fallback steps in with a warning. Two parsers at the same priority resolve
//! by registration order (earliest wins), so selection is deterministic no
//! matter how the plugin set is assembled.
//!
//! Extension comparison is case-sensitive against the set as registered. The
//! built-in parsers register lowercase; a walker that reports extensions
//! verbatim will route `photo.JPG` to the fallback, which is the conservative
//! reading of "no parser claims this".

use crate::context::SiteContext;
use crate::meta::Meta;
use crate::name::Name;
use log::warn;
use std::sync::Arc;
use thiserror::Error;

/// Priority used by the built-in parsers. Site plugins that want to override
/// a built-in register the same extension with anything higher.
pub const DEFAULT_PRIORITY: i32 = 10;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("source is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// The typed result a parser produces for one file.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// An HTML fragment, ready for inclusion in a page body.
    Html(String),
    /// Structured data (JSON, TOML, ...) normalized to a JSON value.
    Value(serde_json::Value),
    /// Image bytes, stored untouched.
    Image(Vec<u8>),
    /// Anything else: raw bytes from the fallback parser.
    Bytes(Vec<u8>),
}

impl Artifact {
    /// Short tag for listings and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::Html(_) => "html",
            Artifact::Value(_) => "value",
            Artifact::Image(_) => "image",
            Artifact::Bytes(_) => "bytes",
        }
    }

    pub fn as_html(&self) -> Option<&str> {
        match self {
            Artifact::Html(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Artifact::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// A pluggable file parser: an extension claim set, a priority, and the
/// parse entry point invoked with the file's bytes and metadata.
pub trait Parser: Send + Sync {
    /// Extensions this parser claims, lowercase, no leading dot.
    fn extensions(&self) -> &[&str];

    /// Selection rank among parsers claiming the same extension.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn parse(&self, ctx: &SiteContext, bytes: &[u8], meta: &Meta) -> Result<Artifact, ParseError>;
}

/// Registration-ordered parser table with a guaranteed fallback.
pub struct ParserRegistry {
    entries: Vec<(Name, Arc<dyn Parser>)>,
    fallback: Arc<dyn Parser>,
}

impl ParserRegistry {
    pub fn new(fallback: Arc<dyn Parser>) -> Self {
        Self {
            entries: Vec::new(),
            fallback,
        }
    }

    pub fn register(&mut self, name: Name, parser: Arc<dyn Parser>) {
        self.entries.push((name, parser));
    }

    /// Select the parser for `extension`.
    ///
    /// Among registered parsers whose claim set contains `extension`, the one
    /// with maximal priority wins; ties go to the earliest registration. An
    /// unclaimed extension is never an error — the raw-bytes fallback is
    /// returned and a warning logged.
    pub fn select(&self, extension: &str) -> &dyn Parser {
        let mut best: Option<&(Name, Arc<dyn Parser>)> = None;
        for entry in &self.entries {
            if !entry.1.extensions().contains(&extension) {
                continue;
            }
            match best {
                Some(current) if entry.1.priority() <= current.1.priority() => {}
                _ => best = Some(entry),
            }
        }
        match best {
            Some((_, parser)) => &**parser,
            None => {
                warn!("no parser claims extension {extension:?}; storing raw bytes");
                &*self.fallback
            }
        }
    }

    /// Number of registered parsers, fallback excluded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered parser names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.entries.iter().map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        exts: Vec<&'static str>,
        priority: i32,
        tag: &'static str,
    }

    impl Parser for Fixed {
        fn extensions(&self) -> &[&str] {
            &self.exts
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn parse(&self, _: &SiteContext, _: &[u8], _: &Meta) -> Result<Artifact, ParseError> {
            Ok(Artifact::Html(self.tag.to_string()))
        }
    }

    fn registry() -> ParserRegistry {
        ParserRegistry::new(Arc::new(Fixed {
            exts: vec![],
            priority: 0,
            tag: "fallback",
        }))
    }

    fn tag_of(parser: &dyn Parser) -> String {
        let ctx = SiteContext::new(vec![]);
        match parser.parse(&ctx, b"", &Meta::empty()).unwrap() {
            Artifact::Html(s) => s,
            _ => unreachable!(),
        }
    }

    #[test]
    fn highest_priority_wins_regardless_of_order() {
        let mut reg = registry();
        reg.register(
            Name::parse("low").unwrap(),
            Arc::new(Fixed {
                exts: vec!["jpg"],
                priority: 1,
                tag: "low",
            }),
        );
        reg.register(
            Name::parse("high").unwrap(),
            Arc::new(Fixed {
                exts: vec!["jpg", "jpeg"],
                priority: 5,
                tag: "high",
            }),
        );
        assert_eq!(tag_of(reg.select("jpg")), "high");
        assert_eq!(tag_of(reg.select("jpeg")), "high");

        // Same parsers, opposite registration order.
        let mut reg = registry();
        reg.register(
            Name::parse("high").unwrap(),
            Arc::new(Fixed {
                exts: vec!["jpg", "jpeg"],
                priority: 5,
                tag: "high",
            }),
        );
        reg.register(
            Name::parse("low").unwrap(),
            Arc::new(Fixed {
                exts: vec!["jpg"],
                priority: 1,
                tag: "low",
            }),
        );
        assert_eq!(tag_of(reg.select("jpg")), "high");
    }

    #[test]
    fn ties_break_to_earliest_registration() {
        let mut reg = registry();
        reg.register(
            Name::parse("first").unwrap(),
            Arc::new(Fixed {
                exts: vec!["md"],
                priority: 3,
                tag: "first",
            }),
        );
        reg.register(
            Name::parse("second").unwrap(),
            Arc::new(Fixed {
                exts: vec!["md"],
                priority: 3,
                tag: "second",
            }),
        );
        assert_eq!(tag_of(reg.select("md")), "first");
    }

    #[test]
    fn unclaimed_extension_falls_back() {
        let mut reg = registry();
        reg.register(
            Name::parse("md").unwrap(),
            Arc::new(Fixed {
                exts: vec!["md"],
                priority: 3,
                tag: "md",
            }),
        );
        assert_eq!(tag_of(reg.select("xyz")), "fallback");
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let mut reg = registry();
        reg.register(
            Name::parse("jpg").unwrap(),
            Arc::new(Fixed {
                exts: vec!["jpg"],
                priority: 3,
                tag: "jpg",
            }),
        );
        assert_eq!(tag_of(reg.select("JPG")), "fallback");
    }
}
