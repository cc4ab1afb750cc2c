//! Built-in parsers: the default claim set every [`SiteContext`] starts with.
//!
//! Markup (`html`, `md`) becomes [`Artifact::Html`], structured data (`json`,
//! `toml`) becomes [`Artifact::Value`], common image formats are kept as
//! untouched [`Artifact::Image`] bytes, and [`RawParser`] backs the registry's
//! total-coverage guarantee for everything else. Site plugins override any of
//! these by claiming the same extension at a higher priority.

use crate::context::SiteContext;
use crate::meta::Meta;
use crate::parser::{Artifact, ParseError, Parser};
use pulldown_cmark::html as md_html;

/// HTML sources pass through verbatim as fragments.
pub struct HtmlParser;

impl Parser for HtmlParser {
    fn extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn parse(&self, _: &SiteContext, bytes: &[u8], _: &Meta) -> Result<Artifact, ParseError> {
        Ok(Artifact::Html(std::str::from_utf8(bytes)?.to_string()))
    }
}

/// Markdown converted to an HTML fragment with `pulldown-cmark`.
pub struct MarkdownParser;

impl Parser for MarkdownParser {
    fn extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn parse(&self, _: &SiteContext, bytes: &[u8], _: &Meta) -> Result<Artifact, ParseError> {
        let source = std::str::from_utf8(bytes)?;
        let parser = pulldown_cmark::Parser::new(source);
        let mut body_html = String::new();
        md_html::push_html(&mut body_html, parser);
        Ok(Artifact::Html(body_html))
    }
}

/// JSON documents as structured values.
pub struct JsonParser;

impl Parser for JsonParser {
    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse(&self, _: &SiteContext, bytes: &[u8], _: &Meta) -> Result<Artifact, ParseError> {
        Ok(Artifact::Value(serde_json::from_slice(bytes)?))
    }
}

/// TOML documents, normalized to JSON values so consumers see one data shape.
pub struct TomlParser;

impl Parser for TomlParser {
    fn extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn parse(&self, _: &SiteContext, bytes: &[u8], _: &Meta) -> Result<Artifact, ParseError> {
        let source = std::str::from_utf8(bytes)?;
        let value: toml::Value = source.parse()?;
        Ok(Artifact::Value(toml_to_json(value)))
    }
}

fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::Value::from(i),
        toml::Value::Float(f) => serde_json::Value::from(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(d) => serde_json::Value::String(d.to_string()),
        toml::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Image formats the engine recognizes but never decodes.
pub struct ImageParser {
    extensions: &'static [&'static str],
}

impl ImageParser {
    pub fn png() -> Self {
        Self {
            extensions: &["png"],
        }
    }

    pub fn jpeg() -> Self {
        Self {
            extensions: &["jpg", "jpeg"],
        }
    }

    pub fn gif() -> Self {
        Self {
            extensions: &["gif"],
        }
    }
}

impl Parser for ImageParser {
    fn extensions(&self) -> &[&str] {
        self.extensions
    }

    fn parse(&self, _: &SiteContext, bytes: &[u8], _: &Meta) -> Result<Artifact, ParseError> {
        Ok(Artifact::Image(bytes.to_vec()))
    }
}

/// Fallback for unclaimed extensions. Claims nothing itself; the registry
/// reaches for it directly.
pub struct RawParser;

impl Parser for RawParser {
    fn extensions(&self) -> &[&str] {
        &[]
    }

    fn priority(&self) -> i32 {
        0
    }

    fn parse(&self, _: &SiteContext, bytes: &[u8], _: &Meta) -> Result<Artifact, ParseError> {
        Ok(Artifact::Bytes(bytes.to_vec()))
    }
}
