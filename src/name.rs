//! Hierarchical names: the addressing scheme for everything in the content tree.
//!
//! A [`Name`] is an ordered sequence of tokens, one per directory level. Each
//! token carries a body and an optional numeric index, written `body[index]`.
//! Indices disambiguate array-like siblings — a gallery that yields
//! `photo[0]`, `photo[1]`, `photo[2]` — without inventing synthetic file names.
//!
//! Names come from two places:
//!
//! - Relative paths emitted by the directory walker: `blog/post1.md` becomes
//!   the two-token name `blog/post1` (the extension is stripped by the tree
//!   builder, not here).
//! - Metadata strings naming a layout or text processor: `"layouts/article"`.
//!
//! The empty name is the tree root. It is valid and resolvable (the index
//! fallback turns it into the site's home page), but it renders as the empty
//! web path.
//!
//! Tokens are immutable once a name is constructed; all composition goes
//! through [`Name::join`] and [`Name::child`], which produce new names.

use serde::Serialize;
use std::fmt;
use std::ops::Add;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum NameError {
    #[error("empty segment in name {0:?}")]
    EmptySegment(String),
    #[error("malformed index in name segment {0:?}")]
    BadIndex(String),
}

/// One level of a hierarchical [`Name`]: a body plus an optional index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameToken {
    body: String,
    index: Option<u32>,
}

impl NameToken {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            index: None,
        }
    }

    pub fn indexed(body: impl Into<String>, index: u32) -> Self {
        Self {
            body: body.into(),
            index: Some(index),
        }
    }

    /// Parse a single segment like `post1` or `photo[2]`.
    ///
    /// A trailing `[n]` with a non-negative integer becomes the index. Any
    /// other use of brackets is malformed: `photo[`, `photo[x]`, `[2]`, and
    /// `photo[2]extra` are all errors. Bodies are taken verbatim otherwise —
    /// no character escaping or normalization happens at this level.
    pub fn parse(segment: &str) -> Result<Self, NameError> {
        if segment.is_empty() {
            return Err(NameError::EmptySegment(segment.to_string()));
        }
        let Some(open) = segment.find('[') else {
            return Ok(Self::new(segment));
        };
        if open == 0 || !segment.ends_with(']') {
            return Err(NameError::BadIndex(segment.to_string()));
        }
        let body = &segment[..open];
        let index: u32 = segment[open + 1..segment.len() - 1]
            .parse()
            .map_err(|_| NameError::BadIndex(segment.to_string()))?;
        Ok(Self::indexed(body, index))
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn index(&self) -> Option<u32> {
        self.index
    }
}

impl fmt::Display for NameToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{}]", self.body, i),
            None => f.write_str(&self.body),
        }
    }
}

/// An ordered token sequence identifying a position in the content tree.
///
/// Names are cheap to compare and order (`Ord` is derived lexicographically
/// over tokens), so the tree can keep them in a `BTreeMap` and queries can
/// test subtree membership with [`Name::starts_with`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Name {
    tokens: Vec<NameToken>,
}

impl Name {
    /// The empty name — the content-tree root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: Vec<NameToken>) -> Self {
        Self { tokens }
    }

    /// Parse a `/`-separated name string; `""` parses to the root.
    ///
    /// Leading, trailing, or doubled separators are malformed — a name has no
    /// notion of an "empty level".
    pub fn parse(s: &str) -> Result<Self, NameError> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let tokens = s
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    Err(NameError::EmptySegment(s.to_string()))
                } else {
                    NameToken::parse(segment)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[NameToken] {
        &self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token-wise prefix test. Every name starts with the root.
    pub fn starts_with(&self, prefix: &Name) -> bool {
        self.tokens.len() >= prefix.tokens.len()
            && self.tokens[..prefix.tokens.len()] == prefix.tokens[..]
    }

    /// Concatenate, yielding `self` then `other`.
    pub fn join(&self, other: &Name) -> Name {
        let mut tokens = self.tokens.clone();
        tokens.extend(other.tokens.iter().cloned());
        Name { tokens }
    }

    /// Append one token.
    pub fn child(&self, token: NameToken) -> Name {
        let mut tokens = self.tokens.clone();
        tokens.push(token);
        Name { tokens }
    }

    /// Render as a web-relative path: tokens joined with `/`, indexed tokens
    /// as `body[index]`. Lossless and injective — distinct token sequences
    /// always produce distinct strings; escaping is the consumer's problem.
    pub fn web_path(&self) -> String {
        self.to_string()
    }
}

impl Add for Name {
    type Output = Name;

    fn add(self, rhs: Name) -> Name {
        self.join(&rhs)
    }
}

impl From<NameToken> for Name {
    fn from(token: NameToken) -> Self {
        Name {
            tokens: vec![token],
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl Serialize for Name {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
