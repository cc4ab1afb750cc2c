//! Resolution queries over a built [`ContentTree`].
//!
//! All three entry points are total over found/not-found: absence is `None`
//! or an empty map, never an error. Unpublished nodes stay addressable via
//! [`ContentTree::get`] but are invisible to everything here.
//!
//! [`ContentTree::resolve`] implements the page lookup rule: try the name
//! directly, fall back to its `index` child, then apply the publish filter to
//! whichever node was found. The order matters — an unpublished direct hit
//! resolves to nothing rather than leaking through to its index child.

use crate::meta::{KEY_CONTENT_TYPE, Meta};
use crate::name::{Name, NameToken};
use crate::tree::{ContentNode, ContentTree};
use std::collections::BTreeMap;

/// Reserved child name used for directory-index fallback. Resolving the root
/// name through this fallback yields the site's home page.
pub const INDEX_PAGE_TOKEN: &str = "index";

impl ContentTree {
    /// Resolve a page or fragment by name: direct hit, else the `index`
    /// child; `None` if the found node is unpublished or nothing was found.
    pub fn resolve(&self, name: &Name) -> Option<&ContentNode> {
        self.get(name)
            .or_else(|| self.get(&name.child(NameToken::new(INDEX_PAGE_TOKEN))))
            .filter(|node| node.meta.published())
    }

    /// All published nodes whose (name, metadata) satisfy `predicate`.
    pub fn resolve_all<P>(&self, predicate: P) -> BTreeMap<Name, &ContentNode>
    where
        P: Fn(&Name, &Meta) -> bool,
    {
        self.iter()
            .filter(|(name, node)| node.meta.published() && predicate(name, &node.meta))
            .map(|(name, node)| (name.clone(), node))
            .collect()
    }

    /// Published nodes in `base`'s subtree whose `content_type` metadata
    /// equals `content_type` exactly.
    pub fn find_by_content_type(
        &self,
        content_type: &str,
        base: &Name,
    ) -> BTreeMap<Name, &ContentNode> {
        self.resolve_all(|name, meta| {
            name.starts_with(base) && meta.get_str(KEY_CONTENT_TYPE) == Some(content_type)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SiteContext;
    use crate::meta::KEY_PUBLISHED;
    use crate::walk::FileEntry;

    fn published(path: &str) -> Result<FileEntry, crate::walk::WalkError> {
        Ok(FileEntry::in_memory(path, Meta::empty(), b"body".to_vec()))
    }

    fn with_meta(path: &str, keys: &[(&str, &str)]) -> Result<FileEntry, crate::walk::WalkError> {
        let mut meta = Meta::empty();
        for (k, v) in keys {
            meta.insert(*k, *v);
        }
        Ok(FileEntry::in_memory(path, meta, b"body".to_vec()))
    }

    fn tree(entries: Vec<Result<FileEntry, crate::walk::WalkError>>) -> ContentTree {
        ContentTree::build(&SiteContext::default(), entries).unwrap()
    }

    #[test]
    fn direct_hit_wins_over_index_child() {
        let tree = tree(vec![published("blog.md"), published("blog/index.md")]);
        let node = tree.resolve(&Name::parse("blog").unwrap()).unwrap();
        assert_eq!(node.name, Name::parse("blog").unwrap());
    }

    #[test]
    fn falls_back_to_index_child() {
        let tree = tree(vec![published("blog/index.md"), published("blog/post1.md")]);
        let node = tree.resolve(&Name::parse("blog").unwrap()).unwrap();
        assert_eq!(node.name, Name::parse("blog/index").unwrap());
    }

    #[test]
    fn root_resolves_to_home_page() {
        let tree = tree(vec![published("index.md"), published("about.md")]);
        let node = tree.resolve(&Name::root()).unwrap();
        assert_eq!(node.name, Name::parse("index").unwrap());
    }

    #[test]
    fn unpublished_node_is_absent() {
        let tree = tree(vec![
            published("index.md"),
            published("about.md"),
            with_meta("blog/post1.md", &[(KEY_PUBLISHED, "false")]),
        ]);
        assert!(tree.resolve(&Name::parse("blog/post1").unwrap()).is_none());
        // Still addressable internally
        assert!(tree.get(&Name::parse("blog/post1").unwrap()).is_some());
    }

    #[test]
    fn unpublished_direct_hit_does_not_fall_back() {
        let tree = tree(vec![
            with_meta("blog.md", &[(KEY_PUBLISHED, "false")]),
            published("blog/index.md"),
        ]);
        assert!(tree.resolve(&Name::parse("blog").unwrap()).is_none());
    }

    #[test]
    fn missing_name_is_none_not_error() {
        let tree = tree(vec![published("index.md")]);
        assert!(tree.resolve(&Name::parse("no/such/page").unwrap()).is_none());
    }

    #[test]
    fn resolve_all_sees_name_and_meta_but_skips_unpublished() {
        let tree = tree(vec![
            with_meta("a.md", &[(KEY_CONTENT_TYPE, "article")]),
            with_meta(
                "b.md",
                &[(KEY_CONTENT_TYPE, "article"), (KEY_PUBLISHED, "false")],
            ),
            published("c.md"),
        ]);
        let matches = tree.resolve_all(|_, meta| meta.get_str(KEY_CONTENT_TYPE) == Some("article"));
        assert_eq!(matches.len(), 1);
        assert!(matches.contains_key(&Name::parse("a").unwrap()));
    }

    #[test]
    fn find_by_content_type_respects_subtree() {
        let tree = tree(vec![
            with_meta("blog/one.md", &[(KEY_CONTENT_TYPE, "article")]),
            with_meta("blog/two.md", &[(KEY_CONTENT_TYPE, "article")]),
            with_meta("news/three.md", &[(KEY_CONTENT_TYPE, "article")]),
            {
                let mut meta = Meta::empty();
                meta.insert(KEY_CONTENT_TYPE, "dataset");
                Ok(FileEntry::in_memory("blog/data.json", meta, b"{}".to_vec()))
            },
        ]);

        let base = Name::parse("blog").unwrap();
        let matches = tree.find_by_content_type("article", &base);
        assert_eq!(matches.len(), 2);
        assert!(matches.contains_key(&Name::parse("blog/one").unwrap()));
        assert!(matches.contains_key(&Name::parse("blog/two").unwrap()));

        // Root base sees everything published with the type
        let all = tree.find_by_content_type("article", &Name::root());
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn content_type_match_is_exact() {
        let tree = tree(vec![with_meta("a.md", &[(KEY_CONTENT_TYPE, "articles")])]);
        assert!(tree.find_by_content_type("article", &Name::root()).is_empty());
    }
}
