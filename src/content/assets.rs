//! Local asset references in documents

use percent_encoding::percent_decode_str;
use pulldown_cmark::{Event, Parser, Tag};
use std::path::{Path, PathBuf};

use super::Post;

/// How a reference appears in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Image,
    Link,
    Hero,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub kind: RefKind,
    /// The reference as written
    pub raw: String,
    /// Decoded path, without query or fragment
    pub path: String,
}

/// Images, file links and the hero image that should exist on disk
pub fn local_references(post: &Post) -> Vec<AssetRef> {
    let mut refs = Vec::new();

    if let Some(image) = &post.front_matter.image {
        push_local(&mut refs, RefKind::Hero, image);
    }

    for event in Parser::new(&post.body) {
        match event {
            Event::Start(Tag::Image { dest_url, .. }) => {
                push_local(&mut refs, RefKind::Image, &dest_url);
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                // Page routes are the generator's business; only files are checked
                if has_file_extension(&dest_url) {
                    push_local(&mut refs, RefKind::Link, &dest_url);
                }
            }
            _ => {}
        }
    }

    refs
}

/// References that resolve neither beside the document nor under the static directory
pub fn missing_assets(post: &Post, static_dir: &Path) -> Vec<AssetRef> {
    local_references(post)
        .into_iter()
        .filter(|r| resolve(post, static_dir, &r.path).is_none())
        .collect()
}

/// Locate a reference on disk
pub fn resolve(post: &Post, static_dir: &Path, path: &str) -> Option<PathBuf> {
    let candidates = match path.strip_prefix('/') {
        Some(rooted) => vec![static_dir.join(rooted)],
        None => vec![post.dir().join(path), static_dir.join(path)],
    };
    candidates.into_iter().find(|p| p.exists())
}

fn push_local(refs: &mut Vec<AssetRef>, kind: RefKind, raw: &str) {
    let raw = raw.trim();
    if is_external(raw) {
        return;
    }
    let path = raw
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let path = percent_decode_str(path).decode_utf8_lossy().to_string();
    if path.is_empty() {
        return;
    }
    refs.push(AssetRef {
        kind,
        raw: raw.to_string(),
        path,
    });
}

fn is_external(url: &str) -> bool {
    url.is_empty()
        || url.starts_with('#')
        || url.starts_with("//")
        || url.contains("://")
        || ["mailto:", "tel:", "data:", "javascript:"]
            .iter()
            .any(|scheme| url.starts_with(scheme))
        // Template expressions are resolved by the generator
        || url.contains("{{")
}

fn has_file_extension(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let last = path.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && !ext.is_empty()
                && !matches!(
                    ext.to_ascii_lowercase().as_str(),
                    "html" | "htm" | "md" | "markdown"
                )
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;
    use std::fs;

    fn post_at(dir: &Path, source: &str, content: &str) -> Post {
        let (fm, body) = FrontMatter::parse(content).unwrap();
        Post::new(
            Path::new(source),
            dir.join("content").join(source),
            fm,
            body.to_string(),
        )
    }

    #[test]
    fn test_local_references() {
        let content = r#"---
image: /images/hero%20shot.png
---
![walk](/images/walk.svg "A walk") and ![remote](https://cdn.example/x.png)
See [the paper](/files/ruin.pdf?dl=1), [a post](/posts/other/),
[section](#proof), [mail](mailto:me@example.org) and [page](../other.html).
"#;
        let dir = Path::new("/site");
        let refs = local_references(&post_at(dir, "posts/walk.md", content));
        let paths: Vec<_> = refs.iter().map(|r| (r.kind, r.path.as_str())).collect();
        assert_eq!(
            paths,
            vec![
                (RefKind::Hero, "/images/hero shot.png"),
                (RefKind::Image, "/images/walk.svg"),
                (RefKind::Link, "/files/ruin.pdf"),
            ]
        );
    }

    #[test]
    fn test_missing_assets_checks_bundle_and_static() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("content/posts/chains");
        fs::create_dir_all(&bundle).unwrap();
        fs::write(bundle.join("diagram.png"), b"png").unwrap();
        let static_dir = dir.path().join("static");
        fs::create_dir_all(static_dir.join("images")).unwrap();
        fs::write(static_dir.join("images/hero.jpg"), b"jpg").unwrap();
        fs::write(static_dir.join("shared.png"), b"png").unwrap();

        let content = "---\nimage: /images/hero.jpg\n---\n![d](diagram.png) ![s](shared.png) ![x](gone.png) ![y](/images/gone.jpg)\n";
        let post = post_at(dir.path(), "posts/chains/index.md", content);

        let missing: Vec<_> = missing_assets(&post, &static_dir)
            .into_iter()
            .map(|r| r.raw)
            .collect();
        assert_eq!(missing, vec!["gone.png", "/images/gone.jpg"]);
    }
}
