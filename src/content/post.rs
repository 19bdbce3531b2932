//! Content document model

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::FrontMatter;

/// A markdown document from the content directory
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Source file path relative to the content directory, `/`-separated
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// First directory under the content directory; empty for top-level pages
    pub section: String,

    /// URL-friendly name
    pub slug: String,

    /// Parsed `date`
    pub date: Option<DateTime<Local>>,

    /// Parsed `lastmod`
    pub lastmod: Option<DateTime<Local>>,

    /// Parsed `publishDate`
    pub publish_date: Option<DateTime<Local>>,

    /// Parsed `expiryDate`
    pub expiry_date: Option<DateTime<Local>>,

    pub front_matter: FrontMatter,

    /// Markdown body without the front matter
    pub body: String,
}

impl Post {
    /// Build a post from its parsed parts. `source` is relative to the content directory.
    pub fn new(source: &Path, full_source: PathBuf, front_matter: FrontMatter, body: String) -> Self {
        let source_str = source
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let section = if source.components().count() > 1 {
            source
                .components()
                .next()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .unwrap_or_default()
        } else {
            String::new()
        };

        let slug = match &front_matter.slug {
            Some(slug) => slug.clone(),
            None => default_slug(source),
        };

        Self {
            source: source_str,
            full_source,
            section,
            slug,
            date: front_matter.parse_date(),
            lastmod: front_matter.parse_lastmod(),
            publish_date: front_matter.parse_publish_date(),
            expiry_date: front_matter.parse_expiry_date(),
            front_matter,
            body,
        }
    }

    /// Title from front matter, falling back to the slug
    pub fn title(&self) -> &str {
        self.front_matter.title.as_deref().unwrap_or(&self.slug)
    }

    pub fn is_draft(&self) -> bool {
        self.front_matter.draft
    }

    /// Page bundles (`index.md` / `_index.md`) own the assets beside them
    pub fn is_bundle(&self) -> bool {
        matches!(
            self.full_source.file_stem().and_then(|s| s.to_str()),
            Some("index") | Some("_index")
        )
    }

    /// Section list pages (`_index.md`) carry no date of their own
    pub fn is_list_page(&self) -> bool {
        self.full_source.file_stem().and_then(|s| s.to_str()) == Some("_index")
    }

    /// Directory containing the source file
    pub fn dir(&self) -> &Path {
        self.full_source.parent().unwrap_or(Path::new("."))
    }
}

/// File stem, or the parent directory name for bundle index files
fn default_slug(source: &Path) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");

    if matches!(stem, "index" | "_index") {
        if let Some(dir) = source
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
        {
            return slug::slugify(dir);
        }
    }
    slug::slugify(stem)
}
