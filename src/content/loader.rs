//! Content loader - loads documents from the content directory

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{FrontMatter, Post};
use crate::error::{Error, Result};
use crate::Folio;

/// Result of walking the content directory
#[derive(Debug, Default)]
pub struct ContentScan {
    /// Documents that parsed, sorted by source path
    pub posts: Vec<Post>,
    /// One `Error::Document` per file that did not
    pub failures: Vec<Error>,
}

/// Loads content from the content directory
pub struct ContentLoader<'a> {
    folio: &'a Folio,
}

impl<'a> ContentLoader<'a> {
    pub fn new(folio: &'a Folio) -> Self {
        Self { folio }
    }

    /// Parse every markdown file, keeping per-file failures instead of stopping
    pub fn scan(&self) -> ContentScan {
        let content_dir = &self.folio.content_dir;
        let mut scan = ContentScan::default();
        if !content_dir.exists() {
            tracing::debug!("No content directory at {:?}", content_dir);
            return scan;
        }

        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(content_dir).to_path_buf();
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                    scan.failures.push(Error::io(path, source));
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown_file(path) {
                continue;
            }
            match self.load_post(path) {
                Ok(post) => scan.posts.push(post),
                Err(e) => {
                    tracing::warn!("Failed to load {:?}: {}", path, e);
                    scan.failures.push(Error::Document {
                        path: path.to_path_buf(),
                        source: Box::new(e),
                    });
                }
            }
        }

        tracing::debug!(
            "Scanned {} documents ({} failed)",
            scan.posts.len(),
            scan.failures.len()
        );
        scan
    }

    /// Load all documents, failing on the first malformed one
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let scan = self.scan();
        match scan.failures.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(scan.posts),
        }
    }

    /// Load a single document from a file
    pub fn load_post(&self, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let relative = path
            .strip_prefix(&self.folio.content_dir)
            .unwrap_or(path)
            .to_path_buf();

        Ok(Post::new(&relative, path.to_path_buf(), fm, body.to_string()))
    }
}

/// Check if a file is a markdown file
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"))
        .unwrap_or(false)
}
